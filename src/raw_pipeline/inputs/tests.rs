use std::path::{Path, PathBuf};

use crate::raw_pipeline::common::error::ConversionError;
use crate::raw_pipeline::config::{EngineKind, RunConfiguration};
use crate::raw_pipeline::inputs::{
    InputResolver, JobDescriptor, RAW_EXTENSIONS, is_raw_extension, resolve_inputs, walk_root,
};
use crate::raw_pipeline::testing::touch;

fn config_with_filters(patterns: &[&str]) -> RunConfiguration {
    RunConfiguration::builder()
        .include(patterns)
        .output_dir("/out")
        .cache_dir("/cache")
        .build()
        .unwrap()
}

#[test]
fn test_every_extension_in_either_case_is_recognized() {
    for ext in RAW_EXTENSIONS {
        assert!(is_raw_extension(ext), "{ext}");
        assert!(is_raw_extension(&ext.to_ascii_uppercase()), "{ext}");
    }
}

#[test]
fn test_mixed_case_and_foreign_extensions_are_rejected() {
    for ext in ["Cr2", "nEF", "jpg", "JPG", "tif", "exr", "xmp", "pp3", ""] {
        assert!(!is_raw_extension(ext), "{ext}");
    }
}

#[test]
fn test_add_file_applies_extension_check() {
    let config = config_with_filters(&[]);
    let mut resolver = InputResolver::new(&config);

    assert!(resolver.add_file(Path::new("/shoot/a.CR2"), None));
    assert!(resolver.add_file(Path::new("/shoot/b.nef"), None));
    assert!(!resolver.add_file(Path::new("/shoot/c.jpg"), None));
    assert!(!resolver.add_file(Path::new("/shoot/README"), None));
    assert!(!resolver.add_file(Path::new("/shoot/d.Nef"), None));
    assert_eq!(resolver.len(), 2);
}

#[test]
fn test_add_file_drops_duplicates() {
    let config = config_with_filters(&[]);
    let mut resolver = InputResolver::new(&config);

    assert!(resolver.add_file(Path::new("/shoot/a.cr2"), None));
    assert!(!resolver.add_file(Path::new("/shoot/a.cr2"), None));
    assert_eq!(resolver.into_jobs().len(), 1);
}

#[test]
fn test_filters_search_anywhere_and_are_or_combined() {
    let config = config_with_filters(&["day2", "_0[0-4]"]);
    let mut resolver = InputResolver::new(&config);

    assert!(resolver.add_file(Path::new("/shoot/day2/IMG_9999.cr2"), None));
    assert!(resolver.add_file(Path::new("/shoot/day1/IMG_0042.cr2"), None));
    assert!(!resolver.add_file(Path::new("/shoot/day1/IMG_0999.cr2"), None));
}

#[test]
fn test_comma_separated_filters_are_split() {
    let config = config_with_filters(&["alpha,beta"]);
    assert_eq!(config.filters.len(), 2);

    let mut resolver = InputResolver::new(&config);
    assert!(resolver.add_file(Path::new("/x/beta/a.arw"), None));
    assert!(!resolver.add_file(Path::new("/x/gamma/a.arw"), None));
}

#[test]
fn test_jobs_come_out_sorted() {
    let config = config_with_filters(&[]);
    let mut resolver = InputResolver::new(&config);
    for path in ["/s/c.dng", "/s/a.dng", "/s/b/z.dng", "/s/b.dng"] {
        resolver.add_file(Path::new(path), None);
    }

    let sources: Vec<PathBuf> = resolver.into_jobs().iter().map(|j| j.source().to_path_buf()).collect();
    assert_eq!(
        sources,
        ["/s/a.dng", "/s/b.dng", "/s/b/z.dng", "/s/c.dng"].map(PathBuf::from)
    );
}

#[test]
fn test_job_paths_for_explicit_and_walked_files() {
    let config = RunConfiguration::builder()
        .engine(EngineKind::Darktable)
        .output_dir("/out")
        .cache_dir("/cache")
        .build()
        .unwrap();

    let explicit = JobDescriptor::new(PathBuf::from("/a/x/img.cr2"), None, "cr2".into(), &config);
    assert_eq!(explicit.output_path(), Path::new("/out/img.exr"));
    assert_eq!(explicit.temp_path(), Path::new("/cache/img.pfm"));
    assert_eq!(explicit.relative_dir(), Path::new(""));

    let walked = JobDescriptor::new(
        PathBuf::from("/a/x/img.cr2"),
        Some(PathBuf::from("/a")),
        "cr2".into(),
        &config,
    );
    assert_eq!(walked.output_path(), Path::new("/out/x/img.exr"));
    assert_eq!(walked.output_dir(), Path::new("/out/x"));
    assert_eq!(walked.root(), Some(Path::new("/a")));
}

#[test]
fn test_dotted_stem_is_kept_whole() {
    let config = config_with_filters(&[]);
    let job = JobDescriptor::new(PathBuf::from("/s/pano.001.ARW"), None, "ARW".into(), &config);

    assert_eq!(job.output_path(), Path::new("/out/pano.001.exr"));
    assert_eq!(job.temp_path(), Path::new("/cache/pano.001.tif"));
    assert_eq!(job.extension(), "ARW");
}

#[test]
fn test_walk_root_mirrors_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    touch(&root.join("x/img.cr2"));
    touch(&root.join("x/y/deep.NEF"));
    touch(&root.join("x/notes.txt"));
    touch(&root.join("top.raf"));

    let config = RunConfiguration::builder()
        .output_dir("/out")
        .cache_dir("/cache")
        .build()
        .unwrap();
    let jobs = walk_root(&root, &config);

    let outputs: Vec<&Path> = jobs.iter().map(|j| j.output_path()).collect();
    assert_eq!(
        outputs,
        [
            Path::new("/out/top.exr"),
            Path::new("/out/x/img.exr"),
            Path::new("/out/x/y/deep.exr"),
        ]
    );
    assert!(jobs.iter().all(|j| j.root() == Some(root.as_path())));
}

#[cfg(unix)]
#[test]
fn test_walk_root_follows_symlinked_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let root = base.join("shoot");
    touch(&base.join("archive/real.cr2"));
    std::fs::create_dir_all(root.join("picks")).unwrap();
    std::os::unix::fs::symlink(base.join("archive/real.cr2"), root.join("picks/linked.cr2")).unwrap();

    let config = RunConfiguration::builder()
        .output_dir("/out")
        .cache_dir("/cache")
        .build()
        .unwrap();
    let jobs = walk_root(&root, &config);

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].source(), root.join("picks/linked.cr2"));
    assert_eq!(jobs[0].output_path(), Path::new("/out/picks/linked.exr"));
}

#[test]
fn test_resolve_inputs_splits_files_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    touch(&base.join("single.dng"));
    touch(&base.join("ignored.jpg"));
    std::fs::create_dir_all(base.join("roll")).unwrap();

    let config = config_with_filters(&[]);
    let resolved = resolve_inputs(
        &[
            base.join("single.dng"),
            base.join("ignored.jpg"),
            base.join("roll"),
            base.join("roll"),
            base.join("missing.cr2"),
        ],
        &config,
    )
    .unwrap();

    assert_eq!(resolved.roots, [base.join("roll")]);
    assert_eq!(resolved.files.len(), 1);
    assert_eq!(resolved.files[0].source(), base.join("single.dng"));
    assert_eq!(resolved.files[0].root(), None);
}

#[test]
fn test_nothing_to_do_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("photo.jpg"));
    let config = config_with_filters(&[]);

    let result = resolve_inputs(
        &[dir.path().join("photo.jpg"), dir.path().join("absent.cr2")],
        &config,
    );
    assert!(matches!(result, Err(ConversionError::NoInputs)));
}

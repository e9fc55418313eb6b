use std::collections::HashSet;
use std::sync::LazyLock;

/// Camera raw extensions, lowercase.
pub const RAW_EXTENSIONS: [&str; 30] = [
    "crw", "cr2", "cr3", "dng", "nef", "nrw", "arw", "bay", "cap", "iiq",
    "eip", "dcs", "dcr", "drf", "kdc", "erf", "fff", "mef", "mdc", "mos",
    "mrw", "orf", "pef", "ptx", "raf", "raw", "rw2", "rwl", "srw", "x3f",
];

// Every extension in both all-lowercase and all-uppercase form; mixed case is not recognized.
static RECOGNIZED: LazyLock<HashSet<String>> = LazyLock::new(|| {
    RAW_EXTENSIONS
        .iter()
        .flat_map(|ext| [ext.to_string(), ext.to_ascii_uppercase()])
        .collect()
});

pub fn is_raw_extension(extension: &str) -> bool {
    RECOGNIZED.contains(extension)
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rawexr_rs::raw_pipeline::{
    ColorMatrix, EngineKind, ExrCompression, RunConfiguration, ToolPaths,
};

#[derive(Parser, Debug)]
#[command(
    name = "rawexr",
    version,
    about = "Convert camera raw files to scene-linear half-float EXR through an external raw developer and oiiotool."
)]
pub struct Cli {
    /// Raw files and/or directories (walked recursively)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory; directory inputs are mirrored below it
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Replace existing output files
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Conversion profile (pp3 for rawtherapee, xmp for darktable)
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Enable chromatic aberration correction in the profile
    #[arg(long)]
    pub ca: bool,

    /// Resize: WxH, Wx0 / 0xH to keep the aspect ratio, or a percentage like 50%
    #[arg(short, long)]
    pub resize: Option<String>,

    /// Resampling filter used when resizing (e.g. lanczos3, mitchell)
    #[arg(long)]
    pub filter: Option<String>,

    /// Exposure multiplier applied to every sample
    #[arg(short, long, default_value_t = 4.0)]
    pub exposure: f32,

    /// Number of files converted in parallel
    #[arg(short = 'j', long, default_value_t = 2)]
    pub workers: usize,

    /// Only convert paths matching one of these regular expressions (comma separated or repeated)
    #[arg(short, long = "include", value_name = "REGEX")]
    pub include: Vec<String>,

    /// Raw developer
    #[arg(long, value_enum, default_value = "rawtherapee")]
    pub engine: EngineArg,

    /// EXR compression (none, rle, zip, zips, piz, pxr24, b44, b44a, dwaa, dwab)
    #[arg(long, default_value = "zip")]
    pub compression: ExrCompression,

    /// Built-in gamut conversion applied after exposure
    #[arg(long, value_enum, conflicts_with = "matrix")]
    pub gamut: Option<GamutArg>,

    /// Custom row-major 3x3 color matrix: m00,m01,...,m22
    #[arg(long, allow_hyphen_values = true)]
    pub matrix: Option<ColorMatrix>,

    /// Directory for intermediate files
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Kill any external tool running longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// dcraw or dcraw_emu binary
    #[arg(long, default_value = "dcraw")]
    pub dcraw: PathBuf,

    /// rawtherapee-cli binary
    #[arg(long, default_value = "rawtherapee-cli")]
    pub rawtherapee: PathBuf,

    /// darktable-cli binary
    #[arg(long, default_value = "darktable-cli")]
    pub darktable: PathBuf,

    /// OpenImageIO oiiotool binary
    #[arg(long, default_value = "oiiotool")]
    pub oiiotool: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum EngineArg {
    Dcraw,
    Rawtherapee,
    Darktable,
}

impl From<EngineArg> for EngineKind {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Dcraw => EngineKind::Dcraw,
            EngineArg::Rawtherapee => EngineKind::RawTherapee,
            EngineArg::Darktable => EngineKind::Darktable,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum GamutArg {
    /// Linear sRGB / Rec.709 to ACES2065-1
    Aces,
}

impl Cli {
    pub fn to_config(&self) -> rawexr_rs::raw_pipeline::Result<RunConfiguration> {
        let mut builder = RunConfiguration::builder()
            .engine(self.engine.into())
            .tools(ToolPaths {
                dcraw: self.dcraw.clone(),
                rawtherapee: self.rawtherapee.clone(),
                darktable: self.darktable.clone(),
                oiiotool: self.oiiotool.clone(),
            })
            .ca_correction(self.ca)
            .overwrite(self.overwrite)
            .exposure(self.exposure)
            .compression(self.compression)
            .workers(self.workers)
            .include(&self.include)
            .output_dir(&self.output);

        if let Some(profile) = &self.profile {
            builder = builder.profile(profile);
        }
        if let Some(resize) = &self.resize {
            builder = builder.resize(resize);
        }
        if let Some(filter) = &self.filter {
            builder = builder.resize_filter(filter);
        }
        match (self.gamut, self.matrix) {
            (Some(GamutArg::Aces), _) => builder = builder.matrix(ColorMatrix::SRGB_TO_ACES2065_1),
            (None, Some(matrix)) => builder = builder.matrix(matrix),
            (None, None) => {}
        }
        if let Some(dir) = &self.cache_dir {
            builder = builder.cache_dir(dir);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

//! Value types for the run configuration

use std::fmt;
use std::str::FromStr;

use crate::raw_pipeline::common::error::ConversionError;

/// Debayer backend used for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// dcraw / dcraw_emu writing a 16-bit linear TIFF to stdout
    Dcraw,
    /// rawtherapee-cli with a pp3 profile, 32-bit float TIFF
    #[default]
    RawTherapee,
    /// darktable-cli with an xmp sidecar, float PFM
    Darktable,
}

impl EngineKind {
    pub fn tool_name(self) -> &'static str {
        match self {
            EngineKind::Dcraw => "dcraw",
            EngineKind::RawTherapee => "rawtherapee-cli",
            EngineKind::Darktable => "darktable-cli",
        }
    }

    /// Extension of the intermediate file the engine writes into the cache directory.
    pub fn intermediate_extension(self) -> &'static str {
        match self {
            EngineKind::Dcraw => "tiff",
            EngineKind::RawTherapee => "tif",
            EngineKind::Darktable => "pfm",
        }
    }

    /// Profile file extension, `None` when the engine takes no profile.
    pub fn profile_extension(self) -> Option<&'static str> {
        match self {
            EngineKind::Dcraw => None,
            EngineKind::RawTherapee => Some("pp3"),
            EngineKind::Darktable => Some("xmp"),
        }
    }

    /// Whether chromatic aberration correction can be switched on in the profile file.
    pub fn supports_ca_profile(self) -> bool {
        matches!(self, EngineKind::RawTherapee)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Dcraw => "dcraw",
            EngineKind::RawTherapee => "rawtherapee",
            EngineKind::Darktable => "darktable",
        };
        f.write_str(name)
    }
}

impl FromStr for EngineKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dcraw" | "dcraw_emu" => Ok(EngineKind::Dcraw),
            "rawtherapee" | "rt" => Ok(EngineKind::RawTherapee),
            "darktable" | "dt" => Ok(EngineKind::Darktable),
            other => Err(ConversionError::InvalidSetting(format!("unknown engine '{other}'"))),
        }
    }
}

/// EXR compression schemes understood by `oiiotool --compression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExrCompression {
    None,
    Rle,
    /// Deflate, 16 scanlines per block (default)
    #[default]
    Zip,
    /// Deflate, one scanline per block
    Zips,
    Piz,
    Pxr24,
    B44,
    B44a,
    Dwaa,
    Dwab,
}

impl ExrCompression {
    pub fn as_oiio(self) -> &'static str {
        match self {
            ExrCompression::None => "none",
            ExrCompression::Rle => "rle",
            ExrCompression::Zip => "zip",
            ExrCompression::Zips => "zips",
            ExrCompression::Piz => "piz",
            ExrCompression::Pxr24 => "pxr24",
            ExrCompression::B44 => "b44",
            ExrCompression::B44a => "b44a",
            ExrCompression::Dwaa => "dwaa",
            ExrCompression::Dwab => "dwab",
        }
    }
}

impl FromStr for ExrCompression {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compression = match s.trim().to_ascii_lowercase().as_str() {
            "none" => ExrCompression::None,
            "rle" => ExrCompression::Rle,
            "zip" => ExrCompression::Zip,
            "zips" => ExrCompression::Zips,
            "piz" => ExrCompression::Piz,
            "pxr24" => ExrCompression::Pxr24,
            "b44" => ExrCompression::B44,
            "b44a" => ExrCompression::B44a,
            "dwaa" => ExrCompression::Dwaa,
            "dwab" => ExrCompression::Dwab,
            other => {
                return Err(ConversionError::InvalidSetting(format!(
                    "unknown EXR compression '{other}'"
                )));
            }
        };
        Ok(compression)
    }
}

/// Output size requested with `--resize`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeSpec {
    /// `WxH`, aspect ratio is not preserved
    Exact { width: u32, height: u32 },
    /// `Wx0`
    FitWidth(u32),
    /// `0xH`
    FitHeight(u32),
    /// `50%`
    Percent(f32),
}

impl ResizeSpec {
    /// Geometry argument in the form `oiiotool --resize` expects.
    pub fn as_oiio_arg(&self) -> String {
        match self {
            ResizeSpec::Exact { width, height } => format!("{width}x{height}"),
            ResizeSpec::FitWidth(width) => format!("{width}x0"),
            ResizeSpec::FitHeight(height) => format!("0x{height}"),
            ResizeSpec::Percent(percent) => format!("{percent}%"),
        }
    }

    /// Size `oiiotool` will produce for a source of `width` x `height`.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = |value: u32, num: u32, den: u32| -> u32 {
            if den == 0 {
                return 0;
            }
            ((value as f64 * num as f64) / den as f64).round() as u32
        };
        match *self {
            ResizeSpec::Exact { width: w, height: h } => (w, h),
            ResizeSpec::FitWidth(w) => (w, scale(height, w, width)),
            ResizeSpec::FitHeight(h) => (scale(width, h, height), h),
            ResizeSpec::Percent(p) => {
                let factor = p as f64 / 100.0;
                (
                    (width as f64 * factor).round() as u32,
                    (height as f64 * factor).round() as u32,
                )
            }
        }
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_oiio_arg())
    }
}

impl FromStr for ResizeSpec {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let invalid = || ConversionError::InvalidResize(s.to_string());

        if let Some(percent) = spec.strip_suffix('%') {
            let percent: f32 = percent.trim().parse().map_err(|_| invalid())?;
            if !percent.is_finite() || percent <= 0.0 {
                return Err(invalid());
            }
            return Ok(ResizeSpec::Percent(percent));
        }

        let (w, h) = spec
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;

        match (width, height) {
            (0, 0) => Err(invalid()),
            (w, 0) => Ok(ResizeSpec::FitWidth(w)),
            (0, h) => Ok(ResizeSpec::FitHeight(h)),
            (width, height) => Ok(ResizeSpec::Exact { width, height }),
        }
    }
}

/// Row-major 3x3 color conversion matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    /// Linear Rec.709/sRGB (D65) to ACES2065-1 (AP0, D60), Bradford adapted.
    pub const SRGB_TO_ACES2065_1: ColorMatrix = ColorMatrix([
        [0.439_701, 0.382_978, 0.177_335],
        [0.089_792_3, 0.813_423, 0.096_761_6],
        [0.017_544, 0.111_544, 0.870_704],
    ]);

    /// The nine coefficients, row-major, comma separated.
    pub fn as_oiio_arg(&self) -> String {
        self.0
            .iter()
            .flatten()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for ColorMatrix {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("aces") {
            return Ok(ColorMatrix::SRGB_TO_ACES2065_1);
        }

        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConversionError::InvalidMatrix(format!("{s}: {e}")))?;

        if values.len() != 9 {
            return Err(ConversionError::InvalidMatrix(format!(
                "expected 9 coefficients, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConversionError::InvalidMatrix(format!("{s}: non-finite coefficient")));
        }

        let mut rows = [[0.0f32; 3]; 3];
        for (i, value) in values.into_iter().enumerate() {
            rows[i / 3][i % 3] = value;
        }
        Ok(ColorMatrix(rows))
    }
}

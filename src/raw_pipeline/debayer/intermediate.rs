//! Lightweight header probing for intermediate images

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::raw_pipeline::common::error::{ConversionError, Result};

/// Width and height of a TIFF or PFM intermediate, read from its header only.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "tif" | "tiff" => probe_tiff(path),
        "pfm" => probe_pfm(path),
        other => Err(ConversionError::UnsupportedFormat(other.to_string())),
    }
}

fn probe_tiff(path: &Path) -> Result<(u32, u32)> {
    let mut decoder = tiff::decoder::Decoder::new(BufReader::new(File::open(path)?))
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
    decoder
        .dimensions()
        .map_err(|e| ConversionError::DecodeError(e.to_string()))
}

// "PF" or "Pf", then width and height, then the scale; whitespace separated.
fn probe_pfm(path: &Path) -> Result<(u32, u32)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut tokens: Vec<String> = Vec::new();
    let mut line = String::new();

    while tokens.len() < 3 {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        tokens.extend(line.split_whitespace().map(str::to_string));
    }

    let bad_header = || ConversionError::DecodeError(format!("bad PFM header in {}", path.display()));
    match tokens.as_slice() {
        [magic, width, height, ..] if magic == "PF" || magic == "Pf" => {
            let width = width.parse().map_err(|_| bad_header())?;
            let height = height.parse().map_err(|_| bad_header())?;
            Ok((width, height))
        }
        _ => Err(bad_header()),
    }
}

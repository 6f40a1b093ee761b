//! Image validation and normalisation.
//!
//! Two separate operations, composed by [`validate_image`]:
//!
//! 1. [`inspect_image`] + [`check_dimensions`] decide whether a file is a
//!    usable page: it must decode (format guessed from the bytes, not the
//!    extension) and be larger than `min_dimension` on both axes. Anything
//!    at or below that is a thumbnail, icon or spacer, not a page.
//! 2. [`normalize_image`] rewrites the file in place so the PDF encoder only
//!    ever sees opaque images: alpha is flattened onto white and saved as
//!    JPEG, palette images are expanded to RGB in their own container.
//!
//! Files live in the per-archive scratch directory, so rewriting them never
//! touches the user's archive.

use crate::error::Zip2PdfError;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Colour layout of a decoded image, as far as normalisation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// RGB without alpha.
    Truecolor,
    /// Any layout carrying an alpha channel (RGBA, gray + alpha).
    TruecolorAlpha,
    /// Indexed colour in the container (PNG colour type 3, GIF, ≤ 8-bit BMP).
    Palette,
    Grayscale,
    Other,
}

/// What [`inspect_image`] learned about a file. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    pub format: ImageFormat,
}

/// Why a candidate file did not make it into the page list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Failed the suffix pre-filter; never opened.
    NotAnImageName,
    /// Open or decode failed.
    Undecodable(String),
    /// Width or height at or below the minimum.
    TooSmall { width: u32, height: u32 },
}

/// Result of [`normalize_image`] on an accepted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    Unchanged,
    /// Composited over white and re-encoded as JPEG.
    AlphaFlattened,
    /// Expanded to RGB, same container format.
    PaletteExpanded,
    /// The rewrite failed; the original bytes are still in place.
    Failed(String),
}

/// Thresholds used while validating pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePolicy {
    /// Images with width or height `<=` this are rejected.
    pub min_dimension: u32,
    /// JPEG quality used when flattening alpha images.
    pub jpeg_quality: u8,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            min_dimension: 10,
            jpeg_quality: 80,
        }
    }
}

fn load(path: &Path) -> Result<(DynamicImage, ImageFormat), Zip2PdfError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| Zip2PdfError::decode(path, e))?;
    let format = reader
        .format()
        .ok_or_else(|| Zip2PdfError::decode(path, "unrecognised image format"))?;
    let image = reader.decode().map_err(|e| Zip2PdfError::decode(path, e))?;
    Ok((image, format))
}

/// Read the container header to find indexed-colour images, which the
/// decoder has already expanded by the time we see pixels.
fn has_palette(path: &Path, format: ImageFormat) -> bool {
    let mut header = [0u8; 32];
    let read = File::open(path).and_then(|mut f| {
        let mut n = 0;
        while n < header.len() {
            match f.read(&mut header[n..])? {
                0 => break,
                k => n += k,
            }
        }
        Ok(n)
    });
    let Ok(n) = read else { return false };
    let header = &header[..n];

    match format {
        ImageFormat::Gif => true,
        // 8-byte signature, IHDR length + tag, width, height, bit depth, colour type.
        ImageFormat::Png => header.len() > 25 && header[25] == 3,
        ImageFormat::Bmp => {
            if header.len() < 30 {
                return false;
            }
            let dib_size = u32::from_le_bytes([header[14], header[15], header[16], header[17]]);
            let at = if dib_size == 12 { 24 } else { 28 };
            let bits = u16::from_le_bytes([header[at], header[at + 1]]);
            bits <= 8
        }
        _ => false,
    }
}

fn color_mode_of(color: ColorType) -> ColorMode {
    match color {
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ColorMode::Truecolor,
        ColorType::Rgba8
        | ColorType::Rgba16
        | ColorType::Rgba32F
        | ColorType::La8
        | ColorType::La16 => ColorMode::TruecolorAlpha,
        ColorType::L8 | ColorType::L16 => ColorMode::Grayscale,
        _ => ColorMode::Other,
    }
}

/// Decode `path` and describe it.
pub fn inspect_image(path: &Path) -> Result<ImageInfo, Zip2PdfError> {
    let (image, format) = load(path)?;
    let color_mode = if has_palette(path, format) {
        ColorMode::Palette
    } else {
        color_mode_of(image.color())
    };
    Ok(ImageInfo {
        width: image.width(),
        height: image.height(),
        color_mode,
        format,
    })
}

/// Reject images whose width or height is `<= min_dimension`.
pub fn check_dimensions(info: &ImageInfo, min_dimension: u32) -> Result<(), RejectReason> {
    if info.width > min_dimension && info.height > min_dimension {
        Ok(())
    } else {
        Err(RejectReason::TooSmall {
            width: info.width,
            height: info.height,
        })
    }
}

/// Alpha-composite onto opaque white.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let a = u32::from(src[3]);
        for c in 0..3 {
            let v = u32::from(src[c]) * a + 255 * (255 - a);
            dst[c] = ((v + 127) / 255) as u8;
        }
    }
    out
}

fn write_err(path: &Path, e: impl std::fmt::Display) -> Zip2PdfError {
    Zip2PdfError::ImageWriteFailed {
        path: PathBuf::from(path),
        detail: e.to_string(),
    }
}

/// Rewrite `path` in place so it carries neither alpha nor a palette.
///
/// Alpha images become JPEG at `jpeg_quality` whatever their extension says;
/// palette images keep their container format.
pub fn normalize_image(
    path: &Path,
    info: &ImageInfo,
    jpeg_quality: u8,
) -> Result<Normalization, Zip2PdfError> {
    match info.color_mode {
        ColorMode::Palette => {
            let (image, _) = load(path)?;
            DynamicImage::ImageRgb8(image.to_rgb8())
                .save_with_format(path, info.format)
                .map_err(|e| write_err(path, e))?;
            Ok(Normalization::PaletteExpanded)
        }
        ColorMode::TruecolorAlpha => {
            let (image, _) = load(path)?;
            let flat = flatten_onto_white(&image);
            let file = File::create(path).map_err(|e| write_err(path, e))?;
            let mut writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality.clamp(1, 100))
                .encode_image(&flat)
                .map_err(|e| write_err(path, e))?;
            writer.flush().map_err(|e| write_err(path, e))?;
            Ok(Normalization::AlphaFlattened)
        }
        _ => Ok(Normalization::Unchanged),
    }
}

/// Validate and normalise one candidate image.
///
/// A rewrite failure does not reject the page: the size check already
/// passed, so the image is returned as [`Normalization::Failed`].
pub fn validate_image(path: &Path, policy: &ImagePolicy) -> Result<Normalization, RejectReason> {
    let info = inspect_image(path).map_err(|e| RejectReason::Undecodable(e.to_string()))?;
    check_dimensions(&info, policy.min_dimension)?;
    Ok(normalize_image(path, &info, policy.jpeg_quality)
        .unwrap_or_else(|e| Normalization::Failed(e.to_string())))
}

/// `true` for every decodable image larger than the minimum size.
pub fn validate_and_normalize(path: &Path, policy: &ImagePolicy) -> bool {
    validate_image(path, policy).is_ok()
}

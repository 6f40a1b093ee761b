//! PDF assembly: ordered page images → PDF bytes.
//!
//! One page per image, sized so the image lands at a fixed resolution
//! (default 100 DPI, i.e. `pixels × 72 / 100` points). JPEG files that a PDF
//! reader can decode natively are embedded byte-for-byte with `DCTDecode`,
//! avoiding a lossy round-trip; everything else is decoded and stored as
//! Flate-compressed 8-bit samples.
//!
//! The whole document is built in memory and returned as bytes. The caller
//! writes it out in one go, so a failure here never leaves a half-written
//! PDF on disk.

use super::validate::flatten_onto_white;
use crate::error::Zip2PdfError;
use image::{ColorType, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns an ordered list of page images into PDF bytes.
pub trait PdfEncoder: Send + Sync {
    fn encode(&self, pages: &[PathBuf], dpi: u32) -> Result<Vec<u8>, Zip2PdfError>;
}

/// Default encoder built on `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfEncoder;

/// Frame header fields we need from a JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JpegFrame {
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

/// Find the SOF0/1/2 header. Returns `None` for anything PDF readers can't
/// be trusted to decode (arithmetic coding, 12-bit samples, CMYK).
pub(crate) fn jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        if marker == 0xFF {
            i += 1;
            continue;
        }
        // Standalone markers carry no length.
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        let len = usize::from(u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]));
        match marker {
            0xC0..=0xC2 => {
                let seg = bytes.get(i + 4..i + 2 + len)?;
                if seg.len() < 6 || seg[0] != 8 {
                    return None;
                }
                let height = u32::from(u16::from_be_bytes([seg[1], seg[2]]));
                let width = u32::from(u16::from_be_bytes([seg[3], seg[4]]));
                let components = seg[5];
                return matches!(components, 1 | 3).then_some(JpegFrame {
                    width,
                    height,
                    components,
                });
            }
            // Lossless, hierarchical and arithmetic-coded frames, or scan data
            // before any frame header. DHT (C4), JPG (C8) and DAC (CC) are
            // ordinary segments and fall through.
            0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF | 0xDA | 0xD9 => return None,
            _ => i += 2 + len,
        }
    }
    None
}

/// An image XObject plus its pixel size.
struct PageImage {
    width: u32,
    height: u32,
    stream: Stream,
}

fn image_dict(width: u32, height: u32, color_space: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8i64,
    }
}

fn load_page(path: &Path) -> Result<PageImage, Zip2PdfError> {
    let bytes = std::fs::read(path).map_err(|e| Zip2PdfError::decode(path, e))?;

    if let Some(frame) = jpeg_frame(&bytes) {
        let color_space = if frame.components == 1 { "DeviceGray" } else { "DeviceRGB" };
        let mut dict = image_dict(frame.width, frame.height, color_space);
        dict.set("Filter", "DCTDecode");
        debug!("{}: embedding JPEG as-is", path.display());
        return Ok(PageImage {
            width: frame.width,
            height: frame.height,
            stream: Stream::new(dict, bytes).with_compression(false),
        });
    }

    let image = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Zip2PdfError::decode(path, e))?
        .decode()
        .map_err(|e| Zip2PdfError::decode(path, e))?;
    let (width, height) = (image.width(), image.height());

    let (color_space, samples) = match image.color() {
        ColorType::L8 | ColorType::L16 => ("DeviceGray", image.to_luma8().into_raw()),
        c if c.has_alpha() => ("DeviceRGB", flatten_onto_white(&image).into_raw()),
        _ => ("DeviceRGB", image.to_rgb8().into_raw()),
    };
    debug!("{}: embedding {} samples", path.display(), color_space);
    Ok(PageImage {
        width,
        height,
        stream: Stream::new(image_dict(width, height, color_space), samples),
    })
}

fn assembly_err(e: impl std::fmt::Display) -> Zip2PdfError {
    Zip2PdfError::PdfAssemblyFailed(e.to_string())
}

impl PdfEncoder for LopdfEncoder {
    fn encode(&self, pages: &[PathBuf], dpi: u32) -> Result<Vec<u8>, Zip2PdfError> {
        if pages.is_empty() {
            return Err(Zip2PdfError::PdfAssemblyFailed("no pages to encode".into()));
        }
        let scale = 72.0 / dpi.max(1) as f32;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

        for path in pages {
            let page = load_page(path)?;
            let w = page.width as f32 * scale;
            let h = page.height as f32 * scale;
            let image_id = doc.add_object(page.stream);

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            Object::Real(w),
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(h),
                            Object::Integer(0),
                            Object::Integer(0),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().map_err(assembly_err)?,
            ));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(w),
                    Object::Real(h),
                ],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buf = Vec::new();
        doc.save_to(&mut buf).map_err(assembly_err)?;
        debug!("Assembled {} pages → {} bytes", pages.len(), buf.len());
        Ok(buf)
    }
}

//! Configuration types for archive-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the classic
//! zip2pdf behaviour: 12-page minimum, 10-pixel thumbnail cut-off, JPEG
//! quality 80 for flattened alpha images, 100 DPI pages.

use crate::error::Zip2PdfError;
use crate::pipeline::assemble::{LopdfEncoder, PdfEncoder};
use crate::pipeline::extract::{ArchiveExtractor, NativeExtractor};
use crate::pipeline::validate::ImagePolicy;
use crate::progress::{BatchProgressCallback, ProgressCallback};
use std::fmt;
use std::sync::Arc;

/// Configuration for converting archives to PDF.
///
/// # Example
/// ```rust
/// use edgequake_zip2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .min_pages(20)
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_pages, 20);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Minimum number of valid pages before a PDF is written. Default: 12.
    ///
    /// Fewer pages usually means the archive is not a comic (a RAR of loose
    /// files, a cover-art pack) or extraction went partly wrong. Producing a
    /// two-page "book" from that is worse than producing nothing.
    pub min_pages: usize,

    /// Images with width or height `<=` this are not pages. Default: 10.
    pub min_dimension: u32,

    /// JPEG quality (1–100) for images whose alpha channel is flattened. Default: 80.
    pub jpeg_quality: u8,

    /// Resolution assumed when sizing PDF pages. Range: 36–600. Default: 100.
    pub dpi: u32,

    /// Archive unpacker. Default: [`NativeExtractor`].
    pub extractor: Arc<dyn ArchiveExtractor>,

    /// Image-to-PDF encoder. Default: [`LopdfEncoder`].
    pub encoder: Arc<dyn PdfEncoder>,

    /// Optional per-archive progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            min_pages: 12,
            min_dimension: 10,
            jpeg_quality: 80,
            dpi: 100,
            extractor: Arc::new(NativeExtractor),
            encoder: Arc::new(LopdfEncoder),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("min_pages", &self.min_pages)
            .field("min_dimension", &self.min_dimension)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("dpi", &self.dpi)
            .field("extractor", &"<dyn ArchiveExtractor>")
            .field("encoder", &"<dyn PdfEncoder>")
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The subset of settings the image validator needs.
    pub fn image_policy(&self) -> ImagePolicy {
        ImagePolicy {
            min_dimension: self.min_dimension,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn min_pages(mut self, n: usize) -> Self {
        self.config.min_pages = n;
        self
    }

    pub fn min_dimension(mut self, px: u32) -> Self {
        self.config.min_dimension = px;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        self.config.extractor = extractor;
        self
    }

    pub fn encoder(mut self, encoder: Arc<dyn PdfEncoder>) -> Self {
        self.config.encoder = encoder;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Zip2PdfError> {
        let c = &self.config;
        if c.min_pages == 0 {
            return Err(Zip2PdfError::InvalidConfig(
                "Minimum page count must be ≥ 1".into(),
            ));
        }
        if !(36..=600).contains(&c.dpi) {
            return Err(Zip2PdfError::InvalidConfig(format!(
                "DPI must be 36–600, got {}",
                c.dpi
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_behaviour() {
        let c = ConversionConfig::default();
        assert_eq!(c.min_pages, 12);
        assert_eq!(c.min_dimension, 10);
        assert_eq!(c.jpeg_quality, 80);
        assert_eq!(c.dpi, 100);
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn builder_clamps_quality() {
        let c = ConversionConfig::builder().jpeg_quality(0).build().unwrap();
        assert_eq!(c.jpeg_quality, 1);
        let c = ConversionConfig::builder().jpeg_quality(200).build().unwrap();
        assert_eq!(c.jpeg_quality, 100);
    }

    #[test]
    fn builder_rejects_zero_min_pages() {
        let err = ConversionConfig::builder().min_pages(0).build().unwrap_err();
        assert!(err.to_string().contains("Minimum page count"));
    }

    #[test]
    fn builder_rejects_out_of_range_dpi() {
        assert!(ConversionConfig::builder().dpi(10).build().is_err());
        assert!(ConversionConfig::builder().dpi(1000).build().is_err());
        assert!(ConversionConfig::builder().dpi(300).build().is_ok());
    }

    #[test]
    fn image_policy_mirrors_config() {
        let c = ConversionConfig::builder()
            .min_dimension(32)
            .jpeg_quality(70)
            .build()
            .unwrap();
        assert_eq!(
            c.image_policy(),
            ImagePolicy {
                min_dimension: 32,
                jpeg_quality: 70
            }
        );
    }

    #[test]
    fn debug_hides_trait_objects() {
        let s = format!("{:?}", ConversionConfig::default());
        assert!(s.contains("<dyn ArchiveExtractor>"));
        assert!(s.contains("min_pages: 12"));
    }
}

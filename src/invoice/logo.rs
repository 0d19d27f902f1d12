//! Invoice logo loading.
//!
//! The logo is loaded before rendering starts. A missing, unreadable or slow
//! logo never fails an invoice: [`resolve_logo`] reports it and returns `None`,
//! and both renderers fall back to a text header.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, warn};

/// Logo loading errors
#[derive(Debug, Error)]
pub enum LogoError {
    /// The image could not be read.
    #[error("failed to read logo {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The image is not a baseline or progressive JPEG.
    #[error("logo is not a supported JPEG image")]
    Unsupported,

    /// The JPEG ended before its frame header.
    #[error("logo JPEG is truncated")]
    Truncated,

    /// No logo is configured.
    #[error("no logo configured")]
    NotConfigured,
}

/// A decoded-enough JPEG logo: raw bytes plus frame dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    bytes: Vec<u8>,
    width: u16,
    height: u16,
    components: u8,
}

impl Logo {
    /// Read the frame header of a JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`LogoError::Unsupported`] for anything that is not a JPEG, and
    /// [`LogoError::Truncated`] when no frame header is found.
    pub fn from_jpeg(bytes: Vec<u8>) -> Result<Self, LogoError> {
        if bytes.get(..2) != Some(&[0xFF, 0xD8][..]) {
            return Err(LogoError::Unsupported);
        }

        let mut pos = 2;

        loop {
            let (Some(&0xFF), Some(&marker)) = (bytes.get(pos), bytes.get(pos + 1)) else {
                return Err(LogoError::Truncated);
            };

            // Fill bytes
            if marker == 0xFF {
                pos += 1;
                continue;
            }

            let length = read_u16(&bytes, pos + 2).ok_or(LogoError::Truncated)?;

            if is_frame_header(marker) {
                let height = read_u16(&bytes, pos + 5).ok_or(LogoError::Truncated)?;
                let width = read_u16(&bytes, pos + 7).ok_or(LogoError::Truncated)?;
                let components = *bytes.get(pos + 9).ok_or(LogoError::Truncated)?;

                if width == 0 || height == 0 || !matches!(components, 1 | 3 | 4) {
                    return Err(LogoError::Unsupported);
                }

                return Ok(Self {
                    bytes,
                    width,
                    height,
                    components,
                });
            }

            if marker == 0xD9 || marker == 0xDA {
                return Err(LogoError::Truncated);
            }

            pos += 2 + usize::from(length);
        }
    }

    /// Raw JPEG bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Pixel height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Colour components: 1 gray, 3 RGB, 4 CMYK
    pub fn components(&self) -> u8 {
        self.components
    }

    /// MIME type for data URIs
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }
}

fn read_u16(bytes: &[u8], pos: usize) -> Option<u16> {
    let hi = *bytes.get(pos)?;
    let lo = *bytes.get(pos + 1)?;

    Some(u16::from_be_bytes([hi, lo]))
}

/// SOF0..SOF15, minus DHT, JPG and DAC.
fn is_frame_header(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Somewhere a logo can be loaded from.
pub trait LogoSource {
    /// Load the logo.
    async fn load(&self) -> Result<Logo, LogoError>;
}

/// A JPEG logo on disk.
#[derive(Debug, Clone)]
pub struct FileLogo {
    path: PathBuf,
}

impl FileLogo {
    /// Logo at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Configured path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogoSource for FileLogo {
    async fn load(&self) -> Result<Logo, LogoError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LogoError::Io {
                path: self.path.clone(),
                source,
            })?;

        Logo::from_jpeg(bytes)
    }
}

/// No logo configured; always renders the text header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLogo;

impl LogoSource for NoLogo {
    async fn load(&self) -> Result<Logo, LogoError> {
        Err(LogoError::NotConfigured)
    }
}

impl<S: LogoSource> LogoSource for Option<S> {
    async fn load(&self) -> Result<Logo, LogoError> {
        match self {
            Some(source) => source.load().await,
            None => Err(LogoError::NotConfigured),
        }
    }
}

/// Load a logo, giving up after `timeout`.
///
/// Failures are logged and yield `None`.
pub async fn resolve_logo<S: LogoSource>(source: &S, timeout: Duration) -> Option<Logo> {
    match tokio::time::timeout(timeout, source.load()).await {
        Ok(Ok(logo)) => {
            debug!(
                width = logo.width(),
                height = logo.height(),
                "loaded invoice logo"
            );

            Some(logo)
        }
        Ok(Err(LogoError::NotConfigured)) => None,
        Ok(Err(err)) => {
            warn!(error = %err, "invoice logo unavailable; using text header");

            None
        }
        Err(_elapsed) => {
            warn!(?timeout, "invoice logo timed out; using text header");

            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use super::*;

    /// Smallest structure the frame-header scan accepts: SOI, APP0, SOF0, EOI.
    pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];

        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);

        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&[
            0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01,
        ]);

        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn reads_frame_dimensions() -> TestResult {
        let logo = Logo::from_jpeg(tiny_jpeg(320, 80))?;

        assert_eq!(logo.width(), 320);
        assert_eq!(logo.height(), 80);
        assert_eq!(logo.components(), 3);

        Ok(())
    }

    #[test]
    fn rejects_png() {
        let png = b"\x89PNG\r\n\x1a\n".to_vec();

        assert!(matches!(Logo::from_jpeg(png), Err(LogoError::Unsupported)));
    }

    #[test]
    fn rejects_jpeg_without_frame() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xD9];

        assert!(matches!(Logo::from_jpeg(bytes), Err(LogoError::Truncated)));
    }

    #[tokio::test]
    async fn file_logo_loads_from_disk() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&tiny_jpeg(10, 20))?;

        let logo = resolve_logo(&FileLogo::new(file.path()), Duration::from_secs(5)).await;

        assert_eq!(logo.map(|logo| logo.height()), Some(20));

        Ok(())
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_none() {
        let source = FileLogo::new("/nonexistent/verdant/logo.jpg");

        assert_eq!(resolve_logo(&source, Duration::from_secs(5)).await, None);
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        struct Slow;

        impl LogoSource for Slow {
            async fn load(&self) -> Result<Logo, LogoError> {
                tokio::time::sleep(Duration::from_secs(60)).await;

                Logo::from_jpeg(tiny_jpeg(1, 1))
            }
        }

        assert_eq!(resolve_logo(&Slow, Duration::from_millis(10)).await, None);
    }

    #[tokio::test]
    async fn no_logo_is_none() {
        assert_eq!(resolve_logo(&NoLogo, Duration::from_secs(1)).await, None);
    }
}

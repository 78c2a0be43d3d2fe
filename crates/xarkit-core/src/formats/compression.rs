//! Data encodings for XAR heap members.
//!
//! Each member's `<data>` element names an encoding style (a MIME type). The
//! archiver picks it from its `--compression` flag; this module maps between
//! the two and decodes stored bytes back into file contents.
//!
//! # Supported Encodings
//!
//! | Style                      | Archiver flag | Decoder            |
//! |----------------------------|---------------|--------------------|
//! | `application/octet-stream` | `none`        | passthrough        |
//! | `application/x-gzip`       | `gzip`        | zlib stream        |
//! | `application/x-bzip2`      | `bzip2`       | bzip2              |
//! | `application/x-lzma`       | `lzma`        | lzma-alone         |
//! | `application/x-xz`         | `xz`          | xz                 |

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::Result;
use crate::XarError;

/// Compression choice passed to the archiver via `--compression=<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Store members uncompressed.
    None,
    /// Zlib/deflate, the archiver's default.
    Gzip,
    /// Bzip2 (Burrows-Wheeler).
    Bzip2,
    /// LZMA. Stock archiver builds on some platforms omit it.
    Lzma,
    /// Xz container.
    Xz,
}

impl Compression {
    /// Returns the flag value understood by the archiver.
    ///
    /// # Examples
    ///
    /// ```
    /// use xarkit_core::formats::compression::Compression;
    ///
    /// assert_eq!(Compression::Bzip2.name(), "bzip2");
    /// assert_eq!(Compression::Gzip.name(), "gzip");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Lzma => "lzma",
            Self::Xz => "xz",
        }
    }

    /// Returns the member encoding the archiver records for this choice.
    #[must_use]
    pub const fn encoding(self) -> Encoding {
        match self {
            Self::None => Encoding::OctetStream,
            Self::Gzip => Encoding::Gzip,
            Self::Bzip2 => Encoding::Bzip2,
            Self::Lzma => Encoding::Lzma,
            Self::Xz => Encoding::Xz,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = XarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "gzip" | "zlib" => Ok(Self::Gzip),
            "bzip2" => Ok(Self::Bzip2),
            "lzma" => Ok(Self::Lzma),
            "xz" => Ok(Self::Xz),
            _ => Err(XarError::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// Encoding of a member's stored bytes, as recorded in the TOC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Encoding {
    /// Raw bytes.
    OctetStream,
    /// Zlib stream (the style name says gzip, the bytes have no gzip header).
    Gzip,
    /// Bzip2 stream.
    Bzip2,
    /// Legacy `.lzma` stream.
    Lzma,
    /// Xz stream.
    Xz,
    /// Style this library does not know how to decode.
    Other(String),
}

impl Encoding {
    /// Parses a TOC `encoding style` attribute.
    #[must_use]
    pub fn from_style(style: &str) -> Self {
        match style.trim() {
            "application/octet-stream" => Self::OctetStream,
            "application/x-gzip" => Self::Gzip,
            "application/x-bzip2" => Self::Bzip2,
            "application/x-lzma" => Self::Lzma,
            "application/x-xz" => Self::Xz,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the TOC `style` attribute value.
    #[must_use]
    pub fn style(&self) -> &str {
        match self {
            Self::OctetStream => "application/octet-stream",
            Self::Gzip => "application/x-gzip",
            Self::Bzip2 => "application/x-bzip2",
            Self::Lzma => "application/x-lzma",
            Self::Xz => "application/x-xz",
            Self::Other(style) => style,
        }
    }

    /// Returns `true` if the stored bytes differ from the file contents.
    #[must_use]
    pub const fn is_compressed(&self) -> bool {
        !matches!(self, Self::OctetStream)
    }

    /// Decodes stored member bytes.
    ///
    /// At most `limit` decoded bytes are accepted; a stream that inflates past
    /// it is rejected rather than truncated.
    ///
    /// # Errors
    ///
    /// Returns `XarError::UnsupportedEncoding` for unknown styles,
    /// `XarError::CorruptData` when the stream is corrupt, and
    /// `XarError::QuotaExceeded` when the output would exceed `limit`.
    pub fn decode(&self, stored: &[u8], limit: u64) -> Result<Vec<u8>> {
        match self {
            Self::OctetStream => {
                check_limit(stored.len() as u64, limit)?;
                Ok(stored.to_vec())
            }
            Self::Gzip => read_bounded(flate2::read::ZlibDecoder::new(stored), limit, self),
            Self::Bzip2 => read_bounded(bzip2::read::BzDecoder::new(stored), limit, self),
            Self::Lzma => {
                let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX).map_err(|e| {
                    XarError::CorruptData(format!("failed to initialise lzma decoder: {e}"))
                })?;
                read_bounded(
                    xz2::read::XzDecoder::new_stream(stored, stream),
                    limit,
                    self,
                )
            }
            Self::Xz => read_bounded(xz2::read::XzDecoder::new(stored), limit, self),
            Self::Other(style) => Err(XarError::UnsupportedEncoding(style.clone())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style())
    }
}

fn check_limit(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(XarError::QuotaExceeded {
            resource: crate::error::QuotaResource::FileSize { size, max: limit },
        });
    }
    Ok(())
}

fn read_bounded<R: Read>(decoder: R, limit: u64, encoding: &Encoding) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decoder
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| XarError::CorruptData(format!("{encoding}: {e}")))?;
    check_limit(out.len() as u64, limit)?;
    Ok(out)
}

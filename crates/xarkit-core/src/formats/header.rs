//! XAR binary header.
//!
//! Layout (all integers big-endian):
//!
//! | Offset | Size | Field                          |
//! |--------|------|--------------------------------|
//! | 0      | 4    | magic `xar!`                   |
//! | 4      | 2    | header size                    |
//! | 6      | 2    | format version                 |
//! | 8      | 8    | TOC length, compressed         |
//! | 16     | 8    | TOC length, uncompressed       |
//! | 24     | 4    | TOC checksum algorithm code    |
//! | 28     | 36   | algorithm name (code 3 only)   |

use std::io::Read;

use crate::Result;
use crate::XarError;
use crate::formats::checksum::ChecksumAlgorithm;

/// Magic bytes at the start of every XAR archive.
pub const XAR_MAGIC: [u8; 4] = *b"xar!";

/// Size of the fixed header fields.
pub const MIN_HEADER_SIZE: u16 = 28;

/// Header size when the checksum algorithm is named explicitly.
pub const EXTENDED_HEADER_SIZE: u16 = 64;

/// Header code meaning "algorithm named in the extended header".
pub const CKSUM_OTHER: u32 = 3;

/// Parsed XAR header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XarHeader {
    /// Declared header size; the TOC starts right after it.
    pub size: u16,
    /// Format version, 1 for every archiver in circulation.
    pub version: u16,
    /// Length of the zlib-compressed TOC.
    pub toc_len_compressed: u64,
    /// Length of the TOC XML after inflation.
    pub toc_len_uncompressed: u64,
    /// Raw checksum algorithm code.
    pub checksum_code: u32,
    /// Algorithm name from the extended header, when `checksum_code == 3`.
    pub checksum_name: Option<String>,
}

impl XarHeader {
    /// Reads and validates a header from the start of `reader`.
    ///
    /// Consumes exactly `size` bytes so the reader is left at the TOC.
    ///
    /// # Errors
    ///
    /// Returns `XarError::NotXar` for a wrong magic and
    /// `XarError::InvalidHeader` for truncated or inconsistent headers.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fixed = [0u8; MIN_HEADER_SIZE as usize];
        read_exact_or(reader, &mut fixed, "header shorter than 28 bytes")?;

        if fixed[0..4] != XAR_MAGIC {
            return Err(XarError::NotXar);
        }

        let size = u16::from_be_bytes([fixed[4], fixed[5]]);
        let version = u16::from_be_bytes([fixed[6], fixed[7]]);
        let toc_len_compressed = u64::from_be_bytes(be_array(&fixed[8..16]));
        let toc_len_uncompressed = u64::from_be_bytes(be_array(&fixed[16..24]));
        let checksum_code = u32::from_be_bytes([fixed[24], fixed[25], fixed[26], fixed[27]]);

        if size < MIN_HEADER_SIZE {
            return Err(XarError::InvalidHeader(format!(
                "declared header size {size} is below the minimum {MIN_HEADER_SIZE}"
            )));
        }

        if toc_len_compressed == 0 {
            return Err(XarError::InvalidHeader(
                "table of contents is empty".to_string(),
            ));
        }

        let mut extra = vec![0u8; usize::from(size - MIN_HEADER_SIZE)];
        read_exact_or(reader, &mut extra, "header shorter than its declared size")?;

        let checksum_name = if checksum_code == CKSUM_OTHER {
            let name: Vec<u8> = extra.iter().copied().take_while(|&b| b != 0).collect();
            if name.is_empty() {
                return Err(XarError::InvalidHeader(
                    "checksum algorithm 3 without an algorithm name".to_string(),
                ));
            }
            Some(String::from_utf8_lossy(&name).into_owned())
        } else {
            None
        };

        log::debug!(
            "xar header: size={size} version={version} toc={toc_len_compressed}/{toc_len_uncompressed} cksum={checksum_code}"
        );

        Ok(Self {
            size,
            version,
            toc_len_compressed,
            toc_len_uncompressed,
            checksum_code,
            checksum_name,
        })
    }

    /// Returns the TOC checksum algorithm announced by the header.
    ///
    /// # Errors
    ///
    /// Returns `XarError::UnsupportedChecksum` for unknown codes or names.
    pub fn checksum_algorithm(&self) -> Result<ChecksumAlgorithm> {
        if let Some(alg) = ChecksumAlgorithm::from_header_code(self.checksum_code) {
            return Ok(alg);
        }
        match (&self.checksum_name, self.checksum_code) {
            (Some(name), CKSUM_OTHER) => name.parse(),
            _ => Err(XarError::UnsupportedChecksum(format!(
                "header code {}",
                self.checksum_code
            ))),
        }
    }

    /// Absolute file offset where the heap begins.
    #[must_use]
    pub fn heap_offset(&self) -> u64 {
        u64::from(self.size).saturating_add(self.toc_len_compressed)
    }

    /// Serializes the header, used by test archive builders.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(usize::from(self.size));
        out.extend_from_slice(&XAR_MAGIC);
        out.extend_from_slice(&self.size.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.toc_len_compressed.to_be_bytes());
        out.extend_from_slice(&self.toc_len_uncompressed.to_be_bytes());
        out.extend_from_slice(&self.checksum_code.to_be_bytes());
        if let Some(name) = &self.checksum_name {
            out.extend_from_slice(name.as_bytes());
        }
        out.resize(usize::from(self.size), 0);
        out
    }
}

fn be_array(bytes: &[u8]) -> [u8; 8] {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(bytes);
    arr
}

fn read_exact_or<R: Read>(reader: &mut R, buf: &mut [u8], msg: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            XarError::InvalidHeader(msg.to_string())
        } else {
            XarError::Io(e)
        }
    })
}

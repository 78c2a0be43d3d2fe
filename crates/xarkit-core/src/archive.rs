//! Random access to a XAR archive.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

use crate::Result;
use crate::XarError;
use crate::formats::ChecksumAlgorithm;
use crate::formats::XarHeader;
use crate::formats::checksum::to_hex;
use crate::formats::checksum::verify_hex;
use crate::toc::EntryData;
use crate::toc::Toc;
use crate::toc::XarEntry;

/// An open XAR archive.
///
/// Opening reads the header and the whole table of contents; member data is
/// read lazily from the heap on demand. Reads seek the underlying reader, so
/// they take `&mut self`.
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::XarArchive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = XarArchive::open("test.xar")?;
/// for name in archive.names() {
///     println!("{name}");
/// }
/// let bytes = archive.read_member_by_path("test.txt")?;
/// println!("{} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct XarArchive<R = BufReader<File>> {
    reader: R,
    header: XarHeader,
    toc: Toc,
    toc_compressed: Vec<u8>,
}

impl XarArchive<BufReader<File>> {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a well-formed
    /// XAR archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("opening {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> XarArchive<R> {
    /// Reads the header and table of contents from `reader`.
    ///
    /// The archive is expected to start at offset zero of the reader.
    ///
    /// # Errors
    ///
    /// Returns `XarError::NotXar`, `XarError::InvalidHeader`,
    /// `XarError::InvalidToc` or `XarError::TocLengthMismatch` for malformed
    /// archives, and `XarError::Io` for read failures.
    pub fn from_reader(mut reader: R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let header = XarHeader::read_from(&mut reader)?;

        let mut toc_compressed = Vec::new();
        reader
            .by_ref()
            .take(header.toc_len_compressed)
            .read_to_end(&mut toc_compressed)?;
        if (toc_compressed.len() as u64) < header.toc_len_compressed {
            return Err(XarError::InvalidToc(format!(
                "truncated: header declares {} compressed bytes, file holds {}",
                header.toc_len_compressed,
                toc_compressed.len()
            )));
        }

        let toc = Toc::inflate(&toc_compressed, header.toc_len_uncompressed)?;

        Ok(Self {
            reader,
            header,
            toc,
            toc_compressed,
        })
    }

    /// Returns the binary header.
    #[must_use]
    pub fn header(&self) -> &XarHeader {
        &self.header
    }

    /// Returns the parsed table of contents.
    #[must_use]
    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// Returns the member paths, depth-first, directories included.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.toc.walk().into_iter().map(|(path, _)| path).collect()
    }

    /// Returns every member with its path, depth-first.
    #[must_use]
    pub fn members(&self) -> Vec<(String, &XarEntry)> {
        self.toc.walk()
    }

    /// Looks up a regular file by its full `/`-joined path.
    ///
    /// Directories, links and other entry kinds are not returned; use
    /// [`Self::members`] to reach those.
    #[must_use]
    pub fn member(&self, path: &str) -> Option<&XarEntry> {
        let path = path.trim_matches('/');
        self.toc
            .walk()
            .into_iter()
            .find(|(p, entry)| p == path && entry.is_file())
            .map(|(_, entry)| entry)
    }

    /// Returns `true` if any entry, at any depth, is called `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.toc.walk().iter().any(|(_, entry)| entry.name == name)
    }

    /// Reads, verifies and decodes the data of `entry`.
    ///
    /// The archived checksum is checked against the stored bytes before
    /// decoding, and the extracted checksum, when present, against the
    /// decoded bytes. Entries without data yield an empty buffer.
    ///
    /// `entry` normally comes from a clone of [`Self::toc`], because the
    /// archive is borrowed mutably for the read.
    ///
    /// # Errors
    ///
    /// Returns `XarError::ChecksumMismatch` on tampered data,
    /// `XarError::CorruptData` for truncated or undecodable data, and
    /// `XarError::QuotaExceeded` if the decoded size exceeds `limit`.
    pub fn read_member(&mut self, entry: &XarEntry, limit: u64) -> Result<Vec<u8>> {
        match &entry.data {
            Some(data) => self.read_data(&entry.name, data, limit, true),
            None => Ok(Vec::new()),
        }
    }

    /// Reads and decodes the data of `entry` without checking checksums.
    ///
    /// # Errors
    ///
    /// Returns `XarError::CorruptData` for truncated or undecodable data and
    /// `XarError::QuotaExceeded` if the decoded size exceeds `limit`.
    pub fn read_member_unverified(&mut self, entry: &XarEntry, limit: u64) -> Result<Vec<u8>> {
        match &entry.data {
            Some(data) => self.read_data(&entry.name, data, limit, false),
            None => Ok(Vec::new()),
        }
    }

    /// Reads a member by path with no size limit.
    ///
    /// # Errors
    ///
    /// Returns `XarError::MemberNotFound` if no file has that path, plus
    /// everything [`Self::read_member`] returns.
    pub fn read_member_by_path(&mut self, path: &str) -> Result<Vec<u8>> {
        let data = self
            .member(path)
            .ok_or_else(|| XarError::MemberNotFound(path.to_string()))?
            .data
            .clone();
        match data {
            Some(data) => self.read_data(path, &data, u64::MAX, true),
            None => Ok(Vec::new()),
        }
    }

    /// Verifies the table-of-contents checksum stored in the heap.
    ///
    /// Returns the algorithm that was checked, or `None` if the archive
    /// carries no TOC checksum.
    ///
    /// # Errors
    ///
    /// Returns `XarError::ChecksumMismatch` if the stored digest does not
    /// match the compressed TOC, and `XarError::UnsupportedChecksum` for
    /// styles that cannot be computed.
    pub fn verify_toc_checksum(&mut self) -> Result<Option<ChecksumAlgorithm>> {
        let Some(location) = self.toc.checksum.clone() else {
            return Ok(None);
        };
        let algorithm = location.algorithm()?;
        if algorithm == ChecksumAlgorithm::None {
            return Ok(None);
        }

        if let Ok(announced) = self.header.checksum_algorithm()
            && announced != algorithm
        {
            log::warn!("header announces {announced} but toc checksum style is {algorithm}");
        }

        let stored = self.read_heap(location.offset, location.size, "toc checksum")?;
        verify_hex(
            algorithm,
            &self.toc_compressed,
            &to_hex(&stored),
            "table of contents",
        )?;
        Ok(Some(algorithm))
    }

    fn read_data(
        &mut self,
        subject: &str,
        data: &EntryData,
        limit: u64,
        verify: bool,
    ) -> Result<Vec<u8>> {
        if data.size > limit {
            return Err(XarError::QuotaExceeded {
                resource: crate::QuotaResource::FileSize {
                    size: data.size,
                    max: limit,
                },
            });
        }

        let stored = self.read_heap(data.offset, data.length, subject)?;

        if verify && let Some(checksum) = &data.archived_checksum {
            verify_hex(checksum.algorithm()?, &stored, &checksum.value, subject)?;
        }

        // `data.size <= limit` here, so the declared size is the tighter bound.
        let decoded = data
            .encoding
            .decode(&stored, data.size)
            .map_err(|e| match e {
                XarError::QuotaExceeded { .. } => XarError::CorruptData(format!(
                    "{subject}: decodes to more than the {} bytes the table of contents declares",
                    data.size
                )),
                other => other,
            })?;
        if decoded.len() as u64 != data.size {
            return Err(XarError::CorruptData(format!(
                "{subject}: decoded {} bytes, table of contents says {}",
                decoded.len(),
                data.size
            )));
        }

        if verify && let Some(checksum) = &data.extracted_checksum {
            verify_hex(checksum.algorithm()?, &decoded, &checksum.value, subject)?;
        }

        log::debug!(
            "read {subject}: {} stored bytes, {} decoded ({})",
            stored.len(),
            decoded.len(),
            data.encoding
        );
        Ok(decoded)
    }

    fn read_heap(&mut self, offset: u64, length: u64, subject: &str) -> Result<Vec<u8>> {
        let start = self
            .header
            .heap_offset()
            .checked_add(offset)
            .ok_or_else(|| XarError::CorruptData(format!("{subject}: heap offset overflows")))?;
        self.reader.seek(SeekFrom::Start(start))?;

        let mut buf = Vec::new();
        self.reader.by_ref().take(length).read_to_end(&mut buf)?;
        if (buf.len() as u64) < length {
            return Err(XarError::CorruptData(format!(
                "{subject}: heap holds {} of {length} bytes",
                buf.len()
            )));
        }
        Ok(buf)
    }
}

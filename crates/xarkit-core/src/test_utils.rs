//! Test utilities for building XAR archives in memory.
//!
//! The archives produced here have the same layout the `xar` tool writes:
//! header, zlib TOC, heap starting with the TOC checksum, then member data.
//! They let reader and extraction tests run without the external archiver.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fmt::Write as _;
use std::io::Write;

use crate::formats::ChecksumAlgorithm;
use crate::formats::Encoding;
use crate::formats::XarHeader;
use crate::formats::header::CKSUM_OTHER;
use crate::formats::header::EXTENDED_HEADER_SIZE;
use crate::formats::header::MIN_HEADER_SIZE;

const FIXED_TIME: &str = "2017-05-01T10:00:00Z";

#[derive(Debug, Clone)]
enum NodeKind {
    File { data: Vec<u8>, mode: u32 },
    Directory,
    Symlink(String),
    Special(String),
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: NodeKind,
    children: Vec<Self>,
}

/// Builder for XAR test archives.
///
/// Paths containing `/` create intermediate directories on demand.
///
/// # Examples
///
/// ```
/// use xarkit_core::XarArchive;
/// use xarkit_core::test_utils::XarTestBuilder;
///
/// let bytes = XarTestBuilder::new()
///     .add_file("test.txt", b"content")
///     .add_directory("dir")
///     .add_symlink("dir/link", "../test.txt")
///     .build();
/// let archive = XarArchive::from_reader(std::io::Cursor::new(bytes)).unwrap();
/// assert!(archive.contains("link"));
/// ```
#[derive(Debug, Clone)]
pub struct XarTestBuilder {
    toc_checksum: ChecksumAlgorithm,
    file_checksum: ChecksumAlgorithm,
    encoding: Encoding,
    entries: Vec<Node>,
    tamper_heap: bool,
    tamper_toc_checksum: bool,
}

impl XarTestBuilder {
    /// Creates a builder with the `xar` tool defaults: sha1 TOC checksum,
    /// sha1 file checksums, gzip encoding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            toc_checksum: ChecksumAlgorithm::Sha1,
            file_checksum: ChecksumAlgorithm::Sha1,
            encoding: Encoding::Gzip,
            entries: Vec::new(),
            tamper_heap: false,
            tamper_toc_checksum: false,
        }
    }

    /// Sets the TOC checksum algorithm.
    #[must_use]
    pub fn toc_checksum(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.toc_checksum = algorithm;
        self
    }

    /// Sets the per-file checksum algorithm.
    #[must_use]
    pub fn file_checksum(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.file_checksum = algorithm;
        self
    }

    /// Sets the encoding used for member data added afterwards and before.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        self.insert(
            path,
            NodeKind::File {
                data: data.to_vec(),
                mode,
            },
        );
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        self.insert(path, NodeKind::Directory);
        self
    }

    /// Adds a symlink pointing at `target`.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        self.insert(path, NodeKind::Symlink(target.to_string()));
        self
    }

    /// Adds an entry of an arbitrary `<type>`, e.g. `fifo` or `hardlink`.
    #[must_use]
    pub fn add_special(mut self, path: &str, kind: &str) -> Self {
        self.insert(path, NodeKind::Special(kind.to_string()));
        self
    }

    /// Adds a top-level file whose `<name>` is used verbatim, without
    /// splitting on `/`. Used to model hostile archives.
    #[must_use]
    pub fn add_raw_file(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(Node {
            name: name.to_string(),
            kind: NodeKind::File {
                data: data.to_vec(),
                mode: 0o644,
            },
            children: Vec::new(),
        });
        self
    }

    /// Flips the last heap byte so the last member fails verification.
    #[must_use]
    pub fn tamper_heap(mut self) -> Self {
        self.tamper_heap = true;
        self
    }

    /// Corrupts the stored TOC checksum.
    #[must_use]
    pub fn tamper_toc_checksum(mut self) -> Self {
        self.tamper_toc_checksum = true;
        self
    }

    fn insert(&mut self, path: &str, kind: NodeKind) {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };

        let mut level = &mut self.entries;
        for part in parents {
            let idx = match level.iter().position(|n| n.name == *part) {
                Some(idx) => idx,
                None => {
                    level.push(Node {
                        name: (*part).to_string(),
                        kind: NodeKind::Directory,
                        children: Vec::new(),
                    });
                    level.len() - 1
                }
            };
            level = &mut level[idx].children;
        }

        if let Some(existing) = level.iter_mut().find(|n| n.name == *last) {
            existing.kind = kind;
        } else {
            level.push(Node {
                name: (*last).to_string(),
                kind,
                children: Vec::new(),
            });
        }
    }

    /// Builds the archive bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let cksum_len = self.toc_checksum.digest_len();
        let mut heap = vec![0u8; cksum_len];

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xar>\n <toc>\n");
        if self.toc_checksum != ChecksumAlgorithm::None {
            writeln!(
                xml,
                "  <checksum style=\"{}\">\n   <offset>0</offset>\n   <size>{cksum_len}</size>\n  </checksum>",
                self.toc_checksum.name()
            )
            .unwrap();
        }
        writeln!(xml, "  <creation-time>{FIXED_TIME}</creation-time>").unwrap();

        let mut next_id = 1u64;
        for node in &self.entries {
            self.write_node(node, 2, &mut next_id, &mut heap, &mut xml);
        }
        xml.push_str(" </toc>\n</xar>\n");

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(xml.as_bytes()).unwrap();
        let toc = encoder.finish().unwrap();

        if cksum_len > 0 {
            let digest = self.toc_checksum.digest(&toc);
            heap[..cksum_len].copy_from_slice(&digest);
            if self.tamper_toc_checksum {
                heap[0] ^= 0xff;
            }
        }
        if self.tamper_heap
            && let Some(last) = heap.last_mut()
        {
            *last ^= 0xff;
        }

        let (checksum_code, checksum_name, size) = match self.toc_checksum {
            ChecksumAlgorithm::None => (0, None, MIN_HEADER_SIZE),
            ChecksumAlgorithm::Sha1 => (1, None, MIN_HEADER_SIZE),
            ChecksumAlgorithm::Md5 => (2, None, MIN_HEADER_SIZE),
            other => (
                CKSUM_OTHER,
                Some(other.name().to_string()),
                EXTENDED_HEADER_SIZE,
            ),
        };
        let header = XarHeader {
            size,
            version: 1,
            toc_len_compressed: toc.len() as u64,
            toc_len_uncompressed: xml.len() as u64,
            checksum_code,
            checksum_name,
        };

        let mut out = header.to_bytes();
        out.extend_from_slice(&toc);
        out.extend_from_slice(&heap);
        out
    }

    fn write_node(
        &self,
        node: &Node,
        depth: usize,
        next_id: &mut u64,
        heap: &mut Vec<u8>,
        xml: &mut String,
    ) {
        let pad = " ".repeat(depth);
        writeln!(xml, "{pad}<file id=\"{next_id}\">").unwrap();
        *next_id += 1;

        let (type_name, mode) = match &node.kind {
            NodeKind::File { mode, .. } => ("file", *mode),
            NodeKind::Directory => ("directory", 0o755),
            NodeKind::Symlink(_) => ("symlink", 0o755),
            NodeKind::Special(kind) => (kind.as_str(), 0o644),
        };

        if let NodeKind::File { data, .. } = &node.kind {
            let stored = encode(&self.encoding, data);
            let offset = heap.len();
            heap.extend_from_slice(&stored);

            writeln!(xml, "{pad} <data>").unwrap();
            writeln!(xml, "{pad}  <length>{}</length>", stored.len()).unwrap();
            writeln!(xml, "{pad}  <offset>{offset}</offset>").unwrap();
            writeln!(xml, "{pad}  <size>{}</size>", data.len()).unwrap();
            writeln!(
                xml,
                "{pad}  <encoding style=\"{}\"/>",
                self.encoding.style()
            )
            .unwrap();
            if self.file_checksum != ChecksumAlgorithm::None {
                let style = self.file_checksum.name();
                writeln!(
                    xml,
                    "{pad}  <extracted-checksum style=\"{style}\">{}</extracted-checksum>",
                    self.file_checksum.hex_digest(data)
                )
                .unwrap();
                writeln!(
                    xml,
                    "{pad}  <archived-checksum style=\"{style}\">{}</archived-checksum>",
                    self.file_checksum.hex_digest(&stored)
                )
                .unwrap();
            }
            writeln!(xml, "{pad} </data>").unwrap();
        }

        writeln!(xml, "{pad} <mtime>{FIXED_TIME}</mtime>").unwrap();
        writeln!(xml, "{pad} <atime>{FIXED_TIME}</atime>").unwrap();
        writeln!(xml, "{pad} <mode>{mode:04o}</mode>").unwrap();
        writeln!(xml, "{pad} <type>{type_name}</type>").unwrap();
        writeln!(xml, "{pad} <name>{}</name>", escape(&node.name)).unwrap();
        if let NodeKind::Symlink(target) = &node.kind {
            writeln!(xml, "{pad} <link type=\"file\">{}</link>", escape(target)).unwrap();
        }

        for child in &node.children {
            self.write_node(child, depth + 1, next_id, heap, xml);
        }
        writeln!(xml, "{pad}</file>").unwrap();
    }
}

impl Default for XarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a default archive holding a single `test.txt`, like the plain
/// `test.xar` fixture.
#[must_use]
pub fn create_test_xar(content: &[u8]) -> Vec<u8> {
    XarTestBuilder::new().add_file("test.txt", content).build()
}

fn encode(encoding: &Encoding, data: &[u8]) -> Vec<u8> {
    match encoding {
        Encoding::OctetStream | Encoding::Other(_) => data.to_vec(),
        Encoding::Gzip => {
            let mut enc =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
        Encoding::Bzip2 => {
            let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
        Encoding::Lzma => {
            let options = xz2::stream::LzmaOptions::new_preset(6).unwrap();
            let stream = xz2::stream::Stream::new_lzma_encoder(&options).unwrap();
            let mut enc = xz2::write::XzEncoder::new_stream(Vec::new(), stream);
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
        Encoding::Xz => {
            let mut enc = xz2::write::XzEncoder::new(Vec::new(), 6);
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

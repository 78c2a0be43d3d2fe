//! The XML table of contents.
//!
//! The TOC is stored right after the header as a zlib stream. Once inflated it
//! looks like:
//!
//! ```xml
//! <xar>
//!   <toc>
//!     <checksum style="sha1"><offset>0</offset><size>20</size></checksum>
//!     <creation-time>2017-05-01T10:00:00Z</creation-time>
//!     <file id="1">
//!       <name>test.txt</name>
//!       <type>file</type>
//!       <data>...</data>
//!     </file>
//!   </toc>
//! </xar>
//! ```
//!
//! Parsing turns the document into owned [`Toc`] and [`XarEntry`] values so
//! the XML buffer does not have to outlive the parse.

pub mod entry;

use std::io::Read;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use roxmltree::Node;

use crate::Result;
use crate::XarError;
use crate::formats::ChecksumAlgorithm;
use crate::formats::Encoding;

pub use entry::EntryChecksum;
pub use entry::EntryData;
pub use entry::EntryKind;
pub use entry::XarEntry;

/// Upper bound on the inflated TOC size.
pub const MAX_TOC_SIZE: u64 = 64 * 1024 * 1024;

/// Upper bound on element nesting in the TOC XML.
///
/// Each nested `<file>` adds one level, so this also caps member path depth.
pub const MAX_TOC_DEPTH: usize = 256;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Where the TOC checksum lives in the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocChecksum {
    /// `style` attribute, e.g. `sha256`.
    pub style: String,
    /// Offset relative to the heap start.
    pub offset: u64,
    /// Digest length in bytes.
    pub size: u64,
}

impl TocChecksum {
    /// Resolves the style into a computable algorithm.
    ///
    /// # Errors
    ///
    /// Returns `XarError::UnsupportedChecksum` for unknown styles.
    pub fn algorithm(&self) -> Result<ChecksumAlgorithm> {
        self.style.parse()
    }
}

/// Parsed table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    /// Archive creation time.
    pub creation_time: Option<DateTime<Utc>>,
    /// TOC checksum location, absent for unchecksummed archives.
    pub checksum: Option<TocChecksum>,
    /// Signature styles found (`signature` and Apple `x-signature`).
    pub signatures: Vec<String>,
    /// Top-level entries in document order.
    pub entries: Vec<XarEntry>,
    xml: String,
}

impl Toc {
    /// Inflates a compressed TOC and parses it.
    ///
    /// # Errors
    ///
    /// Returns `XarError::InvalidToc` if the stream is corrupt, too large or
    /// not valid XML, and `XarError::TocLengthMismatch` if the inflated size
    /// differs from `expected_len`.
    pub fn inflate(compressed: &[u8], expected_len: u64) -> Result<Self> {
        if expected_len > MAX_TOC_SIZE {
            return Err(XarError::InvalidToc(format!(
                "declared size {expected_len} exceeds the {MAX_TOC_SIZE} byte limit"
            )));
        }

        let mut xml = Vec::new();
        flate2::read::ZlibDecoder::new(compressed)
            .take(MAX_TOC_SIZE + 1)
            .read_to_end(&mut xml)
            .map_err(|e| XarError::InvalidToc(format!("failed to inflate: {e}")))?;

        let actual = xml.len() as u64;
        if actual != expected_len {
            return Err(XarError::TocLengthMismatch {
                expected: expected_len,
                actual,
            });
        }

        let xml = String::from_utf8(xml)
            .map_err(|e| XarError::InvalidToc(format!("not valid UTF-8: {e}")))?;
        Self::parse(xml)
    }

    /// Parses TOC XML.
    ///
    /// # Errors
    ///
    /// Returns `XarError::InvalidToc` for malformed XML, a missing
    /// `<xar><toc>` structure, nesting deeper than [`MAX_TOC_DEPTH`], or
    /// unparseable numeric fields.
    pub fn parse(xml: String) -> Result<Self> {
        check_nesting(&xml)?;

        let (creation_time, checksum, signatures, entries) = {
            let doc = roxmltree::Document::parse(&xml)
                .map_err(|e| XarError::InvalidToc(e.to_string()))?;

            let root = doc.root_element();
            if root.tag_name().name() != "xar" {
                return Err(XarError::InvalidToc(format!(
                    "root element is <{}>, expected <xar>",
                    root.tag_name().name()
                )));
            }
            let toc = child(root, "toc")
                .ok_or_else(|| XarError::InvalidToc("missing <toc> element".to_string()))?;

            let creation_time = child_text(toc, "creation-time").and_then(parse_time);
            let checksum = child(toc, "checksum").map(parse_toc_checksum).transpose()?;
            let signatures = elements(toc)
                .filter(|n| matches!(n.tag_name().name(), "signature" | "x-signature"))
                .map(|n| n.attribute("style").unwrap_or("unknown").to_string())
                .collect();
            let entries = parse_entries(toc)?;

            (creation_time, checksum, signatures, entries)
        };

        log::debug!(
            "parsed toc: {} top-level entries, checksum={:?}",
            entries.len(),
            checksum.as_ref().map(|c| c.style.as_str())
        );

        Ok(Self {
            creation_time,
            checksum,
            signatures,
            entries,
            xml,
        })
    }

    /// Returns the TOC XML exactly as stored.
    #[must_use]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Returns `true` if the TOC carries any signature element.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Walks the entry tree depth-first, parents before children.
    ///
    /// Each item pairs the entry with its path, the names of its ancestors
    /// and itself joined with `/`.
    #[must_use]
    pub fn walk(&self) -> Vec<(String, &XarEntry)> {
        let mut out = Vec::new();
        walk_into(&self.entries, "", &mut out);
        out
    }
}

fn walk_into<'a>(entries: &'a [XarEntry], prefix: &str, out: &mut Vec<(String, &'a XarEntry)>) {
    for entry in entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        out.push((path.clone(), entry));
        walk_into(&entry.children, &path, out);
    }
}

/// Rejects documents nested deeper than [`MAX_TOC_DEPTH`].
///
/// Runs before the DOM parse, which recurses once per level.
fn check_nesting(xml: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        rest = &rest[open..];
        let skip_to = if rest.starts_with("<!--") {
            "-->"
        } else if rest.starts_with("<![CDATA[") {
            "]]>"
        } else {
            ">"
        };
        let Some(close) = rest.find(skip_to) else {
            // Unterminated markup is left for the XML parser to report.
            return Ok(());
        };
        let tag = &rest[..close];
        rest = &rest[close + skip_to.len()..];

        if tag.starts_with("</") {
            depth = depth.saturating_sub(1);
        } else if !(tag.starts_with("<?") || tag.starts_with("<!") || tag.ends_with('/')) {
            depth += 1;
            if depth > MAX_TOC_DEPTH {
                return Err(XarError::InvalidToc(format!(
                    "elements nested deeper than {MAX_TOC_DEPTH} levels"
                )));
            }
        }
    }
    Ok(())
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text()).map(str::trim)
}

fn parse_u64(node: Node<'_, '_>, name: &str) -> Result<Option<u64>> {
    child_text(node, name)
        .map(|text| {
            text.parse::<u64>().map_err(|e| {
                XarError::InvalidToc(format!("<{name}> is not a number ({text:?}): {e}"))
            })
        })
        .transpose()
}

fn parse_u32(node: Node<'_, '_>, name: &str) -> Result<Option<u32>> {
    child_text(node, name)
        .map(|text| {
            text.parse::<u32>().map_err(|e| {
                XarError::InvalidToc(format!("<{name}> is not a number ({text:?}): {e}"))
            })
        })
        .transpose()
}

fn require_u64(node: Node<'_, '_>, name: &str, context: &str) -> Result<u64> {
    parse_u64(node, name)?
        .ok_or_else(|| XarError::InvalidToc(format!("{context} is missing <{name}>")))
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(text, TIME_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                log::debug!("ignoring unparseable timestamp {text:?}: {e}");
                None
            }
        },
    }
}

fn parse_toc_checksum(node: Node<'_, '_>) -> Result<TocChecksum> {
    let style = node
        .attribute("style")
        .ok_or_else(|| XarError::InvalidToc("<checksum> without a style".to_string()))?;
    Ok(TocChecksum {
        style: style.to_string(),
        offset: require_u64(node, "offset", "<checksum>")?,
        size: require_u64(node, "size", "<checksum>")?,
    })
}

fn parse_entry_checksum(node: Node<'_, '_>) -> EntryChecksum {
    EntryChecksum {
        style: node.attribute("style").unwrap_or("none").to_string(),
        value: node.text().unwrap_or_default().trim().to_string(),
    }
}

fn parse_data(node: Node<'_, '_>) -> Result<EntryData> {
    let encoding = child(node, "encoding")
        .and_then(|n| n.attribute("style"))
        .map_or(Encoding::OctetStream, Encoding::from_style);

    Ok(EntryData {
        length: require_u64(node, "length", "<data>")?,
        offset: require_u64(node, "offset", "<data>")?,
        size: require_u64(node, "size", "<data>")?,
        encoding,
        archived_checksum: child(node, "archived-checksum").map(parse_entry_checksum),
        extracted_checksum: child(node, "extracted-checksum").map(parse_entry_checksum),
    })
}

fn parse_mode(text: &str) -> Result<u32> {
    u32::from_str_radix(text, 8)
        .map_err(|e| XarError::InvalidToc(format!("<mode> is not octal ({text:?}): {e}")))
}

fn parse_entry(node: Node<'_, '_>) -> Result<XarEntry> {
    let id = node.attribute("id").unwrap_or_default();
    let name = child_text(node, "name")
        .ok_or_else(|| XarError::InvalidToc(format!("<file id={id:?}> has no <name>")))?;
    let kind = child_text(node, "type").map_or(EntryKind::File, EntryKind::from_type);

    let mut entry = XarEntry::new(id, name, kind);
    entry.mode = child_text(node, "mode").map(parse_mode).transpose()?;
    entry.uid = parse_u32(node, "uid")?;
    entry.gid = parse_u32(node, "gid")?;
    entry.user = child_text(node, "user").map(str::to_string);
    entry.group = child_text(node, "group").map(str::to_string);
    entry.atime = child_text(node, "atime").and_then(parse_time);
    entry.mtime = child_text(node, "mtime").and_then(parse_time);
    entry.ctime = child_text(node, "ctime").and_then(parse_time);
    entry.link = child_text(node, "link").map(str::to_string);
    entry.data = child(node, "data").map(parse_data).transpose()?;
    entry.children = parse_entries(node)?;
    Ok(entry)
}

fn parse_entries(parent: Node<'_, '_>) -> Result<Vec<XarEntry>> {
    elements(parent)
        .filter(|n| n.tag_name().name() == "file")
        .map(parse_entry)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xar>
 <toc>
  <checksum style="sha256">
   <offset>0</offset>
   <size>32</size>
  </checksum>
  <creation-time>2017-05-01T10:00:00Z</creation-time>
  <file id="1">
   <data>
    <length>29</length>
    <offset>32</offset>
    <size>21</size>
    <encoding style="application/x-gzip"/>
    <extracted-checksum style="sha1">aaaa</extracted-checksum>
    <archived-checksum style="sha1">bbbb</archived-checksum>
   </data>
   <mtime>2017-05-01T09:59:00Z</mtime>
   <atime>2017-05-01T09:58:00Z</atime>
   <group>staff</group>
   <gid>20</gid>
   <user>admin</user>
   <uid>501</uid>
   <mode>0644</mode>
   <type>file</type>
   <name>test.txt</name>
  </file>
  <file id="2">
   <type>directory</type>
   <name>docs</name>
   <mode>0755</mode>
   <file id="3">
    <type>symlink</type>
    <name>link</name>
    <link type="file">../test.txt</link>
   </file>
  </file>
 </toc>
</xar>"#;

    #[test]
    fn test_parse_sample() {
        let toc = Toc::parse(SAMPLE.to_string()).unwrap();

        let checksum = toc.checksum.as_ref().unwrap();
        assert_eq!(checksum.style, "sha256");
        assert_eq!(checksum.offset, 0);
        assert_eq!(checksum.size, 32);
        assert_eq!(checksum.algorithm().unwrap(), ChecksumAlgorithm::Sha256);
        assert!(toc.creation_time.is_some());
        assert!(!toc.is_signed());

        assert_eq!(toc.entries.len(), 2);
        let file = &toc.entries[0];
        assert_eq!(file.id, "1");
        assert_eq!(file.name, "test.txt");
        assert!(file.is_file());
        assert_eq!(file.mode, Some(0o644));
        assert_eq!(file.uid, Some(501));
        assert_eq!(file.gid, Some(20));
        assert_eq!(file.user.as_deref(), Some("admin"));
        assert_eq!(file.group.as_deref(), Some("staff"));
        assert!(file.mtime.is_some());
        assert!(file.atime.is_some());
        assert!(file.ctime.is_none());

        let data = file.data.as_ref().unwrap();
        assert_eq!(data.length, 29);
        assert_eq!(data.offset, 32);
        assert_eq!(data.size, 21);
        assert_eq!(data.encoding, Encoding::Gzip);
        assert_eq!(data.archived_checksum.as_ref().unwrap().value, "bbbb");
        assert_eq!(data.extracted_checksum.as_ref().unwrap().style, "sha1");

        let dir = &toc.entries[1];
        assert!(dir.is_dir());
        assert_eq!(dir.children.len(), 1);
        assert_eq!(dir.children[0].kind, EntryKind::Symlink);
        assert_eq!(dir.children[0].link.as_deref(), Some("../test.txt"));
    }

    #[test]
    fn test_walk_depth_first() {
        let toc = Toc::parse(SAMPLE.to_string()).unwrap();
        let paths: Vec<String> = toc.walk().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["test.txt", "docs", "docs/link"]);
    }

    #[test]
    fn test_xml_retained() {
        let toc = Toc::parse(SAMPLE.to_string()).unwrap();
        assert_eq!(toc.xml(), SAMPLE);
    }

    #[test]
    fn test_signatures_detected() {
        let xml = r#"<xar><toc><signature style="RSA"/><x-signature style="CMS"/></toc></xar>"#;
        let toc = Toc::parse(xml.to_string()).unwrap();
        assert!(toc.is_signed());
        assert_eq!(toc.signatures, vec!["RSA".to_string(), "CMS".to_string()]);
    }

    #[test]
    fn test_wrong_root() {
        let result = Toc::parse("<zip><toc/></zip>".to_string());
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    #[test]
    fn test_missing_toc() {
        let result = Toc::parse("<xar/>".to_string());
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    #[test]
    fn test_malformed_xml() {
        let result = Toc::parse("<xar><toc>".to_string());
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    fn nested_files(levels: usize) -> String {
        let mut xml = String::from("<xar><toc>");
        for i in 0..levels {
            xml.push_str(&format!("<file id=\"{i}\"><name>d</name><type>directory</type>"));
        }
        xml.push_str(&"</file>".repeat(levels));
        xml.push_str("</toc></xar>");
        xml
    }

    #[test]
    fn test_deep_nesting_rejected_before_dom_parse() {
        let result = Toc::parse(nested_files(200_000));
        assert!(matches!(result, Err(XarError::InvalidToc(msg)) if msg.contains("nested")));
    }

    #[test]
    fn test_moderate_nesting_accepted() {
        let toc = Toc::parse(nested_files(100)).unwrap();
        let walked = toc.walk();
        assert_eq!(walked.len(), 100);
        assert_eq!(walked[99].0.split('/').count(), 100);
    }

    #[test]
    fn test_self_closing_and_comments_do_not_nest() {
        let mut xml = String::from("<xar><toc>");
        for _ in 0..(MAX_TOC_DEPTH * 2) {
            xml.push_str("<signature style=\"RSA\"/><!-- <x> -->");
        }
        xml.push_str("</toc></xar>");
        assert!(Toc::parse(xml).is_ok());
    }

    #[test]
    fn test_bad_number() {
        let xml = "<xar><toc><file id=\"1\"><name>a</name><uid>root</uid></file></toc></xar>";
        let result = Toc::parse(xml.to_string());
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    #[test]
    fn test_missing_data_offset() {
        let xml = "<xar><toc><file id=\"1\"><name>a</name><data><length>1</length><size>1</size></data></file></toc></xar>";
        let result = Toc::parse(xml.to_string());
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    #[test]
    fn test_entry_without_name() {
        let xml = "<xar><toc><file id=\"1\"><type>file</type></file></toc></xar>";
        assert!(Toc::parse(xml.to_string()).is_err());
    }

    #[test]
    fn test_inflate_roundtrip_length_check() {
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(SAMPLE.as_bytes()).unwrap();
        let compressed = enc.finish().unwrap();

        let toc = Toc::inflate(&compressed, SAMPLE.len() as u64).unwrap();
        assert_eq!(toc.entries.len(), 2);

        let result = Toc::inflate(&compressed, SAMPLE.len() as u64 + 1);
        assert!(matches!(result, Err(XarError::TocLengthMismatch { .. })));
    }

    #[test]
    fn test_inflate_garbage() {
        let result = Toc::inflate(b"not zlib at all", 10);
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    #[test]
    fn test_inflate_oversized_declaration() {
        let result = Toc::inflate(b"", MAX_TOC_SIZE + 1);
        assert!(matches!(result, Err(XarError::InvalidToc(_))));
    }

    #[test]
    fn test_parse_time_formats() {
        assert!(parse_time("2017-05-01T10:00:00Z").is_some());
        assert!(parse_time("2017-05-01T10:00:00.5+00:00").is_some());
        assert!(parse_time("yesterday").is_none());
    }
}

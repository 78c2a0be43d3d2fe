//! XAR binary format primitives.

pub mod checksum;
pub mod compression;
pub mod detect;
pub mod header;

// Re-export main types for convenience
pub use checksum::ChecksumAlgorithm;
pub use compression::Compression;
pub use compression::Encoding;
pub use detect::is_xar_file;
pub use header::XarHeader;

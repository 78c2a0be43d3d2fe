//! Property-based tests for the reader and the extraction safety checks.
//!
//! These tests use proptest to feed arbitrary bytes and names through the
//! parsers and validators and check that they never panic and never accept
//! unsafe input.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;
use std::path::Path;

use proptest::prelude::*;
use xarkit_core::ExtractConfig;
use xarkit_core::XarArchive;
use xarkit_core::formats::ChecksumAlgorithm;
use xarkit_core::formats::XarHeader;
use xarkit_core::security::QuotaTracker;
use xarkit_core::security::symlink_stays_inside;
use xarkit_core::security::validate_entry_name;
use xarkit_core::test_utils::create_test_xar;

proptest! {
    /// Header parsing returns an error instead of panicking on garbage.
    #[test]
    fn prop_header_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        let _ = XarHeader::read_from(&mut Cursor::new(bytes));
    }

    /// Headers with the right magic but random fields never panic either.
    #[test]
    fn prop_magic_prefixed_header_never_panics(
        rest in prop::collection::vec(any::<u8>(), 0..96)
    ) {
        let mut bytes = b"xar!".to_vec();
        bytes.extend(rest);
        let _ = XarArchive::from_reader(Cursor::new(bytes));
    }

    /// Flipping any single byte of a valid archive never panics the reader.
    #[test]
    fn prop_corrupted_archive_never_panics(index in any::<prop::sample::Index>(), mask in 1u8..) {
        let mut bytes = create_test_xar(b"property test content");
        let i = index.index(bytes.len());
        bytes[i] ^= mask;
        if let Ok(mut archive) = XarArchive::from_reader(Cursor::new(bytes)) {
            let _ = archive.verify_toc_checksum();
            let _ = archive.read_member_by_path("test.txt");
        }
    }

    /// Any name containing a separator is rejected.
    #[test]
    fn prop_names_with_separators_rejected(
        prefix in "[a-z]{0,8}",
        sep in prop::sample::select(vec!["/", "\\", "\0"]),
        suffix in "[a-z]{0,8}"
    ) {
        let name = format!("{prefix}{sep}{suffix}");
        prop_assert!(validate_entry_name(&name, &name).is_err());
    }

    /// Plain names other than `.` and `..` are accepted.
    #[test]
    fn prop_plain_names_accepted(name in "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,30}") {
        prop_assert!(validate_entry_name(&name, &name).is_ok());
    }

    /// A target climbing more levels than the link is deep always escapes.
    #[test]
    fn prop_symlink_excess_parents_escape(
        depth in 0usize..6,
        extra in 1usize..6
    ) {
        let mut link = (0..depth).map(|i| format!("d{i}")).collect::<Vec<_>>();
        link.push("link".to_string());
        let target = "../".repeat(depth + extra) + "outside";
        prop_assert!(!symlink_stays_inside(Path::new(&link.join("/")), Path::new(&target)));
    }

    /// The quota tracker never lets recorded totals exceed the limits.
    #[test]
    fn prop_quota_respects_limits(
        sizes in prop::collection::vec(0u64..1000, 0..50),
        max_total in 0u64..10_000,
        max_count in 0usize..40
    ) {
        let config = ExtractConfig::default()
            .with_max_total_size(max_total)
            .with_max_file_count(max_count);
        let mut tracker = QuotaTracker::new();
        for size in sizes {
            let _ = tracker.record(size, &config);
            prop_assert!(tracker.bytes_written() <= max_total);
            prop_assert!(tracker.entries_written() <= max_count);
        }
    }

    /// Hex digests always have twice the digest length.
    #[test]
    fn prop_hex_digest_length(data in prop::collection::vec(any::<u8>(), 0..256)) {
        for alg in [
            ChecksumAlgorithm::Sha1,
            ChecksumAlgorithm::Md5,
            ChecksumAlgorithm::Sha256,
            ChecksumAlgorithm::Sha512,
        ] {
            prop_assert_eq!(alg.hex_digest(&data).len(), alg.digest_len() * 2);
        }
    }
}

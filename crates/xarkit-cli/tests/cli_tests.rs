//! Integration tests for xarkit-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use xarkit_core::formats::ChecksumAlgorithm;
use xarkit_core::formats::Encoding;
use xarkit_core::test_utils::XarTestBuilder;
use xarkit_core::test_utils::create_test_xar;

fn xarkit_cmd() -> Command {
    cargo_bin_cmd!("xarkit")
}

fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("failed to write archive");
    path
}

fn sample_archive(dir: &Path) -> PathBuf {
    write_archive(
        dir,
        "sample.xar",
        &XarTestBuilder::new()
            .toc_checksum(ChecksumAlgorithm::Sha256)
            .file_checksum(ChecksumAlgorithm::Sha512)
            .add_file("test.txt", b"hello from xarkit\n")
            .add_file("docs/readme.md", b"# readme\n")
            .build(),
    )
}

#[test]
fn test_version_flag() {
    xarkit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("xarkit"));
}

#[test]
fn test_help_flag() {
    xarkit_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fixtures"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_extract_help() {
    xarkit_cmd()
        .args(["extract", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract archive contents"));
}

#[test]
fn test_list_short() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    xarkit_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("test.txt"))
        .stdout(predicate::str::contains("docs/readme.md"));
}

#[test]
fn test_list_long() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    xarkit_cmd()
        .args(["list", "-l"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3 entries"))
        .stdout(predicate::str::is_match(r"d755\s+0\s").unwrap());
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    let output = xarkit_cmd()
        .args(["--json", "list"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "list");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["total_entries"], 3);
    assert_eq!(json["data"]["entries"][0]["path"], "test.txt");
}

#[test]
fn test_inspect_reports_checksums() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    xarkit_cmd()
        .arg("inspect")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"TOC checksum:\s+sha256").unwrap())
        .stdout(predicate::str::is_match(r"File checksums:\s+sha512").unwrap())
        .stdout(predicate::str::contains("application/x-gzip"));
}

#[test]
fn test_inspect_json_bzip2() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(
        temp.path(),
        "test-compress-bzip2.xar",
        &XarTestBuilder::new()
            .encoding(Encoding::Bzip2)
            .add_file("test.txt", b"x")
            .build(),
    );

    let output = xarkit_cmd()
        .args(["inspect", "--json"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["toc_checksum"], "sha1");
    assert_eq!(json["data"]["file_checksum"], "sha1");
    assert_eq!(json["data"]["encodings"][0], "application/x-bzip2");
}

#[test]
fn test_inspect_toc_xml() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "test.xar", &create_test_xar(b"x"));

    xarkit_cmd()
        .args(["inspect", "--toc"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("<xar>"))
        .stdout(predicate::str::contains("<name>test.txt</name>"));
}

#[test]
fn test_not_xar_file() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let path = write_archive(temp.path(), "plain.txt", b"plain text");

    xarkit_cmd()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a XAR archive"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_verify_pass() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    xarkit_cmd()
        .arg("verify")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("TOC checksum: pass (sha256)"));
}

#[test]
fn test_verify_tampered_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(
        temp.path(),
        "tampered.xar",
        &XarTestBuilder::new()
            .add_file("test.txt", b"original content")
            .tamper_heap()
            .build(),
    );

    xarkit_cmd()
        .arg("verify")
        .arg(&archive)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("test.txt"))
        .stderr(predicate::str::contains("verification failed"));
}

#[test]
fn test_extract_creates_files() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());
    let out = temp.path().join("out");

    xarkit_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"));

    assert_eq!(
        fs::read_to_string(out.join("test.txt")).unwrap(),
        "hello from xarkit\n"
    );
    assert!(out.join("docs/readme.md").exists());
}

#[test]
fn test_extract_default_output_is_cwd() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "test.xar", &create_test_xar(b"cwd"));
    let work = temp.path().join("work");
    fs::create_dir(&work).unwrap();

    xarkit_cmd()
        .current_dir(&work)
        .arg("extract")
        .arg(&archive)
        .assert()
        .success();

    assert_eq!(fs::read(work.join("test.txt")).unwrap(), b"cwd");
}

#[test]
fn test_extract_traversal_rejected() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(
        temp.path(),
        "evil.xar",
        &XarTestBuilder::new().add_raw_file("..", b"x").build(),
    );

    xarkit_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Security violation"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_extract_quota_exceeded() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    xarkit_cmd()
        .args(["extract", "--max-files", "1"])
        .arg(&archive)
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-files"));
}

#[test]
fn test_extract_no_verify() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(
        temp.path(),
        "tampered.xar",
        &XarTestBuilder::new()
            .encoding(Encoding::OctetStream)
            .add_file("test.txt", b"original content")
            .tamper_heap()
            .build(),
    );
    let out = temp.path().join("out");

    xarkit_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity check failed"));

    xarkit_cmd()
        .args(["extract", "--no-verify"])
        .arg(&archive)
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("test.txt").exists());
}

#[test]
fn test_extract_json() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = sample_archive(temp.path());

    let output = xarkit_cmd()
        .args(["-j", "extract"])
        .arg(&archive)
        .arg(temp.path().join("out"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["data"]["files_extracted"], 2);
    assert_eq!(json["data"]["directories_created"], 1);
}

#[test]
fn test_fixtures_without_archiver_exits_zero() {
    let temp = TempDir::new().expect("failed to create temp dir");
    fs::write(temp.path().join("test.txt"), "input").unwrap();

    xarkit_cmd()
        .args(["fixtures", "--archiver"])
        .arg(temp.path().join("no-such-xar"))
        .arg("--dir")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 created, 6 failed, 1 skipped"));
}

#[test]
fn test_fixtures_strict_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");

    xarkit_cmd()
        .args(["fixtures", "--strict", "--archiver"])
        .arg(temp.path().join("no-such-xar"))
        .arg("--dir")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("6 of 6 fixture invocations failed"));
}

#[test]
fn test_completion_bash() {
    xarkit_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xarkit"));
}

#[cfg(unix)]
mod fake_archiver {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Writes an archiver stand-in that copies `prebuilt` to its `-f` path.
    fn install(dir: &Path, prebuilt: &Path) -> PathBuf {
        let script = dir.join("fake-xar");
        let body = format!(
            "#!/bin/sh\nout=\"\"\nwhile [ $# -gt 0 ]; do\n  case \"$1\" in\n    -f) out=\"$2\"; shift 2 ;;\n    *) shift ;;\n  esac\ndone\ncp \"{}\" \"$out\"\necho \"fake-xar: wrote $out\" >&2\n",
            prebuilt.display()
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    fn test_fixtures_with_archiver() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let prebuilt = write_archive(temp.path(), "prebuilt.xar", &create_test_xar(b"input"));
        let archiver = install(temp.path(), &prebuilt);
        let work = temp.path().join("work");
        fs::create_dir(&work).unwrap();
        fs::write(work.join("test.txt"), "input").unwrap();

        xarkit_cmd()
            .arg("fixtures")
            .arg("--archiver")
            .arg(&archiver)
            .arg("--dir")
            .arg(&work)
            .assert()
            .success()
            .stdout(predicate::str::contains("6 created, 0 failed, 1 skipped"));

        for name in [
            "test.xar",
            "test-toc-sha256.xar",
            "test-toc-sha512.xar",
            "test-file-sha256.xar",
            "test-file-sha512.xar",
            "test-compress-bzip2.xar",
        ] {
            assert!(work.join(name).exists(), "{name} missing");
        }
        assert!(!work.join("test-compress-lzma.xar").exists());
    }

    #[test]
    fn test_create_with_archiver() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let prebuilt = write_archive(temp.path(), "prebuilt.xar", &create_test_xar(b"input"));
        let archiver = install(temp.path(), &prebuilt);
        let output = temp.path().join("made.xar");

        xarkit_cmd()
            .arg("create")
            .arg(&output)
            .arg(&prebuilt)
            .args(["--toc-cksum", "sha256", "--compression", "bzip2"])
            .arg("--archiver")
            .arg(&archiver)
            .assert()
            .success()
            .stdout(predicate::str::contains("Archive created"))
            .stderr(predicate::str::contains("fake-xar: wrote"));

        assert!(output.exists());
    }

    #[test]
    fn test_create_rejects_unknown_checksum() {
        xarkit_cmd()
            .args(["create", "out.xar", "in.txt", "--toc-cksum", "crc32"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("crc32"));
    }
}

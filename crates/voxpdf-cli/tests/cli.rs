use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;

fn voxpdf() -> Command {
    Command::cargo_bin("voxpdf").unwrap()
}

/// One Courier text line per page.
fn write_text_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_help_lists_commands() {
    voxpdf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("translate"))
        .stdout(predicate::str::contains("speak"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version() {
    voxpdf()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("voxpdf"));
}

#[test]
fn test_extract_missing_file_fails() {
    voxpdf()
        .args(["extract", "/nonexistent/missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_extract_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, "just some text").unwrap();

    voxpdf().arg("extract").arg(&path).assert().failure();
}

#[test]
fn test_extract_text_pdf_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("hello.pdf");
    write_text_pdf(&pdf, &["Hello World", "Second page"]);

    voxpdf()
        .arg("extract")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello World"))
        .stdout(predicate::str::contains("Second page"));
}

#[test]
fn test_extract_text_pdf_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("hello.pdf");
    let out = dir.path().join("hello.txt");
    write_text_pdf(&pdf, &["Hello World"]);

    voxpdf()
        .arg("extract")
        .arg(&pdf)
        .arg("-o")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 pages, 0 via OCR, 0 failed"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Hello World"));
}

#[test]
fn test_config_init_show_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    voxpdf()
        .args(["config", "path", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    voxpdf()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    voxpdf()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    voxpdf()
        .args(["config", "get", "ocr.languages", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("eng+vie"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    voxpdf()
        .args(["config", "set", "ocr.bogus", "1", "--config"])
        .arg(&config)
        .assert()
        .failure();
}

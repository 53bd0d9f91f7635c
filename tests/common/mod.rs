//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use catalog_xml::{StrategyKind, XmlStrategy};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of the sample catalogue checked into `tests/data`.
pub fn sample_library() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/library.xml")
}

/// The single-book document used by the worked examples.
pub const DUNE: &str = r#"<Library><Books><Book id="b1" available="true"><Title>Dune</Title><Pages>412</Pages><Author><FirstName>Frank</FirstName><LastName>Herbert</LastName></Author></Book></Books></Library>"#;

/// Write `xml` to a temporary file that lives as long as the returned handle.
pub fn write_xml(xml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(xml.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Write raw bytes (possibly not UTF-8) to a temporary file.
pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// One instance of every strategy, in [`StrategyKind::ALL`] order.
pub fn all_strategies() -> Vec<Box<dyn XmlStrategy>> {
    StrategyKind::ALL
        .iter()
        .map(|kind| kind.create(None))
        .collect()
}

/// Wrap a document body in `<Library>` with the given container element.
pub fn library_with(container: &str, body: &str) -> String {
    format!("<?xml version=\"1.0\"?>\n<Library><{container}>{body}</{container}></Library>")
}

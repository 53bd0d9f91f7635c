#![allow(missing_docs)]
//! Benchmarks comparing the three parsing strategies.
//!
//! A catalogue is generated into a temporary file and each strategy parses
//! it with and without a filter, using Criterion.rs for statistical analysis.

use catalog_xml::{SearchCriteria, StrategyKind};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fmt::Write as _;
use std::io::Write as _;
use tempfile::NamedTempFile;

/// Generate a catalogue with `books` books, half as many readers and loans.
fn generate_library(books: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<Library>\n<Books>\n");
    for i in 0..books {
        let category = if i % 3 == 0 { "Science Fiction" } else { "History" };
        let _ = write!(
            xml,
            "<Book id=\"b{i}\" isbn=\"978-{i:010}\" year=\"{}\" available=\"{}\" language=\"en\">\
             <Title>Volume {i}</Title>\
             <Author><FirstName>First{i}</FirstName><LastName>Last{i}</LastName></Author>\
             <Annotation>Generated annotation for book number {i}.</Annotation>\
             <Category>{category}</Category><Publisher>Press {}</Publisher><Pages>{}</Pages>\
             </Book>\n",
            1900 + i % 120,
            i % 2 == 0,
            i % 17,
            100 + i % 900
        );
    }
    xml.push_str("</Books>\n<Readers>\n");
    for i in 0..books / 2 {
        let _ = write!(
            xml,
            "<Reader id=\"r{i}\" status=\"active\"><FirstName>R{i}</FirstName>\
             <LastName>Reader</LastName><Department>Dept {}</Department>\
             <Email>r{i}@example.org</Email></Reader>\n",
            i % 9
        );
    }
    xml.push_str("</Readers>\n<Borrows>\n");
    for i in 0..books / 2 {
        let _ = writeln!(
            xml,
            "<Borrow borrowId=\"L{i}\" readerId=\"r{i}\" bookId=\"b{i}\" borrowDate=\"2024-01-01\" \
             dueDate=\"2024-02-01\" status=\"open\" renewable=\"true\"/>"
        );
    }
    xml.push_str("</Borrows>\n</Library>\n");
    xml
}

fn write_fixture(books: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(generate_library(books).as_bytes())
        .expect("write fixture");
    file
}

/// Benchmark parsing every book with each strategy.
fn benchmark_parse_books(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_books");
    for size in [100, 1_000, 10_000] {
        let fixture = write_fixture(size);
        group.throughput(Throughput::Elements(size as u64));
        for kind in StrategyKind::ALL {
            let strategy = kind.create(None);
            group.bench_with_input(BenchmarkId::new(kind.as_str(), size), &fixture, |b, file| {
                b.iter(|| strategy.parse_books(black_box(file.path()), None).unwrap().len());
            });
        }
    }
    group.finish();
}

/// Benchmark a selective filter over 10,000 books.
fn benchmark_filtered_books(c: &mut Criterion) {
    let fixture = write_fixture(10_000);
    let criteria = SearchCriteria::new()
        .with_filter("Category", "fiction")
        .with_filter("year", "19");
    let mut group = c.benchmark_group("filtered_books_10k");
    for kind in StrategyKind::ALL {
        let strategy = kind.create(None);
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| {
                strategy
                    .parse_books(fixture.path(), Some(black_box(&criteria)))
                    .unwrap()
                    .len()
            });
        });
    }
    group.finish();
}

/// Benchmark readers and loans, which have no nested collections.
fn benchmark_readers_and_loans(c: &mut Criterion) {
    let fixture = write_fixture(10_000);
    let mut group = c.benchmark_group("readers_and_loans_10k");
    for kind in StrategyKind::ALL {
        let strategy = kind.create(None);
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| {
                let readers = strategy.parse_readers(fixture.path(), None).unwrap();
                let loans = strategy.parse_loan_records(fixture.path(), None).unwrap();
                readers.len() + loans.len()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_books,
    benchmark_filtered_books,
    benchmark_readers_and_loans
);
criterion_main!(benches);

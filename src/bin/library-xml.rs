//! CLI entry point for library catalogue extraction.

use anyhow::{bail, Context, Result};
use catalog_xml::document::Document;
use catalog_xml::inspect::{attribute_names, element_tags, search_elements};
use catalog_xml::{FieldAccess, ParserConfig, ParserContext, SearchCriteria, StrategyKind};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Extract books, readers and loans from library catalogue XML.
#[derive(Parser, Debug)]
#[command(name = "library-xml")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Parsing strategy: tree, query or incremental
    #[arg(short, long, global = true, default_value_t = StrategyKind::default())]
    strategy: StrategyKind,

    /// Print results as pretty JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by the record listing commands.
#[derive(Args, Debug)]
struct RecordArgs {
    /// Catalogue document
    file: PathBuf,
    /// Filter as KEY=VALUE (repeatable)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    /// Print only these fields, by XML name (repeatable)
    #[arg(short, long = "column")]
    columns: Vec<String>,
}

impl RecordArgs {
    fn criteria(&self) -> SearchCriteria {
        self.filters.iter().cloned().collect()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List books.
    Books(RecordArgs),
    /// List readers.
    Readers(RecordArgs),
    /// List loan records.
    Loans {
        #[command(flatten)]
        args: RecordArgs,
        /// Only loans without a return date
        #[arg(long)]
        open: bool,
    },
    /// List the distinct element tags of any document.
    Tags {
        /// XML document
        file: PathBuf,
    },
    /// List the attribute names of the first element with a tag.
    Attributes {
        /// XML document
        file: PathBuf,
        /// Element tag
        tag: String,
    },
    /// Find elements by tag and, optionally, attribute value.
    Search {
        /// XML document
        file: PathBuf,
        /// Element tag
        tag: String,
        /// Attribute to match
        #[arg(long, requires = "value")]
        attribute: Option<String>,
        /// Substring the attribute must contain
        #[arg(long, requires = "attribute")]
        value: Option<String>,
    },
    /// Run every strategy and check that the results agree.
    Compare {
        /// Catalogue document
        file: PathBuf,
    },
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        },
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn main() {
    // Initialize tracing with WARN level by default, respecting RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let context = ParserConfig::new().with_strategy(cli.strategy).build_context();

    match cli.command {
        Commands::Books(args) => {
            let books = context.parse_books(&args.file, Some(&args.criteria()))?;
            print_fields(&books, &args.columns, cli.json)
        },
        Commands::Readers(args) => {
            let readers = context.parse_readers(&args.file, Some(&args.criteria()))?;
            print_fields(&readers, &args.columns, cli.json)
        },
        Commands::Loans { args, open } => {
            let mut loans = context.parse_loan_records(&args.file, Some(&args.criteria()))?;
            if open {
                loans.retain(catalog_xml::LoanRecord::is_open);
            }
            print_fields(&loans, &args.columns, cli.json)
        },
        Commands::Tags { file } => {
            let doc = Document::load(&file)?;
            print_lines(&element_tags(&doc), cli.json)
        },
        Commands::Attributes { file, tag } => {
            let doc = Document::load(&file)?;
            print_lines(&attribute_names(&doc, &tag), cli.json)
        },
        Commands::Search {
            file,
            tag,
            attribute,
            value,
        } => {
            let doc = Document::load(&file)?;
            let restriction = attribute.as_deref().zip(value.as_deref());
            print_records(&search_elements(&doc, &tag, restriction), cli.json)
        },
        Commands::Compare { file } => compare(&file),
    }
}

fn print_records<T: Display + Serialize>(records: &[T], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(records).context("serializing results")?
        );
    } else {
        for record in records {
            println!("{record}");
        }
        println!("{} result(s)", records.len());
    }
    Ok(())
}

/// Print whole records, or only `columns` looked up through the field tables.
fn print_fields<T>(records: &[T], columns: &[String], json: bool) -> Result<()>
where
    T: FieldAccess + Display + Serialize,
{
    if columns.is_empty() {
        return print_records(records, json);
    }
    let known = T::field_names();
    if let Some(unknown) = columns
        .iter()
        .find(|column| !known.iter().any(|name| *name == column.as_str()))
    {
        bail!("unknown column '{unknown}', expected one of: {}", known.join(", "));
    }

    let rows: Vec<IndexMap<&str, String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    let value = record.field(column).map(|v| v.into_owned()).unwrap_or_default();
                    (column.as_str(), value)
                })
                .collect()
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", columns.join("\t"));
        for row in &rows {
            let values: Vec<&str> = row.values().map(String::as_str).collect();
            println!("{}", values.join("\t"));
        }
        println!("{} result(s)", rows.len());
    }
    Ok(())
}

fn print_lines(lines: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lines)?);
    } else {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// Every record one strategy returned.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    books: Vec<catalog_xml::Book>,
    readers: Vec<catalog_xml::Reader>,
    loans: Vec<catalog_xml::LoanRecord>,
}

fn parse_all(context: &ParserContext, file: &Path) -> Result<Outcome> {
    Ok(Outcome {
        books: context.parse_books(file, None)?,
        readers: context.parse_readers(file, None)?,
        loans: context.parse_loan_records(file, None)?,
    })
}

fn compare(file: &Path) -> Result<()> {
    let mut context = ParserContext::default();
    let mut outcomes = Vec::new();

    for kind in StrategyKind::ALL {
        context.set_strategy(kind.create(None));
        let outcome = parse_all(&context, file)
            .with_context(|| format!("{kind} strategy failed"))?;
        println!(
            "{:<28} books: {:>5}  readers: {:>5}  loans: {:>5}",
            context.current_strategy().name(),
            outcome.books.len(),
            outcome.readers.len(),
            outcome.loans.len()
        );
        outcomes.push((kind, outcome));
    }

    let Some(((reference_kind, reference), rest)) = outcomes.split_first() else {
        return Ok(());
    };
    for (kind, outcome) in rest {
        if outcome != reference {
            bail!("{kind} results differ from {reference_kind} results");
        }
    }
    println!("All strategies returned identical results");
    Ok(())
}

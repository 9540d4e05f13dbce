//! Dotted CLI - Command-line tool for bounded JSON documents
//!
//! This binary provides command-line interfaces for:
//! - check: wrap a document and report whether it fits the limits
//! - get: read the value at a dotted path
//! - set: assign a value at a dotted path, creating intermediate levels
//! - merge: merge a second document into the top level
//! - show: print the document, optionally projected or inspected

mod config;

use clap::{ArgAction, Parser, Subcommand};
use config::{load_limits, Overrides};
use dotted_tree::{
    DottedTree, IdentityAdapter, JsonSizeMeter, Limits, SerializeOptions, SizeMeter, TypeRegistry,
};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "dotted")]
#[command(about = "Inspect and edit JSON documents under depth, attribute and size limits")]
#[command(version)]
struct Cli {
    /// Limits configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Maximum node depth (root is 0)
    #[arg(long, global = true)]
    max_depth: Option<usize>,
    /// Maximum approximate serialized size in bytes
    #[arg(long, global = true)]
    max_size: Option<usize>,
    /// Maximum attributes per node, at every depth
    #[arg(long, global = true)]
    max_attrs: Option<usize>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wrap a document and report whether it fits the limits
    Check {
        /// Input JSON file ("-" for stdin)
        input: PathBuf,
    },
    /// Print the value at a dotted path
    ///
    /// Examples:
    ///   dotted get doc.json author.name
    Get {
        /// Input JSON file ("-" for stdin)
        input: PathBuf,
        /// Dotted path, e.g. "author.name"
        path: String,
    },
    /// Assign a value at a dotted path
    ///
    /// VALUE is parsed as JSON; anything that does not parse is taken as a string.
    ///
    /// Examples:
    ///   dotted set doc.json authors.creator.name Triss
    ///   dotted set doc.json stats '[1, 2, 3]' -o out.json
    Set {
        /// Input JSON file ("-" for stdin)
        input: PathBuf,
        /// Dotted path, e.g. "authors.creator.name"
        path: String,
        /// Value to assign
        value: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Merge the top level of a second document into the first
    Merge {
        /// Input JSON file ("-" for stdin)
        input: PathBuf,
        /// Document to merge in
        other: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the document
    Show {
        /// Input JSON file ("-" for stdin)
        input: PathBuf,
        /// Keep only these top-level keys (comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// Drop these top-level keys (comma separated)
        #[arg(long, value_delimiter = ',')]
        except: Vec<String>,
        /// Print the debug rendering instead of JSON
        #[arg(long)]
        inspect: bool,
        /// Discriminator values to report as named types when inspecting
        #[arg(long = "known-type", requires = "inspect")]
        known_types: Vec<String>,
        /// Pretty-print the output
        #[arg(long, conflicts_with = "inspect")]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG, when set, takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let overrides = Overrides {
        max_depth: cli.max_depth,
        max_size: cli.max_size,
        max_attrs: cli.max_attrs,
    };
    let limits = load_limits(cli.config.as_deref(), &overrides)?;

    match cli.command {
        Commands::Check { input } => handle_check(&input, limits),
        Commands::Get { input, path } => handle_get(&input, &path, limits),
        Commands::Set {
            input,
            path,
            value,
            output,
            pretty,
        } => handle_set(&input, &path, &value, limits, output.as_deref(), pretty),
        Commands::Merge {
            input,
            other,
            output,
            pretty,
        } => handle_merge(&input, &other, limits, output.as_deref(), pretty),
        Commands::Show {
            input,
            only,
            except,
            inspect,
            known_types,
            pretty,
        } => {
            let options = projection(only, except);
            if inspect {
                handle_inspect(&input, &known_types, limits)
            } else {
                handle_show(&input, &options, limits, pretty)
            }
        }
    }
}

fn handle_check(input: &Path, limits: Limits) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(input, limits)?;
    println!(
        "ok depth={} attributes={} size={}",
        tree.max_depth_reached(),
        tree.len(),
        JsonSizeMeter.serialized_len(&tree)
    );
    Ok(())
}

fn handle_get(input: &Path, path: &str, limits: Limits) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(input, limits)?;
    let value = tree.get_path(path).map_or(Value::Null, |v| v.to_plain());
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn handle_set(
    input: &Path,
    path: &str,
    raw_value: &str,
    limits: Limits,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let mut tree = load_tree(input, limits)?;
    let value = parse_value_argument(raw_value);

    if tree.recursive_assign(path, value)?.is_none() {
        tracing::warn!(path, "blank path, nothing assigned");
    } else {
        tracing::info!(path, "assigned value");
    }

    write_document(&tree.to_json_value(), output, pretty)
}

fn handle_merge(
    input: &Path,
    other: &Path,
    limits: Limits,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let mut tree = load_tree(input, limits)?;
    let other: Value = serde_json::from_str(&read_input(other)?)?;
    tree.merge(other)?;
    tracing::info!(attributes = tree.len(), "merged document");
    write_document(&tree.to_json_value(), output, pretty)
}

fn handle_show(
    input: &Path,
    options: &SerializeOptions,
    limits: Limits,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(input, limits)?;
    let document = Value::Object(tree.to_serializable(options));
    write_document(&document, None, pretty)
}

fn handle_inspect(
    input: &Path,
    known_types: &[String],
    limits: Limits,
) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(input, limits)?;

    let mut registry = TypeRegistry::new();
    for discriminator in known_types {
        registry.register_discriminator(discriminator);
    }
    let adapter: Option<&dyn IdentityAdapter> = if registry.is_empty() {
        None
    } else {
        Some(&registry)
    };

    println!("{}", tree.inspect(adapter));
    Ok(())
}

fn projection(only: Vec<String>, except: Vec<String>) -> SerializeOptions {
    SerializeOptions {
        only: (!only.is_empty()).then_some(only),
        except: (!except.is_empty()).then_some(except),
    }
}

/// JSON when it parses, otherwise the raw text as a string
fn parse_value_argument(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn load_tree(input: &Path, limits: Limits) -> Result<DottedTree, Box<dyn Error>> {
    let text = read_input(input)?;
    let tree = DottedTree::from_json_str(&text, limits)?;
    tracing::info!(
        input = %input.display(),
        attributes = tree.len(),
        depth = tree.max_depth_reached(),
        "wrapped document"
    );
    Ok(tree)
}

fn read_input(input: &Path) -> io::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(input)
    }
}

fn write_document(
    document: &Value,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let mut text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    text.push('\n');

    match output {
        Some(path) => fs::write(path, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_argument_prefers_json() {
        assert_eq!(parse_value_argument("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_value_argument("true"), json!(true));
        assert_eq!(parse_value_argument("\"quoted\""), json!("quoted"));
        assert_eq!(parse_value_argument("Triss"), json!("Triss"));
    }

    #[test]
    fn show_known_type_requires_inspect() {
        let err = Cli::try_parse_from(["dotted", "show", "doc.json", "--known-type", "book"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(
            Cli::try_parse_from(["dotted", "show", "doc.json", "--inspect", "--known-type", "book"])
                .is_ok()
        );
    }

    #[test]
    fn show_pretty_conflicts_with_inspect() {
        let err = Cli::try_parse_from(["dotted", "show", "doc.json", "--inspect", "--pretty"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(Cli::try_parse_from(["dotted", "show", "doc.json", "--pretty"]).is_ok());
    }

    #[test]
    fn empty_projection_keeps_everything() {
        assert_eq!(projection(vec![], vec![]), SerializeOptions::default());
        let options = projection(vec!["title".into()], vec![]);
        assert_eq!(options.only, Some(vec!["title".to_string()]));
        assert!(options.except.is_none());
    }

    #[test]
    fn set_then_write_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        let output = dir.path().join("out.json");
        fs::write(&input, r#"{"title":"Test"}"#).unwrap();

        handle_set(
            &input,
            "authors.creator.name",
            "Triss",
            Limits::default(),
            Some(&output),
            false,
        )
        .unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({"title": "Test", "authors": {"creator": {"name": "Triss"}}})
        );
    }

    #[test]
    fn load_tree_reports_limit_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        fs::write(&input, r#"{"a":"najnevypocitavatelnejsi"}"#).unwrap();

        let err = load_tree(&input, Limits::default().with_max_size(10)).unwrap_err();
        assert!(err.to_string().contains("Maximal size of document reached"));
    }
}

//! `yson` CLI: validate, reformat and inspect JSON documents.
//!
//! ## Usage
//!
//! ```sh
//! # Validate stdin
//! echo '{"name":"Yang","age":99}' | yson check
//!
//! # Rewrite a file as compact canonical text
//! yson fmt -i data.json -o data.min.json
//!
//! # Count nodes per kind and report nesting depth
//! yson stats -i data.json
//!
//! # Tighter nesting limit, with parser diagnostics on stderr
//! yson --max-depth 16 -v check -i data.json
//! ```

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use yson_core::{parse_value_with, ParserOptions, Value, DEFAULT_MAX_DEPTH};

#[derive(Parser)]
#[command(name = "yson", version, about = "JSON value tree toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum container nesting accepted by the parser
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the input and report whether it is valid
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Parse the input and re-emit it as compact text
    Fmt {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show node counts per kind and the maximum nesting depth
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = ParserOptions::default().max_depth(cli.max_depth);

    match cli.command {
        Commands::Check { input } => {
            parse(input.as_deref(), options)?;
            println!("ok");
        }
        Commands::Fmt { input, output } => {
            let value = parse(input.as_deref(), options)?;
            let mut text = value.to_json();
            text.push('\n');
            write_output(output.as_deref(), &text)?;
        }
        Commands::Stats { input } => {
            let value = parse(input.as_deref(), options)?;
            let mut stats = Stats::default();
            stats.visit(&value, 0);
            print!("{stats}");
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn parse(input: Option<&str>, options: ParserOptions) -> Result<Value> {
    let text = read_input(input)?;
    debug!(bytes = text.len(), max_depth = options.max_depth, "parsing input");
    let source = input.unwrap_or("<stdin>");
    parse_value_with(&text, options).with_context(|| format!("Invalid JSON in {source}"))
}

/// Per-kind node counts of one document.
#[derive(Debug, Default)]
struct Stats {
    null: usize,
    bool: usize,
    number: usize,
    string: usize,
    array: usize,
    object: usize,
    max_depth: usize,
}

impl Stats {
    /// `depth` counts the containers enclosing `value`.
    fn visit(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.null += 1,
            Value::Bool(_) => self.bool += 1,
            Value::Number(_) => self.number += 1,
            // Parsed text never holds blobs; they come from the bridge.
            Value::String(_) | Value::Blob(_) => self.string += 1,
            Value::Array(array) => {
                self.array += 1;
                self.max_depth = self.max_depth.max(depth + 1);
                for item in array.iter() {
                    self.visit(item, depth + 1);
                }
            }
            Value::Object(object) => {
                self.object += 1;
                self.max_depth = self.max_depth.max(depth + 1);
                for (_, member) in object.iter() {
                    self.visit(member, depth + 1);
                }
            }
        }
    }

    fn total(&self) -> usize {
        self.null + self.bool + self.number + self.string + self.array + self.object
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "nodes:      {}", self.total())?;
        writeln!(f, "objects:    {}", self.object)?;
        writeln!(f, "arrays:     {}", self.array)?;
        writeln!(f, "strings:    {}", self.string)?;
        writeln!(f, "numbers:    {}", self.number)?;
        writeln!(f, "bools:      {}", self.bool)?;
        writeln!(f, "nulls:      {}", self.null)?;
        writeln!(f, "max depth:  {}", self.max_depth)
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

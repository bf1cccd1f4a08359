// Cactus: prints the syntax tree built for a C source file

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::Level;

use cactus::ast::dump::dump;
use cactus::tokens::{Dialect, Keywords};
use cactus::{parse, ParseOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectArg {
    C99,
    Gnu,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::C99 => Dialect::C99,
            DialectArg::Gnu => Dialect::Gnu,
        }
    }
}

/// Build and print the syntax tree of a C file
#[derive(Debug, Parser)]
#[command(name = "cactus", version)]
struct Args {
    /// C source file
    file: PathBuf,

    /// Token numbering the lexer emits
    #[arg(long, value_enum, default_value = "c99")]
    dialect: DialectArg,

    /// Parse for content assist at this byte offset
    #[arg(long)]
    completion_offset: Option<u32>,

    /// Drop comments instead of attaching them to the tree
    #[arg(long)]
    no_comments: bool,

    /// Log engine decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut options = ParseOptions::new()
        .with_dialect(args.dialect.into())
        .with_comments(!args.no_comments);
    if let Some(offset) = args.completion_offset {
        options = options.with_completion_offset(offset);
    }

    let output = parse(&source, &options)
        .with_context(|| format!("failed to tokenize {}", args.file.display()))?;

    if let Some(unit) = output.translation_unit {
        print!("{}", dump(&output.ast, unit));
    }
    if output.has_error {
        eprintln!("{}: recovered from syntax errors", args.file.display());
    }
    if let Some(completion) = &output.completion {
        let names: Vec<String> = completion
            .names
            .iter()
            .map(|&name| {
                let range = output.ast.range(name);
                format!("{}..{}", u32::from(range.start()), u32::from(range.end()))
            })
            .collect();
        println!(
            "completion prefix {:?} at {}",
            completion.prefix,
            names.join(", ")
        );
        let keywords = Keywords::c99().keywords_with_prefix(&completion.prefix);
        if !keywords.is_empty() {
            println!("keywords: {}", keywords.join(" "));
        }
    }
    Ok(())
}

use clap::{Args, Parser, Subcommand};
use schemalens::{
    Dialect, ErdOptions, ErdRenderer, MarkdownOptions, MarkdownRenderer, ParseMode, ParsedSchema,
    SqlGenerator, SqlOptions, diff, parse_with, stats,
};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Schema inspection and code generation
#[derive(Parser, Debug)]
#[command(name = "schemalens")]
#[command(version, about = "Parse, analyze, diff and render data-model schemas")]
struct Cli {
    /// Fail on the first parse error; warnings are still printed and skipped
    #[arg(long, global = true)]
    strict: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed schema and diagnostics as JSON
    Parse(Input),
    /// Print schema statistics as JSON
    Stats(Input),
    /// Print the diff between two schemas as JSON
    Diff {
        old: PathBuf,
        new: PathBuf,
    },
    /// Render a Mermaid ER diagram
    Erd {
        #[command(flatten)]
        input: Input,
        /// Field lines per entity before truncation
        #[arg(long, default_value_t = 20)]
        max_fields: usize,
        /// Omit array/optional annotations
        #[arg(long)]
        no_modifiers: bool,
    },
    /// Generate SQL DDL
    Sql {
        #[command(flatten)]
        input: Input,
        /// Target dialect: postgres, mysql
        #[arg(short, long, default_value = "postgres", value_parser = parse_dialect)]
        dialect: Dialect,
        /// Omit the generated-by header comment
        #[arg(long)]
        no_header: bool,
    },
    /// Generate Markdown documentation
    Docs {
        #[command(flatten)]
        input: Input,
        /// Document title
        #[arg(long, default_value = "Schema Documentation")]
        title: String,
        /// Omit per-model index listings
        #[arg(long)]
        no_indexes: bool,
    },
}

#[derive(Args, Debug)]
struct Input {
    /// Schema file
    file: PathBuf,
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    Dialect::from_str(s).ok_or_else(|| format!("unknown dialect `{}`", s))
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schemalens=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mode = if cli.strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };

    let rendered = match &cli.command {
        Command::Parse(input) => {
            let source = read(&input.file)?;
            let output = parse_with(&source, mode).map_err(|e| e.format_with_source(&source))?;
            serde_json::to_string_pretty(&output)?
        }
        Command::Stats(input) => {
            let schema = load(&input.file, mode)?;
            serde_json::to_string_pretty(&stats::compute(&schema))?
        }
        Command::Diff { old, new } => {
            let old = load(old, mode)?;
            let new = load(new, mode)?;
            serde_json::to_string_pretty(&diff(&old, &new))?
        }
        Command::Erd {
            input,
            max_fields,
            no_modifiers,
        } => {
            let schema = load(&input.file, mode)?;
            ErdRenderer::new(ErdOptions {
                max_fields_per_model: *max_fields,
                show_modifiers: !no_modifiers,
            })
            .render(&schema)
        }
        Command::Sql {
            input,
            dialect,
            no_header,
        } => {
            let schema = load(&input.file, mode)?;
            SqlGenerator::new(SqlOptions {
                dialect: *dialect,
                header: !no_header,
            })
            .generate(&schema)
        }
        Command::Docs {
            input,
            title,
            no_indexes,
        } => {
            let schema = load(&input.file, mode)?;
            MarkdownRenderer::new(MarkdownOptions {
                title: title.clone(),
                include_indexes: !no_indexes,
            })
            .render(&schema)
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), bytes = rendered.len(), "wrote output");
        }
        None => {
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<String, Box<dyn Error>> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e).into())
}

/// Parse a schema file, printing lenient-mode diagnostics to stderr.
fn load(path: &Path, mode: ParseMode) -> Result<ParsedSchema, Box<dyn Error>> {
    let source = read(path)?;
    let output = parse_with(&source, mode).map_err(|e| e.format_with_source(&source))?;

    for diagnostic in &output.diagnostics {
        eprintln!("{}: {}", path.display(), diagnostic.format_with_source(&source));
    }
    tracing::debug!(
        path = %path.display(),
        models = output.schema.models.len(),
        enums = output.schema.enums.len(),
        "loaded schema"
    );

    Ok(output.schema)
}

//! Demonstration CLI: build a document, apply edits, print the result.
//!
//! ```text
//! skiptable "hello world!" insert:5:" editor" delete:0:6 --levels
//! ```
//!
//! Without edits the classic demo runs: three insertions into "hello world!".
//! Set `RUST_LOG=skiptable=trace` to watch levels come and go.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use skiptable::{Config, PieceTable};

/// Edit a document held in a skip-list piece table
#[derive(Parser, Debug)]
#[command(name = "skiptable", version, about = "Edit a document held in a skip-list piece table")]
struct CliArgs {
    /// Initial document text
    #[arg(default_value = "hello world!")]
    text: String,

    /// Edits applied in order: `insert:OFFSET:TEXT` or `delete:START:END`
    #[arg(value_name = "EDITS")]
    edits: Vec<Edit>,

    /// Seed for level selection
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Maximum number of levels, including the piece level
    #[arg(long, value_name = "N")]
    max_level: Option<usize>,

    /// Print the skip list levels after the edits
    #[arg(short = 'l', long)]
    levels: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Edit {
    Insert { offset: usize, text: String },
    Delete { start: usize, end: usize },
}

impl FromStr for Edit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let kind = parts.next().unwrap_or_default();
        let first = parts.next().ok_or_else(|| format!("missing offset in `{s}`"))?;
        let second = parts.next().ok_or_else(|| format!("missing argument in `{s}`"))?;
        let number = |field: &str| {
            field
                .parse::<usize>()
                .map_err(|e| format!("bad offset `{field}` in `{s}`: {e}"))
        };

        match kind {
            "insert" | "i" => Ok(Edit::Insert {
                offset: number(first)?,
                text: second.to_string(),
            }),
            "delete" | "d" => Ok(Edit::Delete {
                start: number(first)?,
                end: number(second)?,
            }),
            other => Err(format!("unknown edit `{other}`, expected insert or delete")),
        }
    }
}

fn init_tracing() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);
    tracing_subscriber::registry().with(console_layer).init();
}

fn demo_edits() -> Vec<Edit> {
    vec![
        Edit::Insert { offset: 5, text: " editor".to_string() },
        Edit::Insert { offset: 5, text: " pasta is tasty".to_string() },
        Edit::Insert { offset: 15, text: " and not nice".to_string() },
    ]
}

fn main() -> ExitCode {
    init_tracing();
    let args = CliArgs::parse();

    let mut config = Config::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(max_level) = args.max_level {
        config = config.with_max_level(max_level);
    }

    let edits = if args.edits.is_empty() { demo_edits() } else { args.edits };
    let mut doc = PieceTable::with_config(args.text.as_str(), &config);
    for edit in &edits {
        match edit {
            Edit::Insert { offset, text } => doc.insert(text.as_bytes(), *offset),
            Edit::Delete { start, end } => {
                if let Err(e) = doc.delete(*start, *end) {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    println!("{doc}");
    if args.levels {
        print!("{}", doc.index());
    }
    ExitCode::SUCCESS
}

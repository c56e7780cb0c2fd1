use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser as ClapParser, Subcommand};
use prq::Variables;
use prq::cli::{self, CliError, RunOptions, RunOutcome};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "prq")]
#[command(about = "prq - Filter pull-request records with queries or saved filters")]
#[command(version)]
struct Cli {
    /// Log compiled queries and match counts
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter records by a query string
    Filter {
        /// The query to run
        query: String,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Filter records by a saved filter document
    Apply {
        /// Path to the saved filter JSON
        #[arg(short, long)]
        filter: PathBuf,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// List documentation topics
    Docs,

    /// Show documentation for a specific topic
    Doc {
        /// Topic name (use 'prq docs' to list topics)
        topic: String,
    },
}

#[derive(Args)]
struct RecordArgs {
    /// JSON records file (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Login substituted for @me
    #[arg(short, long, env = "PRQ_USER")]
    user: Option<String>,

    /// Extra query variable, NAME=VALUE
    #[arg(long = "var", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Reference time for relative durations (RFC 3339)
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Print only the number of matches
    #[arg(short, long)]
    count: bool,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

fn parse_now(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Filter {
            query,
            syntax_only,
            records,
        } => run_filter(&query, syntax_only, records),
        Commands::Apply { filter, records } => run_apply(&filter, records),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { topic } => cli::get_doc_topic(&topic).map(|content| print!("{content}")),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "prq=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PRQ_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_filter(query: &str, syntax_only: bool, records: RecordArgs) -> Result<(), CliError> {
    let options = run_options(&records, syntax_only)?;
    let outcome = cli::execute_filter(query, &options)?;
    print_outcome(outcome, &records)
}

fn run_apply(filter: &Path, records: RecordArgs) -> Result<(), CliError> {
    let saved = fs::read_to_string(filter)?;
    let options = run_options(&records, false)?;
    let outcome = cli::execute_apply(&saved, &options)?;
    print_outcome(outcome, &records)
}

fn run_options(args: &RecordArgs, syntax_only: bool) -> Result<RunOptions, CliError> {
    let input = if syntax_only {
        None
    } else {
        read_input(args.input.as_deref())?
    };

    let mut variables = match &args.user {
        Some(user) => Variables::with_current_user(user.clone()),
        None => Variables::new(),
    };
    for (name, value) in &args.vars {
        variables.insert(name.clone(), value.clone());
    }

    Ok(RunOptions {
        input,
        variables,
        now: args.now,
        syntax_only,
    })
}

fn read_input(path: Option<&Path>) -> Result<Option<String>, CliError> {
    match path {
        Some(path) => Ok(Some(fs::read_to_string(path)?)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn print_outcome(outcome: RunOutcome, args: &RecordArgs) -> Result<(), CliError> {
    match outcome {
        RunOutcome::SyntaxValid => println!("Syntax is valid"),
        RunOutcome::Matches { count, .. } if args.count => println!("{count}"),
        RunOutcome::Matches { records, .. } => {
            let json = if args.pretty {
                serde_json::to_string_pretty(&records)
            } else {
                serde_json::to_string(&records)
            }?;
            println!("{json}");
        }
    }
    Ok(())
}

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod ontology;
pub mod util;

#[cfg(test)]
mod test_support;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sqwrl", version, about = "Run SQWRL queries and SWRL rules over a JSON ontology")]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log evaluation details to stderr (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a SQWRL query and print its result table.
    Query(commands::query::QueryArgs),
    /// Apply SWRL rules until no new facts appear and print what was inferred.
    Infer(commands::infer::InferArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second initialization (as in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = execute(&cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Run a parsed command line and return what it prints.
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    match &cli.command {
        Command::Query(args) => commands::query::run(args, cli.format),
        Command::Infer(args) => commands::infer::run(args, cli.format),
    }
}

//! hallucheck CLI
//!
//! Ask a model a question, then check its answer claim by claim.
//!
//! Exit codes:
//! - 0: answer appears factual, no claims were found, or no question was given
//! - 1: configuration or provider error
//! - 2: hallucination detected

mod render;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hallucheck_runtime::{Pipeline, PipelineError, ProviderRegistry, RuntimeConfig};
use render::OutputFormat;

const EXIT_HALLUCINATION: u8 = 2;

#[derive(Parser)]
#[command(name = "hallucheck", version, about = "Detect hallucinations in LLM answers")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an answer and verify its factual claims
    Ask(AskArgs),

    /// Print the effective configuration as YAML
    Config {
        /// Config file to load instead of the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the providers compiled into this binary
    Providers,
}

#[derive(Args)]
struct AskArgs {
    /// The question, or `-` to read it from stdin
    question: String,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// OpenAI API key (defaults to OPENAI_API_KEY)
    #[arg(long)]
    openai_api_key: Option<String>,

    /// Groq API key (defaults to GROQ_API_KEY)
    #[arg(long)]
    groq_api_key: Option<String>,

    /// Maximum concurrent verification calls
    #[arg(long)]
    concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Ask(args) => ask(args).await,
        Command::Config { config } => print_config(config.as_deref()).map(|_| ExitCode::SUCCESS),
        Command::Providers => {
            print_providers();
            Ok(ExitCode::SUCCESS)
        }
    };

    result.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so stdout carries only the run output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(RuntimeConfig::default()),
    }
}

async fn ask(args: AskArgs) -> Result<ExitCode> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(key) = args.openai_api_key {
        config.set_api_key("openai", key);
    }
    if let Some(key) = args.groq_api_key {
        config.set_api_key("groq", key);
    }
    if let Some(concurrency) = args.concurrency {
        config.verify_concurrency = concurrency;
    }

    let question = if args.question == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read question from stdin")?;
        buf
    } else {
        args.question
    };

    let pipeline = Pipeline::from_config(&config)?;

    let report = match pipeline.run(&question).await {
        Ok(report) => report,
        Err(e) if e.is_informational() => {
            println!("{}", e);
            return Ok(ExitCode::SUCCESS);
        }
        Err(PipelineError::Provider(e)) => {
            return Err(anyhow::Error::new(e).context("LLM request failed"));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        llm_calls = report.usage.llm_calls,
        tokens = report.usage.total_tokens(),
        "Run finished"
    );

    let mut stdout = io::stdout().lock();
    render::render(&report, args.format, &mut stdout).context("Failed to write output")?;

    Ok(if report.hallucinated() {
        ExitCode::from(EXIT_HALLUCINATION)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = load_config(path)?;
    config.validate()?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn print_providers() {
    for (name, description) in ProviderRegistry::with_defaults().descriptions() {
        println!("{:<8} {}", name, description);
    }
}

//! splunk-index CLI entrypoint.
//!
//! This is the main entrypoint for the splunk-index command-line tool.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use splunk_index::cli::{Cli, Commands, IndexArgs, LogFormat, OutputFormatter};
use splunk_index::config::{ConfigValidator, IndexParams, ParamsParser};
use splunk_index::error::Result;
use splunk_index::reconciler;
use splunk_index::splunk::{IndexAccessor, SplunkClient};

use clap::Parser;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Connection flags may read their values from a .env file
    if let Err(e) = ParamsParser::new().load_dotenv() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let formatter = OutputFormatter::new(cli.output);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, &formatter)) {
        Ok(output) => {
            emit(&output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            emit(&formatter.format_failure(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system on stderr.
fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Writes the result document to stdout.
fn emit(output: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end());
}

/// Main async entry point. Returns the rendered result document.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<String> {
    let params_file = cli.params.as_deref();

    match cli.command {
        Commands::Apply { check, index } => cmd_apply(params_file, index, check, formatter).await,
        Commands::Status { index } => cmd_status(params_file, index, formatter).await,
        Commands::Validate { index } => cmd_validate(params_file, index, formatter),
    }
}

/// Reconcile the index to the desired state.
async fn cmd_apply(
    params_file: Option<&Path>,
    args: IndexArgs,
    check: bool,
    formatter: &OutputFormatter,
) -> Result<String> {
    let params = load_params(params_file, args)?;
    let result = reconciler::apply(&params, check, |connection| async move {
        SplunkClient::connect(&connection).await
    })
    .await?;

    Ok(formatter.format_result(&result))
}

/// Show the current state of the index.
async fn cmd_status(
    params_file: Option<&Path>,
    args: IndexArgs,
    formatter: &OutputFormatter,
) -> Result<String> {
    let params = load_params(params_file, args)?;
    let name = params.index_name()?;

    let connection = params.connection()?;
    let client = SplunkClient::connect(&connection).await?;

    let state = if client.exists(name).await? {
        Some(client.fetch_attributes(name).await?)
    } else {
        None
    };

    Ok(formatter.format_status(name, state.as_ref()))
}

/// Validate parameters without contacting Splunk.
fn cmd_validate(
    params_file: Option<&Path>,
    args: IndexArgs,
    formatter: &OutputFormatter,
) -> Result<String> {
    let params = ParamsParser::new().load(params_file, args.into())?;
    let result = ConfigValidator::new().validate(&params)?;
    Ok(formatter.format_validation(&result))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads, merges and validates the parameters of one invocation.
fn load_params(params_file: Option<&Path>, args: IndexArgs) -> Result<IndexParams> {
    if let Some(path) = params_file {
        debug!("Loading parameters from: {}", path.display());
    }

    let params = ParamsParser::new().load(params_file, args.into())?;
    let validation = ConfigValidator::new().validate(&params)?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    Ok(params)
}

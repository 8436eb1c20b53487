// crates/muswea-cli/src/main.rs
// ============================================================================
// Module: MuSWEA CLI Entry Point
// Description: Command dispatcher for configuration and fold utilities.
// Purpose: Validate workflow configuration and preview cross-validation folds.
// Dependencies: clap, muswea-config, muswea-cv, rand, serde, thiserror.
// ============================================================================

//! ## Overview
//! The `muswea` CLI validates workflow configuration files, emits the
//! generated schema, example, and docs, and prints the k-fold layouts the
//! workflow would use. Configuration inputs are untrusted and are validated
//! before any value is used.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use muswea_config::DEFAULT_CHEMICAL_SUBSTANCES;
use muswea_config::ConfigValidator;
use muswea_config::EventSink;
use muswea_config::FileEventSink;
use muswea_config::MusweaConfig;
use muswea_config::NoopEventSink;
use muswea_config::RawConfig;
use muswea_config::StderrEventSink;
use muswea_config::SubstancePolicy;
use muswea_config::UnknownKeyPolicy;
use muswea_config::ValidationOptions;
use muswea_cv::CvError;
use muswea_cv::Fold;
use muswea_cv::KFold;
use muswea_cv::RobustKFold;
use muswea_cv::create_kfold_splits;
use muswea_cv::kfold::MAX_SAMPLES;
use muswea_cv::robust_kfold_split;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "muswea", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Cross-validation fold utilities.
    Folds {
        /// Selected folds subcommand.
        #[command(subcommand)]
        command: FoldsCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a MuSWEA configuration file and print the effective values.
    Validate(ConfigValidateCommand),
    /// Print the configuration JSON schema.
    Schema,
    /// Print the canonical example configuration.
    Example,
    /// Generate or verify the configuration reference docs.
    Docs(ConfigDocsCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to muswea.toml or `MUSWEA_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Inject the default `CHEMICAL_SUBSTANCES` list when absent.
    #[arg(long, action = ArgAction::SetTrue)]
    require_substances: bool,
    /// Fail on keys outside the recognized set.
    #[arg(long, action = ArgAction::SetTrue)]
    reject_unknown: bool,
    /// Emit validation events as JSON lines on stderr.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "audit_log")]
    audit: bool,
    /// Append validation events as JSON lines to a file.
    #[arg(long, value_name = "PATH")]
    audit_log: Option<PathBuf>,
}

/// Arguments for `config docs`.
#[derive(Args, Debug)]
struct ConfigDocsCommand {
    /// Output path (defaults to `Docs/configuration/muswea.toml.md`).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Verify the file matches generated output instead of writing it.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
}

/// Folds subcommands.
#[derive(Subcommand, Debug)]
enum FoldsCommand {
    /// Print the k-fold layout derived from the configuration.
    Split(FoldsSplitCommand),
    /// Print a repeated shuffled k-fold layout.
    Robust(FoldsRobustCommand),
}

/// Arguments for `folds split`.
#[derive(Args, Debug)]
struct FoldsSplitCommand {
    /// Number of samples to split.
    #[arg(long, value_name = "N")]
    samples: usize,
    /// Optional config file path; the default table is used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Emit the split event as a JSON line on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    audit: bool,
}

/// Arguments for `folds robust`.
#[derive(Args, Debug)]
struct FoldsRobustCommand {
    /// Number of samples to split.
    #[arg(long, value_name = "N")]
    samples: usize,
    /// Folds per repeat.
    #[arg(long, default_value_t = muswea_cv::splits::DEFAULT_ROBUST_SPLITS)]
    splits: usize,
    /// Number of repeats.
    #[arg(long, default_value_t = muswea_cv::splits::DEFAULT_ROBUST_REPEATS)]
    repeats: usize,
    /// Seed for drawing per-repeat random states (entropy when omitted).
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Emit the split event as a JSON line on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    audit: bool,
}

/// Output formats for fold commands.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Pretty-printed JSON output.
    Json,
}

/// JSON report for `folds split`.
#[derive(Serialize)]
struct SplitReport {
    /// Splitter settings.
    kfold: KFold,
    /// Folds keyed by fold number.
    folds: BTreeMap<usize, Fold>,
}

/// JSON report for `folds robust`.
#[derive(Serialize)]
struct RobustReport {
    /// Folds per repeat.
    n_splits: usize,
    /// Number of repeats.
    n_repeats: usize,
    /// Folds from every repeat, in order.
    folds: Vec<Fold>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("muswea {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Folds {
            command,
        } => command_folds(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Schema => command_config_schema(),
        ConfigCommand::Example => command_config_example(),
        ConfigCommand::Docs(command) => command_config_docs(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let validator = build_validator(command)?;
    let config = MusweaConfig::load_with(command.config.as_deref(), &validator)
        .map_err(|err| CliError::new(format!("Configuration error: {err}")))?;
    write_stdout_line("Configuration is valid.")
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    for line in config_lines(&config) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds the validator from command flags.
fn build_validator(command: &ConfigValidateCommand) -> CliResult<ConfigValidator> {
    let options = ValidationOptions {
        substances: if command.require_substances {
            SubstancePolicy::RequiredWithDefault(DEFAULT_CHEMICAL_SUBSTANCES.to_vec())
        } else {
            SubstancePolicy::Optional
        },
        unknown_keys: if command.reject_unknown {
            UnknownKeyPolicy::Reject
        } else {
            UnknownKeyPolicy::Preserve
        },
    };
    let sink = event_sink(command.audit, command.audit_log.as_deref())?;
    Ok(ConfigValidator::new(options).with_sink(sink))
}

/// Selects the event sink: file log, stderr, or no-op.
///
/// Clap rejects `--audit` combined with `--audit-log`.
fn event_sink(audit: bool, audit_log: Option<&Path>) -> CliResult<Arc<dyn EventSink>> {
    if let Some(path) = audit_log {
        let sink = FileEventSink::new(path).map_err(|err| {
            CliError::new(format!("Failed to open audit log {}: {err}", path.display()))
        })?;
        return Ok(Arc::new(sink));
    }
    if audit {
        return Ok(Arc::new(StderrEventSink));
    }
    Ok(Arc::new(NoopEventSink))
}

/// Renders `KEY: value` lines in reporting order.
fn config_lines(config: &MusweaConfig) -> Vec<String> {
    config.entries().into_iter().map(|(key, value)| format!("{key}: {value}")).collect()
}

/// Prints the configuration JSON schema.
fn command_config_schema() -> CliResult<ExitCode> {
    let schema = serde_json::to_string_pretty(&muswea_config::config_schema())
        .map_err(|err| CliError::new(format!("Failed to render schema: {err}")))?;
    write_stdout_line(&schema).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    let example = muswea_config::config_toml_example();
    write_stdout_line(example.trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes or verifies the generated configuration docs.
fn command_config_docs(command: &ConfigDocsCommand) -> CliResult<ExitCode> {
    let path = command.output.as_deref();
    if command.check {
        muswea_config::verify_config_docs(path)
            .map_err(|err| CliError::new(format!("Docs check failed: {err}")))?;
        write_stdout_line("Configuration docs are up to date.")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        muswea_config::write_config_docs(path)
            .map_err(|err| CliError::new(format!("Failed to write docs: {err}")))?;
        write_stdout_line("Configuration docs written.")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Folds Commands
// ============================================================================

/// Dispatches folds subcommands.
fn command_folds(command: FoldsCommand) -> CliResult<ExitCode> {
    match command {
        FoldsCommand::Split(command) => command_folds_split(&command),
        FoldsCommand::Robust(command) => command_folds_robust(&command),
    }
}

/// Prints the configured k-fold layout.
fn command_folds_split(command: &FoldsSplitCommand) -> CliResult<ExitCode> {
    let config = match command.config.as_deref() {
        Some(path) => MusweaConfig::load(Some(path)),
        None => muswea_config::load_and_validate(RawConfig::new()),
    }
    .map_err(|err| CliError::new(format!("Configuration error: {err}")))?;
    let kfold = KFold::from_config(&config)
        .map_err(|err| CliError::new(format!("Split error: {err}")))?;
    let sink = event_sink(command.audit, None)?;
    let rows = sample_rows(command.samples)?;
    let (folds, kfold) = create_kfold_splits(&rows, &rows, kfold, sink.as_ref())
        .map_err(|err| CliError::new(format!("Split error: {err}")))?;
    match command.format {
        OutputFormat::Json => write_json(&SplitReport {
            kfold,
            folds,
        }),
        OutputFormat::Text => write_folds_text(folds.iter().map(|(index, fold)| (*index, fold))),
    }
}

/// Prints a repeated shuffled k-fold layout.
fn command_folds_robust(command: &FoldsRobustCommand) -> CliResult<ExitCode> {
    let settings = RobustKFold {
        n_splits: command.splits,
        n_repeats: command.repeats,
    };
    let mut rng = command.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let sink = event_sink(command.audit, None)?;
    let rows = sample_rows(command.samples)?;
    let folds = robust_kfold_split(&rows, &rows, &settings, &mut rng, sink.as_ref())
        .map_err(|err| CliError::new(format!("Split error: {err}")))?;
    match command.format {
        OutputFormat::Json => write_json(&RobustReport {
            n_splits: settings.n_splits,
            n_repeats: settings.n_repeats,
            folds,
        }),
        OutputFormat::Text => write_folds_text(folds.iter().enumerate()),
    }
}

/// Builds placeholder rows for `samples`, rejecting counts above the limit.
fn sample_rows(samples: usize) -> CliResult<Vec<()>> {
    if samples > MAX_SAMPLES {
        let err = CvError::TooManySamples {
            n_samples: samples,
            max: MAX_SAMPLES,
        };
        return Err(CliError::new(format!("Split error: {err}")));
    }
    Ok(vec![(); samples])
}

/// Renders folds as `Fold i:` blocks.
fn fold_lines<'a>(folds: impl Iterator<Item = (usize, &'a Fold)>) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, fold) in folds {
        lines.push(format!("Fold {index}:"));
        lines.push(format!("  Train: index={}", index_list(&fold.train_index)));
        lines.push(format!("  Test:  index={}", index_list(&fold.test_index)));
    }
    lines
}

/// Formats indices as `[a, b, c]`.
fn index_list(indices: &[usize]) -> String {
    let items: Vec<String> = indices.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Writes fold blocks to stdout.
fn write_folds_text<'a>(folds: impl Iterator<Item = (usize, &'a Fold)>) -> CliResult<ExitCode> {
    for line in fold_lines(folds) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<ExitCode> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("Failed to render JSON: {err}")))?;
    write_stdout_line(&payload).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("Failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

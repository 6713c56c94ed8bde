//! Placement pipeline CLI.
//!
//! Local execution entry point. For the chat service, use `jobmail-web`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobmail::{
    config,
    error::Result,
    pipeline::{self, AbortOnFailure, ContinueOnFailure, FailurePolicy, Interactive, NbConvertRunner},
    state,
    utils::log as console,
};

/// jobmail - Placement Mail Analysis Pipeline
#[derive(Parser, Debug)]
#[command(
    name = "jobmail",
    version,
    about = "Incremental placement mail analysis pipeline"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute pipeline stages
    Run {
        /// First stage to run (1-based)
        #[arg(long)]
        start: Option<usize>,

        /// Last stage to run (1-based, inclusive)
        #[arg(long)]
        end: Option<usize>,

        /// Continue past stage failures without prompting
        #[arg(long)]
        continue_on_error: bool,

        /// Abort on the first stage failure without prompting
        #[arg(long, conflicts_with = "continue_on_error")]
        abort_on_error: bool,
    },

    /// List pipeline stages
    List,

    /// Show incremental processing state
    Status,

    /// Validate the configuration file
    Validate,

    /// Delete persisted state and checkpoint
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
    console::init(level);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run {
            start,
            end,
            continue_on_error,
            abort_on_error,
        } => {
            let (config, _document) = config::load(&cli.config)?;
            pipeline::check_prerequisites().await?;

            let stages = pipeline::stages();
            let range = match (start, end) {
                (None, None) => None,
                (s, e) => Some((s.unwrap_or(1), e.unwrap_or(stages.len()))),
            };

            let state_dir = PathBuf::from(&config.incremental_processing.state_directory);
            if config.incremental_processing.enabled {
                let processed = state::load_processed_ids(&config.incremental_processing.state_path());
                console::info(&format!(
                    "Incremental mode: {} message(s) already processed",
                    processed.len()
                ));

                let checkpoint = state::load_checkpoint(&state_dir);
                if !checkpoint.is_empty() {
                    console::warn(&format!(
                        "Found checkpoint from an interrupted run ({} message(s)); \
                         those will be skipped",
                        checkpoint.len()
                    ));
                }
                if config.incremental_processing.force_full_reprocess {
                    console::warn("force_full_reprocess is set: all messages will be reprocessed");
                }
            }

            let policy: Box<dyn FailurePolicy> = if continue_on_error {
                Box::new(ContinueOnFailure)
            } else if abort_on_error {
                Box::new(AbortOnFailure)
            } else {
                Box::new(Interactive)
            };

            let runner = NbConvertRunner::new();
            let summary = pipeline::run_pipeline(&stages, range, &runner, policy.as_ref()).await?;

            // A clean full-scope run has no interruption to resume from
            if summary.success()
                && covers_full_scope(range, stages.len())
                && config.incremental_processing.enabled
            {
                state::clear_checkpoint(&state_dir);
            }

            if !summary.success() {
                std::process::exit(1);
            }
        }

        Command::List => {
            let stages = pipeline::stages();
            console::header("PIPELINE STAGES");
            for (index, stage) in stages.iter().enumerate() {
                console::info(&format!("{}. {} - {}", index + 1, stage.name, stage.description));
                console::sub_item(&format!("notebook: {}", stage.notebook.display()));
                console::sub_item(&format!("output:   {}", stage.output.display()));
            }
        }

        Command::Status => {
            let (config, _document) = config::load(&cli.config)?;
            let state_dir = PathBuf::from(&config.incremental_processing.state_directory);
            let state_file = config.incremental_processing.state_path();

            let processed = state::load_processed_ids(&state_file);
            let checkpoint = state::load_checkpoint(&state_dir);

            console::header("PIPELINE STATUS");
            for (index, stage) in pipeline::stages().iter().enumerate() {
                match std::fs::metadata(&stage.output) {
                    Ok(meta) if meta.is_file() => console::info(&format!(
                        "{}. {} - output present ({} bytes)",
                        index + 1,
                        stage.name,
                        meta.len()
                    )),
                    Ok(_) => console::info(&format!(
                        "{}. {} - output present (directory)",
                        index + 1,
                        stage.name
                    )),
                    Err(_) => console::warn(&format!(
                        "{}. {} - output missing ({})",
                        index + 1,
                        stage.name,
                        stage.output.display()
                    )),
                }
            }

            console::summary(
                "STATE",
                &[
                    ("Enabled", config.incremental_processing.enabled.to_string()),
                    ("State file", state_file.display().to_string()),
                    ("Processed messages", processed.len().to_string()),
                    (
                        "Interrupted run",
                        if checkpoint.is_empty() {
                            "no".to_string()
                        } else {
                            format!("yes ({} message(s) in checkpoint)", checkpoint.len())
                        },
                    ),
                ],
            );
        }

        Command::Validate => {
            match config::load(&cli.config) {
                Ok(_) => console::success("Configuration is valid"),
                Err(e) => {
                    console::error(&format!("Configuration is invalid: {e}"));
                    std::process::exit(1);
                }
            }
        }

        Command::Reset { force } => {
            let (config, _document) = config::load(&cli.config)?;
            let state_dir = PathBuf::from(&config.incremental_processing.state_directory);
            let state_file = config.incremental_processing.state_path();

            if !force && !confirm("Delete all incremental state? (y/n): ") {
                console::info("Reset cancelled");
                return Ok(());
            }

            state::reset(&state_dir, &state_file);
            console::success("Incremental state reset");
        }
    }

    Ok(())
}

/// An omitted range and an explicit `[1, total]` both cover every stage.
fn covers_full_scope(range: Option<(usize, usize)>, total: usize) -> bool {
    range.is_none_or(|(start, end)| start == 1 && end == total)
}

fn confirm(prompt: &str) -> bool {
    use std::io::Write;

    print!("{prompt}");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::covers_full_scope;

    #[test]
    fn explicit_full_range_counts_as_full_scope() {
        assert!(covers_full_scope(None, 8));
        assert!(covers_full_scope(Some((1, 8)), 8));
        assert!(!covers_full_scope(Some((1, 7)), 8));
        assert!(!covers_full_scope(Some((2, 8)), 8));
    }
}

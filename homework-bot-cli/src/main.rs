mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::handlers::{self, RunArgs};

#[derive(Parser)]
#[command(name = "homework-bot")]
#[command(version)]
#[command(about = "Polls the homework review API and reports status changes to Telegram")]
#[command(
    help_template = "{name} - {version}\n{about}\n\n{usage-heading}\n  {usage}\n\n{all-args}{options}\n"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll for homework status changes
    ///
    /// Reads PRACTICUM_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT_ID from the
    /// environment (or the env file). Exits with status 1 if any is missing.
    ///
    /// Examples:
    ///   homework-bot run
    ///   homework-bot run --interval 300 --log-level info
    ///   homework-bot run --once --no-log-file
    Run {
        /// Path to configuration file (default: ~/.config/homework-bot/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Env file with credentials; missing file is ignored
        #[arg(long, default_value = ".env")]
        env_file: String,

        /// Seconds between polls (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Log level: error, warn, info, debug, trace (overrides config)
        #[arg(long)]
        log_level: Option<String>,

        /// Append-only log file (overrides config)
        #[arg(long, conflicts_with = "no_log_file")]
        log_file: Option<String>,

        /// Log to the console only
        #[arg(long)]
        no_log_file: bool,

        /// Persist the poll watermark in this file across restarts
        #[arg(long)]
        state_file: Option<String>,

        /// Poll once and exit instead of looping
        #[arg(long)]
        once: bool,
    },

    /// Show or initialize configuration
    Config {
        /// Write the default configuration file if it does not exist
        #[arg(long)]
        init: bool,

        /// Path to configuration file
        #[arg(long)]
        config_file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            env_file,
            interval,
            log_level,
            log_file,
            no_log_file,
            state_file,
            once,
        } => {
            handlers::handle_run(RunArgs {
                config,
                env_file,
                interval,
                log_level,
                log_file,
                no_log_file,
                state_file,
                once,
            })
            .await?;
        }
        Commands::Config { init, config_file } => {
            if init {
                handlers::handle_config_init(config_file)?;
            } else {
                handlers::handle_config_show(config_file)?;
            }
        }
    }

    Ok(())
}

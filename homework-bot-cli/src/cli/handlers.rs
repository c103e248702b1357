//! Command handlers

use anyhow::{Context, Result};
use homework_bot_core::error::ConfigError;
use homework_bot_core::models::{check_tokens, Configuration, LogLevel};
use homework_bot_core::services::init_logging;
use homework_bot_core::{PollOutcome, Poller};
use std::path::{Path, PathBuf};

/// Options of the `run` command
pub struct RunArgs {
    pub config: Option<String>,
    pub env_file: String,
    pub interval: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub no_log_file: bool,
    pub state_file: Option<String>,
    pub once: bool,
}

fn resolve_config_path(config_arg: Option<&str>) -> Result<PathBuf> {
    match config_arg {
        Some(arg) if arg.starts_with("~/") => {
            let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME not set"))?;
            Ok(PathBuf::from(arg.replacen("~/", &format!("{}/", home), 1)))
        }
        Some(arg) => Ok(PathBuf::from(arg)),
        None => Configuration::default_config_path()
            .map_err(|e| anyhow::anyhow!("Failed to get default config path: {}", e)),
    }
}

fn load_config(config_arg: Option<&str>) -> Result<Configuration> {
    let path = resolve_config_path(config_arg)?;
    Ok(Configuration::load_from_file(&path)?)
}

fn apply_overrides(config: &mut Configuration, args: &RunArgs) -> Result<()> {
    if let Some(interval) = args.interval {
        config.retry_seconds = interval;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if args.no_log_file {
        config.log_to_file = false;
    } else if let Some(path) = &args.log_file {
        config.log_to_file = true;
        config.log_file = PathBuf::from(path);
    }
    if let Some(path) = &args.state_file {
        config.state_file = Some(PathBuf::from(path));
    }
    Ok(())
}

fn describe_outcome(outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Notified { message, delivered } => {
            let suffix = if *delivered { "" } else { " (delivery failed)" };
            format!("notified: {}{}", message, suffix)
        }
        PollOutcome::NoChange => "no change".to_string(),
        PollOutcome::Failed { kind, message, .. } => format!("failed ({}): {}", kind, message),
    }
}

pub async fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;
    config.validate().map_err(ConfigError::Invalid)?;

    init_logging(config.log_level, config.log_file_path())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    tracing::debug!(
        endpoint = %config.endpoint,
        interval_secs = config.retry_seconds,
        state_file = ?config.state_file,
        "Configuration loaded"
    );

    let credentials = check_tokens(Some(Path::new(&args.env_file)))?;

    let mut poller =
        Poller::from_config(&config, &credentials).context("Failed to build HTTP client")?;

    if args.once {
        let outcome = poller.poll_once().await;
        println!("{}", describe_outcome(&outcome));
        return Ok(());
    }

    poller.run().await;
    Ok(())
}

pub fn handle_config_init(config_file: Option<String>) -> Result<()> {
    let config_path = resolve_config_path(config_file.as_deref())?;
    if config_path.exists() {
        println!(
            "Configuration already exists at {}; leaving it unchanged",
            config_path.display()
        );
        return Ok(());
    }
    Configuration::default()
        .save_to_file(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", config_path.display(), e))?;
    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}

pub fn handle_config_show(config_file: Option<String>) -> Result<()> {
    let config = load_config(config_file.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args() -> RunArgs {
        RunArgs {
            config: None,
            env_file: ".env".to_string(),
            interval: None,
            log_level: None,
            log_file: None,
            no_log_file: false,
            state_file: None,
            once: false,
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = Configuration::default();
        let args = RunArgs {
            interval: Some(30),
            log_level: Some("info".to_string()),
            log_file: Some("custom.log".to_string()),
            state_file: Some("state.json".to_string()),
            ..run_args()
        };
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.retry_seconds, 30);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.log_file_path(), Some(Path::new("custom.log")));
        assert_eq!(config.state_file, Some(PathBuf::from("state.json")));
    }

    #[test]
    fn test_no_log_file_disables_file_sink() {
        let mut config = Configuration::default();
        let args = RunArgs {
            no_log_file: true,
            ..run_args()
        };
        apply_overrides(&mut config, &args).unwrap();
        assert!(!config.log_to_file);
        assert_eq!(config.log_file_path(), None);
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let mut config = Configuration::default();
        let args = RunArgs {
            log_level: Some("shouty".to_string()),
            ..run_args()
        };
        assert!(apply_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_describe_outcome() {
        assert_eq!(describe_outcome(&PollOutcome::NoChange), "no change");
        assert_eq!(
            describe_outcome(&PollOutcome::Failed {
                kind: "protocol",
                message: "Program failure: boom".to_string(),
                notified: true,
            }),
            "failed (protocol): Program failure: boom"
        );
        assert_eq!(
            describe_outcome(&PollOutcome::Notified {
                message: "changed".to_string(),
                delivered: false,
            }),
            "notified: changed (delivery failed)"
        );
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docrecord_core::options::redact;
use docrecord_core::{ConnectionOptions, DocrecordConfig};
use tracing::debug;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Show the loaded config and the effective connection string
    Show,
}

/// Load `.env` files, returning the ones found.
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.docrecord/.env
///
/// Runs before argument parsing so `DOCRECORD_URL` can come from a `.env`
/// file; tracing is not up yet, so callers log the result themselves.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path);
    }

    let env_file = DocrecordConfig::config_dir().join(".env");
    // dotenvy doesn't overwrite existing vars, so this is safe
    if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
        loaded_from.push(env_file);
    }

    loaded_from
}

/// Config file location: `--config` or the default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(DocrecordConfig::config_path)
}

pub fn load_config(explicit: Option<&Path>) -> Result<DocrecordConfig> {
    let config = match explicit {
        Some(path) => DocrecordConfig::load_from(path)?,
        None => DocrecordConfig::load()?,
    };
    debug!(path = %config_path(explicit).display(), "Loaded config");
    Ok(config)
}

/// Where the provider should connect, and with which options.
#[derive(Debug)]
pub struct Resolved {
    pub connection_string: String,
    pub options: Option<ConnectionOptions>,
}

/// Pick the connection string: `--url` / `DOCRECORD_URL` first, then the
/// config file. Explicit options only ever come from the config file.
pub fn resolve(url: Option<String>, config: &DocrecordConfig) -> Result<Resolved> {
    let connection_string = url
        .or_else(|| config.connection_string.clone())
        .context(
            "No connection string: pass --url, set DOCRECORD_URL, \
             or add connection_string to the config file",
        )?;

    Ok(Resolved {
        connection_string,
        options: config.connection_options(),
    })
}

pub fn run_config(args: ConfigArgs, url: Option<String>, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Path => run_path(explicit),
        ConfigCommands::Show => run_show(url, explicit),
    }
}

fn run_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", config_path(explicit).display());
    Ok(())
}

fn run_show(url: Option<String>, explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit);
    let config = load_config(explicit)?;

    let toml_str =
        toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;

    println!("# {}", path.display());
    if !path.exists() {
        println!("# (file not found, using defaults)");
    }
    print!("{}", toml_str);

    match resolve(url, &config) {
        Ok(resolved) => println!("# effective connection: {}", redact(&resolved.connection_string)),
        Err(_) => println!("# effective connection: (none)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_beats_config_file() {
        let config = DocrecordConfig {
            connection_string: Some("mongodb://from-file/app".into()),
            options: None,
        };

        let resolved = resolve(Some("memory://flag".into()), &config).unwrap();
        assert_eq!(resolved.connection_string, "memory://flag");

        let resolved = resolve(None, &config).unwrap();
        assert_eq!(resolved.connection_string, "mongodb://from-file/app");
        assert!(resolved.options.is_none());
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = resolve(None, &DocrecordConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No connection string"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = Path::new("/tmp/elsewhere.toml");
        assert_eq!(config_path(Some(path)), path);
        assert_eq!(config_path(None), DocrecordConfig::config_path());
    }
}

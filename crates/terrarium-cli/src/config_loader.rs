//! Configuration loading and session setup for CLI commands

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use terrarium_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use terrarium_engine::{CredentialSource, Session};

use crate::cli::CredentialArgs;

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "terrarium.toml";

/// Load layered configuration: defaults, file, environment, then CLI overrides
pub fn load_config(path: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };
    if let Some(path) = path {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}

/// Pick the credential source: explicit flags first, then configuration
pub fn credential_source(args: &CredentialArgs, config: &LayeredConfig) -> Result<CredentialSource> {
    if let Some(path) = &args.key_file {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read key file {}", path.display()))?;
        return Ok(CredentialSource::KeyBytes(bytes));
    }

    let secret_id = match &args.secret {
        Some(secret_id) => Some(secret_id.clone()),
        None if config.secret_id.source != ConfigSource::Default => {
            Some(config.secret_id.value.clone())
        }
        None => None,
    };

    if let Some(secret_id) = secret_id {
        let project_id = config
            .require_project_id()
            .context("Reading credentials from Secret Manager needs a project (--project)")?;
        return Ok(CredentialSource::SecretManager { project_id: project_id.to_string(), secret_id });
    }

    Ok(CredentialSource::EnvironmentFile { variable: config.credentials_env.value.clone() })
}

/// Open an authenticated Earth Engine session
pub fn connect(args: &CredentialArgs, config: &LayeredConfig) -> Result<Session> {
    let source = credential_source(args, config)?;
    Session::connect(config, &source).context("Failed to open Earth Engine session")
}

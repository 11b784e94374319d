//! Secrets management for CodeGuardian
//!
//! Credentials live apart from configuration in
//! `~/.config/codeguardian/secrets.toml`, which must be mode 0600 on Unix.
//!
//! Loading priority:
//! 1. Environment variables (GITHUB_TOKEN, GEMINI_API_KEY)
//! 2. Secrets file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: TokenSecret,
    /// Gemini configuration
    pub gemini: ApiKeySecret,
}

/// A bearer token entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenSecret {
    pub token: Option<String>,
}

/// An API key entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiKeySecret {
    pub api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "{} is readable by group or others (mode {:o}); run `chmod 600 {}`",
                    path.display(),
                    mode,
                    path.display()
                )));
            }
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }
        if let Some(ref mut key) = secrets.gemini.api_key {
            *key = key.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("codeguardian").join("secrets.toml"))
    }

    /// GitHub token; GITHUB_TOKEN wins over the file
    pub fn github_token(&self) -> Option<String> {
        pick(
            "GITHUB_TOKEN",
            std::env::var("GITHUB_TOKEN").ok(),
            self.github.token.as_deref(),
        )
    }

    /// Gemini API key; GEMINI_API_KEY wins over the file
    pub fn gemini_api_key(&self) -> Option<String> {
        pick(
            "GEMINI_API_KEY",
            std::env::var("GEMINI_API_KEY").ok(),
            self.gemini.api_key.as_deref(),
        )
    }
}

fn pick(name: &str, from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    if let Some(value) = from_env {
        let value = value.trim().to_string();
        if !value.is_empty() {
            debug!(variable = name, "Using secret from environment");
            return Some(value);
        }
    }

    match from_file {
        Some(value) if !value.is_empty() => {
            debug!(variable = name, "Using secret from secrets file");
            Some(value.to_string())
        }
        _ => None,
    }
}

// SPDX-License-Identifier: Apache-2.0
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::settings::Environment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("firm configuration not found at {0}")]
    Missing(PathBuf),
    #[error("failed to read firm configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in firm configuration {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid TOML in firm configuration {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The responsible lawyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advogado {
    pub nome: String,
    pub oab: String,
    pub estado: String,
}

/// The firm signing the emails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escritorio {
    pub nome: String,
    pub endereco: String,
    pub telefone: String,
    pub email: String,
    pub site: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Firm and lawyer identity shared by every rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    pub advogado: Advogado,
    pub escritorio: Escritorio,
}

impl FirmConfig {
    /// Placeholder identity, only ever served in development
    pub fn placeholder() -> Self {
        Self {
            advogado: Advogado {
                nome: "Dra. Juliana Almeida".into(),
                oab: "98765".into(),
                estado: "RJ".into(),
            },
            escritorio: Escritorio {
                nome: "Almeida & Associados Advogados".into(),
                endereco: "Rua do Ouvidor, 50 - Centro, Rio de Janeiro/RJ".into(),
                telefone: "(21) 3333-4444".into(),
                email: "contato@almeidaadvocacia.com.br".into(),
                site: "https://almeidaadvocacia.com.br".into(),
                logo_url: None,
            },
        }
    }
}

/// Where the firm configuration lives
#[derive(Debug, Clone)]
pub struct FirmConfigSource {
    pub path: PathBuf,
}

impl FirmConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Loads the firm configuration.
///
/// A missing file is only tolerated in development, where the placeholder
/// firm is returned instead. A malformed file is always an error.
#[instrument(skip_all, fields(path = %source.path.display(), environment = %environment))]
pub fn load(source: &FirmConfigSource, environment: Environment) -> Result<FirmConfig, ConfigError> {
    let path = &source.path;
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if environment.is_development() {
                warn!("⚠️  No firm configuration at {}. Using development placeholder.", path.display());
                return Ok(FirmConfig::placeholder());
            }
            return Err(ConfigError::Missing(path.clone()));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.clone(),
                source,
            });
        }
    };

    let config = parse(path, &text)?;
    info!(firm = %config.escritorio.nome, "Firm configuration loaded");
    Ok(config)
}

fn parse(path: &Path, text: &str) -> Result<FirmConfig, ConfigError> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

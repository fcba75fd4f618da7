use crate::recipe::schema::{RecipeConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read recipe from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse recipe TOML: {0}")]
    Toml(#[from] toml_edit::de::Error),

    #[error("invalid recipe: {0}")]
    Validation(#[from] ValidationError),
}

pub fn load_from_str(input: &str) -> Result<RecipeConfig, ConfigError> {
    let config: RecipeConfig = toml_edit::de::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RecipeConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

pub mod inspect;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;

use enum_fields::{EnumFieldsConfig, Model};

/// Loads the declarations at `path` and defines every model they describe.
pub fn load_models(path: &Path) -> Result<Vec<Model>> {
    let config = EnumFieldsConfig::load(path)
        .with_context(|| format!("Failed to load enum field declarations from {}", path.display()))?;
    config
        .build_models()
        .with_context(|| format!("Failed to define enum fields declared in {}", path.display()))
}

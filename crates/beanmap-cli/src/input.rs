//! Loading the type table and configuration

use anyhow::{Context, Result};
use beanmap_codegen::MapperKind;
use beanmap_core::{ClassKind, Configuration, TypeSource, TypeTable};
use std::path::Path;

/// Load a JSON type table from a file
pub fn load_types(path: &Path) -> Result<TypeTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read type table: {}", path.display()))?;

    TypeTable::from_json_str(&content)
        .with_context(|| format!("Failed to parse type table: {}", path.display()))
}

/// Load a TOML configuration merged over the defaults, or the defaults alone
pub fn load_config(path: Option<&Path>) -> Result<Configuration> {
    let Some(path) = path else {
        return Ok(Configuration::with_defaults());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration: {}", path.display()))?;

    Configuration::from_toml_str(&content)
        .with_context(|| format!("Failed to parse configuration: {}", path.display()))
}

/// Every interface in the table that directly extends a mapper interface
pub fn discover_mappers(types: &dyn TypeSource) -> Vec<String> {
    types
        .classes()
        .into_iter()
        .filter(|class| class.kind == ClassKind::Interface)
        .filter(|class| {
            class
                .interfaces
                .iter()
                .filter_map(|ty| ty.class_name())
                .any(|name| MapperKind::from_interface(name).is_some())
        })
        .map(|class| class.name())
        .collect()
}

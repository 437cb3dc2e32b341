//! `description.txt` reader: a `key=value` properties file (spec §6),
//! carrying `max_gsl_length_m` and `max_isl_length_m` in every fixture this
//! workspace has seen.

use crate::error::CoreError;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct PropertiesConfig {
    values: HashMap<String, String>,
}

impl PropertiesConfig {
    pub fn from_str(contents: &str) -> Self {
        let mut values = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { values }
    }

    pub fn read(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::IoFailure {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_str(&contents))
    }

    pub fn get_property_or_fail(&self, key: &str) -> Result<&str, CoreError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CoreError::InvalidInput(format!("missing property: {key}")))
    }

    pub fn parse_positive_float(&self, key: &str) -> Result<f64, CoreError> {
        let raw = self.get_property_or_fail(key)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| CoreError::InvalidInput(format!("property {key} is not a float: {raw}")))?;
        if value <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "property {key} must be positive, got {value}"
            )));
        }
        Ok(value)
    }
}

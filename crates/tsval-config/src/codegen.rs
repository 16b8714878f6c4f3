//! Aggregated module generation options.

use serde::{Deserialize, Serialize};
use tsval_core::layout::AGGREGATED_FILE_NAME;
use tsval_core::{DuplicatePolicy, IdStrategy};

fn default_output_file_name() -> String {
    String::from(AGGREGATED_FILE_NAME)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodegenConfig {
    /// Handling of public functions whose names collide across validators.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Import-binding identifier strategy.
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Aggregated module file name inside the validation-code directory.
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            id_strategy: IdStrategy::default(),
            output_file_name: default_output_file_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = CodegenConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::KeepFirst);
        assert_eq!(config.id_strategy, IdStrategy::Random);
        assert_eq!(config.output_file_name, "validation.ts");
    }
}

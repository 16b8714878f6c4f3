//! Stage orchestration options.

use serde::{Deserialize, Serialize};

const fn default_parallel() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Rediscover compile inputs by scanning the schema directory instead of
    /// using the schema paths the builder just wrote.
    #[serde(default)]
    pub rescan_schema_dir: bool,

    /// Run per-module and per-schema units on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rescan_schema_dir: false,
            parallel: default_parallel(),
        }
    }
}

//! Engine configuration.

use std::time::Duration;

use derive_builder::Builder;

use crate::RENAME_CHANNEL_SIZE;

/// Configuration for rename runs.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Carry source timestamps over to the copies.
    #[builder(default = "true")]
    pub preserve_timestamps: bool,

    /// Pause between items.
    #[builder(default)]
    pub item_delay: Duration,

    /// Capacity of the event channel used by background runs.
    #[builder(default = "RENAME_CHANNEL_SIZE")]
    pub channel_size: usize,
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.channel_size == Some(0) {
            return Err("Channel size must be at least 1".to_string());
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Create a new engine config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            item_delay: Duration::ZERO,
            channel_size: RENAME_CHANNEL_SIZE,
        }
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Engine policy knobs. Everything else about matching behavior is a
/// fixed table compiled into the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Country assumed for channels with no detectable origin. Biases
    /// ranking toward that catalog; "us" preserves the historical
    /// behavior.
    pub default_country: String,
    /// How many channels the cooperative batch processes between yields.
    pub yield_every: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_country: "us".to_string(),
            yield_every: 10,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file; a missing file yields the
    /// defaults.
    pub fn load(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }
}

use anyhow::{Context, Result};
use planogram_core::{RuleSettings, Season};
use std::env;
use std::net::SocketAddr;
use std::path::Path;
use tracing::warn;

pub const ADDR_VAR: &str = "PLANOGRAM_API_ADDR";
pub const SEASON_VAR: &str = "PLANOGRAM_SEASON";
pub const RULES_VAR: &str = "PLANOGRAM_RULES_FILE";

/// Server settings, read once at startup.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: SocketAddr,
    /// Season forced on every request that does not name one
    pub season: Option<Season>,
    /// Rule settings for constraint requests that carry none
    pub rules: RuleSettings,
}

impl ApiConfig {
    pub const DEFAULT_ADDR: &'static str = "0.0.0.0:3000";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_string)
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr = match lookup(ADDR_VAR) {
            Some(raw) => match raw.parse::<SocketAddr>() {
                Ok(addr) => addr,
                Err(err) => {
                    warn!(
                        "Could not parse {} ('{}'): {}. Using {}.",
                        ADDR_VAR,
                        raw,
                        err,
                        Self::DEFAULT_ADDR
                    );
                    default_addr()
                }
            },
            None => default_addr(),
        };

        let season = match lookup(SEASON_VAR) {
            Some(raw) => {
                let season =
                    serde_json::from_value::<Season>(serde_json::Value::String(raw.to_lowercase()));
                match season {
                    Ok(season) => Some(season),
                    Err(_) => {
                        warn!(
                            "Unknown season '{}' in {}, using the system clock",
                            raw, SEASON_VAR
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let rules = match lookup(RULES_VAR) {
            Some(path) => load_rules(Path::new(&path))?,
            None => RuleSettings::default(),
        };

        Ok(Self {
            addr,
            season,
            rules,
        })
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn load_rules(path: &Path) -> Result<RuleSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule settings {}", path.display()))?;
    let rules: RuleSettings = serde_json::from_str(&content)
        .with_context(|| format!("Invalid rule settings {}", path.display()))?;
    rules.validate()?;
    Ok(rules)
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Ignoring {}: {}", name, err);
            None
        }
    }
}

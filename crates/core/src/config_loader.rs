use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment, Provider,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment prefix; nested keys are split on `__`
/// (e.g. `EXIT_PLAN_INSTRUMENTS__ES=50`).
pub const ENV_PREFIX: &str = "EXIT_PLAN_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering built-in defaults, the TOML file at
    /// `path` (skipped if missing) and `EXIT_PLAN_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        Self::layered(|| Toml::file(path))
    }

    /// Same as [`ConfigLoader::load`] but reads a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong type.
    pub fn load_json(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        Self::layered(|| Json::file(path))
    }

    fn layered<P: Provider>(file: impl Fn() -> P) -> Result<AppConfig> {
        let mut config: AppConfig = Self::defaults().merge(file()).merge(Self::env()).extract()?;

        // Env keys arrive lower-cased, so symbols are folded layer by layer
        // onto one upper-case key; later layers replace earlier ones.
        let mut instruments = BTreeMap::new();
        for layer in [
            Self::defaults(),
            Figment::from(file()),
            Figment::from(Self::env()),
        ] {
            let InstrumentLayer { instruments: symbols } = layer.extract()?;
            for (symbol, value) in symbols {
                instruments.insert(symbol.trim().to_ascii_uppercase(), value);
            }
        }
        config.instruments = instruments;

        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }
}

#[derive(Deserialize)]
struct InstrumentLayer {
    #[serde(default)]
    instruments: BTreeMap<String, Decimal>,
}

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_path_to_error as spte;

use crate::error::SimError;

/// Standard løpsdistanse (runder) når ingen er oppgitt.
pub const DEFAULT_NUM_LAPS: u32 = 56;

/// Vekt for sesonger som ikke står i tabellen.
pub const DEFAULT_SEASON_WEIGHT: f64 = 1.0;

/// Eldre sesonger veier mindre; nyeste veier mest.
static DEFAULT_WEIGHT_TABLE: Lazy<BTreeMap<i32, f64>> =
    Lazy::new(|| BTreeMap::from([(2022, 1.0), (2023, 2.0), (2024, 3.0), (2025, 4.0)]));

/// Sesong → recency-vekt, med fallback for ukjente sesonger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonWeights {
    #[serde(default)]
    pub weights: BTreeMap<i32, f64>,
    #[serde(default = "default_season_weight")]
    pub default_weight: f64,
}

fn default_season_weight() -> f64 {
    DEFAULT_SEASON_WEIGHT
}

impl Default for SeasonWeights {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHT_TABLE.clone(),
            default_weight: DEFAULT_SEASON_WEIGHT,
        }
    }
}

impl SeasonWeights {
    /// Flat vekting: alle sesonger får 1.0.
    pub fn uniform() -> Self {
        Self {
            weights: BTreeMap::new(),
            default_weight: DEFAULT_SEASON_WEIGHT,
        }
    }

    pub fn weight(&self, season: i32) -> f64 {
        self.weights
            .get(&season)
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.default_weight.is_finite() && self.default_weight >= 0.0) {
            return Err(SimError::InvalidDefaultWeight(self.default_weight));
        }
        for (&season, &weight) in &self.weights {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(SimError::InvalidSeasonWeight { season, weight });
            }
        }
        Ok(())
    }
}

/// Innstillinger for profilbyggeren.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOptions {
    #[serde(default)]
    pub season_weights: SeasonWeights,
    /// Dropp pit out-runder før aggregering (av som standard).
    #[serde(default)]
    pub exclude_pit_out_laps: bool,
}

/// Full konfigurasjon for én simuleringskjøring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub profile: ProfileOptions,
    #[serde(default = "default_num_laps")]
    pub num_laps: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_num_laps() -> u32 {
    DEFAULT_NUM_LAPS
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            profile: ProfileOptions::default(),
            num_laps: DEFAULT_NUM_LAPS,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_laps == 0 {
            return Err(SimError::InvalidLapCount(self.num_laps));
        }
        self.profile.season_weights.validate()
    }
}

/// Parser og validerer konfig fra JSON-tekst. Feilmeldingen peker på feltet som feilet.
pub fn parse_config(json: &str, origin: &str) -> Result<SimConfig, SimError> {
    let mut de = serde_json::Deserializer::from_str(json);
    let config: SimConfig = spte::deserialize(&mut de).map_err(|e| SimError::ConfigParse {
        path: origin.to_string(),
        field: e.path().to_string(),
        message: e.inner().to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Leser konfig fra disk (JSON).
/// Hvis filen ikke finnes, returneres standardkonfig.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig, SimError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    if !path.exists() {
        warn!("fant ikke konfig på {display}, bruker standardverdier");
        return Ok(SimConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
        path: display.clone(),
        source,
    })?;
    let config = parse_config(&contents, &display)?;
    info!(
        "konfig lastet fra {display} (num_laps={}, seasons_weighted={})",
        config.num_laps,
        config.profile.season_weights.weights.len()
    );
    Ok(config)
}

/// Lagrer konfig til disk som JSON (pretty-print).
pub fn save_config(config: &SimConfig, path: impl AsRef<Path>) -> Result<(), SimError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let json = serde_json::to_string_pretty(config).map_err(|e| SimError::ConfigParse {
        path: display.clone(),
        field: ".".to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|source| SimError::ConfigIo {
        path: display.clone(),
        source,
    })?;
    info!("konfig lagret til {display}");
    Ok(())
}

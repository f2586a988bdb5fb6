use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_path_to_error as spte;

use crate::config::{ProfileOptions, SimConfig, DEFAULT_NUM_LAPS};
use crate::profile::build_profile;
use crate::ranking::{compute_podium, rank_positions};
use crate::report::predict_race;
use crate::simulator::generate_race_seeded;
use crate::types::{
    CompetitorDirectory, HistoricalRaces, LapRecord, ProfileMap, SeasonData, SimulatedLap,
};

// ──────────────────────────────────────────────────────────────────────────────
// TOLERANT INPUT (OpenF1-feltnavn aksepteres som aliaser)
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdIn {
    Num(i64),
    Float(f64),
    Str(String),
}

impl IdIn {
    fn into_string(self) -> String {
        match self {
            IdIn::Num(n) => n.to_string(),
            // 44.0 fra pandas/numpy skal gi samme nøkkel som 44
            IdIn::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
            IdIn::Float(v) => v.to_string(),
            IdIn::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LapIn {
    #[serde(alias = "driver_number")]
    competitor_id: IdIn,
    lap_number: u32,
    #[serde(default)]
    lap_duration: Option<f64>,
    #[serde(default)]
    is_pit_out_lap: Option<bool>,
    #[serde(default, alias = "compound")]
    tire_compound: Option<String>,
}

impl LapIn {
    fn into_record(self, season: i32) -> LapRecord {
        LapRecord {
            competitor_id: self.competitor_id.into_string(),
            lap_number: self.lap_number,
            lap_duration: self.lap_duration,
            is_pit_out_lap: self.is_pit_out_lap.unwrap_or(false),
            season,
            tire_compound: self.tire_compound,
        }
    }
}

/// Sesong → runder; `null` = sesongen kunne ikke hentes.
type SeasonsIn = BTreeMap<i32, Option<Vec<LapIn>>>;

fn to_history(seasons: SeasonsIn) -> HistoricalRaces {
    seasons
        .into_iter()
        .map(|(season, laps)| {
            let data = match laps {
                Some(laps) => SeasonData::Available(
                    laps.into_iter().map(|l| l.into_record(season)).collect(),
                ),
                None => SeasonData::Unavailable {
                    reason: "no data supplied".to_string(),
                },
            };
            (season, data)
        })
        .collect()
}

fn parse<T: DeserializeOwned>(json_in: &str, what: &str) -> Result<T, String> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    spte::deserialize(&mut de).map_err(|e| {
        let path = e.path().to_string();
        format!("parse error ({what}) at {path}: {}", e.inner())
    })
}

fn emit<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialize error: {e}"))
}

// ──────────────────────────────────────────────────────────────────────────────
// ENTRY POINTS
// ──────────────────────────────────────────────────────────────────────────────

/// `{"seasons": {...}, "options"?: {...}}` → `{competitor_id: profile}`
pub fn build_profile_json(json_in: &str) -> Result<String, String> {
    #[derive(Deserialize)]
    struct ProfileIn {
        seasons: SeasonsIn,
        #[serde(default)]
        options: ProfileOptions,
    }

    let parsed: ProfileIn = parse(json_in, "ProfileIn")?;
    parsed
        .options
        .season_weights
        .validate()
        .map_err(|e| e.to_string())?;
    emit(&build_profile(&to_history(parsed.seasons), &parsed.options))
}

/// `{"profiles": {...}, "num_laps"?: 56, "seed"?: u64}` → `[SimulatedLap]`
pub fn simulate_race_json(json_in: &str) -> Result<String, String> {
    #[derive(Deserialize)]
    struct SimulateIn {
        profiles: ProfileMap,
        #[serde(default = "default_laps")]
        num_laps: u32,
        #[serde(default)]
        seed: Option<u64>,
    }
    fn default_laps() -> u32 {
        DEFAULT_NUM_LAPS
    }

    let parsed: SimulateIn = parse(json_in, "SimulateIn")?;
    let laps = generate_race_seeded(&parsed.profiles, parsed.num_laps, parsed.seed)
        .map_err(|e| e.to_string())?;
    emit(&laps)
}

/// `[SimulatedLap]` → `[PositionEntry]`
pub fn rank_positions_json(json_in: &str) -> Result<String, String> {
    let laps: Vec<SimulatedLap> = parse(json_in, "SimulatedLaps")?;
    emit(&rank_positions(&laps))
}

/// `[SimulatedLap]` → `[PodiumEntry]`
pub fn compute_podium_json(json_in: &str) -> Result<String, String> {
    let laps: Vec<SimulatedLap> = parse(json_in, "SimulatedLaps")?;
    emit(&compute_podium(&laps))
}

/// `{"seasons": {...}, "config"?: {...}, "competitors"?: {id: {name, team}}}` → RaceReport
pub fn predict_race_json(json_in: &str) -> Result<String, String> {
    #[derive(Deserialize)]
    struct PredictIn {
        seasons: SeasonsIn,
        #[serde(default)]
        config: SimConfig,
        #[serde(default)]
        competitors: CompetitorDirectory,
    }

    let parsed: PredictIn = parse(json_in, "PredictIn")?;
    let report = predict_race(&to_history(parsed.seasons), &parsed.config, &parsed.competitors)
        .map_err(|e| e.to_string())?;
    emit(&report)
}

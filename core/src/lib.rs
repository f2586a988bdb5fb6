//! Race outcome simulation core.
//!
//! Kjeden er `build_profile` → `generate_race` → `rank_positions` / `compute_podium`.
//! All I/O (henting av historikk, cache, visning) ligger utenfor kjernen;
//! `history`, `cache` og `cli` er tynne adaptere rundt den.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod json_api;
pub mod metrics;
pub mod profile;
pub mod ranking;
pub mod report;
pub mod simulator;
pub mod stats;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use config::{load_config, save_config, ProfileOptions, SeasonWeights, SimConfig};
pub use error::SimError;
pub use profile::build_profile;
pub use ranking::{compute_podium, rank_positions};
pub use report::{format_lap_time, predict_race, RaceReport};
pub use simulator::{generate_race, generate_race_seeded};
pub use types::*;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::profile::build_profile;
use crate::ranking::{compute_podium, rank_positions};
use crate::simulator::generate_race_seeded;
use crate::types::{CompetitorDirectory, HistoricalRaces, PodiumRow, PositionEntry};

/// Resultat av én simuleringskjøring, klar for dashboardet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceReport {
    pub generated_at: DateTime<Utc>,
    pub num_laps: u32,
    pub seed: Option<u64>,
    pub simulated_laps: usize,
    pub competitors: usize,
    pub podium: Vec<PodiumRow>,
    pub positions: Vec<PositionEntry>,
}

impl RaceReport {
    /// Tom rapport = ikke nok data; dashboardet viser "insufficient data".
    pub fn has_data(&self) -> bool {
        self.simulated_laps > 0
    }
}

/// Profil → simulering → plasseringer → pall, med visningsdata koblet på til slutt.
pub fn predict_race(
    history: &HistoricalRaces,
    config: &SimConfig,
    directory: &CompetitorDirectory,
) -> Result<RaceReport, SimError> {
    config.validate()?;

    let profiles = build_profile(history, &config.profile);
    let simulated = generate_race_seeded(&profiles, config.num_laps, config.seed)?;
    let positions = rank_positions(&simulated);
    let podium = compute_podium(&simulated)
        .into_iter()
        .map(|entry| {
            let info = directory.display_for(&entry.competitor_id);
            PodiumRow {
                entry,
                name: info.name,
                team: info.team,
            }
        })
        .collect::<Vec<_>>();

    info!(
        "simulering ferdig: {} deltakere, {} runder, pall={:?}",
        profiles.len(),
        simulated.len(),
        podium.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
    );

    Ok(RaceReport {
        generated_at: Utc::now(),
        num_laps: config.num_laps,
        seed: config.seed,
        simulated_laps: simulated.len(),
        competitors: profiles.len(),
        podium,
        positions,
    })
}

/// Rundetid som MM:SS.mmm (avkortet, ikke avrundet).
pub fn format_lap_time(seconds: f64) -> String {
    if !(seconds.is_finite() && seconds >= 0.0) {
        return "--:--.---".to_string();
    }
    // avrunding til hele ms før oppdeling, ellers blir 91.3 til 01:31.299
    let total_ms = (seconds * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{minutes:02}:{secs:02}.{millis:03}")
}

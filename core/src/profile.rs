use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::config::ProfileOptions;
use crate::stats::{mean, median, population_std_dev};
use crate::types::{HistoricalRaces, PerformanceProfile, ProfileMap, SeasonData};

/// Løpende akkumulator per deltaker mens sesongene foldes inn.
#[derive(Debug)]
struct Accumulator {
    best_lap: f64,
    weighted: Vec<f64>,
    seasons: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            best_lap: f64::INFINITY,
            weighted: Vec::new(),
            seasons: 0,
        }
    }

    fn finish(self, competitor_id: String) -> Option<PerformanceProfile> {
        Some(PerformanceProfile {
            average_lap: mean(&self.weighted)?,
            std_dev: population_std_dev(&self.weighted)?,
            median_lap: median(&self.weighted)?,
            best_lap: self.best_lap,
            seasons_observed: self.seasons,
            competitor_id,
        })
    }
}

/// Bygger ytelsesprofil per deltaker fra historiske løp.
///
/// - `best_lap` er uvektet minimum av alle gyldige runder.
/// - snitt/sd/median regnes over `rundetid × sesongvekt` (bevisst, ikke et vektet snitt).
/// - sesonger uten data hoppes over og logges; deltakere uten gyldige runder utelates.
pub fn build_profile(history: &HistoricalRaces, options: &ProfileOptions) -> ProfileMap {
    let mut acc: BTreeMap<String, Accumulator> = BTreeMap::new();

    for (&season, data) in history {
        let laps = match data {
            SeasonData::Available(laps) => laps,
            SeasonData::Unavailable { reason } => {
                warn!("sesong {season} hoppet over: {reason}");
                continue;
            }
        };

        let weight = options.season_weights.weight(season);
        let mut seen_this_season: BTreeSet<&str> = BTreeSet::new();
        let mut used = 0usize;

        for lap in laps {
            if options.exclude_pit_out_laps && lap.is_pit_out_lap {
                continue;
            }
            let Some(duration) = lap.valid_duration() else {
                continue;
            };

            let entry = acc
                .entry(lap.competitor_id.clone())
                .or_insert_with(Accumulator::new);
            entry.best_lap = entry.best_lap.min(duration);
            entry.weighted.push(duration * weight);
            if seen_this_season.insert(lap.competitor_id.as_str()) {
                entry.seasons += 1;
            }
            used += 1;
        }

        if used == 0 {
            info!("sesong {season}: ingen gyldige runder");
        } else {
            debug!(
                "sesong {season}: {used} runder, {} deltakere, vekt {weight}",
                seen_this_season.len()
            );
        }
    }

    acc.into_iter()
        .filter_map(|(id, a)| {
            let out = a.finish(id.clone());
            if out.is_none() {
                debug!("deltaker {id} uten gyldige runder utelatt");
            }
            out.map(|p| (id, p))
        })
        .collect()
}

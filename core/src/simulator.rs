use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::types::{PerformanceProfile, ProfileMap, SimulatedLap};

/// Kalde dekk på første runde.
pub const FIRST_LAP_MULTIPLIER: f64 = 1.02;
/// Slitasje/drivstoff-hale på de siste rundene.
pub const TAIL_MULTIPLIER: f64 = 1.01;
/// Antall runder i halen.
pub const TAIL_LAPS: i64 = 5;
/// Støyens sd = profilens sd × denne.
pub const JITTER_SCALE: f64 = 0.5;

/// Rundemultiplikator. Runde 1 sjekkes først og vinner over halen,
/// også når halen overlapper første runde i korte løp.
pub fn lap_multiplier(lap_number: u32, num_laps: u32) -> f64 {
    if lap_number == 1 {
        FIRST_LAP_MULTIPLIER
    } else if i64::from(lap_number) > i64::from(num_laps) - TAIL_LAPS {
        TAIL_MULTIPLIER
    } else {
        1.0
    }
}

fn jitter_for(profile: &PerformanceProfile) -> Result<Normal<f64>, SimError> {
    if !(profile.best_lap.is_finite() && profile.best_lap >= 0.0) {
        return Err(SimError::InvalidBestLap {
            competitor_id: profile.competitor_id.clone(),
            best_lap: profile.best_lap,
        });
    }
    let invalid_sd = || SimError::InvalidStdDev {
        competitor_id: profile.competitor_id.clone(),
        std_dev: profile.std_dev,
    };
    if !(profile.std_dev.is_finite() && profile.std_dev >= 0.0) {
        return Err(invalid_sd());
    }
    Normal::new(0.0, profile.std_dev * JITTER_SCALE).map_err(|_| invalid_sd())
}

/// Genererer et fullt syntetisk løp: hver deltaker × runde 1..=num_laps.
///
/// Rundetid = max(best_lap × multiplikator + N(0, sd·0.5), best_lap).
/// Ingen simulert runde kan være raskere enn deltakerens historiske beste.
pub fn generate_race<R: Rng + ?Sized>(
    profiles: &ProfileMap,
    num_laps: u32,
    rng: &mut R,
) -> Result<Vec<SimulatedLap>, SimError> {
    if num_laps == 0 {
        return Err(SimError::InvalidLapCount(num_laps));
    }
    if profiles.is_empty() {
        return Ok(Vec::new());
    }

    // valider alt før første trekk, så en feil ikke gir halvferdig løp
    let jitters = profiles
        .values()
        .map(jitter_for)
        .collect::<Result<Vec<_>, _>>()?;

    let mut laps = Vec::with_capacity(profiles.len() * num_laps as usize);
    for ((competitor_id, profile), jitter) in profiles.iter().zip(jitters) {
        let base = profile.best_lap;
        for lap_number in 1..=num_laps {
            let candidate = base * lap_multiplier(lap_number, num_laps) + jitter.sample(rng);
            laps.push(SimulatedLap {
                competitor_id: competitor_id.clone(),
                lap_number,
                lap_duration: candidate.max(base),
                is_simulated: true,
            });
        }
    }

    debug!(
        "simulerte {} runder for {} deltakere",
        laps.len(),
        profiles.len()
    );
    Ok(laps)
}

/// Som `generate_race`, men eier RNG selv. `Some(seed)` gir reproduserbart løp.
pub fn generate_race_seeded(
    profiles: &ProfileMap,
    num_laps: u32,
    seed: Option<u64>,
) -> Result<Vec<SimulatedLap>, SimError> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    generate_race(profiles, num_laps, &mut rng)
}

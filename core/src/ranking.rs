use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use crate::types::{PodiumEntry, PositionEntry, SimulatedLap};

/// Antall pallplasser.
pub const PODIUM_SIZE: usize = 3;

/// Runde → rundene i den, i opprinnelig rekkefølge.
fn group_by_lap(laps: &[SimulatedLap]) -> BTreeMap<u32, Vec<&SimulatedLap>> {
    let mut groups: BTreeMap<u32, Vec<&SimulatedLap>> = BTreeMap::new();
    for lap in laps {
        groups.entry(lap.lap_number).or_default().push(lap);
    }
    groups
}

/// Stabil sortering på rundetid: like tider beholder input-rekkefølgen.
fn sort_fastest_first(group: &mut [&SimulatedLap]) {
    group.sort_by_key(|l| OrderedFloat(l.lap_duration));
}

/// Plassering per runde: raskest = 1. Utdata gruppert på runde (stigende),
/// innen runden sortert på plassering.
pub fn rank_positions(laps: &[SimulatedLap]) -> Vec<PositionEntry> {
    let mut out = Vec::with_capacity(laps.len());
    for (lap_number, mut group) in group_by_lap(laps) {
        sort_fastest_first(&mut group);
        out.extend(group.into_iter().enumerate().map(|(i, l)| PositionEntry {
            lap_number,
            competitor_id: l.competitor_id.clone(),
            position: i + 1,
            lap_time: l.lap_duration,
        }));
    }
    out
}

/// Topp 3 fra siste runde. `best_lap_overall` er deltakerens raskeste
/// runde i hele det simulerte løpet, ikke bare siste runde.
pub fn compute_podium(laps: &[SimulatedLap]) -> Vec<PodiumEntry> {
    let Some(final_lap) = laps.iter().map(|l| l.lap_number).max() else {
        return Vec::new();
    };

    let mut best: HashMap<&str, f64> = HashMap::new();
    for l in laps {
        best.entry(l.competitor_id.as_str())
            .and_modify(|b| *b = b.min(l.lap_duration))
            .or_insert(l.lap_duration);
    }

    let mut finishers: Vec<&SimulatedLap> =
        laps.iter().filter(|l| l.lap_number == final_lap).collect();
    sort_fastest_first(&mut finishers);

    finishers
        .into_iter()
        .take(PODIUM_SIZE)
        .zip(1u8..)
        .map(|(l, rank)| PodiumEntry {
            rank,
            competitor_id: l.competitor_id.clone(),
            best_lap_overall: best
                .get(l.competitor_id.as_str())
                .copied()
                .unwrap_or(l.lap_duration),
            final_lap_time: l.lap_duration,
        })
        .collect()
}

/// Stillingen på én runde, sortert på plassering.
pub fn leaderboard_at(positions: &[PositionEntry], lap_number: u32) -> Vec<PositionEntry> {
    let mut rows: Vec<PositionEntry> = positions
        .iter()
        .filter(|p| p.lap_number == lap_number)
        .cloned()
        .collect();
    rows.sort_by_key(|p| p.position);
    rows
}

/// (runde, rundetid) for én deltaker, sortert på runde.
pub fn lap_series(laps: &[SimulatedLap], competitor_id: &str) -> Vec<(u32, f64)> {
    let mut series: Vec<(u32, f64)> = laps
        .iter()
        .filter(|l| l.competitor_id == competitor_id)
        .map(|l| (l.lap_number, l.lap_duration))
        .collect();
    series.sort_by_key(|(lap, _)| *lap);
    series
}

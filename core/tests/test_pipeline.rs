// core/tests/test_pipeline.rs
use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use racesim_core::cache::SimulationCache;
use racesim_core::cli::render_race_report;
use racesim_core::metrics::{race_cache_hit_total, race_cache_miss_total, Metrics};
use racesim_core::{
    predict_race, CompetitorDirectory, CompetitorInfo, HistoricalRaces, LapRecord, SeasonData,
    SimConfig, SimError,
};

fn season(season: i32, rows: &[(&str, &[f64])]) -> SeasonData {
    let mut laps = Vec::new();
    for (id, times) in rows {
        for (i, t) in times.iter().enumerate() {
            laps.push(LapRecord {
                competitor_id: id.to_string(),
                lap_number: i as u32 + 1,
                lap_duration: Some(*t),
                is_pit_out_lap: false,
                season,
                tire_compound: Some("MEDIUM".to_string()),
            });
        }
    }
    SeasonData::Available(laps)
}

fn history() -> HistoricalRaces {
    BTreeMap::from([
        (2023, season(2023, &[("1", &[96.2, 97.0, 96.8]), ("44", &[96.9, 97.4, 97.1])])),
        (2024, season(2024, &[("1", &[95.8, 96.4]), ("16", &[96.1, 96.0]), ("44", &[96.5, 96.9])])),
        (
            2025,
            SeasonData::Unavailable {
                reason: "session not published".to_string(),
            },
        ),
    ])
}

fn directory() -> CompetitorDirectory {
    [
        ("1", "VER", "Red Bull Racing"),
        ("44", "HAM", "Ferrari"),
    ]
    .into_iter()
    .map(|(id, name, team)| {
        (
            id.to_string(),
            CompetitorInfo {
                name: name.to_string(),
                team: team.to_string(),
            },
        )
    })
    .collect()
}

fn config(seed: u64) -> SimConfig {
    SimConfig {
        num_laps: 56,
        seed: Some(seed),
        ..SimConfig::default()
    }
}

#[test]
fn full_pipeline_produces_podium_and_positions() {
    let report = predict_race(&history(), &config(11), &directory()).unwrap();

    assert!(report.has_data());
    assert_eq!(report.competitors, 3);
    assert_eq!(report.simulated_laps, 3 * 56);
    assert_eq!(report.positions.len(), 3 * 56);
    assert_eq!(report.podium.len(), 3);

    // ukjent id får fallback-navn
    let p16 = report
        .podium
        .iter()
        .find(|r| r.entry.competitor_id == "16")
        .expect("16 skal være på pallen med tre deltakere");
    assert_eq!(p16.name, "DRV16");
    assert_eq!(p16.team, "Unknown");

    let ver = report
        .podium
        .iter()
        .find(|r| r.entry.competitor_id == "1")
        .unwrap();
    assert_eq!(ver.name, "VER");
}

#[test]
fn seeded_pipeline_is_reproducible() {
    let a = predict_race(&history(), &config(5), &directory()).unwrap();
    let b = predict_race(&history(), &config(5), &directory()).unwrap();
    assert_eq!(a.podium, b.podium);
    assert_eq!(a.positions, b.positions);
}

#[test]
fn empty_history_gives_empty_report_not_error() {
    let report = predict_race(&HistoricalRaces::new(), &config(1), &directory()).unwrap();
    assert!(!report.has_data());
    assert!(report.podium.is_empty());
    assert!(report.positions.is_empty());
    assert_eq!(report.competitors, 0);

    let text = render_race_report(&report, &directory());
    assert!(text.contains("Insufficient"), "tekst: {text}");
}

#[test]
fn invalid_config_fails_fast() {
    let mut cfg = config(1);
    cfg.num_laps = 0;
    let err = predict_race(&history(), &cfg, &directory()).unwrap_err();
    assert!(matches!(err, SimError::InvalidLapCount(0)));

    let mut cfg = config(1);
    cfg.profile.season_weights.weights.insert(2024, f64::NAN);
    let err = predict_race(&history(), &cfg, &directory()).unwrap_err();
    assert!(matches!(err, SimError::InvalidSeasonWeight { season: 2024, .. }));
}

#[test]
fn rendered_report_lists_podium_and_leaderboard() {
    let report = predict_race(&history(), &config(3), &directory()).unwrap();
    let text = render_race_report(&report, &directory());
    assert!(text.contains("Podium:"));
    assert!(text.contains("Leaderboard (lap 56):"));
    assert!(text.contains("P1 "));
    assert!(text.contains("VER"));
}

#[test]
fn cache_computes_once_per_session_key() {
    let cache = SimulationCache::new();
    let metrics = Metrics::new().unwrap();
    let calls = Cell::new(0);

    let run = || {
        calls.set(calls.get() + 1);
        predict_race(&history(), &config(8), &directory())
    };

    let first = cache.get_or_compute("9662", &metrics, run).unwrap();
    let second = cache
        .get_or_compute("9662", &metrics, || {
            calls.set(calls.get() + 1);
            predict_race(&history(), &config(8), &directory())
        })
        .unwrap();

    assert_eq!(calls.get(), 1, "andre kall skal treffe cachen");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(race_cache_miss_total(&metrics).get(), 1);
    assert_eq!(race_cache_hit_total(&metrics).get(), 1);
    assert_eq!(metrics.race_cache_computed_total(), 1);
    assert_eq!(metrics.race_cache_computed_laps_total(), first.simulated_laps as u64);
    assert_eq!(cache.len(), 1);

    assert!(cache.invalidate("9662"));
    assert!(cache.is_empty());
}

#[test]
fn failed_computation_is_not_cached() {
    let cache = SimulationCache::new();
    let metrics = Metrics::new().unwrap();
    let mut bad = config(1);
    bad.num_laps = 0;

    assert!(cache
        .get_or_compute("x", &metrics, || predict_race(&history(), &bad, &directory()))
        .is_err());
    assert!(cache.is_empty());

    let ok = cache
        .get_or_compute("x", &metrics, || predict_race(&history(), &config(1), &directory()))
        .unwrap();
    assert!(ok.has_data());
    assert_eq!(race_cache_miss_total(&metrics).get(), 2);
}

#[test]
fn slow_key_does_not_block_other_keys() {
    let cache = Arc::new(SimulationCache::new());
    let metrics = Metrics::new().unwrap();
    let a_done = Arc::new(AtomicBool::new(false));
    let (started_tx, started_rx) = mpsc::channel();

    let worker = {
        let cache = Arc::clone(&cache);
        let metrics = metrics.clone();
        let a_done = Arc::clone(&a_done);
        thread::spawn(move || {
            let out = cache.get_or_compute("A", &metrics, || {
                started_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(500));
                predict_race(&history(), &config(1), &directory())
            });
            a_done.store(true, Ordering::SeqCst);
            out
        })
    };

    started_rx.recv().unwrap();
    let t0 = Instant::now();
    let b = cache
        .get_or_compute("B", &metrics, || {
            predict_race(&history(), &config(2), &directory())
        })
        .unwrap();
    let waited = t0.elapsed();

    assert!(b.has_data());
    assert!(
        !a_done.load(Ordering::SeqCst),
        "B skal bli ferdig mens A fortsatt beregnes"
    );
    assert!(waited < Duration::from_millis(250), "B ventet {waited:?}");

    assert!(worker.join().unwrap().unwrap().has_data());
    assert_eq!(cache.len(), 2);
    assert_eq!(metrics.race_cache_computed_total(), 2);
}

#[test]
fn metrics_registry_exposes_cache_counters() {
    let metrics = Metrics::new().unwrap();
    let names: Vec<String> = metrics
        .registry()
        .gather()
        .iter()
        .map(|f| f.get_name().to_string())
        .collect();
    for expected in [
        "racesim_race_cache_computed_total",
        "racesim_race_cache_computed_laps_total",
        "racesim_race_cache_hit_total",
        "racesim_race_cache_miss_total",
    ] {
        assert!(names.iter().any(|n| n == expected), "mangler {expected}: {names:?}");
    }
}

#[test]
fn directory_insert_overrides_fallback_name() {
    let mut dir = CompetitorDirectory::new();
    assert!(dir.is_empty());
    assert_eq!(dir.display_for("16").name, "DRV16");

    dir.insert(
        "16",
        CompetitorInfo {
            name: "LEC".to_string(),
            team: "Ferrari".to_string(),
        },
    );
    assert_eq!(dir.len(), 1);
    assert!(!dir.is_empty());

    let report = predict_race(&history(), &config(4), &dir).unwrap();
    let p16 = report
        .podium
        .iter()
        .find(|r| r.entry.competitor_id == "16")
        .unwrap();
    assert_eq!(p16.name, "LEC");
    assert_eq!(p16.team, "Ferrari");
}

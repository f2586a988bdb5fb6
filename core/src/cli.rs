use std::fmt::Write;

use crate::ranking::leaderboard_at;
use crate::report::{format_lap_time, RaceReport};
use crate::types::CompetitorDirectory;

/// Tekstrapport: pall + stilling på siste runde.
pub fn render_race_report(report: &RaceReport, directory: &CompetitorDirectory) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "--- Race Simulation ({} laps) ---", report.num_laps);
    if !report.has_data() {
        let _ = writeln!(out, "Insufficient historical data for a simulation.");
        return out;
    }
    let _ = writeln!(
        out,
        "Competitors: {}  Simulated laps: {}",
        report.competitors, report.simulated_laps
    );

    let _ = writeln!(out, "Podium:");
    for row in &report.podium {
        let _ = writeln!(
            out,
            "  P{} {:<6} {:<20} final {}  best {}",
            row.entry.rank,
            row.name,
            row.team,
            format_lap_time(row.entry.final_lap_time),
            format_lap_time(row.entry.best_lap_overall),
        );
    }

    let final_lap = report
        .positions
        .iter()
        .map(|p| p.lap_number)
        .max()
        .unwrap_or(report.num_laps);
    let _ = writeln!(out, "Leaderboard (lap {final_lap}):");
    for p in leaderboard_at(&report.positions, final_lap) {
        let info = directory.display_for(&p.competitor_id);
        let _ = writeln!(
            out,
            "  {:>2}. {:<6} {}",
            p.position,
            info.name,
            format_lap_time(p.lap_time)
        );
    }

    out
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Én runde fra historiske løpsdata, slik datakilden leverer den.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub competitor_id: String,
    pub lap_number: u32,
    /// sekunder; None = ingen gyldig tid (DNF, hendelse, manglende data)
    #[serde(default)]
    pub lap_duration: Option<f64>,
    #[serde(default)]
    pub is_pit_out_lap: bool,
    pub season: i32,
    #[serde(default)]
    pub tire_compound: Option<String>,
}

impl LapRecord {
    /// Gyldig rundetid: satt, endelig og ikke negativ.
    pub fn valid_duration(&self) -> Option<f64> {
        self.lap_duration.filter(|d| d.is_finite() && *d >= 0.0)
    }
}

/// Data for én sesong. En sesong som ikke kunne hentes/parses er `Unavailable`
/// og hoppes over ved profilbygging.
#[derive(Debug, Clone, PartialEq)]
pub enum SeasonData {
    Available(Vec<LapRecord>),
    Unavailable { reason: String },
}

impl SeasonData {
    pub fn laps(&self) -> Option<&[LapRecord]> {
        match self {
            SeasonData::Available(laps) => Some(laps),
            SeasonData::Unavailable { .. } => None,
        }
    }
}

/// Sesong → rundedata. BTreeMap gir stigende sesongrekkefølge.
pub type HistoricalRaces = BTreeMap<i32, SeasonData>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub competitor_id: String,
    /// uvektet minimum over alle brukte runder
    pub best_lap: f64,
    pub average_lap: f64,
    pub std_dev: f64,
    pub median_lap: f64,
    pub seasons_observed: usize,
}

/// Competitor-id → profil. Sortert nøkkel gir deterministisk trekkrekkefølge i simulatoren.
pub type ProfileMap = BTreeMap<String, PerformanceProfile>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedLap {
    pub competitor_id: String,
    pub lap_number: u32,
    pub lap_duration: f64,
    pub is_simulated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub lap_number: u32,
    pub competitor_id: String,
    pub position: usize,
    pub lap_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodiumEntry {
    pub rank: u8,
    pub competitor_id: String,
    pub best_lap_overall: f64,
    pub final_lap_time: f64,
}

/// Visningsdata for en deltaker. Påvirker aldri beregningene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorInfo {
    pub name: String,
    pub team: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorDirectory {
    entries: BTreeMap<String, CompetitorInfo>,
}

impl CompetitorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, competitor_id: impl Into<String>, info: CompetitorInfo) {
        self.entries.insert(competitor_id.into(), info);
    }

    pub fn get(&self, competitor_id: &str) -> Option<&CompetitorInfo> {
        self.entries.get(competitor_id)
    }

    /// Oppslag med fallback "DRV<id>" / "Unknown" for ukjente id-er.
    pub fn display_for(&self, competitor_id: &str) -> CompetitorInfo {
        self.get(competitor_id).cloned().unwrap_or_else(|| CompetitorInfo {
            name: format!("DRV{competitor_id}"),
            team: "Unknown".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CompetitorInfo)> for CompetitorDirectory {
    fn from_iter<I: IntoIterator<Item = (String, CompetitorInfo)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Pallplass med visningsdata koblet på.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodiumRow {
    #[serde(flatten)]
    pub entry: PodiumEntry,
    pub name: String,
    pub team: String,
}

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::{info, warn};
use serde::{Deserialize, Deserializer};

use crate::types::{HistoricalRaces, LapRecord, SeasonData};

// kolonner i sesong-eksporten
#[derive(Debug, Deserialize)]
struct CsvLap {
    competitor_id: String,
    lap_number: u32,
    lap_duration: Option<f64>,
    #[serde(default, deserialize_with = "flag_any_case")]
    is_pit_out_lap: Option<bool>,
    tire_compound: Option<String>,
}

// pandas skriver True/False, andre eksporter true/false eller 1/0
fn flag_any_case<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "is_pit_out_lap: forventet true/false, fikk '{other}'"
        ))),
    }
}

impl CsvLap {
    fn into_record(self, season: i32) -> LapRecord {
        LapRecord {
            competitor_id: self.competitor_id.trim().to_string(),
            lap_number: self.lap_number,
            lap_duration: self.lap_duration,
            is_pit_out_lap: self.is_pit_out_lap.unwrap_or(false),
            season,
            tire_compound: self
                .tire_compound
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty()),
        }
    }
}

/// Leser én sesong fra CSV. Tom `lap_duration` = ingen gyldig tid.
pub fn read_season_csv<R: Read>(reader: R, season: i32) -> Result<Vec<LapRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut laps = Vec::new();
    for (row, res) in rdr.deserialize::<CsvLap>().enumerate() {
        // rad 1 er header
        let raw = res.with_context(|| format!("season {season}: malformed row {}", row + 2))?;
        if raw.competitor_id.trim().is_empty() {
            anyhow::bail!("season {season}: empty competitor_id on row {}", row + 2);
        }
        laps.push(raw.into_record(season));
    }
    Ok(laps)
}

pub fn load_season_csv(path: impl AsRef<Path>, season: i32) -> Result<Vec<LapRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("season {season}: cannot open {}", path.display()))?;
    read_season_csv(file, season)
}

/// Laster alle sesonger. En sesong som feiler blir `Unavailable` (logget),
/// resten lastes som normalt.
pub fn load_history<I, P>(sources: I) -> HistoricalRaces
where
    I: IntoIterator<Item = (i32, P)>,
    P: AsRef<Path>,
{
    sources
        .into_iter()
        .map(|(season, path)| {
            let data = match load_season_csv(path.as_ref(), season) {
                Ok(laps) => {
                    info!("sesong {season}: {} runder lastet", laps.len());
                    SeasonData::Available(laps)
                }
                Err(e) => {
                    warn!("sesong {season} utilgjengelig: {e:#}");
                    SeasonData::Unavailable {
                        reason: format!("{e:#}"),
                    }
                }
            };
            (season, data)
        })
        .collect()
}

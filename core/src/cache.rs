use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use once_cell::sync::OnceCell;

use crate::error::SimError;
use crate::metrics::{race_cache_hit_total, race_cache_miss_total, Metrics};
use crate::report::RaceReport;

type Slot = Arc<OnceCell<Arc<RaceReport>>>;

/// Read-through cache for rapporter, nøklet på session-id.
/// Kartlåsen holdes bare for å hente sloten; beregningen kjører på sloten,
/// så maks én beregning per nøkkel uten at andre nøkler må vente.
#[derive(Debug, Default)]
pub struct SimulationCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SimulationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // en panikk i en annen beregning gjør ikke kartet ugyldig
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self, session_key: &str) -> Slot {
        Arc::clone(
            self.lock()
                .entry(session_key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Henter rapport fra cache, eller beregner og lagrer den.
    /// Feilede beregninger lagres ikke.
    pub fn get_or_compute<F>(
        &self,
        session_key: &str,
        metrics: &Metrics,
        compute: F,
    ) -> Result<Arc<RaceReport>, SimError>
    where
        F: FnOnce() -> Result<RaceReport, SimError>,
    {
        let slot = self.slot(session_key);
        let mut computed = false;

        let result = slot.get_or_try_init(|| {
            computed = true;
            race_cache_miss_total(metrics).inc();
            debug!("cache miss for {session_key}, simulerer");
            let report = Arc::new(compute()?);
            metrics.record_computed(report.simulated_laps);
            Ok::<_, SimError>(report)
        });

        match result {
            Ok(report) => {
                if !computed {
                    race_cache_hit_total(metrics).inc();
                }
                Ok(Arc::clone(report))
            }
            Err(e) => {
                // tom slot fjernes så neste kall prøver på nytt
                let mut slots = self.lock();
                if let Some(current) = slots.get(session_key) {
                    if Arc::ptr_eq(current, &slot) && current.get().is_none() {
                        slots.remove(session_key);
                    }
                }
                Err(e)
            }
        }
    }

    pub fn invalidate(&self, session_key: &str) -> bool {
        self.lock()
            .remove(session_key)
            .map_or(false, |slot| slot.get().is_some())
    }

    /// Antall ferdige rapporter (slots under beregning telles ikke).
    pub fn len(&self) -> usize {
        self.lock().values().filter(|s| s.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

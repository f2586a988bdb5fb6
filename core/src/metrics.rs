use prometheus::{IntCounter, Opts, Registry};

/// Tellere for rapport-cachen, i eget register.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    race_cache_computed_total: IntCounter,
    race_cache_computed_laps_total: IntCounter,
    race_cache_hit_total: IntCounter,
    race_cache_miss_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let c = IntCounter::with_opts(Opts::new(name, help).namespace("racesim"))?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        Ok(Self {
            race_cache_computed_total: counter(
                &registry,
                "race_cache_computed_total",
                "Race reports computed on cache miss",
            )?,
            race_cache_computed_laps_total: counter(
                &registry,
                "race_cache_computed_laps_total",
                "Simulated laps in race reports computed on cache miss",
            )?,
            race_cache_hit_total: counter(&registry, "race_cache_hit_total", "Race report cache hits")?,
            race_cache_miss_total: counter(&registry, "race_cache_miss_total", "Race report cache misses")?,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_computed(&self, laps: usize) {
        self.race_cache_computed_total.inc();
        self.race_cache_computed_laps_total.inc_by(laps as u64);
    }

    pub fn race_cache_computed_total(&self) -> u64 {
        self.race_cache_computed_total.get()
    }

    pub fn race_cache_computed_laps_total(&self) -> u64 {
        self.race_cache_computed_laps_total.get()
    }
}

pub fn race_cache_hit_total(metrics: &Metrics) -> &IntCounter {
    &metrics.race_cache_hit_total
}

pub fn race_cache_miss_total(metrics: &Metrics) -> &IntCounter {
    &metrics.race_cache_miss_total
}

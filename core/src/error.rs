use thiserror::Error;

/// Harde feil: brudd på parameterkontrakten eller ubrukelig konfigurasjon.
/// Manglende data (tom historikk, sesong uten runder) er aldri en feil.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("num_laps must be positive, got {0}")]
    InvalidLapCount(u32),

    #[error("invalid std_dev {std_dev} for competitor {competitor_id}: must be finite and >= 0")]
    InvalidStdDev { competitor_id: String, std_dev: f64 },

    #[error("invalid best_lap {best_lap} for competitor {competitor_id}: must be finite and >= 0")]
    InvalidBestLap { competitor_id: String, best_lap: f64 },

    #[error("invalid weight {weight} for season {season}: must be finite and >= 0")]
    InvalidSeasonWeight { season: i32, weight: f64 },

    #[error("invalid default season weight {0}: must be finite and >= 0")]
    InvalidDefaultWeight(f64),

    #[error("config I/O error at {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error at {path} (field {field}): {message}")]
    ConfigParse {
        path: String,
        field: String,
        message: String,
    },
}

impl SimError {
    /// Sann for feil som skyldes ugyldige parametre til en offentlig funksjon.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            SimError::InvalidLapCount(_)
                | SimError::InvalidStdDev { .. }
                | SimError::InvalidBestLap { .. }
                | SimError::InvalidSeasonWeight { .. }
                | SimError::InvalidDefaultWeight(_)
        )
    }
}

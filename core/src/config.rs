use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_path_to_error as spte;

use crate::error::{EffortError, Result};
use crate::substitution::DEFAULT_ATHLETE_AGE;

/// Kjøre-konfig. Vekter/skala/boost er bevisst ikke med her.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub data_folder: PathBuf,
    pub output_folder: PathBuf,
    pub schedule_path: Option<PathBuf>,
    pub match_dates: Vec<NaiveDate>,
    /// Brukes til HRmax = 220 − alder i bytteanalysen.
    pub athlete_age: u32,
}

/// 2024-sesongen.
pub fn default_match_dates() -> Vec<NaiveDate> {
    [(2024, 10, 9), (2024, 10, 16), (2024, 10, 30), (2024, 11, 6), (2024, 11, 13), (2024, 11, 27)]
        .into_iter()
        .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("./processed_data"),
            output_folder: PathBuf::from("./outputs"),
            schedule_path: None,
            match_dates: default_match_dates(),
            athlete_age: DEFAULT_ATHLETE_AGE,
        }
    }
}

impl PipelineConfig {
    /// Parse JSON; feil rapporteres med sti (f.eks. `match_dates[2]`).
    pub fn from_json(json_in: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(json_in);
        spte::deserialize(de).map_err(|e| EffortError::Config {
            path: e.path().to_string(),
            reason: e.inner().to_string(),
        })
    }

    /// Leser konfig fra disk. Mangler fila → default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("⚠️ Fant ikke konfig på {}, bruker default", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| EffortError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_json(&contents)?;
        log::info!("📂 Konfig lastet fra {}", path.display());
        Ok(cfg)
    }
}

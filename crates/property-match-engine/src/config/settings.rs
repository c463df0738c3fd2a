use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::error::EngineError;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub fields: FieldMapping,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Retrieval tuning
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub embedding_dimension: usize,
    pub relevance_floor: f32,
    pub default_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: 100,
            relevance_floor: 0.1,
            default_limit: 5,
        }
    }
}

/// Column names of the listing data
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FieldMapping {
    pub id: String,
    pub fallback_id: String,
    pub name: String,
    pub location: String,
    pub features: String,
    pub layout: String,
    pub stations: Vec<String>,
    pub price: String,
    pub station_distance: String,
    pub floor_area: String,
    pub region: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            id: "物件ID".to_string(),
            fallback_id: "管理番号".to_string(),
            name: "物件名称".to_string(),
            location: "所在地名称".to_string(),
            features: "物件の特徴".to_string(),
            layout: "間取り備考".to_string(),
            stations: vec!["駅1".to_string(), "駅2".to_string(), "駅3".to_string()],
            price: "賃料・価格".to_string(),
            station_distance: "駅1".to_string(),
            floor_area: "建物面積・専有面積".to_string(),
            region: "地域".to_string(),
        }
    }
}

impl FieldMapping {
    /// Fields concatenated (in this order) into a listing's description text
    pub fn description_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.location.as_str(),
            self.features.as_str(),
            self.layout.as_str(),
        ];
        fields.extend(self.stations.iter().take(3).map(String::as_str));
        fields
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct IngestionConfig {
    pub data_path: Option<PathBuf>,
    pub region: Option<String>,
    pub row_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,property_match_engine=debug".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_with(Self::environment())
    }

    /// `APP__` prefix; `__` also separates nested keys,
    /// e.g. APP__ENGINE__RELEVANCE_FLOOR=0.2
    fn environment() -> Environment {
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(environment: Environment) -> Result<Self> {
        let defaults = EngineConfig::default();
        let logging = LoggingConfig::default();

        let config = Config::builder()
            .set_default("engine.embedding_dimension", defaults.embedding_dimension as i64)?
            .set_default("engine.relevance_floor", defaults.relevance_floor as f64)?
            .set_default("engine.default_limit", defaults.default_limit as i64)?
            .set_default("logging.level", logging.level)?
            .set_default("logging.format", logging.format)?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(environment)
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.engine.embedding_dimension == 0 {
            return Err(EngineError::Config(
                "engine.embedding_dimension must be greater than zero".to_string(),
            ));
        }

        if !(-1.0..=1.0).contains(&self.engine.relevance_floor) {
            return Err(EngineError::Config(format!(
                "engine.relevance_floor must lie in [-1, 1], got {}",
                self.engine.relevance_floor
            )));
        }

        if self.engine.default_limit == 0 {
            return Err(EngineError::Config(
                "engine.default_limit must be greater than zero".to_string(),
            ));
        }

        if self.fields.id.trim().is_empty() {
            return Err(EngineError::Config("fields.id must not be empty".to_string()));
        }

        Ok(())
    }
}

use crate::types::{ChartSources, TableSource};
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default = "filtered")]
    pub region_source: TableSource,
    #[serde(default = "filtered")]
    pub category_source: TableSource,
    #[serde(default = "filtered")]
    pub sub_category_source: TableSource,
    #[serde(default = "filtered")]
    pub country_source: TableSource,
}

fn default_data_path() -> String {
    "Processed_GlobalSuperstore.csv".to_string()
}

fn default_preview_rows() -> usize {
    10
}

fn default_export_dir() -> String {
    ".".to_string()
}

fn filtered() -> TableSource {
    TableSource::Filtered
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            preview_rows: default_preview_rows(),
            export_dir: default_export_dir(),
            region_source: filtered(),
            category_source: filtered(),
            sub_category_source: filtered(),
            country_source: filtered(),
        }
    }
}

impl Settings {
    pub fn chart_sources(&self) -> ChartSources {
        ChartSources {
            region: self.region_source,
            category: self.category_source,
            sub_category: self.sub_category_source,
            country: self.country_source,
        }
    }
}

/// Read `dashboard.{toml,json,yaml,...}` if present, then `DASHBOARD_*`
/// environment variables on top.
pub fn load_settings() -> anyhow::Result<Settings> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").try_parsing(true));
    build(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}

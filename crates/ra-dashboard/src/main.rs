mod bootstrap;
mod report;

use anyhow::{anyhow, Context, Result};
use dashboard_core::settings::Settings;
use dashboard_runtime::data_manager::DataManager;
use dashboard_runtime::view::{build_view, resolve_parameters};

use crate::report::{render_text, GdpSummary, JsonReport};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("RA dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let data_file = settings
        .data_file
        .clone()
        .or_else(bootstrap::discover_data_path)
        .ok_or_else(|| {
            anyhow!(
                "no RA dataset found; pass --data-file or place {} under ./data",
                bootstrap::DEFAULT_DATA_FILE
            )
        })?;

    let mut manager = DataManager::new(settings.cache_ttl());

    let records = manager
        .ra_records(&data_file)
        .with_context(|| format!("loading RA dataset {}", data_file.display()))?;
    tracing::info!("Loaded {} RA records from {}", records.len(), data_file.display());

    let params = resolve_parameters(
        &records,
        settings.from_year,
        settings.to_year,
        &settings.counties,
    )?;
    let view = build_view(&records, &params);

    let gdp = match &settings.gdp_file {
        Some(path) => {
            let gdp_records = manager
                .gdp_records(path)
                .with_context(|| format!("loading GDP dataset {}", path.display()))?;
            Some(GdpSummary::from_records(&gdp_records))
        }
        None => None,
    };

    match settings.format.as_str() {
        "json" => {
            let report = JsonReport {
                view: &view,
                gdp: gdp.as_ref(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print!("{}", render_text(&view, gdp.as_ref())),
    }

    Ok(())
}

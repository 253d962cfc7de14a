//! Writes the campaign report to disk.

use std::path::Path;

use lotka_core::report::CampaignReport;
use tracing::info;

use crate::error::EngineError;

/// Serialize `report` as pretty JSON and write it to `path`, creating parent
/// directories as needed. Returns the number of bytes written.
pub fn write_report(report: &CampaignReport, path: &Path) -> Result<usize, EngineError> {
    let json = report.to_json_pretty()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| EngineError::Export {
            path: parent.display().to_string(),
            source,
        })?;
    }

    std::fs::write(path, json.as_bytes()).map_err(|source| EngineError::Export {
        path: path.display().to_string(),
        source,
    })?;

    info!(
        path = %path.display(),
        bytes = json.len(),
        campaign_id = %report.id,
        "Campaign report written"
    );
    Ok(json.len())
}

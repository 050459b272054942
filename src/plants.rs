//! Plant lookup for accounts without a preconfigured plant id.

use crate::client::ApiClient;
use crate::error::{ExportError, Result};
use crate::models::{Plant, PlantListResponse};

const PLANTS_PATH: &str = "/plants?page=1&limit=1";

/// Fetch the first page of the account's plant list.
pub fn list_plants(api: &ApiClient, token: &str) -> Result<Vec<Plant>> {
    let resp = api.get_authorized(&api.api_url(PLANTS_PATH), token)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ExportError::Resolution(format!(
            "plant list request failed (HTTP {})",
            status
        )));
    }

    let text = resp.text()?;
    let parsed: PlantListResponse = serde_json::from_str(&text)
        .map_err(|e| ExportError::Resolution(format!("malformed plant list: {}", e)))?;

    if parsed.msg != "Success" {
        return Err(ExportError::Resolution(format!(
            "plant list returned {:?}",
            parsed.msg
        )));
    }

    let data = parsed
        .data
        .ok_or_else(|| ExportError::Resolution("plant list response has no data".into()))?;
    Ok(data.infos)
}

/// Resolve the account's default plant: the first entry of its plant list.
pub fn resolve_default_plant(api: &ApiClient, token: &str) -> Result<u64> {
    let plants = list_plants(api, token)?;
    let plant = plants
        .into_iter()
        .next()
        .ok_or_else(|| ExportError::Resolution("account has no plants".into()))?;
    tracing::info!("using plant {} ({})", plant.id, plant.name);
    Ok(plant.id)
}

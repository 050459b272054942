use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Plant — A monitored installation on the account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

// ---------------------------------------------------------------------------
// PlantListResponse — Envelope returned by `GET /plants`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PlantListResponse {
    #[serde(default)]
    pub msg: String,
    pub data: Option<PlantListData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantListData {
    #[serde(default)]
    pub infos: Vec<Plant>,
}

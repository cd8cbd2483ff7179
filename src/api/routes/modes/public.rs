//! Public types for the modes API
use serde::{Deserialize, Serialize};

use crate::ai::conversation::Mode;

#[derive(Serialize, Deserialize)]
pub struct ModeSummary {
    pub id: Mode,
    pub name: String,
    pub welcome: String,
}

#[derive(Serialize, Deserialize)]
pub struct ModesResponse {
    pub modes: Vec<ModeSummary>,
}

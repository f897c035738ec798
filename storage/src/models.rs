use bson::oid::ObjectId;
use cavern::{CaveConfig, CaveResult, Generation, Grid};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaveParams {
    pub fill_percent: u32,
    pub simulation_steps: u32,
    pub corridor_width: u32,
    pub cell_size: f32,
}

impl CaveParams {
    pub fn from_config(config: &CaveConfig) -> Self {
        Self {
            fill_percent: config.fill_percent,
            simulation_steps: config.simulation_steps as u32,
            corridor_width: config.corridor_width,
            cell_size: config.cell_size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaveDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub name: String,
    // u64 seed stored bit-for-bit; BSON has no unsigned 64-bit type
    pub seed: i64,
    pub params: CaveParams,
    pub width: u32,
    pub height: u32,
    // Flattened row-major: length = width×height, 1 = soil, 0 = water
    pub grid: Vec<u8>,
    pub rooms: u32, // before connection
}

impl CaveDoc {
    pub fn from_generation(name: &str, generation: &Generation, config: &CaveConfig) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            seed: generation.seed as i64,
            params: CaveParams::from_config(config),
            width: generation.grid.width() as u32,
            height: generation.grid.height() as u32,
            grid: generation.grid.to_bytes(),
            rooms: generation.rooms as u32,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed as u64
    }

    // Rebuild the occupancy grid; fails if the stored buffer is truncated
    pub fn to_grid(&self) -> CaveResult<Grid> {
        Grid::from_bytes(self.width as usize, self.height as usize, &self.grid)
    }
}

use glam::Vec3;
use tracing::debug;

use crate::pipeline::{CaveListener, Generation};

// Keeps one obstacle at every `stride`-th soil position. Rebuilt from scratch
// on every "cave ready" event.
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    stride: usize,
    spacing: f32,
    obstacles: Vec<Vec3>,
}

impl ObstacleSpawner {
    pub fn new(stride: usize, spacing: f32) -> Self {
        Self {
            stride: stride.max(1),
            spacing,
            obstacles: Vec::new(),
        }
    }

    pub fn obstacles(&self) -> &[Vec3] {
        &self.obstacles
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn spawn(&mut self, generation: &Generation) {
        self.obstacles.extend(
            generation
                .soil_positions(self.spacing)
                .into_iter()
                .step_by(self.stride),
        );
    }
}

impl CaveListener for ObstacleSpawner {
    fn on_cave_generated(&mut self, generation: &Generation) {
        self.clear();
        self.spawn(generation);
        debug!(obstacles = self.obstacles.len(), "obstacles respawned");
    }
}

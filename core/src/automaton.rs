use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::grid::{CellState, Grid};

// A cell flips to soil above this many soil neighbours and to water below it
const SOIL_NEIGHBOUR_THRESHOLD: u32 = 4;

// How the simulator obtains its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    // Use exactly this seed.
    Fixed(u64),
    // Draw an unpredictable seed once per generation.
    Random,
}

impl SeedMode {
    pub fn resolve(self) -> u64 {
        match self {
            SeedMode::Fixed(seed) => seed,
            SeedMode::Random => rand::random::<u64>(),
        }
    }
}

// Cellular-automaton cave simulator
pub struct CaveAutomaton {
    fill_percent: u32, // chance (0..=100) that an interior cell starts as soil
    steps: usize,      // number of smoothing passes
}

impl CaveAutomaton {
    // fill_percent - initial soil density in percent
    // Higher = more rock, smaller caverns.
    // steps - how many smoothing passes to run
    // More steps = rounder, less noisy caverns; most of the change happens in the first 5.
    pub fn new(fill_percent: u32, steps: usize) -> Self {
        Self {
            fill_percent,
            steps,
        }
    }

    // Seeded noise followed by `steps` smoothing passes.
    // Same (width, height, seed) => bit-identical grid.
    pub fn generate(&self, width: usize, height: usize, seed: u64) -> Grid {
        let mut grid = self.initialise(width, height, seed);
        self.apply(&mut grid);
        grid
    }

    // Random fill with a sealed border
    pub fn initialise(&self, width: usize, height: usize, seed: u64) -> Grid {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Grid::filled(width, height, CellState::Soil);

        // x-outer / y-inner keeps the random stream in a fixed cell order
        for x in 0..width {
            for y in 0..height {
                if grid.is_border(x, y) {
                    continue;
                }
                let roll: u32 = rng.gen_range(0..100);
                let state = if roll < self.fill_percent {
                    CellState::Soil
                } else {
                    CellState::Water
                };
                grid.set(x, y, state);
            }
        }
        grid
    }

    // In-place: run all smoothing passes
    pub fn apply(&self, grid: &mut Grid) {
        for _ in 0..self.steps {
            *grid = Self::step(grid);
        }
        debug!(
            steps = self.steps,
            soil = grid.count(CellState::Soil),
            water = grid.count(CellState::Water),
            "cellular automaton finished"
        );
    }

    // One synchronous pass: every cell reads the previous generation only
    pub fn step(grid: &Grid) -> Grid {
        let mut next = grid.clone();
        for (x, y, state) in grid.cells() {
            let soil = Self::count_soil_neighbours(grid, x, y);
            let updated = match state {
                CellState::Water if soil > SOIL_NEIGHBOUR_THRESHOLD => CellState::Soil,
                CellState::Soil if soil < SOIL_NEIGHBOUR_THRESHOLD => CellState::Water,
                unchanged => unchanged,
            };
            next.set(x, y, updated);
        }
        next
    }

    // Soil among the 8 neighbours; off-grid neighbours count as soil
    pub fn count_soil_neighbours(grid: &Grid, x: usize, y: usize) -> u32 {
        let mut count = 0;
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                match grid.get_signed(x as i64 + dx, y as i64 + dy) {
                    Some(CellState::Water) => {}
                    Some(CellState::Soil) | None => count += 1,
                }
            }
        }
        count
    }
}

// resize → simulate → find rooms → connect → soil mesh → water mesh →
// hand-off to collaborators → placements → "cave ready" to listeners.
// Each call runs to completion and replaces the previous generation.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use crate::automaton::{CaveAutomaton, SeedMode};
use crate::config::{CaveConfig, DistanceBand};
use crate::error::{CaveError, CaveResult};
use crate::grid::{CellState, Grid};
use crate::mesh::{PlacedMesh, Placement, triangulate};
use crate::rooms::{ConnectReport, RoomConnector, identify_rooms};
use crate::spawner::ObstacleSpawner;

// Mixed into the generation seed so placements do not replay the grid's random stream
const PLACEMENT_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Soil,
    Water,
}

// Receives the finished meshes (renderer / collider).
pub trait MeshSink {
    fn upload(&mut self, surface: Surface, mesh: &PlacedMesh);
}

// Builds a walkable surface from the grid and level bounds.
pub trait NavigationBaker {
    fn bake(&mut self, grid: &Grid, bounds: Vec3);
}

// Notified once per completed generation.
pub trait CaveListener {
    fn on_cave_generated(&mut self, generation: &Generation);
}

impl<L: CaveListener + ?Sized> CaveListener for Rc<RefCell<L>> {
    fn on_cave_generated(&mut self, generation: &Generation) {
        self.borrow_mut().on_cave_generated(generation);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConstraint {
    pub band: DistanceBand,
    pub reference: Vec3,
}

// Named spawn point; `None` when no point satisfied its band.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawn {
    pub name: String,
    pub position: Option<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placements {
    pub anchor: Option<Vec3>,
    pub spawns: Vec<Spawn>,
}

impl Placements {
    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.spawns
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.position)
    }
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub seed: u64,
    pub grid: Grid,
    // Rooms found before connection.
    pub rooms: usize,
    pub connect: ConnectReport,
    pub soil: PlacedMesh,
    pub water: PlacedMesh,
    // (width, height, level depth)
    pub bounds: Vec3,
    pub placements: Placements,
}

impl Generation {
    // World positions of every soil cell, x-outer / y-inner, centred on the origin
    pub fn soil_positions(&self, spacing: f32) -> Vec<Vec3> {
        let (w, h) = (self.grid.width(), self.grid.height());
        let offset_x = (w as f32 * spacing / 2.0).floor();
        let offset_z = (h as f32 * spacing / 2.0).floor();
        let mut positions = Vec::new();
        for x in 0..w {
            for y in 0..h {
                if self.grid.get(x, y).is_soil() {
                    positions.push(Vec3::new(
                        spacing * x as f32 - offset_x,
                        0.0,
                        spacing * y as f32 - offset_z,
                    ));
                }
            }
        }
        positions
    }
}

// Draw interior points until one is water and inside the band. Points are in
// grid space (x, 0, y); gives up after `max_attempts` draws.
pub fn sample_walkable_point<R: Rng>(
    grid: &Grid,
    rng: &mut R,
    constraint: Option<SampleConstraint>,
    max_attempts: u32,
) -> CaveResult<Vec3> {
    let side = grid.width().min(grid.height()) as f32;
    let (min_distance, max_distance) = match constraint {
        Some(c) => (
            side * c.band.min_percent / 100.0,
            side * c.band.max_percent / 100.0,
        ),
        None => (0.0, f32::INFINITY),
    };
    let infeasible = |attempts| CaveError::InfeasibleConstraint {
        attempts,
        min_distance,
        max_distance,
    };

    if grid.width() < 3 || grid.height() < 3 {
        return Err(infeasible(0));
    }

    for _ in 0..max_attempts {
        let x = rng.gen_range(1..grid.width() - 1);
        let y = rng.gen_range(1..grid.height() - 1);
        if grid.get(x, y) != CellState::Water {
            continue;
        }
        let point = Vec3::new(x as f32, 0.0, y as f32);
        match constraint {
            None => return Ok(point),
            Some(c) => {
                let d = point.distance(c.reference);
                if d >= min_distance && d <= max_distance {
                    return Ok(point);
                }
            }
        }
    }
    Err(infeasible(max_attempts))
}

// Owns the grid across generations and drives the pipeline.
pub struct CaveGenerator {
    config: CaveConfig,
    width: usize,
    height: usize,
    generation: Option<Generation>,
    placement_rng: ChaCha8Rng,
    mesh_sink: Option<Box<dyn MeshSink>>,
    navigation: Option<Box<dyn NavigationBaker>>,
    listeners: Vec<Box<dyn CaveListener>>,
}

impl CaveGenerator {
    pub fn new(config: CaveConfig) -> CaveResult<Self> {
        config.validate()?;
        Ok(Self {
            width: config.width,
            height: config.height,
            placement_rng: ChaCha8Rng::seed_from_u64(config.seed ^ PLACEMENT_SALT),
            config,
            generation: None,
            mesh_sink: None,
            navigation: None,
            listeners: Vec::new(),
        })
    }

    pub fn config(&self) -> &CaveConfig {
        &self.config
    }

    // Current (width, height); grows before every generation.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    pub fn set_mesh_sink(&mut self, sink: Box<dyn MeshSink>) {
        self.mesh_sink = Some(sink);
    }

    pub fn set_navigation(&mut self, baker: Box<dyn NavigationBaker>) {
        self.navigation = Some(baker);
    }

    pub fn subscribe(&mut self, listener: Box<dyn CaveListener>) {
        self.listeners.push(listener);
    }

    // Grow both sides by `percent`, truncating to whole cells.
    pub fn resize_map(&mut self, percent: f32) {
        let factor = 1.0 + percent / 100.0;
        self.width = (self.width as f32 * factor) as usize;
        self.height = (self.height as f32 * factor) as usize;
    }

    // The zero-argument "regenerate" command: seed mode taken from config.
    pub fn regenerate(&mut self) -> CaveResult<&Generation> {
        let mode = if self.config.use_random_seed {
            SeedMode::Random
        } else {
            SeedMode::Fixed(self.config.seed)
        };
        self.generate_cave(mode)
    }

    pub fn generate_cave(&mut self, mode: SeedMode) -> CaveResult<&Generation> {
        self.resize_map(self.config.growth_percent);
        let (width, height) = (self.width, self.height);
        let seed = mode.resolve();
        let config = &self.config;

        let mut grid = CaveAutomaton::new(config.fill_percent, config.simulation_steps)
            .generate(width, height, seed);

        let rooms = identify_rooms(&grid);
        let connect = RoomConnector::new(config.corridor_width).connect(&mut grid, &rooms);

        let soil = PlacedMesh {
            mesh: triangulate(&grid, config.cell_size, config.soil_depth),
            placement: Placement::default(),
        };
        let water = PlacedMesh {
            mesh: triangulate(&grid.inverted(), config.cell_size, config.water_depth),
            placement: Placement {
                rotation: Vec3::ZERO,
                translation: Vec3::from_array(config.water_offset),
            },
        };
        let bounds = Vec3::new(width as f32, height as f32, config.level_depth);
        debug!(
            soil_vertices = soil.mesh.vertex_count(),
            water_vertices = water.mesh.vertex_count(),
            "meshes built"
        );

        match self.mesh_sink.as_mut() {
            Some(sink) => {
                sink.upload(Surface::Soil, &soil);
                sink.upload(Surface::Water, &water);
            }
            None => error!("no mesh sink attached; skipping mesh upload"),
        }
        match self.navigation.as_mut() {
            Some(baker) => baker.bake(&grid, bounds),
            None => error!("no navigation baker attached; skipping navigation bake"),
        }

        self.placement_rng = ChaCha8Rng::seed_from_u64(seed ^ PLACEMENT_SALT);
        let placements = self.plan_placements(&grid);

        info!(
            seed,
            width,
            height,
            rooms = rooms.len(),
            corridors = connect.corridors,
            stitches = connect.stitches,
            triangles = soil.mesh.triangle_count(),
            "cave generated"
        );

        let generation = self.generation.insert(Generation {
            seed,
            grid,
            rooms: rooms.len(),
            connect,
            soil,
            water,
            bounds,
            placements,
        });
        for listener in self.listeners.iter_mut() {
            listener.on_cave_generated(generation);
        }
        Ok(&*generation)
    }

    pub fn level_bounds(&self) -> Vec3 {
        Vec3::new(self.width as f32, self.height as f32, self.config.level_depth)
    }

    pub fn sample_walkable_point(
        &mut self,
        constraint: Option<SampleConstraint>,
    ) -> CaveResult<Vec3> {
        let generation = self.generation.as_ref().ok_or(CaveError::NotGenerated)?;
        sample_walkable_point(
            &generation.grid,
            &mut self.placement_rng,
            constraint,
            self.config.max_sample_attempts,
        )
    }

    // Soil world positions of the current cave; empty before the first generation.
    pub fn soil_positions(&self) -> Vec<Vec3> {
        self.generation
            .as_ref()
            .map(|g| g.soil_positions(self.config.obstacle_spacing))
            .unwrap_or_default()
    }

    // Empty spawner using the configured stride and spacing; subscribe it to fill it
    pub fn obstacle_spawner(&self) -> ObstacleSpawner {
        ObstacleSpawner::new(self.config.obstacle_stride, self.config.obstacle_spacing)
    }

    // Anchor first, then each spawn rule around it. A failed rule is logged
    // and left empty; the rest still run.
    fn plan_placements(&mut self, grid: &Grid) -> Placements {
        let attempts = self.config.max_sample_attempts;
        let anchor = match sample_walkable_point(grid, &mut self.placement_rng, None, attempts) {
            Ok(p) => p,
            Err(e) => {
                warn!("no anchor point: {e}");
                return Placements::default();
            }
        };

        let mut spawns = Vec::with_capacity(self.config.spawn.len());
        for rule in &self.config.spawn {
            let constraint = SampleConstraint {
                band: rule.band,
                reference: anchor,
            };
            let rng = &mut self.placement_rng;
            let position = match sample_walkable_point(grid, rng, Some(constraint), attempts) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(spawn = %rule.name, "placement skipped: {e}");
                    None
                }
            };
            spawns.push(Spawn {
                name: rule.name.clone(),
                position,
            });
        }

        Placements {
            anchor: Some(anchor),
            spawns,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{
        CaveGenerator, CaveListener, Generation, MeshSink, NavigationBaker, SampleConstraint,
        Surface, sample_walkable_point,
    };
    use crate::automaton::SeedMode;
    use crate::config::{CaveConfig, DistanceBand};
    use crate::error::CaveError;
    use crate::grid::{CellState, Grid};
    use crate::mesh::PlacedMesh;
    use crate::rooms::identify_rooms;

    fn small_config() -> CaveConfig {
        CaveConfig {
            width: 48,
            height: 36,
            simulation_steps: 5,
            seed: 7,
            ..CaveConfig::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        seeds: Vec<u64>,
    }

    impl CaveListener for Recorder {
        fn on_cave_generated(&mut self, generation: &Generation) {
            self.seeds.push(generation.seed);
        }
    }

    struct Uploads(Rc<RefCell<Vec<(Surface, usize)>>>);

    impl MeshSink for Uploads {
        fn upload(&mut self, surface: Surface, mesh: &PlacedMesh) {
            self.0.borrow_mut().push((surface, mesh.mesh.vertex_count()));
        }
    }

    struct Bakes(Rc<RefCell<Vec<Vec3>>>);

    impl NavigationBaker for Bakes {
        fn bake(&mut self, _grid: &Grid, bounds: Vec3) {
            self.0.borrow_mut().push(bounds);
        }
    }

    #[test]
    fn grows_before_each_generation() {
        let mut generator = CaveGenerator::new(small_config()).unwrap();
        generator.generate_cave(SeedMode::Fixed(1)).unwrap();
        // 48 * 1.04 = 49.92, 36 * 1.04 = 37.44
        assert_eq!(generator.size(), (49, 37));
        let g = generator.generate_cave(SeedMode::Fixed(1)).unwrap();
        assert_eq!((g.grid.width(), g.grid.height()), (50, 38));
        assert_eq!(generator.level_bounds(), Vec3::new(50.0, 38.0, 10.0));
    }

    #[test]
    fn generation_is_connected_and_sealed() {
        let mut generator = CaveGenerator::new(small_config()).unwrap();
        let g = generator.regenerate().unwrap();
        assert_eq!(g.seed, 7);
        assert!(g.grid.border_sealed());
        assert!(identify_rooms(&g.grid).len() <= 1);
        assert_eq!(g.water.placement.translation, Vec3::new(0.0, 0.0, -1.0));
        assert!(g.soil.mesh.points[g.soil.mesh.vertex_count() / 2..]
            .iter()
            .all(|p| p.y == 7.0));
    }

    #[test]
    fn same_seed_same_cave() {
        let a = CaveGenerator::new(small_config())
            .unwrap()
            .regenerate()
            .unwrap()
            .clone();
        let b = CaveGenerator::new(small_config())
            .unwrap()
            .regenerate()
            .unwrap()
            .clone();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.soil, b.soil);
        assert_eq!(a.placements, b.placements);
    }

    #[test]
    fn collaborators_and_listeners_are_called() {
        let uploads = Rc::new(RefCell::new(Vec::new()));
        let bakes = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::new(RefCell::new(Recorder::default()));

        let mut generator = CaveGenerator::new(small_config()).unwrap();
        generator.set_mesh_sink(Box::new(Uploads(uploads.clone())));
        generator.set_navigation(Box::new(Bakes(bakes.clone())));
        generator.subscribe(Box::new(recorder.clone()));

        generator.generate_cave(SeedMode::Fixed(3)).unwrap();
        generator.generate_cave(SeedMode::Fixed(4)).unwrap();

        let surfaces: Vec<Surface> = uploads.borrow().iter().map(|u| u.0).collect();
        assert_eq!(
            surfaces,
            vec![Surface::Soil, Surface::Water, Surface::Soil, Surface::Water]
        );
        assert_eq!(bakes.borrow().len(), 2);
        assert_eq!(recorder.borrow().seeds, vec![3, 4]);
    }

    #[test]
    fn missing_collaborators_do_not_abort() {
        let mut generator = CaveGenerator::new(small_config()).unwrap();
        assert!(generator.generate_cave(SeedMode::Fixed(9)).is_ok());
        assert!(generator.generation().is_some());
    }

    #[test]
    fn queries_before_generation() {
        let mut generator = CaveGenerator::new(small_config()).unwrap();
        assert!(generator.soil_positions().is_empty());
        assert!(matches!(
            generator.sample_walkable_point(None),
            Err(CaveError::NotGenerated)
        ));
    }

    #[test]
    fn sampled_points_are_walkable() {
        let mut generator = CaveGenerator::new(small_config()).unwrap();
        generator.regenerate().unwrap();
        for _ in 0..50 {
            let p = generator.sample_walkable_point(None).unwrap();
            let grid = &generator.generation().unwrap().grid;
            assert_eq!(grid.get(p.x as usize, p.z as usize), CellState::Water);
        }
    }

    #[test]
    fn banded_sample_respects_distance() {
        let mut grid = Grid::filled(20, 20, CellState::Soil);
        for x in 1..19 {
            for y in 1..19 {
                grid.set(x, y, CellState::Water);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let reference = Vec3::new(10.0, 0.0, 10.0);
        let constraint = SampleConstraint {
            band: DistanceBand::new(20.0, 30.0),
            reference,
        };
        for _ in 0..20 {
            let p = sample_walkable_point(&grid, &mut rng, Some(constraint), 10_000).unwrap();
            let d = p.distance(reference);
            assert!((4.0..=6.0).contains(&d), "distance {d}");
        }
    }

    #[test]
    fn impossible_band_fails_after_bounded_attempts() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#...#", "#####"]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let constraint = SampleConstraint {
            band: DistanceBand::new(500.0, 600.0),
            reference: Vec3::ZERO,
        };
        let err = sample_walkable_point(&grid, &mut rng, Some(constraint), 200).unwrap_err();
        assert!(matches!(
            err,
            CaveError::InfeasibleConstraint { attempts: 200, .. }
        ));

        let solid = Grid::filled(6, 6, CellState::Soil);
        assert!(sample_walkable_point(&solid, &mut rng, None, 50).is_err());
    }

    #[test]
    fn soil_positions_use_spacing_and_centre() {
        let mut generator = CaveGenerator::new(small_config()).unwrap();
        let g = generator.regenerate().unwrap().clone();
        let positions = generator.soil_positions();
        assert_eq!(positions.len(), g.grid.count(CellState::Soil));
        // (0, 0) is border soil: 3*0 - floor(49*3/2)
        assert_eq!(positions[0], Vec3::new(-73.0, 0.0, -55.0));
    }
}

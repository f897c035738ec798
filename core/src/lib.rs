// cavern holds the cave pipeline: automaton, room connection, triangulation
pub mod automaton;
pub mod config;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod pipeline;
pub mod rooms;
pub mod spawner;
pub mod utils;

pub use automaton::{CaveAutomaton, SeedMode};
pub use config::{CaveConfig, DistanceBand, SpawnRule};
pub use error::{CaveError, CaveResult};
pub use grid::{CellState, Grid};
pub use mesh::{Mesh, PlacedMesh, Placement, triangulate, triangulate_surface};
pub use pipeline::{
    CaveGenerator, CaveListener, Generation, MeshSink, NavigationBaker, Placements,
    SampleConstraint, Surface, sample_walkable_point,
};
pub use rooms::{ConnectReport, Room, RoomConnector, identify_rooms};
pub use spawner::ObstacleSpawner;
pub use utils::flatten_grid;

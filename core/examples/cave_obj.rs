// Runs the full pipeline twice and writes the last soil and water meshes as OBJ.

use std::fs::File;
use std::io::BufWriter;

use cavern::{CaveConfig, CaveGenerator};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let config = CaveConfig {
        seed: 2025,
        ..CaveConfig::default()
    };
    let mut generator = CaveGenerator::new(config).unwrap();
    let spawner = Rc::new(RefCell::new(generator.obstacle_spawner()));
    generator.subscribe(Box::new(spawner.clone()));

    // Second run is 4% larger than the first
    generator.regenerate().unwrap();
    let generation = generator.regenerate().unwrap();

    for (name, placed) in [("soil", &generation.soil), ("water", &generation.water)] {
        let filename = format!("cave_{name}.obj");
        let mut out = BufWriter::new(File::create(&filename).unwrap());
        placed.mesh.write_obj(&mut out).unwrap();
        println!(
            "Saved {} ({} vertices, {} triangles)",
            filename,
            placed.mesh.vertex_count(),
            placed.mesh.triangle_count()
        );
    }
    for spawn in &generation.placements.spawns {
        println!("{:>8}: {:?}", spawn.name, spawn.position);
    }
    println!("{} obstacles", spawner.borrow().obstacles().len());
}

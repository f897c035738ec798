use cavern::{CaveConfig, CaveGenerator, SeedMode};
use storage::CaveStore;
use storage::models::CaveDoc;

#[tokio::main]
async fn main() -> mongodb::error::Result<()> {
    // Generate a default-sized cave with seed 2025
    let config = CaveConfig::default();
    let mut generator = CaveGenerator::new(config.clone()).expect("default config is valid");
    let generation = generator
        .generate_cave(SeedMode::Fixed(2025))
        .expect("generation failed");

    // Build the document
    let doc = CaveDoc::from_generation("demo", generation, &config);
    let (w, h) = (doc.width as usize, doc.height as usize);

    // Init storage
    let storage = CaveStore::init("mongodb://localhost:27017", "cave_db", "caves").await?;

    // Insert & read back
    storage.create(doc).await?;
    if let Some(found) = storage.read_by_seed(2025).await? {
        println!(
            "Round-trip success: {}x{} cave, centre cell = {}",
            w,
            h,
            found.grid[(h / 2) * w + w / 2]
        );
    } else {
        println!("Document not found!");
    }

    // Clean up
    storage.delete_by_seed(2025).await?;

    Ok(())
}

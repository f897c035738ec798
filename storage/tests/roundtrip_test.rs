#[test]
#[ignore = "needs a MongoDB server on localhost:27017"]
fn test_roundtrip_cave() {
    // Bring things into scope
    use cavern::{CaveConfig, CaveGenerator, SeedMode};
    use storage::CaveStore;
    use storage::models::CaveDoc;
    use tokio::runtime::Builder;

    // Build a single-threaded Tokio runtime
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime");

    // Run async workflow inside it
    rt.block_on(async {
        // Generate a small cave
        let config = CaveConfig {
            width: 40,
            height: 30,
            ..CaveConfig::default()
        };
        let mut generator = CaveGenerator::new(config.clone()).expect("config");
        let generation = generator
            .generate_cave(SeedMode::Fixed(42))
            .expect("generation");
        let grid = generation.grid.clone();
        let doc = CaveDoc::from_generation("roundtrip", generation, &config);

        // Initialize storage (MongoDB must be running)
        let storage = CaveStore::init("mongodb://localhost:27017", "cave_db", "caves_test")
            .await
            .expect("storage init failed");

        // Insert, read back, assert
        storage.create(doc).await.expect("create failed");
        let found = storage
            .read_by_seed(42)
            .await
            .expect("read failed")
            .expect("doc not found");

        assert_eq!(found.seed(), 42);
        assert_eq!(found.to_grid().expect("grid size"), grid);
        assert!(
            storage
                .list_names()
                .await
                .expect("list failed")
                .contains(&"roundtrip".to_string())
        );

        // Clean up
        storage.delete_by_seed(42).await.expect("delete failed");
    });
}

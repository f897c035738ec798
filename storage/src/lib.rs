//storage holds MongoDB schema & async CRUD for generated caves

pub mod models;

use crate::models::CaveDoc;
use bson::doc;
use futures_util::stream::TryStreamExt;
use mongodb::{Client, Collection, IndexModel, options::ClientOptions};

pub struct CaveStore {
    col: Collection<CaveDoc>,
}

impl CaveStore {
    // Initialize the MongoDB collection
    pub async fn init(uri: &str, db_name: &str, col_name: &str) -> mongodb::error::Result<Self> {
        let mut opts = ClientOptions::parse(uri).await?;
        opts.app_name = Some("CavernStorage".to_string());
        let client = Client::with_options(opts)?;
        let col = client.database(db_name).collection(col_name);

        // Create index on (name, seed)
        let index_model = IndexModel::builder()
            .keys(doc! { "name": 1, "seed": 1 })
            .options(None)
            .build();
        col.create_index(index_model).await?;

        Ok(Self { col })
    }

    pub async fn list_names(&self) -> mongodb::error::Result<Vec<String>> {
        let mut cursor = self.col.find(doc! {}).await?;
        let mut names = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            names.push(doc.name);
        }
        Ok(names)
    }

    pub async fn read_by_name(&self, name: &str) -> mongodb::error::Result<Option<CaveDoc>> {
        self.col.find_one(doc! { "name": name }).await
    }

    // Insert a cave document, replacing any with the same name + seed.
    pub async fn create(&self, doc_obj: CaveDoc) -> mongodb::error::Result<()> {
        let filter = doc! {
            "name": &doc_obj.name,
            "seed": doc_obj.seed,
        };
        self.col.delete_one(filter).await?;

        self.col.insert_one(doc_obj).await?;
        Ok(())
    }

    // Read a cave by seed.
    pub async fn read_by_seed(&self, seed: u64) -> mongodb::error::Result<Option<CaveDoc>> {
        self.col.find_one(doc! { "seed": seed as i64 }).await
    }

    // Delete by seed (for clean-up).
    pub async fn delete_by_seed(&self, seed: u64) -> mongodb::error::Result<()> {
        self.col.delete_one(doc! { "seed": seed as i64 }).await?;
        Ok(())
    }
}

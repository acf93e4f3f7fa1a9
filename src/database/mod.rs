use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

pub const USERS: &str = "users";
pub const STUDENTS: &str = "students";
pub const TEACHERS: &str = "teachers";
pub const CLUBS: &str = "clubs";
pub const EVENTS: &str = "events";
pub const ANNOUNCEMENTS: &str = "announcements";
pub const POLLS: &str = "polls";
pub const RESOURCES: &str = "resources";
pub const FEEDBACK: &str = "feedback";
pub const LOST_ITEMS: &str = "lost_items";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, database_name: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));
        client_options.app_name = Some("smart-campus".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(database_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await;

        Ok(mongodb)
    }

    /// Creates the unique and lookup indexes the collections rely on.
    ///
    /// Unique indexes back the invariants the handlers assume: one account per
    /// email and per Google id, one role profile per user, one club per name.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let indexes: Vec<(&str, Document, bool)> = vec![
            (USERS, doc! { "email": 1 }, true),
            (USERS, doc! { "google_id": 1 }, true),
            (USERS, doc! { "role": 1 }, false),
            (STUDENTS, doc! { "user": 1 }, true),
            (TEACHERS, doc! { "user": 1 }, true),
            (CLUBS, doc! { "name": 1 }, true),
            (CLUBS, doc! { "category": 1 }, false),
            (EVENTS, doc! { "date": 1 }, false),
            (ANNOUNCEMENTS, doc! { "is_pinned": -1, "posted_at": -1 }, false),
            (FEEDBACK, doc! { "status": 1, "submitted_at": -1 }, false),
            (LOST_ITEMS, doc! { "status": 1, "date": -1 }, false),
            (RESOURCES, doc! { "department": 1, "semester": 1 }, false),
        ];

        for (collection, keys, unique) in indexes {
            let description = format!("{}({})", collection, keys);
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(unique).build())
                .build();

            match self.collection::<Document>(collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index created: {}", description),
                Err(e) => log::warn!("   ⚠️  Index {} not created: {}", description, e),
            }
        }

        log::info!("✅ Database indexes ready");
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Connects to the throwaway test database named by `MONGO_TEST_DB` (default
/// `smart_campus_test`) on `MONGO_URI`.
#[cfg(test)]
pub(crate) async fn test_db() -> MongoDB {
    let uri = std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let name = std::env::var("MONGO_TEST_DB").unwrap_or_else(|_| "smart_campus_test".to_string());
    MongoDB::new(&uri, &name).await.expect("MongoDB test instance not reachable")
}

/// Handle whose client never connects; for code paths that fail before any query.
#[cfg(test)]
pub(crate) async fn offline_db() -> MongoDB {
    let client = Client::with_uri_str("mongodb://127.0.0.1:1").await.expect("valid offline URI");
    MongoDB { db: client.database("offline") }
}

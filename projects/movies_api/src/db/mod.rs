pub mod bans;
pub mod countries;
pub mod documents;
pub mod indexes;
pub mod json;
pub mod keys;
pub mod logs;
pub mod movies;
pub mod names;
pub mod providers;
pub mod timestamps;
pub mod users;
pub mod views;

use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database};
use thiserror::Error;

pub const MOVIES: &str = "movies";
pub const ACTORS: &str = "actors";
pub const COUNTRIES: &str = "countries";
pub const NAMES: &str = "names";
pub const BANS: &str = "bans";
pub const LOGS: &str = "logs";
pub const USERS: &str = "users";
pub const PROVIDERS: &str = "providers";
pub const CATALOG_VIEW: &str = "movies_catalog";
pub const GENRES_VIEW: &str = "genres";
pub const MOVIES_WITH_DETAILS: &str = "movies_with_details";

/// Driver handle plus the name of the database the fixed endpoints and jobs use.
#[derive(Debug, Clone)]
pub struct Db {
    client: Client,
    catalog: String,
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Connect: {source}")]
    Connect {
        #[from]
        source: mongodb::error::Error,
    },
}

#[derive(Debug, Error)]
pub enum PingError {
    #[error("Ping: {source}")]
    Ping {
        #[from]
        source: mongodb::error::Error,
    },
}

impl Db {
    /// Parses the URI and builds the client. No server round-trip happens here.
    pub async fn connect(uri: &str, catalog: &str) -> Result<Self, ConnectError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|source| ConnectError::Connect { source })?;
        Ok(Self {
            client,
            catalog: catalog.to_string(),
        })
    }

    pub async fn ping(&self) -> Result<(), PingError> {
        self.catalog_db()
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| PingError::Ping { source })?;
        Ok(())
    }

    pub fn catalog_name(&self) -> &str {
        &self.catalog
    }

    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    pub fn catalog_db(&self) -> Database {
        self.client.database(&self.catalog)
    }

    pub fn collection(&self, database: &str, collection: &str) -> Collection<Document> {
        self.database(database).collection(collection)
    }

    pub fn catalog(&self, collection: &str) -> Collection<Document> {
        self.catalog_db().collection(collection)
    }
}

use mongodb::bson::Document;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreateIndexError {
    #[error("CreateIndex {name}: {source}")]
    CreateIndex {
        name: String,
        #[source]
        source: mongodb::error::Error,
    },
}

/// Creates `{ field: 1 }` under `name`. Creating an identical index again is a no-op.
pub async fn create_ascending_index(
    coll: &Collection<Document>,
    field: &str,
    name: &str,
) -> Result<String, CreateIndexError> {
    let mut keys = Document::new();
    keys.insert(field, 1);
    let model = IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build();

    let result = coll
        .create_index(model)
        .await
        .map_err(|source| CreateIndexError::CreateIndex {
            name: name.to_string(),
            source,
        })?;
    Ok(result.index_name)
}

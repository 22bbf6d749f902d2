use interfaces_tmdb_movies::models::ProviderLink;
use mongodb::bson::{doc, from_bson, to_bson, Bson, DateTime, Document};
use mongodb::Collection;
use thiserror::Error;

/// Cached links live at `providers.<locale>` on a `{movieId}` document.
pub fn cached_links(entry: &Document, locale: &str) -> Option<Vec<ProviderLink>> {
    let links = entry.get_document("providers").ok()?.get(locale)?;
    from_bson::<Vec<ProviderLink>>(links.clone()).ok()
}

#[derive(Debug, Error)]
pub enum FindCachedLinksError {
    #[error("FindCachedLinks: {source}")]
    FindCachedLinks {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn find_cached_links(
    coll: &Collection<Document>,
    movie_id: i64,
    locale: &str,
) -> Result<Option<Vec<ProviderLink>>, FindCachedLinksError> {
    let entry = coll
        .find_one(doc! { "movieId": movie_id })
        .await
        .map_err(|source| FindCachedLinksError::FindCachedLinks { source })?;

    Ok(entry.and_then(|entry| cached_links(&entry, locale)))
}

#[derive(Debug, Error)]
pub enum StoreLinksError {
    #[error("SerializeLinks: {source}")]
    SerializeLinks {
        #[from]
        source: mongodb::bson::ser::Error,
    },

    #[error("StoreLinks: {source}")]
    StoreLinks {
        #[from]
        source: mongodb::error::Error,
    },
}

/// Replaces one locale's links, leaving other cached locales untouched.
pub fn store_links_update(locale: &str, links: &[ProviderLink], now: DateTime) -> Result<Document, StoreLinksError> {
    let mut set = Document::new();
    set.insert(format!("providers.{locale}"), to_bson(&links)?);
    set.insert("lastUpdated", Bson::DateTime(now));
    Ok(doc! { "$set": set })
}

pub async fn store_links(
    coll: &Collection<Document>,
    movie_id: i64,
    locale: &str,
    links: &[ProviderLink],
) -> Result<(), StoreLinksError> {
    let update = store_links_update(locale, links, DateTime::now())?;
    coll.update_one(doc! { "movieId": movie_id }, update)
        .upsert(true)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str) -> ProviderLink {
        ProviderLink {
            name: name.into(),
            url: "https://www.themoviedb.org/movie/603/watch?locale=US".into(),
        }
    }

    #[test]
    fn reads_links_for_locale() {
        let entry = doc! {
            "movieId": 603,
            "providers": {
                "US": [{ "name": "max", "url": "https://www.themoviedb.org/movie/603/watch?locale=US" }],
            },
        };

        assert_eq!(cached_links(&entry, "US"), Some(vec![link("max")]));
        assert_eq!(cached_links(&entry, "GB"), None);
        assert_eq!(cached_links(&doc! { "movieId": 603 }, "US"), None);
    }

    #[test]
    fn update_targets_single_locale() {
        let update = store_links_update("US", &[link("max")], DateTime::from_millis(0)).unwrap();
        let set = update.get_document("$set").unwrap();

        assert!(set.get_array("providers.US").is_ok());
        assert!(set.get_datetime("lastUpdated").is_ok());
        assert!(!set.contains_key("providers"));
    }
}

use mongodb::bson::{doc, Document};

/// Stored pipeline behind the genres view: one `{id, name}` per TMDB genre.
pub fn genres_view() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$fullDetails.genres" },
        doc! {
            "$group": {
                "_id": "$fullDetails.genres.id",
                "name": { "$first": "$fullDetails.genres.name" },
            }
        },
        doc! { "$project": { "id": "$_id", "name": 1, "_id": 0 } },
        doc! { "$sort": { "id": 1 } },
    ]
}

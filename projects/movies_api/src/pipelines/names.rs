use mongodb::bson::{doc, Document};

fn name_parts() -> Document {
    doc! { "$split": ["$name", " "] }
}

/// Cast members with a profile photo, grouped by origin country and first name.
///
/// Output documents: `{ id: "<country>-<first>", origin_country, first_name,
/// last_names: [{ name, actors: [{ id, profile_path }] }] }`, sorted by country
/// then first name.
pub fn names_by_country() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$credits.cast" },
        doc! { "$match": { "credits.cast.profile_path": { "$ne": null } } },
        doc! { "$unwind": "$fullDetails.origin_country" },
        doc! {
            "$group": {
                "_id": { "country": "$fullDetails.origin_country", "name": "$credits.cast.name" },
                "country": { "$first": "$fullDetails.origin_country" },
                "name": { "$first": "$credits.cast.name" },
                "actor_id": { "$first": "$credits.cast.id" },
                "profile_path": { "$first": "$credits.cast.profile_path" },
            }
        },
        doc! {
            "$group": {
                "_id": {
                    "country": "$country",
                    "firstName": { "$arrayElemAt": [name_parts(), 0] },
                },
                "lastNames": {
                    "$addToSet": {
                        "name": {
                            "$arrayElemAt": [name_parts(), { "$subtract": [{ "$size": name_parts() }, 1] }]
                        },
                        "actors": {
                            "$cond": {
                                "if": {
                                    "$and": [
                                        { "$ne": ["$actor_id", null] },
                                        { "$ne": ["$profile_path", null] },
                                    ]
                                },
                                "then": [{ "id": "$actor_id", "profile_path": "$profile_path" }],
                                "else": [],
                            }
                        },
                    }
                },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "id": { "$concat": ["$_id.country", "-", "$_id.firstName"] },
                "origin_country": "$_id.country",
                "first_name": "$_id.firstName",
                "last_names": "$lastNames",
            }
        },
        doc! { "$sort": { "origin_country": 1, "first_name": 1 } },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cast_with_photos_are_grouped() {
        let pipeline = names_by_country();
        assert_eq!(
            pipeline[1],
            doc! { "$match": { "credits.cast.profile_path": { "$ne": null } } }
        );
        assert_eq!(
            pipeline.last().unwrap(),
            &doc! { "$sort": { "origin_country": 1, "first_name": 1 } }
        );
    }
}

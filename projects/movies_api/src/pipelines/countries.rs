use mongodb::bson::{doc, Document};

/// Every distinct `fullDetails.origin_country` code, as `[{ countries: [...] }]`.
pub fn distinct_countries() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$fullDetails.origin_country" },
        doc! {
            "$group": {
                "_id": null,
                "countries": { "$addToSet": "$fullDetails.origin_country" },
            }
        },
        doc! { "$project": { "_id": 0, "countries": 1 } },
    ]
}

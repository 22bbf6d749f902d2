use mongodb::bson::{doc, Bson, Document};

use crate::db::ACTORS;

pub const GENDER_FEMALE: i32 = 1;
pub const GENDER_MALE: i32 = 2;
pub const DIRECTOR_JOB: &str = "Director";

/// First element of `input` whose `field` equals `value`, in billing order.
pub fn first_matching(input: &str, field: &str, value: impl Into<Bson>) -> Document {
    doc! {
        "$arrayElemAt": [
            {
                "$filter": {
                    "input": input,
                    "as": "c",
                    "cond": { "$eq": [format!("$$c.{field}"), value.into()] },
                }
            },
            0,
        ]
    }
}

/// Adds `leadFemaleCast`, `leadMaleCast` and `leadDirector`.
pub fn lead_cast_stage() -> Document {
    doc! {
        "$addFields": {
            "leadFemaleCast": first_matching("$credits.cast", "gender", GENDER_FEMALE),
            "leadMaleCast": first_matching("$credits.cast", "gender", GENDER_MALE),
            "leadDirector": first_matching("$credits.crew", "job", DIRECTOR_JOB),
        }
    }
}

pub fn lead_ids_stage() -> Document {
    doc! {
        "$addFields": {
            "leadActressId": "$leadFemaleCast.id",
            "leadActressName": "$leadFemaleCast.name",
            "leadActorId": "$leadMaleCast.id",
            "leadActorName": "$leadMaleCast.name",
            "leadDirectorId": "$leadDirector.id",
            "leadDirectorName": "$leadDirector.name",
        }
    }
}

pub fn require_female_lead_stage() -> Document {
    doc! { "$match": { "leadFemaleCast": { "$ne": null } } }
}

/// Left join of one actor document; the target field is absent when no actor matches.
pub fn actor_lookup(local_field: &str, target: &str) -> Vec<Document> {
    vec![
        doc! {
            "$lookup": {
                "from": ACTORS,
                "localField": local_field,
                "foreignField": "id",
                "as": target,
            }
        },
        doc! {
            "$unwind": {
                "path": format!("${target}"),
                "preserveNullAndEmptyArrays": true,
            }
        },
    ]
}

/// Joins every cast member that has an actor document into `matchingActors`.
pub fn matching_actors_lookup() -> Document {
    doc! {
        "$lookup": {
            "from": ACTORS,
            "localField": "credits.cast.id",
            "foreignField": "id",
            "as": "matchingActors",
        }
    }
}

/// `null` when the field is missing, so `$eq` against null behaves.
pub fn or_null(field: &str) -> Document {
    doc! { "$ifNull": [format!("${field}"), null] }
}

/// Lead summary used by cards and the catalog view.
pub fn lead_info(id_field: &str, name_field: &str, cast_field: &str, actor_doc_field: &str) -> Document {
    doc! {
        "id": format!("${id_field}"),
        "name": format!("${name_field}"),
        "profile_path": format!("${cast_field}.profile_path"),
        "hasActorProfile": { "$ne": [or_null(actor_doc_field), null] },
        "profile": or_null(actor_doc_field),
    }
}

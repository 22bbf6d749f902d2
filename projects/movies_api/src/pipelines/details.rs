use mongodb::bson::{doc, Document};

use super::lead_cast::matching_actors_lookup;

/// One movie with its cast trimmed and every known actor joined.
pub fn movie_details(movie_id: i64) -> Vec<Document> {
    vec![
        doc! { "$match": { "id": movie_id } },
        matching_actors_lookup(),
        doc! {
            "$project": {
                "id": 1,
                "title": 1,
                "poster_path": 1,
                "release_date": 1,
                "vote_average": 1,
                "backdrop_path": "$fullDetails.backdrop_path",
                "overview": "$fullDetails.overview",
                "genres": "$fullDetails.genres",
                "runtime": "$fullDetails.runtime",
                "tagline": "$fullDetails.tagline",
                "credits": {
                    "cast": {
                        "$map": {
                            "input": "$credits.cast",
                            "as": "cast",
                            "in": {
                                "id": "$$cast.id",
                                "name": "$$cast.name",
                                "character": "$$cast.character",
                                "profile_path": "$$cast.profile_path",
                                "order": "$$cast.order",
                                "gender": "$$cast.gender",
                            },
                        }
                    }
                },
                "providers": { "results": { "US": "$providers.results.US" } },
                "keywords": 1,
                "matchingActors": 1,
            }
        },
        doc! { "$limit": 1 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_numeric_id_first() {
        let pipeline = movie_details(603);
        assert_eq!(pipeline[0], doc! { "$match": { "id": 603_i64 } });
        assert_eq!(
            pipeline[1].get_document("$lookup").unwrap().get_str("from").unwrap(),
            "actors"
        );
    }
}

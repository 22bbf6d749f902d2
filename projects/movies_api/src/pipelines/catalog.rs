use mongodb::bson::{doc, Bson, Document};

use super::lead_cast::{
    actor_lookup, lead_cast_stage, lead_ids_stage, lead_info, matching_actors_lookup, or_null,
    require_female_lead_stage,
};

pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_LOCALE: &str = "US";

/// Which movies the card listing shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFilter {
    /// Matched against `fullDetails.origin_country`.
    pub country: String,
    /// Provider region kept in the card projection.
    pub locale: String,
    /// Movies released strictly before this date are shown.
    pub released_before: String,
}

impl CardFilter {
    pub fn new(country: Option<&str>, released_before: String) -> Self {
        let country = country
            .map(str::trim)
            .filter(|country| !country.is_empty())
            .unwrap_or(DEFAULT_COUNTRY)
            .to_uppercase();
        Self {
            country,
            locale: DEFAULT_LOCALE.to_string(),
            released_before,
        }
    }
}

/// Stages shared by the card page and its count.
fn card_base_stages(filter: &CardFilter) -> Vec<Document> {
    let mut stages = vec![
        doc! { "$match": { "fullDetails.origin_country": filter.country.as_str() } },
        doc! { "$match": { "poster_path": { "$ne": null } } },
        doc! { "$match": { "release_date": { "$lt": filter.released_before.as_str() } } },
        lead_cast_stage(),
        require_female_lead_stage(),
        lead_ids_stage(),
    ];
    stages.extend(actor_lookup("leadActressId", "leadActressDoc"));
    stages
}

/// `{ results: { <locale>: $providers.results.<locale> } }`
fn locale_providers(locale: &str) -> Document {
    let mut results = Document::new();
    results.insert(locale, format!("$providers.results.{locale}"));
    doc! { "results": results }
}

fn actor_summaries() -> Document {
    doc! {
        "$map": {
            "input": "$matchingActors",
            "as": "a",
            "in": { "id": "$$a.id", "name": "$$a.name" },
        }
    }
}

pub fn movies_with_actors(filter: &CardFilter, skip: u64, limit: i64) -> Vec<Document> {
    let mut stages = card_base_stages(filter);
    stages.extend([
        doc! {
            "$addFields": {
                "needsActorProfile": { "$eq": [or_null("leadActressDoc"), null] },
                "leadFemaleInfo": lead_info("leadActressId", "leadActressName", "leadFemaleCast", "leadActressDoc"),
            }
        },
        matching_actors_lookup(),
        doc! {
            "$project": {
                "id": 1,
                "title": 1,
                "poster_path": 1,
                "release_date": 1,
                "vote_average": 1,
                "leadFemaleInfo": 1,
                "needsActorProfile": 1,
                "providers": locale_providers(&filter.locale),
                "matchingActors": actor_summaries(),
            }
        },
        doc! { "$sort": { "release_date": -1 } },
        doc! { "$skip": i64::try_from(skip).unwrap_or(i64::MAX) },
        doc! { "$limit": limit },
    ]);
    stages
}

pub fn movies_with_actors_count(filter: &CardFilter) -> Vec<Document> {
    let mut stages = card_base_stages(filter);
    stages.push(doc! { "$count": "total" });
    stages
}

/// Distinct keyword ids whose name matches `pattern`, case-insensitively, across
/// every stored movie.
pub fn keyword_ids_matching(pattern: &str) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$keywords" },
        doc! { "$match": { "keywords.name": { "$regex": pattern, "$options": "i" } } },
        doc! { "$group": { "_id": "$keywords.id" } },
    ]
}

/// Stored pipeline behind the catalog view. `today` is frozen into the view when
/// it is created; recreate the view to move it forward.
pub fn catalog_view(today: &str, excluded_keyword_ids: &[Bson]) -> Vec<Document> {
    let mut stages = vec![
        doc! { "$match": { "adult": false } },
        doc! { "$match": { "fullDetails.origin_country": DEFAULT_COUNTRY } },
        doc! { "$match": { "providers.results.US": { "$ne": null } } },
        doc! { "$match": { "poster_path": { "$ne": null } } },
        doc! { "$match": { "release_date": { "$lt": today } } },
    ];
    if !excluded_keyword_ids.is_empty() {
        stages.push(doc! { "$match": { "keywords.id": { "$nin": excluded_keyword_ids.to_vec() } } });
    }
    stages.extend([lead_cast_stage(), require_female_lead_stage(), lead_ids_stage()]);
    stages.extend(actor_lookup("leadActressId", "leadActressDoc"));
    stages.extend(actor_lookup("leadActorId", "leadActorDoc"));
    stages.extend([
        doc! {
            "$addFields": {
                "needsActorProfile": { "$eq": [or_null("leadActressDoc"), null] },
                "leadFemaleInfo": lead_info("leadActressId", "leadActressName", "leadFemaleCast", "leadActressDoc"),
                "leadMaleInfo": lead_info("leadActorId", "leadActorName", "leadMaleCast", "leadActorDoc"),
                "leadDirectorInfo": {
                    "id": "$leadDirectorId",
                    "name": "$leadDirectorName",
                    "profile_path": "$leadDirector.profile_path",
                },
            }
        },
        matching_actors_lookup(),
        doc! {
            "$project": {
                "id": 1,
                "title": 1,
                "poster_path": 1,
                "release_date": 1,
                "vote_average": 1,
                "release_date_id": "$release_dates.id",
                "release": {
                    "$let": {
                        "vars": {
                            "usEntry": {
                                "$arrayElemAt": [
                                    {
                                        "$filter": {
                                            "input": "$release_dates.results",
                                            "cond": { "$eq": ["$$this.iso_3166_1", DEFAULT_LOCALE] },
                                        }
                                    },
                                    0,
                                ]
                            }
                        },
                        "in": { "$ifNull": ["$$usEntry.release_dates", []] },
                    }
                },
                "genre_ids": "$genre_ids",
                "keyword_ids": ids_of("$keywords"),
                "leadFemaleInfo": 1,
                "leadMaleInfo": 1,
                "leadDirectorInfo": 1,
                "needsActorProfile": 1,
                "budget": "$fullDetails.budget",
                "revenue": "$fullDetails.revenue",
                "runtime": "$fullDetails.runtime",
                "providers": "$providers.results.US",
                "studio_ids": ids_of("$fullDetails.production_companies"),
                "actor_ids": ids_of("$credits.cast"),
                "matchingActors": actor_summaries(),
            }
        },
        doc! { "$sort": { "release_date": -1 } },
    ]);
    stages
}

fn ids_of(input: &str) -> Document {
    doc! { "$map": { "input": input, "as": "item", "in": "$$item.id" } }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> CardFilter {
        CardFilter::new(None, "2024-05-01".into())
    }

    fn stage_names(pipeline: &[Document]) -> Vec<&str> {
        pipeline
            .iter()
            .map(|stage| stage.keys().next().map(String::as_str).unwrap_or_default())
            .collect()
    }

    #[test]
    fn country_defaults_to_us_and_is_uppercased() {
        assert_eq!(filter().country, "US");
        assert_eq!(CardFilter::new(Some(" gb "), "2024-05-01".into()).country, "GB");
        assert_eq!(CardFilter::new(Some(""), "2024-05-01".into()).country, "US");
    }

    #[test]
    fn card_page_ends_with_sort_skip_limit() {
        let pipeline = movies_with_actors(&filter(), 40, 20);
        let names = stage_names(&pipeline);

        assert_eq!(&names[names.len() - 3..], &["$sort", "$skip", "$limit"]);
        assert_eq!(pipeline[pipeline.len() - 2], doc! { "$skip": 40_i64 });
        assert_eq!(pipeline[pipeline.len() - 1], doc! { "$limit": 20_i64 });
        assert_eq!(
            pipeline[0],
            doc! { "$match": { "fullDetails.origin_country": "US" } }
        );
    }

    #[test]
    fn count_shares_the_filtering_stages() {
        let page = movies_with_actors(&filter(), 0, 20);
        let count = movies_with_actors_count(&filter());

        assert_eq!(count.last().unwrap(), &doc! { "$count": "total" });
        assert_eq!(&page[..count.len() - 1], &count[..count.len() - 1]);
    }

    #[test]
    fn card_projection_keeps_locale_providers() {
        let pipeline = movies_with_actors(&filter(), 0, 20);
        let project = pipeline
            .iter()
            .find_map(|stage| stage.get_document("$project").ok())
            .unwrap();

        assert_eq!(
            project.get_document("providers").unwrap(),
            &doc! { "results": { "US": "$providers.results.US" } }
        );
        assert_eq!(project.get_i32("needsActorProfile").unwrap(), 1);
    }

    #[test]
    fn keyword_exclusion_only_when_ids_given() {
        let without = catalog_view("2024-05-01", &[]);
        assert!(!without
            .iter()
            .any(|stage| stage.get_document("$match").map_or(false, |m| m.contains_key("keywords.id"))));

        let with = catalog_view("2024-05-01", &[Bson::Int64(10), Bson::Int64(11)]);
        assert!(with.contains(&doc! { "$match": { "keywords.id": { "$nin": [10_i64, 11_i64] } } }));
    }

    #[test]
    fn catalog_view_freezes_today_and_sorts_newest_first() {
        let pipeline = catalog_view("2024-05-01", &[]);

        assert!(pipeline.contains(&doc! { "$match": { "release_date": { "$lt": "2024-05-01" } } }));
        assert_eq!(pipeline.last().unwrap(), &doc! { "$sort": { "release_date": -1 } });
    }

    #[test]
    fn keyword_lookup_matches_names_case_insensitively() {
        let pipeline = keyword_ids_matching("^remake$");

        assert_eq!(pipeline[0], doc! { "$unwind": "$keywords" });
        assert_eq!(
            pipeline[1],
            doc! { "$match": { "keywords.name": { "$regex": "^remake$", "$options": "i" } } }
        );
        assert_eq!(pipeline[2], doc! { "$group": { "_id": "$keywords.id" } });
    }

    #[test]
    fn oversized_skip_saturates_instead_of_wrapping() {
        let pipeline = movies_with_actors(&filter(), u64::MAX, 20);

        assert_eq!(pipeline[pipeline.len() - 2], doc! { "$skip": i64::MAX });
    }
}

use std::collections::HashSet;

use mongodb::bson::{Bson, Document};

/// An ascending single-field index worth creating for a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecommendation {
    pub collection: String,
    pub field: String,
    pub reason: String,
}

impl IndexRecommendation {
    pub fn index_name(&self) -> String {
        format!("idx_{}", self.field.replace('.', "_"))
    }
}

/// Walks `$match` (including `$or` branches), `$sort` and `$lookup` stages and
/// recommends indexes on stored fields. Fields derived earlier in the pipeline
/// by `$addFields`, `$lookup` or a computed `$project` are skipped.
pub fn recommend_indexes(collection: &str, pipeline: &[Document]) -> Vec<IndexRecommendation> {
    let mut walker = Walker {
        collection,
        derived: HashSet::new(),
        seen: HashSet::new(),
        recommendations: Vec::new(),
    };

    for (position, stage) in pipeline.iter().enumerate() {
        for (operator, body) in stage {
            let Some(body) = body.as_document() else {
                continue;
            };
            match operator.as_str() {
                "$match" => walker.visit_match(body, position),
                "$sort" => {
                    for field in body.keys() {
                        walker.recommend(collection, field, format!("$sort at stage {position}"));
                    }
                }
                "$lookup" => walker.visit_lookup(body, position),
                "$addFields" | "$set" => walker.derived.extend(body.keys().cloned()),
                "$project" => {
                    let computed = body
                        .iter()
                        .filter(|(_, value)| !matches!(value, Bson::Int32(_) | Bson::Int64(_) | Bson::Boolean(_)))
                        .map(|(field, _)| field.clone());
                    walker.derived.extend(computed);
                }
                _ => {}
            }
        }
    }

    walker.recommendations
}

struct Walker<'a> {
    collection: &'a str,
    derived: HashSet<String>,
    seen: HashSet<(String, String)>,
    recommendations: Vec<IndexRecommendation>,
}

impl Walker<'_> {
    fn visit_match(&mut self, filter: &Document, position: usize) {
        for (field, condition) in filter {
            if field == "$or" || field == "$and" {
                let branches = condition.as_array().into_iter().flatten().filter_map(Bson::as_document);
                for branch in branches {
                    for branch_field in branch.keys().filter(|key| !key.starts_with('$')) {
                        self.recommend(self.collection, branch_field, format!("{field} branch of $match at stage {position}"));
                    }
                }
            } else if !field.starts_with('$') {
                self.recommend(self.collection, field, format!("$match at stage {position}"));
            }
        }
    }

    fn visit_lookup(&mut self, lookup: &Document, position: usize) {
        if let (Ok(from), Ok(foreign_field)) = (lookup.get_str("from"), lookup.get_str("foreignField")) {
            self.recommend(from, foreign_field, format!("$lookup foreignField at stage {position}"));
        }
        if let Ok(local_field) = lookup.get_str("localField") {
            self.recommend(self.collection, local_field, format!("$lookup localField at stage {position}"));
        }
        if let Ok(target) = lookup.get_str("as") {
            self.derived.insert(target.to_string());
        }
    }

    fn recommend(&mut self, collection: &str, field: &str, reason: String) {
        let root = field.split('.').next().unwrap_or(field);
        if collection == self.collection && self.derived.contains(root) {
            return;
        }
        if !self.seen.insert((collection.to_string(), field.to_string())) {
            return;
        }
        self.recommendations.push(IndexRecommendation {
            collection: collection.to_string(),
            field: field.to_string(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::catalog::catalog_view;
    use mongodb::bson::doc;

    fn fields_for<'a>(recommendations: &'a [IndexRecommendation], collection: &str) -> Vec<&'a str> {
        recommendations
            .iter()
            .filter(|rec| rec.collection == collection)
            .map(|rec| rec.field.as_str())
            .collect()
    }

    #[test]
    fn catalog_view_recommendations_cover_stored_fields_only() {
        let pipeline = catalog_view("2024-05-01", &[Bson::Int64(1)]);
        let recommendations = recommend_indexes("movies", &pipeline);
        let movies = fields_for(&recommendations, "movies");

        for field in [
            "adult",
            "fullDetails.origin_country",
            "providers.results.US",
            "poster_path",
            "release_date",
            "keywords.id",
            "credits.cast.id",
        ] {
            assert!(movies.contains(&field), "missing {field}");
        }
        assert!(!movies.contains(&"leadFemaleCast"));
        assert!(!movies.contains(&"leadActressId"));
        assert_eq!(fields_for(&recommendations, "actors"), vec!["id"]);
    }

    #[test]
    fn or_branches_and_duplicates() {
        let pipeline = vec![
            doc! { "$match": { "$or": [{ "status": "a" }, { "owner.id": 3 }] } },
            doc! { "$match": { "status": "b" } },
            doc! { "$sort": { "status": 1 } },
        ];
        let recommendations = recommend_indexes("items", &pipeline);

        assert_eq!(fields_for(&recommendations, "items"), vec!["status", "owner.id"]);
        assert_eq!(recommendations[1].index_name(), "idx_owner_id");
        assert!(recommendations[0].reason.contains("$or"));
    }
}

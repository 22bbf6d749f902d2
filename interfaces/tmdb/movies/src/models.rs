use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Providers dropped from every offer list before movies are stored.
pub const DEFAULT_EXCLUDED_PROVIDERS: &[&str] = &["Hoopla", "Kanopy"];

/// One page of `/discover/movie`. Results stay untyped; they are stored as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordsResponse {
    #[serde(default)]
    pub keywords: Vec<Value>,
}

/// Everything the loaders attach to a movie document.
#[derive(Debug, Clone)]
pub struct MovieBundle {
    pub details: Value,
    pub credits: Value,
    pub providers: Value,
    pub keywords: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
    pub name: String,
    pub url: String,
}

/// Removes excluded providers from every offer array under `results.<locale>`.
/// Returns how many entries were dropped.
pub fn filter_excluded_providers(providers: &mut Value, locale: &str, excluded: &[&str]) -> usize {
    let Some(offers) = providers
        .get_mut("results")
        .and_then(|results| results.get_mut(locale))
        .and_then(Value::as_object_mut)
    else {
        return 0;
    };

    let mut removed = 0;
    for list in offers.values_mut().filter_map(Value::as_array_mut) {
        let before = list.len();
        list.retain(|provider| {
            provider
                .get("provider_name")
                .and_then(Value::as_str)
                .map_or(true, |name| !excluded.contains(&name))
        });
        removed += before - list.len();
    }
    removed
}

/// Flattens a locale's offers into unique, lowercased provider names pointing at the
/// locale's watch page.
pub fn locale_provider_links(providers: &Value, movie_id: i64, locale: &str) -> Vec<ProviderLink> {
    let Some(offers) = providers
        .get("results")
        .and_then(|results| results.get(locale))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let url = offers
        .get("link")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://www.themoviedb.org/movie/{movie_id}/watch?locale={locale}"));

    let mut links: Vec<ProviderLink> = Vec::new();
    for provider in offers.values().filter_map(Value::as_array).flatten() {
        let Some(name) = provider.get("provider_name").and_then(Value::as_str) else {
            continue;
        };
        let name = name.trim().to_lowercase();
        if name.is_empty() || links.iter().any(|link| link.name == name) {
            continue;
        }
        links.push(ProviderLink {
            name,
            url: url.clone(),
        });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_providers() -> Value {
        json!({
            "id": 603,
            "results": {
                "US": {
                    "link": "https://www.themoviedb.org/movie/603-the-matrix/watch?locale=US",
                    "flatrate": [
                        { "provider_name": "Max", "provider_id": 1899 },
                        { "provider_name": "Kanopy", "provider_id": 191 }
                    ],
                    "rent": [
                        { "provider_name": "Apple TV", "provider_id": 2 },
                        { "provider_name": "Hoopla", "provider_id": 212 }
                    ],
                    "buy": [
                        { "provider_name": "Apple TV", "provider_id": 2 }
                    ]
                },
                "GB": {
                    "flatrate": [{ "provider_name": "Kanopy", "provider_id": 191 }]
                }
            }
        })
    }

    #[test]
    fn drops_excluded_providers_for_locale_only() {
        let mut providers = sample_providers();
        let removed = filter_excluded_providers(&mut providers, "US", DEFAULT_EXCLUDED_PROVIDERS);

        assert_eq!(removed, 2);
        assert_eq!(providers["results"]["US"]["flatrate"].as_array().unwrap().len(), 1);
        assert_eq!(providers["results"]["US"]["rent"][0]["provider_name"], "Apple TV");
        assert_eq!(providers["results"]["GB"]["flatrate"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn filtering_without_locale_is_a_no_op() {
        let mut providers = json!({ "id": 1, "results": {} });
        assert_eq!(filter_excluded_providers(&mut providers, "US", DEFAULT_EXCLUDED_PROVIDERS), 0);
    }

    #[test]
    fn provider_links_are_unique_and_lowercased() {
        let links = locale_provider_links(&sample_providers(), 603, "US");
        let mut names: Vec<&str> = links.iter().map(|link| link.name.as_str()).collect();
        names.sort_unstable();

        assert_eq!(names, vec!["apple tv", "hoopla", "kanopy", "max"]);
        assert!(links.iter().all(|link| link.url.ends_with("watch?locale=US")));
    }

    #[test]
    fn provider_links_fall_back_to_watch_page() {
        let links = locale_provider_links(&sample_providers(), 603, "GB");
        assert_eq!(
            links,
            vec![ProviderLink {
                name: "kanopy".into(),
                url: "https://www.themoviedb.org/movie/603/watch?locale=GB".into(),
            }]
        );
        assert!(locale_provider_links(&sample_providers(), 603, "FR").is_empty());
    }
}

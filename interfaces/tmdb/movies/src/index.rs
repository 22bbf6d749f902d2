use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{DiscoverPage, KeywordsResponse, MovieBundle};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_discover_page(&self, page: u32) -> Result<DiscoverPage, FetchDiscoverPageError> {
        let query = [
            ("page", page.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "true".to_string()),
        ];
        self.get_json("/discover/movie", &query)
            .await
            .map_err(|source| FetchDiscoverPageError::Request { page, source })
    }

    pub async fn fetch_movie_details(&self, movie_id: i64) -> Result<Value, TmdbRequestError> {
        self.get_json(&format!("/movie/{movie_id}"), &[]).await
    }

    pub async fn fetch_movie_credits(&self, movie_id: i64) -> Result<Value, TmdbRequestError> {
        self.get_json(&format!("/movie/{movie_id}/credits"), &[]).await
    }

    pub async fn fetch_watch_providers(&self, movie_id: i64) -> Result<Value, TmdbRequestError> {
        self.get_json(&format!("/movie/{movie_id}/watch/providers"), &[]).await
    }

    pub async fn fetch_movie_keywords(&self, movie_id: i64) -> Result<Vec<Value>, TmdbRequestError> {
        let response: KeywordsResponse = self
            .get_json(&format!("/movie/{movie_id}/keywords"), &[])
            .await?;
        Ok(response.keywords)
    }

    /// Details, credits, providers and keywords, requested concurrently.
    pub async fn fetch_movie_bundle(&self, movie_id: i64) -> Result<MovieBundle, FetchMovieBundleError> {
        let (details, credits, providers, keywords) = tokio::try_join!(
            async {
                self.fetch_movie_details(movie_id)
                    .await
                    .map_err(|source| FetchMovieBundleError::Details { movie_id, source })
            },
            async {
                self.fetch_movie_credits(movie_id)
                    .await
                    .map_err(|source| FetchMovieBundleError::Credits { movie_id, source })
            },
            async {
                self.fetch_watch_providers(movie_id)
                    .await
                    .map_err(|source| FetchMovieBundleError::Providers { movie_id, source })
            },
            async {
                self.fetch_movie_keywords(movie_id)
                    .await
                    .map_err(|source| FetchMovieBundleError::Keywords { movie_id, source })
            },
        )?;

        Ok(MovieBundle {
            details,
            credits,
            providers,
            keywords,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbRequestError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "tmdb request");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|source| TmdbRequestError::RequestSend {
                source: source.without_url(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TmdbRequestError::ResponseRead {
                source: source.without_url(),
            })?;

        if !status.is_success() {
            return Err(TmdbRequestError::UnexpectedStatus { url, status, body });
        }

        serde_json::from_str(&body)
            .map_err(|source| TmdbRequestError::DeserializeResponseBody { url, source })
    }
}

#[derive(Debug, Error)]
pub enum TmdbRequestError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("UnexpectedStatus: {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("DeserializeResponseBody from {url}: {source}")]
    DeserializeResponseBody {
        url: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchDiscoverPageError {
    #[error("FetchDiscoverPage {page}: {source}")]
    Request {
        page: u32,
        #[source]
        source: TmdbRequestError,
    },
}

#[derive(Debug, Error)]
pub enum FetchMovieBundleError {
    #[error("FetchMovieDetails {movie_id}: {source}")]
    Details {
        movie_id: i64,
        #[source]
        source: TmdbRequestError,
    },

    #[error("FetchMovieCredits {movie_id}: {source}")]
    Credits {
        movie_id: i64,
        #[source]
        source: TmdbRequestError,
    },

    #[error("FetchWatchProviders {movie_id}: {source}")]
    Providers {
        movie_id: i64,
        #[source]
        source: TmdbRequestError,
    },

    #[error("FetchMovieKeywords {movie_id}: {source}")]
    Keywords {
        movie_id: i64,
        #[source]
        source: TmdbRequestError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn api_key_matcher() -> Matcher {
        Matcher::UrlEncoded("api_key".into(), "test-key".into())
    }

    #[tokio::test]
    async fn discover_page_sends_expected_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/discover/movie")
            .match_query(Matcher::AllOf(vec![
                api_key_matcher(),
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("sort_by".into(), "popularity.desc".into()),
                Matcher::UrlEncoded("include_adult".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"page":2,"total_pages":7,"results":[{"id":11,"title":"Star Wars"}]}"#)
            .create_async()
            .await;

        let client = TmdbClient::new("test-key", server.url());
        let page = client.fetch_discover_page(2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 7);
        assert_eq!(page.results[0]["title"], "Star Wars");
    }

    #[tokio::test]
    async fn bundle_collects_all_four_resources() {
        let mut server = mockito::Server::new_async().await;
        let details = server
            .mock("GET", "/movie/11")
            .match_query(api_key_matcher())
            .with_body(r#"{"id":11,"runtime":121,"origin_country":["US"]}"#)
            .create_async()
            .await;
        let credits = server
            .mock("GET", "/movie/11/credits")
            .match_query(api_key_matcher())
            .with_body(r#"{"id":11,"cast":[{"id":2,"name":"Mark Hamill","gender":2}],"crew":[]}"#)
            .create_async()
            .await;
        let providers = server
            .mock("GET", "/movie/11/watch/providers")
            .match_query(api_key_matcher())
            .with_body(r#"{"id":11,"results":{"US":{"flatrate":[]}}}"#)
            .create_async()
            .await;
        let keywords = server
            .mock("GET", "/movie/11/keywords")
            .match_query(api_key_matcher())
            .with_body(r#"{"id":11,"keywords":[{"id":803,"name":"space opera"}]}"#)
            .create_async()
            .await;

        let client = TmdbClient::new("test-key", format!("{}/", server.url()));
        let bundle = client.fetch_movie_bundle(11).await.unwrap();

        details.assert_async().await;
        credits.assert_async().await;
        providers.assert_async().await;
        keywords.assert_async().await;
        assert_eq!(bundle.details["runtime"], 121);
        assert_eq!(bundle.credits["cast"][0]["name"], "Mark Hamill");
        assert!(bundle.providers["results"]["US"].is_object());
        assert_eq!(bundle.keywords.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/404")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"status_code":34,"status_message":"The resource you requested could not be found."}"#)
            .create_async()
            .await;

        let client = TmdbClient::new("test-key", server.url());
        let err = client.fetch_movie_details(404).await.unwrap_err();

        assert!(matches!(
            err,
            TmdbRequestError::UnexpectedStatus { status, .. } if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn bundle_fails_when_any_part_fails() {
        let mut server = mockito::Server::new_async().await;
        let mut mocks = Vec::new();
        for path in ["/movie/5", "/movie/5/credits", "/movie/5/watch/providers"] {
            let mock = server
                .mock("GET", path)
                .match_query(Matcher::Any)
                .with_body(r#"{"id":5}"#)
                .create_async()
                .await;
            mocks.push(mock);
        }
        let _failing = server
            .mock("GET", "/movie/5/keywords")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = TmdbClient::new("test-key", server.url());
        let err = client.fetch_movie_bundle(5).await.unwrap_err();

        assert!(matches!(err, FetchMovieBundleError::Keywords { movie_id: 5, .. }));
    }

    #[tokio::test]
    async fn transport_errors_do_not_expose_the_api_key() {
        let client = TmdbClient::new("SECRET-KEY-123", "http://127.0.0.1:1");
        let err = client.fetch_movie_details(5).await.unwrap_err();

        assert!(matches!(err, TmdbRequestError::RequestSend { .. }));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }
}

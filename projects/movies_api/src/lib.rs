//! Movie catalog REST service over MongoDB, plus TMDB batch loaders
//!
//! - REST endpoints in `endpoints/`, wired in `router`
//! - `/api` middleware chain in `middleware/`
//! - MongoDB queries in `db/`, aggregation pipelines in `pipelines/`
//! - Batch jobs in `jobs/`, run by the `movies_jobs` binary
//! - Requires API_BEARER_TOKEN; TMDB_API_KEY for jobs and provider lookups

pub mod config;
pub mod db;
pub mod endpoints;
pub mod jobs;
pub mod middleware;
pub mod pipelines;
pub mod router;

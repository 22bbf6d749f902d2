//! Thin client over the TMDB v3 REST API.
//!
//! - HTTP calls in `index`
//! - response shapes and provider helpers in `models`

pub mod index;
pub mod models;

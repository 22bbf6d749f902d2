//! Layers applied to every `/api` route, outermost first: rate limit, bearer
//! auth, ban check, request log.

pub mod auth;
pub mod ban_check;
pub mod client;
pub mod rate_limit;
pub mod request_log;
pub mod validate;

pub mod bans;
pub mod countries;
pub mod crud;
pub mod fallback;
pub mod health;
pub mod movies;
pub mod providers;
pub mod response;

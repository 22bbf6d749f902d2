pub mod body;
pub mod create;
pub mod delete;
pub mod find;
pub mod update;
pub mod upsert_settings;

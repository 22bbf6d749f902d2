pub mod admin;
pub mod create;
pub mod delete;
pub mod list;

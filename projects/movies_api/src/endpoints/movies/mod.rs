pub mod details;
pub mod with_actors;

pub mod links;
pub mod list;
pub mod lookup;

pub mod cache;
pub mod events;

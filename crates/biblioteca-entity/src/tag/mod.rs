//! Tag entities.

pub mod model;

pub use model::Tag;

//! Named live queries.

pub mod invalidation;
pub mod types;

pub use types::LiveQuery;

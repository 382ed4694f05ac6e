//! Core type definitions used across the Biblioteca workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};

//! v1 API Data Transfer Objects.
//!
//! Wire format for the v1 REST API, kept separate from the domain models in
//! `src/models/`.

pub mod admin;
pub mod common;
pub mod research;

pub use admin::*;
pub use common::*;
pub use research::*;

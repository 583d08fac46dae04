mod common;
mod outcome;
mod research;

pub use common::*;
pub use outcome::*;
pub use research::*;

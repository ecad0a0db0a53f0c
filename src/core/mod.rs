// Core error types shared across the crate
pub mod error;

pub use error::{Error, Result};

//! Shared types for the library to-do workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;

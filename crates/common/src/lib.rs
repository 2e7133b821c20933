//! Credential wrapper and config errors used by every NGOConnect crate

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;

//! Rockfall Core - feature pipeline, risk scoring, classifiers and training
//!
//! Shared by the `rockfall` CLI and the `rockfall-api` web service.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{Result, RockfallError};

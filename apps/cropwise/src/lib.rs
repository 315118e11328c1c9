//! # cropwise
//!
//! Library side of the Cropwise binary: configuration, the startup phase,
//! the model process client and the CLI. The advisory logic itself lives in
//! `cropwise-core`.

pub mod cli;
pub mod config;
pub mod model;
pub mod startup;

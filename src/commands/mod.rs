//! Command implementations for the CLI
//!
//! - start: Start the pricing server
//! - test: Load everything the server needs, then exit
//! - config: Configuration display and validation
//! - predict: Price one request offline

pub mod config;
pub mod predict;
pub mod start;

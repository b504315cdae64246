//! Domain logic for the generation nodes.
//!
//! Option enums, request-parameter normalization, presets, prompt
//! building, and the keyword and style catalogs. Nothing in this crate
//! talks to the network.

pub mod error;
pub mod keywords;
pub mod options;
pub mod params;
pub mod preset;
pub mod prompt;
pub mod style;

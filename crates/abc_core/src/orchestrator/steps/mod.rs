//! Pipeline step implementations.
//!
//! Each step sends one phase of the cleanup sequence to the editor.

mod effects;
mod export;
mod noise_profile;
mod select_all;

pub use effects::{CompressionStep, NoiseReductionStep};
pub use export::ExportStep;
pub use noise_profile::NoiseProfileStep;
pub use select_all::SelectAllStep;

//! CLI command implementations

pub mod completions;
pub mod extract;
pub mod normalize;
pub mod run;

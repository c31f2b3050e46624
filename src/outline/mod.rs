//! Outline building and section segmentation.

mod builder;
mod segment;

pub use builder::build_outline;
pub use segment::segment;

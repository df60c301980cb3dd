//! Split planning module
//!
//! Turns a probed duration and a sizing strategy into an ordered list of
//! contiguous segments covering the whole source.

pub mod strategy;

pub use strategy::SplitPlanner;

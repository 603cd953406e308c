//! Core value types
//!
//! Shared by every subsystem:
//! - Coordinate: zero-based cell position
//! - Canvas: flat element grid for callers that render full screens

pub mod canvas;
pub mod coord;

pub use canvas::Canvas;
pub use coord::Coordinate;

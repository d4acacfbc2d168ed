//! Core types shared by the globe demo crates.
//!
//! - Frame timing (elapsed wall-clock time drives every animation)
//! - Transform for building model matrices

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

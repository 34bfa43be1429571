//! Core data structures and traits for meshview
//!
//! This crate provides the fundamental types shared by the loader, renderer
//! and viewer: triangle meshes, the model scene graph, bounding boxes, rays
//! and transforms.

pub mod point;
pub mod mesh;
pub mod bounds;
pub mod ray;
pub mod scene;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use bounds::*;
pub use ray::*;
pub use scene::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, Perspective3};

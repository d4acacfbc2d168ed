//! Procedural generation for the globe demo: sphere meshes, the orbiting star
//! ring, satellite orbits, constellation figures and the fallback globe texture.
//!
//! Everything here is pure CPU data; GPU upload lives in the `renderer` crate.

pub mod constellation;
pub mod error;
pub mod orbit;
pub mod sphere;
pub mod star_field;
pub mod textures;

pub use constellation::*;
pub use error::*;
pub use orbit::*;
pub use sphere::*;
pub use star_field::*;
pub use textures::*;

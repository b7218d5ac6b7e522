//! Surface transfer algorithms.
//!
//! - **Projection** ([`project`]): wrap source meshes onto a target through
//!   the target's UV map
//! - **Mirroring** ([`mirror`]): reflect source meshes across a surface
//!   along its normal field
//!
//! [`partition`] holds the UV-space lookup grid used by projection, and
//! [`report`] the leveled message sink both engines write to.

pub mod mirror;
pub mod partition;
pub mod project;
pub mod report;

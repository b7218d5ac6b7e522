//! Normal-based mirroring.
//!
//! Every source vertex is reflected across the mirror surface along the
//! mirror's normal field. A vertex *intersects* a mirror face when it lies
//! inside the prism swept by the face's corner normals; smooth reflection
//! then travels along the interpolated normal so curved mirrors reflect
//! without seams.
//!
//! Search starts from vertices that intersect some face and spreads across
//! the source's edges, testing each reached vertex against the faces near
//! the one its closest mirrored neighbour used. See [`MirrorOptions`] for
//! the exhaustive closest-face mode and for reflecting vertices that miss
//! the mirror entirely.

mod engine;
mod options;
pub mod search;

pub use engine::{mirror_meshes, mirror_vertices, MirroredMesh};
pub use options::{MirrorOptions, MAX_BIAS, MIN_BIAS};
pub use search::{find_closest_tri, plane_distance, tri_intersection, MirrorHit, SearchRecord};

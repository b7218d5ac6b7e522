//! Error types for meshcast.
//!
//! Two families of failure exist:
//!
//! - [`MeshError`] aborts a whole operation before any mesh is touched
//!   (bad input meshes, missing UV layer, invalid options).
//! - [`SkipReason`] describes why a single source mesh was skipped. Sibling
//!   meshes keep processing, and the reason is reported once per mesh.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that abort an operation.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// Two faces use the same directed edge (inconsistent winding or an edge
    /// shared by more than two faces).
    #[error("directed edge ({v0}, {v1}) is used by more than one face")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The projection target carries no active UV layer.
    #[error("no active UV layer found on the target surface")]
    MissingUvLayer,

    /// The UV layer does not have one entry per face.
    #[error("UV layer has {found} faces but the mesh has {expected}")]
    UvLayerMismatch {
        /// Number of faces in the mesh.
        expected: usize,
        /// Number of face entries in the UV layer.
        found: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// A source mesh was skipped.
    #[error(transparent)]
    Skipped(#[from] SkipReason),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Corner of a source mesh's bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// Minimum x, maximum y.
    TopLeft,
    /// Maximum x, maximum y.
    TopRight,
    /// Maximum x, minimum y.
    BottomRight,
    /// Minimum x, minimum y.
    BottomLeft,
}

impl Corner {
    /// All corners in tracing order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomRight => "bottom-right",
            Corner::BottomLeft => "bottom-left",
        };
        f.write_str(name)
    }
}

/// Why a single source mesh produced no output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The ray from the mesh origin missed the target.
    #[error("center point did not project onto the target")]
    CenterMissed,

    /// A bounding corner missed the target on every retry.
    #[error(
        "{corner} corner could not project onto the target; verify that the target area \
         is UV mapped and that the mesh is between the camera and the target"
    )]
    CornerMissed {
        /// The corner that failed.
        corner: Corner,
    },

    /// The traced corners span no area in UV space.
    #[error("projection target area is 0; verify the UV map")]
    ZeroUvArea,

    /// Not a single vertex found a target triangle.
    #[error("could not be projected")]
    NothingProjected,

    /// Not a single vertex intersected the mirror mesh.
    #[error("does not intersect the mirror mesh, no mirror created")]
    NoIntersection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::invalid_param("bias", -1.0, "must be non-negative");
        assert!(format!("{err}").contains("bias"));
        assert!(format!("{err}").contains("non-negative"));

        let err = MeshError::UvLayerMismatch {
            expected: 4,
            found: 2,
        };
        assert_eq!(format!("{err}"), "UV layer has 2 faces but the mesh has 4");
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::CornerMissed {
            corner: Corner::BottomLeft,
        };
        assert!(format!("{reason}").starts_with("bottom-left corner"));
        assert_eq!(Corner::ALL.len(), 4);

        let err = MeshError::from(SkipReason::ZeroUvArea);
        assert_eq!(err.to_string(), SkipReason::ZeroUvArea.to_string());
    }
}

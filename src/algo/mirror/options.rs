//! Mirror settings.

use crate::error::{MeshError, Result};

/// Smallest accepted intersection bias.
pub const MIN_BIAS: f64 = 1e-4;

/// Largest accepted intersection bias.
pub const MAX_BIAS: f64 = 0.1;

/// Options for mirroring a mesh across a mirror surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorOptions {
    /// Reflect along the interpolated vertex normals of the mirror face
    /// rather than its flat normal.
    pub smooth: bool,

    /// Ignore mirror faces the vertex lies behind.
    pub cull_backfaces: bool,

    /// Leave vertices that intersect no mirror face where they are. When
    /// false they are reflected across the face plane of their nearest
    /// mirrored neighbour.
    pub only_intersecting: bool,

    /// Test every vertex against every mirror face and keep the closest
    /// intersection. Slow on dense meshes.
    pub intersect_closest: bool,

    /// Barycentric tolerance for intersection tests.
    pub bias: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            smooth: true,
            cull_backfaces: false,
            only_intersecting: true,
            intersect_closest: false,
            bias: MIN_BIAS,
            parallel: true,
        }
    }
}

impl MirrorOptions {
    /// Choose smooth or flat reflection.
    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Enable or disable backface culling.
    pub fn with_cull_backfaces(mut self, cull: bool) -> Self {
        self.cull_backfaces = cull;
        self
    }

    /// Restrict mirroring to intersecting vertices.
    pub fn with_only_intersecting(mut self, only: bool) -> Self {
        self.only_intersecting = only;
        self
    }

    /// Search every face for the closest intersection.
    pub fn with_intersect_closest(mut self, closest: bool) -> Self {
        self.intersect_closest = closest;
        self
    }

    /// Set the intersection bias, clamped to `[MIN_BIAS, MAX_BIAS]`.
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias.clamp(MIN_BIAS, MAX_BIAS);
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check every value.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] if `bias` is outside
    /// `[MIN_BIAS, MAX_BIAS]`.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BIAS..=MAX_BIAS).contains(&self.bias) {
            return Err(MeshError::invalid_param(
                "bias",
                self.bias,
                "must lie between 0.0001 and 0.1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MirrorOptions::default();
        assert!(options.smooth);
        assert!(!options.cull_backfaces);
        assert!(options.only_intersecting);
        assert!(!options.intersect_closest);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_bias_clamped() {
        assert_eq!(MirrorOptions::default().with_bias(1.0).bias, MAX_BIAS);
        assert_eq!(MirrorOptions::default().with_bias(0.0).bias, MIN_BIAS);

        let options = MirrorOptions {
            bias: f64::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}

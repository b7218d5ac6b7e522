//! Typed indices for mesh elements.
//!
//! Vertices, half-edges and faces are addressed by thin wrappers around an
//! unsigned integer so they cannot be mixed up. The integer width is chosen by
//! the mesh through the [`MeshIndex`] parameter (`u32` unless stated).
//!
//! [`MeshId`] is different: it names a whole mesh taking part in one
//! projection or mirror call, so a target can be told apart from its sources
//! without comparing names.

use std::fmt;
use std::hash::Hash;

/// Integer types usable as element indices.
pub trait MeshIndex:
    Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static
{
    /// Sentinel for "no element".
    const INVALID: Self;

    /// Convert from `usize`.
    ///
    /// Values that do not fit are caught by a debug assertion.
    fn from_usize(v: usize) -> Self;

    /// Convert to `usize`.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {
        $(
            impl MeshIndex for $t {
                const INVALID: Self = <$t>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v < <$t>::MAX as usize,
                        "index {} does not fit in {}",
                        v,
                        stringify!($t)
                    );
                    v as $t
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// Index of a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Index of a half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Index of a triangular face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_element_id {
    ($name:ident, $tag:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Wrap a raw index.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The "no element" id.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Raw index as `usize`.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Whether this id refers to an element.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != I::INVALID
            }
        }

        impl<I: MeshIndex> fmt::Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($tag, "({})"), self.index())
                } else {
                    f.write_str(concat!($tag, "(-)"))
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_element_id!(VertexId, "V");
impl_element_id!(HalfEdgeId, "HE");
impl_element_id!(FaceId, "F");

/// Identity of a mesh within a single engine call.
///
/// Assigned once by the caller; two meshes with the same id are treated as
/// the same object (a source equal to the target is skipped).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MeshId(pub u32);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip_index() {
        let v: VertexId = VertexId::new(42);
        let f: FaceId<u16> = FaceId::new(7);
        assert_eq!(v.index(), 42);
        assert_eq!(f.index(), 7);
        assert!(v.is_valid());
        assert!(!FaceId::<u64>::invalid().is_valid());
    }

    #[test]
    fn test_default_is_invalid() {
        let he: HalfEdgeId = HalfEdgeId::default();
        assert!(!he.is_valid());
    }

    #[test]
    fn test_debug_format() {
        let v: VertexId = VertexId::new(3);
        assert_eq!(format!("{:?}", v), "V(3)");
        assert_eq!(format!("{:?}", FaceId::<u32>::invalid()), "F(-)");
        assert_eq!(MeshId(5).to_string(), "#5");
    }
}

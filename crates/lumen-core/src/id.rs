//! Strongly-typed opaque identifiers.
//!
//! Every index into a per-slot array, registry or lineage table is wrapped
//! in its own newtype so a [`TrackId`] can never be used where a
//! [`ThreadId`] is expected.

use std::fmt;

/// An opaque index usable as the key of a [`Collection`](crate::Collection).
pub trait OpaqueId: Copy + Eq + Ord + fmt::Debug {
    /// Build an id from a dense `usize` index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit the id's underlying integer.
    fn from_index(index: usize) -> Self;

    /// The dense `usize` index this id refers to.
    fn index(self) -> usize;
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub $repr);

        impl OpaqueId for $name {
            fn from_index(index: usize) -> Self {
                match <$repr>::try_from(index) {
                    Ok(v) => Self(v),
                    Err(_) => panic!(concat!(stringify!($name), " index {} out of range"), index),
                }
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$repr> for $name {
            fn from(v: $repr) -> Self {
                Self(v)
            }
        }
    };
}

opaque_id!(
    /// Dense index of a track slot: one lane of every per-slot array.
    ThreadId(u32)
);

opaque_id!(
    /// Globally unique track identity, issued monotonically per run.
    ///
    /// Parent links are stored as `Option<TrackId>` back-references, never
    /// as owning pointers.
    TrackId(u64)
);

opaque_id!(
    /// Primary event that spawned a lineage of tracks.
    EventId(u32)
);

opaque_id!(
    /// Index into the particle definition table.
    ParticleId(u32)
);

opaque_id!(
    /// Index into the registered physics model table.
    ModelId(u32)
);

opaque_id!(
    /// Geometry volume identity returned by the geometry oracle.
    VolumeId(u32)
);

opaque_id!(
    /// Geometry surface identity returned by the geometry oracle.
    SurfaceId(u32)
);

opaque_id!(
    /// Position of an action in a validated action sequence.
    ActionId(u32)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        let t = ThreadId::from_index(17);
        assert_eq!(t, ThreadId(17));
        assert_eq!(t.index(), 17);
        assert_eq!(TrackId::from_index(3).index(), 3);
    }

    #[test]
    fn ids_order_by_value() {
        assert!(ThreadId(1) < ThreadId(2));
        assert!(TrackId(9) > TrackId(4));
    }

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(ModelId(4).to_string(), "4");
        assert_eq!(EventId::from(12).to_string(), "12");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn oversized_index_panics() {
        let _ = ThreadId::from_index(usize::MAX);
    }
}

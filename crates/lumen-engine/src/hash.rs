//! FNV-1a fingerprinting of deterministic run output.
//!
//! Two runs with identical input must produce identical fingerprints.
//! These hashes are not cryptographically secure; they are used for
//! fast equality checks across thread counts and repeated runs.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Incremental FNV-1a hasher.
///
/// Floats are hashed by bit pattern, so `0.0` and `-0.0` differ. Strings
/// and slices are length-prefixed so that adjacent values cannot alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fingerprint(u64);

impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprint {
    /// Start from the FNV-1a offset basis.
    pub fn new() -> Self {
        Self(FNV_OFFSET)
    }

    /// Feed raw bytes.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        for &b in bytes {
            self.0 = fnv1a_byte(self.0, b);
        }
        self
    }

    /// Feed a u64 as 8 LE bytes.
    pub fn u64(self, v: u64) -> Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Feed a usize widened to u64.
    pub fn usize(self, v: usize) -> Self {
        self.u64(v as u64)
    }

    /// Feed an f64 by bit pattern.
    pub fn f64(self, v: f64) -> Self {
        self.u64(v.to_bits())
    }

    /// Feed a length-prefixed string.
    pub fn str(self, s: &str) -> Self {
        self.usize(s.len()).bytes(s.as_bytes())
    }

    /// Feed a length-prefixed slice of u64.
    pub fn u64s(self, vs: &[u64]) -> Self {
        vs.iter().fold(self.usize(vs.len()), |h, &v| h.u64(v))
    }

    /// Feed a length-prefixed slice of f64.
    pub fn f64s(self, vs: &[f64]) -> Self {
        vs.iter().fold(self.usize(vs.len()), |h, &v| h.f64(v))
    }

    /// The current hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_offset_basis() {
        assert_eq!(Fingerprint::new().finish(), FNV_OFFSET);
    }

    #[test]
    fn known_vector() {
        // FNV-1a("a") = 0xaf63dc4c8601ec8c
        assert_eq!(Fingerprint::new().bytes(b"a").finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn order_matters() {
        let a = Fingerprint::new().u64(1).u64(2).finish();
        let b = Fingerprint::new().u64(2).u64(1).finish();
        assert_ne!(a, b);
    }

    #[test]
    fn length_prefix_separates_strings() {
        let a = Fingerprint::new().str("ab").str("c").finish();
        let b = Fingerprint::new().str("a").str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn signed_zero_differs() {
        assert_ne!(
            Fingerprint::new().f64(0.0).finish(),
            Fingerprint::new().f64(-0.0).finish()
        );
    }
}

use subtle::ConstantTimeEq;

/// Compares two byte sequences in time independent of the position of the first mismatch.
/// Sequences of different lengths compare unequal; their lengths are not considered secret.
pub fn bytes_eq(lhs: &[u8], rhs: &[u8]) -> bool {
    lhs.ct_eq(rhs).into()
}

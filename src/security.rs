use subtle::ConstantTimeEq;

/// Compare a secret supplied by a caller against the configured one
/// without leaking the position of the first mismatch through timing.
///
/// Lengths are compared up front; only the length can leak.
pub fn constant_time_compare(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

//! Seed expansion.

/// Seed argument meaning "do not seed, use the thread-local generator".
pub const UNSEEDED: i64 = -1;

/// Expand a 64-bit seed into the 32-byte generator state.
///
/// The four little-endian words are `seed`, `seed + 1000`, `seed + 2000`
/// and `seed + 3000`.
pub fn create_byte_seed(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (i, chunk) in bytes.chunks_exact_mut(8).enumerate() {
        let word = seed.wrapping_add(1000 * i as u64);
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_seed_layout() {
        let bytes = create_byte_seed(7);
        assert_eq!(u64::from_le_bytes(bytes[0..8].try_into().unwrap()), 7);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 1007);
        assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 2007);
        assert_eq!(u64::from_le_bytes(bytes[24..32].try_into().unwrap()), 3007);
    }

    #[test]
    fn test_byte_seed_wraps() {
        let bytes = create_byte_seed(u64::MAX);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 999);
    }
}

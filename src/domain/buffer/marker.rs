//! Alignment marker embedded in the live stream
//!
//! The pattern is quiet enough to be inaudible but distinctive enough to
//! be located in an exported slice after the fact.

/// Number of samples in the marker pattern
pub const MARKER_LEN: usize = 16;

/// Per-sample tolerance used when locating the marker
pub const MARKER_TOLERANCE: f32 = 1e-6;

/// The fixed marker sequence, identical on every injection.
pub const MARKER_PATTERN: [f32; MARKER_LEN] = [
    1.23e-5, -2.34e-5, 3.45e-5, -4.56e-5, 5.67e-5, -6.78e-5, 7.89e-5, -8.90e-5, 9.01e-5,
    -1.23e-5, 1.35e-5, -2.46e-5, 3.57e-5, -4.68e-5, 5.79e-5, -6.80e-5,
];

/// Marker pattern operations
pub struct MarkerPattern;

impl MarkerPattern {
    /// Overwrite the head of `block` with the pattern.
    ///
    /// Returns how many samples were replaced (`min(block.len(), 16)`).
    pub fn stamp(block: &mut [f32]) -> usize {
        let len = block.len().min(MARKER_LEN);
        block[..len].copy_from_slice(&MARKER_PATTERN[..len]);
        len
    }

    /// Index of the first full occurrence of the pattern in `samples`.
    pub fn find(samples: &[f32]) -> Option<usize> {
        if samples.len() < MARKER_LEN {
            return None;
        }
        samples.windows(MARKER_LEN).position(|window| {
            window
                .iter()
                .zip(MARKER_PATTERN.iter())
                .all(|(a, b)| (a - b).abs() < MARKER_TOLERANCE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_alternates_sign() {
        for pair in MARKER_PATTERN.windows(2) {
            assert!(pair[0].signum() != pair[1].signum());
        }
        assert!(MARKER_PATTERN.iter().all(|v| v.abs() < 1e-4));
    }

    #[test]
    fn stamp_short_block() {
        let mut block = [0.5f32; 4];
        assert_eq!(MarkerPattern::stamp(&mut block), 4);
        assert_eq!(block, [1.23e-5, -2.34e-5, 3.45e-5, -4.56e-5]);
    }

    #[test]
    fn find_locates_pattern() {
        let mut samples = vec![0.25f32; 100];
        samples[40..56].copy_from_slice(&MARKER_PATTERN);
        assert_eq!(MarkerPattern::find(&samples), Some(40));
    }

    #[test]
    fn find_tolerates_quantization() {
        // 24-bit quantization error is far below the tolerance
        let scale = 8_388_607.0f32;
        let mut samples = vec![0.0f32; 32];
        for (i, v) in MARKER_PATTERN.iter().enumerate() {
            samples[8 + i] = (v * scale).round() / scale;
        }
        assert_eq!(MarkerPattern::find(&samples), Some(8));
    }

    #[test]
    fn find_rejects_missing_pattern() {
        assert_eq!(MarkerPattern::find(&[0.0; 64]), None);
        assert_eq!(MarkerPattern::find(&MARKER_PATTERN[..8]), None);
    }
}

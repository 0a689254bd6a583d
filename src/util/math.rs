//! Numeric helpers shared by the resize and search stages.

/// Scales a pixel length, rounding half to even and flooring at `min_len`.
pub(crate) fn scaled_len(len: usize, scale: f64, min_len: usize) -> usize {
    let scaled = (len as f64 * scale).round_ties_even();
    if !scaled.is_finite() || scaled < min_len as f64 {
        return min_len;
    }
    scaled as usize
}

/// Reflects an index into `[0, len)` without repeating the edge sample.
///
/// Only offsets of at most `len - 1` past either edge are supported, which
/// covers every 3-tap kernel used in this crate.
pub(crate) fn reflect_101(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    let mut i = idx;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}

/// Clamps an index into `[0, len)` by repeating the edge sample.
pub(crate) fn replicate(idx: isize, len: usize) -> usize {
    idx.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::{reflect_101, replicate, scaled_len};

    #[test]
    fn scaled_len_rounds_half_to_even() {
        assert_eq!(scaled_len(5, 0.5, 2), 2);
        assert_eq!(scaled_len(7, 0.5, 2), 4);
        assert_eq!(scaled_len(20, 0.8, 2), 16);
    }

    #[test]
    fn scaled_len_respects_floor() {
        assert_eq!(scaled_len(3, 0.4, 2), 2);
        assert_eq!(scaled_len(1, 1.0, 2), 2);
    }

    #[test]
    fn reflect_101_skips_edge_sample() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn replicate_clamps() {
        assert_eq!(replicate(-1, 4), 0);
        assert_eq!(replicate(4, 4), 3);
    }
}

//! Best-peak tracking in raster order.

/// Best-scoring placement found by a scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the window's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the window's top-left corner.
    pub y: usize,
    /// ZNCC score at the placement.
    pub score: f32,
}

/// Keeps the first placement reaching the maximum score.
///
/// Placements must be pushed in raster order; a later placement replaces the
/// current best only when its score is strictly greater.
pub struct BestPeak {
    best: Option<Peak>,
}

impl BestPeak {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self { best: None }
    }

    /// Offers a placement to the tracker.
    #[inline]
    pub fn push(&mut self, x: usize, y: usize, score: f32) {
        match self.best {
            Some(best) if score <= best.score => {}
            _ => self.best = Some(Peak { x, y, score }),
        }
    }

    /// Returns the best placement, if any was pushed.
    pub fn into_peak(self) -> Option<Peak> {
        self.best
    }
}

impl Default for BestPeak {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{BestPeak, Peak};

    #[test]
    fn first_maximum_wins_ties() {
        let mut tracker = BestPeak::new();
        tracker.push(0, 0, 0.2);
        tracker.push(1, 0, 0.9);
        tracker.push(2, 0, 0.9);
        tracker.push(0, 1, 0.5);
        assert_eq!(
            tracker.into_peak(),
            Some(Peak {
                x: 1,
                y: 0,
                score: 0.9
            })
        );
    }

    #[test]
    fn empty_tracker_has_no_peak() {
        assert_eq!(BestPeak::new().into_peak(), None);
    }
}

use super::TOLERANCE;

/// A closed interval `[start, end]` on the real line.
///
/// Used for parameter ranges along a centerline: occupied stretches, usable
/// stretches and the free gaps between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound.
    pub start: f64,
    /// Upper bound.
    pub end: f64,
}

impl Interval {
    /// Creates an interval, ordering the bounds if needed.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Length of the interval.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Returns `true` if the interval has no measurable length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length() <= TOLERANCE
    }

    /// Returns `true` if `t` lies inside the interval (bounds included).
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start - TOLERANCE && t <= self.end + TOLERANCE
    }

    /// Returns `true` if the two intervals overlap or share a bound.
    #[must_use]
    pub fn touches(&self, other: &Interval) -> bool {
        self.start <= other.end + TOLERANCE && other.start <= self.end + TOLERANCE
    }

    /// Intersection of two intervals, or `None` if it is empty.
    #[must_use]
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        let result = Interval { start, end };
        (end >= start && !result.is_empty()).then_some(result)
    }

    /// Grows the interval by `padding` on both sides.
    #[must_use]
    pub fn padded(&self, padding: f64) -> Interval {
        Interval::new(self.start - padding, self.end + padding)
    }
}

/// Merges overlapping or touching intervals.
///
/// The result is sorted by `start` and pairwise disjoint.
#[must_use]
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + TOLERANCE => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Returns the parts of `domain` not covered by any interval in `occupied`.
///
/// The gaps are returned in ascending order; zero-length gaps are dropped.
#[must_use]
pub fn complement_within(domain: Interval, occupied: &[Interval]) -> Vec<Interval> {
    if domain.is_empty() {
        return Vec::new();
    }

    let clipped: Vec<Interval> = occupied
        .iter()
        .filter_map(|interval| {
            let start = interval.start.max(domain.start);
            let end = interval.end.min(domain.end);
            (end >= start).then_some(Interval { start, end })
        })
        .collect();

    let mut gaps = Vec::new();
    let mut cursor = domain.start;
    for interval in merge_intervals(&clipped) {
        if interval.start > cursor + TOLERANCE {
            gaps.push(Interval::new(cursor, interval.start));
        }
        cursor = cursor.max(interval.end);
    }
    if domain.end > cursor + TOLERANCE {
        gaps.push(Interval::new(cursor, domain.end));
    }
    gaps
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn new_orders_bounds() {
        let i = Interval::new(5.0, 2.0);
        assert_relative_eq!(i.start, 2.0);
        assert_relative_eq!(i.end, 5.0);
    }

    #[test]
    fn merge_joins_overlapping_and_touching() {
        let merged = merge_intervals(&[
            Interval::new(5.0, 6.0),
            Interval::new(0.0, 2.0),
            Interval::new(1.0, 3.0),
            Interval::new(3.0, 4.0),
        ]);
        assert_eq!(merged, vec![Interval::new(0.0, 4.0), Interval::new(5.0, 6.0)]);
    }

    #[test]
    fn complement_of_nothing_is_domain() {
        let gaps = complement_within(Interval::new(100.0, 2900.0), &[]);
        assert_eq!(gaps, vec![Interval::new(100.0, 2900.0)]);
        assert_relative_eq!(gaps[0].length(), 2800.0);
    }

    #[test]
    fn complement_splits_around_obstruction() {
        let gaps = complement_within(
            Interval::new(100.0, 2900.0),
            &[Interval::new(1000.0, 1200.0)],
        );
        assert_eq!(
            gaps,
            vec![Interval::new(100.0, 1000.0), Interval::new(1200.0, 2900.0)]
        );
        assert_relative_eq!(gaps[0].length(), 900.0);
        assert_relative_eq!(gaps[1].length(), 1700.0);
    }

    #[test]
    fn complement_ignores_intervals_outside_domain() {
        let gaps = complement_within(
            Interval::new(0.0, 10.0),
            &[Interval::new(-5.0, 1.0), Interval::new(9.0, 20.0), Interval::new(30.0, 40.0)],
        );
        assert_eq!(gaps, vec![Interval::new(1.0, 9.0)]);
    }

    #[test]
    fn complement_of_full_cover_is_empty() {
        let gaps = complement_within(Interval::new(0.0, 10.0), &[Interval::new(-1.0, 11.0)]);
        assert!(gaps.is_empty());
    }

    #[test]
    fn intersection_of_disjoint_is_none() {
        assert!(Interval::new(0.0, 1.0).intersection(&Interval::new(2.0, 3.0)).is_none());
        assert!(Interval::new(0.0, 1.0).intersection(&Interval::new(1.0, 3.0)).is_none());
        let i = Interval::new(0.0, 2.0).intersection(&Interval::new(1.0, 3.0)).unwrap();
        assert_eq!(i, Interval::new(1.0, 2.0));
    }

    proptest! {
        #[test]
        fn gaps_and_occupied_partition_domain(
            raw in prop::collection::vec((0.0f64..100.0, 0.0f64..20.0), 0..8)
        ) {
            let domain = Interval::new(10.0, 90.0);
            let occupied: Vec<Interval> =
                raw.iter().map(|&(s, l)| Interval::new(s, s + l)).collect();
            let gaps = complement_within(domain, &occupied);

            let covered: f64 = merge_intervals(&occupied)
                .iter()
                .filter_map(|i| i.intersection(&domain))
                .map(|i| i.length())
                .sum();
            let free: f64 = gaps.iter().map(Interval::length).sum();
            prop_assert!((covered + free - domain.length()).abs() < 1e-6);

            for gap in &gaps {
                for occ in &occupied {
                    let overlap = gap.intersection(occ).map_or(0.0, |i| i.length());
                    prop_assert!(overlap < 1e-6);
                }
            }
        }
    }
}

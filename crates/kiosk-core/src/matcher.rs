//! Frame-to-frame correlation of face regions.
//!
//! A detector reports one rectangle per face per frame; this module decides
//! which previously tracked region (if any) the new rectangle continues.
//! The test is a coarse geometric pre-filter, not an identity check.

use crate::geometry::Rectangle;

// --- Heuristic constants ---
/// Overlap must exceed this fraction of the smaller rectangle's area.
pub const MIN_OVERLAP_FRACTION: f64 = 0.1;
/// Fallback when overlap is insufficient: largest top-left Manhattan offset
/// still accepted, as a fraction of the mean side length of both rectangles.
pub const MAX_CORNER_OFFSET_FRACTION: f64 = 0.5;
/// Width and height may each differ by at most this fraction of the larger side.
pub const MAX_SIZE_DIFFERENCE_FRACTION: f64 = 0.5;

/// Strategy for deciding whether two regions plausibly show the same face.
pub trait RegionMatcher {
    fn is_potential_match(&self, a: &Rectangle, b: &Rectangle) -> bool;

    /// Pick the known region closest to `candidate` among potential matches.
    ///
    /// Distance is the Manhattan distance between top-left corners. Ties go to
    /// the earliest entry in `known`. `None` is an ordinary "no match" result.
    fn find_closest_match<I, K>(&self, candidate: &Rectangle, known: K) -> Option<I>
    where
        K: IntoIterator<Item = (I, Rectangle)>,
    {
        known
            .into_iter()
            .filter(|(_, rect)| self.is_potential_match(candidate, rect))
            .min_by_key(|(_, rect)| candidate.corner_distance(rect))
            .map(|(id, _)| id)
    }
}

/// Overlap-plus-size heuristic with the fixed constants above.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapMatcher;

impl RegionMatcher for OverlapMatcher {
    fn is_potential_match(&self, a: &Rectangle, b: &Rectangle) -> bool {
        comparable_size(a, b) && (overlaps_enough(a, b) || corners_close(a, b))
    }
}

fn comparable_size(a: &Rectangle, b: &Rectangle) -> bool {
    let within = |x: u32, y: u32| {
        let diff = (x as f64 - y as f64).abs();
        diff <= x.max(y) as f64 * MAX_SIZE_DIFFERENCE_FRACTION
    };
    within(a.width(), b.width()) && within(a.height(), b.height())
}

fn overlaps_enough(a: &Rectangle, b: &Rectangle) -> bool {
    let smaller = a.area().min(b.area()) as f64;
    let inter = a.intersection_area(b) as f64;
    inter > 0.0 && inter > smaller * MIN_OVERLAP_FRACTION
}

fn corners_close(a: &Rectangle, b: &Rectangle) -> bool {
    let mean_side =
        (a.width() as f64 + a.height() as f64 + b.width() as f64 + b.height() as f64) / 4.0;
    a.corner_distance(b) as f64 <= mean_side * MAX_CORNER_OFFSET_FRACTION
}

/// [`OverlapMatcher`] as a plain predicate.
pub fn is_potential_same_face(a: &Rectangle, b: &Rectangle) -> bool {
    OverlapMatcher.is_potential_match(a, b)
}

/// [`RegionMatcher::find_closest_match`] using [`OverlapMatcher`].
pub fn find_closest_match<I, K>(candidate: &Rectangle, known: K) -> Option<I>
where
    K: IntoIterator<Item = (I, Rectangle)>,
{
    let found = OverlapMatcher.find_closest_match(candidate, known);
    tracing::trace!(%candidate, matched = found.is_some(), "region correlation");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(l: i32, t: i32, w: i32, h: i32) -> Rectangle {
        Rectangle::new(l, t, w, h).unwrap()
    }

    #[test]
    fn test_self_match() {
        let samples = [
            rect(0, 0, 100, 100),
            rect(-20, 35, 7, 300),
            rect(5, 5, 1, 1),
            rect(5, 5, 0, 0),
            rect(5, 5, 0, 40),
        ];
        for r in samples {
            assert!(is_potential_same_face(&r, &r), "{r} should match itself");
        }
    }

    #[test]
    fn test_widely_separated_no_match() {
        let a = rect(0, 0, 100, 100);
        let b = rect(500, 500, 100, 100);
        assert!(!is_potential_same_face(&a, &b));
        assert!(!is_potential_same_face(&b, &a));
    }

    #[test]
    fn test_adjacent_no_overlap_no_match() {
        let a = rect(0, 0, 100, 100);
        let b = rect(100, 0, 100, 100);
        assert!(!is_potential_same_face(&a, &b));
    }

    #[test]
    fn test_small_shift_matches() {
        // Face drifted 15px right, 10px down between frames
        let a = rect(100, 100, 80, 80);
        let b = rect(115, 110, 82, 78);
        assert!(is_potential_same_face(&a, &b));
    }

    #[test]
    fn test_sliver_overlap_rejected() {
        // 5x100 overlap = 500, below 10% of 10000
        let a = rect(0, 0, 100, 100);
        let b = rect(95, 0, 100, 100);
        assert!(!is_potential_same_face(&a, &b));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        // Small face nested inside a much larger one
        let a = rect(0, 0, 200, 200);
        let b = rect(10, 10, 40, 40);
        assert!(!is_potential_same_face(&a, &b));
    }

    #[test]
    fn test_degenerate_boxes_use_corner_fallback() {
        let a = rect(10, 10, 0, 0);
        let b = rect(10, 10, 0, 0);
        assert!(is_potential_same_face(&a, &b));
        let c = rect(11, 10, 0, 0);
        assert!(!is_potential_same_face(&a, &c));
    }

    #[test]
    fn test_symmetric() {
        let a = rect(0, 0, 60, 60);
        let b = rect(20, 15, 50, 70);
        assert_eq!(is_potential_same_face(&a, &b), is_potential_same_face(&b, &a));
    }

    #[test]
    fn test_find_closest_picks_smallest_corner_distance() {
        let candidate = rect(100, 100, 80, 80);
        let known = vec![
            ("far", rect(130, 120, 80, 80)),
            ("near", rect(104, 98, 80, 80)),
            ("elsewhere", rect(600, 600, 80, 80)),
        ];
        assert_eq!(find_closest_match(&candidate, known), Some("near"));
    }

    #[test]
    fn test_find_closest_ignores_closer_non_matching() {
        // "tiny" has the nearest corner but fails the size test
        let candidate = rect(100, 100, 80, 80);
        let known = vec![("tiny", rect(100, 100, 10, 10)), ("face", rect(120, 110, 80, 80))];
        assert_eq!(find_closest_match(&candidate, known), Some("face"));
    }

    #[test]
    fn test_find_closest_tie_keeps_first() {
        let candidate = rect(100, 100, 80, 80);
        let known = vec![
            (1, rect(105, 100, 80, 80)),
            (2, rect(100, 105, 80, 80)),
            (3, rect(95, 100, 80, 80)),
        ];
        assert_eq!(find_closest_match(&candidate, known), Some(1));
    }

    #[test]
    fn test_find_closest_none() {
        let candidate = rect(0, 0, 50, 50);
        let known = vec![("a", rect(400, 0, 50, 50)), ("b", rect(0, 400, 50, 50))];
        assert_eq!(find_closest_match(&candidate, known), None);
    }

    #[test]
    fn test_find_closest_empty() {
        let candidate = rect(0, 0, 50, 50);
        let known: Vec<(u32, Rectangle)> = Vec::new();
        assert_eq!(find_closest_match(&candidate, known), None);
    }

    #[test]
    fn test_find_closest_by_reference_ids() {
        let names = [String::from("alice"), String::from("bob")];
        let rects = [rect(0, 0, 50, 50), rect(300, 300, 50, 50)];
        let candidate = rect(305, 298, 50, 50);
        let found = find_closest_match(&candidate, names.iter().zip(rects.iter().copied()));
        assert_eq!(found.map(String::as_str), Some("bob"));
    }
}

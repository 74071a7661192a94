//! Small numeric helpers shared by the hinting passes.

use crate::{
    outline::{ElementId, Outline, PathElement},
    params::HintOptions,
    Axis,
};

/// Real roots of `a*t^2 + b*t + c = 0`.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    const EPSILON: f64 = 1e-12;
    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // numerically stable form
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let mut roots = vec![q / a];
    if q != 0.0 {
        roots.push(c / q);
    }
    roots
}

/// How flat a direction is along an axis.
///
/// Returns 1.0 for an exactly flat direction, 0.0 for one that is not flat
/// at all, and falls off linearly between the two configured slopes.
pub(crate) fn flat_quotient(along: f64, across: f64, options: &HintOptions) -> f64 {
    let (along, across) = (along.abs(), across.abs());
    if along == 0.0 {
        return 0.0;
    }
    let slope = across / along;
    if slope <= options.flat_slope {
        1.0
    } else if slope >= options.max_flat_slope {
        0.0
    } else {
        1.0 - (slope - options.flat_slope) / (options.max_flat_slope - options.flat_slope)
    }
}

/// Walks along a curve from `t0` toward `limit` and returns the parameter
/// at which the location first deviates from its value at `t0` by `depth`,
/// together with the along distance covered.
///
/// The location must be monotonic on the interval, which holds when `limit`
/// is an endpoint or the nearest location extremum.
pub(crate) fn flat_extent(
    element: &PathElement,
    axis: Axis,
    t0: f64,
    limit: f64,
    depth: f64,
) -> (f64, f64) {
    let origin = element.eval(t0);
    let loc0 = axis.location(origin);
    let deviation = |t: f64| (axis.location(element.eval(t)) - loc0).abs();
    let t = if deviation(limit) <= depth {
        limit
    } else {
        let (mut lo, mut hi) = (t0, limit);
        for _ in 0..24 {
            let mid = 0.5 * (lo + hi);
            if deviation(mid) <= depth {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    };
    let extent = (axis.along(element.eval(t)) - axis.along(origin)).abs();
    (t, extent)
}

/// Returns true if the path between two elements is short.
///
/// Two elements are close when they are the same element, or when they are
/// in the same subpath and the elements strictly between them (in either
/// direction) have a total chord length of at most `max_length`.
pub(crate) fn elements_close(
    outline: &Outline,
    a: ElementId,
    b: ElementId,
    max_length: f64,
) -> bool {
    if a == b {
        return true;
    }
    if a.subpath != b.subpath {
        return false;
    }
    let walk = |from: ElementId, to: ElementId, forward: bool| {
        let mut length = 0.0;
        let mut id = from;
        loop {
            id = if forward {
                outline.next(id)
            } else {
                outline.prev(id)
            };
            if id == to {
                return true;
            }
            if id == from {
                return false;
            }
            length += outline.element(id).chord_length();
            if length > max_length {
                return false;
            }
        }
    };
    walk(a, b, true) || walk(a, b, false)
}

/// Returns true if the closed ranges `[a0, a1]` and `[b0, b1]` intersect.
pub(crate) fn ranges_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::tests::rect_ccw;
    use kurbo::Point;

    #[test]
    fn quadratic_roots() {
        let mut roots = solve_quadratic(1.0, -3.0, 2.0);
        roots.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(roots, vec![1.0, 2.0]);
        assert_eq!(solve_quadratic(0.0, 2.0, -1.0), vec![0.5]);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn flatness_falls_off() {
        let options = HintOptions::default();
        assert_eq!(flat_quotient(100.0, 0.0, &options), 1.0);
        assert_eq!(flat_quotient(100.0, 4.0, &options), 1.0);
        assert_eq!(flat_quotient(100.0, 50.0, &options), 0.0);
        let partial = flat_quotient(100.0, 15.0, &options);
        assert!(partial > 0.0 && partial < 1.0);
        assert_eq!(flat_quotient(0.0, 10.0, &options), 0.0);
    }

    #[test]
    fn extent_of_arch_top() {
        let arch = PathElement::curve(
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        );
        let (t, extent) = flat_extent(&arch, Axis::Horizontal, 0.5, 1.0, 3.0);
        assert!(t > 0.5 && t < 1.0);
        assert!(extent > 5.0 && extent < 50.0);
        let (t, _) = flat_extent(&arch, Axis::Horizontal, 0.5, 1.0, 1000.0);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn closeness_walks_the_subpath() {
        let outline = Outline::new(vec![
            rect_ccw(0.0, 0.0, 500.0, 20.0),
            rect_ccw(600.0, 0.0, 700.0, 100.0),
        ])
        .unwrap();
        let bottom = ElementId::new(0, 0);
        let top = ElementId::new(0, 2);
        // only the 20 unit side lies between them going one way
        assert!(elements_close(&outline, bottom, top, 30.0));
        assert!(!elements_close(&outline, bottom, top, 10.0));
        assert!(!elements_close(&outline, bottom, ElementId::new(1, 0), 1000.0));
    }
}

//! Flex detection.
//!
//! A flex is a pair of consecutive, very shallow curves that together form
//! a slight bump or dip on an otherwise flat edge. Renderers may flatten a
//! flex at small sizes, so the pair is marked and its shared node must not
//! produce a span of its own.

use kurbo::Point;

use crate::{
    outline::{ElementId, ElementKind, FlexHalf, FlexMark, Outline},
    params::HintOptions,
    report::{Report, ReportEntry},
    Axis,
};

/// Marks every qualifying curve pair in the outline as a flex on `axis`.
///
/// Returns the number of pairs marked.
pub(crate) fn mark_flex(
    outline: &mut Outline,
    axis: Axis,
    clockwise: bool,
    options: &HintOptions,
    report: &mut Report,
) -> usize {
    let mut count = 0;
    let ids: Vec<ElementId> = outline.ids().collect();
    for first in ids {
        let subpath = &outline.subpaths()[first.subpath];
        if subpath.len() < 2 || subpath.is_degenerate() {
            continue;
        }
        let second = outline.next(first);
        if !is_flex(outline, axis, clockwise, first, second, options) {
            continue;
        }
        outline.element_mut(first).flex = Some(FlexMark {
            axis,
            half: FlexHalf::First,
        });
        outline.element_mut(second).flex = Some(FlexMark {
            axis,
            half: FlexHalf::Second,
        });
        report.push(ReportEntry::FlexAdded {
            axis,
            position: first,
        });
        count += 1;
    }
    count
}

fn is_flex(
    outline: &Outline,
    axis: Axis,
    clockwise: bool,
    first: ElementId,
    second: ElementId,
    options: &HintOptions,
) -> bool {
    let (e1, e2) = (outline.element(first), outline.element(second));
    if e1.flex.is_some() || e2.flex.is_some() {
        return false;
    }
    let (ElementKind::Curve { c0: a1, c1: b1 }, ElementKind::Curve { c0: a2, c1: b2 }) =
        (e1.kind, e2.kind)
    else {
        return false;
    };
    let points = [e1.start, a1, b1, e1.end, a2, b2, e2.end];
    let locs = points.map(|p| axis.location(p));
    let extent = locs.iter().copied().fold(f64::MIN, f64::max)
        - locs.iter().copied().fold(f64::MAX, f64::min);
    if extent > options.max_flex_depth {
        return false;
    }
    let (start, middle, end) = (e1.start, e1.end, e2.end);
    let rise_start = axis.location(middle) - axis.location(start);
    let rise_end = axis.location(middle) - axis.location(end);
    // both ends on the same side of the middle node
    if rise_start * rise_end < 0.0 {
        return false;
    }
    let depth = rise_start.abs().max(rise_end.abs());
    if depth <= 0.0 {
        return false;
    }
    let chord = (axis.along(end) - axis.along(start)).abs();
    if chord < options.flex_ratio * depth {
        return false;
    }
    if !options.strict_flex {
        return true;
    }
    let bulge = if rise_start != 0.0 {
        rise_start.signum()
    } else {
        rise_end.signum()
    };
    // the neighbors must lead away from the bulge, not back into it
    let before = outline.element(outline.prev(first)).start;
    let after = outline.element(outline.next(second)).end;
    if (axis.location(before) - axis.location(start)) * bulge > 0.0
        || (axis.location(after) - axis.location(end)) * bulge > 0.0
    {
        return false;
    }
    is_convex_turn(start, middle, end, clockwise)
}

/// Returns true if the path turns toward the interior at `middle`, i.e. the
/// flex bulges outward.
fn is_convex_turn(start: Point, middle: Point, end: Point, clockwise: bool) -> bool {
    let turn = (middle - start).cross(end - middle);
    if clockwise {
        turn < 0.0
    } else {
        turn > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::PathElement;

    /// A bar whose top edge carries a shallow upward bump made of two
    /// curves.
    fn bumped_bar(bump: f64) -> Outline {
        let p = Point::new;
        Outline::new(vec![vec![
            PathElement::line(p(0.0, 0.0), p(400.0, 0.0)),
            PathElement::line(p(400.0, 0.0), p(400.0, 100.0)),
            PathElement::curve(
                p(400.0, 100.0),
                p(340.0, 100.0),
                p(260.0, 100.0 + bump),
                p(200.0, 100.0 + bump),
            ),
            PathElement::curve(
                p(200.0, 100.0 + bump),
                p(140.0, 100.0 + bump),
                p(60.0, 100.0),
                p(0.0, 100.0),
            ),
            PathElement::line(p(0.0, 100.0), p(0.0, 0.0)),
        ]])
        .unwrap()
    }

    #[test]
    fn shallow_bump_is_flex() {
        let mut outline = bumped_bar(10.0);
        let mut report = Report::default();
        let count = mark_flex(
            &mut outline,
            Axis::Horizontal,
            false,
            &HintOptions::default(),
            &mut report,
        );
        assert_eq!(count, 1);
        let elements = outline.subpaths()[0].elements();
        let half = |ix: usize| elements[ix].flex.map(|mark| (mark.axis, mark.half));
        assert_eq!(half(2), Some((Axis::Horizontal, FlexHalf::First)));
        assert_eq!(half(3), Some((Axis::Horizontal, FlexHalf::Second)));
        assert_eq!(report.entries().len(), 1);
    }

    #[test]
    fn deep_bump_is_not_flex() {
        let mut outline = bumped_bar(40.0);
        let mut report = Report::default();
        let count = mark_flex(
            &mut outline,
            Axis::Horizontal,
            false,
            &HintOptions::default(),
            &mut report,
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn inward_dent_is_not_flex() {
        let mut outline = bumped_bar(-10.0);
        let mut report = Report::default();
        let count = mark_flex(
            &mut outline,
            Axis::Horizontal,
            false,
            &HintOptions::default(),
            &mut report,
        );
        assert_eq!(count, 0);
        let relaxed = HintOptions {
            strict_flex: false,
            ..Default::default()
        };
        let count = mark_flex(&mut outline, Axis::Horizontal, false, &relaxed, &mut report);
        assert_eq!(count, 1);
    }
}

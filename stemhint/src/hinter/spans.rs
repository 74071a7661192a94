//! Flat span extraction.
//!
//! A flat span is a piece of the outline that runs (nearly) parallel to the
//! current axis: a straight edge, the flat start or end of a curve, or the
//! neighborhood of a curve extremum. Spans are the raw material for stems.
//!
//! Spans live in an arena and are never removed. Merging marks the absorbed
//! span with a forward pointer to its replacement, so every id recorded
//! against an outline position still resolves to a canonical span.

use crate::{
    geom,
    outline::{ElementId, ElementKind, FlexHalf, FlexMark, Outline, PathElement},
    params::HintOptions,
    Axis,
};
use kurbo::Vec2;

pub(crate) type SpanId = usize;

/// How a span was produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SpanKind {
    Line,
    Bend,
    Curve,
    Ghost,
}

/// Which edge of a stem a span can be.
///
/// A lower edge has the filled interior at greater locations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EdgeSide {
    Lower,
    Upper,
}

#[derive(Clone, Debug)]
pub(crate) struct FlatSpan {
    /// Location on the hinted axis.
    pub loc: f64,
    /// Extent along the edge.
    pub min: f64,
    pub max: f64,
    pub kind: SpanKind,
    pub side: EdgeSide,
    /// Flatness weight in `0..=1`.
    pub bonus: f64,
    /// The element that produced the span and, for spans at a junction,
    /// the element on the other side.
    pub elements: [Option<ElementId>; 2],
    pub replaced_by: Option<SpanId>,
    pub deleted: bool,
    /// Best candidate using this span, assigned during association.
    pub winner: Option<usize>,
}

impl FlatSpan {
    pub fn len(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_live(&self) -> bool {
        self.replaced_by.is_none() && !self.deleted
    }

    pub fn is_real(&self) -> bool {
        self.kind != SpanKind::Ghost && self.elements[0].is_some()
    }

    pub fn primary(&self) -> Option<ElementId> {
        self.elements[0]
    }
}

/// Arena of spans for one axis.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpanArena {
    spans: Vec<FlatSpan>,
    /// Every (position, span) pair recorded at creation time.
    positions: Vec<(ElementId, SpanId)>,
}

impl SpanArena {
    pub fn push(&mut self, span: FlatSpan) -> SpanId {
        let id = self.spans.len();
        for element in span.elements.iter().flatten() {
            self.positions.push((*element, id));
        }
        self.spans.push(span);
        id
    }

    pub fn get(&self, id: SpanId) -> &FlatSpan {
        &self.spans[id]
    }

    pub fn get_mut(&mut self, id: SpanId) -> &mut FlatSpan {
        &mut self.spans[id]
    }

    /// Follows replacement pointers to the canonical span.
    pub fn resolve(&self, mut id: SpanId) -> SpanId {
        while let Some(next) = self.spans[id].replaced_by {
            id = next;
        }
        id
    }

    pub fn live_ids(&self) -> impl Iterator<Item = SpanId> + '_ {
        self.spans
            .iter()
            .enumerate()
            .filter(|(_, span)| span.is_live())
            .map(|(id, _)| id)
    }

    pub fn live_count(&self) -> usize {
        self.spans.iter().filter(|span| span.is_live()).count()
    }

    /// Position records, as `(element, span)` pairs.
    pub fn positions(&self) -> &[(ElementId, SpanId)] {
        &self.positions
    }

    /// Rewrites element references after subpaths were reordered.
    pub fn remap_subpaths(&mut self, new_index_of: &[usize]) {
        let remap = |id: &mut ElementId| id.subpath = new_index_of[id.subpath];
        for span in &mut self.spans {
            span.elements.iter_mut().flatten().for_each(remap);
        }
        for (id, _) in &mut self.positions {
            remap(id);
        }
    }
}

/// Context for extracting the spans of one axis.
pub(crate) struct SpanExtractor<'a> {
    pub outline: &'a Outline,
    pub axis: Axis,
    pub clockwise: bool,
    pub options: &'a HintOptions,
    /// Curves with an unsplit inflection produce no extremum spans.
    pub inflections_split: bool,
}

impl SpanExtractor<'_> {
    /// Extracts and cleans up the spans for every non-degenerate subpath.
    pub fn extract(&self) -> SpanArena {
        let mut arena = SpanArena::default();
        for (subpath_ix, subpath) in self.outline.subpaths().iter().enumerate() {
            if subpath.is_degenerate() {
                continue;
            }
            for index in 0..subpath.len() {
                let id = ElementId::new(subpath_ix, index);
                let element = self.outline.element(id);
                match element.kind {
                    ElementKind::Line => self.line_span(&mut arena, id, element),
                    ElementKind::Curve { .. } => {
                        self.extremum_spans(&mut arena, id, element)
                    }
                }
                self.junction_span(&mut arena, id);
            }
        }
        log::trace!(
            "{} axis: extracted {} spans",
            self.axis,
            arena.live_count()
        );
        merge_colocated(&mut arena, self.options);
        remove_slivers(&mut arena, self.options);
        remove_dominated_bends(&mut arena, self.options);
        arena
    }

    fn side(&self, direction: Vec2) -> EdgeSide {
        if self.axis.interior_above(direction) != self.clockwise {
            EdgeSide::Lower
        } else {
            EdgeSide::Upper
        }
    }

    fn line_span(&self, arena: &mut SpanArena, id: ElementId, element: &PathElement) {
        let delta = element.end - element.start;
        let (along, across) = (self.axis.along_delta(delta), self.axis.location_delta(delta));
        let flatness = geom::flat_quotient(along, across, self.options);
        if flatness <= 0.0 {
            return;
        }
        let mid = element.start.midpoint(element.end);
        let half = 0.5 * along.abs() * flatness;
        let center = self.axis.along(mid);
        arena.push(FlatSpan {
            loc: self.axis.location(mid),
            min: center - half,
            max: center + half,
            kind: SpanKind::Line,
            side: self.side(delta),
            bonus: flatness,
            elements: [Some(id), None],
            replaced_by: None,
            deleted: false,
            winner: None,
        });
    }

    fn extremum_spans(&self, arena: &mut SpanArena, id: ElementId, element: &PathElement) {
        if !self.inflections_split && element.has_opposing_arms() {
            return;
        }
        let roots = element.location_extrema(self.axis);
        for (ix, &t) in roots.iter().enumerate() {
            let point = element.eval(t);
            let min_dist = self.options.extremum_distance;
            if (point - element.start).hypot() <= min_dist || (point - element.end).hypot() <= min_dist
            {
                continue;
            }
            let direction = element.eval((t + 1e-3).min(1.0)) - element.eval((t - 1e-3).max(0.0));
            if self.axis.along_delta(direction).abs() < 1e-9 {
                continue;
            }
            let before = if ix > 0 { roots[ix - 1] } else { 0.0 };
            let after = roots.get(ix + 1).copied().unwrap_or(1.0);
            let depth = self.options.curve_flat_depth;
            let (t0, _) = geom::flat_extent(element, self.axis, t, before, depth);
            let (t1, _) = geom::flat_extent(element, self.axis, t, after, depth);
            let (a0, a1) = (
                self.axis.along(element.eval(t0)),
                self.axis.along(element.eval(t1)),
            );
            arena.push(FlatSpan {
                loc: self.axis.location(point),
                min: a0.min(a1),
                max: a0.max(a1),
                kind: SpanKind::Curve,
                side: self.side(direction),
                bonus: 1.0,
                elements: [Some(id), None],
                replaced_by: None,
                deleted: false,
                winner: None,
            });
        }
    }

    /// Emits a span for the node at the end of `id`, shared with the next
    /// element, if either curve is flat there; otherwise emits a bend span
    /// if the node is a sharp location extremum.
    fn junction_span(&self, arena: &mut SpanArena, id: ElementId) {
        let element = self.outline.element(id);
        let flex_start = FlexMark {
            axis: self.axis,
            half: FlexHalf::First,
        };
        if element.flex == Some(flex_start) {
            return;
        }
        let next_id = self.outline.next(id);
        let next = self.outline.element(next_id);
        let incoming = element.end_tangent();
        let outgoing = next.start_tangent();
        let axis = self.axis;
        let flatness = |tangent: Vec2| {
            geom::flat_quotient(axis.along_delta(tangent), axis.location_delta(tangent), self.options)
        };
        let (f_in, f_out) = (flatness(incoming), flatness(outgoing));
        // straight elements produce their own spans
        let q_in = if element.is_curve() { f_in } else { 0.0 };
        let q_out = if next.is_curve() { f_out } else { 0.0 };
        let node = element.end;
        let center = axis.along(node);
        let depth = self.options.curve_flat_depth;
        if q_in > 0.0 || q_out > 0.0 {
            let back = if q_in > 0.0 {
                let limit = element
                    .location_extrema(axis)
                    .last()
                    .copied()
                    .unwrap_or(0.0);
                geom::flat_extent(element, axis, 1.0, limit, depth).1 * q_in
            } else {
                0.0
            };
            let forward = if q_out > 0.0 {
                let limit = next
                    .location_extrema(axis)
                    .first()
                    .copied()
                    .unwrap_or(1.0);
                geom::flat_extent(next, axis, 0.0, limit, depth).1 * q_out
            } else {
                0.0
            };
            if back + forward <= 0.0 {
                return;
            }
            let direction = if q_in >= q_out { incoming } else { outgoing };
            let (min, max) = if axis.along_delta(direction) >= 0.0 {
                (center - back, center + forward)
            } else {
                (center - forward, center + back)
            };
            arena.push(FlatSpan {
                loc: axis.location(node),
                min,
                max,
                kind: SpanKind::Curve,
                side: self.side(direction),
                bonus: q_in.max(q_out),
                elements: [Some(id), Some(next_id)],
                replaced_by: None,
                deleted: false,
                winner: None,
            });
            return;
        }
        if f_in > 0.0 || f_out > 0.0 {
            return;
        }
        // a sharp peak or valley in location
        let (d_in, d_out) = (axis.location_delta(incoming), axis.location_delta(outgoing));
        if d_in * d_out >= 0.0 {
            return;
        }
        let unit = |v: Vec2| {
            let len = v.hypot();
            if len > 0.0 {
                v / len
            } else {
                v
            }
        };
        let direction = unit(incoming) + unit(outgoing);
        if axis.along_delta(direction).abs() < 1e-6 {
            return;
        }
        let half = self.options.bend_length;
        arena.push(FlatSpan {
            loc: axis.location(node),
            min: center - half,
            max: center + half,
            kind: SpanKind::Bend,
            side: self.side(direction),
            bonus: 0.0,
            elements: [Some(id), Some(next_id)],
            replaced_by: None,
            deleted: false,
            winner: None,
        });
    }
}

/// Merges co-located, overlapping spans of the same side.
///
/// The wider span survives and absorbs the range of the other; the
/// narrower one is left pointing at it.
fn merge_colocated(arena: &mut SpanArena, options: &HintOptions) {
    let mut ids: Vec<SpanId> = arena
        .live_ids()
        .filter(|id| arena.get(*id).kind != SpanKind::Bend)
        .collect();
    ids.sort_by(|a, b| arena.get(*a).loc.total_cmp(&arena.get(*b).loc));
    for i in 0..ids.len() {
        for j in i + 1..ids.len() {
            let (a, b) = (arena.resolve(ids[i]), arena.resolve(ids[j]));
            if a == b {
                continue;
            }
            let (sa, sb) = (arena.get(a), arena.get(b));
            if (arena.get(ids[j]).loc - arena.get(ids[i]).loc) > options.span_merge_distance {
                break;
            }
            if sa.side != sb.side
                || (sa.loc - sb.loc).abs() > options.span_merge_distance
                || !geom::ranges_overlap((sa.min, sa.max), (sb.min, sb.max))
            {
                continue;
            }
            let (keep, drop) = if sb.len() > sa.len() { (b, a) } else { (a, b) };
            let dropped = arena.get(drop).clone();
            log::trace!(
                "merging span at {} ({}..{}) into {keep}",
                dropped.loc,
                dropped.min,
                dropped.max
            );
            let kept = arena.get_mut(keep);
            kept.min = kept.min.min(dropped.min);
            kept.max = kept.max.max(dropped.max);
            kept.bonus = kept.bonus.max(dropped.bonus);
            arena.get_mut(drop).replaced_by = Some(keep);
        }
    }
}

/// Deletes spans too short to anchor a stem, such as the junction span of a
/// curve leaving a node at almost the maximum flat slope.
fn remove_slivers(arena: &mut SpanArena, options: &HintOptions) {
    let slivers: Vec<SpanId> = arena
        .live_ids()
        .filter(|id| {
            let span = arena.get(*id);
            span.kind != SpanKind::Bend && span.len() < options.min_span_length
        })
        .collect();
    for id in slivers {
        log::trace!("dropping sliver span at {}", arena.get(id).loc);
        arena.get_mut(id).deleted = true;
    }
}

/// Deletes bend spans next to a much wider span at the same location.
fn remove_dominated_bends(arena: &mut SpanArena, options: &HintOptions) {
    let bends: Vec<SpanId> = arena
        .live_ids()
        .filter(|id| arena.get(*id).kind == SpanKind::Bend)
        .collect();
    for bend_id in bends {
        let bend = arena.get(bend_id);
        let dominated = arena.live_ids().any(|id| {
            let other = arena.get(id);
            other.kind != SpanKind::Bend
                && (other.loc - bend.loc).abs() <= options.span_merge_distance
                && other.len() >= options.bend_dominance * bend.len()
                && geom::ranges_overlap((other.min, other.max), (bend.min, bend.max))
        });
        if dominated {
            arena.get_mut(bend_id).deleted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::tests::{rect_ccw, rect_cw};
    use kurbo::Point;

    fn extract(outline: &Outline, axis: Axis) -> SpanArena {
        let options = HintOptions::default();
        SpanExtractor {
            outline,
            axis,
            clockwise: outline.is_clockwise(),
            options: &options,
            inflections_split: false,
        }
        .extract()
    }

    fn live(arena: &SpanArena) -> Vec<(f64, f64, f64, EdgeSide)> {
        let mut spans: Vec<_> = arena
            .live_ids()
            .map(|id| {
                let s = arena.get(id);
                (s.loc, s.min, s.max, s.side)
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        spans
    }

    #[test]
    fn rectangle_edges() {
        let outline = Outline::new(vec![rect_ccw(0.0, 0.0, 500.0, 300.0)]).unwrap();
        let arena = extract(&outline, Axis::Horizontal);
        assert_eq!(
            live(&arena),
            vec![
                (0.0, 0.0, 500.0, EdgeSide::Lower),
                (300.0, 0.0, 500.0, EdgeSide::Upper)
            ]
        );
        let arena = extract(&outline, Axis::Vertical);
        assert_eq!(
            live(&arena),
            vec![
                (0.0, 0.0, 300.0, EdgeSide::Lower),
                (500.0, 0.0, 300.0, EdgeSide::Upper)
            ]
        );
    }

    #[test]
    fn clockwise_outline_has_same_sides() {
        let outline = Outline::new(vec![rect_cw(0.0, 0.0, 500.0, 300.0)]).unwrap();
        let arena = extract(&outline, Axis::Horizontal);
        let sides: Vec<_> = live(&arena).into_iter().map(|s| s.3).collect();
        assert_eq!(sides, vec![EdgeSide::Lower, EdgeSide::Upper]);
    }

    #[test]
    fn slanted_line_is_shortened() {
        let outline = Outline::new(vec![crate::outline::tests::polygon(&[
            (0.0, 0.0),
            (100.0, 15.0),
            (100.0, 200.0),
            (0.0, 200.0),
        ])])
        .unwrap();
        let arena = extract(&outline, Axis::Horizontal);
        let bottom = live(&arena)[0];
        assert_eq!(bottom.0, 7.5);
        assert!(bottom.2 - bottom.1 < 100.0 && bottom.2 - bottom.1 > 0.0);
    }

    #[test]
    fn curve_extremum_and_junctions() {
        // a dome: flat bottom line and an arch over it
        let outline = Outline::new(vec![vec![
            PathElement::line(Point::new(0.0, 0.0), Point::new(400.0, 0.0)),
            PathElement::curve(
                Point::new(400.0, 0.0),
                Point::new(400.0, 300.0),
                Point::new(0.0, 300.0),
                Point::new(0.0, 0.0),
            ),
        ]])
        .unwrap();
        let arena = extract(&outline, Axis::Horizontal);
        let spans = live(&arena);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].3, EdgeSide::Lower);
        assert_eq!(spans[1].3, EdgeSide::Upper);
        assert!((spans[1].0 - 225.0).abs() < 1e-6);
        // vertical extremes are at the corners, where the curve is flat in y
        let arena = extract(&outline, Axis::Vertical);
        let spans = live(&arena);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].0, spans[1].0), (0.0, 400.0));
    }

    #[test]
    fn flex_only_suppresses_junctions_on_its_axis() {
        let dome = || {
            Outline::new(vec![vec![
                PathElement::line(Point::new(0.0, 0.0), Point::new(400.0, 0.0)),
                PathElement::curve(
                    Point::new(400.0, 0.0),
                    Point::new(400.0, 300.0),
                    Point::new(0.0, 300.0),
                    Point::new(0.0, 0.0),
                ),
            ]])
            .unwrap()
        };
        let mark = |axis: Axis| {
            let mut outline = dome();
            outline.element_mut(ElementId::new(0, 1)).flex = Some(FlexMark {
                axis,
                half: FlexHalf::First,
            });
            outline
        };
        // the node closing the arch at x = 0 is a vertical junction span
        let locs = |outline: &Outline| -> Vec<f64> {
            live(&extract(outline, Axis::Vertical))
                .into_iter()
                .map(|s| s.0)
                .collect()
        };
        assert_eq!(locs(&dome()), vec![0.0, 400.0]);
        assert_eq!(locs(&mark(Axis::Horizontal)), vec![0.0, 400.0]);
        assert_eq!(locs(&mark(Axis::Vertical)), vec![400.0]);
    }

    #[test]
    fn overlapping_spans_merge_with_forward_pointer() {
        // two collinear bottom edges joined by a zero height notch
        let outline = Outline::new(vec![crate::outline::tests::polygon(&[
            (0.0, 0.0),
            (200.0, 0.0),
            (200.5, 0.0),
            (400.0, 0.0),
            (400.0, 100.0),
            (0.0, 100.0),
        ])])
        .unwrap();
        let arena = extract(&outline, Axis::Horizontal);
        let spans = live(&arena);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].1, spans[0].2), (0.0, 400.0));
        // every position still resolves to a live span
        for (_, id) in arena.positions() {
            assert!(arena.get(arena.resolve(*id)).is_live());
        }
    }

    #[test]
    fn bend_beside_wide_edge_is_removed() {
        let tip = || crate::outline::tests::polygon(&[(100.0, 0.0), (150.0, 100.0), (50.0, 100.0)]);
        let bends = |arena: &SpanArena| -> Vec<(f64, bool)> {
            let mut ids: Vec<SpanId> = arena.positions().iter().map(|(_, id)| *id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids.into_iter()
                .map(|id| arena.get(id))
                .filter(|span| span.kind == SpanKind::Bend)
                .map(|span| (span.loc, span.deleted))
                .collect()
        };
        let lone = Outline::new(vec![tip()]).unwrap();
        assert_eq!(bends(&extract(&lone, Axis::Horizontal)), vec![(0.0, false)]);
        // the same tip resting on the top edge of a wide slab
        let resting = Outline::new(vec![tip(), rect_ccw(0.0, -50.0, 200.0, 0.0)]).unwrap();
        assert_eq!(bends(&extract(&resting, Axis::Horizontal)), vec![(0.0, true)]);
    }

    #[test]
    fn split_inflection_yields_extremum_spans() {
        let p = Point::new;
        // the bottom edge is a wave that rises and then dips below the baseline
        let mut outline = Outline::new(vec![vec![
            PathElement::curve(p(0.0, 0.0), p(100.0, 100.0), p(200.0, -100.0), p(300.0, 0.0)),
            PathElement::line(p(300.0, 0.0), p(300.0, 200.0)),
            PathElement::line(p(300.0, 200.0), p(0.0, 200.0)),
            PathElement::line(p(0.0, 200.0), p(0.0, 0.0)),
        ]])
        .unwrap();
        let curve_spans = |outline: &Outline, inflections_split: bool| -> Vec<(f64, EdgeSide)> {
            let options = HintOptions::default();
            let arena = SpanExtractor {
                outline,
                axis: Axis::Horizontal,
                clockwise: false,
                options: &options,
                inflections_split,
            }
            .extract();
            let mut spans: Vec<_> = arena
                .live_ids()
                .map(|id| arena.get(id))
                .filter(|span| span.kind == SpanKind::Curve)
                .map(|span| (span.loc, span.side))
                .collect();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            spans
        };
        assert!(curve_spans(&outline, false).is_empty());
        assert_eq!(outline.split_inflections(), 1);
        let spans = curve_spans(&outline, true);
        // extrema of 300 t (1 - t) (1 - 2t)
        let peak = 50.0 / 3.0f64.sqrt();
        assert_eq!(spans.len(), 2, "{spans:?}");
        assert!((spans[0].0 + peak).abs() < 1e-6);
        assert!((spans[1].0 - peak).abs() < 1e-6);
        assert!(spans.iter().all(|span| span.1 == EdgeSide::Lower));
    }

    /// A box whose top is a curve leaving the right edge at a slope just
    /// under the flat limit.
    fn steep_lid() -> Outline {
        let p = Point::new;
        Outline::new(vec![vec![
            PathElement::line(p(0.0, 0.0), p(400.0, 0.0)),
            PathElement::line(p(400.0, 0.0), p(400.0, 100.0)),
            PathElement::curve(p(400.0, 100.0), p(300.0, 126.7), p(100.0, 200.0), p(0.0, 200.0)),
            PathElement::line(p(0.0, 200.0), p(0.0, 0.0)),
        ]])
        .unwrap()
    }

    #[test]
    fn sliver_junction_span_is_dropped() {
        let outline = steep_lid();
        let arena = extract(&outline, Axis::Horizontal);
        let locs: Vec<f64> = live(&arena).into_iter().map(|s| s.0).collect();
        assert_eq!(locs, vec![0.0, 200.0]);
        // the node at the top of the right edge produced a span, now deleted
        let sliver = arena
            .positions()
            .iter()
            .map(|(_, id)| arena.get(arena.resolve(*id)))
            .find(|span| span.loc == 100.0)
            .unwrap();
        assert!(sliver.deleted);
        assert!(sliver.len() < HintOptions::default().min_span_length);
    }

    #[test]
    fn peak_produces_bend() {
        let outline = Outline::new(vec![crate::outline::tests::polygon(&[
            (0.0, 0.0),
            (200.0, 0.0),
            (100.0, 300.0),
        ])])
        .unwrap();
        let arena = extract(&outline, Axis::Horizontal);
        let bend = arena
            .live_ids()
            .map(|id| arena.get(id))
            .find(|s| s.kind == SpanKind::Bend)
            .unwrap();
        assert_eq!(bend.loc, 300.0);
        assert_eq!(bend.side, EdgeSide::Upper);
    }
}

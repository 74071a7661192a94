//! Outline representation for hinting.
//!
//! A glyph is an ordered list of closed subpaths, each a cyclic sequence of
//! line and cubic curve elements. Elements are addressed by [`ElementId`],
//! a `(subpath, index)` pair resolved against the outline when needed; the
//! hinter never holds references into the outline across an edit.
//!
//! Bounding boxes and global element positions are computed lazily and
//! discarded whenever the structure of the outline changes.

use std::sync::OnceLock;

use font_types::Pen;
use kurbo::{BezPath, CubicBez, ParamCurve, ParamCurveExtrema, PathEl, Point, Rect, Vec2};

use crate::{
    error::MalformedPath,
    mask::MaskPair,
    stems::AxisHints,
    Axis,
};

/// Squared length below which a vector is treated as zero.
const ZERO_LENGTH_SQUARED: f64 = 1e-12;

/// Address of an element inside an [`Outline`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId {
    pub subpath: usize,
    pub index: usize,
}

impl ElementId {
    pub fn new(subpath: usize, index: usize) -> Self {
        Self { subpath, index }
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.subpath, self.index)
    }
}

/// The shape of an element.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Line,
    Curve { c0: Point, c1: Point },
}

/// Which half of a flex feature an element is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlexHalf {
    First,
    Second,
}

/// Marks an element as half of a flex feature found on one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlexMark {
    pub axis: Axis,
    pub half: FlexHalf,
}

/// A line or cubic curve edge of a subpath.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathElement {
    pub start: Point,
    pub end: Point,
    pub kind: ElementKind,
    /// Set when this element is part of a flex feature.
    pub flex: Option<FlexMark>,
    /// Present when a new hint mask takes effect at this element.
    pub hint_mask: Option<MaskPair>,
}

impl PathElement {
    pub fn line(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            kind: ElementKind::Line,
            flex: None,
            hint_mask: None,
        }
    }

    pub fn curve(start: Point, c0: Point, c1: Point, end: Point) -> Self {
        Self {
            start,
            end,
            kind: ElementKind::Curve { c0, c1 },
            flex: None,
            hint_mask: None,
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self.kind, ElementKind::Curve { .. })
    }

    /// The element as a cubic; lines are degree raised.
    pub fn cubic(&self) -> CubicBez {
        match self.kind {
            ElementKind::Line => CubicBez::new(
                self.start,
                self.start.lerp(self.end, 1.0 / 3.0),
                self.start.lerp(self.end, 2.0 / 3.0),
                self.end,
            ),
            ElementKind::Curve { c0, c1 } => CubicBez::new(self.start, c0, c1, self.end),
        }
    }

    pub fn eval(&self, t: f64) -> Point {
        match self.kind {
            ElementKind::Line => self.start.lerp(self.end, t),
            ElementKind::Curve { .. } => self.cubic().eval(t),
        }
    }

    /// Distance between the endpoints.
    pub fn chord_length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Direction of travel leaving the start point.
    ///
    /// Zero length control handles are skipped so that the nearest point
    /// that actually defines the slope is used.
    pub fn start_tangent(&self) -> Vec2 {
        let candidates = match self.kind {
            ElementKind::Line => [self.end, self.end, self.end],
            ElementKind::Curve { c0, c1 } => [c0, c1, self.end],
        };
        candidates
            .iter()
            .map(|p| *p - self.start)
            .find(|v| v.hypot2() > ZERO_LENGTH_SQUARED)
            .unwrap_or_default()
    }

    /// Direction of travel arriving at the end point.
    pub fn end_tangent(&self) -> Vec2 {
        let candidates = match self.kind {
            ElementKind::Line => [self.start, self.start, self.start],
            ElementKind::Curve { c0, c1 } => [c1, c0, self.start],
        };
        candidates
            .iter()
            .map(|p| self.end - *p)
            .find(|v| v.hypot2() > ZERO_LENGTH_SQUARED)
            .unwrap_or_default()
    }

    pub fn bounds(&self) -> Rect {
        match self.kind {
            ElementKind::Line => Rect::from_points(self.start, self.end),
            ElementKind::Curve { .. } => self.cubic().bounding_box(),
        }
    }

    /// Returns true if the two control arms point to opposite sides of the
    /// chord, meaning the curve has an inflection.
    pub fn has_opposing_arms(&self) -> bool {
        let ElementKind::Curve { c0, c1 } = self.kind else {
            return false;
        };
        let chord = self.end - self.start;
        let scale = chord.hypot2().max(ZERO_LENGTH_SQUARED);
        let side0 = chord.cross(c0 - self.start) / scale;
        let side1 = chord.cross(c1 - self.start) / scale;
        // small tolerance so nearly straight curves are left alone
        (side0 > 1e-3 && side1 < -1e-3) || (side0 < -1e-3 && side1 > 1e-3)
    }

    /// Parameter values in `(0, 1)` where the location coordinate of the
    /// element reaches a local extremum.
    pub fn location_extrema(&self, axis: Axis) -> Vec<f64> {
        let ElementKind::Curve { c0, c1 } = self.kind else {
            return Vec::new();
        };
        let [p0, p1, p2, p3] = [self.start, c0, c1, self.end].map(|p| axis.location(p));
        let (a, b, c) = (p1 - p0, p2 - p1, p3 - p2);
        let mut roots = crate::geom::solve_quadratic(a - 2.0 * b + c, 2.0 * (b - a), a);
        roots.retain(|t| *t > 1e-6 && *t < 1.0 - 1e-6);
        roots.sort_by(|a, b| a.total_cmp(b));
        roots
    }

    fn points(&self) -> impl Iterator<Item = Point> {
        let controls = match self.kind {
            ElementKind::Line => [None, None],
            ElementKind::Curve { c0, c1 } => [Some(c0), Some(c1)],
        };
        std::iter::once(self.start)
            .chain(controls.into_iter().flatten())
            .chain(std::iter::once(self.end))
    }

    fn is_finite(&self) -> bool {
        self.points().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Splits a curve at `t`, returning the two halves.
    fn split(&self, t: f64) -> (PathElement, PathElement) {
        let cubic = self.cubic();
        let first = cubic.subsegment(0.0..t);
        let second = cubic.subsegment(t..1.0);
        let mut head = PathElement::curve(first.p0, first.p1, first.p2, first.p3);
        head.hint_mask = self.hint_mask.clone();
        let tail = PathElement::curve(second.p0, second.p1, second.p2, second.p3);
        (head, tail)
    }
}

/// A closed, cyclically ordered sequence of elements.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subpath {
    elements: Vec<PathElement>,
    #[cfg_attr(feature = "serde", serde(skip))]
    bounds: OnceLock<Rect>,
}

impl PartialEq for Subpath {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Subpath {
    fn new(elements: Vec<PathElement>) -> Self {
        Self {
            elements,
            bounds: OnceLock::new(),
        }
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        *self.bounds.get_or_init(|| {
            self.elements
                .iter()
                .map(PathElement::bounds)
                .reduce(|a, b| a.union(b))
                .unwrap_or_default()
        })
    }

    /// Returns true if the subpath encloses no area in either direction.
    pub fn is_degenerate(&self) -> bool {
        let bounds = self.bounds();
        bounds.width() <= 0.0 || bounds.height() <= 0.0
    }

    /// Signed area; positive for counter-clockwise subpaths with y up.
    pub fn signed_area(&self) -> f64 {
        // shoelace over a fixed sampling of each element
        let mut area = 0.0;
        for element in &self.elements {
            let mut prev = element.start;
            let steps = if element.is_curve() { 8 } else { 1 };
            for step in 1..=steps {
                let p = element.eval(step as f64 / steps as f64);
                area += prev.x * p.y - p.x * prev.y;
                prev = p;
            }
        }
        area * 0.5
    }
}

/// A glyph outline together with its hint annotations.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outline {
    subpaths: Vec<Subpath>,
    hints: [AxisHints; 2],
    #[cfg_attr(feature = "serde", serde(skip))]
    bounds: OnceLock<Option<Rect>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    offsets: OnceLock<Vec<usize>>,
}

impl PartialEq for Outline {
    fn eq(&self, other: &Self) -> bool {
        self.subpaths == other.subpaths && self.hints == other.hints
    }
}

impl Outline {
    /// Creates an outline from a list of subpaths.
    ///
    /// Subpaths that do not end where they began are closed with a line.
    pub fn new(subpaths: Vec<Vec<PathElement>>) -> Result<Self, MalformedPath> {
        let mut result = Vec::with_capacity(subpaths.len());
        for (subpath_ix, mut elements) in subpaths.into_iter().enumerate() {
            if let Some(element) = elements.iter().position(|el| !el.is_finite()) {
                return Err(MalformedPath::NonFiniteCoordinate {
                    subpath: subpath_ix,
                    element,
                });
            }
            let (Some(first), Some(last)) = (elements.first(), elements.last()) else {
                return Err(MalformedPath::EmptySubpath(subpath_ix));
            };
            if last.end != first.start {
                let closing = PathElement::line(last.end, first.start);
                elements.push(closing);
            }
            result.push(Subpath::new(elements));
        }
        Ok(Self {
            subpaths: result,
            ..Default::default()
        })
    }

    /// Creates an outline from a kurbo path.
    ///
    /// Quadratic segments are raised to cubics.
    pub fn from_bezpath(path: &BezPath) -> Result<Self, MalformedPath> {
        let mut builder = OutlineBuilder::new();
        for el in path.elements() {
            builder.push(*el);
        }
        builder.build()
    }

    /// Converts the outline back into a kurbo path.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for subpath in &self.subpaths {
            let Some(first) = subpath.elements.first() else {
                continue;
            };
            path.move_to(first.start);
            for element in &subpath.elements {
                match element.kind {
                    ElementKind::Line => path.line_to(element.end),
                    ElementKind::Curve { c0, c1 } => path.curve_to(c0, c1, element.end),
                }
            }
            path.close_path();
        }
        path
    }

    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.subpaths.iter().map(Subpath::len).sum()
    }

    pub fn element(&self, id: ElementId) -> &PathElement {
        &self.subpaths[id.subpath].elements[id.index]
    }

    pub fn get(&self, id: ElementId) -> Option<&PathElement> {
        self.subpaths.get(id.subpath)?.elements.get(id.index)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut PathElement {
        &mut self.subpaths[id.subpath].elements[id.index]
    }

    /// Iterates over all element ids in path order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.subpaths
            .iter()
            .enumerate()
            .flat_map(|(subpath, sp)| (0..sp.len()).map(move |index| ElementId { subpath, index }))
    }

    /// The element following `id` in its subpath, wrapping around.
    pub fn next(&self, id: ElementId) -> ElementId {
        let len = self.subpaths[id.subpath].len();
        ElementId::new(id.subpath, (id.index + 1) % len)
    }

    /// The element preceding `id` in its subpath, wrapping around.
    pub fn prev(&self, id: ElementId) -> ElementId {
        let len = self.subpaths[id.subpath].len();
        ElementId::new(id.subpath, (id.index + len - 1) % len)
    }

    /// Global index of an element in path order.
    pub fn position(&self, id: ElementId) -> usize {
        self.offsets()[id.subpath] + id.index
    }

    /// Inverse of [`position`](Self::position).
    pub fn id_at(&self, position: usize) -> Option<ElementId> {
        let offsets = self.offsets();
        let subpath = offsets.partition_point(|offset| *offset <= position).checked_sub(1)?;
        let index = position - offsets[subpath];
        (index < self.subpaths.get(subpath)?.len()).then_some(ElementId { subpath, index })
    }

    fn offsets(&self) -> &[usize] {
        self.offsets.get_or_init(|| {
            let mut offset = 0;
            self.subpaths
                .iter()
                .map(|sp| {
                    let start = offset;
                    offset += sp.len();
                    start
                })
                .collect()
        })
    }

    /// Bounding box of the whole glyph, or `None` if it is empty.
    pub fn bounds(&self) -> Option<Rect> {
        *self.bounds.get_or_init(|| {
            self.subpaths
                .iter()
                .map(Subpath::bounds)
                .reduce(|a, b| a.union(b))
        })
    }

    /// Returns true if the outer contours wind clockwise (TrueType order).
    pub fn is_clockwise(&self) -> bool {
        self.subpaths.iter().map(Subpath::signed_area).sum::<f64>() < 0.0
    }

    pub fn hints(&self, axis: Axis) -> &AxisHints {
        &self.hints[axis.index()]
    }

    /// Returns true if any stems are attached to the outline.
    pub fn has_hints(&self) -> bool {
        self.hints.iter().any(|hints| !hints.stems.is_empty())
    }

    /// Replaces the hints for an axis.
    pub fn set_hints(&mut self, axis: Axis, hints: AxisHints) {
        self.hints[axis.index()] = hints;
    }

    /// Removes stems, start masks and every recorded mask change.
    pub fn clear_hints(&mut self) {
        self.hints = Default::default();
        for subpath in &mut self.subpaths {
            for element in &mut subpath.elements {
                element.hint_mask = None;
                element.flex = None;
            }
        }
    }

    /// Records a mask change at an element.
    pub fn set_hint_mask(&mut self, id: ElementId, masks: MaskPair) {
        self.element_mut(id).hint_mask = Some(masks);
    }

    /// Reorders subpaths; `order[i]` is the old index of the new subpath `i`.
    pub fn reorder(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.subpaths.len());
        let mut old: Vec<Option<Subpath>> = std::mem::take(&mut self.subpaths)
            .into_iter()
            .map(Some)
            .collect();
        self.subpaths = order.iter().filter_map(|ix| old[*ix].take()).collect();
        self.invalidate();
    }

    /// Splits every curve whose control arms straddle its chord at its
    /// inflection point.
    ///
    /// Returns the number of curves that were split.
    pub fn split_inflections(&mut self) -> usize {
        let mut count = 0;
        for subpath in &mut self.subpaths {
            let mut elements = Vec::with_capacity(subpath.elements.len());
            for element in subpath.elements.drain(..) {
                if !element.has_opposing_arms() {
                    elements.push(element);
                    continue;
                }
                let t = element
                    .cubic()
                    .inflections()
                    .into_iter()
                    .find(|t| *t > 0.01 && *t < 0.99);
                match t {
                    Some(t) => {
                        let (head, tail) = element.split(t);
                        log::trace!("split curve at inflection t={t:.3}");
                        elements.push(head);
                        elements.push(tail);
                        count += 1;
                    }
                    None => elements.push(element),
                }
            }
            *subpath = Subpath::new(elements);
        }
        if count > 0 {
            self.invalidate();
        }
        count
    }

    fn invalidate(&mut self) {
        self.bounds = OnceLock::new();
        self.offsets = OnceLock::new();
        for subpath in &mut self.subpaths {
            subpath.bounds = OnceLock::new();
        }
    }
}

/// Builds an [`Outline`] from drawing commands.
///
/// This implements [`Pen`] so glyphs can be drawn directly from a font
/// reader such as skrifa.
#[derive(Default)]
pub struct OutlineBuilder {
    subpaths: Vec<Vec<PathElement>>,
    current: Vec<PathElement>,
    start: Option<Point>,
    last: Point,
    error: Option<MalformedPath>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the builder, closing any open subpath.
    pub fn build(mut self) -> Result<Outline, MalformedPath> {
        self.finish_subpath();
        if let Some(err) = self.error {
            return Err(err);
        }
        Outline::new(self.subpaths)
    }

    fn push(&mut self, el: PathEl) {
        match el {
            PathEl::MoveTo(p) => self.move_to_point(p),
            PathEl::LineTo(p) => self.line_to_point(p),
            PathEl::QuadTo(c, p) => {
                let start = self.last;
                let c0 = start + (c - start) * (2.0 / 3.0);
                let c1 = p + (c - p) * (2.0 / 3.0);
                self.curve_to_point(c0, c1, p);
            }
            PathEl::CurveTo(c0, c1, p) => self.curve_to_point(c0, c1, p),
            PathEl::ClosePath => self.close_subpath(),
        }
    }

    fn move_to_point(&mut self, p: Point) {
        self.finish_subpath();
        self.start = Some(p);
        self.last = p;
    }

    fn line_to_point(&mut self, p: Point) {
        if self.ensure_started() {
            self.current.push(PathElement::line(self.last, p));
            self.last = p;
        }
    }

    fn curve_to_point(&mut self, c0: Point, c1: Point, p: Point) {
        if self.ensure_started() {
            self.current.push(PathElement::curve(self.last, c0, c1, p));
            self.last = p;
        }
    }

    fn close_subpath(&mut self) {
        self.finish_subpath();
        self.start = None;
    }

    fn ensure_started(&mut self) -> bool {
        if self.start.is_none() {
            self.error.get_or_insert(MalformedPath::MissingMove);
            return false;
        }
        true
    }

    fn finish_subpath(&mut self) {
        if let Some(start) = self.start {
            if self.last != start && !self.current.is_empty() {
                self.current.push(PathElement::line(self.last, start));
            }
            self.last = start;
        }
        // a lone move produces nothing
        if !self.current.is_empty() {
            self.subpaths.push(std::mem::take(&mut self.current));
        }
    }
}

fn to_point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

impl Pen for OutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.move_to_point(to_point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.line_to_point(to_point(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.push(PathEl::QuadTo(to_point(cx0, cy0), to_point(x, y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.curve_to_point(to_point(cx0, cy0), to_point(cx1, cy1), to_point(x, y));
    }

    fn close(&mut self) {
        self.close_subpath();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Builds a closed polygon from a list of points.
    pub(crate) fn polygon(points: &[(f64, f64)]) -> Vec<PathElement> {
        let points: Vec<Point> = points.iter().map(|(x, y)| Point::new(*x, *y)).collect();
        (0..points.len())
            .map(|ix| PathElement::line(points[ix], points[(ix + 1) % points.len()]))
            .collect()
    }

    /// Counter-clockwise axis aligned rectangle.
    pub(crate) fn rect_ccw(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PathElement> {
        polygon(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    /// Clockwise axis aligned rectangle.
    pub(crate) fn rect_cw(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PathElement> {
        polygon(&[(x0, y0), (x0, y1), (x1, y1), (x1, y0)])
    }

    #[test]
    fn navigation_wraps_within_subpath() {
        let outline =
            Outline::new(vec![rect_ccw(0.0, 0.0, 10.0, 10.0), rect_cw(2.0, 2.0, 8.0, 8.0)])
                .unwrap();
        let first = ElementId::new(1, 0);
        assert_eq!(outline.prev(first), ElementId::new(1, 3));
        assert_eq!(outline.next(ElementId::new(1, 3)), first);
        assert_eq!(outline.position(first), 4);
        assert_eq!(outline.id_at(5), Some(ElementId::new(1, 1)));
        assert_eq!(outline.id_at(8), None);
        assert_eq!(outline.ids().count(), 8);
    }

    #[test]
    fn bounds_are_invalidated_by_reorder() {
        let mut outline =
            Outline::new(vec![rect_ccw(0.0, 0.0, 10.0, 10.0), rect_ccw(20.0, 0.0, 30.0, 5.0)])
                .unwrap();
        assert_eq!(outline.bounds(), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));
        assert_eq!(outline.position(ElementId::new(1, 0)), 4);
        outline.reorder(&[1, 0]);
        assert_eq!(outline.subpaths()[0].bounds(), Rect::new(20.0, 0.0, 30.0, 5.0));
        assert_eq!(outline.bounds(), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));
    }

    #[test]
    fn open_subpaths_are_closed() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        path.quad_to((100.0, 100.0), (0.0, 100.0));
        let outline = Outline::from_bezpath(&path).unwrap();
        let subpath = &outline.subpaths()[0];
        assert_eq!(subpath.len(), 3);
        assert!(subpath.elements()[1].is_curve());
        assert_eq!(subpath.elements()[2].end, Point::new(0.0, 0.0));
    }

    #[test]
    fn pen_without_move_is_an_error() {
        let mut builder = OutlineBuilder::new();
        builder.line_to(10.0, 10.0);
        assert_eq!(builder.build().unwrap_err(), MalformedPath::MissingMove);
    }

    #[test]
    fn pen_builds_subpaths() {
        let mut builder = OutlineBuilder::new();
        builder.move_to(0.0, 0.0);
        builder.line_to(10.0, 0.0);
        builder.curve_to(10.0, 5.0, 5.0, 10.0, 0.0, 10.0);
        builder.close();
        builder.move_to(50.0, 50.0);
        builder.close();
        let outline = builder.build().unwrap();
        assert_eq!(outline.subpaths().len(), 1);
        assert_eq!(outline.element_count(), 3);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let err = Outline::new(vec![polygon(&[(0.0, 0.0), (f64::NAN, 0.0), (0.0, 5.0)])])
            .unwrap_err();
        assert!(matches!(err, MalformedPath::NonFiniteCoordinate { subpath: 0, .. }));
    }

    #[test]
    fn orientation() {
        let ccw = Outline::new(vec![rect_ccw(0.0, 0.0, 10.0, 10.0)]).unwrap();
        let cw = Outline::new(vec![rect_cw(0.0, 0.0, 10.0, 10.0)]).unwrap();
        assert!(!ccw.is_clockwise());
        assert!(cw.is_clockwise());
    }

    #[test]
    fn tangents_skip_zero_handles() {
        let el = PathElement::curve(
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(50.0, 10.0),
            Point::new(100.0, 100.0),
        );
        assert_eq!(el.start_tangent(), Vec2::new(50.0, 10.0));
        assert_eq!(el.end_tangent(), Vec2::new(50.0, 90.0));
    }

    #[test]
    fn location_extrema_of_arch() {
        let arch = PathElement::curve(
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        );
        let ts = arch.location_extrema(Axis::Horizontal);
        assert_eq!(ts.len(), 1);
        assert!((ts[0] - 0.5).abs() < 1e-9);
        assert!(arch.location_extrema(Axis::Vertical).is_empty());
    }

    #[test]
    fn split_inflected_curve() {
        let s_curve = PathElement::curve(
            Point::new(0.0, 0.0),
            Point::new(50.0, 40.0),
            Point::new(50.0, -40.0),
            Point::new(100.0, 0.0),
        );
        assert!(s_curve.has_opposing_arms());
        let mut elements = vec![s_curve];
        elements.push(PathElement::line(Point::new(100.0, 0.0), Point::new(0.0, 0.0)));
        let mut outline = Outline::new(vec![elements]).unwrap();
        assert_eq!(outline.split_inflections(), 1);
        let subpath = &outline.subpaths()[0];
        assert_eq!(subpath.len(), 3);
        assert!(!subpath.elements()[0].has_opposing_arms());
        assert_eq!(subpath.elements()[0].end, subpath.elements()[1].start);
    }
}

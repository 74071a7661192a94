//! Font-wide statistics gathered from hinted glyphs.
//!
//! These are used when setting up a font: the most common stem widths are
//! candidates for the dominant stems, and the most common flat edge
//! locations are candidates for alignment zones.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::{outline::Outline, params::ZoneKind, stems::GhostEdge, Axis};

type Histogram = BTreeMap<OrderedFloat<f64>, usize>;

/// Returns the `count` most frequent entries, most frequent first; ties go
/// to the smaller value.
fn most_common(histogram: &Histogram, count: usize) -> Vec<(f64, usize)> {
    let mut entries: Vec<(f64, usize)> = histogram.iter().map(|(k, v)| (k.0, *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.total_cmp(&b.0)));
    entries.truncate(count);
    entries
}

/// Stem width histogram per axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StemStats {
    widths: [Histogram; 2],
}

impl StemStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the widths of every non-ghost stem on the outline.
    pub fn add_outline(&mut self, outline: &Outline) {
        for axis in Axis::ALL {
            let histogram = &mut self.widths[axis.index()];
            for stem in outline.hints(axis).stems.iter().filter(|s| s.ghost.is_none()) {
                *histogram.entry(OrderedFloat(stem.width())).or_default() += 1;
            }
        }
    }

    pub fn most_common(&self, axis: Axis, count: usize) -> Vec<(f64, usize)> {
        most_common(&self.widths[axis.index()], count)
    }

    /// Number of stems recorded for an axis.
    pub fn total(&self, axis: Axis) -> usize {
        self.widths[axis.index()].values().sum()
    }

    pub fn merge(&mut self, other: &StemStats) {
        for (mine, theirs) in self.widths.iter_mut().zip(&other.widths) {
            for (width, count) in theirs {
                *mine.entry(*width).or_default() += count;
            }
        }
    }
}

/// Locations of the real lower and upper edges of horizontal stems.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneStats {
    bottoms: Histogram,
    tops: Histogram,
}

impl ZoneStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_outline(&mut self, outline: &Outline) {
        for stem in &outline.hints(Axis::Horizontal).stems {
            if stem.ghost != Some(GhostEdge::Lower) {
                *self.bottoms.entry(OrderedFloat(stem.lower)).or_default() += 1;
            }
            if stem.ghost != Some(GhostEdge::Upper) {
                *self.tops.entry(OrderedFloat(stem.upper)).or_default() += 1;
            }
        }
    }

    /// The most frequent edge locations for a zone of the given kind.
    pub fn most_common(&self, kind: ZoneKind, count: usize) -> Vec<(f64, usize)> {
        match kind {
            ZoneKind::Bottom => most_common(&self.bottoms, count),
            ZoneKind::Top => most_common(&self.tops, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stems::{AxisHints, Stem};
    use pretty_assertions::assert_eq;

    fn hinted(horizontal: Vec<Stem>, vertical: Vec<Stem>) -> Outline {
        let mut outline = Outline::default();
        outline.set_hints(
            Axis::Horizontal,
            AxisHints {
                stems: horizontal,
                ..Default::default()
            },
        );
        outline.set_hints(
            Axis::Vertical,
            AxisHints {
                stems: vertical,
                ..Default::default()
            },
        );
        outline
    }

    #[test]
    fn width_histogram() {
        let mut stats = StemStats::new();
        stats.add_outline(&hinted(
            vec![Stem::new(0.0, 30.0)],
            vec![Stem::new(0.0, 80.0), Stem::new(300.0, 380.0), Stem::new(500.0, 570.0)],
        ));
        stats.add_outline(&hinted(
            vec![Stem::ghost(0.0, 20.0, GhostEdge::Upper)],
            vec![Stem::new(10.0, 80.0)],
        ));
        assert_eq!(stats.most_common(Axis::Vertical, 2), vec![(70.0, 2), (80.0, 2)]);
        assert_eq!(stats.total(Axis::Horizontal), 1);
        let mut merged = StemStats::new();
        merged.merge(&stats);
        merged.merge(&stats);
        assert_eq!(merged.total(Axis::Vertical), 8);
    }

    #[test]
    fn zone_histogram() {
        let mut stats = ZoneStats::new();
        stats.add_outline(&hinted(
            vec![
                Stem::ghost(0.0, 20.0, GhostEdge::Upper),
                Stem::ghost(480.0, 500.0, GhostEdge::Lower),
            ],
            Vec::new(),
        ));
        stats.add_outline(&hinted(vec![Stem::new(0.0, 80.0)], Vec::new()));
        assert_eq!(stats.most_common(ZoneKind::Bottom, 1), vec![(0.0, 2)]);
        assert_eq!(stats.most_common(ZoneKind::Top, 5), vec![(80.0, 1), (500.0, 1)]);
    }
}

//! Main stem selection, bounding box fallback and counter hinting.

use kurbo::Rect;

use super::{
    candidates::{rank, CandId, StemCandidate},
    spans::{EdgeSide, FlatSpan, SpanArena, SpanId, SpanKind},
};
use crate::{
    geom,
    outline::Outline,
    params::{AxisParameters, HintOptions},
    report::{Report, ReportEntry, StemKind},
    Axis,
};

/// The selected stems for one axis.
#[derive(Clone, Debug, Default)]
pub(crate) struct Selection {
    pub main: Vec<CandId>,
    pub counter: bool,
}

pub(crate) struct Selector<'a> {
    pub outline: &'a Outline,
    pub axis: Axis,
    pub params: &'a AxisParameters,
    pub options: &'a HintOptions,
}

impl Selector<'_> {
    pub fn select(
        &self,
        arena: &mut SpanArena,
        candidates: &mut Vec<StemCandidate>,
        report: &mut Report,
    ) -> Selection {
        let mut main = self.greedy(candidates);
        if main.is_empty() {
            main = self.bounding_box_fallback(arena, candidates);
            if !main.is_empty() {
                report.push(ReportEntry::BoundingBoxFallback { axis: self.axis });
            }
        }
        let mut selection = Selection {
            main,
            counter: false,
        };
        self.counter_hint(&mut selection, candidates, report);
        self.report_stems(&selection, arena, candidates, report);
        selection
    }

    /// Picks stems best first, skipping weak candidates and those that
    /// crowd a stem already picked.
    fn greedy(&self, candidates: &[StemCandidate]) -> Vec<CandId> {
        let options = self.options;
        let mut order: Vec<CandId> = (0..candidates.len())
            .filter(|id| candidates[*id].is_active())
            .collect();
        order.sort_by(|a, b| rank(candidates, options, *a, *b));
        let mut main: Vec<CandId> = Vec::new();
        let mut last_value: Option<f64> = None;
        for id in order {
            let cand = &candidates[id];
            let floor = options
                .min_main_value
                .max(last_value.map_or(0.0, |v| v / options.selection_cascade));
            if cand.special == 0 && cand.value < floor {
                continue;
            }
            let crowded = main.iter().any(|picked| {
                let picked = &candidates[*picked];
                geom::ranges_overlap(
                    (picked.lower - options.band_margin, picked.upper + options.band_margin),
                    (cand.lower, cand.upper),
                )
            });
            if crowded {
                continue;
            }
            main.push(id);
            last_value = Some(cand.value);
        }
        main
    }

    /// Synthesizes stems from the glyph bounds, or from each subpath's
    /// bounds when the axis is a counter hinting candidate.
    fn bounding_box_fallback(
        &self,
        arena: &mut SpanArena,
        candidates: &mut Vec<StemCandidate>,
    ) -> Vec<CandId> {
        let live_subpaths = self
            .outline
            .subpaths()
            .iter()
            .filter(|subpath| !subpath.is_degenerate());
        let boxes: Vec<Rect> = if self.params.counter_hint {
            live_subpaths.map(|subpath| subpath.bounds()).collect()
        } else {
            live_subpaths
                .map(|subpath| subpath.bounds())
                .reduce(|a, b| a.union(b))
                .into_iter()
                .collect()
        };
        let mut main: Vec<CandId> = Vec::new();
        for bounds in boxes {
            let (lower, upper) = self.axis.location_range(bounds);
            let (along_min, along_max) = self.axis.along_range(bounds);
            if upper - lower <= 0.0 {
                continue;
            }
            let crowded = main.iter().any(|picked| {
                let picked = &candidates[*picked];
                geom::ranges_overlap(
                    (picked.lower - self.options.band_margin, picked.upper + self.options.band_margin),
                    (lower, upper),
                )
            });
            if crowded {
                continue;
            }
            let lower_span = self.edge_span(arena, lower, EdgeSide::Lower, along_min, along_max);
            let upper_span = self.edge_span(arena, upper, EdgeSide::Upper, along_min, along_max);
            let id = candidates.len();
            candidates.push(StemCandidate {
                lower,
                upper,
                lower_span,
                upper_span,
                value: self.options.min_main_value,
                special: 0,
                ghost: None,
                fallback: true,
                pruned: false,
                merged_into: None,
            });
            // every unclaimed edge on the box gets the fallback stem
            let edges: Vec<SpanId> = arena
                .live_ids()
                .filter(|span_id| {
                    let span = arena.get(*span_id);
                    let loc = match span.side {
                        EdgeSide::Lower => lower,
                        EdgeSide::Upper => upper,
                    };
                    *span_id == lower_span
                        || *span_id == upper_span
                        || (span.is_real()
                            && (span.loc - loc).abs() <= self.options.span_merge_distance)
                })
                .collect();
            for span in edges {
                let span = arena.get_mut(span);
                if span.winner.is_none() {
                    span.winner = Some(id);
                }
            }
            main.push(id);
        }
        main
    }

    /// Reuses an existing span at a bounding box edge, or adds a synthetic
    /// one.
    fn edge_span(
        &self,
        arena: &mut SpanArena,
        loc: f64,
        side: EdgeSide,
        min: f64,
        max: f64,
    ) -> SpanId {
        let existing = arena.live_ids().find(|id| {
            let span = arena.get(*id);
            span.side == side
                && span.is_real()
                && (span.loc - loc).abs() <= self.options.span_merge_distance
        });
        existing.unwrap_or_else(|| {
            arena.push(FlatSpan {
                loc,
                min,
                max,
                kind: SpanKind::Line,
                side,
                bonus: 0.0,
                elements: [None, None],
                replaced_by: None,
                deleted: false,
                winner: None,
            })
        })
    }

    /// Replaces the stems with three evenly spaced ones when the axis asks
    /// for counter hinting and the three strongest stems qualify.
    fn counter_hint(
        &self,
        selection: &mut Selection,
        candidates: &[StemCandidate],
        report: &mut Report,
    ) {
        if !self.params.counter_hint || selection.main.len() < 3 {
            return;
        }
        let mut best = selection.main.clone();
        best.sort_by(|a, b| candidates[*b].value.total_cmp(&candidates[*a].value));
        best.truncate(3);
        best.sort_by(|a, b| candidates[*a].lower.total_cmp(&candidates[*b].lower));
        let [s1, s2, s3] = [best[0], best[1], best[2]].map(|id| &candidates[id]);
        let difference = ((s2.lower - s1.upper) - (s3.lower - s2.upper)).abs();
        if difference <= self.options.counter_tolerance {
            selection.main = best;
            selection.counter = true;
            report.push(ReportEntry::CounterHinted {
                axis: self.axis,
                stems: 3,
            });
        } else if difference <= self.options.counter_near_miss {
            report.push(ReportEntry::CounterNearMiss {
                axis: self.axis,
                difference,
            });
        }
    }

    fn report_stems(
        &self,
        selection: &Selection,
        arena: &SpanArena,
        candidates: &[StemCandidate],
        report: &mut Report,
    ) {
        for id in &selection.main {
            let cand = &candidates[*id];
            let kind = if cand.fallback {
                StemKind::BoundingBox
            } else if cand.ghost.is_some() {
                StemKind::Ghost
            } else if arena.get(cand.lower_span).kind == SpanKind::Line
                && arena.get(cand.upper_span).kind == SpanKind::Line
            {
                StemKind::Line
            } else {
                StemKind::Curve
            };
            report.push(ReportEntry::Stem {
                axis: self.axis,
                lower: cand.lower,
                upper: cand.upper,
                kind,
                value: cand.value,
                special: cand.special,
            });
            if cand.ghost.is_some() || cand.fallback {
                continue;
            }
            if let Some(dominant) = self.params.nearest_dominant(cand.width()) {
                let miss = (cand.width() - dominant).abs();
                if miss > self.options.dominant_width_tolerance
                    && miss <= self.options.width_near_miss
                {
                    report.push(ReportEntry::WidthNearMiss {
                        axis: self.axis,
                        width: cand.width(),
                        dominant,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(lower: f64, upper: f64, value: f64, special: u32) -> StemCandidate {
        StemCandidate {
            lower,
            upper,
            lower_span: 0,
            upper_span: 0,
            value,
            special,
            ghost: None,
            fallback: false,
            pruned: false,
            merged_into: None,
        }
    }

    fn selector<'a>(
        outline: &'a Outline,
        params: &'a AxisParameters,
        options: &'a HintOptions,
    ) -> Selector<'a> {
        Selector {
            outline,
            axis: Axis::Vertical,
            params,
            options,
        }
    }

    #[test]
    fn greedy_skips_crowded_and_weak() {
        let outline = Outline::default();
        let params = AxisParameters::default();
        let options = HintOptions::default();
        let candidates = vec![
            candidate(0.0, 80.0, 5000.0, 0),
            // within the band margin of the first
            candidate(90.0, 170.0, 4000.0, 0),
            candidate(300.0, 380.0, 3000.0, 0),
            // below the minimum value
            candidate(600.0, 680.0, 5.0, 0),
            // weak but special
            candidate(800.0, 880.0, 5.0, 1),
        ];
        let main = selector(&outline, &params, &options).greedy(&candidates);
        let mut picked: Vec<_> = main.iter().map(|id| candidates[*id].lower).collect();
        picked.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(picked, vec![0.0, 300.0, 800.0]);
    }

    #[test]
    fn cascade_rejects_tiny_followers() {
        let outline = Outline::default();
        let params = AxisParameters::default();
        let options = HintOptions::default();
        let candidates = vec![candidate(0.0, 80.0, 100_000.0, 0), candidate(300.0, 380.0, 400.0, 0)];
        let main = selector(&outline, &params, &options).greedy(&candidates);
        assert_eq!(main, vec![0]);
    }

    #[test]
    fn counter_hint_even_spacing() {
        let outline = Outline::default();
        let params = AxisParameters {
            counter_hint: true,
            ..Default::default()
        };
        let options = HintOptions::default();
        let candidates = vec![
            candidate(0.0, 80.0, 1000.0, 0),
            candidate(200.0, 280.0, 1000.0, 0),
            candidate(400.0, 480.0, 1000.0, 0),
            candidate(700.0, 720.0, 10.0, 0),
        ];
        let mut selection = Selection {
            main: vec![0, 1, 2, 3],
            counter: false,
        };
        let mut report = Report::default();
        selector(&outline, &params, &options).counter_hint(&mut selection, &candidates, &mut report);
        assert!(selection.counter);
        assert_eq!(selection.main, vec![0, 1, 2]);
    }

    #[test]
    fn counter_near_miss_is_reported() {
        let outline = Outline::default();
        let params = AxisParameters {
            counter_hint: true,
            ..Default::default()
        };
        let options = HintOptions::default();
        let candidates = vec![
            candidate(0.0, 80.0, 1000.0, 0),
            candidate(200.0, 280.0, 1000.0, 0),
            candidate(405.0, 485.0, 1000.0, 0),
        ];
        let mut selection = Selection {
            main: vec![0, 1, 2],
            counter: false,
        };
        let mut report = Report::default();
        selector(&outline, &params, &options).counter_hint(&mut selection, &candidates, &mut report);
        assert!(!selection.counter);
        assert_eq!(
            report.entries(),
            &[ReportEntry::CounterNearMiss {
                axis: Axis::Vertical,
                difference: 5.0
            }]
        );
    }

    #[test]
    fn fallback_uses_bounds() {
        let outline = Outline::new(vec![crate::outline::tests::rect_ccw(0.0, 0.0, 500.0, 500.0)])
            .unwrap();
        let params = AxisParameters::default();
        let options = HintOptions::default();
        let mut arena = SpanArena::default();
        let mut candidates = Vec::new();
        let mut report = Report::default();
        let selection =
            selector(&outline, &params, &options).select(&mut arena, &mut candidates, &mut report);
        assert_eq!(selection.main.len(), 1);
        let stem = &candidates[selection.main[0]];
        assert_eq!((stem.lower, stem.upper), (0.0, 500.0));
        assert!(stem.fallback);
        assert!(report
            .entries()
            .contains(&ReportEntry::BoundingBoxFallback { axis: Axis::Vertical }));
    }
}

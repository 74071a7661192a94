//! Stem candidates: pairs of opposite spans that could form a stem.

use std::{cmp::Ordering, collections::HashMap};

use ordered_float::OrderedFloat;

use super::spans::{EdgeSide, FlatSpan, SpanArena, SpanId, SpanKind};
use crate::{
    geom,
    outline::Outline,
    params::{AxisParameters, HintOptions, ZoneKind},
    report::{Report, ReportEntry},
    stems::GhostEdge,
    Axis,
};

pub(crate) type CandId = usize;

#[derive(Clone, Debug)]
pub(crate) struct StemCandidate {
    pub lower: f64,
    pub upper: f64,
    pub lower_span: SpanId,
    pub upper_span: SpanId,
    pub value: f64,
    pub special: u32,
    pub ghost: Option<GhostEdge>,
    /// Synthesized from a bounding box.
    pub fallback: bool,
    pub pruned: bool,
    pub merged_into: Option<CandId>,
}

impl StemCandidate {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Value used for ranking; special candidates are boosted.
    pub fn priority(&self, options: &HintOptions) -> f64 {
        if self.special > 0 {
            self.value * options.special_factor
        } else {
            self.value
        }
    }

    pub fn is_active(&self) -> bool {
        !self.pruned && self.merged_into.is_none()
    }
}

/// Orders candidates from best to worst.
///
/// Ties are broken by location so the outcome never depends on the order in
/// which spans were discovered.
pub(crate) fn rank(
    candidates: &[StemCandidate],
    options: &HintOptions,
    a: CandId,
    b: CandId,
) -> Ordering {
    let (ca, cb) = (&candidates[a], &candidates[b]);
    cb.priority(options)
        .total_cmp(&ca.priority(options))
        .then(ca.lower.total_cmp(&cb.lower))
        .then(ca.upper.total_cmp(&cb.upper))
        .then(a.cmp(&b))
}

/// Combines the values of candidates found more than once at the same
/// location so that repetition strengthens without growing unboundedly.
fn combine_values(a: f64, b: f64) -> f64 {
    if a + b <= 0.0 {
        return 0.0;
    }
    a + b - a * b / (a + b)
}

pub(crate) struct CandidateBuilder<'a> {
    pub axis: Axis,
    pub params: &'a AxisParameters,
    pub fuzz: f64,
    pub options: &'a HintOptions,
}

impl CandidateBuilder<'_> {
    /// Pairs every lower span with every upper span above it, then adds
    /// ghost candidates for flat edges inside alignment zones.
    pub fn generate(&self, arena: &mut SpanArena, report: &mut Report) -> Vec<StemCandidate> {
        let live: Vec<SpanId> = arena.live_ids().collect();
        let (lowers, uppers): (Vec<SpanId>, Vec<SpanId>) = live
            .iter()
            .partition(|id| arena.get(**id).side == EdgeSide::Lower);
        let mut candidates = Vec::new();
        for &l in &lowers {
            for &u in &uppers {
                let (lower, upper) = (arena.get(l), arena.get(u));
                if upper.loc < lower.loc {
                    continue;
                }
                if let Some((value, special)) = self.evaluate(lower, upper) {
                    candidates.push(StemCandidate {
                        lower: lower.loc,
                        upper: upper.loc,
                        lower_span: l,
                        upper_span: u,
                        value,
                        special,
                        ghost: None,
                        fallback: false,
                        pruned: false,
                        merged_into: None,
                    });
                }
            }
        }
        combine_duplicates(&mut candidates);
        self.report_zone_near_misses(arena, &live, report);
        self.add_ghosts(arena, &live, &mut candidates);
        log::trace!("{} axis: {} stem candidates", self.axis, candidates.len());
        candidates
    }

    /// Scores a pair of spans, returning `None` if the pair cannot be a stem.
    fn evaluate(&self, lower: &FlatSpan, upper: &FlatSpan) -> Option<(f64, u32)> {
        let options = self.options;
        let width = upper.loc - lower.loc;
        if width < options.min_stem_width || width > options.max_stem_width {
            return None;
        }
        if (lower.kind == SpanKind::Bend || upper.kind == SpanKind::Bend) && width < options.max_flare
        {
            return None;
        }
        let in_bottom = self.params.zone_for_edge(lower.loc, true, self.fuzz).is_some();
        let in_top = self.params.zone_for_edge(upper.loc, false, self.fuzz).is_some();
        if in_bottom && in_top {
            // both edges would be captured by zones
            return None;
        }
        let mut special = (in_bottom || in_top) as u32;
        if self
            .params
            .dominant_stems
            .iter()
            .any(|dominant| (width - dominant).abs() <= options.dominant_width_tolerance)
        {
            special += 1;
        }
        let min_len = lower.len().min(upper.len());
        if min_len <= 0.0 {
            return None;
        }
        let overlap = lower.max.min(upper.max) - lower.min.max(upper.min);
        let factor = if overlap >= 0.0 {
            0.5 + 0.5 * (overlap / min_len).min(1.0)
        } else {
            let gap = -overlap / options.gap_penalty_distance;
            0.5 / (1.0 + gap * gap)
        };
        let width = width.max(1.0);
        let value = 1000.0 * factor * min_len * min_len / (width * width);
        (value > 0.0).then_some((value, special))
    }

    fn report_zone_near_misses(&self, arena: &SpanArena, live: &[SpanId], report: &mut Report) {
        let mut seen = Vec::new();
        for &id in live {
            let span = arena.get(id);
            if span.kind == SpanKind::Bend {
                continue;
            }
            let is_lower = span.side == EdgeSide::Lower;
            if self.params.zone_for_edge(span.loc, is_lower, self.fuzz).is_some() {
                continue;
            }
            let kind = if is_lower {
                ZoneKind::Bottom
            } else {
                ZoneKind::Top
            };
            let near = self.params.zones.iter().find(|zone| {
                zone.kind == kind && zone.distance(span.loc) <= self.options.zone_near_miss
            });
            if let Some(zone) = near {
                if seen.contains(&OrderedFloat(span.loc)) {
                    continue;
                }
                seen.push(OrderedFloat(span.loc));
                report.push(ReportEntry::ZoneNearMiss {
                    axis: self.axis,
                    location: span.loc,
                    zone: *zone,
                });
            }
        }
    }

    /// Adds a ghost candidate for every flat edge captured by a zone of
    /// matching polarity. The synthetic edge is added to the arena as a
    /// span with no elements.
    fn add_ghosts(
        &self,
        arena: &mut SpanArena,
        live: &[SpanId],
        candidates: &mut Vec<StemCandidate>,
    ) {
        let options = self.options;
        for &id in live {
            let span = arena.get(id).clone();
            if span.kind == SpanKind::Bend {
                continue;
            }
            let is_lower = span.side == EdgeSide::Lower;
            if self.params.zone_for_edge(span.loc, is_lower, self.fuzz).is_none() {
                continue;
            }
            let (loc, side, ghost) = if is_lower {
                (span.loc + options.ghost_width, EdgeSide::Upper, GhostEdge::Upper)
            } else {
                (span.loc - options.ghost_width, EdgeSide::Lower, GhostEdge::Lower)
            };
            let synthetic = arena.push(FlatSpan {
                loc,
                side,
                kind: SpanKind::Ghost,
                bonus: 0.0,
                elements: [None, None],
                replaced_by: None,
                deleted: false,
                winner: None,
                ..span
            });
            let (lower_span, upper_span) = if is_lower {
                (id, synthetic)
            } else {
                (synthetic, id)
            };
            candidates.push(StemCandidate {
                lower: arena.get(lower_span).loc,
                upper: arena.get(upper_span).loc,
                lower_span,
                upper_span,
                value: options.ghost_value,
                special: options.ghost_special,
                ghost: Some(ghost),
                fallback: false,
                pruned: false,
                merged_into: None,
            });
        }
    }
}

fn combine_duplicates(candidates: &mut [StemCandidate]) {
    let mut groups: HashMap<(OrderedFloat<f64>, OrderedFloat<f64>), Vec<CandId>> = HashMap::new();
    for (id, cand) in candidates.iter().enumerate() {
        groups
            .entry((OrderedFloat(cand.lower), OrderedFloat(cand.upper)))
            .or_default()
            .push(id);
    }
    for ids in groups.values().filter(|ids| ids.len() > 1) {
        let value = ids
            .iter()
            .map(|id| candidates[*id].value)
            .reduce(combine_values)
            .unwrap_or_default();
        let special = ids
            .iter()
            .map(|id| candidates[*id].special)
            .max()
            .unwrap_or_default();
        for id in ids {
            candidates[*id].value = value;
            candidates[*id].special = special;
        }
    }
}

/// Returns true if any element of one span is close to any element of the
/// other along the outline.
fn spans_close(outline: &Outline, arena: &SpanArena, a: SpanId, b: SpanId, max_length: f64) -> bool {
    if a == b {
        return true;
    }
    let (sa, sb) = (arena.get(a), arena.get(b));
    sa.elements.iter().flatten().any(|ea| {
        sb.elements
            .iter()
            .flatten()
            .any(|eb| geom::elements_close(outline, *ea, *eb, max_length))
    })
}

fn both_edges_close(
    outline: &Outline,
    arena: &SpanArena,
    a: &StemCandidate,
    b: &StemCandidate,
    max_length: f64,
) -> bool {
    spans_close(outline, arena, a.lower_span, b.lower_span, max_length)
        && spans_close(outline, arena, a.upper_span, b.upper_span, max_length)
}

/// Marks candidates dominated by a much stronger nearby candidate.
pub(crate) fn prune(
    outline: &Outline,
    arena: &SpanArena,
    candidates: &mut [StemCandidate],
    options: &HintOptions,
) {
    let count = candidates.len();
    let mut pruned = vec![false; count];
    for c in 0..count {
        let weak = &candidates[c];
        if weak.ghost.is_some() {
            continue;
        }
        pruned[c] = (0..count).any(|d| {
            let strong = &candidates[d];
            d != c
                && strong.ghost.is_none()
                && (weak.special == 0 || strong.special > 0)
                && strong.value >= options.prune_factor * weak.value
                && (strong.lower - weak.lower).abs() <= options.prune_distance
                && (strong.upper - weak.upper).abs() <= options.prune_distance
                && both_edges_close(outline, arena, weak, strong, options.close_path_length)
        });
    }
    for (cand, pruned) in candidates.iter_mut().zip(pruned) {
        cand.pruned |= pruned;
    }
}

/// Gives every live real span its best candidate and prunes candidates
/// that are nobody's best.
///
/// A ghost candidate only wins a span if it is strictly better than every
/// ordinary candidate using that span.
pub(crate) fn associate(
    arena: &mut SpanArena,
    candidates: &mut [StemCandidate],
    options: &HintOptions,
) {
    let mut by_span: HashMap<SpanId, Vec<CandId>> = HashMap::new();
    for (id, cand) in candidates.iter().enumerate() {
        if cand.pruned {
            continue;
        }
        by_span.entry(cand.lower_span).or_default().push(id);
        by_span.entry(cand.upper_span).or_default().push(id);
    }
    let mut winners = vec![false; candidates.len()];
    let view: &[StemCandidate] = candidates;
    let live: Vec<SpanId> = arena.live_ids().collect();
    for span_id in live {
        if !arena.get(span_id).is_real() {
            continue;
        }
        let Some(ids) = by_span.get(&span_id) else {
            continue;
        };
        let best = |ghost: bool| {
            ids.iter()
                .copied()
                .filter(|id| view[*id].ghost.is_some() == ghost)
                .min_by(|a, b| rank(view, options, *a, *b))
        };
        let winner = match (best(false), best(true)) {
            (Some(real), Some(ghost)) => {
                if view[ghost].priority(options) > view[real].priority(options) {
                    ghost
                } else {
                    real
                }
            }
            (Some(id), None) | (None, Some(id)) => id,
            (None, None) => continue,
        };
        arena.get_mut(span_id).winner = Some(winner);
        winners[winner] = true;
    }
    for (cand, is_winner) in candidates.iter_mut().zip(winners) {
        if !is_winner {
            cand.pruned = true;
        }
    }
}

/// Merges each candidate into the best nearby candidate of the same kind,
/// which takes over its role; the merged candidate shares its value.
pub(crate) fn merge(
    outline: &Outline,
    arena: &SpanArena,
    candidates: &mut [StemCandidate],
    options: &HintOptions,
) {
    let mut order: Vec<CandId> = (0..candidates.len())
        .filter(|id| !candidates[*id].pruned)
        .collect();
    let view: &[StemCandidate] = candidates;
    order.sort_by(|a, b| rank(view, options, *a, *b));
    for (pos, &weak) in order.iter().enumerate() {
        let target = order[..pos].iter().copied().find(|&strong| {
            let (s, w) = (&candidates[strong], &candidates[weak]);
            s.merged_into.is_none()
                && s.ghost == w.ghost
                && (s.lower - w.lower).abs() <= options.merge_distance
                && (s.upper - w.upper).abs() <= options.merge_distance
                && (s.lower, s.upper) != (w.lower, w.upper)
                && both_edges_close(outline, arena, w, s, options.close_path_length)
        });
        if let Some(strong) = target {
            log::trace!(
                "merging candidate {}..{} into {}..{}",
                candidates[weak].lower,
                candidates[weak].upper,
                candidates[strong].lower,
                candidates[strong].upper
            );
            let (value, special) = (candidates[strong].value, candidates[strong].special);
            let cand = &mut candidates[weak];
            cand.merged_into = Some(strong);
            cand.value = value;
            cand.special = special;
        }
    }
}

/// Follows merge pointers to the candidate that represents `id`.
pub(crate) fn root(candidates: &[StemCandidate], mut id: CandId) -> CandId {
    while let Some(next) = candidates[id].merged_into {
        id = next;
    }
    id
}

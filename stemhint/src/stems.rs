//! Final stems, conflicts between them, and the masks each outline
//! position asks for.

use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use crate::{
    geom,
    hinter::{candidates::CandId, AxisResult},
    mask::HintMask,
    outline::{ElementId, Outline},
    params::HintOptions,
    report::{Report, ReportEntry},
    Axis,
};

/// Which edge of a ghost stem is synthetic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GhostEdge {
    Lower,
    Upper,
}

/// A hinted stem: a `[lower, upper]` range on one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stem {
    pub lower: f64,
    pub upper: f64,
    /// Set for ghost stems, which have a single real edge.
    pub ghost: Option<GhostEdge>,
}

impl Stem {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            ghost: None,
        }
    }

    pub fn ghost(lower: f64, upper: f64, synthetic: GhostEdge) -> Self {
        Self {
            lower,
            upper,
            ghost: Some(synthetic),
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Location of the edge that exists in the outline.
    pub fn real_edge(&self) -> Option<f64> {
        match self.ghost {
            Some(GhostEdge::Lower) => Some(self.upper),
            Some(GhostEdge::Upper) => Some(self.lower),
            None => None,
        }
    }

    /// Returns true if the two stems come within `margin` of each other.
    pub fn conflicts_with(&self, other: &Stem, margin: f64) -> bool {
        geom::ranges_overlap(
            (self.lower - margin, self.upper + margin),
            (other.lower, other.upper),
        )
    }
}

/// The stems and start mask for one axis of an outline.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisHints {
    /// Stems ordered by location; masks refer to them by index.
    pub stems: Vec<Stem>,
    /// Mask in effect at the start of the outline.
    pub start_mask: HintMask,
    /// Set when every stem is always active (counter hinting).
    pub counter: bool,
}

impl AxisHints {
    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }
}

/// Stems of one axis with their pairwise conflicts.
#[derive(Clone, Debug)]
pub(crate) struct StemTable {
    pub axis: Axis,
    pub stems: Vec<Stem>,
    /// Ranking priority of each stem, special stems boosted.
    priorities: Vec<f64>,
    conflicts: Vec<HintMask>,
    /// For each ghost, the real stems it may be replaced by.
    substitutes: Vec<HintMask>,
    pub main: HintMask,
    pub counter: bool,
}

impl StemTable {
    pub fn new(
        axis: Axis,
        stems: Vec<Stem>,
        priorities: Vec<f64>,
        main: HintMask,
        counter: bool,
        options: &HintOptions,
    ) -> Self {
        let count = stems.len();
        let mut conflicts = vec![HintMask::new(); count];
        let mut substitutes = vec![HintMask::new(); count];
        for i in 0..count {
            for j in 0..count {
                if i == j {
                    continue;
                }
                let (a, b) = (&stems[i], &stems[j]);
                if a.conflicts_with(b, options.conflict_margin) {
                    conflicts[i].insert(j);
                }
                if let (Some(edge), None) = (a.real_edge(), b.ghost) {
                    let shares_edge = match a.ghost {
                        Some(GhostEdge::Upper) => (b.lower - edge).abs(),
                        _ => (b.upper - edge).abs(),
                    } <= options.span_merge_distance;
                    if shares_edge {
                        substitutes[i].insert(j);
                    }
                }
            }
        }
        Self {
            axis,
            stems,
            priorities,
            conflicts,
            substitutes,
            main,
            counter,
        }
    }

    /// Builds a table from hints already attached to an outline.
    pub fn from_hints(axis: Axis, hints: &AxisHints, options: &HintOptions) -> Self {
        let priorities = vec![0.0; hints.stems.len()];
        Self::new(
            axis,
            hints.stems.clone(),
            priorities,
            hints.start_mask.clone(),
            hints.counter,
            options,
        )
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.conflicts[a].contains(b)
    }

    /// True if `ghost` may be dropped in favor of `real`.
    pub fn substitutes(&self, ghost: usize, real: usize) -> bool {
        self.substitutes[ghost].contains(real)
    }

    pub fn is_conflict_free(&self, mask: &HintMask) -> bool {
        if self.counter {
            return true;
        }
        mask.iter().all(|ix| {
            ix < self.len()
                && mask
                    .iter()
                    .all(|other| other == ix || !self.conflicts(ix, other))
        })
    }

    /// Adds `index` to `mask` if that can be done without a conflict.
    ///
    /// A ghost is absorbed by a real stem sharing its edge: adding the ghost
    /// next to such a stem is a no-op and adding the real stem replaces the
    /// ghost.
    pub fn add(&self, mask: &mut HintMask, index: usize) -> bool {
        if mask.contains(index) {
            return true;
        }
        let clashes: Vec<usize> = mask.iter().filter(|m| self.conflicts(index, *m)).collect();
        if clashes.is_empty() {
            mask.insert(index);
            return true;
        }
        if clashes.iter().all(|m| self.substitutes(index, *m)) {
            return true;
        }
        if clashes.iter().all(|m| self.substitutes(*m, index)) {
            for m in clashes {
                mask.remove(m);
            }
            mask.insert(index);
            return true;
        }
        false
    }

    /// Union of two masks, or `None` if they conflict.
    pub fn try_union(&self, base: &HintMask, add: &HintMask) -> Option<HintMask> {
        let mut result = base.clone();
        for index in add.iter() {
            if !self.add(&mut result, index) {
                return None;
            }
        }
        Some(result)
    }

    /// Adds every member of `add` that fits into `base`, skipping the rest.
    pub fn union_lossy(&self, base: &HintMask, add: &HintMask) -> HintMask {
        let mut result = base.clone();
        for index in add.iter() {
            self.add(&mut result, index);
        }
        result
    }

    /// Drops stems not in `used`, renumbering the rest.
    ///
    /// Returns the old-to-new index map.
    pub fn compact(&self, used: &HintMask) -> (Vec<Stem>, Vec<Option<usize>>) {
        let mut map = vec![None; self.len()];
        let mut stems = Vec::with_capacity(used.len());
        for index in used.iter().filter(|ix| *ix < self.len()) {
            map[index] = Some(stems.len());
            stems.push(self.stems[index]);
        }
        (stems, map)
    }
}

/// A stem wanted at a position, with the evidence for it.
#[derive(Copy, Clone, Debug)]
struct Wanted {
    index: usize,
    flatness: f64,
    /// The span was produced by this element rather than a neighbor.
    anchored: bool,
}

/// Builds the stem table and per-position masks for one axis.
pub(crate) struct MaskBuilder<'a> {
    pub outline: &'a Outline,
    pub result: &'a AxisResult,
    pub options: &'a HintOptions,
}

impl MaskBuilder<'_> {
    /// Returns the table and the mask desired at each outline position,
    /// indexed by [`Outline::position`].
    pub fn build(&self, report: &mut Report) -> (StemTable, Vec<HintMask>) {
        let result = self.result;
        let mut indexable: Vec<CandId> = result.main.clone();
        if !result.counter {
            indexable.extend(
                result
                    .spans
                    .positions()
                    .iter()
                    .filter_map(|(_, span)| result.winner(*span)),
            );
        }
        // sorting by location keeps indices stable across runs
        let mut keyed: BTreeMap<(OrderedFloat<f64>, OrderedFloat<f64>, Option<GhostEdge>), f64> =
            BTreeMap::new();
        for id in &indexable {
            let cand = &result.candidates[*id];
            let priority = keyed
                .entry((OrderedFloat(cand.lower), OrderedFloat(cand.upper), cand.ghost))
                .or_default();
            *priority = priority.max(cand.priority(self.options));
        }
        let index_of: HashMap<_, usize> = keyed
            .keys()
            .enumerate()
            .map(|(ix, key)| (*key, ix))
            .collect();
        let cand_index = |id: CandId| {
            let cand = &result.candidates[id];
            index_of[&(OrderedFloat(cand.lower), OrderedFloat(cand.upper), cand.ghost)]
        };
        let stems: Vec<Stem> = keyed
            .keys()
            .map(|(lower, upper, ghost)| Stem {
                lower: lower.0,
                upper: upper.0,
                ghost: *ghost,
            })
            .collect();
        let priorities: Vec<f64> = keyed.values().copied().collect();
        let main: HintMask = result.main.iter().map(|id| cand_index(*id)).collect();
        let table = StemTable::new(
            result.axis,
            stems,
            priorities,
            main,
            result.counter,
            self.options,
        );

        let mut desired = vec![HintMask::new(); self.outline.element_count()];
        if result.counter {
            return (table, desired);
        }
        let mut wanted: Vec<Vec<Wanted>> = vec![Vec::new(); desired.len()];
        for &(element, span) in result.spans.positions() {
            let Some(winner) = result.winner(span) else {
                continue;
            };
            let original = result.spans.get(span);
            wanted[self.outline.position(element)].push(Wanted {
                index: cand_index(winner),
                flatness: original.bonus,
                anchored: original.primary() == Some(element),
            });
        }
        for (position, wants) in wanted.iter().enumerate() {
            if wants.is_empty() {
                continue;
            }
            let mut mask: HintMask = wants.iter().map(|w| w.index).collect();
            if let Some(element) = self.outline.id_at(position) {
                self.resolve_conflicts(&table, element, wants, &mut mask, report);
            }
            desired[position] = mask;
        }
        (table, desired)
    }

    /// Removes stems from `mask` until it is conflict free.
    fn resolve_conflicts(
        &self,
        table: &StemTable,
        element: ElementId,
        wants: &[Wanted],
        mask: &mut HintMask,
        report: &mut Report,
    ) {
        let axis = table.axis;
        while let Some((a, b)) = first_conflict(table, mask) {
            let range = |ix: usize| (table.stems[ix].lower, table.stems[ix].upper);
            if table.substitutes(a, b) {
                mask.remove(a);
                continue;
            }
            if table.substitutes(b, a) {
                mask.remove(b);
                continue;
            }
            let (va, vb) = (table.priorities[a], table.priorities[b]);
            let ratio = self.options.conflict_value_ratio;
            if va >= vb * ratio {
                mask.remove(b);
                continue;
            }
            if vb >= va * ratio {
                mask.remove(a);
                continue;
            }
            let evidence = |ix: usize| {
                let mut flatness = 0.0f64;
                let mut anchored = false;
                for want in wants.iter().filter(|w| w.index == ix) {
                    flatness = flatness.max(want.flatness);
                    anchored |= want.anchored;
                }
                (flatness, anchored)
            };
            let ((fa, anchored_a), (fb, anchored_b)) = (evidence(a), evidence(b));
            let by_flatness = if (fa - fb).abs() >= self.options.conflict_flatness_difference {
                Some(if fa > fb { a } else { b })
            } else {
                None
            };
            let by_anchor = match (anchored_a, anchored_b) {
                (true, false) => Some(a),
                (false, true) => Some(b),
                _ => None,
            };
            if let (Some(x), Some(y)) = (by_flatness, by_anchor) {
                if x != y {
                    report.push(ReportEntry::RuleDisagreement {
                        axis,
                        position: element,
                        first: range(a),
                        second: range(b),
                    });
                }
            }
            match by_flatness.or(by_anchor) {
                Some(keep) => {
                    mask.remove(if keep == a { b } else { a });
                }
                None => {
                    report.push(ReportEntry::UnresolvedConflict {
                        axis,
                        position: element,
                        first: range(a),
                        second: range(b),
                    });
                    mask.remove(a);
                    mask.remove(b);
                }
            }
        }
    }
}

fn first_conflict(table: &StemTable, mask: &HintMask) -> Option<(usize, usize)> {
    mask.iter().find_map(|a| {
        mask.iter()
            .filter(|b| *b > a)
            .find(|b| table.conflicts(a, *b))
            .map(|b| (a, b))
    })
}

/// Checks hints already attached to an outline, reporting any mask that
/// holds conflicting or unknown stems.
pub(crate) fn check_existing(outline: &Outline, options: &HintOptions, report: &mut Report) {
    for axis in Axis::ALL {
        let hints = outline.hints(axis);
        if hints.counter {
            continue;
        }
        let table = StemTable::from_hints(axis, hints, options);
        if !table.is_conflict_free(&hints.start_mask) {
            report.push(ReportEntry::InconsistentExistingHints {
                axis,
                position: None,
            });
        }
        for id in outline.ids() {
            let Some(masks) = &outline.element(id).hint_mask else {
                continue;
            };
            if !table.is_conflict_free(masks.get(axis)) {
                report.push(ReportEntry::InconsistentExistingHints {
                    axis,
                    position: Some(id),
                });
            }
        }
    }
}

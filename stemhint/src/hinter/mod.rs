//! Stem hinting for a single axis.
//!
//! The pipeline runs once per axis over a read only outline:
//!
//! 1. extract flat spans and clean them up ([`spans`])
//! 2. pair spans into scored candidates and add ghosts ([`candidates`])
//! 3. prune, associate spans with their best candidate, merge neighbors
//! 4. select the main stems, falling back to the bounding box, and try
//!    counter hinting ([`select`])
//!
//! Flex detection ([`flex`]) edits the outline and therefore runs before
//! either axis is hinted.

pub(crate) mod candidates;
pub(crate) mod flex;
pub(crate) mod select;
pub(crate) mod spans;

use crate::{
    outline::{ElementId, Outline},
    params::{HintOptions, HintParameters},
    report::{Report, ReportEntry},
    Axis,
};

use candidates::{CandId, CandidateBuilder, StemCandidate};
use select::Selector;
use spans::{SpanArena, SpanExtractor};

/// Everything computed for one axis.
#[derive(Clone, Debug)]
pub(crate) struct AxisResult {
    pub axis: Axis,
    pub spans: SpanArena,
    pub candidates: Vec<StemCandidate>,
    pub main: Vec<CandId>,
    pub counter: bool,
}

impl AxisResult {
    fn empty(axis: Axis) -> Self {
        Self {
            axis,
            spans: SpanArena::default(),
            candidates: Vec::new(),
            main: Vec::new(),
            counter: false,
        }
    }

    /// The candidate chosen for the span recorded at a position, if any.
    pub fn winner(&self, span: spans::SpanId) -> Option<CandId> {
        let span = self.spans.get(self.spans.resolve(span));
        if span.deleted {
            return None;
        }
        let id = candidates::root(&self.candidates, span.winner?);
        (!self.candidates[id].pruned).then_some(id)
    }

    /// Candidates that survived pruning and merging.
    pub fn active(&self) -> impl Iterator<Item = CandId> + '_ {
        (0..self.candidates.len()).filter(|id| self.candidates[*id].is_active())
    }

    /// Subpaths containing the elements of a span.
    pub fn span_subpaths(&self, span: spans::SpanId) -> impl Iterator<Item = usize> + '_ {
        self.spans
            .get(span)
            .elements
            .iter()
            .flatten()
            .map(|id: &ElementId| id.subpath)
    }

    pub fn remap_subpaths(&mut self, new_index_of: &[usize]) {
        self.spans.remap_subpaths(new_index_of);
    }
}

/// Computes stems for one axis of an outline.
pub(crate) struct AxisHinter<'a> {
    pub outline: &'a Outline,
    pub axis: Axis,
    pub params: &'a HintParameters,
    pub options: &'a HintOptions,
    pub clockwise: bool,
    pub inflections_split: bool,
}

impl AxisHinter<'_> {
    pub fn run(&self, report: &mut Report) -> AxisResult {
        let axis = self.axis;
        let axis_params = self.params.axis(axis);
        let mut spans = SpanExtractor {
            outline: self.outline,
            axis,
            clockwise: self.clockwise,
            options: self.options,
            inflections_split: self.inflections_split,
        }
        .extract();
        let count = spans.live_count();
        if count > self.options.max_spans {
            report.push(ReportEntry::SpanCeiling {
                axis,
                count,
                limit: self.options.max_spans,
            });
            return AxisResult::empty(axis);
        }
        let mut candidates = CandidateBuilder {
            axis,
            params: axis_params,
            fuzz: self.params.blue_fuzz,
            options: self.options,
        }
        .generate(&mut spans, report);
        candidates::prune(self.outline, &spans, &mut candidates, self.options);
        candidates::associate(&mut spans, &mut candidates, self.options);
        candidates::merge(self.outline, &spans, &mut candidates, self.options);
        let selection = Selector {
            outline: self.outline,
            axis,
            params: axis_params,
            options: self.options,
        }
        .select(&mut spans, &mut candidates, report);
        log::debug!(
            "{axis} axis: {} spans, {} candidates, {} main stems",
            count,
            candidates.len(),
            selection.main.len()
        );
        AxisResult {
            axis,
            spans,
            candidates,
            main: selection.main,
            counter: selection.counter,
        }
    }
}

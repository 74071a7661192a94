//! Subpath ordering advice.
//!
//! Subpaths that share stems are best drawn one after another so the mask
//! in effect for one is still useful for the next. The advisor builds a
//! linkage weight between every pair of subpaths from the stems that span
//! them and orders subpaths greedily by that weight.

use crate::hinter::AxisResult;

/// Pairwise linkage between subpaths.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Linkage {
    count: usize,
    weights: Vec<f64>,
}

impl Linkage {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            weights: vec![0.0; count * count],
        }
    }

    /// Builds the linkage from the candidates that survived on each axis.
    pub fn from_results(count: usize, results: &[AxisResult]) -> Self {
        let mut linkage = Self::new(count);
        for result in results {
            for id in result.active() {
                let cand = &result.candidates[id];
                for a in result.span_subpaths(cand.lower_span) {
                    for b in result.span_subpaths(cand.upper_span) {
                        linkage.link(a, b, 1.0);
                    }
                }
            }
        }
        linkage
    }

    pub fn link(&mut self, a: usize, b: usize, weight: f64) {
        if a == b || a >= self.count || b >= self.count {
            return;
        }
        self.weights[a * self.count + b] += weight;
        self.weights[b * self.count + a] += weight;
    }

    pub fn weight(&self, a: usize, b: usize) -> f64 {
        self.weights[a * self.count + b]
    }

    /// Greedy order: repeatedly take the unplaced subpath with the most
    /// linkage to those already placed, lowest index first on ties.
    ///
    /// Returns old subpath indices in their new order.
    pub fn order(&self) -> Vec<usize> {
        let mut placed = vec![false; self.count];
        let mut order = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            let mut best: Option<(usize, f64)> = None;
            for candidate in (0..self.count).filter(|ix| !placed[*ix]) {
                let total: f64 = order.iter().map(|p| self.weight(candidate, *p)).sum();
                if best.map_or(true, |(_, weight)| total > weight) {
                    best = Some((candidate, total));
                }
            }
            let Some((next, _)) = best else {
                break;
            };
            placed[next] = true;
            order.push(next);
        }
        order
    }
}

/// Returns the advised subpath order, or `None` if the current order is
/// already the advised one.
pub(crate) fn advise(count: usize, results: &[AxisResult]) -> Option<Vec<usize>> {
    let order = Linkage::from_results(count, results).order();
    let identity = order.iter().enumerate().all(|(ix, old)| ix == *old);
    (!identity).then_some(order)
}

/// Inverts an order: the new index of each old subpath.
pub(crate) fn new_index_of(order: &[usize]) -> Vec<usize> {
    let mut result = vec![0; order.len()];
    for (new, old) in order.iter().enumerate() {
        result[*old] = new;
    }
    result
}

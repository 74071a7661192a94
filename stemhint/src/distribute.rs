//! Distributes stems over the outline as a sequence of hint masks.
//!
//! Positions are visited in path order. The running mask grows as long as
//! the stems wanted at each position fit alongside it; when they do not, a
//! new mask starts. Short elements are not allowed to force a change on
//! their own: their wishes are collected against a snapshot and reconciled
//! when the next ordinary element arrives.

use crate::{geom, mask::HintMask, params::HintOptions, stems::StemTable};

/// What the distributor needs to know about one outline position.
#[derive(Clone, Debug, Default)]
pub(crate) struct PositionInfo {
    /// Stems wanted here, per axis.
    pub desired: [HintMask; 2],
    /// Location range covered by the element, per axis.
    pub extent: [(f64, f64); 2],
    /// Too short to anchor a mask change.
    pub short: bool,
    /// A mask change may take effect here.
    pub breakable: bool,
}

/// The masks chosen for an outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Distribution {
    pub start: [HintMask; 2],
    /// Mask changes as `(position, masks)`, in path order.
    pub changes: Vec<(usize, [HintMask; 2])>,
}

impl Distribution {
    /// All masks, starting with the start mask.
    pub fn masks(&self) -> impl Iterator<Item = &[HintMask; 2]> + '_ {
        std::iter::once(&self.start).chain(self.changes.iter().map(|(_, masks)| masks))
    }

    /// Rewrites stem indices for one axis.
    pub fn remap(&mut self, axis: usize, map: &[Option<usize>]) {
        self.start[axis] = self.start[axis].remap(map);
        for (_, masks) in &mut self.changes {
            masks[axis] = masks[axis].remap(map);
        }
    }
}

#[derive(Clone, Debug)]
struct Run {
    start: usize,
    masks: [HintMask; 2],
}

/// Wishes of consecutive short elements, pending reconciliation.
#[derive(Clone, Debug)]
struct ShortRun {
    /// First position in the run where a change may take effect.
    break_at: Option<usize>,
    snapshot: [HintMask; 2],
    pending: [HintMask; 2],
}

#[derive(Clone, Debug)]
enum Mode {
    /// The running mask is anchored by an ordinary element.
    Stable,
    /// Collecting wishes of short elements.
    ShortRun(ShortRun),
    /// No usable anchor: masks are replaced rather than bridged.
    HardConflict,
}

pub(crate) struct Distributor<'a> {
    tables: [&'a StemTable; 2],
    options: &'a HintOptions,
    runs: Vec<Run>,
    mode: Mode,
}

impl<'a> Distributor<'a> {
    pub fn new(tables: [&'a StemTable; 2], options: &'a HintOptions) -> Self {
        Self {
            tables,
            options,
            runs: vec![Run {
                start: 0,
                masks: Default::default(),
            }],
            mode: Mode::HardConflict,
        }
    }

    /// Visits every position and returns the resulting masks.
    ///
    /// With `fold_main`, the main stems are added to every mask where they
    /// fit, not only to the start mask.
    pub fn run(mut self, positions: &[PositionInfo], fold_main: bool) -> Distribution {
        for (position, info) in positions.iter().enumerate() {
            self.step(position, info);
        }
        if let Mode::ShortRun(run) = std::mem::replace(&mut self.mode, Mode::Stable) {
            self.mode = self.close_short_run(run);
        }
        self.finish(fold_main)
    }

    fn step(&mut self, position: usize, info: &PositionInfo) {
        let mode = std::mem::replace(&mut self.mode, Mode::Stable);
        self.mode = match mode {
            Mode::Stable if info.short => {
                let run = ShortRun {
                    break_at: None,
                    snapshot: self.current().clone(),
                    pending: Default::default(),
                };
                Mode::ShortRun(self.extend_short_run(run, position, info))
            }
            Mode::Stable => self.absorb(position, info, true),
            Mode::ShortRun(run) if info.short => {
                Mode::ShortRun(self.extend_short_run(run, position, info))
            }
            Mode::ShortRun(run) => {
                self.mode = self.close_short_run(run);
                return self.step(position, info);
            }
            Mode::HardConflict if info.short => {
                let current = self.current().clone();
                *self.current_mut() = self.union_lossy(&current, &info.desired);
                Mode::HardConflict
            }
            Mode::HardConflict => self.absorb(position, info, false),
        };
    }

    /// Adds the wishes of an ordinary element to the running mask, starting
    /// a new mask if they conflict.
    fn absorb(&mut self, position: usize, info: &PositionInfo, bridge: bool) -> Mode {
        let current = self.current().clone();
        if let Some(merged) = self.try_union(&current, &info.desired) {
            *self.current_mut() = merged;
            return Mode::Stable;
        }
        if !info.breakable {
            *self.current_mut() = self.union_lossy(&current, &info.desired);
            return Mode::Stable;
        }
        let masks = if bridge {
            [0, 1].map(|axis| self.bridge(axis, &current[axis], &info.desired[axis], info.extent[axis]))
        } else {
            info.desired.clone()
        };
        log::trace!("mask change at position {position}");
        self.begin(position, masks);
        Mode::Stable
    }

    fn extend_short_run(&self, mut run: ShortRun, position: usize, info: &PositionInfo) -> ShortRun {
        run.pending = self.union_lossy(&run.pending, &info.desired);
        if run.break_at.is_none() && info.breakable {
            run.break_at = Some(position);
        }
        run
    }

    /// Folds a finished short run into the running mask, or starts a new
    /// mask at the run if its wishes conflict with the snapshot.
    fn close_short_run(&mut self, run: ShortRun) -> Mode {
        if let Some(merged) = self.try_union(&run.snapshot, &run.pending) {
            *self.current_mut() = merged;
            return Mode::Stable;
        }
        match run.break_at {
            Some(start) => {
                log::trace!("short run conflicts with its snapshot; mask change at {start}");
                self.begin(start, run.pending);
            }
            None => {
                *self.current_mut() = self.union_lossy(&run.snapshot, &run.pending);
            }
        }
        Mode::HardConflict
    }

    /// Keeps stems of the previous mask that are near the element and fit
    /// alongside the new wishes.
    fn bridge(&self, axis: usize, previous: &HintMask, desired: &HintMask, extent: (f64, f64)) -> HintMask {
        let table = self.tables[axis];
        let distance = self.options.bridge_distance;
        let mut result = desired.clone();
        for index in previous.iter() {
            let Some(stem) = table.stems.get(index) else {
                continue;
            };
            let near = geom::ranges_overlap((stem.lower - distance, stem.upper + distance), extent);
            if near {
                let mut candidate = result.clone();
                if table.add(&mut candidate, index) && table.is_conflict_free(&candidate) {
                    result = candidate;
                }
            }
        }
        result
    }

    fn begin(&mut self, start: usize, masks: [HintMask; 2]) {
        match self.runs.last_mut() {
            Some(last) if last.start == start => last.masks = masks,
            _ => self.runs.push(Run { start, masks }),
        }
    }

    fn current(&self) -> &[HintMask; 2] {
        // the first run always exists
        &self.runs[self.runs.len() - 1].masks
    }

    fn current_mut(&mut self) -> &mut [HintMask; 2] {
        let last = self.runs.len() - 1;
        &mut self.runs[last].masks
    }

    fn try_union(&self, base: &[HintMask; 2], add: &[HintMask; 2]) -> Option<[HintMask; 2]> {
        let horizontal = self.tables[0].try_union(&base[0], &add[0])?;
        let vertical = self.tables[1].try_union(&base[1], &add[1])?;
        Some([horizontal, vertical])
    }

    fn union_lossy(&self, base: &[HintMask; 2], add: &[HintMask; 2]) -> [HintMask; 2] {
        [0, 1].map(|axis| self.tables[axis].union_lossy(&base[axis], &add[axis]))
    }

    fn finish(self, fold_main: bool) -> Distribution {
        let mut runs = self.runs;
        for (ix, run) in runs.iter_mut().enumerate() {
            for (axis, table) in self.tables.iter().enumerate() {
                if table.counter {
                    run.masks[axis] = HintMask::all(table.len());
                } else if ix == 0 || fold_main {
                    run.masks[axis] = table.union_lossy(&run.masks[axis], &table.main);
                }
            }
        }
        // a change to an identical mask is no change
        runs.dedup_by(|later, earlier| later.masks == earlier.masks);
        let mut runs = runs.into_iter();
        let start = runs.next().map(|run| run.masks).unwrap_or_default();
        Distribution {
            start,
            changes: runs.map(|run| (run.start, run.masks)).collect(),
        }
    }
}

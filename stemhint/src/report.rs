//! Structured diagnostics produced while hinting a glyph.
//!
//! Nothing here is formatted for end users; the report is handed back to the
//! caller alongside the hinted outline. Each entry is also forwarded to the
//! [`log`] facade at a level matching its [`Severity`] when recorded.

use crate::{error::ConfigError, outline::ElementId, params::AlignmentZone, Axis};

/// How loudly an entry is logged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Detail,
    Info,
    Warning,
}

/// Where a stem came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StemKind {
    /// Both edges come from straight elements.
    Line,
    /// At least one edge comes from a curve.
    Curve,
    /// One edge is synthetic, anchored to an alignment zone.
    Ghost,
    /// Synthesized from the bounding box because nothing else survived.
    BoundingBox,
}

/// A single diagnostic.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportEntry {
    /// A stem chosen for the final set.
    Stem {
        axis: Axis,
        lower: f64,
        upper: f64,
        kind: StemKind,
        value: f64,
        special: u32,
    },
    /// A flat edge just outside an alignment zone.
    ZoneNearMiss {
        axis: Axis,
        location: f64,
        zone: AlignmentZone,
    },
    /// A stem width close to, but not matching, a dominant width.
    WidthNearMiss {
        axis: Axis,
        width: f64,
        dominant: f64,
    },
    /// Three stems that were almost evenly spaced.
    CounterNearMiss { axis: Axis, difference: f64 },
    /// The axis was counter hinted.
    CounterHinted { axis: Axis, stems: usize },
    /// Two stems wanted at the same position could not be reconciled and
    /// were both dropped there.
    UnresolvedConflict {
        axis: Axis,
        position: ElementId,
        first: (f64, f64),
        second: (f64, f64),
    },
    /// The geometric tie-break rules disagreed about a conflict.
    RuleDisagreement {
        axis: Axis,
        position: ElementId,
        first: (f64, f64),
        second: (f64, f64),
    },
    /// Too many flat spans; stems were not computed for this axis.
    SpanCeiling {
        axis: Axis,
        count: usize,
        limit: usize,
    },
    /// A subpath with no extent was ignored.
    DegenerateSubpath { subpath: usize },
    /// No candidate survived and the bounding box was used instead.
    BoundingBoxFallback { axis: Axis },
    /// Pre-existing hints contain a conflicting mask.
    InconsistentExistingHints {
        axis: Axis,
        position: Option<ElementId>,
    },
    /// An invalid configuration entry was dropped.
    ConfigRepaired(ConfigError),
    /// A pair of curves was marked as a flex feature.
    FlexAdded { axis: Axis, position: ElementId },
    /// Subpaths were reordered to reduce hint mask changes.
    SubpathsReordered { order: Vec<usize> },
}

impl ReportEntry {
    pub fn severity(&self) -> Severity {
        match self {
            ReportEntry::Stem { .. }
            | ReportEntry::FlexAdded { .. }
            | ReportEntry::SubpathsReordered { .. }
            | ReportEntry::CounterHinted { .. } => Severity::Detail,
            ReportEntry::ZoneNearMiss { .. }
            | ReportEntry::WidthNearMiss { .. }
            | ReportEntry::CounterNearMiss { .. }
            | ReportEntry::RuleDisagreement { .. }
            | ReportEntry::DegenerateSubpath { .. }
            | ReportEntry::BoundingBoxFallback { .. } => Severity::Info,
            ReportEntry::UnresolvedConflict { .. }
            | ReportEntry::SpanCeiling { .. }
            | ReportEntry::InconsistentExistingHints { .. }
            | ReportEntry::ConfigRepaired(_) => Severity::Warning,
        }
    }
}

impl std::fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportEntry::Stem {
                axis,
                lower,
                upper,
                kind,
                value,
                special,
            } => write!(
                f,
                "{axis} stem {lower}..{upper} ({kind:?}, value {value:.2}, special {special})"
            ),
            ReportEntry::ZoneNearMiss {
                axis,
                location,
                zone,
            } => write!(
                f,
                "{axis} edge at {location} is near the {:?} zone {}..{}",
                zone.kind, zone.bottom, zone.top
            ),
            ReportEntry::WidthNearMiss {
                axis,
                width,
                dominant,
            } => write!(
                f,
                "{axis} stem width {width} is close to dominant width {dominant}"
            ),
            ReportEntry::CounterNearMiss { axis, difference } => write!(
                f,
                "{axis} counter hint near miss, spacing differs by {difference}"
            ),
            ReportEntry::CounterHinted { axis, stems } => {
                write!(f, "{axis} axis counter hinted with {stems} stems")
            }
            ReportEntry::UnresolvedConflict {
                axis,
                position,
                first,
                second,
            } => write!(
                f,
                "unresolved {axis} conflict at {position} between {}..{} and {}..{}",
                first.0, first.1, second.0, second.1
            ),
            ReportEntry::RuleDisagreement {
                axis,
                position,
                first,
                second,
            } => write!(
                f,
                "{axis} conflict rules disagree at {position} for {}..{} and {}..{}",
                first.0, first.1, second.0, second.1
            ),
            ReportEntry::SpanCeiling { axis, count, limit } => write!(
                f,
                "{axis} axis has {count} flat spans (limit {limit}); skipping stems"
            ),
            ReportEntry::DegenerateSubpath { subpath } => {
                write!(f, "subpath {subpath} is degenerate")
            }
            ReportEntry::BoundingBoxFallback { axis } => {
                write!(f, "no {axis} stems found; using bounding box")
            }
            ReportEntry::InconsistentExistingHints { axis, position } => match position {
                Some(position) => write!(f, "existing {axis} hints conflict at {position}"),
                None => write!(f, "existing {axis} start mask contains conflicting stems"),
            },
            ReportEntry::ConfigRepaired(err) => write!(f, "ignoring {err}"),
            ReportEntry::FlexAdded { axis, position } => {
                write!(f, "{axis} flex added at {position}")
            }
            ReportEntry::SubpathsReordered { order } => {
                write!(f, "subpaths reordered to {order:?}")
            }
        }
    }
}

/// Ordered collection of diagnostics for one glyph.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Records an entry, logging it at the matching level.
    pub fn push(&mut self, entry: ReportEntry) {
        match entry.severity() {
            Severity::Detail => log::debug!("{entry}"),
            Severity::Info => log::info!("{entry}"),
            Severity::Warning => log::warn!("{entry}"),
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at or above the given severity.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &ReportEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.severity() >= severity)
    }

    pub(crate) fn extend(&mut self, other: Report) {
        self.entries.extend(other.entries);
    }
}

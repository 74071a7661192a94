//! Automatic PostScript stem hints and hint masks for glyph outlines.
//!
//! Given a glyph [`Outline`] and per-glyph [`HintParameters`] (alignment
//! zones, dominant stem widths, a few flags), the hinter finds the
//! horizontal and vertical stems of the glyph and decides which of them are
//! active at each point of the outline. The result is attached to a copy of
//! the outline: a list of [`Stem`]s and a start mask per axis, plus a
//! [`MaskPair`] on every element where the active set changes.
//!
//! ```
//! use stemhint::{hint_glyph, kurbo::BezPath, Axis, HintParameters, Outline};
//!
//! let mut path = BezPath::new();
//! path.move_to((100.0, 0.0));
//! path.line_to((180.0, 0.0));
//! path.line_to((180.0, 700.0));
//! path.line_to((100.0, 700.0));
//! path.close_path();
//! let outline = Outline::from_bezpath(&path).unwrap();
//! let hinted = hint_glyph(&outline, &HintParameters::default()).unwrap();
//! let stems = &hinted.outline.hints(Axis::Vertical).stems;
//! assert_eq!((stems[0].lower, stems[0].upper), (100.0, 180.0));
//! ```
//!
//! Reading and writing font data is out of scope; outlines can be drawn
//! into an [`OutlineBuilder`] from any source implementing the
//! [`font_types::Pen`] protocol, and masks can be packed with
//! [`HintMask::to_bytes`].

#![forbid(unsafe_code)]

mod axis;
mod distribute;
mod error;
mod geom;
mod hint;
mod hinter;
mod mask;
mod order;
mod outline;
mod params;
mod report;
pub mod stats;
mod stems;

pub use axis::Axis;
pub use error::{ConfigError, HintError, MalformedPath};
pub use hint::{hint_glyph, HintedGlyph, Hinter};
pub use mask::{HintMask, MaskPair};
pub use outline::{ElementId, ElementKind, FlexHalf, FlexMark, Outline, OutlineBuilder, PathElement, Subpath};
pub use params::{AlignmentZone, AxisParameters, HintOptions, HintParameters, ZoneKind};
pub use report::{Report, ReportEntry, Severity, StemKind};
pub use stems::{AxisHints, GhostEdge, Stem};

pub use kurbo;

//! Errors that can occur while building outlines or hinting a glyph.
//!
//! Only malformed input and invalid configuration are errors. Geometry
//! anomalies, unresolved mask conflicts and resource ceilings are recorded
//! in the glyph's [`Report`](crate::Report) instead.

use crate::Axis;

/// An error if an input path can not be turned into an [`Outline`](crate::Outline).
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum MalformedPath {
    /// A drawing command arrived before any move.
    MissingMove,
    /// A subpath contained no line or curve elements.
    EmptySubpath(usize),
    /// A coordinate was NaN or infinite.
    NonFiniteCoordinate { subpath: usize, element: usize },
}

/// Invalid per-glyph hinting parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    /// An alignment zone has `bottom > top` or a non-finite edge.
    InvalidZone {
        axis: Axis,
        index: usize,
        bottom: f64,
        top: f64,
    },
    /// Two alignment zones overlap.
    OverlappingZones {
        axis: Axis,
        first: usize,
        second: usize,
    },
    /// A dominant stem width is not a positive, finite number.
    InvalidStemWidth { axis: Axis, index: usize, width: f64 },
    /// The blue fuzz tolerance is negative or non-finite.
    InvalidBlueFuzz(f64),
}

/// An error that prevented a glyph from being hinted.
#[derive(Clone, Debug, PartialEq)]
pub enum HintError {
    Config(ConfigError),
    Path(MalformedPath),
}

impl std::fmt::Display for MalformedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedPath::MissingMove => write!(f, "path does not begin with a move"),
            MalformedPath::EmptySubpath(ix) => write!(f, "subpath {ix} has no elements"),
            MalformedPath::NonFiniteCoordinate { subpath, element } => write!(
                f,
                "non-finite coordinate in subpath {subpath} at element {element}"
            ),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidZone {
                axis,
                index,
                bottom,
                top,
            } => write!(
                f,
                "invalid {axis} alignment zone {index}: bottom {bottom} top {top}"
            ),
            ConfigError::OverlappingZones {
                axis,
                first,
                second,
            } => write!(f, "{axis} alignment zones {first} and {second} overlap"),
            ConfigError::InvalidStemWidth { axis, index, width } => {
                write!(f, "invalid {axis} dominant stem width {index}: {width}")
            }
            ConfigError::InvalidBlueFuzz(fuzz) => write!(f, "invalid blue fuzz {fuzz}"),
        }
    }
}

impl std::fmt::Display for HintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HintError::Config(err) => write!(f, "configuration error: {err}"),
            HintError::Path(err) => write!(f, "malformed outline: {err}"),
        }
    }
}

impl std::error::Error for MalformedPath {}
impl std::error::Error for ConfigError {}

impl std::error::Error for HintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HintError::Config(err) => Some(err),
            HintError::Path(err) => Some(err),
        }
    }
}

impl From<ConfigError> for HintError {
    fn from(value: ConfigError) -> Self {
        HintError::Config(value)
    }
}

impl From<MalformedPath> for HintError {
    fn from(value: MalformedPath) -> Self {
        HintError::Path(value)
    }
}

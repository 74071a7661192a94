//! Hinting parameters and tuning options.
//!
//! [`HintParameters`] is the per-glyph configuration normally resolved from a
//! font's private dictionary or fontinfo file: alignment zones, dominant stem
//! widths and a handful of behavioural flags. [`HintOptions`] holds the
//! numeric tolerances that drive the heuristics; the defaults are tuned for
//! fonts with 1000 units per em.

use crate::{
    error::ConfigError,
    report::{Report, ReportEntry},
    Axis,
};

/// Which kind of edge an alignment zone captures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneKind {
    /// A zone such as the baseline; captures the lower edge of a stem.
    Bottom,
    /// A zone such as x-height or cap-height; captures the upper edge.
    Top,
}

/// A `[bottom, top]` band of locations that receive preferential treatment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentZone {
    pub bottom: f64,
    pub top: f64,
    pub kind: ZoneKind,
}

impl AlignmentZone {
    pub fn new(bottom: f64, top: f64, kind: ZoneKind) -> Self {
        Self { bottom, top, kind }
    }

    /// Returns true if `loc` falls inside the zone widened by `fuzz`.
    pub fn contains(&self, loc: f64, fuzz: f64) -> bool {
        loc >= self.bottom - fuzz && loc <= self.top + fuzz
    }

    /// Distance from `loc` to the zone, or zero if inside.
    pub fn distance(&self, loc: f64) -> f64 {
        if loc < self.bottom {
            self.bottom - loc
        } else if loc > self.top {
            loc - self.top
        } else {
            0.0
        }
    }

    fn is_valid(&self) -> bool {
        self.bottom.is_finite() && self.top.is_finite() && self.bottom <= self.top
    }
}

/// Configuration for a single axis.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisParameters {
    /// Preferred stem widths for this axis.
    pub dominant_stems: Vec<f64>,
    /// Alignment zones; normally only present on the horizontal axis.
    pub zones: Vec<AlignmentZone>,
    /// True if this glyph is a candidate for counter hinting on this axis.
    pub counter_hint: bool,
}

impl AxisParameters {
    /// Returns the zone capturing an edge at `loc`, given which side of the
    /// stem the edge is on.
    pub fn zone_for_edge(&self, loc: f64, is_lower: bool, fuzz: f64) -> Option<&AlignmentZone> {
        let kind = if is_lower {
            ZoneKind::Bottom
        } else {
            ZoneKind::Top
        };
        self.zones
            .iter()
            .find(|zone| zone.kind == kind && zone.contains(loc, fuzz))
    }

    /// Returns the dominant width closest to `width`.
    pub fn nearest_dominant(&self, width: f64) -> Option<f64> {
        self.dominant_stems.iter().copied().min_by(|a, b| {
            (a - width)
                .abs()
                .partial_cmp(&(b - width).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Per-glyph hinting parameters.
///
/// This is consumed read only by a hint computation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintParameters {
    pub horizontal: AxisParameters,
    pub vertical: AxisParameters,
    /// Tolerance applied around alignment zones.
    pub blue_fuzz: f64,
    /// Allow flex features to be marked.
    pub flex_allowed: bool,
    /// Leave glyphs that already carry hints untouched.
    pub keep_existing_hints: bool,
    /// Allow the outline to be edited (curve splitting, subpath reordering).
    pub allow_edits: bool,
}

impl Default for HintParameters {
    fn default() -> Self {
        Self {
            horizontal: AxisParameters::default(),
            vertical: AxisParameters::default(),
            // See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#table-16-private-dict-operators>
            blue_fuzz: 1.0,
            flex_allowed: true,
            keep_existing_hints: false,
            allow_edits: false,
        }
    }
}

impl HintParameters {
    pub fn axis(&self, axis: Axis) -> &AxisParameters {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisParameters {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }

    /// Checks the parameters and returns a cleaned copy.
    ///
    /// When `best_effort` is true, invalid entries are dropped and recorded
    /// in `report` instead of producing an error.
    pub fn validate(&self, best_effort: bool, report: &mut Report) -> Result<Self, ConfigError> {
        let mut result = self.clone();
        if !(self.blue_fuzz.is_finite() && self.blue_fuzz >= 0.0) {
            let err = ConfigError::InvalidBlueFuzz(self.blue_fuzz);
            if !best_effort {
                return Err(err);
            }
            report.push(ReportEntry::ConfigRepaired(err));
            result.blue_fuzz = 0.0;
        }
        for axis in Axis::ALL {
            let params = result.axis_mut(axis);
            let mut stems = Vec::with_capacity(params.dominant_stems.len());
            for (index, &width) in params.dominant_stems.iter().enumerate() {
                if width.is_finite() && width > 0.0 {
                    stems.push(width);
                    continue;
                }
                let err = ConfigError::InvalidStemWidth { axis, index, width };
                if !best_effort {
                    return Err(err);
                }
                report.push(ReportEntry::ConfigRepaired(err));
            }
            params.dominant_stems = stems;
            let mut zones: Vec<(usize, AlignmentZone)> = Vec::with_capacity(params.zones.len());
            for (index, zone) in params.zones.iter().enumerate() {
                if !zone.is_valid() {
                    let err = ConfigError::InvalidZone {
                        axis,
                        index,
                        bottom: zone.bottom,
                        top: zone.top,
                    };
                    if !best_effort {
                        return Err(err);
                    }
                    report.push(ReportEntry::ConfigRepaired(err));
                    continue;
                }
                if let Some((first, _)) = zones
                    .iter()
                    .find(|(_, other)| other.bottom <= zone.top && zone.bottom <= other.top)
                {
                    let err = ConfigError::OverlappingZones {
                        axis,
                        first: *first,
                        second: index,
                    };
                    if !best_effort {
                        return Err(err);
                    }
                    report.push(ReportEntry::ConfigRepaired(err));
                    continue;
                }
                zones.push((index, *zone));
            }
            params.zones = zones.into_iter().map(|(_, zone)| zone).collect();
        }
        Ok(result)
    }
}

/// Numeric tolerances and run-wide switches.
///
/// All distances are in font units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintOptions {
    /// Slope (across / along) up to which an edge counts as exactly flat.
    pub flat_slope: f64,
    /// Slope beyond which an edge is not flat at all.
    pub max_flat_slope: f64,
    /// Maximum deviation in location allowed inside a curved flat span.
    pub curve_flat_depth: f64,
    /// Minimum distance between a curve extremum and its endpoints.
    pub extremum_distance: f64,
    /// Half length of a bend span.
    pub bend_length: f64,
    /// Width ratio at which a co-located span dominates a bend span.
    pub bend_dominance: f64,
    /// Locations closer than this are considered the same span location.
    pub span_merge_distance: f64,
    /// Spans shorter than this after merging are discarded; bends are exempt.
    pub min_span_length: f64,
    /// Maximum number of spans per axis before stem synthesis is skipped.
    pub max_spans: usize,
    pub min_stem_width: f64,
    pub max_stem_width: f64,
    /// Pairs involving a bend span that are narrower than this are flares.
    pub max_flare: f64,
    /// Distance scale of the quadratic penalty for non-overlapping pairs.
    pub gap_penalty_distance: f64,
    /// Multiplier applied to the value of special candidates when ranking.
    pub special_factor: f64,
    pub ghost_width: f64,
    pub ghost_value: f64,
    pub ghost_special: u32,
    /// Tolerance for matching a dominant stem width.
    pub dominant_width_tolerance: f64,
    /// Widths within this distance of a dominant width (but not matching)
    /// are reported as near misses.
    pub width_near_miss: f64,
    /// Flat edges within this distance outside a zone are reported.
    pub zone_near_miss: f64,
    pub prune_factor: f64,
    pub prune_distance: f64,
    /// Maximum path length between two spans considered close.
    pub close_path_length: f64,
    pub merge_distance: f64,
    /// Margin kept between main stems during selection.
    pub band_margin: f64,
    /// Margin used when deciding whether two stems conflict.
    pub conflict_margin: f64,
    pub min_main_value: f64,
    /// A pick must have at least `1 / selection_cascade` of the previous
    /// pick's value unless it is special.
    pub selection_cascade: f64,
    /// Value ratio at which the weaker of two conflicting stems is dropped.
    pub conflict_value_ratio: f64,
    /// Flatness difference needed for the geometric conflict tie-break.
    pub conflict_flatness_difference: f64,
    pub counter_tolerance: f64,
    pub counter_near_miss: f64,
    /// Maximum location extent of a flex feature.
    pub max_flex_depth: f64,
    /// Minimum ratio between flex chord length and depth.
    pub flex_ratio: f64,
    pub strict_flex: bool,
    pub suppress_flex: bool,
    /// Elements shorter than this are not allowed to start a new mask.
    pub short_element_length: f64,
    /// Stems within this distance of an element survive a mask break.
    pub bridge_distance: f64,
    /// Fold the main mask into empty runs when the glyph has at most this
    /// many subpaths and edits are allowed.
    pub fold_main_max_subpaths: usize,
    /// Drop invalid configuration instead of failing the glyph.
    pub best_effort: bool,
}

impl Default for HintOptions {
    fn default() -> Self {
        Self {
            flat_slope: 0.05,
            max_flat_slope: 0.2679,
            curve_flat_depth: 3.0,
            extremum_distance: 20.0,
            bend_length: 2.0,
            bend_dominance: 3.0,
            span_merge_distance: 1.0,
            min_span_length: 2.0,
            max_spans: 400,
            min_stem_width: 4.0,
            max_stem_width: 300.0,
            max_flare: 10.0,
            gap_penalty_distance: 40.0,
            special_factor: 20.0,
            ghost_width: 20.0,
            ghost_value: 20.0,
            ghost_special: 2,
            dominant_width_tolerance: 2.0,
            width_near_miss: 6.0,
            zone_near_miss: 6.0,
            prune_factor: 3.0,
            prune_distance: 10.0,
            close_path_length: 100.0,
            merge_distance: 10.0,
            band_margin: 30.0,
            conflict_margin: 2.0,
            min_main_value: 10.0,
            selection_cascade: 200.0,
            conflict_value_ratio: 3.0,
            conflict_flatness_difference: 0.25,
            counter_tolerance: 1.0,
            counter_near_miss: 8.0,
            max_flex_depth: 20.0,
            flex_ratio: 3.0,
            strict_flex: true,
            suppress_flex: false,
            short_element_length: 12.0,
            bridge_distance: 10.0,
            fold_main_max_subpaths: 4,
            best_effort: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn zones() -> Vec<AlignmentZone> {
        vec![
            AlignmentZone::new(-15.0, 0.0, ZoneKind::Bottom),
            AlignmentZone::new(500.0, 515.0, ZoneKind::Top),
        ]
    }

    #[rstest]
    #[case::bottom_edge_in_bottom_zone(-5.0, true, 0.0, true)]
    #[case::top_edge_in_bottom_zone(-5.0, false, 0.0, false)]
    #[case::inside_fuzz(516.0, false, 1.0, true)]
    #[case::outside_fuzz(517.0, false, 1.0, false)]
    #[case::lower_edge_in_top_zone(505.0, true, 1.0, false)]
    fn zone_lookup_respects_polarity(
        #[case] loc: f64,
        #[case] is_lower: bool,
        #[case] fuzz: f64,
        #[case] expected: bool,
    ) {
        let params = AxisParameters {
            zones: zones(),
            ..Default::default()
        };
        assert_eq!(params.zone_for_edge(loc, is_lower, fuzz).is_some(), expected);
    }

    #[test]
    fn invalid_zone_is_an_error() {
        let mut params = HintParameters::default();
        params
            .horizontal
            .zones
            .push(AlignmentZone::new(10.0, 0.0, ZoneKind::Top));
        let mut report = Report::default();
        let err = params.validate(false, &mut report).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidZone { index: 0, .. }));
    }

    #[test]
    fn best_effort_drops_bad_entries() {
        let mut params = HintParameters::default();
        params.horizontal.zones = zones();
        params
            .horizontal
            .zones
            .push(AlignmentZone::new(-5.0, 5.0, ZoneKind::Bottom));
        params.vertical.dominant_stems = vec![80.0, -3.0, f64::NAN];
        let mut report = Report::default();
        let cleaned = params.validate(true, &mut report).unwrap();
        assert_eq!(cleaned.horizontal.zones, zones());
        assert_eq!(cleaned.vertical.dominant_stems, vec![80.0]);
        assert_eq!(report.entries().len(), 3);
    }

    #[test]
    fn nearest_dominant_width() {
        let params = AxisParameters {
            dominant_stems: vec![68.0, 90.0],
            ..Default::default()
        };
        assert_eq!(params.nearest_dominant(85.0), Some(90.0));
        assert_eq!(AxisParameters::default().nearest_dominant(85.0), None);
    }
}

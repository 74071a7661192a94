//! Hinting whole glyphs.

use crate::{
    distribute::{Distributor, PositionInfo},
    error::HintError,
    hinter::{flex, AxisHinter, AxisResult},
    mask::{HintMask, MaskPair},
    order,
    outline::{FlexHalf, Outline},
    params::{HintOptions, HintParameters},
    report::{Report, ReportEntry},
    stems::{self, AxisHints, MaskBuilder},
    Axis,
};

/// A hinted outline and the diagnostics produced while hinting it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintedGlyph {
    pub outline: Outline,
    pub report: Report,
}

/// Computes stem hints and hint masks.
///
/// A hinter holds only [`HintOptions`]; each glyph is hinted independently,
/// so a single hinter can be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct Hinter {
    options: HintOptions,
}

impl Hinter {
    pub fn new(options: HintOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HintOptions {
        &self.options
    }

    /// Hints one glyph.
    ///
    /// The input outline is not modified; the hinted copy is returned along
    /// with a report. Existing hints are discarded unless
    /// [`HintParameters::keep_existing_hints`] is set.
    pub fn hint_glyph(
        &self,
        outline: &Outline,
        params: &HintParameters,
    ) -> Result<HintedGlyph, HintError> {
        let mut report = Report::default();
        let params = params.validate(self.options.best_effort, &mut report)?;
        let mut outline = outline.clone();
        if params.keep_existing_hints && outline.has_hints() {
            log::debug!("keeping existing hints");
            stems::check_existing(&outline, &self.options, &mut report);
            return Ok(HintedGlyph { outline, report });
        }
        outline.clear_hints();
        for (subpath, path) in outline.subpaths().iter().enumerate() {
            if path.is_degenerate() {
                report.push(ReportEntry::DegenerateSubpath { subpath });
            }
        }
        if outline.is_empty() {
            return Ok(HintedGlyph { outline, report });
        }
        let inflections_split = params.allow_edits;
        if inflections_split {
            let count = outline.split_inflections();
            if count > 0 {
                log::debug!("split {count} curves at inflections");
            }
        }
        let clockwise = outline.is_clockwise();
        if params.flex_allowed && !self.options.suppress_flex {
            for axis in Axis::ALL {
                flex::mark_flex(&mut outline, axis, clockwise, &self.options, &mut report);
            }
        }
        let mut results = self.hint_axes(&outline, &params, clockwise, inflections_split, &mut report);
        let subpath_count = outline.subpaths().len();
        if params.allow_edits && subpath_count > 1 {
            if let Some(order) = order::advise(subpath_count, &results) {
                outline.reorder(&order);
                let new_index_of = order::new_index_of(&order);
                for result in &mut results {
                    result.remap_subpaths(&new_index_of);
                }
                report.push(ReportEntry::SubpathsReordered { order });
            }
        }
        self.apply_masks(&mut outline, &params, &results, &mut report);
        Ok(HintedGlyph { outline, report })
    }

    /// Hints a batch of independent glyphs, returning results in input
    /// order.
    #[cfg(feature = "rayon")]
    pub fn hint_glyphs(
        &self,
        glyphs: &[(Outline, HintParameters)],
    ) -> Vec<Result<HintedGlyph, HintError>> {
        use rayon::prelude::*;
        glyphs
            .par_iter()
            .map(|(outline, params)| self.hint_glyph(outline, params))
            .collect()
    }

    /// Hints a batch of independent glyphs, returning results in input
    /// order.
    #[cfg(not(feature = "rayon"))]
    pub fn hint_glyphs(
        &self,
        glyphs: &[(Outline, HintParameters)],
    ) -> Vec<Result<HintedGlyph, HintError>> {
        glyphs
            .iter()
            .map(|(outline, params)| self.hint_glyph(outline, params))
            .collect()
    }

    fn hint_axes(
        &self,
        outline: &Outline,
        params: &HintParameters,
        clockwise: bool,
        inflections_split: bool,
        report: &mut Report,
    ) -> [AxisResult; 2] {
        let run = |axis: Axis| {
            let mut report = Report::default();
            let result = AxisHinter {
                outline,
                axis,
                params,
                options: &self.options,
                clockwise,
                inflections_split,
            }
            .run(&mut report);
            (result, report)
        };
        #[cfg(feature = "rayon")]
        let (horizontal, vertical) =
            rayon::join(|| run(Axis::Horizontal), || run(Axis::Vertical));
        #[cfg(not(feature = "rayon"))]
        let (horizontal, vertical) = (run(Axis::Horizontal), run(Axis::Vertical));
        report.extend(horizontal.1);
        report.extend(vertical.1);
        [horizontal.0, vertical.0]
    }

    /// Builds the stem tables, distributes masks and writes both into the
    /// outline.
    fn apply_masks(
        &self,
        outline: &mut Outline,
        params: &HintParameters,
        results: &[AxisResult; 2],
        report: &mut Report,
    ) {
        let [(horizontal, desired_h), (vertical, desired_v)] = [0, 1].map(|ix| {
            MaskBuilder {
                outline,
                result: &results[ix],
                options: &self.options,
            }
            .build(report)
        });
        let positions: Vec<PositionInfo> = outline
            .ids()
            .zip(desired_h.into_iter().zip(desired_v))
            .map(|(id, (h, v))| {
                let element = outline.element(id);
                let bounds = element.bounds();
                let second_half = element.flex.is_some_and(|mark| mark.half == FlexHalf::Second);
                PositionInfo {
                    desired: [h, v],
                    extent: Axis::ALL.map(|axis| axis.location_range(bounds)),
                    short: second_half
                        || element.chord_length() < self.options.short_element_length,
                    breakable: !second_half,
                }
            })
            .collect();
        let fold_main = params.allow_edits
            && outline.subpaths().len() <= self.options.fold_main_max_subpaths;
        let tables = [&horizontal, &vertical];
        let mut distribution = Distributor::new(tables, &self.options).run(&positions, fold_main);
        for axis in Axis::ALL {
            let ix = axis.index();
            let table = tables[ix];
            let used = distribution
                .masks()
                .fold(HintMask::new(), |acc, masks| acc.union(&masks[ix]));
            let (stems, map) = table.compact(&used);
            distribution.remap(ix, &map);
            log::debug!("{axis} axis: {} stems", stems.len());
            outline.set_hints(
                axis,
                AxisHints {
                    stems,
                    start_mask: distribution.start[ix].clone(),
                    counter: table.counter,
                },
            );
        }
        for (position, masks) in distribution.changes {
            if let Some(id) = outline.id_at(position) {
                outline.set_hint_mask(id, MaskPair::from(masks));
            }
        }
    }
}

/// Hints one glyph with default options.
pub fn hint_glyph(outline: &Outline, params: &HintParameters) -> Result<HintedGlyph, HintError> {
    Hinter::default().hint_glyph(outline, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ConfigError,
        outline::tests::rect_ccw,
        params::{AlignmentZone, ZoneKind},
        stems::Stem,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn single_bar() {
        let _ = env_logger::builder().is_test(true).try_init();
        let outline = Outline::new(vec![rect_ccw(100.0, 0.0, 180.0, 700.0)]).unwrap();
        let hinted = hint_glyph(&outline, &HintParameters::default()).unwrap();
        let vertical = hinted.outline.hints(Axis::Vertical);
        assert_eq!(vertical.stems, vec![Stem::new(100.0, 180.0)]);
        assert_eq!(vertical.start_mask, HintMask::all(1));
        // too tall for a horizontal stem; falls back to the bounding box
        let horizontal = hinted.outline.hints(Axis::Horizontal);
        assert_eq!(horizontal.stems, vec![Stem::new(0.0, 700.0)]);
        assert!(hinted
            .report
            .entries()
            .contains(&ReportEntry::BoundingBoxFallback {
                axis: Axis::Horizontal
            }));
    }

    #[test]
    fn input_is_not_modified() {
        let outline = Outline::new(vec![rect_ccw(0.0, 0.0, 80.0, 80.0)]).unwrap();
        let before = outline.clone();
        let _ = hint_glyph(&outline, &HintParameters::default()).unwrap();
        assert_eq!(outline, before);
    }

    #[test]
    fn bad_config_fails_unless_best_effort() {
        let outline = Outline::new(vec![rect_ccw(0.0, 0.0, 80.0, 80.0)]).unwrap();
        let mut params = HintParameters::default();
        params
            .horizontal
            .zones
            .push(AlignmentZone::new(10.0, -10.0, ZoneKind::Bottom));
        let err = hint_glyph(&outline, &params).unwrap_err();
        assert!(matches!(
            err,
            HintError::Config(ConfigError::InvalidZone { .. })
        ));
        let hinter = Hinter::new(HintOptions {
            best_effort: true,
            ..Default::default()
        });
        let hinted = hinter.hint_glyph(&outline, &params).unwrap();
        assert!(hinted
            .report
            .entries()
            .iter()
            .any(|e| matches!(e, ReportEntry::ConfigRepaired(_))));
    }

    #[test]
    fn batch_preserves_order() {
        let glyphs: Vec<_> = (0..8)
            .map(|ix| {
                let width = 40.0 + ix as f64 * 10.0;
                let outline = Outline::new(vec![rect_ccw(0.0, 0.0, width, 700.0)]).unwrap();
                (outline, HintParameters::default())
            })
            .collect();
        let results = Hinter::default().hint_glyphs(&glyphs);
        for (ix, result) in results.into_iter().enumerate() {
            let hinted = result.unwrap();
            let stems = &hinted.outline.hints(Axis::Vertical).stems;
            assert_eq!(stems[0].width(), 40.0 + ix as f64 * 10.0);
        }
    }

    #[test]
    fn empty_outline() {
        let hinted = hint_glyph(&Outline::default(), &HintParameters::default()).unwrap();
        assert!(!hinted.outline.has_hints());
        assert!(hinted.report.is_empty());
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::outline::tests::rect_ccw;

    #[test]
    fn hinted_glyph_keeps_report() {
        let outline = Outline::new(vec![rect_ccw(100.0, 0.0, 180.0, 700.0)]).unwrap();
        let hinted = hint_glyph(&outline, &HintParameters::default()).unwrap();
        assert!(hinted
            .report
            .entries()
            .contains(&ReportEntry::BoundingBoxFallback {
                axis: Axis::Horizontal
            }));
        let json = serde_json::to_string(&hinted).unwrap();
        let de: HintedGlyph = serde_json::from_str(&json).unwrap();
        assert_eq!(de, hinted);
        assert_eq!(de.report.entries(), hinted.report.entries());
    }
}

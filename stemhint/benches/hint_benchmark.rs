use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stemhint::{kurbo::Point, AlignmentZone, HintParameters, Hinter, Outline, PathElement, ZoneKind};

/// A comb: `teeth` vertical bars joined by a horizontal spine, drawn as one
/// subpath.
fn comb(teeth: usize) -> Outline {
    let mut points = vec![(0.0, 0.0)];
    for tooth in 0..teeth {
        let x = tooth as f64 * 200.0;
        points.push((x + 80.0, 0.0));
        points.push((x + 80.0, 500.0));
        if tooth + 1 < teeth {
            points.push((x + 200.0, 500.0));
            points.push((x + 200.0, 0.0));
        }
    }
    let right = (teeth - 1) as f64 * 200.0 + 80.0;
    points.push((right, 580.0));
    points.push((0.0, 580.0));
    let points: Vec<Point> = points.into_iter().map(Point::from).collect();
    let elements = (0..points.len())
        .map(|ix| PathElement::line(points[ix], points[(ix + 1) % points.len()]))
        .collect();
    Outline::new(vec![elements]).expect("closed polygon")
}

/// Concentric rounded rings.
fn rings(count: usize) -> Outline {
    const K: f64 = 0.552_284_749_8;
    let subpaths = (0..count)
        .map(|ring| {
            let r = 100.0 + ring as f64 * 60.0;
            let p = |x: f64, y: f64| Point::new(500.0 + x, 500.0 + y);
            let mut elements = vec![
                PathElement::curve(p(r, 0.0), p(r, K * r), p(K * r, r), p(0.0, r)),
                PathElement::curve(p(0.0, r), p(-K * r, r), p(-r, K * r), p(-r, 0.0)),
                PathElement::curve(p(-r, 0.0), p(-r, -K * r), p(-K * r, -r), p(0.0, -r)),
                PathElement::curve(p(0.0, -r), p(K * r, -r), p(r, -K * r), p(r, 0.0)),
            ];
            if ring % 2 == 1 {
                elements.reverse();
                for element in &mut elements {
                    if let stemhint::ElementKind::Curve { c0, c1 } = element.kind {
                        *element = PathElement::curve(element.end, c1, c0, element.start);
                    }
                }
            }
            elements
        })
        .collect();
    Outline::new(subpaths).expect("closed curves")
}

fn params() -> HintParameters {
    let mut params = HintParameters::default();
    params.horizontal.zones = vec![
        AlignmentZone::new(-15.0, 0.0, ZoneKind::Bottom),
        AlignmentZone::new(580.0, 595.0, ZoneKind::Top),
    ];
    params.vertical.dominant_stems = vec![80.0];
    params
}

pub fn hint_benchmark(c: &mut Criterion) {
    let hinter = Hinter::default();
    let params = params();
    for teeth in [2, 8, 32] {
        let outline = comb(teeth);
        c.bench_with_input(BenchmarkId::new("comb", teeth), &outline, |b, outline| {
            b.iter(|| black_box(hinter.hint_glyph(outline, &params)))
        });
    }
    for count in [2, 6] {
        let outline = rings(count);
        c.bench_with_input(BenchmarkId::new("rings", count), &outline, |b, outline| {
            b.iter(|| black_box(hinter.hint_glyph(outline, &params)))
        });
    }
    let batch: Vec<_> = (2..34).map(|teeth| (comb(teeth), params.clone())).collect();
    c.bench_function("batch", |b| b.iter(|| black_box(hinter.hint_glyphs(&batch))));
}

criterion_group!(benches, hint_benchmark);
criterion_main!(benches);

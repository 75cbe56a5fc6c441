use assert_matches::assert_matches;
use kurbo::{BezPath, PathEl, Rect, Shape};
use planesweep::{binary_op, combine, outline, BinaryOp, CombineOptions, Error, FillRule};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.0)
}

fn figures(path: &BezPath) -> usize {
    path.elements()
        .iter()
        .filter(|el| matches!(el, PathEl::MoveTo(_)))
        .count()
}

fn assert_area(path: &BezPath, expected: f64) {
    let area = path.area();
    assert!(
        (area - expected).abs() < 1e-6,
        "expected area {expected}, got {area}"
    );
}

#[test]
fn overlapping_squares() {
    init_tracing();
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(5.0, 5.0, 15.0, 15.0);

    let union = binary_op(&a, &b, FillRule::NonZero, BinaryOp::Union).unwrap();
    assert_area(&union, 175.0);
    assert_eq!(figures(&union), 1);
    assert_eq!(union.segments().count(), 8);

    let intersection = binary_op(&a, &b, FillRule::NonZero, BinaryOp::Intersection).unwrap();
    assert_area(&intersection, 25.0);
    assert_eq!(figures(&intersection), 1);
    assert_eq!(intersection.segments().count(), 4);

    let difference = binary_op(&a, &b, FillRule::NonZero, BinaryOp::Difference).unwrap();
    assert_area(&difference, 75.0);
    assert_eq!(figures(&difference), 1);
    assert_eq!(difference.segments().count(), 6);

    let xor = binary_op(&a, &b, FillRule::NonZero, BinaryOp::Xor).unwrap();
    assert_area(&xor, 150.0);
}

#[test]
fn difference_is_not_symmetric() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(2.0, 2.0, 4.0, 4.0);

    // b is a hole in a.
    let a_minus_b = binary_op(&a, &b, FillRule::EvenOdd, BinaryOp::Difference).unwrap();
    assert_area(&a_minus_b, 96.0);
    assert_eq!(figures(&a_minus_b), 2);

    let b_minus_a = binary_op(&b, &a, FillRule::EvenOdd, BinaryOp::Difference).unwrap();
    assert!(b_minus_a.elements().is_empty());
}

#[test]
fn idempotence() {
    init_tracing();
    let a = rect(0.0, 0.0, 10.0, 10.0);

    for op in [BinaryOp::Union, BinaryOp::Intersection] {
        let out = binary_op(&a, &a, FillRule::NonZero, op).unwrap();
        assert_area(&out, 100.0);
        assert_eq!(figures(&out), 1);
        assert_eq!(out.segments().count(), 4);
    }

    for op in [BinaryOp::Difference, BinaryOp::Xor] {
        let out = binary_op(&a, &a, FillRule::NonZero, op).unwrap();
        assert!(out.elements().is_empty(), "{op:?} gave {out:?}");
    }
}

#[test]
fn disjoint_squares() {
    let a = rect(0.0, 0.0, 1.0, 1.0);
    let b = rect(3.0, 0.0, 4.0, 1.0);

    let union = binary_op(&a, &b, FillRule::NonZero, BinaryOp::Union).unwrap();
    assert_area(&union, 2.0);
    assert_eq!(figures(&union), 2);

    let intersection = binary_op(&a, &b, FillRule::NonZero, BinaryOp::Intersection).unwrap();
    assert!(intersection.elements().is_empty());
}

#[test]
fn fill_rules_differ_on_doubled_squares() {
    // The same square twice, with the same orientation: winding number 2.
    let mut doubled = rect(0.0, 0.0, 10.0, 10.0);
    doubled.extend(Rect::new(0.0, 0.0, 10.0, 10.0).path_elements(0.0));

    let nonzero = outline(&doubled, FillRule::NonZero).unwrap();
    assert_area(&nonzero, 100.0);

    let evenodd = outline(&doubled, FillRule::EvenOdd).unwrap();
    assert!(evenodd.elements().is_empty());
}

#[test]
fn outline_of_a_bow_tie() {
    let mut bow_tie = BezPath::new();
    bow_tie.move_to((0.0, 0.0));
    bow_tie.line_to((10.0, 10.0));
    bow_tie.line_to((10.0, 0.0));
    bow_tie.line_to((0.0, 10.0));
    bow_tie.close_path();

    let out = outline(&bow_tie, FillRule::NonZero).unwrap();
    // Two triangles, each with area 25, touching at the crossing point.
    assert_area(&out, 50.0);
}

#[test]
fn too_complex() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(5.0, 5.0, 15.0, 15.0);
    let options = CombineOptions::new(BinaryOp::Union).with_max_vertices(3);
    let mut out = BezPath::new();
    assert_matches!(
        combine(&a, &b, &options, &mut out),
        Err(Error::TooComplex { limit: 3 })
    );
}

#[test]
fn metrics_count_intersections() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(5.0, 5.0, 15.0, 15.0);
    let mut out = BezPath::new();
    let metrics = combine(&a, &b, &CombineOptions::default(), &mut out).unwrap();
    assert_eq!(metrics.intersections, 2);
}

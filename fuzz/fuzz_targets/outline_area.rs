#![no_main]

use arbitrary::Unstructured;
use kurbo::Shape;
use libfuzzer_sys::fuzz_target;
use planesweep::{
    CombineOptions, Error, FillRule, Metrics, TessellateOptions, UniformFlattener, VertexBuffers,
    arbitrary::polygons,
};

// Running out of vertices is fine; anything else is a bug.
fn completed(result: Result<Metrics, Error>) -> bool {
    match result {
        Ok(_) => true,
        Err(Error::TooComplex { .. }) => false,
        Err(e) => panic!("{e}"),
    }
}

// Simplifying a shape and tessellating it must agree on how much of the
// plane the shape covers.
fn outline_area(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let figs = polygons(&mut u, &mut Vec::new())?;
    let fill_rule = *u.choose(&[FillRule::EvenOdd, FillRule::NonZero])?;

    let mut outline = kurbo::BezPath::new();
    let options = CombineOptions::default()
        .with_fill_rule(fill_rule)
        .with_max_vertices(1 << 12);
    if !completed(planesweep::combine_figures(
        &figs,
        &[],
        &options,
        &mut UniformFlattener,
        &mut outline,
    )) {
        return Ok(());
    }

    let mut triangles = VertexBuffers::default();
    let options = TessellateOptions::default()
        .with_fill_rule(fill_rule)
        .with_max_vertices(1 << 12);
    if !completed(planesweep::tessellate_figures(
        &figs,
        &options,
        &mut UniformFlattener,
        &mut triangles,
    )) {
        return Ok(());
    }

    let (a, b) = (outline.area(), triangles.area());
    assert!((a - b).abs() <= 1e-6 * a.abs().max(1.0), "{a} vs {b}");
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = outline_area(Unstructured::new(data));
});

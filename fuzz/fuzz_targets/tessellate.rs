#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use planesweep::{
    TessellateOptions, UniformFlattener, VertexBuffers,
    arbitrary::{monotone_polygon, star_polygon},
};

fn tessellate(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let fig = if u.arbitrary()? {
        monotone_polygon(&mut u)?
    } else {
        star_polygon(&mut u)?
    };
    let points: Vec<_> = fig.points().collect();
    let doubled: f64 = (0..points.len())
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % points.len()]);
            p.x * q.y - q.x * p.y
        })
        .sum();

    let mut out = VertexBuffers::default();
    planesweep::tessellate_figures(
        &[fig],
        &TessellateOptions::default(),
        &mut UniformFlattener,
        &mut out,
    )
    .unwrap();
    assert_eq!(out.area(), doubled.abs() / 2.0);
    for [a, b, c] in out.triangles() {
        assert!((b - a).cross(c - a) > 0.0);
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = tessellate(Unstructured::new(data));
});

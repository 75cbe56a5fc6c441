#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use planesweep::{Error, UniformFlattener, arbitrary::{combine_options, polygons}};

fn combine(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let mut previous = Vec::new();
    let a = polygons(&mut u, &mut previous)?;
    let b = polygons(&mut u, &mut previous)?;
    let options = combine_options(&mut u)?.with_max_vertices(1 << 12);

    let mut out = kurbo::BezPath::new();
    match planesweep::combine_figures(&a, &b, &options, &mut UniformFlattener, &mut out) {
        Ok(_) | Err(Error::TooComplex { .. }) => {}
        Err(e) => panic!("{e}"),
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = combine(Unstructured::new(data));
});

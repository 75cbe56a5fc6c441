use kurbo::{BezPath, Circle, Rect, Shape};
use planesweep::{
    outline, tessellate, tessellate_into, FillRule, GeometrySink, TessellateOptions, VertexBuffers,
    VertexId,
};

fn pentagram() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, -100.0));
    path.line_to((59.0, 81.0));
    path.line_to((-95.0, -31.0));
    path.line_to((95.0, -31.0));
    path.line_to((-59.0, 81.0));
    path.close_path();
    path
}

fn assert_well_formed(buffers: &VertexBuffers) {
    assert_eq!(buffers.indices.len() % 3, 0);
    for &i in &buffers.indices {
        assert!((i as usize) < buffers.vertices.len());
    }
    for [a, b, c] in buffers.triangles() {
        assert!((b - a).cross(c - a) > 0.0, "bad triangle {a:?} {b:?} {c:?}");
    }
}

#[test]
fn area_matches_the_outline() {
    for fill_rule in [FillRule::EvenOdd, FillRule::NonZero] {
        let path = pentagram();
        let triangles = tessellate(&path, fill_rule).unwrap();
        assert_well_formed(&triangles);

        let outline = outline(&path, fill_rule).unwrap();
        assert!(
            (triangles.area() - outline.area()).abs() < 1e-6,
            "{fill_rule:?}: {} vs {}",
            triangles.area(),
            outline.area()
        );
    }
}

#[test]
fn even_odd_leaves_a_hole() {
    let path = pentagram();
    let evenodd = tessellate(&path, FillRule::EvenOdd).unwrap();
    let nonzero = tessellate(&path, FillRule::NonZero).unwrap();
    assert!(evenodd.area() > 0.0);
    assert!(evenodd.area() < nonzero.area());
}

#[test]
fn curves_are_flattened() {
    let circle = Circle::new((0.0, 0.0), 100.0);
    let triangles = tessellate(&circle.to_path(0.01), FillRule::NonZero).unwrap();
    assert_well_formed(&triangles);
    let expected = circle.area();
    assert!((triangles.area() - expected).abs() < 0.01 * expected);
}

#[test]
fn overlapping_rects() {
    let mut path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.0);
    path.extend(Rect::new(5.0, 5.0, 15.0, 15.0).path_elements(0.0));

    let nonzero = tessellate(&path, FillRule::NonZero).unwrap();
    assert_well_formed(&nonzero);
    assert!((nonzero.area() - 175.0).abs() < 1e-6);

    let evenodd = tessellate(&path, FillRule::EvenOdd).unwrap();
    assert_well_formed(&evenodd);
    assert!((evenodd.area() - 150.0).abs() < 1e-6);
}

#[test]
fn empty() {
    let triangles = tessellate(&BezPath::new(), FillRule::NonZero).unwrap();
    assert!(triangles.vertices.is_empty());
    assert!(triangles.indices.is_empty());
}

// Keeps parallelograms whole, to check that they come out right.
#[derive(Default)]
struct Quads {
    vertices: Vec<kurbo::Point>,
    triangles: usize,
    parallelograms: Vec<[VertexId; 4]>,
}

impl GeometrySink for Quads {
    fn add_vertex(&mut self, p: kurbo::Point) -> VertexId {
        self.vertices.push(p);
        VertexId(self.vertices.len() as u32 - 1)
    }

    fn add_triangle(&mut self, _a: VertexId, _b: VertexId, _c: VertexId) {
        self.triangles += 1;
    }

    fn add_parallelogram(&mut self, a: VertexId, b: VertexId, c: VertexId, d: VertexId) {
        self.parallelograms.push([a, b, c, d]);
    }
}

#[test]
fn grid_of_squares() {
    let mut path = BezPath::new();
    for i in 0..3 {
        for j in 0..3 {
            let (x, y) = (i as f64 * 20.0, j as f64 * 20.0);
            path.extend(Rect::new(x, y, x + 10.0, y + 10.0).path_elements(0.0));
        }
    }
    let mut quads = Quads::default();
    tessellate_into(&path, &TessellateOptions::default(), &mut quads).unwrap();

    assert_eq!(quads.triangles, 0);
    assert_eq!(quads.parallelograms.len(), 9);
    assert_eq!(quads.vertices.len(), 36);
    for [a, b, c, d] in quads.parallelograms {
        let [a, b, c, d] = [a, b, c, d].map(|v| quads.vertices[v.0 as usize]);
        assert_eq!(a + (c - b), d);
        assert!((b - a).cross(c - a) > 0.0);
    }
}

//! Where triangles go.

/// The index of a vertex added to a [`GeometrySink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct VertexId(pub u32);

/// A consumer of triangles.
///
/// Every triangle (and parallelogram) is wound the same way: its signed area,
/// computed as `(b - a) × (c - a) / 2`, is positive.
pub trait GeometrySink {
    /// Adds a vertex, returning its index.
    fn add_vertex(&mut self, p: kurbo::Point) -> VertexId;

    /// Adds a triangle.
    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId);

    /// Adds a parallelogram, given by its four corners in order.
    ///
    /// The default implementation splits it into two triangles.
    fn add_parallelogram(&mut self, a: VertexId, b: VertexId, c: VertexId, d: VertexId) {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }
}

/// An indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VertexBuffers {
    /// The vertices.
    pub vertices: Vec<kurbo::Point>,
    /// Three indices into `vertices` per triangle.
    pub indices: Vec<u32>,
}

impl VertexBuffers {
    /// Iterates over the corners of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [kurbo::Point; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }

    /// The total area of all the triangles.
    pub fn area(&self) -> f64 {
        self.triangles().map(|[a, b, c]| (b - a).cross(c - a) / 2.0).sum()
    }
}

impl GeometrySink for VertexBuffers {
    fn add_vertex(&mut self, p: kurbo::Point) -> VertexId {
        self.vertices.push(p);
        VertexId(self.vertices.len() as u32 - 1)
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        self.indices.extend_from_slice(&[a.0, b.0, c.0]);
    }
}

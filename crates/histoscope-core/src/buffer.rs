//! Geometry buffers produced by the builders.

use glam::Vec3;

/// Vertex indices for indexed line or triangle buffers.
///
/// Only 16-bit indices are emitted. Buffers with more vertices than fit are
/// written with duplicated positions and no indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuffer {
    /// 16-bit indices.
    U16(Vec<u16>),
}

impl IndexBuffer {
    /// Number of indices.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
        }
    }

    /// Whether there are no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index at `i` widened to `usize`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<usize> {
        match self {
            Self::U16(v) => v.get(i).map(|&x| x as usize),
        }
    }

    /// Raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U16(v) => bytemuck::cast_slice(v),
        }
    }
}

/// A triangle mesh: three consecutive positions per face unless `indices` is set.
///
/// Vertices are grouped into runs of `group_size`; `bin_index_per_group[g]` names the
/// source bin that emitted group `g`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffer {
    /// Vertex positions in draw space.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, when the builder computes them.
    pub normals: Option<Vec<Vec3>>,
    /// Optional face indices.
    pub indices: Option<IndexBuffer>,
    /// Vertices per group; zero when the buffer carries no bin mapping.
    pub group_size: usize,
    /// Source bin of each vertex group.
    pub bin_index_per_group: Vec<usize>,
}

impl GeometryBuffer {
    /// Creates a non-indexed buffer.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            ..Self::default()
        }
    }

    /// Creates a buffer with flat face normals.
    pub fn with_flat_normals(positions: Vec<Vec3>) -> Self {
        let normals = flat_normals(&positions);
        Self {
            positions,
            normals: Some(normals),
            ..Self::default()
        }
    }

    /// Attaches a bin mapping with `group_size` vertices per group.
    #[must_use]
    pub fn with_bins(mut self, group_size: usize, bins: Vec<usize>) -> Self {
        self.group_size = group_size;
        self.bin_index_per_group = bins;
        self
    }

    /// Source bin of vertex `vertex`.
    #[must_use]
    pub fn bin_of_vertex(&self, vertex: usize) -> Option<usize> {
        if self.group_size == 0 {
            return None;
        }
        self.bin_index_per_group
            .get(vertex / self.group_size)
            .copied()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(idx) => idx.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Whether the buffer holds no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Corners of triangle `face`.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<[Vec3; 3]> {
        let corner = |c: usize| -> Option<Vec3> {
            let v = match &self.indices {
                Some(idx) => idx.get(face * 3 + c)?,
                None => face * 3 + c,
            };
            self.positions.get(v).copied()
        };
        Some([corner(0)?, corner(1)?, corner(2)?])
    }

    /// First vertex of triangle `face`.
    #[must_use]
    pub fn first_vertex_of(&self, face: usize) -> Option<usize> {
        match &self.indices {
            Some(idx) => idx.get(face * 3),
            None => (face * 3 < self.positions.len()).then_some(face * 3),
        }
    }

    /// Axis-aligned bounds, or `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Bytes a renderer uploads for this mesh.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        let positions = bytemuck::cast_slice::<Vec3, u8>(&self.positions).len();
        let normals = self
            .normals
            .as_deref()
            .map_or(0, |n| bytemuck::cast_slice::<Vec3, u8>(n).len());
        positions + normals + self.indices.as_ref().map_or(0, |i| i.as_bytes().len())
    }
}

/// A set of line segments: two consecutive positions per segment unless indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBuffer {
    /// Vertex positions in draw space.
    pub positions: Vec<Vec3>,
    /// Optional segment indices.
    pub indices: Option<IndexBuffer>,
}

impl LineBuffer {
    /// Creates a non-indexed line buffer.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Bytes a renderer uploads for these lines.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        bytemuck::cast_slice::<Vec3, u8>(&self.positions).len()
            + self.indices.as_ref().map_or(0, |i| i.as_bytes().len())
    }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        match &self.indices {
            Some(idx) => idx.len() / 2,
            None => self.positions.len() / 2,
        }
    }

    /// Whether there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }

    /// Endpoints of segment `seg`.
    #[must_use]
    pub fn segment(&self, seg: usize) -> Option<(Vec3, Vec3)> {
        let end = |c: usize| -> Option<Vec3> {
            let v = match &self.indices {
                Some(idx) => idx.get(seg * 2 + c)?,
                None => seg * 2 + c,
            };
            self.positions.get(v).copied()
        };
        Some((end(0)?, end(1)?))
    }

    /// Appends one segment to a non-indexed buffer.
    pub fn push_segment(&mut self, a: Vec3, b: Vec3) {
        self.positions.push(a);
        self.positions.push(b);
    }
}

/// A pre-sized buffer filled through a write cursor.
///
/// Writes past the end are dropped and recorded, so a size computed in a
/// counting pass can be checked against what the writing pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBuffer<T> {
    data: Vec<T>,
    cursor: usize,
    overflow: usize,
}

impl<T: Copy + Default> FixedBuffer<T> {
    /// Allocates `len` default-initialized slots.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![T::default(); len],
            cursor: 0,
            overflow: 0,
        }
    }

    /// Writes at the cursor and advances it.
    pub fn push(&mut self, value: T) {
        if let Some(slot) = self.data.get_mut(self.cursor) {
            *slot = value;
            self.cursor += 1;
        } else {
            self.overflow += 1;
        }
    }

    /// Slots allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Slots written.
    #[must_use]
    pub fn written(&self) -> usize {
        self.cursor
    }

    /// Writes that did not fit.
    #[must_use]
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// Whether every slot was written and nothing overflowed.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.cursor == self.data.len() && self.overflow == 0
    }

    /// Returns the written prefix.
    #[must_use]
    pub fn into_written(mut self) -> Vec<T> {
        self.data.truncate(self.cursor);
        self.data
    }
}

/// Flat normals for a non-indexed triangle list.
#[must_use]
pub fn flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    let mut normals = Vec::with_capacity(positions.len());
    for tri in positions.chunks(3) {
        let n = if tri.len() == 3 {
            (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
        } else {
            Vec3::ZERO
        };
        normals.extend(std::iter::repeat(n).take(tri.len()));
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_buffer_exact() {
        let mut buf = FixedBuffer::<f32>::new(3);
        buf.push(1.0);
        buf.push(2.0);
        assert!(!buf.is_exact());
        buf.push(3.0);
        assert!(buf.is_exact());
        buf.push(4.0);
        assert_eq!(buf.overflow(), 1);
        assert!(!buf.is_exact());
        assert_eq!(buf.into_written(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_indexed_triangle_lookup() {
        let geom = GeometryBuffer {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            indices: Some(IndexBuffer::U16(vec![0, 1, 2, 0, 2, 3])),
            ..GeometryBuffer::default()
        };
        assert_eq!(geom.triangle_count(), 2);
        assert_eq!(geom.triangle(1), Some([Vec3::ZERO, Vec3::Y, Vec3::Z]));
        assert_eq!(geom.triangle(2), None);
        assert_eq!(geom.bounds(), Some((Vec3::ZERO, Vec3::ONE)));
        // 4 positions, 6 u16 indices
        assert_eq!(geom.byte_len(), 4 * 12 + 6 * 2);
    }

    #[test]
    fn test_bin_of_vertex() {
        let geom = GeometryBuffer::from_positions(vec![Vec3::ZERO; 12]).with_bins(6, vec![4, 9]);
        for v in 0..6 {
            assert_eq!(geom.bin_of_vertex(v), Some(4));
        }
        for v in 6..12 {
            assert_eq!(geom.bin_of_vertex(v), Some(9));
        }
        assert_eq!(geom.bin_of_vertex(12), None);
        assert_eq!(GeometryBuffer::default().bin_of_vertex(0), None);
    }

    #[test]
    fn test_flat_normals() {
        let normals = flat_normals(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn test_line_segments() {
        let mut lines = LineBuffer::default();
        lines.push_segment(Vec3::ZERO, Vec3::X);
        assert_eq!(lines.segment_count(), 1);
        assert_eq!(lines.segment(0), Some((Vec3::ZERO, Vec3::X)));
        assert_eq!(lines.byte_len(), 24);
        lines.indices = Some(IndexBuffer::U16(vec![0, 1]));
        assert_eq!(lines.byte_len(), 28);
    }
}

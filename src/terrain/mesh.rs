//! Heightmap-to-mesh tessellation with level-of-detail simplification.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::curve::HeightCurve;
use super::noise_map::HeightField;

/// Interleaved vertex for GPU upload (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Terrain mesh buffers, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    /// Flat triangle list, three indices per triangle
    pub triangles: Vec<u32>,
    pub uvs: Vec<Vec2>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Iterate triangles as index triples
    pub fn triangle_indices(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Position and UV interleaved per vertex
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .zip(&self.uvs)
            .map(|(position, uv)| Vertex {
                position: position.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    /// Raw index buffer bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

/// Sampling stride for a level of detail: 1, 2, 4, 6, 8, ...
pub fn simplification_increment(lod: u32) -> usize {
    if lod == 0 {
        1
    } else {
        lod as usize * 2
    }
}

/// Vertices along one mesh row when sampling `width` columns at `lod`
pub fn vertices_per_line(width: usize, lod: u32) -> usize {
    if width == 0 {
        return 0;
    }
    (width - 1) / simplification_increment(lod) + 1
}

/// Build a mesh from a height field.
///
/// The mesh is centered on the origin with +z toward the field's first row.
/// UVs use the unsampled field size so they agree across LOD levels.
/// Triangles wind counter-clockwise seen from above (normals point +y).
pub fn generate_terrain_mesh(
    height_field: &HeightField,
    height_multiplier: f32,
    height_curve: &HeightCurve,
    lod: u32,
) -> MeshData {
    let width = height_field.width();
    let height = height_field.height();
    let increment = simplification_increment(lod);

    let verts_x = vertices_per_line(width, lod);
    let verts_y = vertices_per_line(height, lod);

    let top_left_x = (width as f32 - 1.0) / -2.0;
    let top_left_z = (height as f32 - 1.0) / 2.0;

    let mut vertices = Vec::with_capacity(verts_x * verts_y);
    let mut uvs = Vec::with_capacity(verts_x * verts_y);
    let mut triangles =
        Vec::with_capacity(verts_x.saturating_sub(1) * verts_y.saturating_sub(1) * 6);

    let line = verts_x as u32;
    let mut vertex_index: u32 = 0;

    for (row, y) in (0..height).step_by(increment).enumerate() {
        for (col, x) in (0..width).step_by(increment).enumerate() {
            let sample = height_curve.evaluate(height_field.get(x, y));
            vertices.push(Vec3::new(
                top_left_x + x as f32,
                sample * height_multiplier,
                top_left_z - y as f32,
            ));
            uvs.push(Vec2::new(x as f32 / width as f32, y as f32 / height as f32));

            // Last sampled row and column have no quad to their right/below
            if col + 1 < verts_x && row + 1 < verts_y {
                let i = vertex_index;
                triangles.extend_from_slice(&[i, i + line + 1, i + line]);
                triangles.extend_from_slice(&[i + line + 1, i, i + 1]);
            }

            vertex_index += 1;
        }
    }

    MeshData {
        vertices,
        triangles,
        uvs,
    }
}

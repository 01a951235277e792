//! Single-map preview export: grayscale noise, region colors or a textured mesh.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Vec2;
use log::info;

use crate::error::TerrainError;
use crate::params::TerrainConfig;
use crate::terrain::{texture_from_color_map, texture_from_height_map, MapData, MeshData, TerrainGenerator};

/// What the preview renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Grayscale height field
    NoiseMap,
    /// Height field classified into region colors
    ColorMap,
    /// Wavefront OBJ mesh textured with the color map
    Mesh,
}

impl DrawMode {
    /// Parse a mode name ("noise", "color", "mesh" and a few aliases)
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "noise" | "noisemap" | "noise-map" | "height" => Some(Self::NoiseMap),
            "color" | "colour" | "colormap" | "color-map" => Some(Self::ColorMap),
            "mesh" | "obj" => Some(Self::Mesh),
            _ => None,
        }
    }
}

/// Generate one chunk-sized map at the configured offset and write it to
/// `output_dir`. Returns the written files.
pub fn export_preview(
    config: &TerrainConfig,
    mode: DrawMode,
    lod: Option<u32>,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, TerrainError> {
    fs::create_dir_all(output_dir)?;

    let generator = TerrainGenerator::new(config);
    let map_data = generator.generate_map_data(Vec2::ZERO, config.noise.normalize_mode);

    let written = match mode {
        DrawMode::NoiseMap => {
            let path = output_dir.join("noise_map.png");
            texture_from_height_map(&map_data.height_field).save(&path)?;
            vec![path]
        }
        DrawMode::ColorMap => vec![write_color_map(&map_data, output_dir)?],
        DrawMode::Mesh => {
            let lod = lod.unwrap_or(config.mesh.preview_lod);
            let mesh = generator.generate_mesh(&map_data, lod);
            let texture = write_color_map(&map_data, output_dir)?;

            let material = output_dir.join("terrain.mtl");
            write_material(&material, &texture)?;

            let obj = output_dir.join("terrain.obj");
            write_obj(&mesh, &obj, &material)?;
            info!(
                "Mesh preview at LOD {}: {} vertices, {} triangles",
                lod,
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            vec![obj, material, texture]
        }
    };

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

fn write_color_map(map_data: &MapData, output_dir: &Path) -> Result<PathBuf, TerrainError> {
    let path = output_dir.join("color_map.png");
    texture_from_color_map(&map_data.color_map, map_data.width(), map_data.height()).save(&path)?;
    Ok(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_material(path: &Path, texture: &Path) -> Result<(), TerrainError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "newmtl terrain")?;
    writeln!(out, "Kd 1.0 1.0 1.0")?;
    writeln!(out, "map_Kd {}", file_name(texture))?;
    out.flush()?;
    Ok(())
}

/// Write `mesh` as Wavefront OBJ. Face indices are 1-based and texture v is
/// flipped, since OBJ puts v = 0 at the bottom of the image.
pub fn write_obj(mesh: &MeshData, path: &Path, material: &Path) -> Result<(), TerrainError> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "mtllib {}", file_name(material))?;
    writeln!(out, "o terrain")?;
    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(out, "vt {} {}", uv.x, 1.0 - uv.y)?;
    }
    writeln!(out, "usemtl terrain")?;
    for [a, b, c] in mesh.triangle_indices() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TerrainConfig {
        let mut config = TerrainConfig::default();
        config.mesh.map_chunk_size = 9;
        config
    }

    #[test]
    fn test_parse_draw_mode() {
        assert_eq!(DrawMode::parse("noise"), Some(DrawMode::NoiseMap));
        assert_eq!(DrawMode::parse("Color"), Some(DrawMode::ColorMap));
        assert_eq!(DrawMode::parse("mesh"), Some(DrawMode::Mesh));
        assert_eq!(DrawMode::parse("wireframe"), None);
    }

    #[test]
    fn test_noise_map_export_writes_png() {
        let dir = tempfile::tempdir().expect("temp dir");
        let files = export_preview(&small_config(), DrawMode::NoiseMap, None, dir.path())
            .expect("export");

        assert_eq!(files.len(), 1);
        let image = image::open(&files[0]).expect("read back").to_luma8();
        assert_eq!(image.dimensions(), (9, 9));
    }

    #[test]
    fn test_mesh_export_writes_obj() {
        let dir = tempfile::tempdir().expect("temp dir");
        let files = export_preview(&small_config(), DrawMode::Mesh, Some(1), dir.path())
            .expect("export");
        assert_eq!(files.len(), 3);

        let obj = fs::read_to_string(dir.path().join("terrain.obj")).expect("read obj");
        let vertices = obj.lines().filter(|l| l.starts_with("v ")).count();
        let faces: Vec<&str> = obj.lines().filter(|l| l.starts_with("f ")).collect();

        // Size 9 at stride 2: 5 x 5 vertices, 4 x 4 quads
        assert_eq!(vertices, 25);
        assert_eq!(faces.len(), 32);
        assert_eq!(faces[0], "f 1/1 7/7 6/6");
        assert!(obj.contains("mtllib terrain.mtl"));
    }
}

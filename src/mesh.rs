//! Flattening of parsed groups into indexed vertex buffers.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::model::{Model, TriangleGroup};

/// Interleaved vertex ready for upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// Triangles of one group that share a material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshBatch {
    pub material: Option<usize>,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NormalSource {
    Explicit(usize),
    Smoothed(u32),
    /// Index of the triangle whose face normal is used.
    Flat(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    position: usize,
    texcoord: Option<usize>,
    normal: NormalSource,
}

/// Builds one batch per material used by `group`, in order of first use.
///
/// Corners without a normal index get the averaged face normal of their
/// smoothing group when smooth shading is on, and the flat face normal
/// otherwise. Missing texture coordinates become `(0, 0)`.
pub fn build_group(model: &Model, group: &TriangleGroup) -> Vec<MeshBatch> {
    let smoothed = smoothed_normals(model, group);
    let mut batches: Vec<MeshBatch> = Vec::new();
    let mut lookups: Vec<HashMap<Key, u32>> = Vec::new();

    for (triangle_index, triangle) in group.triangles.iter().enumerate() {
        let slot = match batches
            .iter()
            .position(|batch| batch.material == triangle.material)
        {
            Some(slot) => slot,
            None => {
                batches.push(MeshBatch {
                    material: triangle.material,
                    ..MeshBatch::default()
                });
                lookups.push(HashMap::new());
                batches.len() - 1
            }
        };
        let batch = &mut batches[slot];
        let lookup = &mut lookups[slot];

        let positions = triangle.vertices.positions();
        let texcoords = triangle.vertices.texcoords();
        let normals = triangle.vertices.normals();
        let flat = face_normal(model, positions);

        for corner in 0..3 {
            let normal = match normals {
                Some(normals) => NormalSource::Explicit(normals[corner]),
                None if triangle.smooth_shading => {
                    NormalSource::Smoothed(triangle.smoothing_group)
                }
                None => NormalSource::Flat(triangle_index),
            };
            let key = Key {
                position: positions[corner],
                texcoord: texcoords.map(|texcoords| texcoords[corner]),
                normal,
            };
            let next_index = batch.vertices.len() as u32;
            let index = *lookup.entry(key).or_insert_with(|| {
                let normal = match key.normal {
                    NormalSource::Explicit(i) => model.normals()[i],
                    NormalSource::Smoothed(smoothing_group) => smoothed
                        .get(&(smoothing_group, key.position))
                        .copied()
                        .unwrap_or(flat),
                    NormalSource::Flat(_) => flat,
                };
                let texcoord = key
                    .texcoord
                    .map(|i| model.texcoords()[i])
                    .unwrap_or(Vec2::ZERO);
                batch.vertices.push(MeshVertex {
                    position: model.positions()[key.position].to_array(),
                    normal: normal.to_array(),
                    texcoord: texcoord.to_array(),
                });
                next_index
            });
            batch.indices.push(index);
        }
    }

    batches
}

fn face_normal(model: &Model, positions: [usize; 3]) -> Vec3 {
    let [p0, p1, p2] = positions.map(|i| model.positions()[i]);
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

fn smoothed_normals(model: &Model, group: &TriangleGroup) -> HashMap<(u32, usize), Vec3> {
    let mut accum: HashMap<(u32, usize), Vec3> = HashMap::new();
    for triangle in &group.triangles {
        if !triangle.smooth_shading || triangle.vertices.normals().is_some() {
            continue;
        }
        let positions = triangle.vertices.positions();
        let normal = face_normal(model, positions);
        for position in positions {
            *accum
                .entry((triangle.smoothing_group, position))
                .or_insert(Vec3::ZERO) += normal;
        }
    }
    for normal in accum.values_mut() {
        *normal = normal.normalize_or_zero();
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::testing::RecordingLoader;
    use std::path::Path;

    const HINGE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 -1\n";

    fn model(source: &str) -> Model {
        let loader = RecordingLoader::default();
        Model::parse("mesh.obj", source, Path::new("."), &loader).unwrap()
    }

    fn normal(vertex: &MeshVertex) -> Vec3 {
        Vec3::from_array(vertex.normal)
    }

    #[test]
    fn flat_faces_do_not_share_vertices() {
        let model = model(&format!("{HINGE}f 1 2 3\nf 2 1 4\n"));
        let batches = build_group(&model, &model.groups()[0]);
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.vertices.len(), 6);
        assert_eq!(batch.indices, vec![0, 1, 2, 3, 4, 5]);
        assert!(normal(&batch.vertices[0]).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(normal(&batch.vertices[3]).abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn smoothing_group_averages_shared_corners() {
        let model = model(&format!("{HINGE}s 1\nf 1 2 3\nf 2 1 4\n"));
        let batch = &build_group(&model, &model.groups()[0])[0];
        assert_eq!(batch.vertices.len(), 4);
        assert_eq!(batch.indices, vec![0, 1, 2, 1, 0, 3]);
        let shared = Vec3::new(0.0, -1.0, 1.0).normalize();
        assert!(normal(&batch.vertices[0]).abs_diff_eq(shared, 1e-6));
        assert!(normal(&batch.vertices[1]).abs_diff_eq(shared, 1e-6));
        assert!(normal(&batch.vertices[2]).abs_diff_eq(Vec3::Z, 1e-6));
        for vertex in &batch.vertices {
            assert!((normal(vertex).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn different_smoothing_groups_stay_apart() {
        let model = model(&format!("{HINGE}s 1\nf 1 2 3\ns 2\nf 2 1 4\n"));
        let batch = &build_group(&model, &model.groups()[0])[0];
        assert_eq!(batch.vertices.len(), 6);
    }

    #[test]
    fn explicit_attributes_are_used_and_deduplicated() {
        let source = format!(
            "{HINGE}vt 0.25 0.75\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\nf 3/1/1 2/1/1 1/1/1\n"
        );
        let model = model(&source);
        let batch = &build_group(&model, &model.groups()[0])[0];
        assert_eq!(batch.vertices.len(), 3);
        assert_eq!(batch.indices, vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(batch.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(batch.vertices[1].texcoord, [0.25, 0.75]);
        assert_eq!(batch.vertices[1].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn batches_split_by_material() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("two.mtl"), "newmtl red\nnewmtl blue\n").unwrap();
        std::fs::write(
            dir.path().join("two.obj"),
            format!("mtllib two.mtl\n{HINGE}usemtl blue\nf 1 2 3\nusemtl red\nf 2 1 4\nusemtl blue\nf 1 3 4\n"),
        )
        .unwrap();
        let loader = RecordingLoader::default();
        let model = Model::from_file(dir.path(), "two.obj", &loader).unwrap();
        let batches = build_group(&model, &model.groups()[0]);
        let materials: Vec<_> = batches.iter().map(|batch| batch.material).collect();
        assert_eq!(materials, [Some(1), Some(0)]);
        assert_eq!(batches[0].indices.len(), 6);
        assert_eq!(batches[1].indices.len(), 3);
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
        let vertex = MeshVertex {
            position: [1.0, 2.0, 3.0],
            ..MeshVertex::default()
        };
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..4], &1.0f32.to_ne_bytes());
    }
}

//! OBJ model loading

use std::io::{BufRead, Cursor};
use std::path::Path;

use super::{AssetError, LoadedAsset, Material, MeshGeometry, MeshNode, asset_name};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Load an OBJ file, resolving its MTL library next to it
pub fn load_obj(path: impl AsRef<Path>) -> Result<LoadedAsset, AssetError> {
    let path = path.as_ref();
    let shown = path.to_string_lossy().into_owned();

    let (models, materials) =
        tobj::load_obj(path, &load_options()).map_err(|e| AssetError::Parse {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

    let materials = materials.unwrap_or_else(|e| {
        tracing::warn!("No usable MTL for '{}': {}", shown, e);
        Vec::new()
    });

    build_asset(&asset_name(&shown), models, &materials)
}

/// Load an OBJ from bytes. MTL libraries cannot be resolved and are skipped.
pub fn load_obj_from_bytes(name: &str, data: &[u8]) -> Result<LoadedAsset, AssetError> {
    let mut cursor = Cursor::new(data);
    load_obj_from_reader(name, &mut cursor)
}

fn load_obj_from_reader(name: &str, reader: &mut impl BufRead) -> Result<LoadedAsset, AssetError> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default())).map_err(|e| {
            AssetError::Parse {
                path: name.to_string(),
                reason: e.to_string(),
            }
        })?;

    build_asset(&asset_name(name), models, &[])
}

fn build_asset(
    name: &str,
    models: Vec<tobj::Model>,
    materials: &[tobj::Material],
) -> Result<LoadedAsset, AssetError> {
    let meshes = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            let positions = mesh
                .positions
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            let normals = mesh
                .normals
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            let uvs = mesh
                .texcoords
                .chunks_exact(2)
                .map(|c| [c[0], c[1]])
                .collect();

            let material = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(material_from_mtl)
                .unwrap_or_default();

            MeshNode {
                name: model.name,
                geometry: MeshGeometry::new(positions, normals, uvs, mesh.indices),
                material,
            }
        })
        .collect();

    LoadedAsset::new(name, meshes)
}

fn material_from_mtl(mtl: &tobj::Material) -> Material {
    let shininess = mtl.shininess.unwrap_or(0.0).clamp(0.0, 1000.0);
    Material {
        base_color: mtl.diffuse.unwrap_or([1.0, 1.0, 1.0]),
        // Phong exponent to an approximate roughness
        roughness: (2.0 / (shininess + 2.0)).sqrt(),
        ..Default::default()
    }
}

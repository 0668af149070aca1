//! glTF 2.0 model loading (binary `.glb` and JSON `.gltf`)
//!
//! Node transforms are baked into the vertex data so the viewer can treat the
//! model as one rigid subject. Each mesh keeps the name of the node that
//! instances it, falling back to the mesh name. Base color images are kept
//! as RGBA8 and referenced from the material of every primitive using them.

use std::path::Path;

use glam::{Mat3, Mat4, Vec3};

use super::{
    AssetError, ColorMap, ColorTexture, LoadedAsset, Material, MeshGeometry, MeshNode, asset_name,
};

/// Load a glTF model from a file
pub fn load_gltf(path: impl AsRef<Path>) -> Result<LoadedAsset, AssetError> {
    let path = path.as_ref();
    let display = path.to_string_lossy().into_owned();
    let (document, buffers, images) = gltf::import(path).map_err(|e| map_error(&display, e))?;
    build_asset(&display, &document, &buffers, &images)
}

/// Load a glTF model from bytes. External buffer URIs cannot be resolved.
pub fn load_gltf_from_bytes(name: &str, data: &[u8]) -> Result<LoadedAsset, AssetError> {
    let (document, buffers, images) =
        gltf::import_slice(data).map_err(|e| map_error(name, e))?;
    build_asset(name, &document, &buffers, &images)
}

fn map_error(path: &str, error: gltf::Error) -> AssetError {
    match error {
        gltf::Error::Io(e) => AssetError::Io(format!("{path}: {e}")),
        other => AssetError::Parse {
            path: path.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Decoded document data the node walk reads from
struct Sources<'a> {
    buffers: &'a [gltf::buffer::Data],
    /// Image index to index into the asset's textures
    texture_slots: Vec<Option<usize>>,
}

fn build_asset(
    name: &str,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<LoadedAsset, AssetError> {
    let mut textures = Vec::new();
    let texture_slots: Vec<Option<usize>> = images
        .iter()
        .map(|image| {
            let texture = color_texture(image)?;
            textures.push(texture);
            Some(textures.len() - 1)
        })
        .collect();
    let sources = Sources {
        buffers,
        texture_slots,
    };

    let mut meshes = Vec::new();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &sources, &mut meshes);
            }
        }
        // No scene: take every root-level mesh node as-is
        None => {
            for node in document.nodes() {
                collect_node(&node, Mat4::IDENTITY, &sources, &mut meshes);
            }
        }
    }

    tracing::debug!(
        "glTF '{}': {} mesh primitive(s), {} texture(s)",
        name,
        meshes.len(),
        textures.len()
    );
    Ok(LoadedAsset::new(asset_name(name), meshes)?.with_textures(textures))
}

/// Expand an 8-bit glTF image to RGBA8
fn color_texture(image: &gltf::image::Data) -> Option<ColorTexture> {
    use gltf::image::Format;

    let pixels = &image.pixels;
    let rgba = match image.format {
        Format::R8G8B8A8 => pixels.clone(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&v| [v, v, v, u8::MAX]).collect(),
        other => {
            tracing::warn!("Unsupported texture format {:?}, using flat color", other);
            return None;
        }
    };
    ColorTexture::new(image.width, image.height, rgba)
}

fn collect_node(node: &gltf::Node, parent: Mat4, sources: &Sources<'_>, out: &mut Vec<MeshNode>) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = node.name().or(mesh.name()).unwrap_or("mesh");
        let normal_matrix = normal_matrix(world);

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    "Skipping non-triangle primitive of '{}' ({:?})",
                    name,
                    primitive.mode()
                );
                continue;
            }

            let reader = primitive
                .reader(|buffer| sources.buffers.get(buffer.index()).map(|d| d.0.as_slice()));

            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions
                .map(|p| world.transform_point3(Vec3::from(p)).to_array())
                .collect();

            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| {
                    iter.map(|n| {
                        (normal_matrix * Vec3::from(n))
                            .normalize_or(Vec3::Y)
                            .to_array()
                    })
                    .collect()
                })
                .unwrap_or_default();

            let pbr = primitive.material().pbr_metallic_roughness();
            let base_texture = pbr.base_color_texture();
            let map = base_texture
                .as_ref()
                .and_then(|info| {
                    let image = info.texture().source().index();
                    sources.texture_slots.get(image).copied().flatten()
                })
                .map_or(ColorMap::None, ColorMap::Texture);

            let uv_set = base_texture.as_ref().map_or(0, |info| info.tex_coord());
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(uv_set)
                .map(|t| t.into_f32().collect())
                .unwrap_or_default();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            // Mirroring transforms flip the winding
            let indices = if world.determinant() < 0.0 {
                indices
                    .chunks_exact(3)
                    .flat_map(|t| [t[0], t[2], t[1]])
                    .collect()
            } else {
                indices
            };

            let [r, g, b, _a] = pbr.base_color_factor();
            let material = Material {
                base_color: [r, g, b],
                metalness: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                map,
                ..Default::default()
            };

            out.push(MeshNode {
                name: name.to_string(),
                geometry: MeshGeometry::new(positions, normals, uvs, indices),
                material,
            });
        }
    }

    for child in node.children() {
        collect_node(&child, world, sources, out);
    }
}

fn normal_matrix(world: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(world);
    if linear.determinant() != 0.0 {
        linear.inverse().transpose()
    } else {
        linear
    }
}

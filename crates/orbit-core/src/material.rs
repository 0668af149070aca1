//! Material Binder
//!
//! Rewrites mesh materials once, right after the model resolves and before it
//! is handed to the renderer.

use crate::asset::{ColorMap, LoadedAsset};
use crate::config::MaterialProfile;
use crate::scene::srgb_hex_to_linear;

/// What a bind pass changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindReport {
    /// Meshes given the metal/rough treatment
    pub polished: usize,
    /// Meshes bound to the video source
    pub video_bound: usize,
}

/// Applies a [`MaterialProfile`] to every mesh of an asset
#[derive(Debug, Clone)]
pub struct MaterialBinder {
    profile: MaterialProfile,
}

impl MaterialBinder {
    pub fn new(profile: MaterialProfile) -> Self {
        Self { profile }
    }

    /// Apply the profile. Every touched material is flagged for re-upload.
    pub fn bind(&self, asset: &mut LoadedAsset) -> BindReport {
        let mut report = BindReport::default();

        match &self.profile {
            MaterialProfile::PolishedMetal {
                metalness,
                roughness,
            } => {
                for mesh in &mut asset.meshes {
                    mesh.material.metalness = *metalness;
                    mesh.material.roughness = *roughness;
                    mesh.material.needs_update = true;
                    report.polished += 1;
                }
            }
            MaterialProfile::VideoSubject {
                mesh_name,
                body_color,
                metalness,
                roughness,
            } => {
                let body = srgb_hex_to_linear(*body_color).to_array();
                for mesh in &mut asset.meshes {
                    if mesh.name == *mesh_name {
                        mesh.material.map = ColorMap::Video;
                        report.video_bound += 1;
                    } else {
                        mesh.material.base_color = body;
                        mesh.material.metalness = *metalness;
                        mesh.material.roughness = *roughness;
                        report.polished += 1;
                    }
                    mesh.material.needs_update = true;
                }
                if report.video_bound == 0 {
                    tracing::warn!(
                        "No mesh named '{}' in '{}'; video will not be shown",
                        mesh_name,
                        asset.name
                    );
                }
            }
        }

        tracing::debug!(
            "Bound materials of '{}': {} polished, {} video",
            asset.name,
            report.polished,
            report.video_bound
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Material, MeshGeometry, MeshNode};
    use crate::constants::TV_SCREEN_MESH;

    fn mesh(name: &str) -> MeshNode {
        MeshNode {
            name: name.to_string(),
            geometry: MeshGeometry::new(
                vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                vec![],
                vec![],
                vec![0, 1, 2],
            ),
            material: Material {
                metalness: 0.3,
                roughness: 0.6,
                ..Default::default()
            },
        }
    }

    fn asset(names: &[&str]) -> LoadedAsset {
        LoadedAsset::new("subject", names.iter().map(|n| mesh(n)).collect()).unwrap()
    }

    #[test]
    fn test_polished_metal_applies_to_every_mesh() {
        let mut asset = asset(&["beak", "body", "eye"]);
        let report = MaterialBinder::new(MaterialProfile::default()).bind(&mut asset);
        assert_eq!(report, BindReport { polished: 3, video_bound: 0 });
        for mesh in &asset.meshes {
            assert_eq!(mesh.material.metalness, 1.0);
            assert_eq!(mesh.material.roughness, 0.1);
            assert!(mesh.material.needs_update);
            assert_eq!(mesh.material.map, ColorMap::None);
        }
    }

    #[test]
    fn test_video_subject_binds_named_mesh_only() {
        let mut asset = asset(&["frame", TV_SCREEN_MESH, "stand"]);
        let report = MaterialBinder::new(MaterialProfile::tv_screen()).bind(&mut asset);
        assert_eq!(report, BindReport { polished: 2, video_bound: 1 });

        let screen = asset.mesh(TV_SCREEN_MESH).unwrap();
        assert_eq!(screen.material.map, ColorMap::Video);
        // Screen keeps its own metal/rough factors
        assert_eq!(screen.material.metalness, 0.3);
        assert_eq!(screen.material.roughness, 0.6);

        let body = srgb_hex_to_linear(0x839baa).to_array();
        for name in ["frame", "stand"] {
            let mesh = asset.mesh(name).unwrap();
            assert_eq!(mesh.material.base_color, body);
            assert_eq!(mesh.material.metalness, 1.0);
            assert_eq!(mesh.material.roughness, 0.1);
            assert_eq!(mesh.material.map, ColorMap::None);
        }
    }

    #[test]
    fn test_video_replaces_texture_on_screen_only() {
        let mut tv = asset(&["frame", TV_SCREEN_MESH]);
        for mesh in &mut tv.meshes {
            mesh.material.map = ColorMap::Texture(0);
        }
        MaterialBinder::new(MaterialProfile::tv_screen()).bind(&mut tv);
        assert_eq!(tv.mesh(TV_SCREEN_MESH).unwrap().material.map, ColorMap::Video);
        // Body color tints the decoded texture
        assert_eq!(tv.mesh("frame").unwrap().material.map, ColorMap::Texture(0));

        let mut toucan = asset(&["beak"]);
        toucan.meshes[0].material.map = ColorMap::Texture(0);
        MaterialBinder::new(MaterialProfile::default()).bind(&mut toucan);
        assert_eq!(toucan.meshes[0].material.map, ColorMap::Texture(0));
    }

    #[test]
    fn test_video_subject_without_match_binds_nothing() {
        let mut asset = asset(&["frame"]);
        let report = MaterialBinder::new(MaterialProfile::tv_screen()).bind(&mut asset);
        assert_eq!(report.video_bound, 0);
        assert_eq!(report.polished, 1);
    }
}

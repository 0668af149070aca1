//! [`RenderBackend`] over wgpu
//!
//! The backend draws into an offscreen [`RenderTarget`] whose resolved color
//! view the host composites. A resize replaces the target; the old one is
//! only dropped, never destroyed, because the host may still reference its
//! view until it remounts the new [`RenderSurface`].

use std::sync::Arc;

use glam::Mat4;
use wgpu::util::DeviceExt;

use orbit_core::config::OutputConfig;
use orbit_core::{
    DirectionalLight, EnvironmentMap, LoadedAsset, ModelId, OutputSettings, PerspectiveCamera,
    RenderBackend, RenderError, VideoFrame,
};

use crate::constants::{CLEAR_TRANSPARENT, MAX_LIGHTS};
use crate::mesh::{GpuMesh, MeshPipeline};
use crate::target::RenderTarget;
use crate::textures::{ModelTextures, StageTextures};
use crate::uniforms::SceneUniform;

/// Drawable surface handed to the host
#[derive(Clone)]
pub struct RenderSurface {
    /// Resolved color view
    pub view: Arc<wgpu::TextureView>,
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
    /// Bumped each time the target is replaced
    pub generation: u64,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("generation", &self.generation)
            .finish()
    }
}

struct GpuModel {
    id: ModelId,
    meshes: Vec<GpuMesh>,
    textures: ModelTextures,
}

struct GpuState {
    pipeline: MeshPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    textures: StageTextures,
    target: RenderTarget,
    models: Vec<GpuModel>,
}

/// wgpu render backend for one viewer
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    gpu: Option<GpuState>,
    settings: OutputSettings,
    scene: SceneUniform,
    next_model: u64,
    generation: u64,
}

impl WgpuBackend {
    /// Create a backend rendering in `format`, the format the host
    /// composites with
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        let pipeline = MeshPipeline::new(&device, format);

        let scene = SceneUniform::default();
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[scene]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: pipeline.scene_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let textures = StageTextures::new(&device, &queue, pipeline.texture_layout());
        let target = RenderTarget::new(&device, format, 1, 1);

        tracing::info!("WgpuBackend created (format {:?})", format);

        Self {
            device,
            queue,
            format,
            gpu: Some(GpuState {
                pipeline,
                scene_buffer,
                scene_bind_group,
                textures,
                target,
                models: Vec::new(),
            }),
            settings: OutputSettings::from(&OutputConfig::default()),
            scene,
            next_model: 0,
            generation: 0,
        }
    }

    fn clear_color(&self) -> wgpu::Color {
        if self.settings.alpha {
            CLEAR_TRANSPARENT
        } else {
            wgpu::Color::BLACK
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Surface = Option<RenderSurface>;

    fn set_output(&mut self, settings: OutputSettings) {
        self.scene.set_output(&settings);
        self.settings = settings;
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if gpu.target.size() == (width.max(1), height.max(1)) {
            return;
        }
        gpu.target = RenderTarget::new(&self.device, self.format, width, height);
        self.generation += 1;
        tracing::debug!(
            "Render target resized to {}x{} (generation {})",
            width,
            height,
            self.generation
        );
    }

    fn set_camera(&mut self, camera: &PerspectiveCamera) {
        self.scene.set_camera(camera);
    }

    fn add_light(&mut self, light: DirectionalLight) {
        if !self.scene.push_light(&light) {
            tracing::warn!("Light limit ({}) reached, light ignored", MAX_LIGHTS);
        }
    }

    fn set_environment(&mut self, map: &EnvironmentMap) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.textures
            .set_environment(&self.device, &self.queue, gpu.pipeline.texture_layout(), map);
        self.scene.has_env = 1;
        self.scene.env_intensity = map.intensity;
        tracing::info!("Environment installed ({}x{})", map.width, map.height);
    }

    fn add_model(&mut self, asset: &LoadedAsset) -> Result<ModelId, RenderError> {
        let gpu = self.gpu.as_mut().ok_or(RenderError::Disposed)?;
        if asset.meshes.is_empty() {
            return Err(RenderError::Upload(format!(
                "model '{}' has no meshes",
                asset.name
            )));
        }

        let textures = ModelTextures::upload(&self.device, &self.queue, asset);
        let meshes = asset
            .meshes
            .iter()
            .map(|mesh| {
                let base_color = textures
                    .view(mesh.material.map)
                    .unwrap_or(gpu.textures.white_view());
                GpuMesh::new(
                    &self.device,
                    gpu.pipeline.mesh_layout(),
                    mesh,
                    base_color,
                    gpu.textures.material_sampler(),
                    Mat4::IDENTITY,
                )
            })
            .collect();

        let id = ModelId(self.next_model);
        self.next_model += 1;
        tracing::info!(
            "Model '{}' uploaded as {:?} ({} meshes, {} triangles, {} textures)",
            asset.name,
            id,
            asset.mesh_count(),
            asset.triangle_count(),
            textures.uploaded_count()
        );
        gpu.models.push(GpuModel {
            id,
            meshes,
            textures,
        });
        Ok(id)
    }

    fn set_model_transform(&mut self, id: ModelId, transform: Mat4) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match gpu.models.iter_mut().find(|model| model.id == id) {
            Some(model) => {
                for mesh in &mut model.meshes {
                    mesh.update_transform(&self.queue, transform);
                }
            }
            None => tracing::warn!("set_model_transform: unknown {:?}", id),
        }
    }

    fn upload_video_frame(&mut self, frame: &VideoFrame) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.textures
            .upload_video(&self.device, &self.queue, gpu.pipeline.texture_layout(), frame);
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        let clear = self.clear_color();
        let gpu = self.gpu.as_ref().ok_or(RenderError::Disposed)?;

        self.queue
            .write_buffer(&gpu.scene_buffer, 0, bytemuck::cast_slice(&[self.scene]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Stage Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Stage Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: gpu.target.msaa_view(),
                    resolve_target: Some(gpu.target.color_view().as_ref()),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.target.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            gpu.pipeline
                .begin(&mut render_pass, &gpu.scene_bind_group, gpu.textures.bind_group());
            for model in &gpu.models {
                for mesh in &model.meshes {
                    gpu.pipeline.draw(&mut render_pass, mesh);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn surface(&self) -> Self::Surface {
        let gpu = self.gpu.as_ref()?;
        let (width, height) = gpu.target.size();
        Some(RenderSurface {
            view: Arc::clone(gpu.target.color_view()),
            width,
            height,
            generation: self.generation,
        })
    }

    fn dispose(&mut self) {
        let Some(gpu) = self.gpu.take() else {
            return;
        };
        let meshes: usize = gpu.models.iter().map(|model| model.meshes.len()).sum();
        for model in &gpu.models {
            for mesh in &model.meshes {
                mesh.destroy();
            }
            model.textures.destroy();
        }
        gpu.textures.destroy();
        gpu.target.destroy();
        gpu.scene_buffer.destroy();
        tracing::info!(
            "WgpuBackend disposed ({} models, {} meshes released)",
            gpu.models.len(),
            meshes
        );
    }
}

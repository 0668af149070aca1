//! Offscreen render targets

use std::sync::Arc;

use crate::constants::{DEPTH_FORMAT, SAMPLE_COUNT};

/// Resolved color texture plus the multisampled color and depth attachments
pub struct RenderTarget {
    color: wgpu::Texture,
    color_view: Arc<wgpu::TextureView>,
    msaa: wgpu::Texture,
    msaa_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Create targets of the given size (clamped to at least 1x1 and to the
    /// device limit)
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let max = device.limits().max_texture_dimension_2d;
        let width = width.clamp(1, max);
        let height = height.clamp(1, max);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Stage Color Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = Arc::new(color.create_view(&wgpu::TextureViewDescriptor::default()));

        let msaa = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Stage MSAA Texture"),
            size,
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let msaa_view = msaa.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Stage Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            msaa,
            msaa_view,
            depth,
            depth_view,
            width,
            height,
        }
    }

    /// Size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resolved color view the host composites
    pub fn color_view(&self) -> &Arc<wgpu::TextureView> {
        &self.color_view
    }

    /// Multisampled color attachment
    pub fn msaa_view(&self) -> &wgpu::TextureView {
        &self.msaa_view
    }

    /// Multisampled depth attachment
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Free the GPU memory now rather than when the last view drops
    pub fn destroy(&self) {
        self.color.destroy();
        self.msaa.destroy();
        self.depth.destroy();
    }
}

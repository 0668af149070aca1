//! Environment and video textures (group 2) and per-model base color
//! textures (group 1)

use std::borrow::Cow;

use orbit_core::{ColorMap, EnvironmentMap, LoadedAsset, VideoFrame};

use crate::constants::{BASE_COLOR_FORMAT, ENVIRONMENT_FORMAT, VIDEO_FORMAT};

/// Create the bind group layout for environment + video textures
pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Stage Texture Bind Group Layout"),
        entries: &[
            // Environment map, read with textureLoad
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            // Video frame
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn create_texture_2d(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_texture_2d(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    data: &[u8],
    bytes_per_texel: u32,
    width: u32,
    height: u32,
) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_texel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Nearest-neighbour downscale so neither side exceeds `max_dimension`
pub fn fit_environment(map: &EnvironmentMap, max_dimension: u32) -> Cow<'_, EnvironmentMap> {
    let largest = map.width.max(map.height);
    if largest <= max_dimension || max_dimension == 0 {
        return Cow::Borrowed(map);
    }

    let step = largest.div_ceil(max_dimension);
    let width = map.width.div_ceil(step);
    let height = map.height.div_ceil(step);
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let src = (((y * step) * map.width + x * step) * 4) as usize;
            data.extend_from_slice(&map.data[src..src + 4]);
        }
    }

    tracing::debug!(
        "Environment {}x{} downscaled to {}x{}",
        map.width,
        map.height,
        width,
        height
    );
    Cow::Owned(EnvironmentMap {
        width,
        height,
        data,
        intensity: map.intensity,
    })
}

/// Environment and video textures with their bind group, plus the white
/// base color bound by untextured meshes
pub struct StageTextures {
    environment: wgpu::Texture,
    environment_view: wgpu::TextureView,
    video: wgpu::Texture,
    video_view: wgpu::TextureView,
    video_size: (u32, u32),
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    white: wgpu::Texture,
    white_view: wgpu::TextureView,
    material_sampler: wgpu::Sampler,
}

impl StageTextures {
    /// Create 1x1 placeholder textures
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) -> Self {
        let environment = create_texture_2d(device, "Environment Texture", ENVIRONMENT_FORMAT, 1, 1);
        write_texture_2d(queue, &environment, bytemuck::cast_slice(&[0.0f32; 4]), 16, 1, 1);
        let environment_view = environment.create_view(&wgpu::TextureViewDescriptor::default());

        let video = create_texture_2d(device, "Video Texture", VIDEO_FORMAT, 1, 1);
        write_texture_2d(queue, &video, &[0, 0, 0, 255], 4, 1, 1);
        let video_view = video.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Video Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group =
            Self::create_bind_group(device, layout, &environment_view, &video_view, &sampler);

        let white = create_texture_2d(device, "White Base Color", BASE_COLOR_FORMAT, 1, 1);
        write_texture_2d(queue, &white, &[255; 4], 4, 1, 1);
        let white_view = white.create_view(&wgpu::TextureViewDescriptor::default());

        // glTF samplers default to repeat
        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            environment,
            environment_view,
            video,
            video_view,
            video_size: (1, 1),
            sampler,
            bind_group,
            white,
            white_view,
            material_sampler,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        environment: &wgpu::TextureView,
        video: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Stage Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(environment),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(video),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        self.bind_group = Self::create_bind_group(
            device,
            layout,
            &self.environment_view,
            &self.video_view,
            &self.sampler,
        );
    }

    /// Replace the environment texture
    pub fn set_environment(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        map: &EnvironmentMap,
    ) {
        let map = fit_environment(map, device.limits().max_texture_dimension_2d);
        let texture = create_texture_2d(
            device,
            "Environment Texture",
            ENVIRONMENT_FORMAT,
            map.width,
            map.height,
        );
        write_texture_2d(
            queue,
            &texture,
            bytemuck::cast_slice(&map.data),
            16,
            map.width,
            map.height,
        );

        self.environment.destroy();
        self.environment_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.environment = texture;
        self.rebuild_bind_group(device, layout);
    }

    /// Upload a video frame, reallocating when the frame size changes
    pub fn upload_video(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        frame: &VideoFrame,
    ) {
        if frame.rgba.len() != (frame.width * frame.height * 4) as usize {
            tracing::warn!(
                "Skipping malformed video frame {}x{} ({} bytes)",
                frame.width,
                frame.height,
                frame.rgba.len()
            );
            return;
        }

        if self.video_size != (frame.width, frame.height) {
            let texture =
                create_texture_2d(device, "Video Texture", VIDEO_FORMAT, frame.width, frame.height);
            self.video.destroy();
            self.video_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.video = texture;
            self.video_size = (frame.width, frame.height);
            self.rebuild_bind_group(device, layout);
            tracing::debug!("Video texture resized to {}x{}", frame.width, frame.height);
        }

        write_texture_2d(queue, &self.video, &frame.rgba, 4, frame.width, frame.height);
    }

    /// Bind group for group 2
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Base color view of meshes without a texture
    pub fn white_view(&self) -> &wgpu::TextureView {
        &self.white_view
    }

    /// Sampler for mesh base color textures
    pub fn material_sampler(&self) -> &wgpu::Sampler {
        &self.material_sampler
    }

    /// Release texture memory
    pub fn destroy(&self) {
        self.environment.destroy();
        self.video.destroy();
        self.white.destroy();
    }
}

/// Base color textures of one model, indexed like [`LoadedAsset::textures`]
pub struct ModelTextures {
    textures: Vec<Option<(wgpu::Texture, wgpu::TextureView)>>,
}

impl ModelTextures {
    /// Upload every texture of `asset` that fits the device limits
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, asset: &LoadedAsset) -> Self {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let textures = asset
            .textures
            .iter()
            .enumerate()
            .map(|(index, image)| {
                if image.width > max_dimension || image.height > max_dimension {
                    tracing::warn!(
                        "Texture {} of '{}' is {}x{}, over the device limit {}; using flat color",
                        index,
                        asset.name,
                        image.width,
                        image.height,
                        max_dimension
                    );
                    return None;
                }
                let texture = create_texture_2d(
                    device,
                    "Base Color Texture",
                    BASE_COLOR_FORMAT,
                    image.width,
                    image.height,
                );
                write_texture_2d(queue, &texture, &image.rgba, 4, image.width, image.height);
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                Some((texture, view))
            })
            .collect();
        Self { textures }
    }

    /// View a mesh with `map` samples, `None` for flat and video meshes
    pub fn view(&self, map: ColorMap) -> Option<&wgpu::TextureView> {
        match map {
            ColorMap::Texture(index) => self
                .textures
                .get(index)
                .and_then(|slot| slot.as_ref())
                .map(|(_, view)| view),
            ColorMap::None | ColorMap::Video => None,
        }
    }

    /// Number of textures that made it to the GPU
    pub fn uploaded_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    /// Release texture memory
    pub fn destroy(&self) {
        for (texture, _) in self.textures.iter().flatten() {
            texture.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> EnvironmentMap {
        let data = (0..width * height)
            .flat_map(|i| [i as f32, 0.0, 0.0, 1.0])
            .collect();
        EnvironmentMap::from_rgba(width, height, data).unwrap()
    }

    #[test]
    fn test_fit_keeps_small_maps() {
        let map = gradient(8, 4);
        assert!(matches!(fit_environment(&map, 8), Cow::Borrowed(_)));
    }

    #[test]
    fn test_fit_downscales_large_maps() {
        let map = gradient(16, 8);
        let fitted = fit_environment(&map, 4);
        assert_eq!((fitted.width, fitted.height), (4, 2));
        assert_eq!(fitted.data.len(), 4 * 2 * 4);
        // Second texel of the first row comes from source column 4
        assert_eq!(fitted.data[4], 4.0);
        // First texel of the second row comes from source row 4
        assert_eq!(fitted.data[16], (4 * 16) as f32);
    }
}

use bytemuck::{Pod, Zeroable};

/// One textured quad, as consumed by `shaders/sprite.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct SpriteInstance {
    /// Destination rect in output pixels: x, y, w, h.
    pub dst: [f32; 4],
    /// Source rect in texture UV space: u, v, w, h. Negative extents mirror.
    pub uv: [f32; 4],
    /// Colour/alpha modulation.
    pub tint: [f32; 4],
    /// Rotation in radians, then the rotation center relative to `dst`'s corner.
    pub transform: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct ScreenGlobals {
    // xy = [2.0/output_w, 2.0/output_h]
    pub screen: [f32; 4],
}

impl ScreenGlobals {
    pub(crate) fn for_output(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            screen: [2.0 / w, 2.0 / h, 1.0 / w, 1.0 / h],
        }
    }
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x4, // dst
        1 => Float32x4, // uv
        2 => Float32x4, // tint
        3 => Float32x4, // transform
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Bind group layouts, the shared sampler and the per-frame instance buffer.
pub(crate) struct SpriteRenderer {
    pub(crate) sampler: wgpu::Sampler,
    pub(crate) texture_bind_group_layout: wgpu::BindGroupLayout,
    pub(crate) globals_bind_group_layout: wgpu::BindGroupLayout,
    pub(crate) globals_bind_group: wgpu::BindGroup,
    globals_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_stride: u32,
    max_instances: u32,
}

impl SpriteRenderer {
    pub(crate) fn new(device: &wgpu::Device, max_instances: u32) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_globals_ubo"),
            size: std::mem::size_of::<ScreenGlobals>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let instance_stride = std::mem::size_of::<SpriteInstance>() as u32;
        let instance_buffer = Self::create_instance_buffer(device, instance_stride, max_instances);

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("sprite_texture_bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        // Nearest filtering keeps sprite sheet cells crisp when stretched.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            anisotropy_clamp: 1,
            border_color: None,
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("sprite_globals_bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<ScreenGlobals>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_globals_bg"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        Self {
            sampler,
            texture_bind_group_layout,
            globals_bind_group_layout,
            globals_bind_group,
            globals_buffer,
            instance_buffer,
            instance_stride,
            max_instances,
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, stride: u32, count: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_instance_buffer"),
            size: stride as wgpu::BufferAddress * count.max(1) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub(crate) fn create_texture_bind_group(
        &self,
        device: &wgpu::Device,
        texture_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_texture_bg"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    pub(crate) fn upload_globals(&self, queue: &wgpu::Queue, globals: &ScreenGlobals) {
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(globals));
    }

    /// Uploads the whole frame's instances, growing the buffer when needed.
    pub(crate) fn upload_instances(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[SpriteInstance],
    ) {
        if instances.is_empty() {
            return;
        }
        let count = instances.len() as u32;
        if count > self.max_instances {
            let grown = count.next_power_of_two();
            log::debug!("growing sprite instance buffer {} -> {}", self.max_instances, grown);
            self.instance_buffer = Self::create_instance_buffer(device, self.instance_stride, grown);
            self.max_instances = grown;
        }
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
    }

    pub(crate) fn draw_batch(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        texture_bind_group: &wgpu::BindGroup,
        instance_range: std::ops::Range<u32>,
    ) {
        if instance_range.is_empty() {
            return;
        }
        pass.set_pipeline(pipeline);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.set_bind_group(0, texture_bind_group, &[]);
        pass.set_bind_group(1, &self.globals_bind_group, &[]);
        pass.draw(0..4, instance_range);
    }
}

//! Core Graphics structure and initialization.

use crate::config;
use crate::platform;
use crate::sprite_batch::{SpriteInstance, SpriteRenderer};

use super::textures::TextureEntry;

const INITIAL_INSTANCES: u32 = 1024;

pub(crate) struct Graphics {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) config: wgpu::SurfaceConfiguration,
    /// Format the frame is rendered through; never sRGB, so blending happens on stored values.
    pub(crate) render_format: wgpu::TextureFormat,
    pub(crate) sprite_renderer: SpriteRenderer,
    pub(crate) blend_pipeline: wgpu::RenderPipeline,
    pub(crate) opaque_pipeline: wgpu::RenderPipeline,
    pub(crate) textures: Vec<Option<TextureEntry>>,
    pub(crate) free_slots: Vec<u32>,
    pub(crate) pending_release: Vec<u32>,
    pub(crate) batch: Vec<SpriteInstance>,
}

impl Graphics {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("blitkit_device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, render_format) = pick_formats(&surface_caps.formats)
            .ok_or_else(|| anyhow::anyhow!("surface reports no supported formats"))?;

        let usage = platform::surface_usage(&surface_caps);
        let present_mode = pick_present_mode(&surface_caps);
        log::debug!(
            "surface format {surface_format:?} (rendered as {render_format:?}), present mode {present_mode:?}"
        );

        let config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: if render_format == surface_format {
                vec![]
            } else {
                vec![render_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sprite_renderer = SpriteRenderer::new(&device, INITIAL_INSTANCES);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[
                &sprite_renderer.texture_bind_group_layout,
                &sprite_renderer.globals_bind_group_layout,
            ],
            immediate_size: 0,
        });

        let blend_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            render_format,
            wgpu::BlendState::ALPHA_BLENDING,
            "sprite_blend_pipeline",
        );
        let opaque_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            render_format,
            wgpu::BlendState::REPLACE,
            "sprite_opaque_pipeline",
        );

        Ok(Self {
            device,
            queue,
            config,
            render_format,
            sprite_renderer,
            blend_pipeline,
            opaque_pipeline,
            textures: Vec::new(),
            free_slots: Vec::new(),
            pending_release: Vec::new(),
            batch: Vec::with_capacity(INITIAL_INSTANCES as usize),
        })
    }

    pub fn resize(&mut self, surface: &wgpu::Surface<'_>, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        surface.configure(&self.device, &self.config);
    }

    pub(crate) fn reconfigure(&mut self, surface: &wgpu::Surface<'_>) {
        surface.configure(&self.device, &self.config);
    }
}

/// Picks the surface format and the view format frames are rendered through.
///
/// The view never has the sRGB suffix: blending and modulation act on the
/// stored 8-bit values. A plain format is preferred for the surface itself.
pub(crate) fn pick_formats(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    let surface = formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())?;
    Some((surface, surface.remove_srgb_suffix()))
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[SpriteInstance::layout()],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// Honours `BLITKIT_PRESENT_MODE` when supported, otherwise prefers an
/// unsynchronised mode since the frame loop does its own pacing.
pub(crate) fn pick_present_mode(surface_caps: &wgpu::SurfaceCapabilities) -> wgpu::PresentMode {
    if let Some(requested) = config::present_mode_from_env() {
        let auto = matches!(
            requested,
            wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync
        );
        if auto || surface_caps.present_modes.contains(&requested) {
            return requested;
        }
        log::warn!("present mode {requested:?} not supported by this surface");
    }

    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|m| surface_caps.present_modes.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn plain_surface_format_is_preferred() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            pick_formats(&formats),
            Some((TextureFormat::Bgra8Unorm, TextureFormat::Bgra8Unorm))
        );
    }

    #[test]
    fn srgb_only_surface_is_rendered_through_a_plain_view() {
        let formats = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(
            pick_formats(&formats),
            Some((TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgba8Unorm))
        );
    }

    #[test]
    fn no_formats() {
        assert_eq!(pick_formats(&[]), None);
    }
}

//! Batch rendering and frame submission.

use crate::Context;
use crate::drawable::DrawCommand;
use crate::sprite_batch::ScreenGlobals;
use crate::texture::BlendMode;

use super::Graphics;

/// A run of consecutive draws sharing texture and blend mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Batch {
    pub texture: u32,
    pub blend: BlendMode,
    pub range: std::ops::Range<u32>,
}

/// Groups consecutive commands that can be drawn with one call, preserving order.
pub(super) fn build_batches(commands: &[DrawCommand]) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for (i, cmd) in commands.iter().enumerate() {
        let i = i as u32;
        match batches.last_mut() {
            Some(b) if b.texture == cmd.texture && b.blend == cmd.blend => b.range.end = i + 1,
            _ => batches.push(Batch {
                texture: cmd.texture,
                blend: cmd.blend,
                range: i..i + 1,
            }),
        }
    }
    batches
}

impl Graphics {
    /// Clears the output, executes the context's draw list in order and presents.
    pub fn draw_context(
        &mut self,
        surface: &wgpu::Surface<'_>,
        context: &Context,
    ) -> Result<(), wgpu::SurfaceError> {
        let (w, h) = context.output_size();
        if w.max(1) != self.config.width || h.max(1) != self.config.height {
            self.resize(surface, w, h);
        }

        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_format),
            ..Default::default()
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("graphics_encoder"),
            });

        let commands = context.draw_list();
        self.batch.clear();
        self.batch.extend(commands.iter().map(|c| c.instance));
        self.sprite_renderer
            .upload_globals(&self.queue, &ScreenGlobals::for_output(w, h));
        self.sprite_renderer
            .upload_instances(&self.device, &self.queue, &self.batch);
        let batches = build_batches(commands);

        let clear = clear_value(context.clear_color());
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("graphics_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for batch in &batches {
                let Some(entry) = self.texture(batch.texture) else {
                    log::warn!("skipping draw of missing texture #{}", batch.texture);
                    continue;
                };
                let pipeline = match batch.blend {
                    BlendMode::Blend => &self.blend_pipeline,
                    BlendMode::None => &self.opaque_pipeline,
                };
                self.sprite_renderer.draw_batch(
                    &mut rpass,
                    pipeline,
                    &entry.bind_group,
                    batch.range.clone(),
                );
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.flush_released();
        Ok(())
    }
}

/// Clear value for the non-sRGB render view: the 8-bit colour, unconverted.
fn clear_value(color: crate::Color) -> wgpu::Color {
    let [r, g, b, a] = color.to_f32();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite_batch::SpriteInstance;

    fn cmd(texture: u32, blend: BlendMode) -> DrawCommand {
        DrawCommand {
            texture,
            blend,
            instance: SpriteInstance {
                dst: [0.0; 4],
                uv: [0.0; 4],
                tint: [1.0; 4],
                transform: [0.0; 4],
            },
        }
    }

    #[test]
    fn consecutive_draws_share_a_batch() {
        let cmds = [
            cmd(1, BlendMode::None),
            cmd(2, BlendMode::Blend),
            cmd(2, BlendMode::Blend),
            cmd(1, BlendMode::None),
        ];
        let batches = build_batches(&cmds);
        assert_eq!(
            batches,
            vec![
                Batch { texture: 1, blend: BlendMode::None, range: 0..1 },
                Batch { texture: 2, blend: BlendMode::Blend, range: 1..3 },
                Batch { texture: 1, blend: BlendMode::None, range: 3..4 },
            ]
        );
    }

    #[test]
    fn blend_change_splits_a_batch() {
        let cmds = [cmd(3, BlendMode::Blend), cmd(3, BlendMode::None)];
        assert_eq!(build_batches(&cmds).len(), 2);
    }

    #[test]
    fn empty_list_has_no_batches() {
        assert!(build_batches(&[]).is_empty());
    }

    #[test]
    fn clear_colour_is_not_linearised() {
        let c = clear_value(crate::Color::new(127, 0, 255, 255));
        assert_eq!(c.r, (127.0f32 / 255.0) as f64);
        assert_eq!((c.g, c.b, c.a), (0.0, 1.0, 1.0));
    }
}

//! Texture registry: creation, partial uploads and deferred release.

use crate::Rect;

use super::Graphics;

pub(crate) struct GpuTexture {
    pub width: u32,
    pub height: u32,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

impl GpuTexture {
    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<Self> {
        let expected = crate::surface::rgba_len(width, height)?;
        if rgba.len() != expected {
            anyhow::bail!(
                "invalid rgba length: got {}, expected {}",
                rgba.len(),
                expected
            );
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("blitkit_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let tex = Self {
            width,
            height,
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            texture,
        };
        tex.write(queue, Rect::sized(width, height), rgba);
        Ok(tex)
    }

    /// Writes tightly packed RGBA8 pixels into `rect`, which must lie inside the texture.
    fn write(&self, queue: &wgpu::Queue, rect: Rect, rgba: &[u8]) {
        let (w, h) = (rect.w as u32, rect.h as u32);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: rect.x as u32,
                    y: rect.y as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }
}

pub(crate) struct TextureEntry {
    pub gpu: GpuTexture,
    pub bind_group: wgpu::BindGroup,
}

impl Graphics {
    pub(crate) fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<u32> {
        if width == 0 || height == 0 {
            anyhow::bail!("texture size {width}x{height} is empty");
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            anyhow::bail!("texture size {width}x{height} exceeds device limit {max}");
        }

        let gpu = GpuTexture::from_rgba8(&self.device, &self.queue, width, height, rgba)?;
        let bind_group = self
            .sprite_renderer
            .create_texture_bind_group(&self.device, &gpu.view);
        let entry = TextureEntry { gpu, bind_group };

        let id = match self.free_slots.pop() {
            Some(id) => {
                self.textures[id as usize] = Some(entry);
                id
            }
            None => {
                self.textures.push(Some(entry));
                (self.textures.len() - 1) as u32
            }
        };
        log::debug!("created texture #{id} ({width}x{height})");
        Ok(id)
    }

    pub(crate) fn write_texture(&mut self, id: u32, rect: Rect, rgba: &[u8]) -> anyhow::Result<()> {
        let entry = self
            .texture(id)
            .ok_or_else(|| anyhow::anyhow!("texture #{id} does not exist"))?;
        let bounds = Rect::sized(entry.gpu.width, entry.gpu.height);
        if bounds.intersection(&rect) != Some(rect) {
            anyhow::bail!("update rect {rect:?} is outside texture #{id}");
        }
        entry.gpu.write(&self.queue, rect, rgba);
        Ok(())
    }

    pub(crate) fn texture(&self, id: u32) -> Option<&TextureEntry> {
        self.textures.get(id as usize).and_then(|t| t.as_ref())
    }

    /// Marks a texture for release once the frame in flight has been submitted.
    pub(crate) fn release_texture(&mut self, id: u32) {
        if self.texture(id).is_some() && !self.pending_release.contains(&id) {
            self.pending_release.push(id);
        }
    }

    pub(crate) fn flush_released(&mut self) {
        for id in std::mem::take(&mut self.pending_release) {
            if let Some(slot) = self.textures.get_mut(id as usize) {
                if slot.take().is_some() {
                    log::debug!("released texture #{id}");
                    self.free_slots.push(id);
                }
            }
        }
    }
}

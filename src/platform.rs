use std::sync::{Mutex, OnceLock};

use crate::graphics::Graphics;

static GLOBAL_GRAPHICS: OnceLock<Mutex<Graphics>> = OnceLock::new();

pub(crate) fn set_global_graphics(graphics: Graphics) -> anyhow::Result<()> {
    GLOBAL_GRAPHICS
        .set(Mutex::new(graphics))
        .map_err(|_| anyhow::anyhow!("renderer already initialized; run() can only be called once per process"))
}

/// Runs `f` against the process-wide renderer.
///
/// Fails when no window is running yet: textures can only be created from
/// inside a scene.
pub(crate) fn with_graphics<R>(f: impl FnOnce(&mut Graphics) -> R) -> anyhow::Result<R> {
    let mutex = GLOBAL_GRAPHICS
        .get()
        .ok_or_else(|| anyhow::anyhow!("renderer not initialized; create textures from inside a running scene"))?;
    let mut g = mutex
        .lock()
        .map_err(|_| anyhow::anyhow!("renderer mutex poisoned"))?;
    Ok(f(&mut g))
}

pub(crate) fn surface_usage(surface_caps: &wgpu::SurfaceCapabilities) -> wgpu::TextureUsages {
    let desired_usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST;
    if surface_caps.usages.contains(desired_usage) {
        desired_usage
    } else {
        wgpu::TextureUsages::RENDER_ATTACHMENT
    }
}

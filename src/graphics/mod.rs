//! Renderer backend: device setup, the texture registry and frame submission.

mod core;
mod render;
mod textures;

pub(crate) use core::Graphics;

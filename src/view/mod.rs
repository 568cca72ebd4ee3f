// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;
pub mod uniforms;

pub use render::{RenderTarget, ScenePass, SceneRenderer, FULLSCREEN_QUAD};
pub use gpu_init::GpuContext;
pub use uniforms::{SceneConstants, SceneUniforms, UniformBuilder, UniformSet};

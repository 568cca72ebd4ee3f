/// Startup failures. All of them are fatal: the frame loop never starts.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    #[error("no supported rendering backend available: {0}")]
    ContextUnavailable(String),
    #[error("shader program failed to build: {0}")]
    Shader(String),
    #[error("canvas setup failed: {0}")]
    Canvas(String),
}

/// Failures while issuing a frame. Fatal for the session.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

// MODEL: Camera and viewport state
pub mod camera;
pub mod viewport;

pub use camera::Camera;
pub use viewport::Viewport;

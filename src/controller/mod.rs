// CONTROLLER: Input, timing, quality and the frame loop
pub mod input;
pub mod frame_clock;
pub mod quality;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputProcessor, KeyBindings, Modifiers, MouseButton};
pub use frame_clock::{FrameClock, FrameTiming};
pub use quality::{QualityController, QualityRegime};
pub use camera_controller::CameraController;
pub use frame_loop::{FrameLoopContext, FrameScheduler};

pub mod gamepad;
pub mod hitmap;
pub mod input;
pub mod renderer;
pub mod sound;

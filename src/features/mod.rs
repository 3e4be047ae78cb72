// Event-driven features
pub mod command_gate;
pub mod text_commands;
pub mod welcome;
pub mod welcome_image;

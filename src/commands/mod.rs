// Slash commands and their text-message forms
pub mod fun;
pub mod help;
pub mod info;
pub mod ping;
pub mod welcome;

pub mod bluetooth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod daemon;
pub mod drivers;
pub mod input;
pub mod keymap;
pub mod sync;

pub mod animator;
pub mod canvas;
pub mod config;
pub mod context;
pub mod error;
pub mod food;
pub mod game;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod snake;
pub mod terminal_runtime;
pub mod timer;

pub mod ui {
    pub mod hud;
}

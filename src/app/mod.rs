pub mod game;
pub mod level_select;
pub mod menu;
pub mod pause;
pub mod progress_screen;
pub mod state;

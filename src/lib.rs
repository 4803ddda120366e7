pub mod animation;
pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod dataset;
pub mod legend;
pub mod map;
pub mod resolve;
pub mod scale;
pub mod series;
pub mod state;
pub mod transition;
pub mod ui;

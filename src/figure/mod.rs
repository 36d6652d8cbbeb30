//! Figure configuration and prompt building.

mod config;
mod prompt;

pub use config::{
    Background, Environment, FigureConfig, Lighting, Material, Pose, Style, UnknownOption,
    PRESET_HELD_ITEMS,
};
pub use prompt::{build_prompt, diorama_clause, MODELING_SCREEN_CLAUSE};

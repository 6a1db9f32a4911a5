// Library exports for chartdash

pub mod data;
pub mod error;
pub mod export;
pub mod ingest;
pub mod palette;
pub mod project;
pub mod render;

use serde::Deserialize;

/// Output canvas settings for rendering.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: None,
        }
    }
}

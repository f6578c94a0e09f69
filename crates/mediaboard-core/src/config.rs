//! Scene construction config.

use crate::error::{SceneError, SceneResult};
use kurbo::Size;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LAYOUT_WIDTH: f64 = 1280.0;
pub const DEFAULT_LAYOUT_HEIGHT: f64 = 720.0;

/// Configuration for a scene and the element hosting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    #[serde(default = "default_width")]
    pub layout_width: f64,
    #[serde(default = "default_height")]
    pub layout_height: f64,
    /// Id of the element the canvas is mounted in.
    #[serde(default)]
    pub container: String,
}

fn default_width() -> f64 {
    DEFAULT_LAYOUT_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_LAYOUT_HEIGHT
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            layout_width: DEFAULT_LAYOUT_WIDTH,
            layout_height: DEFAULT_LAYOUT_HEIGHT,
            container: String::new(),
        }
    }
}

impl SceneConfig {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, width: f64, height: f64) -> Self {
        self.layout_width = width;
        self.layout_height = height;
        self
    }

    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(SceneError::MalformedDocument)
    }

    /// Canvas size, with non-positive dimensions replaced by the defaults.
    pub fn layout_size(&self) -> Size {
        let pick = |v: f64, default: f64| if v > 0.0 { v } else { default };
        Size::new(
            pick(self.layout_width, DEFAULT_LAYOUT_WIDTH),
            pick(self.layout_height, DEFAULT_LAYOUT_HEIGHT),
        )
    }
}

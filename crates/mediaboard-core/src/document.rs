//! JSON snapshot format for a scene.

use crate::error::{SceneError, SceneResult};
use crate::item::Placement;
use serde::{Deserialize, Serialize};

/// One placed item as written to the snapshot.
///
/// Every field is optional on input; missing geometry falls back to the
/// defaults applied when the item is added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Source link (URL or data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ItemRecord {
    pub fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// A scene snapshot: `{ "data": [ ... ] }` in z-order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub data: Vec<ItemRecord>,
}

impl SceneDocument {
    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self).map_err(SceneError::Serialization)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(SceneError::MalformedDocument)
    }
}

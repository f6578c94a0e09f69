//! Mediaboard Core Library
//!
//! Platform-agnostic placement, resize and snapshot engine for images and
//! videos laid out on a fixed-size canvas.

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod input;
pub mod item;
pub mod media;
pub mod scene;

pub use config::SceneConfig;
pub use document::{ItemRecord, SceneDocument};
pub use error::{MediaLoadError, SceneError, SceneResult};
pub use geometry::{Corner, Corners, MIN_EXTENT, clamp_position};
pub use input::{PointerEvent, PointerRouter};
pub use item::{DragState, HANDLE_RADIUS, Handle, Handles, Item, ItemId, Placement, ResizeOutcome};
pub use media::{MediaKind, MediaSource, PlaybackSet, PlaybackToken};
pub use scene::{ItemDescriptor, LoadOutcome, LoadRequest, Scene};

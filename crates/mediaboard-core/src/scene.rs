//! Scene: the ordered collection of items placed on one canvas.

use crate::config::SceneConfig;
use crate::document::SceneDocument;
use crate::error::{MediaLoadError, SceneResult};
use crate::geometry::Corner;
use crate::item::{Item, ItemId, Placement, ResizeOutcome};
use crate::media::{MediaSource, PlaybackToken};
use kurbo::{Point, Size};
use serde::Deserialize;
use std::collections::HashMap;

/// Input for adding an item: a link plus optional explicit geometry.
///
/// Deserializes from either a bare link string or an object
/// `{ link, width?, height?, x?, y? }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "DescriptorInput")]
pub struct ItemDescriptor {
    pub link: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl ItemDescriptor {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

impl From<&str> for ItemDescriptor {
    fn from(link: &str) -> Self {
        Self::new(link)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorInput {
    Link(String),
    Full {
        link: String,
        width: Option<f64>,
        height: Option<f64>,
        x: Option<f64>,
        y: Option<f64>,
    },
}

impl From<DescriptorInput> for ItemDescriptor {
    fn from(input: DescriptorInput) -> Self {
        match input {
            DescriptorInput::Link(link) => Self::new(link),
            DescriptorInput::Full {
                link,
                width,
                height,
                x,
                y,
            } => Self {
                link,
                width,
                height,
                x,
                y,
            },
        }
    }
}

/// Media the host must fetch and decode for a newly added item.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub item: ItemId,
    pub source: MediaSource,
}

/// What happened when a media load completed.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The item is sized and interactive. Videos carry their refresh token.
    Ready { playback: Option<PlaybackToken> },
    /// The media could not be used; the item was removed.
    Failed(MediaLoadError),
    /// The item was removed or cleared before its media arrived.
    Stale,
}

/// A fixed-size canvas and the items placed on it.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    size: Size,
    /// All items, keyed by ID.
    items: HashMap<ItemId, Item>,
    /// Z-order of items (back to front). Also insertion order.
    z_order: Vec<ItemId>,
    /// Whether the scene changed since the renderer last drew it.
    dirty: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let size = config.layout_size();
        Self {
            config,
            size,
            items: HashMap::new(),
            z_order: Vec::new(),
            dirty: true,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Canvas size.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    /// Items in z-order (back to front).
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.z_order.iter().filter_map(|id| self.items.get(id))
    }

    /// Item IDs in z-order (back to front).
    pub fn z_order(&self) -> &[ItemId] {
        &self.z_order
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return whether a redraw is due and reset the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Add a link with default geometry.
    pub fn add_link(&mut self, link: &str) -> SceneResult<LoadRequest> {
        self.add_item(ItemDescriptor::new(link))
    }

    /// Add a pending item on top of the z-order.
    ///
    /// The caller decodes the media for the returned request and reports back
    /// through [`Scene::complete_load`]. Nothing is inserted for a malformed link.
    pub fn add_item(&mut self, descriptor: impl Into<ItemDescriptor>) -> SceneResult<LoadRequest> {
        let descriptor = descriptor.into();
        let source = MediaSource::parse(descriptor.link.clone())?;
        Ok(self.insert(source, descriptor.placement()))
    }

    fn insert(&mut self, source: MediaSource, placement: Placement) -> LoadRequest {
        let item = Item::new(source.clone(), placement);
        let id = item.id();
        log::debug!("Added {:?} item {} for {}", source.kind, id, source.link);
        self.z_order.push(id);
        self.items.insert(id, item);
        self.dirty = true;
        LoadRequest { item: id, source }
    }

    /// Report the result of decoding an item's media.
    ///
    /// `natural` is the media's intrinsic size. Completions for items that are
    /// no longer in the scene are ignored.
    pub fn complete_load(
        &mut self,
        id: ItemId,
        natural: Result<Size, MediaLoadError>,
    ) -> LoadOutcome {
        let Some(item) = self.items.get_mut(&id) else {
            log::warn!("Ignoring media load for item {} no longer in scene", id);
            return LoadOutcome::Stale;
        };
        if item.is_ready() {
            log::warn!("Ignoring repeated media load for item {}", id);
            return LoadOutcome::Stale;
        }

        let result = natural.and_then(|size| item.finish_load(size));
        match result {
            Ok(()) => {
                let playback = item.source().is_video().then(|| item.start_playback());
                log::debug!("Item {} ready at {:?} size {:?}", id, item.position(), item.size());
                self.dirty = true;
                LoadOutcome::Ready { playback }
            }
            Err(err) => {
                log::warn!("{}", err);
                self.remove_item(id);
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Remove one item. Its playback, if any, stops.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let item = self.items.remove(&id)?;
        self.z_order.retain(|&item_id| item_id != id);
        self.dirty = true;
        Some(item)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        log::debug!("Clearing {} items", self.items.len());
        self.items.clear();
        self.z_order.clear();
        self.dirty = true;
    }

    /// Take out the host-side entries whose item is no longer in the scene.
    pub fn evict_dead<T>(&self, entries: &mut HashMap<ItemId, T>) -> Vec<T> {
        let dead: Vec<ItemId> = entries
            .keys()
            .filter(|id| !self.items.contains_key(id))
            .copied()
            .collect();
        dead.into_iter().filter_map(|id| entries.remove(&id)).collect()
    }

    pub fn begin_body_drag(&mut self, id: ItemId) -> bool {
        self.items.get_mut(&id).is_some_and(Item::begin_body_drag)
    }

    pub fn begin_handle_drag(&mut self, id: ItemId, corner: Corner) -> bool {
        self.items
            .get_mut(&id)
            .is_some_and(|item| item.begin_handle_drag(corner))
    }

    /// Move an item's body to `to` (canvas coordinates), clamped to the canvas.
    pub fn drag_body(&mut self, id: ItemId, to: Point) -> Option<Point> {
        let size = self.size;
        let moved = self.items.get_mut(&id)?.on_body_drag_move(to, size);
        if moved.is_some() {
            self.dirty = true;
        }
        moved
    }

    /// Move a handle to `local` (item-local coordinates).
    pub fn drag_handle(&mut self, id: ItemId, corner: Corner, local: Point) -> ResizeOutcome {
        let outcome = match self.items.get_mut(&id) {
            Some(item) => item.on_handle_drag_move(corner, local),
            None => ResizeOutcome::Ignored,
        };
        if outcome != ResizeOutcome::Ignored {
            self.dirty = true;
        }
        outcome
    }

    pub fn end_drag(&mut self, id: ItemId) -> bool {
        let ended = self.items.get_mut(&id).is_some_and(Item::end_drag);
        if ended {
            self.dirty = true;
        }
        ended
    }

    /// Snapshot every item in z-order.
    pub fn export_state(&self) -> SceneDocument {
        SceneDocument {
            data: self.items().map(Item::record).collect(),
        }
    }

    /// Snapshot as pretty-printed JSON.
    pub fn export_json(&self) -> SceneResult<String> {
        let json = self.export_state().to_json()?;
        log::info!("Exported {} items", self.len());
        Ok(json)
    }

    /// Replace the scene with the items described by `json`.
    ///
    /// The text and every record's link are validated before anything is
    /// cleared, so a rejected import leaves the scene untouched.
    pub fn import_state(&mut self, json: &str) -> SceneResult<Vec<LoadRequest>> {
        let document = SceneDocument::from_json(json)?;
        let records = document
            .data
            .iter()
            .map(|record| -> SceneResult<(MediaSource, Placement)> {
                let link = record.image.clone().unwrap_or_default();
                Ok((MediaSource::parse(link)?, record.placement()))
            })
            .collect::<SceneResult<Vec<_>>>()?;

        self.clear();
        let requests: Vec<LoadRequest> = records
            .into_iter()
            .map(|(source, placement)| self.insert(source, placement))
            .collect();
        log::info!("Imported {} items", requests.len());
        Ok(requests)
    }
}

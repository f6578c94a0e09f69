//! The `MediaBoard` object exposed to page scripts.

use crate::loader::{self, MediaElement};
use crate::render;
use crate::web::{document, js_error, request_animation_frame};
use kurbo::{Point, Size};
use mediaboard_core::{
    ItemDescriptor, ItemId, LoadOutcome, LoadRequest, MediaLoadError, PlaybackSet, PointerEvent,
    PointerRouter, Scene, SceneConfig, SceneError,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

/// State shared between the board and its event callbacks.
pub(crate) struct Shared {
    pub(crate) scene: RefCell<Scene>,
    pub(crate) router: RefCell<PointerRouter>,
    /// Decoded content for each item, including pending ones.
    pub(crate) media: RefCell<HashMap<ItemId, MediaElement>>,
    /// Playing videos, refreshed together by one frame loop.
    pub(crate) videos: RefCell<PlaybackSet<HtmlVideoElement>>,
    pub(crate) video_loop_running: Cell<bool>,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    redraw_pending: Cell<bool>,
}

impl Shared {
    /// Feed a media load result back into the scene.
    pub(crate) fn finish_load(self: &Rc<Self>, id: ItemId, natural: Result<Size, MediaLoadError>) {
        let outcome = self.scene.borrow_mut().complete_load(id, natural);
        match outcome {
            LoadOutcome::Ready { playback: Some(token) } => {
                let element = self.media.borrow().get(&id).cloned();
                if let Some(MediaElement::Video(video)) = element {
                    play(&video);
                    self.videos.borrow_mut().insert(token, video);
                    if let Err(err) = render::start_video_loop(self) {
                        log::error!("Failed to start video refresh: {:?}", err);
                    }
                }
            }
            LoadOutcome::Ready { playback: None } => {}
            LoadOutcome::Failed(_) | LoadOutcome::Stale => self.release_dead_media(),
        }
        self.request_redraw();
    }

    /// Release the elements of items that have left the scene.
    fn release_dead_media(&self) {
        let evicted = {
            let scene = self.scene.borrow();
            scene.evict_dead(&mut self.media.borrow_mut())
        };
        for element in evicted {
            element.release();
        }
    }

    /// Draw now if anything changed since the last frame.
    pub(crate) fn render_if_dirty(&self) {
        if !self.scene.borrow_mut().take_dirty() {
            return;
        }
        let scene = self.scene.borrow();
        let media = self.media.borrow();
        if let Err(err) = render::draw(&scene, &media, &self.ctx) {
            log::error!("Render failed: {:?}", err);
        }
    }

    /// Schedule a single render for the next animation frame.
    pub(crate) fn request_redraw(self: &Rc<Self>) {
        if self.redraw_pending.replace(true) {
            return;
        }
        let board = Rc::clone(self);
        let callback = Closure::once_into_js(move |_timestamp: f64| {
            board.redraw_pending.set(false);
            board.render_if_dirty();
        });
        if let Err(err) = request_animation_frame(callback.unchecked_ref()) {
            self.redraw_pending.set(false);
            log::error!("Failed to schedule redraw: {:?}", err);
        }
    }

    fn start_loads(self: &Rc<Self>, requests: Vec<LoadRequest>) {
        for request in requests {
            let id = request.item;
            let link = request.source.link.clone();
            if let Err(err) = loader::load(self, request) {
                self.finish_load(id, Err(MediaLoadError::new(link, format!("{:?}", err))));
            }
        }
    }

    fn handle_pointer(self: &Rc<Self>, event: PointerEvent) {
        let changed = {
            let mut scene = self.scene.borrow_mut();
            self.router.borrow_mut().handle_pointer_event(&mut scene, event)
        };
        if let PointerEvent::Move { position } = event {
            self.update_cursor(position);
        }
        if changed {
            self.request_redraw();
        }
    }

    /// Show a move cursor over item bodies while nothing is being dragged.
    fn update_cursor(&self, position: Point) {
        if self.router.borrow().active().is_some() {
            return;
        }
        let over_item = self.scene.borrow().items().any(|item| item.hit_test(position));
        let cursor = if over_item { "move" } else { "default" };
        if let Err(err) = self.canvas.style().set_property("cursor", cursor) {
            log::debug!("Failed to set cursor: {:?}", err);
        }
    }
}

type PointerListener = Closure<dyn FnMut(web_sys::PointerEvent)>;

/// A canvas of placed images and videos, mounted inside a page element.
#[wasm_bindgen]
pub struct MediaBoard {
    shared: Rc<Shared>,
    listeners: Vec<(&'static str, PointerListener)>,
}

#[wasm_bindgen]
impl MediaBoard {
    /// Mount a board in the element with id `container`.
    ///
    /// Layout size defaults to 1280x720.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: &str,
        layout_width: Option<f64>,
        layout_height: Option<f64>,
    ) -> Result<MediaBoard, JsValue> {
        let defaults = SceneConfig::default();
        let config = SceneConfig::new(container).with_layout(
            layout_width.unwrap_or(defaults.layout_width),
            layout_height.unwrap_or(defaults.layout_height),
        );
        Self::mount(config)
    }

    /// Mount a board from a JSON config
    /// (`{"container": "...", "layoutWidth": 1280, "layoutHeight": 720}`).
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: &str) -> Result<MediaBoard, JsValue> {
        let config = SceneConfig::from_json(json).map_err(js_error)?;
        Self::mount(config)
    }

    /// Place an image or video. `.mp4` links are treated as video.
    ///
    /// `item` is either a link string or `{ link, width?, height?, x?, y? }`.
    #[wasm_bindgen(js_name = addItem)]
    pub fn add_item(&self, item: JsValue) -> Result<(), JsValue> {
        let descriptor: ItemDescriptor = serde_wasm_bindgen::from_value(item)
            .map_err(|err| js_error(SceneError::MalformedLink(err.to_string())))?;
        let request = self.shared.scene.borrow_mut().add_item(descriptor).map_err(js_error)?;
        self.shared.start_loads(vec![request]);
        self.shared.request_redraw();
        Ok(())
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.shared.scene.borrow_mut().clear();
        self.shared.release_dead_media();
        self.shared.request_redraw();
    }

    /// Current layout as pretty-printed JSON.
    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> Result<String, JsValue> {
        self.shared.scene.borrow().export_json().map_err(js_error)
    }

    /// Replace the layout with one produced by `exportState`.
    ///
    /// Invalid text throws and leaves the board untouched.
    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&self, json: &str) -> Result<(), JsValue> {
        let requests = self.shared.scene.borrow_mut().import_state(json).map_err(js_error)?;
        self.shared.release_dead_media();
        self.shared.start_loads(requests);
        self.shared.request_redraw();
        Ok(())
    }
}

impl MediaBoard {
    fn mount(config: SceneConfig) -> Result<MediaBoard, JsValue> {
        let document = document()?;
        let container = document
            .get_element_by_id(&config.container)
            .ok_or_else(|| js_error(format!("no element with id {:?}", config.container)))?;

        let size = config.layout_size();
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| js_error("created element is not a canvas"))?;
        canvas.set_width(size.width.round() as u32);
        canvas.set_height(size.height.round() as u32);
        // Touch drags must not scroll the page.
        canvas.style().set_property("touch-action", "none")?;
        container.append_child(&canvas)?;

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| js_error("2d canvas context unavailable"))?
            .dyn_into()
            .map_err(|_| js_error("unexpected canvas context type"))?;

        log::info!(
            "Mounted {}x{} board in #{}",
            size.width,
            size.height,
            config.container
        );

        let shared = Rc::new(Shared {
            scene: RefCell::new(Scene::new(config)),
            router: RefCell::new(PointerRouter::new()),
            media: RefCell::new(HashMap::new()),
            videos: RefCell::new(PlaybackSet::new()),
            video_loop_running: Cell::new(false),
            canvas,
            ctx,
            redraw_pending: Cell::new(false),
        });

        let mut board = MediaBoard {
            shared,
            listeners: Vec::new(),
        };
        board.listen("pointerdown", |shared, event| {
            if let Err(err) = shared.canvas.set_pointer_capture(event.pointer_id()) {
                log::debug!("Pointer capture failed: {:?}", err);
            }
            shared.handle_pointer(PointerEvent::Down {
                position: offset(&event),
            });
        })?;
        board.listen("pointermove", |shared, event| {
            shared.handle_pointer(PointerEvent::Move {
                position: offset(&event),
            });
        })?;
        board.listen("pointerup", |shared, event| {
            shared.handle_pointer(PointerEvent::Up {
                position: offset(&event),
            });
        })?;
        board.listen("pointercancel", |shared, _event| {
            shared.handle_pointer(PointerEvent::Cancel);
        })?;

        board.shared.request_redraw();
        Ok(board)
    }

    fn listen(
        &mut self,
        kind: &'static str,
        handler: impl Fn(&Rc<Shared>, web_sys::PointerEvent) + 'static,
    ) -> Result<(), JsValue> {
        let shared = Rc::downgrade(&self.shared);
        let listener: PointerListener = Closure::new(move |event: web_sys::PointerEvent| {
            if let Some(shared) = shared.upgrade() {
                handler(&shared, event);
            }
        });
        self.shared
            .canvas
            .add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        self.listeners.push((kind, listener));
        Ok(())
    }
}

impl Drop for MediaBoard {
    fn drop(&mut self) {
        for (kind, listener) in self.listeners.drain(..) {
            let _ = self
                .shared
                .canvas
                .remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
        }
        // Stops the video refresh loop.
        self.shared.scene.borrow_mut().clear();
        self.shared.release_dead_media();
        self.shared.canvas.remove();
    }
}

/// Start playback, logging an autoplay refusal instead of leaving the
/// promise rejection unhandled.
fn play(video: &HtmlVideoElement) {
    match video.play() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                log::warn!("Video playback refused: {:?}", err);
            }
        }),
        Err(err) => log::warn!("Video playback refused: {:?}", err),
    }
}

/// Pointer position relative to the canvas.
fn offset(event: &web_sys::PointerEvent) -> Point {
    Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()))
}

//! Fetching and decoding media for pending items.

use crate::board::Shared;
use crate::web::{document, js_error};
use kurbo::Size;
use mediaboard_core::{ItemId, LoadRequest, MediaKind, MediaLoadError};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, HtmlImageElement, HtmlVideoElement};

/// The decoded content backing one item.
#[derive(Debug, Clone)]
pub(crate) enum MediaElement {
    Image(HtmlImageElement),
    Video(HtmlVideoElement),
}

impl MediaElement {
    /// Detach load callbacks and stop any playback or download in flight.
    pub(crate) fn release(&self) {
        let element: &HtmlElement = match self {
            Self::Image(image) => image,
            Self::Video(video) => {
                if let Err(err) = video.pause() {
                    log::debug!("Failed to pause video: {:?}", err);
                }
                video
            }
        };
        detach(element);
        if let Err(err) = element.remove_attribute("src") {
            log::debug!("Failed to reset media source: {:?}", err);
        }
        if let Self::Video(video) = self {
            // Aborts the fetch once the source is gone.
            video.load();
        }
    }
}

/// Start decoding the media for `request`.
///
/// Completion is reported to the board asynchronously; this returns as soon
/// as the element has been created and its source set.
pub(crate) fn load(board: &Rc<Shared>, request: LoadRequest) -> Result<(), JsValue> {
    match request.source.kind {
        MediaKind::Image => load_image(board, request),
        MediaKind::Video => load_video(board, request),
    }
}

fn load_image(board: &Rc<Shared>, request: LoadRequest) -> Result<(), JsValue> {
    let image = HtmlImageElement::new()?;
    let id = request.item;
    let link = request.source.link;

    let onload = on_loaded(board, id, |image: HtmlImageElement| {
        Size::new(f64::from(image.natural_width()), f64::from(image.natural_height()))
    });
    let onerror = on_failed(board, id, link.clone(), "image failed to load");
    image.set_onload(Some(onload.unchecked_ref()));
    image.set_onerror(Some(onerror.unchecked_ref()));

    board.media.borrow_mut().insert(id, MediaElement::Image(image.clone()));
    image.set_src(&link);
    Ok(())
}

fn load_video(board: &Rc<Shared>, request: LoadRequest) -> Result<(), JsValue> {
    let video: HtmlVideoElement = document()?
        .create_element("video")?
        .dyn_into()
        .map_err(|_| js_error("created element is not a video"))?;
    let id = request.item;
    let link = request.source.link;

    // Browsers only allow unattended playback of muted video.
    video.set_muted(true);

    let onmetadata = on_loaded(board, id, |video: HtmlVideoElement| {
        Size::new(f64::from(video.video_width()), f64::from(video.video_height()))
    });
    let onerror = on_failed(board, id, link.clone(), "video failed to load");
    video.set_onloadedmetadata(Some(onmetadata.unchecked_ref()));
    video.set_onerror(Some(onerror.unchecked_ref()));

    board.media.borrow_mut().insert(id, MediaElement::Video(video.clone()));
    video.set_src(&link);
    Ok(())
}

/// Success callback: reads the natural size off the event's target element.
fn on_loaded<E: JsCast>(
    board: &Rc<Shared>,
    id: ItemId,
    natural_size: impl FnOnce(E) -> Size + 'static,
) -> JsValue {
    let board = Rc::downgrade(board);
    Closure::once_into_js(move |event: Event| {
        let Some(element) = event.target().and_then(|t| t.dyn_into::<E>().ok()) else {
            log::error!("Load event without a media target");
            return;
        };
        detach(element.unchecked_ref());
        let natural = natural_size(element);
        if let Some(board) = board.upgrade() {
            board.finish_load(id, Ok(natural));
        }
    })
}

fn on_failed(board: &Rc<Shared>, id: ItemId, link: String, reason: &'static str) -> JsValue {
    let board = Rc::downgrade(board);
    Closure::once_into_js(move |event: Event| {
        if let Some(element) = event.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) {
            detach(&element);
        }
        if let Some(board) = board.upgrade() {
            board.finish_load(id, Err(MediaLoadError::new(link, reason)));
        }
    })
}

/// Drop the page's references to whichever load callback did not fire.
fn detach(element: &HtmlElement) {
    element.set_onload(None);
    element.set_onerror(None);
    element.set_onloadedmetadata(None);
}

//! Canvas drawing and the shared video refresh loop.

use crate::board::Shared;
use crate::loader::MediaElement;
use crate::web::{js_error, request_animation_frame};
use mediaboard_core::{HANDLE_RADIUS, ItemId, Scene};
use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;
use web_time::Instant;

const BORDER_COLOR: &str = "black";
const HANDLE_COLOR: &str = "#000";

/// Draw the whole scene: canvas border, then each ready item back to front
/// with its four handles.
pub(crate) fn draw(
    scene: &Scene,
    media: &HashMap<ItemId, MediaElement>,
    ctx: &CanvasRenderingContext2d,
) -> Result<(), JsValue> {
    let size = scene.size();
    ctx.clear_rect(0.0, 0.0, size.width, size.height);
    ctx.set_line_width(1.0);
    ctx.set_stroke_style_str(BORDER_COLOR);
    ctx.stroke_rect(0.0, 0.0, size.width, size.height);

    for item in scene.items() {
        let (Some(handles), Some(element)) = (item.handles(), media.get(&item.id())) else {
            continue;
        };
        let bounds = item.bounds();
        match element {
            MediaElement::Image(image) => ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                bounds.x0,
                bounds.y0,
                bounds.width(),
                bounds.height(),
            )?,
            MediaElement::Video(video) => ctx.draw_image_with_html_video_element_and_dw_and_dh(
                video,
                bounds.x0,
                bounds.y0,
                bounds.width(),
                bounds.height(),
            )?,
        }

        ctx.set_stroke_style_str(HANDLE_COLOR);
        for handle in handles.iter() {
            let center = item.origin() + handle.position.to_vec2();
            ctx.begin_path();
            ctx.arc(center.x, center.y, HANDLE_RADIUS, 0.0, TAU)?;
            ctx.stroke();
        }
    }
    Ok(())
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Redraw every animation frame while any video item is alive.
///
/// One loop serves all of the board's videos, so a frame draws the scene
/// once however many are playing. Videos whose item went away are paused and
/// dropped; the loop stops when none are left or the board is dropped.
pub(crate) fn start_video_loop(board: &Rc<Shared>) -> Result<(), JsValue> {
    if board.video_loop_running.replace(true) {
        return Ok(());
    }
    let shared = Rc::downgrade(board);
    let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&slot);
    let started = Instant::now();

    *slot.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
        let Some(board) = shared.upgrade() else {
            // Dropping the closure breaks the Rc cycle.
            let _ = next.borrow_mut().take();
            return;
        };

        for video in board.videos.borrow_mut().prune() {
            if let Err(err) = video.pause() {
                log::warn!("Failed to pause video: {:?}", err);
            }
        }
        if board.videos.borrow().is_empty() {
            board.video_loop_running.set(false);
            log::debug!("Video refresh stopped after {:?}", started.elapsed());
            let _ = next.borrow_mut().take();
            return;
        }

        board.scene.borrow_mut().mark_dirty();
        board.render_if_dirty();

        if let Err(err) = schedule(&next) {
            board.video_loop_running.set(false);
            log::error!("Failed to schedule video frame: {:?}", err);
            let _ = next.borrow_mut().take();
        }
    }));

    if let Err(err) = schedule(&slot) {
        board.video_loop_running.set(false);
        let _ = slot.borrow_mut().take();
        return Err(err);
    }
    Ok(())
}

fn schedule(slot: &RefCell<Option<FrameCallback>>) -> Result<(), JsValue> {
    let callback = slot.borrow();
    let callback = callback.as_ref().ok_or_else(|| js_error("frame callback missing"))?;
    request_animation_frame(callback.as_ref().unchecked_ref())?;
    Ok(())
}

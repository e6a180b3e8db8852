//! DOM helpers
//!
//! Every lookup is optional: a page that lacks an element simply skips the
//! behaviour tied to it.

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, Window};

use crate::sim::Rect;

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn html_by_id(id: &str) -> Option<HtmlElement> {
    by_id(id)?.dyn_into().ok()
}

pub fn input_by_id(id: &str) -> Option<HtmlInputElement> {
    by_id(id)?.dyn_into().ok()
}

pub fn query(selector: &str) -> Option<Element> {
    document()?.query_selector(selector).ok().flatten()
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(list) = document().and_then(|d| d.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn create(tag: &str, class: &str) -> Option<HtmlElement> {
    let el = document()?.create_element(tag).ok()?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    el.dyn_into().ok()
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

pub fn clear_style(el: &HtmlElement, property: &str) {
    let _ = el.style().remove_property(property);
}

pub fn rect_of(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}

pub fn client_point(event: &web_sys::MouseEvent) -> Vec2 {
    Vec2::new(event.client_x() as f32, event.client_y() as f32)
}

/// Attach a listener for the page's lifetime
pub fn listen<F>(target: &EventTarget, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Run once on the next display frame
pub fn request_frame<F>(f: F)
where
    F: FnOnce(f64) + 'static,
{
    let Some(window) = window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| f(time));
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

/// One-shot timer; returns the handle for `clear_timeout`
pub fn set_timeout<F>(ms: u32, f: F) -> Option<i32>
where
    F: FnOnce() + 'static,
{
    let window = window()?;
    let closure: Closure<dyn FnMut()> = Closure::once(f);
    let handle = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms as i32,
        )
        .ok();
    closure.forget();
    handle
}

pub fn clear_timeout(handle: i32) {
    if let Some(window) = window() {
        window.clear_timeout_with_handle(handle);
    }
}

/// Numeric data attribute (`data-value="5"`)
pub fn data_number(el: &Element, name: &str) -> Option<f64> {
    el.get_attribute(&format!("data-{name}"))?.trim().parse().ok()
}

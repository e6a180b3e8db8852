//! Transient `#sim-toast` notice
//!
//! At most one toast exists. Showing a new one removes the old element and
//! cancels its pending dismissal.

use crate::platform::dom;
use crate::sim::Notice;

pub const TOAST_ID: &str = "sim-toast";

#[derive(Default)]
pub struct ToastView {
    pending: Option<i32>,
}

impl ToastView {
    /// Show `notice`; `on_expire` runs when its display time is up
    pub fn show(&mut self, notice: &Notice, fade_ms: u32, on_expire: impl FnOnce() + 'static) {
        if let Some(existing) = dom::by_id(TOAST_ID) {
            existing.remove();
        }
        if let Some(handle) = self.pending.take() {
            dom::clear_timeout(handle);
        }

        let Some(toast) = dom::create("div", "sim-toast") else {
            return;
        };
        toast.set_id(TOAST_ID);
        let _ = toast.set_attribute("role", "status");
        let _ = toast.set_attribute("aria-live", "polite");
        toast.set_text_content(Some(&notice.text));
        let Some(body) = dom::document().and_then(|d| d.body()) else {
            return;
        };
        let _ = body.append_child(&toast);

        // Fade in after the first paint
        let fading_in = toast.clone();
        dom::request_frame(move |_| {
            let _ = fading_in.class_list().add_1("visible");
        });

        self.pending = dom::set_timeout(notice.duration_ms, move || {
            let _ = toast.class_list().remove_1("visible");
            on_expire();
            let _ = dom::set_timeout(fade_ms, move || toast.remove());
        });
        log::debug!("toast: {}", notice.text);
    }

    /// Dismissal fired; the handle is no longer cancellable
    pub fn settled(&mut self) {
        self.pending = None;
    }
}

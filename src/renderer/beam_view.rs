//! Beam surface: scale, drop zones, mass elements, tilt and arrows

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::consts::DEFAULT_BEAM_WIDTH_PX;
use crate::platform::dom;
use crate::sim::{BalanceState, ForceArrow, MassId, drop_zones, scale_marks, slot_offset_px};

/// Placed masses sit this far below the beam's top edge
const MASS_TOP_PX: &str = "50px";
const PLACED_Z_INDEX: &str = "10";
const DRAG_Z_INDEX: &str = "1000";

pub struct BeamView {
    beam: HtmlElement,
}

impl BeamView {
    /// `None` when the page has no `#beam`
    pub fn find() -> Option<Self> {
        Some(Self {
            beam: dom::html_by_id("beam")?,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.beam
    }

    /// Layout width, falling back when the beam is not laid out yet
    pub fn width(&self) -> f32 {
        match self.beam.offset_width() {
            w if w > 0 => w as f32,
            _ => DEFAULT_BEAM_WIDTH_PX,
        }
    }

    /// Rebuild scale ticks and labels under `.scale`
    pub fn build_scale(&self) {
        let Some(scale) = dom::query(".scale") else {
            return;
        };
        scale.set_inner_html("");
        for mark in scale_marks(self.width()) {
            let left = format!("{}px", mark.left_px);
            if let Some(label) = mark.label {
                if let Some(number) = dom::create("div", "scale-number") {
                    number.set_text_content(Some(&label.to_string()));
                    dom::set_style(&number, "left", &left);
                    dom::set_style(&number, "transform", "translateX(-50%)");
                    let _ = scale.append_child(&number);
                }
            }
            if let Some(tick) = dom::create("div", "scale-mark") {
                dom::set_style(&tick, "position", "absolute");
                dom::set_style(&tick, "left", &left);
                dom::set_style(&tick, "transform", "translateX(-50%)");
                let _ = scale.append_child(&tick);
            }
        }
    }

    /// Rebuild one drop-zone marker per slot
    pub fn build_drop_zones(&self) {
        for zone in dom::query_all(".drop-zone") {
            zone.remove();
        }
        for (slot, left_px) in drop_zones(self.width()) {
            let Some(zone) = dom::create("div", "drop-zone") else {
                continue;
            };
            dom::set_style(&zone, "left", &format!("{left_px}px"));
            dom::set_style(&zone, "transform", "translateX(-50%)");
            let _ = zone.set_attribute("data-position", &slot.to_string());
            let _ = self.beam.append_child(&zone);
        }
    }

    pub fn set_drop_zones_active(&self, active: bool) {
        for zone in dom::query_all(".drop-zone") {
            let _ = zone.class_list().toggle_with_force("active", active);
        }
    }

    /// Tilt the beam and report the verdict in `#balanceStatus`
    pub fn apply_balance(&self, balance: &BalanceState) {
        let rotation = balance.rotation_deg;
        dom::set_style(
            &self.beam,
            "transform",
            &format!("translateX(-50%) rotate({rotation}deg)"),
        );
        dom::set_style(&self.beam, "--counter-rot", &format!("{}deg", -rotation));

        if let Some(status) = dom::by_id("balanceStatus") {
            status.set_text_content(Some(balance.verdict.label()));
            status.set_class_name(&format!("balance-status {}", balance.verdict.css_class()));
        }
    }

    /// Size each placed mass's arrow shaft and label
    pub fn apply_arrows(&self, arrows: &[ForceArrow], elements: &HashMap<MassId, HtmlElement>) {
        for arrow in arrows {
            let Some(node) = elements.get(&arrow.mass_id) else {
                continue;
            };
            if node.query_selector(".force-arrow").ok().flatten().is_none() {
                if let Some(scaffold) = arrow_scaffold() {
                    let _ = node.append_child(&scaffold);
                }
            }
            if let Some(shaft) = find_html(node, ".force-shaft") {
                dom::set_style(&shaft, "height", &format!("{}px", arrow.shaft_px));
            }
            if let Some(label) = node.query_selector(".force-label").ok().flatten() {
                label.set_text_content(Some(&arrow.label));
            }
        }
    }

    /// Put a mass element on the beam at `slot`
    pub fn place(&self, node: &HtmlElement, slot: i32) {
        if node.parent_node().is_none() {
            let _ = self.beam.append_child(node);
        }
        dom::set_style(node, "position", "absolute");
        dom::set_style(node, "z-index", PLACED_Z_INDEX);
        dom::set_style(node, "top", MASS_TOP_PX);
        dom::clear_style(node, "transform");
        dom::set_style(
            node,
            "left",
            &format!("calc(50% + {}px)", slot_offset_px(slot, self.width())),
        );
        let _ = node.set_attribute("data-position", &slot.to_string());
    }

    /// Reflow every placed mass after the beam width changed
    pub fn reflow(&self, positions: impl IntoIterator<Item = (i32, HtmlElement)>) {
        self.build_scale();
        self.build_drop_zones();
        for (slot, node) in positions {
            self.place(&node, slot);
        }
    }
}

/// Render the storage tiles as labelled blocks
pub fn render_storage_tiles() {
    for option in dom::query_all(".mass-option") {
        let Some(value) = dom::data_number(&option, "value") else {
            continue;
        };
        option.set_inner_html("");
        if let Some(block) = dom::create("div", &mass_class(value)) {
            block.set_text_content(Some(&value.to_string()));
            let _ = option.append_child(&block);
        }
    }
}

/// Hook, block and arrow scaffold for one mass
pub fn create_mass_element(value: f64) -> Option<HtmlElement> {
    let container = dom::create("div", "mass-container")?;
    let _ = container.set_attribute("data-value", &value.to_string());

    for class in ["hook-top", "hook"] {
        let part = dom::create("div", class)?;
        container.append_child(&part).ok()?;
    }
    let block = dom::create("div", &mass_class(value))?;
    block.set_text_content(Some(&value.to_string()));
    container.append_child(&block).ok()?;
    container.append_child(&arrow_scaffold()?).ok()?;
    Some(container)
}

/// Lift an element out of the beam into fixed, topmost positioning
pub fn lift_for_drag(node: &HtmlElement, top_left: Vec2) {
    dom::set_style(node, "transform", "none");
    dom::set_style(node, "position", "fixed");
    dom::set_style(node, "z-index", DRAG_Z_INDEX);
    dom::clear_style(node, "bottom");
    move_to(node, top_left);
}

pub fn move_to(node: &HtmlElement, top_left: Vec2) {
    dom::set_style(node, "left", &format!("{}px", top_left.x));
    dom::set_style(node, "top", &format!("{}px", top_left.y));
}

fn mass_class(value: f64) -> String {
    format!("mass mass-value-{value}")
}

fn arrow_scaffold() -> Option<HtmlElement> {
    let arrow = dom::create("div", "force-arrow")?;
    for class in ["force-shaft", "force-head", "force-label"] {
        let part = dom::create("div", class)?;
        arrow.append_child(&part).ok()?;
    }
    Some(arrow)
}

fn find_html(parent: &Element, selector: &str) -> Option<HtmlElement> {
    parent.query_selector(selector).ok().flatten()?.dyn_into().ok()
}

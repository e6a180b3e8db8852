//! Beam page event wiring
//!
//! Translates pointer, input and resize events into [`BeamLab`] calls and
//! hands the results to the renderer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, Node, PointerEvent};

use super::dom;
use crate::renderer::{BeamView, TableView, ToastView, beam_view, table_view};
use crate::settings::Settings;
use crate::sim::{
    AnswerState, BeamLab, DropOutcome, DropResolution, LabMode, LabSnapshot, MassId, Notice,
};

/// The element under the pointer and where it has to go back to
struct DraggedElement {
    node: HtmlElement,
    parent: Option<Node>,
    next_sibling: Option<Node>,
    pointer_id: i32,
    captured: bool,
}

impl DraggedElement {
    /// Reinsert at the original spot in the beam
    fn restore_parent(&self, fallback: &HtmlElement) {
        let parent: Node = match &self.parent {
            Some(parent) => parent.clone(),
            None => fallback.clone().into(),
        };
        if parent
            .insert_before(&self.node, self.next_sibling.as_ref())
            .is_err()
        {
            // Sibling went away (scale rebuilt mid-drag)
            let _ = parent.append_child(&self.node);
        }
    }

    fn finish(&self) {
        if self.captured {
            let _ = self.node.release_pointer_capture(self.pointer_id);
        }
        let _ = self.node.class_list().remove_1("dragging");
        dom::clear_style(&self.node, "width");
        dom::clear_style(&self.node, "height");
    }
}

struct BeamApp {
    lab: BeamLab,
    view: BeamView,
    table: Option<TableView>,
    toast: ToastView,
    notice_fade_ms: u32,
    elements: HashMap<MassId, HtmlElement>,
    dragged: Option<DraggedElement>,
}

type SharedApp = Rc<RefCell<BeamApp>>;

/// Wire the beam lab if the page has one
pub fn attach(settings: &Settings) {
    let Some(view) = BeamView::find() else {
        log::debug!("no #beam; beam lab not attached");
        return;
    };

    let app = Rc::new(RefCell::new(BeamApp {
        lab: BeamLab::new(settings),
        view,
        table: TableView::find(),
        toast: ToastView::default(),
        notice_fade_ms: settings.notice_fade_ms,
        elements: HashMap::new(),
        dragged: None,
    }));

    {
        let a = app.borrow();
        beam_view::render_storage_tiles();
        a.view.build_scale();
        a.view.build_drop_zones();
        if let Some(toggle) = dom::input_by_id("advancedToggle") {
            let advanced = a.lab.mode().is_advanced();
            toggle.set_checked(advanced);
            let _ = toggle.set_attribute("aria-checked", &advanced.to_string());
        }
        if a.table.is_none() {
            log::debug!("no results table on this page");
        }
        a.render(&a.lab.on_registry_changed());
    }

    setup_storage_tiles(&app);
    setup_pointer_tracking(&app);
    setup_resize(&app);
    setup_clear_button(&app);
    setup_mode_toggle(&app);
    setup_table_inputs(&app);

    log::info!("beam lab ready ({:?} mode)", app.borrow().lab.mode());
}

impl BeamApp {
    /// Apply a snapshot: tilt, status, arrows, then the table
    fn render(&self, snapshot: &LabSnapshot) {
        self.view.apply_balance(&snapshot.balance);
        self.view.apply_arrows(&snapshot.arrows, &self.elements);
        table_view::update_headings(self.lab.mode());
        if let Some(table) = &self.table {
            table.render(&snapshot.table);
            table.validate_all(snapshot.table.rows.len(), |row, distance, moment| {
                snapshot
                    .table
                    .rows
                    .get(row)
                    .map_or(AnswerState::Unknown, |r| r.validate(distance, moment))
            });
        }
    }

    fn start_storage_drag(&mut self, value: f64, event: &PointerEvent) {
        if self.lab.active_drag().is_some() {
            return;
        }
        let Some(body) = dom::document().and_then(|d| d.body()) else {
            return;
        };
        let Some(node) = beam_view::create_mass_element(value) else {
            return;
        };
        let pointer = dom::client_point(event);
        let _ = body.append_child(&node);
        beam_view::lift_for_drag(&node, pointer);

        let rect = dom::rect_of(&node);
        let offset = Vec2::new(rect.width() / 2.0, rect.height() / 2.0);
        if !self.lab.pointer_down_storage(value, event.pointer_id(), offset) {
            node.remove();
            return;
        }
        beam_view::move_to(&node, pointer - offset);

        self.dragged = Some(DraggedElement {
            node,
            parent: Some(self.view.element().clone().into()),
            next_sibling: None,
            pointer_id: event.pointer_id(),
            captured: false,
        });
        self.view.set_drop_zones_active(true);
    }

    fn start_mass_drag(&mut self, id: MassId, event: &PointerEvent) {
        let Some(node) = self.elements.get(&id).cloned() else {
            return;
        };
        let Some(body) = dom::document().and_then(|d| d.body()) else {
            return;
        };
        let pointer = dom::client_point(event);
        let rect = dom::rect_of(&node);
        let offset = pointer - Vec2::new(rect.left, rect.top);
        if !self.lab.pointer_down_mass(id, event.pointer_id(), offset) {
            return;
        }

        let _ = node.class_list().add_1("dragging");
        dom::set_style(&node, "width", &format!("{}px", rect.width()));
        dom::set_style(&node, "height", &format!("{}px", rect.height()));
        let parent = node.parent_node();
        let next_sibling = node.next_sibling();
        let _ = body.append_child(&node);
        beam_view::lift_for_drag(&node, pointer - offset);
        let captured = node.set_pointer_capture(event.pointer_id()).is_ok();

        self.dragged = Some(DraggedElement {
            node,
            parent,
            next_sibling,
            pointer_id: event.pointer_id(),
            captured,
        });
        self.view.set_drop_zones_active(true);
    }

    fn end_drag(&mut self, shared: &SharedApp, pointer_id: i32, cancelled: bool) {
        // No element: resolves as outside the catchment
        let center = self
            .dragged
            .as_ref()
            .map_or(Vec2::NAN, |d| dom::rect_of(&d.node).center());
        let beam = dom::rect_of(self.view.element());
        let resolution = if cancelled {
            self.lab.pointer_cancel(pointer_id, center, &beam)
        } else {
            self.lab.pointer_up(pointer_id, center, &beam)
        };
        let Some(resolution) = resolution else {
            return;
        };
        let dragged = self.dragged.take();
        self.apply_drop(shared, resolution, dragged);
    }

    fn apply_drop(
        &mut self,
        shared: &SharedApp,
        resolution: DropResolution,
        dragged: Option<DraggedElement>,
    ) {
        let DropResolution {
            session,
            outcome,
            notice,
            snapshot,
        } = resolution;

        if let Some(dragged) = dragged {
            let node = dragged.node.clone();
            // Hidden for one frame so the jump back is not visible
            dom::set_style(&node, "visibility", "hidden");
            dom::clear_style(&node, "left");
            dom::clear_style(&node, "top");

            match outcome {
                DropOutcome::Snapped {
                    id,
                    position,
                    created,
                } => {
                    dragged.restore_parent(self.view.element());
                    self.view.place(&node, position);
                    if created {
                        let _ = node.set_attribute("data-id", &id.to_string());
                        self.elements.insert(id, node.clone());
                        attach_mass_listener(shared, &node, id);
                    }
                }
                DropOutcome::Rejected {
                    restored_position: Some(position),
                    ..
                }
                | DropOutcome::Reverted { position, .. } => {
                    dragged.restore_parent(self.view.element());
                    self.view.place(&node, position);
                }
                DropOutcome::Rejected { .. } | DropOutcome::Discarded => {
                    node.remove();
                    if let Some(id) = session.placed_id() {
                        self.elements.remove(&id);
                    }
                }
            }

            dragged.finish();
            dom::request_frame(move |_| dom::set_style(&node, "visibility", "visible"));
        }

        self.view.set_drop_zones_active(false);
        if let Some(notice) = notice {
            self.show_notice(shared, &notice);
        }
        self.render(&snapshot);
    }

    fn show_notice(&mut self, shared: &SharedApp, notice: &Notice) {
        let ticket = notice.ticket;
        let expiring = shared.clone();
        self.toast.show(notice, self.notice_fade_ms, move || {
            let mut app = expiring.borrow_mut();
            app.toast.settled();
            app.lab.expire_notice(ticket);
        });
    }

    fn remove_elements(&mut self, ids: &[MassId]) {
        for id in ids {
            if let Some(node) = self.elements.remove(id) {
                node.remove();
            }
        }
    }

    /// Beam width changed: rebuild scale and zones, re-place every mass
    fn reflow(&self) {
        let in_flight = self.lab.active_drag().and_then(|s| s.placed_id());
        let placed: Vec<(i32, HtmlElement)> = self
            .lab
            .registry()
            .all()
            .iter()
            .filter(|m| Some(m.id) != in_flight)
            .filter_map(|m| self.elements.get(&m.id).map(|n| (m.position, n.clone())))
            .collect();
        self.view.reflow(placed);
        self.view.set_drop_zones_active(self.lab.drop_zones_active());
        self.render(&self.lab.on_registry_changed());
    }
}

fn pointer_event(event: &Event) -> Option<&PointerEvent> {
    event.dyn_ref::<PointerEvent>()
}

fn setup_storage_tiles(app: &SharedApp) {
    for option in dom::query_all(".mass-option") {
        let Some(value) = dom::data_number(&option, "value") else {
            log::warn!("storage tile without a numeric data-value");
            continue;
        };
        let app = app.clone();
        dom::listen(&option, "pointerdown", move |event: Event| {
            let Some(pe) = pointer_event(&event) else {
                return;
            };
            event.prevent_default();
            app.borrow_mut().start_storage_drag(value, pe);
        });
    }
}

fn attach_mass_listener(app: &SharedApp, node: &HtmlElement, id: MassId) {
    let app = app.clone();
    dom::listen(node, "pointerdown", move |event: Event| {
        let Some(pe) = pointer_event(&event) else {
            return;
        };
        event.prevent_default();
        app.borrow_mut().start_mass_drag(id, pe);
    });
}

/// Document-level move/up/cancel; the session's pointer id filters strays
fn setup_pointer_tracking(app: &SharedApp) {
    let Some(document) = dom::document() else {
        return;
    };

    {
        let app = app.clone();
        dom::listen(&document, "pointermove", move |event: Event| {
            let Some(pe) = pointer_event(&event) else {
                return;
            };
            let a = app.borrow();
            let Some(top_left) = a.lab.pointer_move(pe.pointer_id(), dom::client_point(pe)) else {
                return;
            };
            event.prevent_default();
            if let Some(dragged) = &a.dragged {
                beam_view::move_to(&dragged.node, top_left);
            }
        });
    }

    for (name, cancelled) in [("pointerup", false), ("pointercancel", true)] {
        let app = app.clone();
        dom::listen(&document, name, move |event: Event| {
            let Some(pe) = pointer_event(&event) else {
                return;
            };
            app.borrow_mut().end_drag(&app, pe.pointer_id(), cancelled);
        });
    }
}

fn setup_resize(app: &SharedApp) {
    let Some(window) = dom::window() else {
        return;
    };
    let app = app.clone();
    dom::listen(&window, "resize", move |_event: Event| {
        app.borrow().reflow();
    });
}

fn setup_clear_button(app: &SharedApp) {
    let Some(button) = dom::by_id("clearAllBtn") else {
        log::debug!("no #clearAllBtn");
        return;
    };
    let app = app.clone();
    dom::listen(&button, "click", move |_event: Event| {
        let mut a = app.borrow_mut();
        let (removed, snapshot) = a.lab.clear_all();
        a.remove_elements(&removed);
        a.render(&snapshot);
    });
}

fn setup_mode_toggle(app: &SharedApp) {
    let Some(toggle) = dom::input_by_id("advancedToggle") else {
        log::debug!("no #advancedToggle");
        return;
    };
    let app = app.clone();
    let control = toggle.clone();
    dom::listen(&toggle, "change", move |_event: Event| {
        let advanced = control.checked();
        let _ = control.set_attribute("aria-checked", &advanced.to_string());

        let mut a = app.borrow_mut();
        let change = a.lab.set_mode(LabMode::from_advanced(advanced));
        a.remove_elements(&change.removed);
        a.render(&change.snapshot);
    });
}

/// Live answer checking, delegated from the table body
fn setup_table_inputs(app: &SharedApp) {
    let Some(body) = app.borrow().table.as_ref().map(|t| t.body().clone()) else {
        return;
    };
    for name in ["input", "change", "focusout"] {
        let app = app.clone();
        dom::listen(&body, name, move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let a = app.borrow();
            let Some(table) = &a.table else {
                return;
            };
            let Some(row) = table.row_of(&target) else {
                return;
            };
            if let Some((distance, moment)) = table.entries(row) {
                let state = a.lab.validate_row(row, &distance, &moment.value());
                table_view::set_feedback(&moment, state);
            }
        });
    }
}

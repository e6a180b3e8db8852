//! Ramp page event wiring and animation loop

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlInputElement};

use super::dom;
use crate::renderer::ramp_view;
use crate::settings::Settings;
use crate::sim::{RampEvent, RampPhase, RampSim, format_timer};

/// Longest frame step fed to the sim (seconds)
const MAX_FRAME_DT: f64 = 0.1;

struct RampApp {
    sim: RampSim,
    height_cm: f64,
    distance_cm: f64,
    last_time: Option<f64>,
    /// Bumped on every start/reset so stale frames stop themselves
    run_id: u64,
    running: bool,
}

type SharedRamp = Rc<RefCell<RampApp>>;

pub fn attach(settings: &Settings) {
    if dom::by_id("ramp").is_none() && dom::by_id("startBtn").is_none() {
        log::debug!("no ramp on this page");
        return;
    }

    let seed = settings
        .ramp
        .seed
        .unwrap_or_else(|| js_sys::Date::now() as u64);
    let app = Rc::new(RefCell::new(RampApp {
        sim: RampSim::new(&settings.ramp, seed),
        height_cm: settings.ramp.height_cm,
        distance_cm: settings.ramp.gate_distance_cm,
        last_time: None,
        run_id: 0,
        running: false,
    }));

    {
        let mut a = app.borrow_mut();
        if let Some(slider) = dom::input_by_id("heightSlider") {
            slider.set_value(&a.height_cm.to_string());
        }
        if let Some(slider) = dom::input_by_id("distanceSlider") {
            slider.set_value(&a.distance_cm.to_string());
        }
        a.redraw();
    }

    setup_sliders(&app);
    setup_buttons(&app);
    setup_guess_inputs(&app);
    log::info!("ramp lab ready (seed {seed})");
}

impl RampApp {
    fn redraw(&mut self) {
        ramp_view::apply_track(self.sim.track(), self.height_cm, self.distance_cm);
        ramp_view::apply_run(&self.sim);
        ramp_view::set_timer(&format_timer(self.sim.display_reading()));
        self.redraw_trials();
    }

    /// Rebuild the trial table and re-mark any stored guesses
    fn redraw_trials(&mut self) {
        ramp_view::render_trials(self.sim.trials());
        for input in guess_inputs() {
            let value = input.value();
            if value.trim().is_empty() {
                continue;
            }
            if let Some(set) = ramp_view::set_of(&input) {
                let state = self.sim.trials_mut().validate_speed_guess(set, &value);
                ramp_view::show_guess_feedback(&input, state);
            }
        }
    }

    fn stop_loop(&mut self) {
        self.run_id += 1;
        self.running = false;
        self.last_time = None;
    }
}

fn guess_inputs() -> Vec<HtmlInputElement> {
    dom::query_all("#trialTable tbody .speed-guess")
        .into_iter()
        .filter_map(|el| el.dyn_into().ok())
        .collect()
}

fn setup_sliders(app: &SharedRamp) {
    for (id, is_height) in [("heightSlider", true), ("distanceSlider", false)] {
        let Some(slider) = dom::input_by_id(id) else {
            log::debug!("no #{id}");
            continue;
        };
        let app = app.clone();
        let control = slider.clone();
        dom::listen(&slider, "input", move |_event: Event| {
            let Ok(cm) = control.value().trim().parse::<f64>() else {
                return;
            };
            let mut a = app.borrow_mut();
            let changed = if is_height {
                a.height_cm = cm;
                a.sim.set_height_cm(cm)
            } else {
                a.distance_cm = cm;
                a.sim.set_gate_distance_cm(cm)
            };
            if changed {
                a.stop_loop();
                log::debug!("ramp parameters: h={} cm, d={} cm", a.height_cm, a.distance_cm);
            }
            a.redraw();
        });
    }
}

fn setup_buttons(app: &SharedRamp) {
    on_click(app, "startBtn", |app| {
        let run_id = {
            let mut a = app.borrow_mut();
            if !a.sim.start() {
                if a.sim.phase() == RampPhase::Ready {
                    ramp_view::set_status("Raise the ramp first");
                }
                return;
            }
            a.stop_loop();
            a.running = true;
            a.run_id
        };
        request_frame(app.clone(), run_id);
    });

    on_click(app, "resetBtn", |app| {
        let mut a = app.borrow_mut();
        a.stop_loop();
        a.sim.reset();
        a.redraw();
    });

    on_click(app, "recordBtn", |app| {
        let mut a = app.borrow_mut();
        match a.sim.record_trial() {
            Some(trial) => {
                a.redraw_trials();
                let text = match trial.finalized {
                    Some(average) => format!("Set {} complete: average {average:.2} s", trial.set_index),
                    None => format!("Trial {} recorded", trial.trial_number),
                };
                ramp_view::set_status(&text);
            }
            None if matches!(a.sim.phase(), RampPhase::Gate2Triggered | RampPhase::Stopped) => {
                ramp_view::set_status("This run is already recorded");
            }
            None => ramp_view::set_status("Nothing to record yet"),
        }
    });

    on_click(app, "clearTrialsBtn", |app| {
        let mut a = app.borrow_mut();
        a.sim.clear_trials();
        a.redraw_trials();
    });
}

fn on_click(app: &SharedRamp, id: &str, handler: fn(&SharedRamp)) {
    let Some(button) = dom::by_id(id) else {
        log::debug!("no #{id}");
        return;
    };
    let app = app.clone();
    dom::listen(&button, "click", move |_event: Event| handler(&app));
}

fn setup_guess_inputs(app: &SharedRamp) {
    let Some(body) = dom::query("#trialTable tbody") else {
        return;
    };
    for name in ["input", "change"] {
        let app = app.clone();
        dom::listen(&body, name, move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(set) = ramp_view::set_of(&input) else {
                return;
            };
            let state = app
                .borrow_mut()
                .sim
                .trials_mut()
                .validate_speed_guess(set, &input.value());
            ramp_view::show_guess_feedback(&input, state);
        });
    }
}

fn request_frame(app: SharedRamp, run_id: u64) {
    dom::request_frame(move |time| frame(app, run_id, time));
}

fn frame(app: SharedRamp, run_id: u64, time: f64) {
    let keep_going = {
        let mut a = app.borrow_mut();
        if !a.running || a.run_id != run_id {
            return;
        }

        let dt = a
            .last_time
            .map_or(0.0, |last| ((time - last) / 1000.0).min(MAX_FRAME_DT));
        a.last_time = Some(time);

        for event in a.sim.advance(dt) {
            match event {
                RampEvent::Gate1 => log::debug!("gate 1 triggered"),
                RampEvent::Gate2 { reading } => log::info!("gate 2 triggered: {reading:.2} s"),
                RampEvent::Finished => log::debug!("run finished"),
            }
        }

        let reading = a.sim.display_reading();
        ramp_view::set_timer(&format_timer(reading));
        ramp_view::apply_run(&a.sim);

        let finished = a.sim.phase() == RampPhase::Stopped;
        if finished {
            a.running = false;
        }
        !finished
    };

    if keep_going {
        request_frame(app, run_id);
    }
}

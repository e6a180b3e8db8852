//! Ramp page: incline, car, gates, timer and trial table

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};

use crate::platform::dom;
use crate::sim::{AnswerState, RampPhase, RampSim, RampTrack, SetStatus, TrialLog, TrialSet};

use super::table_view::set_feedback;

const TRIAL_BODY_SELECTOR: &str = "#trialTable tbody";

/// Slider readouts, ramp tilt and gate positions
pub fn apply_track(track: &RampTrack, height_cm: f64, distance_cm: f64) {
    dom::set_text("heightValue", &format!("{height_cm:.0} cm"));
    dom::set_text("distanceValue", &format!("{distance_cm:.0} cm"));

    if let Some(ramp) = dom::html_by_id("ramp") {
        dom::set_style(&ramp, "--ramp-angle", &format!("{:.2}deg", track.angle_deg()));
    }
    let length = track.track_length();
    for (id, offset) in [("gate1", track.gate1_offset()), ("gate2", track.gate2_offset())] {
        if let Some(gate) = dom::html_by_id(id) {
            dom::set_style(&gate, "left", &format!("{:.2}%", offset / length * 100.0));
        }
    }
}

/// Car position and gate highlights for the current frame
pub fn apply_run(sim: &RampSim) {
    if let Some(car) = dom::html_by_id("car") {
        dom::set_style(&car, "left", &format!("{:.2}%", sim.car_progress() * 100.0));
        let tilt = if sim.car_on_ramp() {
            format!("rotate({:.2}deg)", sim.track().angle_deg())
        } else {
            "none".to_string()
        };
        dom::set_style(&car, "transform", &tilt);
    }

    let (gate1, gate2) = match sim.phase() {
        RampPhase::Ready | RampPhase::Rolling => (false, false),
        RampPhase::Gate1Triggered => (true, false),
        RampPhase::Gate2Triggered | RampPhase::Stopped => (true, true),
    };
    for (id, on) in [("gate1", gate1), ("gate2", gate2)] {
        if let Some(gate) = dom::by_id(id) {
            let _ = gate.class_list().toggle_with_force("triggered", on);
        }
    }
    dom::set_text("rampStatus", status_text(sim.phase()));
}

pub fn set_timer(text: &str) {
    dom::set_text("timerDisplay", text);
}

pub fn set_status(text: &str) {
    dom::set_text("rampStatus", text);
}

fn status_text(phase: RampPhase) -> &'static str {
    match phase {
        RampPhase::Ready => "Ready",
        RampPhase::Rolling => "Rolling...",
        RampPhase::Gate1Triggered => "Timing",
        RampPhase::Gate2Triggered => "Timer stopped",
        RampPhase::Stopped => "Run complete",
    }
}

/// Rebuild the trial table. Speed guesses are restored from the log.
pub fn render_trials(log: &TrialLog) {
    let Some(tbody) = dom::query(TRIAL_BODY_SELECTOR) else {
        return;
    };
    tbody.set_inner_html("");
    for set in log.sets() {
        if let Some(tr) = trial_row(set) {
            let _ = tbody.append_child(&tr);
        }
    }
}

/// Set index of a speed-guess input
pub fn set_of(input: &Element) -> Option<u32> {
    input.get_attribute("data-set")?.parse().ok()
}

pub fn show_guess_feedback(input: &HtmlInputElement, state: AnswerState) {
    set_feedback(input, state);
}

fn trial_row(set: &TrialSet) -> Option<Element> {
    let tr: Element = dom::create("tr", "")?.into();
    let _ = tr.set_attribute("data-set", &set.set_index.to_string());

    let mut cells = vec![
        set.set_index.to_string(),
        format!("{:.0}", set.height_m * 100.0),
        format!("{:.0}", set.gate_distance_m * 100.0),
    ];
    for i in 0..crate::consts::TRIALS_PER_SET {
        cells.push(set.times.get(i).map(|t| format!("{t:.2}")).unwrap_or_default());
    }
    cells.push(match set.status {
        SetStatus::Finalized { average } => format!("{average:.2}"),
        SetStatus::Abandoned => "abandoned".to_string(),
        SetStatus::Open => String::new(),
    });
    for text in cells {
        let td = dom::create("td", "")?;
        td.set_text_content(Some(&text));
        tr.append_child(&td).ok()?;
    }

    let td = dom::create("td", "")?;
    let guess: HtmlInputElement = dom::create("input", "speed-guess")?.dyn_into().ok()?;
    guess.set_type("number");
    guess.set_step("any");
    guess.set_placeholder("m/s");
    let _ = guess.set_attribute("data-set", &set.set_index.to_string());
    guess.set_disabled(!matches!(set.status, SetStatus::Finalized { .. }));
    if let Some(value) = set.speed_guess {
        guess.set_value(&value.to_string());
    }
    td.append_child(&guess).ok()?;
    tr.append_child(&td).ok()?;
    Some(tr)
}

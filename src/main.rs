//! Beam & Ramp Lab entry point
//!
//! On the web the labs attach to the page; natively a short scripted
//! session runs headless and logs what the sim decided.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    beam_ramp_lab::platform::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Beam & Ramp Lab (native) starting...");
    log::info!("The labs need a browser - run with `trunk serve` for the web version");

    let settings = beam_ramp_lab::Settings::load();
    println!("\nScripted beam session...");
    beam_session(&settings);
    println!("\nScripted ramp session...");
    ramp_session(&settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn beam_session(settings: &beam_ramp_lab::Settings) {
    use beam_ramp_lab::sim::{BeamLab, LabMode, Rect};
    use glam::Vec2;

    // 560 px beam: slots 20 px apart around x = 380
    let beam = Rect::new(100.0, 300.0, 560.0, 20.0);
    let slot = |n: i32| Vec2::new(380.0 + n as f32 * 20.0, 310.0);
    let mut lab = BeamLab::new(settings);

    let drop_tile = |lab: &mut BeamLab, value: f64, at: i32| {
        lab.pointer_down_storage(value, 1, Vec2::new(20.0, 20.0));
        if let Some(res) = lab.pointer_up(1, slot(at), &beam) {
            println!("  {value} kg -> slot {at}: {:?}", res.outcome);
            if let Some(notice) = res.notice {
                println!("  notice: {}", notice.text);
            }
            println!("  {}", res.snapshot.balance.verdict.label());
        }
    };

    drop_tile(&mut lab, 2.0, -4);
    drop_tile(&mut lab, 1.0, 8);
    drop_tile(&mut lab, 1.0, -2);

    let change = lab.set_mode(LabMode::Advanced);
    println!("  mode -> {:?}", change.mode);
    drop_tile(&mut lab, 1.0, -2);

    let snapshot = lab.on_registry_changed();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("snapshot not serializable: {e}"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn ramp_session(settings: &beam_ramp_lab::Settings) {
    use beam_ramp_lab::sim::{RampPhase, RampSim, format_timer};

    let seed = settings.ramp.seed.unwrap_or(7);
    let mut sim = RampSim::new(&settings.ramp, seed);
    println!(
        "  h = {:.2} m, d = {:.2} m, v = {:.3} m/s",
        sim.track().height_m,
        sim.track().gate_distance_m,
        sim.track().bottom_speed()
    );

    for _ in 0..3 {
        sim.reset();
        if !sim.start() {
            println!("  ramp is flat; nothing to time");
            return;
        }
        while sim.phase() != RampPhase::Stopped {
            sim.advance(1.0 / 60.0);
        }
        println!("  timer: {}", format_timer(sim.display_reading()));
        sim.record_trial();
    }

    let Some((set_index, average, speed)) = sim
        .trials()
        .sets()
        .first()
        .and_then(|set| Some((set.set_index, set.average()?, set.expected_speed()?)))
    else {
        return;
    };
    println!("  set {set_index} average {average:.3} s, speed {speed:.2} m/s");
    let guess = format!("{speed:.2}");
    let state = sim.trials_mut().validate_speed_guess(set_index, &guess);
    println!("  guess {guess} m/s: {state:?}");
}

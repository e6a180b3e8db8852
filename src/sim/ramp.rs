//! Ramp and light-gate timeline
//!
//! The car starts from rest at the top of a fixed-length ramp, accelerates
//! uniformly to `v = sqrt(2 g h)` at the foot, then coasts at `v` past two
//! light gates. Gate crossings are found analytically, so the true
//! gate-to-gate time is exactly `gate_distance / v` whatever the frame rate.
//!
//! The displayed timer is deliberately noisy: every display update while
//! timing draws fresh jitter, so the shown value is not monotonic even
//! though the true elapsed time is.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::table::AnswerState;
use crate::consts::*;
use crate::error::{FieldError, parse_field};
use crate::{cm_to_m, round_sig_figs};
use crate::settings::RampSettings;

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RampPhase {
    /// Car at the top, timer zeroed
    Ready,
    /// Rolling, gate 1 not reached
    Rolling,
    /// Timer running between the gates
    Gate1Triggered,
    /// Timer frozen, car still coasting
    Gate2Triggered,
    /// Car at the end of the runout
    Stopped,
}

/// Something that happened during `advance`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RampEvent {
    Gate1,
    /// Gate 2 reached; carries the frozen timer reading
    Gate2 { reading: f64 },
    Finished,
}

/// Track geometry and kinematics for one height/gate-distance setting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampTrack {
    pub height_m: f64,
    pub gate_distance_m: f64,
}

impl RampTrack {
    pub fn new(height_m: f64, gate_distance_m: f64) -> Self {
        Self {
            height_m: height_m.clamp(0.0, RAMP_LENGTH_M),
            gate_distance_m: gate_distance_m.max(0.0),
        }
    }

    /// Speed at the foot of the ramp
    pub fn bottom_speed(&self) -> f64 {
        (2.0 * RAMP_GRAVITY * self.height_m).sqrt()
    }

    /// Uniform acceleration along the incline
    pub fn acceleration(&self) -> f64 {
        let v = self.bottom_speed();
        v * v / (2.0 * RAMP_LENGTH_M)
    }

    pub fn descent_time(&self) -> f64 {
        2.0 * RAMP_LENGTH_M / self.bottom_speed()
    }

    pub fn gate1_offset(&self) -> f64 {
        RAMP_LENGTH_M + GATE_LEAD_M
    }

    pub fn gate2_offset(&self) -> f64 {
        self.gate1_offset() + self.gate_distance_m
    }

    pub fn track_length(&self) -> f64 {
        self.gate2_offset() + RUNOUT_M
    }

    /// Incline angle for drawing the ramp
    pub fn angle_deg(&self) -> f64 {
        (self.height_m / RAMP_LENGTH_M).asin().to_degrees()
    }

    /// Distance travelled `t` seconds after release
    pub fn distance_at(&self, t: f64) -> f64 {
        let t = t.max(0.0);
        let t_ramp = self.descent_time();
        if t <= t_ramp {
            0.5 * self.acceleration() * t * t
        } else {
            RAMP_LENGTH_M + self.bottom_speed() * (t - t_ramp)
        }
    }

    /// Time at which distance `s` is reached (inverse of `distance_at`)
    pub fn time_at(&self, s: f64) -> f64 {
        if s <= RAMP_LENGTH_M {
            (2.0 * s.max(0.0) / self.acceleration()).sqrt()
        } else {
            self.descent_time() + (s - RAMP_LENGTH_M) / self.bottom_speed()
        }
    }

    /// Exact gate-to-gate time
    pub fn gate_interval(&self) -> f64 {
        self.gate_distance_m / self.bottom_speed()
    }
}

/// Lifecycle of a trial set row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SetStatus {
    Open,
    Finalized { average: f64 },
    /// Parameters changed mid-set; the row stays but takes no more trials
    Abandoned,
}

/// Up to three timed runs sharing one height/gate-distance setting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSet {
    pub set_index: u32,
    pub height_m: f64,
    pub gate_distance_m: f64,
    pub times: Vec<f64>,
    pub speed_guess: Option<f64>,
    pub status: SetStatus,
}

impl TrialSet {
    pub fn average(&self) -> Option<f64> {
        match self.status {
            SetStatus::Finalized { average } => Some(average),
            _ => None,
        }
    }

    /// `gate_distance / average`, once finalized
    pub fn expected_speed(&self) -> Option<f64> {
        self.average()
            .filter(|avg| *avg > 0.0)
            .map(|avg| self.gate_distance_m / avg)
    }
}

/// Result of recording one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordedTrial {
    pub set_index: u32,
    /// 1-based trial number within the set
    pub trial_number: usize,
    pub time: f64,
    /// Average, when this trial completed the set
    pub finalized: Option<f64>,
}

/// Table of trial sets
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialLog {
    sets: Vec<TrialSet>,
    next_index: u32,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sets(&self) -> &[TrialSet] {
        &self.sets
    }

    pub fn get(&self, set_index: u32) -> Option<&TrialSet> {
        self.sets.iter().find(|s| s.set_index == set_index)
    }

    pub fn open_set(&self) -> Option<&TrialSet> {
        self.sets.iter().rev().find(|s| s.status == SetStatus::Open)
    }

    /// Append a time, opening a set on demand and finalizing on the third
    pub fn record(&mut self, time: f64, track: &RampTrack) -> RecordedTrial {
        let open = self.sets.iter().rposition(|s| s.status == SetStatus::Open);
        let index = match open {
            Some(index) => index,
            None => {
                self.next_index += 1;
                self.sets.push(TrialSet {
                    set_index: self.next_index,
                    height_m: track.height_m,
                    gate_distance_m: track.gate_distance_m,
                    times: Vec::with_capacity(TRIALS_PER_SET),
                    speed_guess: None,
                    status: SetStatus::Open,
                });
                self.sets.len() - 1
            }
        };

        let set = &mut self.sets[index];
        set.times.push(time);

        let finalized = if set.times.len() >= TRIALS_PER_SET {
            let average = set.times.iter().sum::<f64>() / set.times.len() as f64;
            set.status = SetStatus::Finalized { average };
            log::info!("set {} finalized, average {average:.3} s", set.set_index);
            Some(average)
        } else {
            None
        };

        RecordedTrial {
            set_index: set.set_index,
            trial_number: set.times.len(),
            time,
            finalized,
        }
    }

    /// Close the open set without an average; its row is kept
    pub fn abandon_open(&mut self) -> Option<u32> {
        let set = self
            .sets
            .iter_mut()
            .rev()
            .find(|s| s.status == SetStatus::Open)?;
        set.status = SetStatus::Abandoned;
        log::info!("set {} abandoned after {} trial(s)", set.set_index, set.times.len());
        Some(set.set_index)
    }

    pub fn clear(&mut self) {
        self.sets.clear();
        self.next_index = 0;
    }

    /// Check a speed guess against a finalized set
    pub fn validate_speed_guess(&mut self, set_index: u32, text: &str) -> AnswerState {
        let Some(set) = self.sets.iter_mut().find(|s| s.set_index == set_index) else {
            return AnswerState::Unknown;
        };
        let Some(expected) = set.expected_speed() else {
            return AnswerState::Unknown;
        };
        match parse_field(text) {
            Err(FieldError::Blank) => {
                set.speed_guess = None;
                AnswerState::Unknown
            }
            Err(FieldError::NotNumeric(_)) => AnswerState::Incorrect,
            Ok(guess) => {
                set.speed_guess = Some(guess);
                AnswerState::from_bool(speed_matches(guess, expected))
            }
        }
    }
}

/// Compare at 2 significant figures within the relative tolerance
pub fn speed_matches(guess: f64, expected: f64) -> bool {
    let g = round_sig_figs(guess, 2);
    let e = round_sig_figs(expected, 2);
    (g - e).abs() <= SPEED_RELATIVE_TOLERANCE * e.abs()
}

/// Timer text as shown on the page
pub fn format_timer(seconds: f64) -> String {
    format!("{seconds:.2} s")
}

/// Round a reading to the displayed precision
fn to_display_precision(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// The ramp simulation
#[derive(Debug, Clone)]
pub struct RampSim {
    track: RampTrack,
    phase: RampPhase,
    /// Simulated seconds since release
    clock: f64,
    gate1_time: Option<f64>,
    gate2_time: Option<f64>,
    frozen_reading: Option<f64>,
    recorded_this_run: bool,
    jitter_fraction: f64,
    playback_rate: f64,
    rng: Pcg32,
    trials: TrialLog,
}

impl RampSim {
    pub fn new(settings: &RampSettings, seed: u64) -> Self {
        Self {
            track: RampTrack::new(cm_to_m(settings.height_cm), cm_to_m(settings.gate_distance_cm)),
            phase: RampPhase::Ready,
            clock: 0.0,
            gate1_time: None,
            gate2_time: None,
            frozen_reading: None,
            recorded_this_run: false,
            jitter_fraction: settings.jitter_fraction.clamp(0.0, 0.5),
            playback_rate: if settings.playback_rate > 0.0 {
                settings.playback_rate
            } else {
                1.0
            },
            rng: Pcg32::seed_from_u64(seed),
            trials: TrialLog::new(),
        }
    }

    pub fn phase(&self) -> RampPhase {
        self.phase
    }

    pub fn track(&self) -> &RampTrack {
        &self.track
    }

    pub fn trials(&self) -> &TrialLog {
        &self.trials
    }

    pub fn trials_mut(&mut self) -> &mut TrialLog {
        &mut self.trials
    }

    /// Ready -> Rolling. Ignored mid-run or with a flat ramp.
    pub fn start(&mut self) -> bool {
        if self.phase != RampPhase::Ready {
            return false;
        }
        if self.track.bottom_speed() <= 0.0 {
            log::info!("ramp is flat; car stays put");
            return false;
        }
        self.phase = RampPhase::Rolling;
        log::debug!(
            "rolling: h={:.2} m, d={:.2} m, v={:.3} m/s",
            self.track.height_m,
            self.track.gate_distance_m,
            self.track.bottom_speed()
        );
        true
    }

    /// Back to Ready from any phase; trial rows are untouched
    pub fn reset(&mut self) {
        self.phase = RampPhase::Ready;
        self.clock = 0.0;
        self.gate1_time = None;
        self.gate2_time = None;
        self.frozen_reading = None;
        self.recorded_this_run = false;
    }

    /// Advance by `dt` seconds of wall time
    pub fn advance(&mut self, dt: f64) -> Vec<RampEvent> {
        let mut events = Vec::new();
        if matches!(self.phase, RampPhase::Ready | RampPhase::Stopped) {
            return events;
        }

        self.clock += dt.max(0.0) * self.playback_rate;

        let t_gate1 = self.track.time_at(self.track.gate1_offset());
        let t_gate2 = self.track.time_at(self.track.gate2_offset());
        let t_end = self.track.time_at(self.track.track_length());

        if self.gate1_time.is_none() && self.clock >= t_gate1 {
            self.gate1_time = Some(t_gate1);
            self.phase = RampPhase::Gate1Triggered;
            events.push(RampEvent::Gate1);
        }
        if self.gate2_time.is_none() && self.clock >= t_gate2 {
            self.gate2_time = Some(t_gate2);
            self.phase = RampPhase::Gate2Triggered;
            let reading = to_display_precision(self.jittered(t_gate2 - t_gate1));
            self.frozen_reading = Some(reading);
            events.push(RampEvent::Gate2 { reading });
        }
        if self.clock >= t_end {
            self.clock = t_end;
            self.phase = RampPhase::Stopped;
            events.push(RampEvent::Finished);
        }
        events
    }

    /// True time since gate 1 (frozen after gate 2)
    pub fn true_elapsed(&self) -> f64 {
        match self.gate1_time {
            None => 0.0,
            Some(t1) => self.gate2_time.unwrap_or(self.clock) - t1,
        }
    }

    fn jittered(&mut self, seconds: f64) -> f64 {
        let j = self.jitter_fraction;
        seconds * (1.0 + self.rng.random_range(-j..=j))
    }

    /// Value for the timer display; draws new jitter on each call while timing
    pub fn display_reading(&mut self) -> f64 {
        if let Some(frozen) = self.frozen_reading {
            return frozen;
        }
        match self.phase {
            RampPhase::Gate1Triggered => self.jittered(self.true_elapsed()),
            _ => 0.0,
        }
    }

    /// Car progress along the whole track, 0 at the top, 1 at the end
    pub fn car_progress(&self) -> f64 {
        let s = if self.phase == RampPhase::Ready {
            0.0
        } else {
            self.track.distance_at(self.clock)
        };
        (s / self.track.track_length()).clamp(0.0, 1.0)
    }

    /// Car still on the incline
    pub fn car_on_ramp(&self) -> bool {
        self.phase == RampPhase::Ready || self.clock < self.track.descent_time()
    }

    /// Record this run's frozen reading; once per run, after gate 2
    pub fn record_trial(&mut self) -> Option<RecordedTrial> {
        if self.recorded_this_run {
            log::debug!("run already recorded");
            return None;
        }
        let reading = self.frozen_reading?;
        self.recorded_this_run = true;
        let trial = self.trials.record(reading, &self.track);
        log::info!(
            "set {} trial {}: {:.2} s",
            trial.set_index,
            trial.trial_number,
            trial.time
        );
        Some(trial)
    }

    /// Height slider moved (cm). Resets the run and abandons an open set.
    pub fn set_height_cm(&mut self, cm: f64) -> bool {
        let track = RampTrack::new(cm_to_m(cm), self.track.gate_distance_m);
        self.change_track(track)
    }

    /// Gate distance slider moved (cm)
    pub fn set_gate_distance_cm(&mut self, cm: f64) -> bool {
        let track = RampTrack::new(self.track.height_m, cm_to_m(cm));
        self.change_track(track)
    }

    fn change_track(&mut self, track: RampTrack) -> bool {
        if track == self.track {
            return false;
        }
        self.track = track;
        self.trials.abandon_open();
        self.reset();
        true
    }

    /// Empty the trial table
    pub fn clear_trials(&mut self) {
        self.trials.clear();
        log::info!("trial table cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> RampSim {
        RampSim::new(&RampSettings::default(), 42)
    }

    fn run_to_end(sim: &mut RampSim) -> Vec<RampEvent> {
        let mut events = Vec::new();
        assert!(sim.start());
        for _ in 0..2000 {
            events.extend(sim.advance(1.0 / 60.0));
            if sim.phase() == RampPhase::Stopped {
                break;
            }
        }
        events
    }

    #[test]
    fn test_kinematics() {
        let track = RampTrack::new(0.2, 0.5);
        let v = track.bottom_speed();
        assert!((v - (2.0f64 * 9.81 * 0.2).sqrt()).abs() < 1e-12);
        assert!((track.distance_at(track.descent_time()) - RAMP_LENGTH_M).abs() < 1e-9);
        let s = 1.3;
        assert!((track.distance_at(track.time_at(s)) - s).abs() < 1e-9);
        assert!((track.gate_interval() - 0.5 / v).abs() < 1e-12);
        assert!((track.angle_deg() - 0.2f64.asin().to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_run_phases_and_events() {
        let mut sim = sim();
        assert_eq!(sim.phase(), RampPhase::Ready);
        let events = run_to_end(&mut sim);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], RampEvent::Gate1);
        assert!(matches!(events[1], RampEvent::Gate2 { .. }));
        assert_eq!(events[2], RampEvent::Finished);
        assert_eq!(sim.phase(), RampPhase::Stopped);
        assert!((sim.car_progress() - 1.0).abs() < 1e-9);

        // True interval is exact regardless of frame rate
        assert!((sim.true_elapsed() - sim.track().gate_interval()).abs() < 1e-12);
    }

    #[test]
    fn test_one_big_step_fires_all_events_in_order() {
        let mut sim = sim();
        sim.start();
        let events = sim.advance(100.0);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], RampEvent::Gate1);
        assert_eq!(events[2], RampEvent::Finished);
    }

    #[test]
    fn test_reading_within_jitter() {
        let mut sim = sim();
        let events = run_to_end(&mut sim);
        let RampEvent::Gate2 { reading } = events[1] else {
            panic!("expected gate 2");
        };
        let truth = sim.track().gate_interval();
        assert!((reading - truth).abs() <= truth * 0.05 + 0.005);
        // Frozen after gate 2
        assert_eq!(sim.display_reading(), reading);
        assert_eq!(sim.display_reading(), reading);
    }

    #[test]
    fn test_display_jitter_redrawn_while_timing() {
        let mut sim = sim();
        sim.start();
        while sim.phase() != RampPhase::Gate1Triggered {
            sim.advance(0.001);
        }
        sim.advance(0.05);
        let truth = sim.true_elapsed();
        let readings: Vec<f64> = (0..20).map(|_| sim.display_reading()).collect();
        assert!(readings.iter().all(|r| (r - truth).abs() <= truth * 0.05 + 1e-12));
        assert!(readings.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_no_jitter_when_disabled() {
        let settings = RampSettings {
            jitter_fraction: 0.0,
            ..Default::default()
        };
        let mut sim = RampSim::new(&settings, 1);
        let events = run_to_end(&mut sim);
        let truth = to_display_precision(sim.track().gate_interval());
        assert_eq!(events[1], RampEvent::Gate2 { reading: truth });
    }

    #[test]
    fn test_start_ignored_mid_run_and_flat() {
        let mut sim = sim();
        assert!(sim.start());
        assert!(!sim.start());
        sim.reset();
        assert_eq!(sim.phase(), RampPhase::Ready);
        assert_eq!(sim.car_progress(), 0.0);

        sim.set_height_cm(0.0);
        assert!(!sim.start());
    }

    #[test]
    fn test_record_once_per_run() {
        let mut sim = sim();
        assert!(sim.record_trial().is_none(), "nothing to record before a run");
        run_to_end(&mut sim);
        let t = sim.record_trial().unwrap();
        assert_eq!((t.set_index, t.trial_number), (1, 1));
        assert!(sim.record_trial().is_none());
    }

    #[test]
    fn test_three_trials_finalize_set() {
        let mut sim = sim();
        for n in 1..=3 {
            sim.reset();
            run_to_end(&mut sim);
            let t = sim.record_trial().unwrap();
            assert_eq!(t.trial_number, n);
            assert_eq!(t.finalized.is_some(), n == 3);
        }
        sim.reset();
        run_to_end(&mut sim);
        let t = sim.record_trial().unwrap();
        assert_eq!((t.set_index, t.trial_number), (2, 1));
        assert_eq!(sim.trials().sets().len(), 2);
    }

    #[test]
    fn test_average_and_speed_guess() {
        let track = RampTrack::new(0.3, 0.5);
        let mut log = TrialLog::new();
        log.record(1.00, &track);
        log.record(1.02, &track);
        let last = log.record(0.99, &track);
        let avg = last.finalized.unwrap();
        assert!((avg - 3.01 / 3.0).abs() < 1e-12);

        let guess = round_sig_figs(0.5 / 1.00333, 2);
        assert_eq!(
            log.validate_speed_guess(1, &guess.to_string()),
            AnswerState::Correct
        );
        assert_eq!(log.get(1).unwrap().speed_guess, Some(guess));
        assert_eq!(log.validate_speed_guess(1, "0.60"), AnswerState::Incorrect);
        assert_eq!(log.validate_speed_guess(1, "fast"), AnswerState::Incorrect);
        assert_eq!(log.validate_speed_guess(1, ""), AnswerState::Unknown);
        assert_eq!(log.validate_speed_guess(9, "0.5"), AnswerState::Unknown);
    }

    #[test]
    fn test_speed_matches_tolerance() {
        assert!(speed_matches(0.52, 0.50));
        assert!(!speed_matches(0.53, 0.50));
        assert!(speed_matches(0.498, 0.5));
    }

    #[test]
    fn test_parameter_change_abandons_open_set() {
        let mut sim = sim();
        run_to_end(&mut sim);
        sim.record_trial();
        sim.reset();
        run_to_end(&mut sim);
        sim.record_trial();

        assert!(sim.set_gate_distance_cm(80.0));
        assert_eq!(sim.phase(), RampPhase::Ready);
        let set = &sim.trials().sets()[0];
        assert_eq!(set.status, SetStatus::Abandoned);
        assert_eq!(set.times.len(), 2, "written row is kept");

        run_to_end(&mut sim);
        let t = sim.record_trial().unwrap();
        assert_eq!((t.set_index, t.trial_number), (2, 1));
        assert!((sim.trials().sets()[1].gate_distance_m - 0.8).abs() < 1e-12);

        // Same value again is not a change
        assert!(!sim.set_gate_distance_cm(80.0));
    }

    #[test]
    fn test_finalized_rows_survive_parameter_change() {
        let track = RampTrack::new(0.3, 0.5);
        let mut log = TrialLog::new();
        for t in [1.0, 1.0, 1.0] {
            log.record(t, &track);
        }
        assert_eq!(log.abandon_open(), None);
        assert_eq!(log.sets()[0].average(), Some(1.0));
    }

    #[test]
    fn test_clear_trials() {
        let mut sim = sim();
        run_to_end(&mut sim);
        sim.record_trial();
        sim.clear_trials();
        assert!(sim.trials().sets().is_empty());
        sim.reset();
        run_to_end(&mut sim);
        assert_eq!(sim.record_trial().unwrap().set_index, 1);
    }

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(0.25), "0.25 s");
        assert_eq!(format_timer(1.0), "1.00 s");
    }
}

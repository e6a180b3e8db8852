//! Balance physics derived from the mass registry
//!
//! A pure function of registry state, recomputed from scratch after every
//! mutation. Tilt and verdict use kg·slot moments; the answer-checking
//! moments use newtons (`|position| * value * g`).

use serde::Serialize;

use super::geometry::Side;
use super::registry::{Mass, MassId, RegistryStore};
use crate::consts::*;

/// Tri-state balance verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceVerdict {
    Balanced,
    ClockwiseResultant,
    AntiClockwiseResultant,
}

impl BalanceVerdict {
    /// Classify a resultant moment; balanced is strictly `|m| < 0.1`
    pub fn from_total_moment(total: f64) -> Self {
        if total.abs() < BALANCE_THRESHOLD {
            BalanceVerdict::Balanced
        } else if total > 0.0 {
            BalanceVerdict::ClockwiseResultant
        } else {
            BalanceVerdict::AntiClockwiseResultant
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BalanceVerdict::Balanced => "Balanced!",
            BalanceVerdict::ClockwiseResultant => "Clockwise Resultant",
            BalanceVerdict::AntiClockwiseResultant => "Anti-clockwise Resultant",
        }
    }

    /// Status element class list
    pub fn css_class(&self) -> &'static str {
        match self {
            BalanceVerdict::Balanced => "balance-status balanced",
            _ => "balance-status unbalanced",
        }
    }
}

/// Per-side pair of values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerSide {
    pub left: f64,
    pub right: f64,
}

impl PerSide {
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Center => 0.0,
        }
    }
}

/// Everything derived from the registry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceState {
    /// Σ|position·value| per side (kg·slot)
    pub moments: PerSide,
    /// right - left
    pub total_moment: f64,
    /// Beam tilt, clamped to ±15°
    pub rotation_deg: f64,
    pub verdict: BalanceVerdict,
    /// Σ value·g per side (N)
    pub forces: PerSide,
    /// Σ |position|·force per side (N·slot), what students should enter
    pub expected_moments: PerSide,
}

impl BalanceState {
    pub fn compute(registry: &RegistryStore) -> Self {
        Self::from_masses(registry.all())
    }

    pub fn from_masses(masses: &[Mass]) -> Self {
        let mut moments = PerSide::default();
        let mut forces = PerSide::default();
        let mut expected = PerSide::default();

        for m in masses {
            let moment = m.position as f64 * m.value;
            let force = force_of(m.value);
            let contribution = m.position.unsigned_abs() as f64 * force;
            match m.side() {
                Side::Left => {
                    moments.left += moment.abs();
                    forces.left += force;
                    expected.left += contribution;
                }
                Side::Right => {
                    moments.right += moment;
                    forces.right += force;
                    expected.right += contribution;
                }
                Side::Center => {}
            }
        }

        let total_moment = moments.right - moments.left;
        Self {
            moments,
            total_moment,
            rotation_deg: total_moment.clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG),
            verdict: BalanceVerdict::from_total_moment(total_moment),
            forces,
            expected_moments: expected,
        }
    }
}

/// Weight of a mass in newtons
#[inline]
pub fn force_of(value: f64) -> f64 {
    value * GRAVITY_N_PER_KG
}

/// Downward force arrow drawn under a mass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceArrow {
    pub mass_id: MassId,
    pub newtons: f64,
    pub shaft_px: f64,
    pub label: String,
}

impl ForceArrow {
    pub fn for_mass(mass: &Mass) -> Self {
        let newtons = force_of(mass.value);
        Self {
            mass_id: mass.id,
            newtons,
            shaft_px: (newtons * ARROW_PX_PER_NEWTON).clamp(ARROW_MIN_PX, ARROW_MAX_PX),
            label: format!("{newtons} N"),
        }
    }
}

pub fn force_arrows(registry: &RegistryStore) -> Vec<ForceArrow> {
    registry.all().iter().map(ForceArrow::for_mass).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_balanced() {
        let state = BalanceState::compute(&RegistryStore::new());
        assert_eq!(state.total_moment, 0.0);
        assert_eq!(state.rotation_deg, 0.0);
        assert_eq!(state.verdict, BalanceVerdict::Balanced);
    }

    #[test]
    fn test_moments_and_forces() {
        let mut reg = RegistryStore::new();
        reg.add_at(2.0, -3); // 6 kg·slot left, 20 N
        reg.add_at(3.0, 2); // 6 kg·slot right, 30 N
        reg.add_at(5.0, 0); // centre, ignored
        let state = BalanceState::compute(&reg);
        assert_eq!(state.moments.left, 6.0);
        assert_eq!(state.moments.right, 6.0);
        assert_eq!(state.verdict, BalanceVerdict::Balanced);
        assert_eq!(state.forces.left, 20.0);
        assert_eq!(state.forces.right, 30.0);
        assert_eq!(state.expected_moments.left, 60.0);
        assert_eq!(state.expected_moments.right, 60.0);
    }

    #[test]
    fn test_rotation_clamped() {
        let mut reg = RegistryStore::new();
        reg.add_at(10.0, 12);
        let state = BalanceState::compute(&reg);
        assert_eq!(state.total_moment, 120.0);
        assert_eq!(state.rotation_deg, 15.0);
        assert_eq!(state.verdict, BalanceVerdict::ClockwiseResultant);

        reg.clear();
        reg.add_at(10.0, -12);
        let state = BalanceState::compute(&reg);
        assert_eq!(state.rotation_deg, -15.0);
        assert_eq!(state.verdict, BalanceVerdict::AntiClockwiseResultant);
    }

    #[test]
    fn test_verdict_threshold_is_strict() {
        assert_eq!(BalanceVerdict::from_total_moment(0.0999), BalanceVerdict::Balanced);
        assert_eq!(BalanceVerdict::from_total_moment(-0.0999), BalanceVerdict::Balanced);
        assert_eq!(
            BalanceVerdict::from_total_moment(0.1),
            BalanceVerdict::ClockwiseResultant
        );
        assert_eq!(
            BalanceVerdict::from_total_moment(-0.1),
            BalanceVerdict::AntiClockwiseResultant
        );
    }

    #[test]
    fn test_force_arrow_length_clamped() {
        let mut reg = RegistryStore::new();
        reg.add_at(1.0, 1); // 10 N -> 8 px -> 12
        reg.add_at(5.0, 2); // 50 N -> 40 px
        reg.add_at(10.0, 3); // 100 N -> 80 px -> 60
        let arrows = force_arrows(&reg);
        assert_eq!(arrows[0].shaft_px, 12.0);
        assert!((arrows[1].shaft_px - 40.0).abs() < 1e-9);
        assert_eq!(arrows[2].shaft_px, 60.0);
        assert_eq!(arrows[1].label, "50 N");
    }
}

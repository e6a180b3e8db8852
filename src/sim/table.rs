//! Results table model and answer checking
//!
//! Basic mode shows two aggregate rows (Left, Right). Advanced mode shows
//! one row per mass, left side first, each side sorted by position
//! ascending. Centre masses carry no moment and get no row.

use serde::Serialize;

use super::balance::{BalanceState, force_of};
use super::drag::LabMode;
use super::geometry::Side;
use super::registry::{MassId, RegistryStore};
use crate::consts::{ADVANCED_MOMENT_TOLERANCE, BASIC_MOMENT_TOLERANCE};
use crate::error::{FieldError, parse_field};

/// Feedback on a student answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnswerState {
    /// Nothing entered yet
    Unknown,
    Correct,
    Incorrect,
}

impl AnswerState {
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            AnswerState::Correct
        } else {
            AnswerState::Incorrect
        }
    }

    /// Mark shown next to the input
    pub fn mark(&self) -> &'static str {
        match self {
            AnswerState::Unknown => "",
            AnswerState::Correct => "✓",
            AnswerState::Incorrect => "✗",
        }
    }

    /// (input class, mark class)
    pub fn classes(&self) -> Option<(&'static str, &'static str)> {
        match self {
            AnswerState::Unknown => None,
            AnswerState::Correct => Some(("answer-correct", "correct")),
            AnswerState::Incorrect => Some(("answer-incorrect", "incorrect")),
        }
    }
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableRow {
    /// Basic mode side total
    Aggregate {
        side: Side,
        total_force: f64,
        expected_moment: f64,
    },
    /// Advanced mode single mass
    PerMass {
        mass_id: MassId,
        side: Side,
        position: i32,
        force: f64,
    },
}

impl TableRow {
    pub fn side(&self) -> Side {
        match self {
            TableRow::Aggregate { side, .. } | TableRow::PerMass { side, .. } => *side,
        }
    }

    /// Read-only force cell value
    pub fn force(&self) -> f64 {
        match self {
            TableRow::Aggregate { total_force, .. } => *total_force,
            TableRow::PerMass { force, .. } => *force,
        }
    }

    /// Check the student's distance/moment entries for this row
    pub fn validate(&self, distance: &str, moment: &str) -> AnswerState {
        match self {
            TableRow::Aggregate {
                expected_moment, ..
            } => validate_basic_moment(moment, *expected_moment),
            TableRow::PerMass { force, .. } => validate_advanced_row(distance, moment, *force),
        }
    }
}

/// Table contents for the current mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsTable {
    pub mode: LabMode,
    pub rows: Vec<TableRow>,
}

impl ResultsTable {
    pub fn build(mode: LabMode, registry: &RegistryStore, balance: &BalanceState) -> Self {
        let rows = match mode {
            LabMode::Basic => [Side::Left, Side::Right]
                .into_iter()
                .map(|side| TableRow::Aggregate {
                    side,
                    total_force: balance.forces.get(side),
                    expected_moment: balance.expected_moments.get(side),
                })
                .collect(),
            LabMode::Advanced => {
                let mut left: Vec<_> = registry.all().iter().filter(|m| m.position < 0).collect();
                let mut right: Vec<_> = registry.all().iter().filter(|m| m.position > 0).collect();
                // Stable sort keeps insertion order for masses sharing a slot
                left.sort_by_key(|m| m.position);
                right.sort_by_key(|m| m.position);
                left.into_iter()
                    .chain(right)
                    .map(|m| TableRow::PerMass {
                        mass_id: m.id,
                        side: m.side(),
                        position: m.position,
                        force: force_of(m.value),
                    })
                    .collect()
            }
        };
        Self { mode, rows }
    }

    pub fn row_for_mass(&self, id: MassId) -> Option<&TableRow> {
        self.rows
            .iter()
            .find(|r| matches!(r, TableRow::PerMass { mass_id, .. } if *mass_id == id))
    }

    pub fn row_for_side(&self, side: Side) -> Option<&TableRow> {
        self.rows
            .iter()
            .find(|r| matches!(r, TableRow::Aggregate { side: s, .. } if *s == side))
    }
}

/// Basic mode: moment against the side's expected moment
pub fn validate_basic_moment(moment: &str, expected: f64) -> AnswerState {
    match parse_field(moment) {
        Err(FieldError::Blank) => AnswerState::Unknown,
        Err(FieldError::NotNumeric(_)) => AnswerState::Incorrect,
        Ok(v) => AnswerState::from_bool((v - expected).abs() <= BASIC_MOMENT_TOLERANCE),
    }
}

/// Advanced mode: moment against `force * entered distance`.
///
/// Both fields blank is Unknown; any other missing or non-numeric entry is
/// Incorrect. The tolerance absorbs float noise, not rounding.
pub fn validate_advanced_row(distance: &str, moment: &str, force: f64) -> AnswerState {
    let d = parse_field(distance);
    let m = parse_field(moment);
    match (d, m) {
        (Err(FieldError::Blank), Err(FieldError::Blank)) => AnswerState::Unknown,
        (Ok(d), Ok(m)) => AnswerState::from_bool((m - force * d).abs() <= ADVANCED_MOMENT_TOLERANCE),
        _ => AnswerState::Incorrect,
    }
}

/// Header texts by column index for a 4-column table, or the 5-column
/// fallback layout. Other column counts are left alone.
pub fn headings(mode: LabMode, column_count: usize) -> Vec<(usize, &'static str)> {
    let force = if mode.is_advanced() {
        "Force (N)"
    } else {
        "Total Force (N)"
    };
    match column_count {
        4 => vec![
            (0, "Side"),
            (1, force),
            (2, "Distance"),
            (3, "Moment (Force × Distance)"),
        ],
        5 => vec![
            (0, "Side"),
            (2, force),
            (3, "Distance"),
            (4, "Moment (Force × Distance)"),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(mode: LabMode, reg: &RegistryStore) -> ResultsTable {
        ResultsTable::build(mode, reg, &BalanceState::compute(reg))
    }

    #[test]
    fn test_basic_rows() {
        let mut reg = RegistryStore::new();
        reg.add_at(2.0, -3);
        reg.add_at(1.0, 5);
        let t = table(LabMode::Basic, &reg);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].side(), Side::Left);
        assert_eq!(t.rows[0].force(), 20.0);
        assert_eq!(t.rows[1].force(), 10.0);
        assert_eq!(t.rows[0].validate("", "60"), AnswerState::Correct);
        assert_eq!(t.rows[1].validate("", "50"), AnswerState::Correct);
        assert_eq!(t.rows[1].validate("", "49.9"), AnswerState::Incorrect);
    }

    #[test]
    fn test_basic_rows_empty_registry() {
        let t = table(LabMode::Basic, &RegistryStore::new());
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.row_for_side(Side::Right).unwrap().force(), 0.0);
    }

    #[test]
    fn test_basic_validation_states() {
        assert_eq!(validate_basic_moment("", 10.0), AnswerState::Unknown);
        assert_eq!(validate_basic_moment("  ", 10.0), AnswerState::Unknown);
        assert_eq!(validate_basic_moment("ten", 10.0), AnswerState::Incorrect);
        assert_eq!(validate_basic_moment("10.0000001", 10.0), AnswerState::Correct);
        assert_eq!(validate_basic_moment("10.00001", 10.0), AnswerState::Incorrect);
    }

    #[test]
    fn test_advanced_rows_order() {
        let mut reg = RegistryStore::new();
        let r2 = reg.add_at(1.0, 2).id;
        let l1 = reg.add_at(1.0, -1).id;
        reg.add_at(1.0, 0);
        let l9 = reg.add_at(1.0, -9).id;
        let r8 = reg.add_at(1.0, 8).id;
        let t = table(LabMode::Advanced, &reg);
        let ids: Vec<_> = t
            .rows
            .iter()
            .map(|r| match r {
                TableRow::PerMass { mass_id, .. } => *mass_id,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![l9, l1, r2, r8]);
    }

    #[test]
    fn test_advanced_validation() {
        // 3 kg at slot 4: 30 N
        let force = force_of(3.0);
        assert_eq!(validate_advanced_row("4", "120", force), AnswerState::Correct);
        assert_eq!(validate_advanced_row("4", "119", force), AnswerState::Incorrect);
        assert_eq!(validate_advanced_row("4", "120.005", force), AnswerState::Correct);
        assert_eq!(validate_advanced_row("", "", force), AnswerState::Unknown);
        assert_eq!(validate_advanced_row("", "120", force), AnswerState::Incorrect);
        assert_eq!(validate_advanced_row("4", "", force), AnswerState::Incorrect);
        assert_eq!(validate_advanced_row("four", "120", force), AnswerState::Incorrect);
    }

    #[test]
    fn test_headings() {
        let basic = headings(LabMode::Basic, 4);
        assert_eq!(basic[1], (1, "Total Force (N)"));
        let adv = headings(LabMode::Advanced, 5);
        assert_eq!(adv[1], (2, "Force (N)"));
        assert_eq!(adv[3], (4, "Moment (Force × Distance)"));
        assert!(headings(LabMode::Basic, 3).is_empty());
    }

    #[test]
    fn test_marks() {
        assert_eq!(AnswerState::Correct.mark(), "✓");
        assert_eq!(AnswerState::Incorrect.classes(), Some(("answer-incorrect", "incorrect")));
        assert_eq!(AnswerState::Unknown.classes(), None);
    }
}

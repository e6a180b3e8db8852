//! Balance-beam lab: owned stores plus the recompute pipeline
//!
//! Pointer events go in, decisions and fresh snapshots come out. Every
//! terminal drag state and every registry mutation ends in
//! [`BeamLab::on_registry_changed`], which rebuilds balance, arrows and
//! table from scratch.

use glam::Vec2;
use serde::Serialize;

use super::balance::{BalanceState, ForceArrow, force_arrows};
use super::drag::{
    DragSession, DragSessionStore, DragSource, DropOutcome, LabMode, PointerId, commit,
    evaluate_drop,
};
use super::geometry::Rect;
use super::notice::{Notice, NoticeSlot, NoticeTicket};
use super::registry::{MassId, RegistryStore};
use super::table::{AnswerState, ResultsTable};
use crate::settings::Settings;

/// Derived view of the lab after a mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabSnapshot {
    pub balance: BalanceState,
    pub arrows: Vec<ForceArrow>,
    pub table: ResultsTable,
}

/// Result of a pointer-up/cancel that ended the drag
#[derive(Debug, Clone)]
pub struct DropResolution {
    pub session: DragSession,
    pub outcome: DropOutcome,
    pub notice: Option<Notice>,
    pub snapshot: LabSnapshot,
}

/// Result of toggling the mode control
#[derive(Debug, Clone)]
pub struct ModeChange {
    pub mode: LabMode,
    /// Masses removed by leaving Advanced mode
    pub removed: Vec<MassId>,
    pub snapshot: LabSnapshot,
}

pub struct BeamLab {
    registry: RegistryStore,
    session: DragSessionStore,
    mode: LabMode,
    notices: NoticeSlot,
    notice_ms: u32,
}

impl Default for BeamLab {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl BeamLab {
    pub fn new(settings: &Settings) -> Self {
        Self {
            registry: RegistryStore::new(),
            session: DragSessionStore::new(),
            mode: LabMode::from_advanced(settings.advanced_mode),
            notices: NoticeSlot::new(),
            notice_ms: settings.notice_ms,
        }
    }

    pub fn registry(&self) -> &RegistryStore {
        &self.registry
    }

    pub fn mode(&self) -> LabMode {
        self.mode
    }

    pub fn active_drag(&self) -> Option<&DragSession> {
        self.session.active()
    }

    /// Drop-zone markers are highlighted while any drag is in flight
    pub fn drop_zones_active(&self) -> bool {
        self.session.is_active()
    }

    /// Pointer-down on a storage tile
    pub fn pointer_down_storage(&mut self, value: f64, pointer_id: PointerId, offset: Vec2) -> bool {
        self.session
            .begin(DragSource::Storage { value }, pointer_id, offset, &self.registry)
            .is_some()
    }

    /// Pointer-down on a mass already on the beam
    pub fn pointer_down_mass(&mut self, id: MassId, pointer_id: PointerId, offset: Vec2) -> bool {
        self.session
            .begin(DragSource::Placed { id }, pointer_id, offset, &self.registry)
            .is_some()
    }

    /// New top-left for the dragged element; `None` for foreign pointers
    pub fn pointer_move(&self, pointer_id: PointerId, pointer: Vec2) -> Option<Vec2> {
        self.session.drag_to(pointer_id, pointer)
    }

    /// Pointer-up: evaluate, commit, clean up, recompute.
    ///
    /// `center` is the dragged element's centre and `beam` the beam's
    /// bounding box, both in client space.
    pub fn pointer_up(
        &mut self,
        pointer_id: PointerId,
        center: Vec2,
        beam: &Rect,
    ) -> Option<DropResolution> {
        let session = self.session.finish(pointer_id)?;
        let decision = evaluate_drop(&session, center, beam, &self.registry, self.mode);
        let outcome = commit(&session, decision, &mut self.registry);
        let notice = outcome
            .notice()
            .map(|text| self.notices.show(text, self.notice_ms).clone());

        Some(DropResolution {
            session,
            outcome,
            notice,
            snapshot: self.on_registry_changed(),
        })
    }

    /// Pointer-cancel resolves exactly like pointer-up
    pub fn pointer_cancel(
        &mut self,
        pointer_id: PointerId,
        center: Vec2,
        beam: &Rect,
    ) -> Option<DropResolution> {
        self.pointer_up(pointer_id, center, beam)
    }

    /// Remove every mass and restart ids at 1
    pub fn clear_all(&mut self) -> (Vec<MassId>, LabSnapshot) {
        let removed = self.registry.all().iter().map(|m| m.id).collect();
        self.registry.clear();
        log::info!("beam cleared");
        (removed, self.on_registry_changed())
    }

    /// Switch mode. Leaving Advanced clears the beam, since Basic cannot
    /// represent more than one mass per side.
    pub fn set_mode(&mut self, mode: LabMode) -> ModeChange {
        let was = self.mode;
        self.mode = mode;
        let removed = if was == LabMode::Advanced && mode == LabMode::Basic {
            let (removed, _) = self.clear_all();
            removed
        } else {
            Vec::new()
        };
        if was != mode {
            log::info!("mode {was:?} -> {mode:?}");
        }
        ModeChange {
            mode,
            removed,
            snapshot: self.on_registry_changed(),
        }
    }

    /// Recompute pipeline: physics, then arrows, then table
    pub fn on_registry_changed(&self) -> LabSnapshot {
        let balance = BalanceState::compute(&self.registry);
        let arrows = force_arrows(&self.registry);
        let table = ResultsTable::build(self.mode, &self.registry, &balance);
        LabSnapshot {
            balance,
            arrows,
            table,
        }
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    /// Dismissal timer fired
    pub fn expire_notice(&mut self, ticket: NoticeTicket) -> bool {
        self.notices.expire(ticket)
    }

    /// Validate a table row's entries against the current state
    pub fn validate_row(&self, row: usize, distance: &str, moment: &str) -> AnswerState {
        let snapshot = self.on_registry_changed();
        snapshot
            .table
            .rows
            .get(row)
            .map_or(AnswerState::Unknown, |r| r.validate(distance, moment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::balance::BalanceVerdict;
    use crate::sim::drag::BASIC_MODE_NOTICE;
    use crate::sim::table::TableRow;

    fn beam() -> Rect {
        Rect::new(100.0, 300.0, 560.0, 20.0)
    }

    fn at_slot(slot: i32) -> Vec2 {
        Vec2::new(380.0 + slot as f32 * 20.0, 310.0)
    }

    fn place(lab: &mut BeamLab, value: f64, slot: i32) -> DropResolution {
        assert!(lab.pointer_down_storage(value, 1, Vec2::new(20.0, 20.0)));
        lab.pointer_up(1, at_slot(slot), &beam()).unwrap()
    }

    #[test]
    fn test_place_updates_pipeline() {
        let mut lab = BeamLab::default();
        let res = place(&mut lab, 2.0, -4);
        assert!(matches!(res.outcome, DropOutcome::Snapped { id: 1, position: -4, .. }));
        assert_eq!(res.snapshot.balance.forces.left, 20.0);
        assert_eq!(res.snapshot.balance.verdict, BalanceVerdict::AntiClockwiseResultant);
        assert_eq!(res.snapshot.arrows.len(), 1);
        assert_eq!(res.snapshot.table.rows[0].force(), 20.0);
        assert!(!lab.drop_zones_active());
    }

    #[test]
    fn test_basic_rejection_sets_notice() {
        let mut lab = BeamLab::default();
        place(&mut lab, 2.0, -4);
        let res = place(&mut lab, 1.0, -8);
        assert!(matches!(res.outcome, DropOutcome::Rejected { .. }));
        let notice = res.notice.unwrap();
        assert_eq!(notice.text, BASIC_MODE_NOTICE);
        assert_eq!(notice.duration_ms, 2000);
        assert_eq!(lab.registry().len(), 1);

        assert!(lab.expire_notice(notice.ticket));
        assert!(lab.current_notice().is_none());
    }

    #[test]
    fn test_move_tracks_owner_pointer_only() {
        let mut lab = BeamLab::default();
        lab.pointer_down_storage(1.0, 5, Vec2::new(10.0, 10.0));
        assert!(!lab.pointer_down_storage(1.0, 6, Vec2::ZERO));
        assert_eq!(lab.pointer_move(5, Vec2::new(30.0, 30.0)), Some(Vec2::new(20.0, 20.0)));
        assert_eq!(lab.pointer_move(6, Vec2::new(30.0, 30.0)), None);
        assert!(lab.pointer_up(6, at_slot(1), &beam()).is_none());
        assert!(lab.drop_zones_active());
        assert!(lab.pointer_cancel(5, at_slot(1), &beam()).is_some());
        assert!(!lab.drop_zones_active());
    }

    #[test]
    fn test_advanced_to_basic_clears_and_resets_ids() {
        let mut lab = BeamLab::default();
        lab.set_mode(LabMode::Advanced);
        place(&mut lab, 1.0, -2);
        place(&mut lab, 1.0, -3);
        place(&mut lab, 1.0, 5);
        assert_eq!(lab.registry().len(), 3);

        let change = lab.set_mode(LabMode::Basic);
        assert_eq!(change.removed, vec![1, 2, 3]);
        assert!(lab.registry().is_empty());

        let res = place(&mut lab, 1.0, 2);
        assert!(matches!(res.outcome, DropOutcome::Snapped { id: 1, .. }));
    }

    #[test]
    fn test_basic_to_advanced_keeps_masses() {
        let mut lab = BeamLab::default();
        place(&mut lab, 3.0, 4);
        let change = lab.set_mode(LabMode::Advanced);
        assert!(change.removed.is_empty());
        assert_eq!(change.snapshot.table.rows.len(), 1);
        assert!(matches!(
            change.snapshot.table.rows[0],
            TableRow::PerMass { position: 4, .. }
        ));
        assert_eq!(lab.validate_row(0, "4", "120"), AnswerState::Correct);
        assert_eq!(lab.validate_row(0, "4", "119"), AnswerState::Incorrect);
    }

    #[test]
    fn test_clear_all() {
        let mut lab = BeamLab::default();
        place(&mut lab, 3.0, 4);
        place(&mut lab, 3.0, -4);
        let (removed, snapshot) = lab.clear_all();
        assert_eq!(removed.len(), 2);
        assert_eq!(snapshot.balance.verdict, BalanceVerdict::Balanced);
        assert_eq!(lab.validate_row(0, "", "0"), AnswerState::Correct);
    }
}

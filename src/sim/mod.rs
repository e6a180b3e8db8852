//! Lab simulation core
//!
//! All lab logic lives here. This module must stay platform-free:
//! - No DOM, no rendering
//! - Registry mutated only through drag commits and clears
//! - Derived state (balance, table) recomputed from scratch
//! - Seeded RNG only (ramp timer jitter)

pub mod balance;
pub mod drag;
pub mod geometry;
pub mod lab;
pub mod notice;
pub mod ramp;
pub mod registry;
pub mod table;

pub use balance::{BalanceState, BalanceVerdict, ForceArrow, PerSide, force_arrows, force_of};
pub use drag::{
    BASIC_MODE_NOTICE, DragOrigin, DragSession, DragSessionStore, DragSource, DragTarget,
    DropDecision, DropOutcome, LabMode, PointerId, commit, evaluate_drop,
};
pub use geometry::{
    Rect, ScaleMark, Side, catchment_zone, drop_zones, nearest_slot, scale_marks, slot_center_px,
    slot_offset_px, spacing,
};
pub use lab::{BeamLab, DropResolution, LabSnapshot, ModeChange};
pub use notice::{Notice, NoticeSlot, NoticeTicket};
pub use ramp::{
    RampEvent, RampPhase, RampSim, RampTrack, RecordedTrial, SetStatus, TrialLog, TrialSet,
    format_timer, speed_matches,
};
pub use registry::{Mass, MassId, RegistryStore};
pub use table::{
    AnswerState, ResultsTable, TableRow, headings, validate_advanced_row, validate_basic_moment,
};

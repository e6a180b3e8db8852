//! Drag engine - placement, snapping and rejection of masses
//!
//! States: `Idle -> Dragging -> {Snapped, Rejected, Reverted, Discarded} -> Idle`.
//!
//! A drop is handled in two phases. [`evaluate_drop`] does all hit testing
//! and rule checks against the unmodified registry and returns a
//! [`DropDecision`]; [`commit`] applies it. Only the accept branch of
//! `commit` writes a new slot, so a rejected or reverted drop can never leave
//! the registry half-updated.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Side, catchment_zone, nearest_slot};
use super::registry::{MassId, RegistryStore};

/// Notice shown when Basic mode refuses a second mass on one side
pub const BASIC_MODE_NOTICE: &str = "Basic mode: only one mass per side";

/// Platform pointer identifier
pub type PointerId = i32;

/// Placement/validation regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabMode {
    /// At most one mass per side; two aggregate table rows
    #[default]
    Basic,
    /// Unlimited masses; one table row per mass
    Advanced,
}

impl LabMode {
    pub fn from_advanced(advanced: bool) -> Self {
        if advanced {
            LabMode::Advanced
        } else {
            LabMode::Basic
        }
    }

    pub fn is_advanced(&self) -> bool {
        *self == LabMode::Advanced
    }

    /// Masses allowed on each non-centre side
    pub fn capacity_per_side(&self) -> Option<usize> {
        match self {
            LabMode::Basic => Some(1),
            LabMode::Advanced => None,
        }
    }
}

/// Where a drag gesture started
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragSource {
    /// A storage tile of the given mass (kg)
    Storage { value: f64 },
    /// A mass already on the beam
    Placed { id: MassId },
}

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    /// Tile not yet registered; gets an id only if the drop is accepted
    NewTile { value: f64 },
    Placed { id: MassId },
}

/// Placement context captured at pointer-down, used to revert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOrigin {
    pub position: i32,
    /// Registry order index (visual sibling order)
    pub index: Option<usize>,
}

/// The one in-flight drag gesture
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub target: DragTarget,
    pub pointer_id: PointerId,
    /// Grab point relative to the element's top-left corner
    pub offset: Vec2,
    pub origin: DragOrigin,
}

impl DragSession {
    pub fn placed_id(&self) -> Option<MassId> {
        match self.target {
            DragTarget::Placed { id } => Some(id),
            DragTarget::NewTile { .. } => None,
        }
    }
}

/// Single nullable session slot with a pointer-id guard
#[derive(Debug, Default)]
pub struct DragSessionStore {
    active: Option<DragSession>,
}

impl DragSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    /// Idle -> Dragging.
    ///
    /// Returns `None` (gesture ignored) when a session is already active or
    /// the placed mass is not in the registry.
    pub fn begin(
        &mut self,
        source: DragSource,
        pointer_id: PointerId,
        offset: Vec2,
        registry: &RegistryStore,
    ) -> Option<&DragSession> {
        if self.active.is_some() {
            log::debug!("pointer {pointer_id} ignored: drag already active");
            return None;
        }

        let (target, origin) = match source {
            DragSource::Storage { value } => (
                DragTarget::NewTile { value },
                DragOrigin {
                    position: 0,
                    index: None,
                },
            ),
            DragSource::Placed { id } => {
                let mass = registry.get(id)?;
                (
                    DragTarget::Placed { id },
                    DragOrigin {
                        position: mass.position,
                        index: registry.index_of(id),
                    },
                )
            }
        };

        self.active = Some(DragSession {
            target,
            pointer_id,
            offset,
            origin,
        });
        self.active.as_ref()
    }

    /// Element top-left for a pointer position, if the pointer owns the drag
    pub fn drag_to(&self, pointer_id: PointerId, pointer: Vec2) -> Option<Vec2> {
        let session = self.active.as_ref()?;
        (session.pointer_id == pointer_id).then(|| pointer - session.offset)
    }

    /// Consume the session for a pointer-up/cancel from the owning pointer
    pub fn finish(&mut self, pointer_id: PointerId) -> Option<DragSession> {
        match &self.active {
            Some(s) if s.pointer_id == pointer_id => self.active.take(),
            _ => None,
        }
    }
}

/// Verdict of the evaluate phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDecision {
    /// Place at the slot
    Accept { slot: i32 },
    /// Slot is inside the catchment zone but the side is full
    Reject { slot: i32 },
    /// Outside the zone: put a placed mass back where it was
    Revert,
    /// Outside the zone (or orphaned): throw the element away
    Discard,
}

/// Terminal state of a drag, after commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Snapped {
        id: MassId,
        position: i32,
        created: bool,
    },
    /// Capacity rule refused the drop; placed masses were reverted
    Rejected {
        id: Option<MassId>,
        attempted_slot: i32,
        restored_position: Option<i32>,
    },
    Reverted {
        id: MassId,
        position: i32,
    },
    Discarded,
}

impl DropOutcome {
    /// Notice to show the student, if any
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            DropOutcome::Rejected { .. } => Some(BASIC_MODE_NOTICE),
            _ => None,
        }
    }

    /// Element should stay on the beam (vs. being removed)
    pub fn keeps_element(&self) -> bool {
        match self {
            DropOutcome::Snapped { .. } | DropOutcome::Reverted { .. } => true,
            DropOutcome::Rejected { id, .. } => id.is_some(),
            DropOutcome::Discarded => false,
        }
    }
}

/// Evaluate a release without touching the registry.
///
/// `center` is the dragged element's centre in client space and `beam` the
/// beam surface's bounding box.
pub fn evaluate_drop(
    session: &DragSession,
    center: Vec2,
    beam: &Rect,
    registry: &RegistryStore,
    mode: LabMode,
) -> DropDecision {
    let placed = session.placed_id();
    if let Some(id) = placed {
        if !registry.contains(id) {
            // Registry was cleared under the gesture
            return DropDecision::Discard;
        }
    }

    if !catchment_zone(beam).contains(center) {
        return if placed.is_some() {
            DropDecision::Revert
        } else {
            DropDecision::Discard
        };
    }

    let slot = nearest_slot(center.x, beam);
    let side = Side::of(slot);

    if let Some(capacity) = mode.capacity_per_side() {
        if side != Side::Center && registry.count_on_side(side, placed) >= capacity {
            return DropDecision::Reject { slot };
        }
    }

    DropDecision::Accept { slot }
}

/// Apply a decision. The only registry writes happen here.
pub fn commit(
    session: &DragSession,
    decision: DropDecision,
    registry: &mut RegistryStore,
) -> DropOutcome {
    match (decision, session.target) {
        (DropDecision::Accept { slot }, DragTarget::NewTile { value }) => {
            let id = registry.add_at(value, slot).id;
            log::info!("mass {id} ({value} kg) placed at {slot}");
            DropOutcome::Snapped {
                id,
                position: slot,
                created: true,
            }
        }
        (DropDecision::Accept { slot }, DragTarget::Placed { id }) => {
            if registry.set_position(id, slot) {
                log::info!("mass {id} moved to {slot}");
                DropOutcome::Snapped {
                    id,
                    position: slot,
                    created: false,
                }
            } else {
                DropOutcome::Discarded
            }
        }
        (DropDecision::Reject { slot }, DragTarget::NewTile { .. }) => {
            log::info!("new tile rejected at {slot}: side full");
            DropOutcome::Rejected {
                id: None,
                attempted_slot: slot,
                restored_position: None,
            }
        }
        (DropDecision::Reject { slot }, DragTarget::Placed { id }) => {
            restore(session, id, registry);
            log::info!("mass {id} rejected at {slot}: side full");
            DropOutcome::Rejected {
                id: Some(id),
                attempted_slot: slot,
                restored_position: Some(session.origin.position),
            }
        }
        (DropDecision::Revert, DragTarget::Placed { id }) => {
            restore(session, id, registry);
            log::debug!("mass {id} reverted to {}", session.origin.position);
            DropOutcome::Reverted {
                id,
                position: session.origin.position,
            }
        }
        (DropDecision::Revert, DragTarget::NewTile { .. }) | (DropDecision::Discard, _) => {
            log::debug!("drag discarded");
            DropOutcome::Discarded
        }
    }
}

/// Put a placed mass back at its pre-drag slot and order
fn restore(session: &DragSession, id: MassId, registry: &mut RegistryStore) {
    registry.set_position(id, session.origin.position);
    if let Some(index) = session.origin.index {
        registry.move_to_index(id, index);
    }
}

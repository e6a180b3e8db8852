//! Mass registry - the single source of truth for placed masses
//!
//! Mutated only by the drag engine's commit step and by clear operations.
//! Performs no placement validation: callers check capacity rules first.

use serde::{Deserialize, Serialize};

use super::geometry::Side;
use crate::consts::MAX_SLOT;

/// Mass identifier (unique, monotonic within a session)
pub type MassId = u32;

/// A mass hanging on the beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    pub id: MassId,
    /// Logical slot in [-12, 12]
    pub position: i32,
    /// Mass in kg
    pub value: f64,
}

impl Mass {
    #[inline]
    pub fn side(&self) -> Side {
        Side::of(self.position)
    }
}

/// Ordered store of placed masses.
///
/// Order matters only for stable visual ordering, never for physics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStore {
    masses: Vec<Mass>,
    next_id: MassId,
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore {
    pub fn new() -> Self {
        Self {
            masses: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> MassId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register a new mass at the pivot
    pub fn add(&mut self, value: f64) -> &Mass {
        self.add_at(value, 0)
    }

    /// Register a new mass at a slot (clamped to the scale)
    pub fn add_at(&mut self, value: f64, position: i32) -> &Mass {
        let id = self.allocate_id();
        self.masses.push(Mass {
            id,
            position: position.clamp(-MAX_SLOT, MAX_SLOT),
            value,
        });
        &self.masses[self.masses.len() - 1]
    }

    pub fn get(&self, id: MassId) -> Option<&Mass> {
        self.masses.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: MassId) -> bool {
        self.get(id).is_some()
    }

    /// Move a mass; returns false if the id is unknown
    pub fn set_position(&mut self, id: MassId, position: i32) -> bool {
        match self.masses.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.position = position.clamp(-MAX_SLOT, MAX_SLOT);
                true
            }
            None => false,
        }
    }

    /// Index of a mass in insertion order
    pub fn index_of(&self, id: MassId) -> Option<usize> {
        self.masses.iter().position(|m| m.id == id)
    }

    /// Move an existing mass back to an earlier index (order restore on revert)
    pub fn move_to_index(&mut self, id: MassId, index: usize) -> bool {
        let Some(current) = self.index_of(id) else {
            return false;
        };
        let mass = self.masses.remove(current);
        let index = index.min(self.masses.len());
        self.masses.insert(index, mass);
        true
    }

    pub fn remove(&mut self, id: MassId) -> Option<Mass> {
        let index = self.index_of(id)?;
        Some(self.masses.remove(index))
    }

    pub fn all(&self) -> &[Mass] {
        &self.masses
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Remove every mass and restart id assignment at 1
    pub fn clear(&mut self) {
        self.masses.clear();
        self.next_id = 1;
    }

    /// Id the next registered mass will receive
    pub fn peek_next_id(&self) -> MassId {
        self.next_id
    }

    /// Count masses on a side, optionally ignoring one mass.
    ///
    /// The centre is never counted.
    pub fn count_on_side(&self, side: Side, exclude: Option<MassId>) -> usize {
        if side == Side::Center {
            return 0;
        }
        self.masses
            .iter()
            .filter(|m| Some(m.id) != exclude && m.side() == side)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut reg = RegistryStore::new();
        let a = reg.add(1.0).id;
        let b = reg.add_at(2.0, -3).id;
        assert_eq!((a, b), (1, 2));

        reg.remove(b);
        let c = reg.add(3.0).id;
        assert_eq!(c, 3, "ids are not reused after removal");
    }

    #[test]
    fn test_clear_resets_ids() {
        let mut reg = RegistryStore::new();
        reg.add(1.0);
        reg.add(1.0);
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.add(5.0).id, 1);
    }

    #[test]
    fn test_count_on_side_excludes() {
        let mut reg = RegistryStore::new();
        let left = reg.add_at(1.0, -4).id;
        reg.add_at(1.0, 0);
        reg.add_at(2.0, 6);
        assert_eq!(reg.count_on_side(Side::Left, None), 1);
        assert_eq!(reg.count_on_side(Side::Left, Some(left)), 0);
        assert_eq!(reg.count_on_side(Side::Right, None), 1);
        assert_eq!(reg.count_on_side(Side::Center, None), 0);
    }

    #[test]
    fn test_positions_clamped() {
        let mut reg = RegistryStore::new();
        let id = reg.add_at(1.0, 40).id;
        assert_eq!(reg.get(id).unwrap().position, 12);
        reg.set_position(id, -99);
        assert_eq!(reg.get(id).unwrap().position, -12);
        assert!(!reg.set_position(999, 1));
    }

    #[test]
    fn test_move_to_index() {
        let mut reg = RegistryStore::new();
        let a = reg.add(1.0).id;
        let b = reg.add(2.0).id;
        let c = reg.add(3.0).id;
        assert!(reg.move_to_index(c, 0));
        let order: Vec<_> = reg.all().iter().map(|m| m.id).collect();
        assert_eq!(order, vec![c, a, b]);
    }
}

//! Entity handles and allocation.
//!
//! An [`Entity`] is an opaque handle: a slot index plus a version. When an
//! entity is destroyed its slot is recycled with a bumped version, so stale
//! handles never alias the new occupant.

use serde::{Deserialize, Serialize};

/// An opaque entity handle.
///
/// Entities carry no data of their own. Components are attached to entities
/// to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    version: u32,
}

impl Entity {
    /// The null entity. Never handed out by an [`EntityAllocator`].
    pub const NULL: Entity = Entity {
        index: 0,
        version: 0,
    };

    /// Create an entity handle from raw parts.
    #[must_use]
    pub const fn new(index: u32, version: u32) -> Self {
        Self { index, version }
    }

    /// The slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// The slot version. Live entities always have a version of at least 1.
    #[must_use]
    pub const fn version(self) -> u32 {
        self.version
    }

    /// Returns `true` for [`Entity::NULL`].
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.version == 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}:{})", self.index, self.version)
    }
}

/// Allocates entity handles and recycles freed slots.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Current version per slot. A slot is live when its version matches the
    /// handle and the slot is not on the free list.
    versions: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
}

impl EntityAllocator {
    /// Creates a new, empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            versions: Vec::new(),
            alive: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Allocates a fresh entity handle, reusing a freed slot if one exists.
    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            return Entity::new(index, self.versions[slot]);
        }

        let index = u32::try_from(self.versions.len()).unwrap_or(u32::MAX);
        self.versions.push(1);
        self.alive.push(true);
        Entity::new(index, 1)
    }

    /// Frees an entity's slot. Returns `false` if the handle was not live.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = entity.index() as usize;
        self.alive[slot] = false;
        // Version 0 is reserved for the null entity.
        self.versions[slot] = self.versions[slot].checked_add(1).unwrap_or(1);
        self.free.push(entity.index());
        true
    }

    /// Returns `true` if the handle refers to a live entity.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index() as usize;
        !entity.is_null()
            && self.alive.get(slot).copied().unwrap_or(false)
            && self.versions[slot] == entity.version()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.versions.len() - self.free.len()
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

//! Core [`Component`] traits and the descriptors used to name component types
//! inside queries.
//!
//! Every piece of data stored in a world must implement [`Component`]. Values
//! that partition entities into filterable groups additionally implement
//! [`SharedComponent`], which adds value equality.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **name** using the
//! FNV-1a 64-bit hash algorithm. By default the name is the fully qualified
//! Rust type path, so two distinct types never collide unless a component
//! overrides [`Component::type_name`] on purpose.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a component type, derived from its name using the
/// FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] for a component name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

/// The core component trait.
///
/// Components are plain data records with no identity of their own. Queries
/// hand out copies, hence the `Clone` bound.
///
/// # Examples
///
/// ```rust
/// use gadgets_component::Component;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Health(u32);
///
/// impl Component for Health {}
///
/// /// A tag: no fields, only marks presence.
/// #[derive(Debug, Clone, Copy)]
/// struct Enemy;
///
/// impl Component for Enemy {}
/// ```
pub trait Component: Clone + Send + Sync + 'static {
    /// A human-readable name for this component type.
    ///
    /// Defaults to the fully qualified Rust type path. Overrides must stay
    /// unique: two types with the same name share a [`ComponentTypeId`], and
    /// reading one through the other fails with a type id collision error.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}

/// A component whose value is used as an equality filter.
///
/// Many entities typically carry the same shared value (a team, a level
/// section, a render layer). Queries narrow their match set to entities whose
/// shared value equals a supplied one.
///
/// ```rust
/// use gadgets_component::{Component, SharedComponent};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// struct Team(u8);
///
/// impl Component for Team {}
/// impl SharedComponent for Team {}
/// ```
pub trait SharedComponent: Component + PartialEq {}

/// Whether a component type is plain data or a shared filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Per-entity data, including tags.
    Data,
    /// A value compared by equality when filtering.
    Shared,
}

/// A component type as it appears in a query: identity, name, and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component.
    pub name: &'static str,
    /// Data or shared.
    pub kind: ComponentKind,
}

impl ComponentType {
    /// Describe a data (or tag) component type.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: T::component_type_id(),
            name: T::type_name(),
            kind: ComponentKind::Data,
        }
    }

    /// Describe a shared component type.
    #[must_use]
    pub fn shared<T: SharedComponent>() -> Self {
        Self {
            type_id: T::component_type_id(),
            name: T::type_name(),
            kind: ComponentKind::Shared,
        }
    }

    /// Returns `true` for shared component types.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.kind == ComponentKind::Shared
    }

    /// The last path segment of the name, for log and error output.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Strips the module path from a type name, keeping generic arguments intact.
///
/// `game::stats::Health` becomes `Health`.
#[must_use]
pub fn short_type_name(name: &'static str) -> &'static str {
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

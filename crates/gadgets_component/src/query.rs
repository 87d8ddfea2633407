//! Query descriptors: the set of component types an entity must carry.
//!
//! A [`QueryDescriptor`] is an "all of" predicate over component presence.
//! Shared-component value equality is applied later, by the query scope that
//! a world builds from the descriptor.

use std::fmt;

use crate::archetype::ArchetypeTable;
use crate::component::{ComponentType, ComponentTypeId};

/// The component types a query requires.
///
/// Types are kept in insertion order and deduplicated by
/// [`ComponentTypeId`], so naming the same type twice (for instance as both
/// a tag and a filter) costs nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    all: Vec<ComponentType>,
}

impl QueryDescriptor {
    /// Create a new empty query descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self { all: Vec::new() }
    }

    /// Build a descriptor from a list of component types.
    #[must_use]
    pub fn from_types(types: &[ComponentType]) -> Self {
        types.iter().fold(Self::new(), |desc, ty| desc.with(*ty))
    }

    /// Require a component type.
    ///
    /// If the type is already present as data and is now named as shared,
    /// the shared kind wins.
    #[must_use]
    pub fn with(mut self, ty: ComponentType) -> Self {
        match self.all.iter_mut().find(|t| t.type_id == ty.type_id) {
            Some(existing) => {
                if ty.is_shared() {
                    existing.kind = ty.kind;
                }
            }
            None => self.all.push(ty),
        }
        self
    }

    /// All required component types, in insertion order.
    #[must_use]
    pub fn types(&self) -> &[ComponentType] {
        &self.all
    }

    /// Required component type IDs.
    pub fn required_types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.all.iter().map(|ty| ty.type_id)
    }

    /// The required types that were declared shared.
    pub fn shared_types(&self) -> impl Iterator<Item = &ComponentType> + '_ {
        self.all.iter().filter(|ty| ty.is_shared())
    }

    /// Returns `true` if the descriptor requires `type_id`.
    #[must_use]
    pub fn contains(&self, type_id: ComponentTypeId) -> bool {
        self.all.iter().any(|ty| ty.type_id == type_id)
    }

    /// Returns `true` if every required type is stored by `table`.
    #[must_use]
    pub fn matches(&self, table: &ArchetypeTable) -> bool {
        self.required_types().all(|ty| table.has_component(ty))
    }

    /// Returns `true` if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all.is_empty() {
            return f.write_str("<any>");
        }
        for (i, ty) in self.all.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::archetype::Column;
    use crate::component::{Component, SharedComponent};

    #[derive(Debug, Clone)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Debug, Clone, Copy)]
    struct Enemy;
    impl Component for Enemy {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Team(u8);
    impl Component for Team {}
    impl SharedComponent for Team {}

    #[test]
    fn test_with_deduplicates() {
        let q = QueryDescriptor::new()
            .with(ComponentType::of::<Health>())
            .with(ComponentType::of::<Health>())
            .with(ComponentType::of::<Enemy>());
        assert_eq!(q.types().len(), 2);
        assert!(q.contains(Health::component_type_id()));
        assert!(q.contains(Enemy::component_type_id()));
    }

    #[test]
    fn test_shared_kind_wins_on_duplicate() {
        let q = QueryDescriptor::from_types(&[
            ComponentType::of::<Team>(),
            ComponentType::shared::<Team>(),
        ]);
        assert_eq!(q.types().len(), 1);
        assert_eq!(q.shared_types().count(), 1);
    }

    #[test]
    fn test_matches_requires_all_types() {
        let mut columns = BTreeMap::new();
        columns.insert(Health::component_type_id(), Column::<Health>::boxed());
        let health_only = ArchetypeTable::new(columns);

        let q_health = QueryDescriptor::from_types(&[ComponentType::of::<Health>()]);
        let q_health_enemy = q_health.clone().with(ComponentType::of::<Enemy>());

        assert!(q_health.matches(&health_only));
        assert!(!q_health_enemy.matches(&health_only));
        assert!(QueryDescriptor::new().matches(&health_only));
    }

    #[test]
    fn test_display_lists_short_names() {
        let q = QueryDescriptor::from_types(&[
            ComponentType::of::<Health>(),
            ComponentType::of::<Enemy>(),
            ComponentType::shared::<Team>(),
        ]);
        assert_eq!(q.to_string(), "Health + Enemy + Team");
        assert_eq!(QueryDescriptor::new().to_string(), "<any>");
    }
}

//! Archetype definitions and storage.
//!
//! An archetype is a unique combination of component types. Entities sharing
//! the same set of components live in the same [`ArchetypeTable`], one
//! [`Column`] per component type, so a query only has to test each table's
//! type set once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use downcast_rs::{Downcast, impl_downcast};
use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;

/// A unique identifier for an archetype, computed from its sorted set of
/// [`ComponentTypeId`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchetypeId(pub u64);

impl ArchetypeId {
    /// Compute the archetype ID from a set of component type IDs.
    ///
    /// The same set of types always produces the same archetype ID regardless
    /// of insertion order.
    #[must_use]
    pub fn from_component_types(types: &BTreeSet<ComponentTypeId>) -> Self {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for ty in types {
            ty.hash(&mut hasher);
        }
        Self(hasher.finish())
    }
}

/// Type-erased access to a [`Column`].
///
/// Row operations that do not need the concrete type (removal, moving a row
/// between tables) go through this trait; typed reads downcast back to
/// [`Column<T>`].
pub trait ColumnStorage: Downcast + Send + Sync {
    /// Number of values stored.
    fn len(&self) -> usize;

    /// Returns `true` if the column stores no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the value at `row`, moving the last value into its place.
    fn swap_remove(&mut self, row: usize);

    /// Swap-remove the value at `row` and push it onto `dst`.
    ///
    /// Returns `false` (and leaves both columns untouched) if `dst` stores a
    /// different type or `row` is out of range.
    fn move_row(&mut self, row: usize, dst: &mut dyn ColumnStorage) -> bool;

    /// A new, empty column of the same type.
    fn empty_like(&self) -> Box<dyn ColumnStorage>;
}

impl_downcast!(ColumnStorage);

/// Contiguous storage for the values of one component type.
#[derive(Debug, Clone)]
pub struct Column<T> {
    values: Vec<T>,
}

impl<T: Component> Column<T> {
    /// Create a new empty column.
    #[must_use]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create an empty, boxed column ready to be placed in a table.
    #[must_use]
    pub fn boxed() -> Box<dyn ColumnStorage> {
        Box::new(Self::new())
    }

    /// Append a value.
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Returns the value at `row`.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row)
    }

    /// Returns the value at `row` mutably.
    #[must_use]
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.values.get_mut(row)
    }

    /// All values in row order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T: Component> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ColumnStorage for Column<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn swap_remove(&mut self, row: usize) {
        if row < self.values.len() {
            self.values.swap_remove(row);
        }
    }

    fn move_row(&mut self, row: usize, dst: &mut dyn ColumnStorage) -> bool {
        if row >= self.values.len() {
            return false;
        }
        let Some(dst) = dst.downcast_mut::<Column<T>>() else {
            return false;
        };
        dst.values.push(self.values.swap_remove(row));
        true
    }

    fn empty_like(&self) -> Box<dyn ColumnStorage> {
        Self::boxed()
    }
}

/// A table of entities sharing the same archetype (set of component types).
///
/// Data is stored in struct-of-arrays layout: one column per component type,
/// with entity handles in a parallel vector. `entities[i]` corresponds to row
/// `i` in every column.
pub struct ArchetypeTable {
    /// The archetype identifier.
    pub id: ArchetypeId,
    /// Sorted set of component type IDs that define this archetype.
    pub component_types: BTreeSet<ComponentTypeId>,
    /// Entity handles in row order.
    pub entities: Vec<Entity>,
    /// One column per component type, in the same order as `component_types`.
    columns: Vec<Box<dyn ColumnStorage>>,
}

impl ArchetypeTable {
    /// Create a new, empty archetype table from one empty column per type.
    #[must_use]
    pub fn new(columns: BTreeMap<ComponentTypeId, Box<dyn ColumnStorage>>) -> Self {
        let component_types: BTreeSet<ComponentTypeId> = columns.keys().copied().collect();
        let id = ArchetypeId::from_component_types(&component_types);
        Self {
            id,
            component_types,
            entities: Vec::new(),
            columns: columns.into_values().collect(),
        }
    }

    /// Create the table for entities that carry no components at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    /// Returns the number of entities in this archetype table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if this table has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if this archetype contains the given component type.
    #[must_use]
    pub fn has_component(&self, type_id: ComponentTypeId) -> bool {
        self.component_types.contains(&type_id)
    }

    /// Returns the column index for the given component type, if present.
    #[must_use]
    pub fn column_index(&self, type_id: ComponentTypeId) -> Option<usize> {
        self.component_types.iter().position(|&tid| tid == type_id)
    }

    /// Find the row index for a given entity.
    #[must_use]
    pub fn entity_row(&self, entity: Entity) -> Option<usize> {
        self.entities.iter().position(|&e| e == entity)
    }

    /// The typed column for `T`, if this archetype stores it.
    #[must_use]
    pub fn column<T: Component>(&self) -> Option<&Column<T>> {
        let index = self.column_index(T::component_type_id())?;
        self.columns[index].downcast_ref::<Column<T>>()
    }

    /// The typed column for `T`, mutably.
    #[must_use]
    pub fn column_mut<T: Component>(&mut self) -> Option<&mut Column<T>> {
        let index = self.column_index(T::component_type_id())?;
        self.columns[index].downcast_mut::<Column<T>>()
    }

    /// Empty columns matching this table's layout, keyed by type.
    ///
    /// Used to derive the layout of a neighbouring archetype when a component
    /// is added or removed.
    #[must_use]
    pub fn empty_columns(&self) -> BTreeMap<ComponentTypeId, Box<dyn ColumnStorage>> {
        self.component_types
            .iter()
            .zip(self.columns.iter())
            .map(|(&ty, column)| (ty, column.empty_like()))
            .collect()
    }

    /// Remove a row, dropping its component values.
    ///
    /// Returns the entity that was stored there.
    pub fn swap_remove_row(&mut self, row: usize) -> Option<Entity> {
        if row >= self.entities.len() {
            return None;
        }
        for column in &mut self.columns {
            column.swap_remove(row);
        }
        Some(self.entities.swap_remove(row))
    }

    /// Move a row into `dst`.
    ///
    /// Values whose type `dst` also stores are moved; the rest are dropped.
    /// The caller pushes values for any type `dst` has but `self` lacks, so
    /// the destination's columns line up again.
    pub fn move_row_to(&mut self, row: usize, dst: &mut ArchetypeTable) -> Option<Entity> {
        if row >= self.entities.len() {
            return None;
        }
        for (ty, column) in self.component_types.iter().zip(self.columns.iter_mut()) {
            match dst.column_index(*ty) {
                Some(index) => {
                    column.move_row(row, dst.columns[index].as_mut());
                }
                None => column.swap_remove(row),
            }
        }
        let entity = self.entities.swap_remove(row);
        dst.entities.push(entity);
        Some(entity)
    }
}

impl fmt::Debug for ArchetypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchetypeTable")
            .field("id", &self.id)
            .field("component_types", &self.component_types)
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Debug, Clone, PartialEq)]
    struct Armor(u32);
    impl Component for Armor {}

    fn health_armor_table() -> ArchetypeTable {
        let mut columns = BTreeMap::new();
        columns.insert(Health::component_type_id(), Column::<Health>::boxed());
        columns.insert(Armor::component_type_id(), Column::<Armor>::boxed());
        ArchetypeTable::new(columns)
    }

    fn push_row(table: &mut ArchetypeTable, entity: Entity, health: u32, armor: u32) {
        table.entities.push(entity);
        table.column_mut::<Health>().unwrap().push(Health(health));
        table.column_mut::<Armor>().unwrap().push(Armor(armor));
    }

    #[test]
    fn test_archetype_id_order_independent() {
        let mut set1 = BTreeSet::new();
        set1.insert(ComponentTypeId(1));
        set1.insert(ComponentTypeId(2));

        let mut set2 = BTreeSet::new();
        set2.insert(ComponentTypeId(2));
        set2.insert(ComponentTypeId(1));

        assert_eq!(
            ArchetypeId::from_component_types(&set1),
            ArchetypeId::from_component_types(&set2)
        );
    }

    #[test]
    fn test_column_push_and_get() {
        let mut col = Column::<Health>::new();
        col.push(Health(30));
        assert_eq!(col.len(), 1);
        assert_eq!(col.get(0), Some(&Health(30)));
        assert_eq!(col.get(1), None);
    }

    #[test]
    fn test_move_row_rejects_mismatched_column() {
        let mut src = Column::<Health>::new();
        src.push(Health(1));
        let mut dst = Column::<Armor>::new();
        assert!(!src.move_row(0, &mut dst));
        assert_eq!(src.len(), 1);
        assert!(dst.is_empty());
    }

    #[test]
    fn test_archetype_table_typed_columns() {
        let mut table = health_armor_table();
        assert!(table.is_empty());
        push_row(&mut table, Entity::new(0, 1), 30, 5);

        assert_eq!(table.len(), 1);
        assert!(table.has_component(Health::component_type_id()));
        assert_eq!(table.column::<Health>().unwrap().as_slice(), &[Health(30)]);
        assert_eq!(table.entity_row(Entity::new(0, 1)), Some(0));
    }

    #[test]
    fn test_swap_remove_row_keeps_columns_aligned() {
        let mut table = health_armor_table();
        push_row(&mut table, Entity::new(0, 1), 10, 1);
        push_row(&mut table, Entity::new(1, 1), 20, 2);
        push_row(&mut table, Entity::new(2, 1), 30, 3);

        assert_eq!(table.swap_remove_row(0), Some(Entity::new(0, 1)));
        assert_eq!(table.entities, vec![Entity::new(2, 1), Entity::new(1, 1)]);
        assert_eq!(
            table.column::<Health>().unwrap().as_slice(),
            &[Health(30), Health(20)]
        );
        assert_eq!(
            table.column::<Armor>().unwrap().as_slice(),
            &[Armor(3), Armor(2)]
        );
    }

    #[test]
    fn test_move_row_to_drops_missing_types() {
        let mut src = health_armor_table();
        push_row(&mut src, Entity::new(4, 1), 40, 4);

        let mut health_only = BTreeMap::new();
        health_only.insert(Health::component_type_id(), Column::<Health>::boxed());
        let mut dst = ArchetypeTable::new(health_only);

        assert_eq!(src.move_row_to(0, &mut dst), Some(Entity::new(4, 1)));
        assert!(src.is_empty());
        assert!(src.column::<Armor>().unwrap().is_empty());
        assert_eq!(dst.entities, vec![Entity::new(4, 1)]);
        assert_eq!(dst.column::<Health>().unwrap().as_slice(), &[Health(40)]);
    }

    #[test]
    fn test_empty_columns_mirror_layout() {
        let table = health_armor_table();
        let columns = table.empty_columns();
        let copy = ArchetypeTable::new(columns);
        assert_eq!(copy.id, table.id);
        assert!(copy.column::<Armor>().is_some());
    }
}

//! World state storage.
//!
//! The [`World`] owns entity allocation, archetype tables, and the mapping
//! from entity to table. Adding or removing a component moves the entity's
//! row into the table for its new component set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use gadgets_component::component::short_type_name;
use gadgets_component::{
    ArchetypeId, ArchetypeTable, Column, ColumnStorage, Component, ComponentType,
    ComponentTypeId, Entity, EntityAllocator, QueryDescriptor, SharedComponent,
};
use tracing::{debug, warn};

use crate::entity_query::EntityQuery;
use crate::error::WorldError;
use crate::native::{ResourceStats, ResourceTracker};

/// Index of the table holding entities without components.
const EMPTY_ARCHETYPE: usize = 0;

/// The world: entities, their components, and the resources queries borrow.
#[derive(Debug)]
pub struct World {
    /// Entity handle allocator.
    allocator: EntityAllocator,
    /// All archetype tables, in creation order. Queries visit them in this
    /// order, which makes results stable between structural changes.
    archetypes: Vec<ArchetypeTable>,
    /// Maps each live entity to the index of its table.
    entity_archetype: HashMap<Entity, usize>,
    /// Maps component type sets to table indices, for fast lookup.
    type_set_to_archetype: HashMap<BTreeSet<ComponentTypeId>, usize>,
    /// Live query scopes and native arrays.
    resources: ResourceTracker,
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        let empty = ArchetypeTable::empty();
        let mut type_set_to_archetype = HashMap::new();
        type_set_to_archetype.insert(empty.component_types.clone(), EMPTY_ARCHETYPE);
        Self {
            allocator: EntityAllocator::new(),
            archetypes: vec![empty],
            entity_archetype: HashMap::new(),
            type_set_to_archetype,
            resources: ResourceTracker::new(),
        }
    }

    // -- Entity lifecycle --

    /// Create an entity with no components.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.archetypes[EMPTY_ARCHETYPE].entities.push(entity);
        self.entity_archetype.insert(entity, EMPTY_ARCHETYPE);
        entity
    }

    /// Start building an entity component by component.
    pub fn build_entity(&mut self) -> EntityBuilder<'_> {
        let entity = self.spawn();
        EntityBuilder {
            world: self,
            entity,
            error: None,
        }
    }

    /// Destroy an entity and drop its components.
    ///
    /// Returns `true` if the entity existed and was removed.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(index) = self.entity_archetype.remove(&entity) else {
            return false;
        };
        let table = &mut self.archetypes[index];
        if let Some(row) = table.entity_row(entity) {
            table.swap_remove_row(row);
        }
        self.allocator.free(entity)
    }

    /// Returns `true` if the handle refers to a live entity.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    // -- Components --

    /// Attach a component. Fails if the entity already has one of this type.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        let src = self.location(entity)?;
        if self.archetypes[src].has_component(T::component_type_id()) {
            return Err(WorldError::ComponentAlreadyPresent {
                component: short_type_name(T::type_name()),
                entity,
            });
        }

        let mut columns = self.archetypes[src].empty_columns();
        columns.insert(T::component_type_id(), Column::<T>::boxed());
        let dst = self.get_or_create_archetype(columns);
        self.move_entity(entity, src, dst);

        if let Some(column) = self.archetypes[dst].column_mut::<T>() {
            column.push(value);
        }
        Ok(())
    }

    /// Attach a shared component whose value queries can filter on.
    pub fn add_shared_component<T: SharedComponent>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> Result<(), WorldError> {
        self.add_component(entity, value)
    }

    /// Overwrite a component, attaching it first if the entity lacks it.
    pub fn set_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        match self.get_component_mut::<T>(entity) {
            Ok(slot) => {
                *slot = value;
                Ok(())
            }
            Err(WorldError::ComponentNotFound { .. }) => self.add_component(entity, value),
            Err(err) => Err(err),
        }
    }

    /// Overwrite a shared component, attaching it first if the entity lacks it.
    pub fn set_shared_component<T: SharedComponent>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> Result<(), WorldError> {
        self.set_component(entity, value)
    }

    /// Detach a component and return its value.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T, WorldError> {
        let value = self.get_component::<T>(entity)?.clone();
        let src = self.location(entity)?;

        let mut columns = self.archetypes[src].empty_columns();
        columns.remove(&T::component_type_id());
        let dst = self.get_or_create_archetype(columns);
        self.move_entity(entity, src, dst);
        Ok(value)
    }

    /// Borrow a component of an entity.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T, WorldError> {
        let index = self.location(entity)?;
        let table = &self.archetypes[index];
        let missing = Self::missing::<T>(table, entity);
        table
            .entity_row(entity)
            .and_then(|row| table.column::<T>()?.get(row))
            .ok_or(missing)
    }

    /// Mutably borrow a component of an entity.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, WorldError> {
        let index = self.location(entity)?;
        let missing = Self::missing::<T>(&self.archetypes[index], entity);
        let table = &mut self.archetypes[index];
        let Some(row) = table.entity_row(entity) else {
            return Err(missing);
        };
        table
            .column_mut::<T>()
            .and_then(|column| column.get_mut(row))
            .ok_or(missing)
    }

    /// Returns `true` if the entity is alive and carries a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.location(entity)
            .is_ok_and(|index| self.archetypes[index].has_component(T::component_type_id()))
    }

    // -- Queries --

    /// Open a query scope over entities carrying all of `types`.
    ///
    /// The scope borrows the world until it is dropped.
    pub fn create_entity_query(&self, types: &[ComponentType]) -> EntityQuery<'_> {
        self.create_entity_query_from(QueryDescriptor::from_types(types))
    }

    /// Open a query scope from a prepared descriptor.
    pub fn create_entity_query_from(&self, descriptor: QueryDescriptor) -> EntityQuery<'_> {
        debug!(query = %descriptor, "entity query created");
        EntityQuery::new(self, descriptor)
    }

    /// Find all archetypes whose component set satisfies `descriptor`.
    #[must_use]
    pub fn matching_archetypes(&self, descriptor: &QueryDescriptor) -> Vec<ArchetypeId> {
        self.archetypes
            .iter()
            .filter(|table| descriptor.matches(table))
            .map(|table| table.id)
            .collect()
    }

    /// All archetype tables, in creation order.
    pub fn archetypes(&self) -> impl Iterator<Item = &ArchetypeTable> {
        self.archetypes.iter()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_archetype.len()
    }

    /// Returns the number of archetypes, including the empty one.
    #[must_use]
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// A snapshot of live query scopes and native arrays.
    #[must_use]
    pub fn resources(&self) -> ResourceStats {
        self.resources.stats()
    }

    /// The tracker arrays created against this world report to.
    #[must_use]
    pub fn resource_tracker(&self) -> &ResourceTracker {
        &self.resources
    }

    // -- Internals --

    /// The error for a `T` that cannot be read from `table`.
    fn missing<T: Component>(table: &ArchetypeTable, entity: Entity) -> WorldError {
        let component = short_type_name(T::type_name());
        if table.has_component(T::component_type_id()) {
            WorldError::TypeIdCollision { component, entity }
        } else {
            WorldError::ComponentNotFound { component, entity }
        }
    }

    fn location(&self, entity: Entity) -> Result<usize, WorldError> {
        self.entity_archetype
            .get(&entity)
            .copied()
            .ok_or(WorldError::EntityNotFound(entity))
    }

    /// Get or create the table for the layout described by `columns`.
    fn get_or_create_archetype(
        &mut self,
        columns: BTreeMap<ComponentTypeId, Box<dyn ColumnStorage>>,
    ) -> usize {
        let types: BTreeSet<ComponentTypeId> = columns.keys().copied().collect();
        if let Some(&index) = self.type_set_to_archetype.get(&types) {
            return index;
        }

        let table = ArchetypeTable::new(columns);
        let index = self.archetypes.len();
        debug!(archetype = ?table.id, components = types.len(), "archetype created");
        self.archetypes.push(table);
        self.type_set_to_archetype.insert(types, index);
        index
    }

    fn move_entity(&mut self, entity: Entity, src: usize, dst: usize) {
        if src == dst {
            return;
        }
        let (src_table, dst_table) = if src < dst {
            let (left, right) = self.archetypes.split_at_mut(dst);
            (&mut left[src], &mut right[0])
        } else {
            let (left, right) = self.archetypes.split_at_mut(src);
            (&mut right[0], &mut left[dst])
        };
        if let Some(row) = src_table.entity_row(entity) {
            src_table.move_row_to(row, dst_table);
            self.entity_archetype.insert(entity, dst);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an entity one component at a time.
///
/// ```rust
/// use gadgets_component::{Component, SharedComponent};
/// use gadgets_world::World;
///
/// #[derive(Clone)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// #[derive(Clone, PartialEq)]
/// struct Team(u8);
/// impl Component for Team {}
/// impl SharedComponent for Team {}
///
/// let mut world = World::new();
/// let e = world.build_entity().with(Health(30)).with_shared(Team(1)).build();
/// assert!(world.has_component::<Team>(e));
/// ```
#[must_use]
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    entity: Entity,
    error: Option<WorldError>,
}

impl EntityBuilder<'_> {
    /// Attach (or overwrite) a data or tag component.
    ///
    /// After the first failure the remaining components are skipped; the
    /// failure is reported by [`EntityBuilder::try_build`].
    pub fn with<T: Component>(mut self, value: T) -> Self {
        if self.error.is_none() {
            self.error = self.world.set_component(self.entity, value).err();
        }
        self
    }

    /// Attach (or overwrite) a shared component.
    pub fn with_shared<T: SharedComponent>(self, value: T) -> Self {
        self.with(value)
    }

    /// Finish building and return the entity.
    ///
    /// A failed attachment is logged; use [`EntityBuilder::try_build`] to
    /// handle it instead.
    pub fn build(self) -> Entity {
        if let Some(err) = &self.error {
            warn!(entity = %self.entity, %err, "entity built with a missing component");
        }
        self.entity
    }

    /// Finish building, failing if any component could not be attached.
    ///
    /// The entity stays alive either way, carrying the components attached
    /// before the failure.
    pub fn try_build(self) -> Result<Entity, WorldError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.entity),
        }
    }
}

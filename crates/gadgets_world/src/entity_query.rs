//! Scoped entity queries.
//!
//! An [`EntityQuery`] pairs a [`QueryDescriptor`] with optional shared
//! component filters and borrows the [`World`] it was created from. It is
//! counted as a live resource from creation until it is dropped.
//!
//! Matching entities are visited table by table in archetype creation order,
//! then row by row, so the order of results is stable while the world is not
//! structurally modified.

use std::fmt;

use gadgets_component::component::short_type_name;
use gadgets_component::{
    ArchetypeTable, Component, ComponentType, Entity, QueryDescriptor, SharedComponent,
};
use tracing::debug;

use crate::error::QueryError;
use crate::native::{Allocator, NativeArray};
use crate::world::World;

type RowPredicate = Box<dyn Fn(&ArchetypeTable, usize) -> bool + Send + Sync>;

/// An equality filter on one shared component type.
struct SharedFilter {
    ty: ComponentType,
    predicate: RowPredicate,
}

impl SharedFilter {
    fn new<S: SharedComponent>(value: S) -> Self {
        Self {
            ty: ComponentType::shared::<S>(),
            predicate: Box::new(move |table, row| {
                table
                    .column::<S>()
                    .and_then(|column| column.get(row))
                    .is_some_and(|stored| *stored == value)
            }),
        }
    }
}

/// A transient query over one world.
pub struct EntityQuery<'w> {
    world: &'w World,
    descriptor: QueryDescriptor,
    filters: Vec<SharedFilter>,
}

impl<'w> EntityQuery<'w> {
    pub(crate) fn new(world: &'w World, descriptor: QueryDescriptor) -> Self {
        world.resource_tracker().query_opened();
        Self {
            world,
            descriptor,
            filters: Vec::new(),
        }
    }

    /// The required component types.
    #[must_use]
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    // -- Filters --

    /// Narrow the query to entities whose `S` equals `value`.
    ///
    /// `S` must be one of the query's required types. Setting a filter for a
    /// type that already has one replaces the previous value.
    pub fn add_shared_component_filter<S: SharedComponent>(
        &mut self,
        value: S,
    ) -> Result<(), QueryError> {
        let filter = self.checked_filter(value)?;
        self.filters.retain(|f| f.ty.type_id != filter.ty.type_id);
        self.filters.push(filter);
        Ok(())
    }

    /// Narrow the query further to entities whose `S` equals `value`,
    /// keeping every filter already set, including ones on `S`.
    ///
    /// Two filters on the same type with different values match nothing.
    pub fn and_shared_component_filter<S: SharedComponent>(
        &mut self,
        value: S,
    ) -> Result<(), QueryError> {
        let filter = self.checked_filter(value)?;
        self.filters.push(filter);
        Ok(())
    }

    /// Remove all shared filters.
    pub fn reset_filter(&mut self) {
        self.filters.clear();
    }

    /// Number of active shared filters.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    // -- Terminals --

    /// Number of matching entities.
    #[must_use]
    pub fn calculate_entity_count(&self) -> usize {
        if self.filters.is_empty() {
            return self.matching_tables().map(ArchetypeTable::len).sum();
        }
        self.matching_rows().count()
    }

    /// Returns `true` if nothing matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matching_rows().next().is_none()
    }

    /// Handles of all matching entities.
    #[must_use]
    pub fn to_entity_array(&self, allocator: Allocator) -> NativeArray<Entity> {
        let entities = self
            .matching_rows()
            .map(|(table, row)| table.entities[row])
            .collect();
        NativeArray::new(entities, allocator, self.world.resource_tracker())
    }

    /// Copies of `T` for all matching entities, in the same order as
    /// [`EntityQuery::to_entity_array`].
    pub fn to_component_data_array<T: Component>(
        &self,
        allocator: Allocator,
    ) -> Result<NativeArray<T>, QueryError> {
        self.require::<T>()?;
        let values = self
            .matching_rows()
            .map(|(table, row)| value_at::<T>(table, row))
            .collect::<Result<Vec<T>, QueryError>>()?;
        Ok(NativeArray::new(
            values,
            allocator,
            self.world.resource_tracker(),
        ))
    }

    /// The `T` of the only matching entity.
    pub fn get_singleton<T: Component>(&self) -> Result<T, QueryError> {
        self.require::<T>()?;
        let (table, row) = self.singleton_row()?;
        value_at(table, row)
    }

    /// The only matching entity.
    pub fn get_singleton_entity(&self) -> Result<Entity, QueryError> {
        let (table, row) = self.singleton_row()?;
        Ok(table.entities[row])
    }

    /// Release the query scope.
    pub fn dispose(self) {
        drop(self);
    }

    // -- Internals --

    fn checked_filter<S: SharedComponent>(&self, value: S) -> Result<SharedFilter, QueryError> {
        let filter = SharedFilter::new(value);
        if self.descriptor.contains(filter.ty.type_id) {
            Ok(filter)
        } else {
            Err(QueryError::FilterNotInQuery(filter.ty.short_name()))
        }
    }

    fn require<T: Component>(&self) -> Result<(), QueryError> {
        if self.descriptor.contains(T::component_type_id()) {
            Ok(())
        } else {
            Err(QueryError::ComponentNotInQuery(short_type_name(T::type_name())))
        }
    }

    fn matching_tables(&self) -> impl Iterator<Item = &'w ArchetypeTable> + '_ {
        let world: &'w World = self.world;
        world
            .archetypes()
            .filter(|table| self.descriptor.matches(table))
    }

    fn matching_rows(&self) -> impl Iterator<Item = (&'w ArchetypeTable, usize)> + '_ {
        self.matching_tables().flat_map(move |table| {
            (0..table.len())
                .filter(move |&row| self.filters.iter().all(|f| (f.predicate)(table, row)))
                .map(move |row| (table, row))
        })
    }

    fn singleton_row(&self) -> Result<(&'w ArchetypeTable, usize), QueryError> {
        let mut rows = self.matching_rows();
        match (rows.next(), rows.next()) {
            (Some(only), None) => Ok(only),
            (None, _) => Err(self.not_singleton(0)),
            (Some(_), Some(_)) => Err(self.not_singleton(self.calculate_entity_count())),
        }
    }

    fn not_singleton(&self, found: usize) -> QueryError {
        debug!(query = %self.descriptor, found, "singleton query did not match exactly one entity");
        QueryError::NotSingleton {
            query: self.descriptor.to_string(),
            found,
        }
    }
}

/// A copy of the `T` stored at `row`.
///
/// The caller has already checked that the table carries `T`'s type id, so a
/// missing column means another component type hashes to the same id.
fn value_at<T: Component>(table: &ArchetypeTable, row: usize) -> Result<T, QueryError> {
    table
        .column::<T>()
        .and_then(|column| column.get(row))
        .cloned()
        .ok_or(QueryError::TypeIdCollision(short_type_name(T::type_name())))
}

impl Drop for EntityQuery<'_> {
    fn drop(&mut self) {
        self.world.resource_tracker().query_closed();
    }
}

impl fmt::Debug for EntityQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<_> = self.filters.iter().map(|filter| filter.ty.short_name()).collect();
        f.debug_struct("EntityQuery")
            .field("descriptor", &self.descriptor)
            .field("filters", &filters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Enemy;
    impl Component for Enemy {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Team(u8);
    impl Component for Team {}
    impl SharedComponent for Team {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Zone(u8);
    impl Component for Zone {}
    impl SharedComponent for Zone {}

    /// Claims `Health`'s name, and so its type id.
    #[derive(Debug, Clone, PartialEq)]
    struct Impostor(u32);
    impl Component for Impostor {
        fn type_name() -> &'static str {
            std::any::type_name::<Health>()
        }
    }

    fn health_world() -> (World, Vec<Entity>) {
        let mut world = World::new();
        let entities: Vec<Entity> = [30, 10, 30]
            .into_iter()
            .map(|hp| world.build_entity().with(Health(hp)).build())
            .collect();
        (world, entities)
    }

    #[test]
    fn test_count_and_arrays_follow_storage_order() {
        let (world, entities) = health_world();
        let query = world.create_entity_query(&[ComponentType::of::<Health>()]);

        assert_eq!(query.calculate_entity_count(), 3);
        let data = query.to_component_data_array::<Health>(Allocator::Temp).unwrap();
        assert_eq!(&*data, &[Health(30), Health(10), Health(30)]);
        let handles = query.to_entity_array(Allocator::Temp);
        assert_eq!(&*handles, entities.as_slice());
    }

    #[test]
    fn test_singleton_cardinality() {
        let (mut world, _) = health_world();
        {
            let query = world.create_entity_query(&[ComponentType::of::<Health>()]);
            assert_eq!(
                query.get_singleton::<Health>(),
                Err(QueryError::NotSingleton {
                    query: "Health".to_string(),
                    found: 3,
                })
            );
        }
        {
            let query = world.create_entity_query(&[ComponentType::of::<Enemy>()]);
            assert_eq!(
                query.get_singleton_entity(),
                Err(QueryError::NotSingleton {
                    query: "Enemy".to_string(),
                    found: 0,
                })
            );
        }

        let boss = world.build_entity().with(Health(500)).with(Enemy).build();
        let query = world.create_entity_query(&[
            ComponentType::of::<Health>(),
            ComponentType::of::<Enemy>(),
        ]);
        assert_eq!(query.get_singleton::<Health>(), Ok(Health(500)));
        assert_eq!(query.get_singleton_entity(), Ok(boss));
    }

    #[test]
    fn test_shared_filter_narrows_by_value() {
        let mut world = World::new();
        let red = world.build_entity().with(Health(1)).with_shared(Team(1)).build();
        let _blue = world.build_entity().with(Health(2)).with_shared(Team(2)).build();
        let _untagged = world.build_entity().with(Health(3)).build();

        let mut query = world.create_entity_query(&[
            ComponentType::of::<Health>(),
            ComponentType::shared::<Team>(),
        ]);
        assert_eq!(query.calculate_entity_count(), 2);

        query.add_shared_component_filter(Team(1)).unwrap();
        assert_eq!(query.filter_count(), 1);
        assert_eq!(query.calculate_entity_count(), 1);
        assert_eq!(query.get_singleton_entity(), Ok(red));

        // Replacing the value for the same type, not stacking it.
        query.add_shared_component_filter(Team(2)).unwrap();
        assert_eq!(query.filter_count(), 1);
        assert_eq!(query.get_singleton::<Health>(), Ok(Health(2)));

        query.add_shared_component_filter(Team(9)).unwrap();
        assert!(query.is_empty());

        query.reset_filter();
        assert_eq!(query.calculate_entity_count(), 2);
    }

    #[test]
    fn test_and_filters_on_one_type_must_all_hold() {
        let mut world = World::new();
        let red = world.build_entity().with(Health(1)).with_shared(Team(1)).build();
        world.build_entity().with(Health(2)).with_shared(Team(2)).build();

        let mut query = world.create_entity_query(&[
            ComponentType::of::<Health>(),
            ComponentType::shared::<Team>(),
        ]);
        query.and_shared_component_filter(Team(1)).unwrap();
        query.and_shared_component_filter(Team(1)).unwrap();
        assert_eq!(query.filter_count(), 2);
        assert_eq!(query.get_singleton_entity(), Ok(red));

        query.and_shared_component_filter(Team(2)).unwrap();
        assert_eq!(query.calculate_entity_count(), 0);
        assert!(query.to_entity_array(Allocator::Temp).is_empty());
        assert_eq!(
            query.and_shared_component_filter(Zone(1)),
            Err(QueryError::FilterNotInQuery("Zone"))
        );
    }

    #[test]
    fn test_colliding_type_names_are_reported() {
        let (world, _) = health_world();
        let query = world.create_entity_query(&[ComponentType::of::<Impostor>()]);
        assert_eq!(query.calculate_entity_count(), 3);
        assert_eq!(
            query.to_component_data_array::<Impostor>(Allocator::Temp).err(),
            Some(QueryError::TypeIdCollision("Health"))
        );
        drop(query);

        let mut world = World::new();
        world.build_entity().with(Health(7)).build();
        let query = world.create_entity_query(&[ComponentType::of::<Impostor>()]);
        assert_eq!(
            query.get_singleton::<Impostor>(),
            Err(QueryError::TypeIdCollision("Health"))
        );
        assert_eq!(query.get_singleton::<Health>(), Ok(Health(7)));
    }

    #[test]
    fn test_filter_must_be_part_of_query() {
        let world = World::new();
        let mut query = world.create_entity_query(&[ComponentType::of::<Health>()]);
        assert_eq!(
            query.add_shared_component_filter(Team(1)),
            Err(QueryError::FilterNotInQuery("Team"))
        );
    }

    #[test]
    fn test_component_data_must_be_part_of_query() {
        let (world, _) = health_world();
        let query = world.create_entity_query(&[ComponentType::of::<Health>()]);
        assert_eq!(
            query.to_component_data_array::<Enemy>(Allocator::Temp).err(),
            Some(QueryError::ComponentNotInQuery("Enemy"))
        );
        assert_eq!(
            query.get_singleton::<Enemy>(),
            Err(QueryError::ComponentNotInQuery("Enemy"))
        );
    }

    #[test]
    fn test_query_scope_is_tracked() {
        let (world, _) = health_world();
        assert_eq!(world.resources().live_queries, 0);
        let query = world.create_entity_query(&[ComponentType::of::<Health>()]);
        let other = world.create_entity_query(&[ComponentType::of::<Health>()]);
        assert_eq!(world.resources().live_queries, 2);

        let array = query.to_entity_array(Allocator::Persistent);
        query.dispose();
        drop(other);
        assert_eq!(world.resources().live_queries, 0);
        // Arrays outlive the scope that produced them.
        assert_eq!(world.resources().persistent_arrays, 1);
        drop(array);
        assert!(world.resources().is_idle());
    }

    #[test]
    fn test_empty_world() {
        let world = World::new();
        let query = world.create_entity_query(&[ComponentType::of::<Health>()]);
        assert_eq!(query.calculate_entity_count(), 0);
        assert!(query.to_entity_array(Allocator::Temp).is_empty());
        assert!(query.get_singleton::<Health>().unwrap_err().is_not_singleton());
    }
}

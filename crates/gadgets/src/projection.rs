//! Terminal projections.
//!
//! Each marker type here is one way of reading a query's result. The utility
//! opens a query scope, hands it to [`Projection::project`], and releases
//! the scope afterwards, whatever the outcome.

use gadgets_component::{Component, Entity};
use gadgets_world::{EntityQuery, NativeArray, QueryError};

use crate::config::UtilityConfig;

/// One way of reading the entities a query matched.
pub trait Projection<M: Component> {
    /// What the caller receives.
    type Output;

    /// Name used in log output.
    const NAME: &'static str;

    /// Read `query`. Called exactly once per scope.
    fn project(query: &EntityQuery<'_>, config: &UtilityConfig) -> Result<Self::Output, QueryError>;
}

/// The main component of the only matching entity.
#[derive(Debug, Clone, Copy)]
pub struct Singleton;

/// The only matching entity.
#[derive(Debug, Clone, Copy)]
pub struct SingletonEntity;

/// The number of matching entities.
#[derive(Debug, Clone, Copy)]
pub struct Count;

/// The main component of every match, in a caller-owned native array.
#[derive(Debug, Clone, Copy)]
pub struct DataArray;

/// Every matching entity, in a caller-owned native array.
#[derive(Debug, Clone, Copy)]
pub struct EntityArray;

/// The main component of every match, copied out of a released native array.
#[derive(Debug, Clone, Copy)]
pub struct DataCopy;

/// Every matching entity, copied out of a released native array.
#[derive(Debug, Clone, Copy)]
pub struct EntityCopy;

impl<M: Component> Projection<M> for Singleton {
    type Output = M;
    const NAME: &'static str = "singleton";

    fn project(query: &EntityQuery<'_>, _: &UtilityConfig) -> Result<M, QueryError> {
        query.get_singleton::<M>()
    }
}

impl<M: Component> Projection<M> for SingletonEntity {
    type Output = Entity;
    const NAME: &'static str = "singleton_entity";

    fn project(query: &EntityQuery<'_>, _: &UtilityConfig) -> Result<Entity, QueryError> {
        query.get_singleton_entity()
    }
}

impl<M: Component> Projection<M> for Count {
    type Output = usize;
    const NAME: &'static str = "count";

    fn project(query: &EntityQuery<'_>, _: &UtilityConfig) -> Result<usize, QueryError> {
        Ok(query.calculate_entity_count())
    }
}

impl<M: Component> Projection<M> for DataArray {
    type Output = NativeArray<M>;
    const NAME: &'static str = "data_array";

    fn project(query: &EntityQuery<'_>, config: &UtilityConfig) -> Result<NativeArray<M>, QueryError> {
        query.to_component_data_array::<M>(config.owned_allocator)
    }
}

impl<M: Component> Projection<M> for EntityArray {
    type Output = NativeArray<Entity>;
    const NAME: &'static str = "entity_array";

    fn project(
        query: &EntityQuery<'_>,
        config: &UtilityConfig,
    ) -> Result<NativeArray<Entity>, QueryError> {
        Ok(query.to_entity_array(config.owned_allocator))
    }
}

impl<M: Component> Projection<M> for DataCopy {
    type Output = Vec<M>;
    const NAME: &'static str = "data_copy";

    fn project(query: &EntityQuery<'_>, config: &UtilityConfig) -> Result<Vec<M>, QueryError> {
        let native = query.to_component_data_array::<M>(config.copy_allocator)?;
        Ok(native.into_vec())
    }
}

impl<M: Component> Projection<M> for EntityCopy {
    type Output = Vec<Entity>;
    const NAME: &'static str = "entity_copy";

    fn project(query: &EntityQuery<'_>, config: &UtilityConfig) -> Result<Vec<Entity>, QueryError> {
        Ok(query.to_entity_array(config.copy_allocator).into_vec())
    }
}

//! The entity-manager utility.
//!
//! [`EntityManagerUtility`] answers one-off questions about a [`World`] from
//! outside any per-frame update: "give me the only `Player`", "how many
//! `Enemy` entities are on team 2", "copy every `Health` value out". Each call
//! opens a query scope, runs exactly one [`Projection`], and releases the
//! scope before returning, on the error path too.

use gadgets_component::{Component, Entity};
use gadgets_world::{NativeArray, QueryError, World};
use tracing::debug;

use crate::config::UtilityConfig;
use crate::filters::FilterSet;
use crate::projection::{
    Count, DataArray, DataCopy, EntityArray, EntityCopy, Projection, Singleton, SingletonEntity,
};
use crate::tags::TagSet;
use crate::typed_query::TypedQuery;

/// Convenience queries against one world.
#[derive(Debug, Clone)]
pub struct EntityManagerUtility<'w> {
    world: &'w World,
    config: UtilityConfig,
}

impl<'w> EntityManagerUtility<'w> {
    /// A utility with the default configuration.
    #[must_use]
    pub fn new(world: &'w World) -> Self {
        Self::with_config(world, UtilityConfig::default())
    }

    /// A utility with an explicit configuration.
    #[must_use]
    pub fn with_config(world: &'w World, config: UtilityConfig) -> Self {
        Self { world, config }
    }

    /// The world being queried.
    #[must_use]
    pub fn world(&self) -> &'w World {
        self.world
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &UtilityConfig {
        &self.config
    }

    /// Run projection `P` over the query described by `typed`.
    ///
    /// This is the single operation every convenience method forwards to.
    pub fn execute<P, M, T, F>(&self, typed: TypedQuery<M, T, F>) -> Result<P::Output, QueryError>
    where
        P: Projection<M>,
        M: Component,
        T: TagSet,
        F: FilterSet,
    {
        let mut query = self.world.create_entity_query_from(typed.descriptor());
        typed.into_filters().apply(&mut query)?;

        let result = P::project(&query, &self.config);
        match &result {
            Ok(_) => debug!(
                projection = P::NAME,
                query = %query.descriptor(),
                filters = F::LEN,
                "projection executed"
            ),
            Err(err) => debug!(
                projection = P::NAME,
                query = %query.descriptor(),
                error = %err,
                "projection failed"
            ),
        }
        result
    }

    /// Start a query over main component `M`.
    pub fn query<M: Component>(&self) -> UtilityQuery<'_, 'w, M> {
        UtilityQuery {
            utility: self,
            typed: TypedQuery::new(),
        }
    }
}

/// A query being assembled against an [`EntityManagerUtility`].
///
/// Add tags with [`UtilityQuery::tags`] and shared filter values with
/// [`UtilityQuery::filter`], then finish with one terminal.
#[must_use]
pub struct UtilityQuery<'u, 'w, M, T = (), F = ()> {
    utility: &'u EntityManagerUtility<'w>,
    typed: TypedQuery<M, T, F>,
}

impl<'u, 'w, M: Component, T: TagSet, F: FilterSet> UtilityQuery<'u, 'w, M, T, F> {
    /// Require every type in `T2` as well, replacing any earlier tag list.
    pub fn tags<T2: TagSet>(self) -> UtilityQuery<'u, 'w, M, T2, F> {
        UtilityQuery {
            utility: self.utility,
            typed: self.typed.tags::<T2>(),
        }
    }

    /// Narrow to entities whose shared values equal `filters`, replacing any
    /// earlier filter list.
    pub fn filter<F2: FilterSet>(self, filters: F2) -> UtilityQuery<'u, 'w, M, T, F2> {
        UtilityQuery {
            utility: self.utility,
            typed: self.typed.filter(filters),
        }
    }

    /// The typed descriptor assembled so far.
    pub fn typed_query(&self) -> &TypedQuery<M, T, F> {
        &self.typed
    }

    /// Run an arbitrary projection.
    pub fn run<P: Projection<M>>(self) -> Result<P::Output, QueryError> {
        self.utility.execute::<P, M, T, F>(self.typed)
    }

    /// The main component of the only match. Fails unless exactly one entity
    /// matches.
    pub fn get_singleton(self) -> Result<M, QueryError> {
        self.run::<Singleton>()
    }

    /// The only matching entity. Fails unless exactly one entity matches.
    pub fn get_singleton_entity(self) -> Result<Entity, QueryError> {
        self.run::<SingletonEntity>()
    }

    /// Number of matching entities.
    pub fn entity_count(self) -> Result<usize, QueryError> {
        self.run::<Count>()
    }

    /// The main component of every match in a caller-owned array.
    ///
    /// The array stays allocated until it is dropped or disposed.
    pub fn component_data_array(self) -> Result<NativeArray<M>, QueryError> {
        self.run::<DataArray>()
    }

    /// Every matching entity in a caller-owned array.
    pub fn entity_array(self) -> Result<NativeArray<Entity>, QueryError> {
        self.run::<EntityArray>()
    }

    /// The main component of every match, as a plain copy.
    ///
    /// Allocates twice per call; intended for tooling and tests.
    pub fn get(self) -> Result<Vec<M>, QueryError> {
        self.run::<DataCopy>()
    }

    /// Every matching entity, as a plain copy.
    pub fn entities(self) -> Result<Vec<Entity>, QueryError> {
        self.run::<EntityCopy>()
    }
}

//! World and query error types.

use gadgets_component::Entity;

/// Errors raised by world mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The handle does not refer to a live entity.
    #[error("entity {0} not found")]
    EntityNotFound(Entity),

    /// The entity does not carry the requested component.
    #[error("component '{component}' not found on entity {entity}")]
    ComponentNotFound {
        component: &'static str,
        entity: Entity,
    },

    /// `add_component` was called for a component the entity already has.
    #[error("component '{component}' already present on entity {entity}")]
    ComponentAlreadyPresent {
        component: &'static str,
        entity: Entity,
    },

    /// The entity stores a different Rust type under this component's id.
    #[error("component '{component}' on entity {entity} shares its type id with another component type")]
    TypeIdCollision {
        component: &'static str,
        entity: Entity,
    },
}

/// Errors raised while building or evaluating an entity query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A singleton accessor matched zero or more than one entity.
    #[error("expected exactly one entity matching [{query}], found {found}")]
    NotSingleton { query: String, found: usize },

    /// Component data was requested for a type the query does not require.
    #[error("component '{0}' is not part of the query")]
    ComponentNotInQuery(&'static str),

    /// A shared filter was set for a type the query does not require.
    #[error("shared filter '{0}' is not part of the query")]
    FilterNotInQuery(&'static str),

    /// Stored data under this type id belongs to a different Rust type.
    #[error("component '{0}' shares its type id with another component type")]
    TypeIdCollision(&'static str),
}

impl QueryError {
    /// Returns `true` for cardinality violations from singleton accessors.
    #[must_use]
    pub fn is_not_singleton(&self) -> bool {
        matches!(self, Self::NotSingleton { .. })
    }
}

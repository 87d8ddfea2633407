//! # gadgets_component
//!
//! The "C" in ECS: what a component is, how entities are named, and how
//! component data is laid out in archetype tables.
//!
//! This crate provides:
//!
//! - [`Component`] and [`SharedComponent`] traits.
//! - [`ComponentType`] / [`ComponentTypeId`] descriptors used by queries.
//! - [`Entity`] handles and the recycling [`EntityAllocator`].
//! - [`ArchetypeTable`] with typed, type-erased [`Column`]s.
//! - [`QueryDescriptor`], the required-type set of a query.

pub mod archetype;
pub mod component;
pub mod entity;
pub mod query;

pub use archetype::{ArchetypeId, ArchetypeTable, Column, ColumnStorage};
pub use component::{Component, ComponentKind, ComponentType, ComponentTypeId, SharedComponent};
pub use entity::{Entity, EntityAllocator};
pub use query::QueryDescriptor;

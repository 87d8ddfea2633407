//! # gadgets_world
//!
//! The host ECS the gadgets utility runs against.
//!
//! This crate provides:
//!
//! - [`World`]: entity lifecycle and component storage over archetype tables.
//! - [`EntityQuery`]: a scoped query with shared-component equality filters
//!   and the terminal accessors (singleton value, singleton entity, count,
//!   component-data array, entity array).
//! - [`NativeArray`] / [`Allocator`]: allocator-tagged owned buffers.
//! - [`ResourceTracker`]: live query and array accounting.
//!
//! ```rust
//! use gadgets_component::{Component, ComponentType};
//! use gadgets_world::{Allocator, World};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let mut world = World::new();
//! for hp in [30, 10, 30] {
//!     world.build_entity().with(Health(hp)).build();
//! }
//!
//! let query = world.create_entity_query(&[ComponentType::of::<Health>()]);
//! assert_eq!(query.calculate_entity_count(), 3);
//! let values = query.to_component_data_array::<Health>(Allocator::Temp).unwrap();
//! assert_eq!(&*values, &[Health(30), Health(10), Health(30)]);
//! assert!(query.get_singleton::<Health>().is_err());
//! ```

pub mod entity_query;
pub mod error;
pub mod native;
pub mod world;

pub use entity_query::EntityQuery;
pub use error::{QueryError, WorldError};
pub use native::{Allocator, NativeArray, ParseAllocatorError, ResourceStats, ResourceTracker};
pub use world::{EntityBuilder, World};

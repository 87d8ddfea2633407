//! # gadgets
//!
//! One-call queries over a [`gadgets_world::World`], usable from outside any
//! per-frame update.
//!
//! A query names a main component, optional tag components, and optional
//! shared filter values; a terminal then projects the matches:
//!
//! | Terminal | Returns |
//! |---|---|
//! | `get_singleton` | the main component of the only match |
//! | `get_singleton_entity` | the only matching entity |
//! | `entity_count` | the number of matches |
//! | `component_data_array` | a caller-owned [`gadgets_world::NativeArray`] of main components |
//! | `entity_array` | a caller-owned array of entities |
//! | `get` / `entities` | plain `Vec` copies; the scratch array is released internally |
//!
//! Singleton terminals fail with [`QueryError::NotSingleton`] unless exactly
//! one entity matches. Every other terminal succeeds on an empty match.
//!
//! ```rust
//! use gadgets::EntityManagerUtility;
//! use gadgets_component::{Component, SharedComponent};
//! use gadgets_world::World;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! #[derive(Debug, Clone)]
//! struct Enemy;
//! impl Component for Enemy {}
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Team(u8);
//! impl Component for Team {}
//! impl SharedComponent for Team {}
//!
//! let mut world = World::new();
//! world.build_entity().with(Health(30)).with(Enemy).with_shared(Team(1)).build();
//! world.build_entity().with(Health(10)).with(Enemy).with_shared(Team(2)).build();
//! world.build_entity().with(Health(30)).build();
//!
//! let util = EntityManagerUtility::new(&world);
//! assert_eq!(util.query::<Health>().entity_count(), Ok(3));
//! assert_eq!(util.query::<Health>().tags::<(Enemy,)>().entity_count(), Ok(2));
//!
//! let red = util
//!     .query::<Health>()
//!     .tags::<(Enemy,)>()
//!     .filter((Team(1),))
//!     .get_singleton();
//! assert_eq!(red, Ok(Health(30)));
//! assert!(util.query::<Health>().get_singleton().is_err());
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod projection;
pub mod tags;
pub mod typed_query;
pub mod utility;

pub use config::UtilityConfig;
pub use error::ConfigError;
pub use filters::FilterSet;
pub use gadgets_world::QueryError;
pub use projection::{
    Count, DataArray, DataCopy, EntityArray, EntityCopy, Projection, Singleton, SingletonEntity,
};
pub use tags::TagSet;
pub use typed_query::TypedQuery;
pub use utility::{EntityManagerUtility, UtilityQuery};

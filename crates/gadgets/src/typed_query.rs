//! Typed query descriptors.
//!
//! A [`TypedQuery`] names a query entirely in types: the main component `M`,
//! a [`TagSet`] of extra required components, and a [`FilterSet`] of shared
//! values. Only the filter values live at runtime.

use std::fmt;
use std::marker::PhantomData;

use gadgets_component::{Component, ComponentType, QueryDescriptor};

use crate::filters::FilterSet;
use crate::tags::TagSet;

/// A query over main component `M`, tags `T`, and shared filters `F`.
///
/// ```rust
/// use gadgets::TypedQuery;
/// use gadgets_component::{Component, SharedComponent};
///
/// #[derive(Clone)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// #[derive(Clone)]
/// struct Enemy;
/// impl Component for Enemy {}
///
/// #[derive(Clone, PartialEq)]
/// struct Team(u8);
/// impl Component for Team {}
/// impl SharedComponent for Team {}
///
/// let typed = TypedQuery::<Health>::new().tags::<(Enemy,)>().filter((Team(1),));
/// assert_eq!(typed.descriptor().types().len(), 3);
/// ```
pub struct TypedQuery<M, T = (), F = ()> {
    filters: F,
    marker: PhantomData<fn() -> (M, T)>,
}

impl<M: Component> TypedQuery<M> {
    /// A query over `M` alone.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: (),
            marker: PhantomData,
        }
    }
}

impl<M: Component> Default for TypedQuery<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Component, T: TagSet, F: FilterSet> TypedQuery<M, T, F> {
    /// Replace the tag list.
    #[must_use]
    pub fn tags<T2: TagSet>(self) -> TypedQuery<M, T2, F> {
        TypedQuery {
            filters: self.filters,
            marker: PhantomData,
        }
    }

    /// Replace the shared filter values.
    #[must_use]
    pub fn filter<F2: FilterSet>(self, filters: F2) -> TypedQuery<M, T, F2> {
        TypedQuery {
            filters,
            marker: PhantomData,
        }
    }

    /// The required types: `M`, then the tags, then the filtered types.
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        let main = std::iter::once(ComponentType::of::<M>());
        main.chain(T::component_types())
            .chain(F::component_types())
            .fold(QueryDescriptor::new(), QueryDescriptor::with)
    }

    /// The filter values.
    #[must_use]
    pub fn filters(&self) -> &F {
        &self.filters
    }

    /// Consume the query, keeping only the filter values.
    #[must_use]
    pub fn into_filters(self) -> F {
        self.filters
    }
}

impl<M, T, F: Clone> Clone for TypedQuery<M, T, F> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            marker: PhantomData,
        }
    }
}

impl<M: Component, T: TagSet, F: FilterSet> fmt::Debug for TypedQuery<M, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedQuery")
            .field("query", &self.descriptor().to_string())
            .field("tags", &T::LEN)
            .field("filters", &F::LEN)
            .finish()
    }
}

//! Shared-component filter lists.
//!
//! A [`FilterSet`] is a tuple of shared component values. Each value's type
//! becomes a required type of the query, and the query is narrowed to
//! entities whose stored value equals it.

use gadgets_component::{ComponentType, SharedComponent};
use gadgets_world::{EntityQuery, QueryError};

/// A list of shared-component equality filters.
pub trait FilterSet {
    /// Number of filters in the list.
    const LEN: usize;

    /// The filtered types, in order, marked shared.
    fn component_types() -> Vec<ComponentType>;

    /// Replace the filters on `query` with this list.
    ///
    /// Every value must hold; two values of one type are both required.
    fn apply(self, query: &mut EntityQuery<'_>) -> Result<(), QueryError>;
}

impl FilterSet for () {
    const LEN: usize = 0;

    fn component_types() -> Vec<ComponentType> {
        Vec::new()
    }

    fn apply(self, query: &mut EntityQuery<'_>) -> Result<(), QueryError> {
        query.reset_filter();
        Ok(())
    }
}

macro_rules! impl_filter_set {
    ( $arity: expr; $( $ty: ident => $value: ident ),* ) => {
        impl<$( $ty ),*> FilterSet for ($( $ty, )*)
        where $( $ty: SharedComponent ),*
        {
            const LEN: usize = $arity;

            fn component_types() -> Vec<ComponentType> {
                vec![$( ComponentType::shared::<$ty>() ),*]
            }

            fn apply(self, query: &mut EntityQuery<'_>) -> Result<(), QueryError> {
                let ($( $value, )*) = self;
                query.reset_filter();
                $( query.and_shared_component_filter($value)?; )*
                Ok(())
            }
        }
    }
}

impl_filter_set!(1; A => a);
impl_filter_set!(2; A => a, B => b);
impl_filter_set!(3; A => a, B => b, C => c);
impl_filter_set!(4; A => a, B => b, C => c, D => d);

#[cfg(test)]
mod tests {
    use gadgets_component::Component;
    use gadgets_world::World;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Team(u8);
    impl Component for Team {}
    impl SharedComponent for Team {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Zone(u8);
    impl Component for Zone {}
    impl SharedComponent for Zone {}

    #[test]
    fn test_types_are_marked_shared() {
        let types = <(Team, Zone) as FilterSet>::component_types();
        assert_eq!(types.len(), 2);
        assert!(types.iter().all(ComponentType::is_shared));
    }

    #[test]
    fn test_apply_installs_one_filter_per_value() {
        let world = World::new();
        let mut query = world.create_entity_query(&<(Team, Zone) as FilterSet>::component_types());
        (Team(1), Zone(2)).apply(&mut query).unwrap();
        assert_eq!(query.filter_count(), 2);

        (Team(3),).apply(&mut query).unwrap();
        assert_eq!(query.filter_count(), 1);

        ().apply(&mut query).unwrap();
        assert_eq!(query.filter_count(), 0);
    }

    #[test]
    fn test_repeated_type_keeps_every_value() {
        let mut world = World::new();
        world.build_entity().with_shared(Team(1)).build();
        world.build_entity().with_shared(Team(2)).build();
        let mut query = world.create_entity_query(&<(Team,) as FilterSet>::component_types());

        (Team(1), Team(2)).apply(&mut query).unwrap();
        assert_eq!(query.filter_count(), 2);
        assert_eq!(query.calculate_entity_count(), 0);

        (Team(2), Team(2)).apply(&mut query).unwrap();
        assert_eq!(query.calculate_entity_count(), 1);
    }

    #[test]
    fn test_apply_rejects_types_outside_the_query() {
        let world = World::new();
        let mut query = world.create_entity_query(&<(Team,) as FilterSet>::component_types());
        assert_eq!(
            (Team(1), Zone(2)).apply(&mut query),
            Err(QueryError::FilterNotInQuery("Zone"))
        );
    }
}

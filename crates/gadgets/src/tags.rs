//! Tag component lists.
//!
//! A [`TagSet`] is a tuple of component types that a query requires in
//! addition to its main component. Only presence matters; tag values are
//! never read.

use gadgets_component::{Component, ComponentType};

/// A compile-time list of required component types.
pub trait TagSet: 'static {
    /// Number of types in the list.
    const LEN: usize;

    /// The listed types, in order.
    fn component_types() -> Vec<ComponentType>;
}

impl TagSet for () {
    const LEN: usize = 0;

    fn component_types() -> Vec<ComponentType> {
        Vec::new()
    }
}

macro_rules! impl_tag_set {
    ( $arity: expr; $( $ty: ident ),* ) => {
        impl<$( $ty ),*> TagSet for ($( $ty, )*)
        where $( $ty: Component ),*
        {
            const LEN: usize = $arity;

            fn component_types() -> Vec<ComponentType> {
                vec![$( ComponentType::of::<$ty>() ),*]
            }
        }
    }
}

impl_tag_set!(1; A);
impl_tag_set!(2; A, B);
impl_tag_set!(3; A, B, C);
impl_tag_set!(4; A, B, C, D);
impl_tag_set!(5; A, B, C, D, E);
impl_tag_set!(6; A, B, C, D, E, F);
impl_tag_set!(7; A, B, C, D, E, F, G);
impl_tag_set!(8; A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Enemy;
    impl Component for Enemy {}

    #[derive(Clone)]
    struct Boss;
    impl Component for Boss {}

    #[test]
    fn test_unit_is_empty() {
        assert_eq!(<() as TagSet>::LEN, 0);
        assert!(<() as TagSet>::component_types().is_empty());
    }

    #[test]
    fn test_tuple_lists_types_in_order() {
        let types = <(Enemy, Boss) as TagSet>::component_types();
        assert_eq!(<(Enemy, Boss) as TagSet>::LEN, 2);
        assert_eq!(types, vec![ComponentType::of::<Enemy>(), ComponentType::of::<Boss>()]);
    }
}

//! The demo world.

use gadgets_component::{Component, SharedComponent};
use gadgets_world::World;

/// Hit points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health(pub u32);

impl Component for Health {}

/// Marks the player.
#[derive(Debug, Clone, Copy)]
pub struct Player;

impl Component for Player {}

/// Marks hostile entities.
#[derive(Debug, Clone, Copy)]
pub struct Enemy;

impl Component for Enemy {}

/// Marks bosses.
#[derive(Debug, Clone, Copy)]
pub struct Boss;

impl Component for Boss {}

/// Team membership, shared by many entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team(pub u8);

impl Component for Team {}
impl SharedComponent for Team {}

/// One player, three grunts across two teams, and a boss on team 2.
pub fn build() -> World {
    let mut world = World::new();

    world
        .build_entity()
        .with(Health(100))
        .with(Player)
        .with_shared(Team(1))
        .build();

    for (hp, team) in [(30, 1), (10, 2), (30, 2)] {
        world
            .build_entity()
            .with(Health(hp))
            .with(Enemy)
            .with_shared(Team(team))
            .build();
    }

    world
        .build_entity()
        .with(Health(500))
        .with(Enemy)
        .with(Boss)
        .with_shared(Team(2))
        .build();

    world
}

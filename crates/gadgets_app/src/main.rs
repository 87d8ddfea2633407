//! # gadgets_app
//!
//! Builds a small arena world and answers a handful of questions about it
//! through [`EntityManagerUtility`].
//!
//! ## Configuration
//!
//! - `RUST_LOG`: log filter (defaults `gadgets=debug`, `gadgets_app=info`).
//! - `GADGETS_OWNED_ALLOCATOR` / `GADGETS_COPY_ALLOCATOR`: allocators for
//!   owned arrays and copy scratch arrays.

mod arena;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arena::{Boss, Enemy, Health, Player, Team};
use gadgets::{EntityManagerUtility, UtilityConfig};

fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("gadgets=debug".parse()?)
        .add_directive("gadgets_app=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = UtilityConfig::from_env()?;
    info!(
        owned = %config.owned_allocator,
        copy = %config.copy_allocator,
        "gadgets demo starting"
    );

    let world = arena::build();
    info!(
        entities = world.entity_count(),
        archetypes = world.archetype_count(),
        "arena built"
    );

    let util = EntityManagerUtility::with_config(&world, config);

    let player = util.query::<Player>().get_singleton_entity()?;
    let player_health = util.query::<Health>().tags::<(Player,)>().get_singleton()?;
    info!(%player, hp = player_health.0, "player");

    let all = util.query::<Health>().get()?;
    let hp: Vec<u32> = all.iter().map(|h| h.0).collect();
    info!(count = util.query::<Health>().entity_count()?, ?hp, "every health value");

    for team in [Team(1), Team(2)] {
        let enemies = util
            .query::<Health>()
            .tags::<(Enemy,)>()
            .filter((team,))
            .entity_array()?;
        info!(team = team.0, enemies = enemies.len(), "enemies per team");
    }

    let boss = util
        .query::<Health>()
        .tags::<(Enemy, Boss)>()
        .filter((Team(2),))
        .get_singleton()?;
    info!(hp = boss.0, "team 2 boss");

    match util.query::<Health>().tags::<(Enemy,)>().get_singleton() {
        Ok(h) => info!(hp = h.0, "single enemy"),
        Err(err) => warn!(%err, "no single enemy"),
    }

    let stats = world.resources();
    info!(
        live_queries = stats.live_queries,
        live_arrays = stats.live_arrays(),
        "gadgets demo finished"
    );
    Ok(())
}

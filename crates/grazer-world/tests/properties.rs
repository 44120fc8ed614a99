use grazer_core::{PlacementStrategy, SimulationConfig};
use grazer_world::Engine;
use proptest::prelude::*;

fn config_strategy() -> impl Strategy<Value = SimulationConfig> {
    (
        1i32..=12,
        1i32..=12,
        1i32..=40,
        1i32..=300,
        1i32..=60,
        prop::option::of(1i32..=8),
        prop::bool::ANY,
    )
        .prop_map(
            |(width, height, rabbits, growth, loss, cap, sampled)| SimulationConfig {
                grid_width: width,
                grid_height: height,
                initial_rabbit_count: rabbits,
                initial_grass_units: growth * 2,
                grass_growth_rate: growth,
                birth_threshold: 120,
                rabbit_min_init_energy: 20,
                rabbit_max_init_energy: 80,
                rabbit_energy_loss_rate: loss,
                energy_per_grass_unit: 15,
                grass_cap: cap,
                placement: if sampled {
                    PlacementStrategy::Sampled { max_attempts: 16 }
                } else {
                    PlacementStrategy::Exhaustive
                },
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn occupancy_matches_population_every_tick(config in config_strategy(), seed in any::<u64>()) {
        let mut engine = Engine::seeded(config, seed).unwrap();

        for _ in 0..25 {
            engine.tick();
            let world = engine.world();
            let population = engine.population();

            prop_assert_eq!(engine.living_agent_count(), world.occupied_count());
            prop_assert!(engine.living_agent_count() <= world.area());
            for agent in population.iter() {
                prop_assert!(agent.energy > 0);
                prop_assert_eq!(world.occupant(agent.position), Some(agent.id));
            }
        }
    }

    #[test]
    fn grass_never_exceeds_cap(config in config_strategy(), seed in any::<u64>()) {
        let cap = config.grass_cap;
        let mut engine = Engine::seeded(config, seed).unwrap();

        for _ in 0..25 {
            engine.tick();
            if let Some(cap) = cap {
                let cap = cap as u32;
                prop_assert!(engine.world().grass_cells().iter().all(|g| *g <= cap));
                prop_assert!(engine.total_grass() <= cap as u64 * engine.world().area() as u64);
            }
        }
    }

    #[test]
    fn ids_are_never_reused(config in config_strategy(), seed in any::<u64>()) {
        let mut engine = Engine::seeded(config, seed).unwrap();
        let mut last_next = engine.population().next_id();

        for _ in 0..25 {
            engine.tick();
            let next = engine.population().next_id();
            prop_assert!(next >= last_next);
            for agent in engine.population().iter() {
                prop_assert!(agent.id < next);
            }
            last_next = next;
        }
    }
}

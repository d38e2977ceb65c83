//! Properties every generated level has, swept over seeds and grid sizes.

use proptest::prelude::*;

use sm_core::dungeon::{CorridorPathfinder, LevelData, LevelGenerator, Point};
use sm_core::{ASTAR_MAX_ITERATIONS, GameRng, GeneratorConfig};

fn generate(seed: u64, grid_size: usize, split_randomness: f64) -> LevelData {
    let config = GeneratorConfig {
        grid_size,
        split_randomness,
        ..GeneratorConfig::default()
    };
    let generator = LevelGenerator::new(config)
        .unwrap()
        .with_pathfinder(CorridorPathfinder::new(grid_size * grid_size));
    generator.generate_level(&mut GameRng::new(seed))
}

fn assert_border_walls(level: &LevelData) {
    let rows = level.grid.rows();
    let n = level.grid.size();
    for i in 0..n {
        assert!(rows[0][i] && rows[n - 1][i], "border row open at column {i}");
        assert!(rows[i][0] && rows[i][n - 1], "border column open at row {i}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_generated_level_is_sound(
        seed in any::<u64>(),
        grid_size in 20usize..=50,
        split_randomness in 0.0f64..=1.0,
    ) {
        let level = generate(seed, grid_size, split_randomness);
        let n = level.grid.size();

        prop_assert!(!level.rooms.is_empty());
        for (i, a) in level.rooms.iter().enumerate() {
            prop_assert!(a.x >= 1 && a.y >= 1);
            prop_assert!(a.x + a.width < n && a.y + a.height < n);
            for b in &level.rooms[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }

        assert_border_walls(&level);
        prop_assert!(level.grid.is_floor(level.entrance()));
        prop_assert!(level.grid.is_floor(level.exit()));
        prop_assert!(level.grid.is_reachable(level.entrance(), level.exit()));
    }

    #[test]
    fn test_every_room_reachable_from_entrance(seed in any::<u64>()) {
        let level = generate(seed, 40, 0.25);
        let reach = level.grid.flood_fill(level.entrance());
        for room in &level.rooms {
            let c = room.center();
            prop_assert!(reach[c.y][c.x], "room at {} cut off", c);
        }
    }
}

#[test]
fn test_shipped_cap_keeps_levels_connected() {
    for grid_size in [20, 30, 40, 50] {
        for split_randomness in [0.0, 0.25, 0.5, 1.0] {
            let config = GeneratorConfig {
                grid_size,
                split_randomness,
                ..GeneratorConfig::default()
            };
            let generator = LevelGenerator::new(config).unwrap();
            assert_eq!(generator.pathfinder().max_iterations(), ASTAR_MAX_ITERATIONS);

            for seed in 0..100 {
                let level = generator.generate_level(&mut GameRng::new(seed));
                let reach = level.grid.flood_fill(level.entrance());
                assert!(
                    reach[level.exit_y][level.exit_x],
                    "grid {grid_size} randomness {split_randomness} seed {seed}: exit cut off"
                );
                for room in &level.rooms {
                    let c = room.center();
                    assert!(
                        reach[c.y][c.x],
                        "grid {grid_size} randomness {split_randomness} seed {seed}: room at {c} cut off"
                    );
                }
            }
        }
    }
}

#[test]
fn test_midpoint_scenario() {
    let config = GeneratorConfig {
        grid_size: 10,
        min_room_size: 2,
        max_room_size: 4,
        max_splits: 2,
        room_padding: 1,
        split_randomness: 0.0,
    };
    let level = LevelGenerator::new(config)
        .unwrap()
        .generate_level(&mut GameRng::new(42));

    assert_eq!(level.rooms.len(), 4);
    let mut corners: Vec<Point> = level.rooms.iter().map(|r| Point::new(r.x, r.y)).collect();
    corners.sort();
    assert_eq!(
        corners,
        vec![
            Point::new(2, 2),
            Point::new(2, 6),
            Point::new(6, 2),
            Point::new(6, 6),
        ]
    );
    assert!(level.rooms.iter().all(|r| r.width == 2 && r.height == 2));
    assert_border_walls(&level);
}

#[test]
fn test_level_serializes() {
    let level = generate(42, 30, 0.25);
    let json = serde_json::to_string(&level).unwrap();
    assert!(json.contains("\"entrance_x\""));
    let back: LevelData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, level);
}

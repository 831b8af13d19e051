//! Duskcrawl Headless Simulation Harness
//!
//! Validates the simulation core end-to-end without a renderer: dungeon
//! layout ingestion, pathfinding scenarios, full combat ticks, and
//! determinism. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p duskcrawl-simtest
//!   cargo run -p duskcrawl-simtest -- --verbose

use duskcrawl_core::prelude::*;
use duskcrawl_logic::geometry::Vec2;
use duskcrawl_logic::grid::{Tile, TileGrid};
use duskcrawl_logic::pathfinding::find_path;
use serde::Deserialize;

// ── Arena layout (the same JSON an external dungeon supplier would ship) ─
const ARENA_JSON: &str = include_str!("../../../data/arena.json");

#[derive(Debug, Deserialize)]
struct ArenaSpec {
    tile_size: u32,
    /// Numeric tile codes: 1 = wall, 0 = floor.
    rows: Vec<Vec<u8>>,
}

impl ArenaSpec {
    fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&code| if code == 1 { Tile::Wall } else { Tile::Floor })
                    .collect()
            })
            .collect()
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.to_owned(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Duskcrawl Simulation Harness ===\n");

    let mut results = Vec::new();

    results.extend(validate_arena_layout(verbose));
    results.extend(validate_pathfinding(verbose));
    results.extend(validate_combat_loop(verbose));
    results.extend(validate_chain_lightning(verbose));
    results.extend(validate_void_hole_pull(verbose));
    results.extend(validate_determinism(verbose));

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    println!();
    for result in &results {
        let mark = if result.passed { "PASS" } else { "FAIL" };
        if !result.passed || verbose {
            println!("[{}] {} - {}", mark, result.name, result.detail);
        }
    }
    println!("\n{} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn arena_sim(seed: u64) -> Simulation {
    let spec: ArenaSpec = serde_json::from_str(ARENA_JSON).expect("arena.json must parse");
    Simulation::from_layout(
        spec.to_rows(),
        spec.tile_size,
        SimConfig {
            seed,
            ..Default::default()
        },
    )
    .expect("arena layout must validate")
}

fn tick(sim: &mut Simulation, ticks: u32, now_ms: &mut u64) {
    for _ in 0..ticks {
        *now_ms += 16;
        sim.update(&InputFrame::default(), *now_ms);
    }
}

/// Pin an enemy in place so scenarios stay deterministic while projectiles
/// are in flight.
fn pin(sim: &mut Simulation, enemy: hecs::Entity) {
    sim.world
        .get::<&mut EnemyAgent>(enemy)
        .expect("enemy must exist")
        .apply_stun(1_000_000, false);
}

fn enemy_health(sim: &Simulation, enemy: hecs::Entity) -> i32 {
    sim.world
        .get::<&Health>(enemy)
        .map(|h| h.current)
        .unwrap_or(0)
}

// ── Scenarios ───────────────────────────────────────────────────────────

fn validate_arena_layout(verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("-- arena layout");
    }
    let spec: ArenaSpec = match serde_json::from_str(ARENA_JSON) {
        Ok(spec) => spec,
        Err(e) => {
            return vec![check("arena parses", false, format!("json error: {}", e))];
        }
    };

    let mut results = Vec::new();
    let grid = TileGrid::from_rows(spec.to_rows(), spec.tile_size);
    match grid {
        Ok(grid) => {
            results.push(check(
                "arena validates",
                grid.width() == 16 && grid.height() == 12,
                format!("{}x{} tiles", grid.width(), grid.height()),
            ));
            let spawn = grid.spawn_tile();
            results.push(check(
                "arena has a spawn tile",
                spawn.is_some_and(|(tx, ty)| grid.tile(tx, ty) == Some(Tile::Floor)),
                format!("{:?}", spawn),
            ));
        }
        Err(e) => results.push(check("arena validates", false, format!("{}", e))),
    }
    results
}

fn validate_pathfinding(verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("-- pathfinding");
    }
    // 10x10, all walkable except the border: (1,1) -> (8,8)
    let mut rows = vec![vec![Tile::Floor; 10]; 10];
    for i in 0..10 {
        rows[0][i] = Tile::Wall;
        rows[9][i] = Tile::Wall;
        rows[i][0] = Tile::Wall;
        rows[i][9] = Tile::Wall;
    }
    let grid = TileGrid::from_rows(rows, 32).expect("grid must validate");

    let mut results = Vec::new();
    match find_path(&grid, grid.tile_center(1, 1), grid.tile_center(8, 8)) {
        Some(path) => {
            results.push(check(
                "diagonal path is Chebyshev-optimal",
                path.len() == 8,
                format!("{} tiles", path.len()),
            ));

            let mut monotone = true;
            let mut last = u32::MAX;
            for &(x, y) in &path {
                let d = x.abs_diff(8).max(y.abs_diff(8));
                if d >= last {
                    monotone = false;
                }
                last = d;
            }
            results.push(check(
                "distance-to-goal shrinks every step",
                monotone,
                format!("{:?}", path),
            ));
        }
        None => results.push(check(
            "diagonal path is Chebyshev-optimal",
            false,
            "no path found".to_owned(),
        )),
    }
    results
}

fn validate_combat_loop(verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("-- combat loop");
    }
    let mut sim = arena_sim(1);
    let mut now_ms = 0;

    let player_center = Vec2::new(272.0, 208.0);
    let enemy = sim.spawn_enemy(Vec2::new(368.0, 208.0));

    // Fireball at the enemy's position
    let input = InputFrame {
        move_x: 0,
        move_y: 0,
        abilities: vec![AbilityRequest {
            name: "fireball".to_owned(),
            target: Some(Vec2::new(368.0, 208.0)),
        }],
    };
    now_ms += 16;
    sim.update(&input, now_ms);
    tick(&mut sim, 39, &mut now_ms);

    let mut results = Vec::new();
    // Direct hit (30) plus area burst (15)
    results.push(check(
        "fireball direct hit plus burst",
        enemy_health(&sim, enemy) == 55,
        format!("enemy at {} hp", enemy_health(&sim, enemy)),
    ));
    results.push(check(
        "enemy closes on the player",
        sim.world
            .get::<&Body>(enemy)
            .map(|b| b.center().distance(player_center) < 96.0)
            .unwrap_or(false),
        "pursuit".to_owned(),
    ));

    let events = sim.drain_events();
    results.push(check(
        "cast event emitted",
        events
            .iter()
            .any(|e| matches!(e, SimEvent::AbilityCast { ability, .. } if ability == "fireball")),
        format!("{} events", events.len()),
    ));
    results
}

fn validate_chain_lightning(verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("-- chain lightning");
    }
    let mut sim = arena_sim(2);
    let mut now_ms = 0;

    // Three pinned enemies in a row, each within arc range of the last
    let targets = [
        Vec2::new(144.0, 304.0),
        Vec2::new(240.0, 304.0),
        Vec2::new(336.0, 304.0),
    ];
    let enemies: Vec<_> = targets.iter().map(|&at| sim.spawn_enemy(at)).collect();
    for &enemy in &enemies {
        pin(&mut sim, enemy);
    }

    let input = InputFrame {
        move_x: 0,
        move_y: 0,
        abilities: vec![AbilityRequest {
            name: "chain_lightning".to_owned(),
            target: Some(targets[0]),
        }],
    };
    now_ms += 16;
    sim.update(&input, now_ms);
    tick(&mut sim, 120, &mut now_ms);

    let mut results = Vec::new();
    let healths: Vec<i32> = enemies.iter().map(|&e| enemy_health(&sim, e)).collect();
    results.push(check(
        "chain strikes each enemy exactly once",
        healths.iter().all(|&h| h == 85),
        format!("{:?}", healths),
    ));
    results.push(check(
        "struck enemies show the stun visual",
        enemies.iter().all(|&e| {
            sim.world
                .get::<&EnemyAgent>(e)
                .map(|a| a.stun_visual)
                .unwrap_or(false)
        }),
        "stunned".to_owned(),
    ));
    results
}

fn validate_void_hole_pull(verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("-- void hole");
    }
    let mut sim = arena_sim(3);
    let mut now_ms = 0;

    let enemy = sim.spawn_enemy(Vec2::new(144.0, 208.0));
    pin(&mut sim, enemy);

    let input = InputFrame {
        move_x: 0,
        move_y: 0,
        abilities: vec![AbilityRequest {
            name: "void_hole".to_owned(),
            target: Some(Vec2::new(400.0, 208.0)),
        }],
    };
    now_ms += 16;
    sim.update(&input, now_ms);
    // Travel phase (~32 ticks at speed 4), then a stretch of active pull
    tick(&mut sim, 100, &mut now_ms);

    let mut results = Vec::new();
    let center = sim
        .world
        .get::<&Body>(enemy)
        .map(|b| b.center())
        .unwrap_or(Vec2::ZERO);
    results.push(check(
        "enemy is dragged toward the hole",
        center.x > 180.0,
        format!("enemy at x={:.0}", center.x),
    ));
    results.push(check(
        "no damage outside the damage radius",
        enemy_health(&sim, enemy) == 100,
        format!("{} hp", enemy_health(&sim, enemy)),
    ));
    results.push(check(
        "hole renders as active",
        sim.render_view()
            .iter()
            .any(|d| matches!(d.visual, Visual::VoidHole { active: true })),
        "render tag".to_owned(),
    ));
    results
}

fn validate_determinism(verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("-- determinism");
    }
    let script = |sim: &mut Simulation| {
        let mut now_ms = 0;
        for i in 0..120u32 {
            let input = if i == 10 {
                InputFrame {
                    move_x: 1,
                    move_y: 0,
                    abilities: vec![AbilityRequest {
                        name: "fireball".to_owned(),
                        target: Some(Vec2::new(450.0, 208.0)),
                    }],
                }
            } else {
                InputFrame {
                    move_x: if i < 60 { 1 } else { 0 },
                    move_y: if i >= 60 { -1 } else { 0 },
                    abilities: Vec::new(),
                }
            };
            now_ms += 16;
            sim.update(&input, now_ms);
        }
    };

    let mut a = arena_sim(42);
    let mut b = arena_sim(42);
    a.spawn_enemy_at_random();
    b.spawn_enemy_at_random();
    script(&mut a);
    script(&mut b);

    let snap_a = serde_json::to_string(&a.render_view()).unwrap_or_default();
    let snap_b = serde_json::to_string(&b.render_view()).unwrap_or_default();

    vec![check(
        "identical seeds and scripts converge",
        !snap_a.is_empty() && snap_a == snap_b,
        format!("{} bytes of snapshot", snap_a.len()),
    )]
}

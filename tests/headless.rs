//! Whole-game scenarios run without a window or renderer.

use std::path::PathBuf;
use std::time::Duration;

use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use voxel_collapse::combat::Health;
use voxel_collapse::core::{
    DamageEvent, DeathCause, DelayFieldEvent, EnemyDiedEvent, PlayState, SimulationSet,
};
use voxel_collapse::enemies::{CloudCore, Enemy};
use voxel_collapse::player::Player;
use voxel_collapse::progression::PlayerProgression;
use voxel_collapse::stage::{DifficultyContext, EnemyPopulation, Portal};
use voxel_collapse::terrain::{CollapsibleTile, TileMap, TilePhase, BURST_COLLAPSE_DELAY};
use voxel_collapse::world::{DataDir, ResolvedMonsterSpawn, StageDefinition, StageRegistry};
use voxel_collapse::SimulationPlugin;

const PLAYER_CELL: IVec3 = IVec3::new(1, 0, 1);
const ENEMY_CELL: IVec3 = IVec3::new(30, 0, 1);
const BOSS_CELL: IVec3 = IVec3::new(38, 0, 1);

/// A 40x3 strip with the player at one end and the core at the other.
fn strip_stage(monsters: &[(IVec3, &str)]) -> StageDefinition {
    let tiles = (0..40)
        .flat_map(|x| (0..3).map(move |z| IVec3::new(x, 0, z)))
        .collect();
    let monster_spawns = monsters
        .iter()
        .map(|(cell, archetype)| ResolvedMonsterSpawn {
            cell: *cell,
            archetype: archetype.to_string(),
        })
        .collect();

    StageDefinition {
        name: "Strip".to_string(),
        tile_size: 1.0,
        dead_zone_y: -12.0,
        player_start: PLAYER_CELL,
        boss: Some(BOSS_CELL),
        tiles,
        safe_zones: Vec::new(),
        monster_spawns,
        spawners: Vec::new(),
    }
}

fn test_app(stage: StageDefinition) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, InputPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_plugins(SimulationPlugin)
        // No data files: every loader keeps its defaults
        .insert_resource(DataDir(PathBuf::from("target/no-such-data-dir")))
        .insert_resource(StageRegistry {
            stages: vec![stage],
        });
    app
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn tile_at(app: &App, cell: IVec3) -> Option<Entity> {
    app.world().resource::<TileMap>().tile_at(cell)
}

fn phase_of(app: &App, cell: IVec3) -> Option<TilePhase> {
    let tile = tile_at(app, cell)?;
    app.world().get::<CollapsibleTile>(tile).map(CollapsibleTile::phase)
}

/// Run until the tile under the player has started counting down.
fn wait_for_countdown(app: &mut App) {
    for _ in 0..20 {
        app.update();
        if phase_of(app, PLAYER_CELL) == Some(TilePhase::CountingDown) {
            return;
        }
    }
    panic!("the tile under the player never started counting down");
}

fn single<C: Component>(app: &mut App) -> Option<Entity> {
    let mut query = app.world_mut().query_filtered::<Entity, With<C>>();
    query.iter(app.world()).next()
}

fn set_play_state(app: &mut App, state: PlayState) {
    app.world_mut()
        .resource_mut::<NextState<PlayState>>()
        .set(state);
}

fn play_state(app: &App) -> PlayState {
    *app.world().resource::<State<PlayState>>().get()
}

/// Opens the shop on the frame an enemy dies, like an E press landing right then.
fn open_shop_on_death(
    mut deaths: EventReader<EnemyDiedEvent>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    if deaths.read().last().is_some() {
        next_state.set(PlayState::Shop);
    }
}

fn damage(app: &mut App, target: Entity, amount: i32) {
    app.world_mut().send_event(DamageEvent {
        target,
        source: None,
        amount,
    });
}

#[test]
fn stepped_tile_collapses_and_leaves_the_map() {
    let mut app = test_app(strip_stage(&[]));
    wait_for_countdown(&mut app);

    let tile = tile_at(&app, PLAYER_CELL).unwrap();
    let total = app.world().resource::<TileMap>().len();
    assert_eq!(total, 120);

    // Default collapse delay is five seconds
    run(&mut app, 40);
    assert_eq!(phase_of(&app, PLAYER_CELL), Some(TilePhase::CountingDown));

    // Countdown plus the one-second fall
    run(&mut app, 40);
    assert_eq!(tile_at(&app, PLAYER_CELL), None);
    assert!(!app.world().entities().contains(tile));
    assert_eq!(app.world().resource::<TileMap>().len(), total - 1);

    // Neighbours were never stepped on
    assert_eq!(
        phase_of(&app, PLAYER_CELL + IVec3::X),
        Some(TilePhase::Stable)
    );
}

#[test]
fn delay_field_restarts_running_countdowns() {
    let mut app = test_app(strip_stage(&[]));
    wait_for_countdown(&mut app);

    app.world_mut().send_event(DelayFieldEvent {
        center: Vec3::new(1.0, 0.0, 1.0),
        radius: 1.1,
        delay: 20.0,
    });
    run(&mut app, 1);

    let neighbour = tile_at(&app, PLAYER_CELL + IVec3::X).unwrap();
    let neighbour_tile = app.world().get::<CollapsibleTile>(neighbour).unwrap();
    assert_eq!(neighbour_tile.phase(), TilePhase::Stable);
    assert_eq!(neighbour_tile.pending_delay(), 20.0);

    // Well past the original deadline and fall
    run(&mut app, 80);
    assert_eq!(phase_of(&app, PLAYER_CELL), Some(TilePhase::CountingDown));

    // Tiles outside the field keep the stage delay
    let far = tile_at(&app, PLAYER_CELL + IVec3::new(5, 0, 0)).unwrap();
    assert_eq!(
        app.world().get::<CollapsibleTile>(far).unwrap().pending_delay(),
        5.0
    );
}

#[test]
fn shop_freezes_tile_countdowns() {
    let mut app = test_app(strip_stage(&[]));
    wait_for_countdown(&mut app);

    set_play_state(&mut app, PlayState::Shop);
    run(&mut app, 100);
    assert_eq!(phase_of(&app, PLAYER_CELL), Some(TilePhase::CountingDown));

    set_play_state(&mut app, PlayState::Exploring);
    run(&mut app, 80);
    assert_eq!(tile_at(&app, PLAYER_CELL), None);
}

#[test]
fn clearing_enemies_exposes_the_core_and_opens_a_portal() {
    let mut app = test_app(strip_stage(&[(ENEMY_CELL, "dash")]));
    run(&mut app, 5);

    assert_eq!(app.world().resource::<EnemyPopulation>().active_count(), 1);
    let enemy = single::<Enemy>(&mut app).unwrap();
    let boss = single::<CloudCore>(&mut app).unwrap();
    assert!(app.world().get::<CloudCore>(boss).unwrap().locked);

    // Shielded while an enemy lives
    let boss_hp = app.world().get::<Health>(boss).unwrap().current();
    damage(&mut app, boss, 1000);
    run(&mut app, 1);
    assert_eq!(app.world().get::<Health>(boss).unwrap().current(), boss_hp);

    damage(&mut app, enemy, 1000);
    run(&mut app, 2);
    assert!(!app.world().entities().contains(enemy));
    assert!(app.world().resource::<EnemyPopulation>().is_cleared());
    assert!(!app.world().get::<CloudCore>(boss).unwrap().locked);
    assert_eq!(app.world().resource::<PlayerProgression>().current_exp(), 5);

    damage(&mut app, boss, 1000);
    run(&mut app, 2);
    assert!(!app.world().entities().contains(boss));
    assert!(single::<Portal>(&mut app).is_some());

    // 5 from the enemy and 20 from the core fill the first level exactly
    let progression = app.world().resource::<PlayerProgression>();
    assert_eq!(progression.current_level(), 2);
    assert_eq!(progression.current_exp(), 0);
}

#[test]
fn core_without_guards_starts_exposed() {
    let mut app = test_app(strip_stage(&[]));
    run(&mut app, 3);

    let boss = single::<CloudCore>(&mut app).unwrap();
    assert!(!app.world().get::<CloudCore>(boss).unwrap().locked);
}

#[test]
fn core_unlocks_even_if_the_shop_opens_as_the_last_enemy_dies() {
    let mut app = test_app(strip_stage(&[(ENEMY_CELL, "dash")]));
    app.add_systems(Update, open_shop_on_death.after(SimulationSet::Combat));
    run(&mut app, 5);

    let enemy = single::<Enemy>(&mut app).unwrap();
    let boss = single::<CloudCore>(&mut app).unwrap();
    damage(&mut app, enemy, 1000);
    run(&mut app, 1);
    run(&mut app, 5);
    assert_eq!(play_state(&app), PlayState::Shop);

    set_play_state(&mut app, PlayState::Exploring);
    run(&mut app, 5);
    assert!(app.world().resource::<EnemyPopulation>().is_cleared());
    assert!(!app.world().get::<CloudCore>(boss).unwrap().locked);
}

#[test]
fn bomber_blast_lands_even_if_the_shop_opens_on_detonation() {
    let bomber_cell = PLAYER_CELL + IVec3::new(2, 0, 0);
    let blast_cell = PLAYER_CELL + IVec3::new(3, 0, 0);
    let mut app = test_app(strip_stage(&[(bomber_cell, "enemy")]));
    app.add_systems(Update, open_shop_on_death.after(SimulationSet::Combat));

    run(&mut app, 1);
    assert!(tile_at(&app, blast_cell).is_some());
    for _ in 0..30 {
        app.update();
        if play_state(&app) == PlayState::Shop {
            break;
        }
    }
    assert_eq!(play_state(&app), PlayState::Shop);
    assert!(single::<Enemy>(&mut app).is_none());

    run(&mut app, 5);
    set_play_state(&mut app, PlayState::Exploring);
    run(&mut app, 3);

    // Burst tiles drop out of the map as soon as they start falling
    assert_eq!(tile_at(&app, blast_cell), None);
    let progression = app.world().resource::<PlayerProgression>();
    assert!(progression.current_hp() < progression.max_hp());
    // Self-destruction pays nothing
    assert_eq!(progression.current_exp(), 0);
}

#[test]
fn portal_leads_to_a_harder_rebuilt_stage() {
    let mut app = test_app(strip_stage(&[(ENEMY_CELL, "dash")]));
    run(&mut app, 5);
    let first_delay = app.world().resource::<DifficultyContext>().collapse_delay();

    let enemy = single::<Enemy>(&mut app).unwrap();
    damage(&mut app, enemy, 1000);
    run(&mut app, 2);
    let boss = single::<CloudCore>(&mut app).unwrap();
    damage(&mut app, boss, 1000);
    run(&mut app, 2);

    let portal = single::<Portal>(&mut app).unwrap();
    let portal_pos = app.world().get::<Transform>(portal).unwrap().translation;
    let player = single::<Player>(&mut app).unwrap();
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = portal_pos;
    run(&mut app, 4);

    let difficulty = app.world().resource::<DifficultyContext>();
    assert_eq!(difficulty.stage_level(), 2);
    let delay = difficulty.collapse_delay();
    assert!(delay < first_delay);

    assert!(single::<Portal>(&mut app).is_none());
    let population = app.world().resource::<EnemyPopulation>();
    assert_eq!(population.active_count(), 1);
    assert!(!population.is_cleared());
    let boss = single::<CloudCore>(&mut app).unwrap();
    assert!(app.world().get::<CloudCore>(boss).unwrap().locked);

    // Every tile is rebuilt with the new delay
    assert_eq!(app.world().resource::<TileMap>().len(), 120);
    let far = tile_at(&app, PLAYER_CELL + IVec3::new(5, 0, 0)).unwrap();
    assert_eq!(
        app.world().get::<CollapsibleTile>(far).unwrap().pending_delay(),
        delay
    );
}

#[test]
fn enemy_dropped_by_collapsed_ground_is_removed_without_experience() {
    let mut app = test_app(strip_stage(&[(ENEMY_CELL, "dash")]));
    app.add_systems(Update, record_deaths.after(SimulationSet::Combat))
        .init_resource::<RecordedDeaths>();
    run(&mut app, 3);

    let enemy = single::<Enemy>(&mut app).unwrap();
    let ground = tile_at(&app, ENEMY_CELL).unwrap();
    app.world_mut()
        .get_mut::<CollapsibleTile>(ground)
        .unwrap()
        .force_collapse(BURST_COLLAPSE_DELAY);
    run(&mut app, 30);

    assert!(!app.world().entities().contains(enemy));
    let population = app.world().resource::<EnemyPopulation>();
    assert_eq!(population.active_count(), 0);
    assert!(population.is_cleared());
    assert_eq!(app.world().resource::<PlayerProgression>().current_exp(), 0);
    assert_eq!(
        app.world().resource::<RecordedDeaths>().0,
        vec![DeathCause::Environment]
    );
}

#[derive(Resource, Default)]
struct RecordedDeaths(Vec<DeathCause>);

fn record_deaths(mut deaths: EventReader<EnemyDiedEvent>, mut recorded: ResMut<RecordedDeaths>) {
    recorded.0.extend(deaths.read().map(|event| event.cause));
}

//! In-game HUD - HP, experience, stage and skill display.

use bevy::prelude::*;

use crate::core::{AllClearedEvent, GameState, LevelUpEvent, StageAdvancedEvent};
use crate::player::{DelayFieldSkill, Player};
use crate::progression::PlayerProgression;
use crate::stage::{DifficultyContext, EnemyPopulation};

/// Marker for HUD root entity.
#[derive(Component)]
pub struct HudRoot;

/// Marker for health bar fill.
#[derive(Component)]
pub struct HealthBar;

/// Marker for experience bar fill.
#[derive(Component)]
pub struct ExperienceBar;

/// Marker for the status line.
#[derive(Component)]
pub struct StatusText;

/// Seconds a banner stays up.
const BANNER_SECS: f32 = 2.5;

/// Centered announcement for level-ups, new stages and the exposed core.
#[derive(Component, Default)]
pub struct Banner {
    timer: Option<Timer>,
}

/// Setup HUD systems.
pub fn setup_hud_systems(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_hud)
        .add_systems(OnExit(GameState::InGame), cleanup_hud)
        .add_systems(
            Update,
            (update_bars, update_status_text, show_banner).run_if(in_state(GameState::InGame)),
        );
}

/// Spawn the HUD UI.
fn spawn_hud(mut commands: Commands) {
    // HUD root container (bottom-left corner)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::End,
                align_items: AlignItems::Start,
                padding: UiRect::all(Val::Px(20.0)),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.5)),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Percent(20.0),
                    align_self: AlignSelf::Center,
                    ..default()
                },
                Banner::default(),
            ));

            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.95, 0.95)),
                Node {
                    margin: UiRect::bottom(Val::Px(8.0)),
                    ..default()
                },
                StatusText,
            ));

            spawn_bar(parent, "EXP", Color::srgb(0.3, 0.6, 0.95), ExperienceBar);
            spawn_bar(parent, "HP", Color::srgb(0.8, 0.2, 0.2), HealthBar);
        });
}

/// Helper to spawn a status bar.
fn spawn_bar<M: Component>(parent: &mut ChildBuilder, label: &str, color: Color, bar_marker: M) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            margin: UiRect::bottom(Val::Px(5.0)),
            ..default()
        })
        .with_children(|bar_parent| {
            // Label
            bar_parent.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    width: Val::Px(40.0),
                    ..default()
                },
            ));

            // Bar background
            bar_parent
                .spawn((
                    Node {
                        width: Val::Px(200.0),
                        height: Val::Px(12.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
                ))
                .with_children(|bg| {
                    // Bar fill
                    bg.spawn((
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(color),
                        bar_marker,
                    ));
                });
        });
}

/// Resize the HP and EXP bars from the progression model.
fn update_bars(
    progression: Res<PlayerProgression>,
    mut health_bar: Query<&mut Node, (With<HealthBar>, Without<ExperienceBar>)>,
    mut exp_bar: Query<&mut Node, (With<ExperienceBar>, Without<HealthBar>)>,
) {
    if let Ok(mut bar) = health_bar.get_single_mut() {
        bar.width = Val::Percent(progression.hp_ratio().clamp(0.0, 1.0) * 100.0);
    }
    if let Ok(mut bar) = exp_bar.get_single_mut() {
        bar.width = Val::Percent(progression.exp_ratio().clamp(0.0, 1.0) * 100.0);
    }
}

/// Level, stage, collapse delay and skill readiness.
fn update_status_text(
    progression: Res<PlayerProgression>,
    difficulty: Res<DifficultyContext>,
    population: Res<EnemyPopulation>,
    skill_query: Query<&DelayFieldSkill, With<Player>>,
    mut text_query: Query<&mut Text, With<StatusText>>,
) {
    let Ok(mut text) = text_query.get_single_mut() else {
        return;
    };

    let skill = match skill_query.get_single().ok().and_then(|s| s.remaining_secs()) {
        Some(remaining) => format!("{:.0}s", remaining.ceil()),
        None => "ready".to_string(),
    };
    let enemies = if population.is_cleared() {
        "core exposed".to_string()
    } else {
        format!("{} enemies", population.active_count())
    };

    text.0 = format!(
        "Lv {}  HP {}/{}  |  Stage {}  collapse {:.1}s  |  {}  |  [Q] field {}",
        progression.current_level(),
        progression.current_hp(),
        progression.max_hp(),
        difficulty.stage_level(),
        difficulty.collapse_delay(),
        enemies,
        skill,
    );
}

/// Announce level-ups, stage changes and the exposed core, then clear the banner.
fn show_banner(
    time: Res<Time>,
    mut level_events: EventReader<LevelUpEvent>,
    mut stage_events: EventReader<StageAdvancedEvent>,
    mut cleared_events: EventReader<AllClearedEvent>,
    mut banner_query: Query<(&mut Text, &mut Banner)>,
) {
    let Ok((mut text, mut banner)) = banner_query.get_single_mut() else {
        return;
    };

    let message = stage_events
        .read()
        .last()
        .map(|event| {
            format!(
                "Stage {} - tiles fall after {:.1}s",
                event.stage_level, event.collapse_delay
            )
        })
        .or_else(|| {
            level_events
                .read()
                .last()
                .map(|event| format!("Level {}!", event.new_level))
        })
        .or_else(|| {
            cleared_events
                .read()
                .last()
                .map(|_| "The cloud core is exposed".to_string())
        });

    if let Some(message) = message {
        text.0 = message;
        banner.timer = Some(Timer::from_seconds(BANNER_SECS, TimerMode::Once));
    } else if banner
        .timer
        .as_mut()
        .is_some_and(|timer| timer.tick(time.delta()).finished())
    {
        banner.timer = None;
        text.0.clear();
    }
}

/// Clean up HUD entities.
fn cleanup_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

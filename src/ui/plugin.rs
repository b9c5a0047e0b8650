//! UI plugin - HUD and the shop panel.

use bevy::prelude::*;

use super::hud;
use crate::core::{PlayState, UpgradeRequestEvent};
use crate::progression::PlayerProgression;

/// UI plugin - handles all user interface.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Setup HUD systems
        hud::setup_hud_systems(app);

        app
            // Shop panel
            .add_systems(OnEnter(PlayState::Shop), setup_shop_panel)
            .add_systems(
                Update,
                (shop_button_input, update_shop_text).run_if(in_state(PlayState::Shop)),
            )
            .add_systems(OnExit(PlayState::Shop), cleanup_shop_panel);
    }
}

/// Marker for shop panel UI entities.
#[derive(Component)]
struct ShopUi;

/// Marker for the line listing costs and available levels.
#[derive(Component)]
struct ShopText;

/// Marker for shop buttons.
#[derive(Component, Clone, Copy)]
enum ShopButton {
    MaxHp,
    AttackPower,
}

impl ShopButton {
    fn request(self) -> UpgradeRequestEvent {
        match self {
            ShopButton::MaxHp => UpgradeRequestEvent::MaxHp,
            ShopButton::AttackPower => UpgradeRequestEvent::AttackPower,
        }
    }
}

/// Set up the shop panel.
fn setup_shop_panel(mut commands: Commands) {
    // Semi-transparent overlay
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            ShopUi,
        ))
        .with_children(|parent| {
            // Title
            parent.spawn((
                Text::new("SHOP"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.9)),
                Node {
                    margin: UiRect::bottom(Val::Px(20.0)),
                    ..default()
                },
            ));

            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.85)),
                Node {
                    margin: UiRect::bottom(Val::Px(20.0)),
                    ..default()
                },
                ShopText,
            ));

            spawn_shop_button(parent, "[1] Max HP", ShopButton::MaxHp);
            spawn_shop_button(parent, "[2] Attack", ShopButton::AttackPower);

            parent.spawn((
                Text::new("[E] Close"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.65)),
            ));
        });
}

/// Helper to spawn a shop button.
fn spawn_shop_button(parent: &mut ChildBuilder, text: &str, button: ShopButton) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(220.0),
                height: Val::Px(50.0),
                margin: UiRect::all(Val::Px(10.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.15, 0.15, 0.2)),
            button,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(text),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.85)),
            ));
        });
}

/// Handle shop button interactions.
fn shop_button_input(
    mut interaction_query: Query<
        (&Interaction, &ShopButton, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    mut upgrade_events: EventWriter<UpgradeRequestEvent>,
) {
    for (interaction, button, mut bg_color) in interaction_query.iter_mut() {
        match interaction {
            Interaction::Pressed => {
                *bg_color = Color::srgb(0.3, 0.3, 0.35).into();
                upgrade_events.send(button.request());
            }
            Interaction::Hovered => {
                *bg_color = Color::srgb(0.25, 0.25, 0.3).into();
            }
            Interaction::None => {
                *bg_color = Color::srgb(0.15, 0.15, 0.2).into();
            }
        }
    }
}

/// Show costs and what the player can afford.
fn update_shop_text(
    progression: Res<PlayerProgression>,
    mut text_query: Query<&mut Text, With<ShopText>>,
) {
    let Ok(mut text) = text_query.get_single_mut() else {
        return;
    };

    text.0 = format!(
        "Levels to spend: {}\nMax HP {} (cost {})   Attack {} (cost {})",
        progression.current_level(),
        progression.max_hp(),
        progression.hp_upgrade_cost(),
        progression.attack_damage(),
        progression.attack_upgrade_cost(),
    );
}

/// Clean up shop panel entities.
fn cleanup_shop_panel(mut commands: Commands, query: Query<Entity, With<ShopUi>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

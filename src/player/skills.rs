//! Player skills, shooting and the shop toggle.

use bevy::prelude::*;

use super::components::*;
use crate::combat::{spawn_projectile, Faction, Projectile};
use crate::core::{DelayFieldEvent, PlayState, UpgradeRequestEvent};
use crate::progression::PlayerProgression;
use crate::world::MeshAssets;

/// Run skill and weapon cooldowns.
pub fn tick_cooldowns(time: Res<Time>, mut query: Query<(&mut DelayFieldSkill, &mut Blaster)>) {
    for (mut skill, mut blaster) in query.iter_mut() {
        tick_cooldown(&mut skill.cooldown, time.delta());
        tick_cooldown(&mut blaster.cooldown, time.delta());
    }
}

/// Q: slow down the collapse of every tile around the player.
pub fn cast_delay_field(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&Transform, &mut DelayFieldSkill), With<Player>>,
    mut field_events: EventWriter<DelayFieldEvent>,
) {
    if !keyboard.just_pressed(KeyCode::KeyQ) {
        return;
    }
    let Ok((transform, mut skill)) = query.get_single_mut() else {
        return;
    };

    if !skill.try_use() {
        debug!("Delay field still cooling down");
        return;
    }

    field_events.send(DelayFieldEvent {
        center: transform.translation - Vec3::Y * PLAYER_FOOT_OFFSET,
        radius: skill.radius,
        delay: skill.delay,
    });
}

/// Left click: shoot where the player faces.
pub fn shoot(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    progression: Res<PlayerProgression>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
    mut query: Query<(Entity, &Transform, &mut Blaster), With<Player>>,
) {
    if !mouse.pressed(MouseButton::Left) {
        return;
    }
    let Ok((player, transform, mut blaster)) = query.get_single_mut() else {
        return;
    };
    if blaster.cooldown.is_some() {
        return;
    }
    blaster.cooldown = Some(Timer::from_seconds(blaster.fire_interval, TimerMode::Once));

    let direction = transform.forward().as_vec3();
    let mut assets = MeshAssets::from_resources(meshes.as_deref_mut(), materials.as_deref_mut());
    spawn_projectile(
        &mut commands,
        transform.translation + direction * 0.6,
        Projectile {
            velocity: direction * blaster.speed,
            damage: progression.attack_damage() as i32,
            lifetime: blaster.lifetime,
            faction: Faction::Player,
            burn: None,
            source: Some(player),
        },
        assets.as_mut(),
    );
}

/// E: open or close the shop. The simulation is paused while it is open.
pub fn toggle_shop(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<PlayState>>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyE) {
        return;
    }

    match state.get() {
        PlayState::Exploring => {
            info!("Shop opened");
            next_state.set(PlayState::Shop);
        }
        PlayState::Shop => {
            info!("Shop closed");
            next_state.set(PlayState::Exploring);
        }
    }
}

/// 1 / 2 in the shop: buy max HP or attack power.
pub fn shop_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut upgrade_events: EventWriter<UpgradeRequestEvent>,
) {
    if keyboard.just_pressed(KeyCode::Digit1) {
        upgrade_events.send(UpgradeRequestEvent::MaxHp);
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        upgrade_events.send(UpgradeRequestEvent::AttackPower);
    }
}

//! Progression plugin - config loading and shop upgrade requests.

use bevy::prelude::*;

use super::model::{PlayerProgression, ProgressionConfig};
use crate::core::{GameState, UpgradeRequestEvent};
use crate::world::{read_ron_file, DataDir, DataLoadError};

const PROGRESSION_CONFIG_FILE: &str = "progression.ron";

/// Progression plugin - owns the player's level, experience and stats.
pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerProgression>()
            .add_systems(Startup, load_progression_config)
            // The shop is usable while gameplay is paused
            .add_systems(
                Update,
                handle_upgrade_requests.run_if(in_state(GameState::InGame)),
            );
    }
}

fn load_progression_config(data_dir: Res<DataDir>, mut progression: ResMut<PlayerProgression>) {
    let path = data_dir.join(PROGRESSION_CONFIG_FILE);
    match read_ron_file::<ProgressionConfig>(&path) {
        Ok(config) => {
            info!("Loaded progression config from {:?}", path);
            *progression = PlayerProgression::new(config);
        }
        Err(DataLoadError::FileNotFound(path)) => {
            warn!("Progression config {} not found, using defaults", path);
        }
        Err(e) => {
            error!("{}. Using default progression.", e);
        }
    }
}

/// Route shop button presses to the progression model.
fn handle_upgrade_requests(
    mut requests: EventReader<UpgradeRequestEvent>,
    mut progression: ResMut<PlayerProgression>,
) {
    for request in requests.read() {
        let upgraded = match request {
            UpgradeRequestEvent::MaxHp => progression.try_upgrade_max_hp(),
            UpgradeRequestEvent::AttackPower => progression.try_upgrade_attack_power(),
        };

        if upgraded {
            info!(
                "Upgrade {:?} bought: max HP {}, attack {}, {} level(s) left",
                request,
                progression.max_hp(),
                progression.attack_damage(),
                progression.current_level()
            );
        } else {
            debug!("Upgrade {:?} rejected: not enough levels", request);
        }
    }
}

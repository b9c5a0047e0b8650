//! Stage data structures and RON loading.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::DataLoadError;

/// Root directory of the RON data files.
#[derive(Resource, Debug, Clone)]
pub struct DataDir(pub PathBuf);

impl Default for DataDir {
    fn default() -> Self {
        Self(PathBuf::from("assets/data"))
    }
}

impl DataDir {
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }
}

/// Read and deserialize a single RON file.
pub fn read_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

// === Raw Types ===

fn default_tile_size() -> f32 {
    1.0
}

fn default_dead_zone() -> f32 {
    -12.0
}

/// One horizontal layer of voxels.
///
/// `floor` rows run along +Z, characters along +X:
/// - `#` collapsible tile
/// - `S` collapsible tile with a safe zone on top
/// - `.` or space: empty
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDef {
    /// Voxel Y coordinate of this layer
    pub height: i32,
    pub floor: Vec<String>,
    /// Optional monster grid with the same dimensions as `floor`;
    /// monsters stand on top of the tile below them
    #[serde(default)]
    pub monsters: Vec<String>,
}

/// Periodic enemy spawner.
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnerDef {
    /// Cell the spawner is centered on (x, y, z)
    pub cell: (i32, i32, i32),
    pub archetype: String,
    #[serde(default = "default_spawn_interval")]
    pub interval: f32,
    #[serde(default = "default_spawn_range")]
    pub range: f32,
    #[serde(default = "default_max_spawns")]
    pub max_spawns: u32,
}

fn default_spawn_interval() -> f32 {
    3.0
}

fn default_spawn_range() -> f32 {
    5.0
}

fn default_max_spawns() -> u32 {
    10
}

/// Raw stage definition as read from RON.
#[derive(Debug, Clone, Deserialize)]
pub struct StageDefinitionRaw {
    pub name: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Anything below this height is removed (enemies) or respawned (player)
    #[serde(default = "default_dead_zone")]
    pub dead_zone_y: f32,
    /// Cell of the tile the player starts on
    pub player_start: (i32, i32, i32),
    /// Cell of the tile the cloud core floats above
    #[serde(default)]
    pub boss: Option<(i32, i32, i32)>,
    #[serde(default)]
    pub monster_palette: HashMap<char, String>,
    pub layers: Vec<LayerDef>,
    #[serde(default)]
    pub spawners: Vec<SpawnerDef>,
}

// === Resolved Types ===

/// A monster placement resolved from a layer's monster grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMonsterSpawn {
    /// Cell of the tile the monster stands on
    pub cell: IVec3,
    /// Archetype identifier (matches EnemyRegistry key)
    pub archetype: String,
}

/// A fully resolved stage.
#[derive(Debug, Clone)]
pub struct StageDefinition {
    pub name: String,
    pub tile_size: f32,
    pub dead_zone_y: f32,
    pub player_start: IVec3,
    pub boss: Option<IVec3>,
    pub tiles: Vec<IVec3>,
    pub safe_zones: Vec<IVec3>,
    pub monster_spawns: Vec<ResolvedMonsterSpawn>,
    pub spawners: Vec<SpawnerDef>,
}

impl StageDefinition {
    /// Resolve character grids into cell lists.
    pub fn from_raw(raw: StageDefinitionRaw) -> Result<Self, DataLoadError> {
        let mut tiles = Vec::new();
        let mut safe_zones = Vec::new();
        let mut monster_spawns = Vec::new();

        for layer in &raw.layers {
            for (z, row) in layer.floor.iter().enumerate() {
                for (x, c) in row.chars().enumerate() {
                    let cell = IVec3::new(x as i32, layer.height, z as i32);
                    match c {
                        '#' => tiles.push(cell),
                        'S' => {
                            tiles.push(cell);
                            safe_zones.push(cell);
                        }
                        '.' | ' ' => {}
                        other => {
                            return Err(DataLoadError::UnknownPaletteEntry {
                                character: other,
                                x,
                                z,
                            })
                        }
                    }
                }
            }

            if layer.monsters.is_empty() {
                continue;
            }

            let floor_depth = layer.floor.len();
            let floor_width = grid_width(&layer.floor);
            let monster_depth = layer.monsters.len();
            let monster_width = grid_width(&layer.monsters);
            if floor_depth != monster_depth || floor_width != monster_width {
                return Err(DataLoadError::GridMismatch {
                    layer: layer.height,
                    floor_width,
                    floor_depth,
                    monster_width,
                    monster_depth,
                });
            }

            for (z, row) in layer.monsters.iter().enumerate() {
                for (x, c) in row.chars().enumerate() {
                    if c == '.' || c == ' ' {
                        continue;
                    }
                    let Some(archetype) = raw.monster_palette.get(&c) else {
                        return Err(DataLoadError::UnknownPaletteEntry { character: c, x, z });
                    };
                    monster_spawns.push(ResolvedMonsterSpawn {
                        cell: IVec3::new(x as i32, layer.height, z as i32),
                        archetype: archetype.clone(),
                    });
                }
            }
        }

        let (px, py, pz) = raw.player_start;
        Ok(Self {
            name: raw.name,
            tile_size: raw.tile_size,
            dead_zone_y: raw.dead_zone_y,
            player_start: IVec3::new(px, py, pz),
            boss: raw.boss.map(|(x, y, z)| IVec3::new(x, y, z)),
            tiles,
            safe_zones,
            monster_spawns,
            spawners: raw.spawners,
        })
    }

    /// Built-in stage used when no stage files are present.
    pub fn builtin() -> Self {
        let floor: Vec<String> = (0..14)
            .map(|z| {
                (0..14)
                    .map(|x| match (x, z) {
                        (1, 1) => 'S',
                        (6..=7, 6..=7) => '.',
                        _ => '#',
                    })
                    .collect()
            })
            .collect();

        let mut monsters = vec![".".repeat(14); 14];
        for (x, z, c) in [(11, 2, 'e'), (3, 11, 't'), (11, 11, 'f'), (10, 6, 'd'), (4, 7, 'p')] {
            monsters[z].replace_range(x..x + 1, &c.to_string());
        }

        let raw = StageDefinitionRaw {
            name: "Sky Platform".to_string(),
            tile_size: default_tile_size(),
            dead_zone_y: default_dead_zone(),
            player_start: (1, 0, 1),
            boss: Some((12, 0, 12)),
            monster_palette: HashMap::from([
                ('e', "enemy".to_string()),
                ('d', "dash".to_string()),
                ('f', "fire".to_string()),
                ('t', "tnt".to_string()),
                ('p', "teleport".to_string()),
            ]),
            layers: vec![LayerDef {
                height: 0,
                floor,
                monsters,
            }],
            spawners: Vec::new(),
        };

        // The grids above are well-formed by construction
        Self::from_raw(raw).unwrap_or_else(|e| {
            error!("Built-in stage is invalid: {}", e);
            Self::empty()
        })
    }

    fn empty() -> Self {
        Self {
            name: "Empty".to_string(),
            tile_size: default_tile_size(),
            dead_zone_y: default_dead_zone(),
            player_start: IVec3::ZERO,
            boss: None,
            tiles: vec![IVec3::ZERO],
            safe_zones: Vec::new(),
            monster_spawns: Vec::new(),
            spawners: Vec::new(),
        }
    }
}

fn grid_width(rows: &[String]) -> usize {
    rows.iter().map(|row| row.chars().count()).max().unwrap_or(0)
}

/// All loaded stages, played in file-name order and cycled.
#[derive(Resource, Debug)]
pub struct StageRegistry {
    pub stages: Vec<StageDefinition>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self {
            stages: vec![StageDefinition::builtin()],
        }
    }
}

impl StageRegistry {
    /// Stage to build for a 1-based stage level.
    pub fn for_stage_level(&self, stage_level: u32) -> Option<&StageDefinition> {
        if self.stages.is_empty() {
            return None;
        }
        let index = (stage_level.max(1) - 1) as usize % self.stages.len();
        self.stages.get(index)
    }
}

/// Load all stage definitions from `<data dir>/levels/`.
///
/// Keeps the current registry (the built-in stage by default) when no file loads.
pub fn load_stage_definitions(data_dir: Res<DataDir>, mut registry: ResMut<StageRegistry>) {
    let stages_path = data_dir.join("levels");
    let mut loaded = Vec::new();

    match fs::read_dir(&stages_path) {
        Ok(entries) => {
            let mut paths: Vec<_> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
                .collect();
            paths.sort();

            for path in paths {
                match read_ron_file::<StageDefinitionRaw>(&path).and_then(StageDefinition::from_raw) {
                    Ok(stage) => {
                        info!("Loaded stage: {}", stage.name);
                        loaded.push(stage);
                    }
                    Err(e) => {
                        error!("Failed to load stage {:?}: {}", path, e);
                    }
                }
            }
        }
        Err(_) => {
            warn!("Levels directory not found: {:?}", stages_path);
        }
    }

    if loaded.is_empty() {
        warn!("No stage files loaded, keeping {} stage(s)", registry.stages.len());
        return;
    }

    info!("Loaded {} stage(s)", loaded.len());
    registry.stages = loaded;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with(floor: &[&str], monsters: &[&str]) -> StageDefinitionRaw {
        StageDefinitionRaw {
            name: "test".to_string(),
            tile_size: 1.0,
            dead_zone_y: -10.0,
            player_start: (0, 0, 0),
            boss: None,
            monster_palette: HashMap::from([('e', "enemy".to_string())]),
            layers: vec![LayerDef {
                height: 2,
                floor: floor.iter().map(|s| s.to_string()).collect(),
                monsters: monsters.iter().map(|s| s.to_string()).collect(),
            }],
            spawners: Vec::new(),
        }
    }

    #[test]
    fn resolves_tiles_safe_zones_and_monsters() {
        let stage = StageDefinition::from_raw(raw_with(&["#S", ".#"], &["e.", ".."])).unwrap();

        assert_eq!(stage.tiles.len(), 3);
        assert_eq!(stage.safe_zones, vec![IVec3::new(1, 2, 0)]);
        assert_eq!(
            stage.monster_spawns,
            vec![ResolvedMonsterSpawn {
                cell: IVec3::new(0, 2, 0),
                archetype: "enemy".to_string(),
            }]
        );
    }

    #[test]
    fn rejects_mismatched_monster_grid() {
        let result = StageDefinition::from_raw(raw_with(&["##", "##"], &["e"]));
        assert!(matches!(result, Err(DataLoadError::GridMismatch { .. })));
    }

    #[test]
    fn rejects_unknown_monster_character() {
        let result = StageDefinition::from_raw(raw_with(&["##"], &["x."]));
        assert!(matches!(
            result,
            Err(DataLoadError::UnknownPaletteEntry { character: 'x', .. })
        ));
    }

    #[test]
    fn builtin_stage_has_ground_under_everyone() {
        let stage = StageDefinition::builtin();
        assert!(stage.tiles.contains(&stage.player_start));
        for spawn in &stage.monster_spawns {
            assert!(stage.tiles.contains(&spawn.cell), "{:?} has no tile", spawn);
        }
    }

    #[test]
    fn registry_cycles_through_stages() {
        let registry = StageRegistry {
            stages: vec![StageDefinition::builtin(), StageDefinition::empty()],
        };
        assert_eq!(registry.for_stage_level(1).unwrap().name, "Sky Platform");
        assert_eq!(registry.for_stage_level(2).unwrap().name, "Empty");
        assert_eq!(registry.for_stage_level(3).unwrap().name, "Sky Platform");
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let result = read_ron_file::<StageDefinitionRaw>(Path::new("does/not/exist.ron"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound(_))));
    }
}

//! World module - stage data, stage construction and shared visuals.

mod builder;
mod data;
mod error;
mod plugin;
mod visuals;

pub use builder::{build_stage, ActiveStage, BuiltStage, SafeZone, StageEntity};
pub use data::{
    read_ron_file, DataDir, LayerDef, ResolvedMonsterSpawn, SpawnerDef, StageDefinition,
    StageDefinitionRaw, StageRegistry,
};
pub use error::DataLoadError;
pub use plugin::{setup_stage, WorldPlugin};
pub use visuals::{rgb, MeshAssets};

//! Terrain module - collapsible tiles and the map of standing ground.

mod map;
mod plugin;
mod systems;
mod tile;

pub use map::{TileMap, DEFAULT_TILE_SIZE, GROUND_PROBE_LIFT};
pub use plugin::TerrainPlugin;
pub use systems::TileTint;
pub use tile::{
    CollapsibleTile, TileCell, TilePhase, TileState, BURST_COLLAPSE_DELAY, FALL_DISTANCE,
    FALL_DURATION,
};

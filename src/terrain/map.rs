//! Spatial index of standing tiles.

use bevy::prelude::*;
use std::collections::HashMap;

/// Default edge length of a voxel.
pub const DEFAULT_TILE_SIZE: f32 = 1.0;

/// How far above a point the ground probe starts.
pub const GROUND_PROBE_LIFT: f32 = 0.1;

/// Cells holding a tile that can still be stood on.
///
/// A tile leaves the map the moment it starts falling, so everything that
/// asks "is there ground here" sees it disappear at once.
#[derive(Resource, Debug, Clone)]
pub struct TileMap {
    tile_size: f32,
    tiles: HashMap<IVec3, Entity>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl TileMap {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size: tile_size.max(f32::EPSILON),
            tiles: HashMap::new(),
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn insert(&mut self, cell: IVec3, tile: Entity) {
        self.tiles.insert(cell, tile);
    }

    pub fn remove(&mut self, cell: IVec3) -> Option<Entity> {
        self.tiles.remove(&cell)
    }

    /// Drop every tile and switch to a new voxel size.
    pub fn reset(&mut self, tile_size: f32) {
        self.tiles.clear();
        self.tile_size = tile_size.max(f32::EPSILON);
    }

    pub fn tile_at(&self, cell: IVec3) -> Option<Entity> {
        self.tiles.get(&cell).copied()
    }

    /// Cell whose cube contains `position`.
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        (position / self.tile_size).round().as_ivec3()
    }

    pub fn cell_center(&self, cell: IVec3) -> Vec3 {
        cell.as_vec3() * self.tile_size
    }

    /// Height of the top face of tiles in layer `cell_y`.
    pub fn surface_height(&self, cell_y: i32) -> f32 {
        (cell_y as f32 + 0.5) * self.tile_size
    }

    /// Top surface of the highest tile straight below `position`.
    ///
    /// Searches from slightly above `position` down to `max_distance` below it.
    pub fn ground_below(&self, position: Vec3, max_distance: f32) -> Option<f32> {
        let column = self.cell_of(position);
        let lowest = position.y - max_distance;
        let top = ((position.y + GROUND_PROBE_LIFT) / self.tile_size - 0.5).floor() as i32;
        let bottom = (lowest / self.tile_size - 0.5).floor() as i32;

        (bottom..=top)
            .rev()
            .map(|y| (y, self.surface_height(y)))
            .filter(|(_, surface)| *surface >= lowest && *surface <= position.y + GROUND_PROBE_LIFT)
            .find(|(y, _)| self.tiles.contains_key(&IVec3::new(column.x, *y, column.z)))
            .map(|(_, surface)| surface)
    }

    /// Standing tiles whose center lies within `radius` of `center`.
    pub fn tiles_within(&self, center: Vec3, radius: f32) -> Vec<Entity> {
        let radius_sq = radius * radius;
        self.tiles
            .iter()
            .filter(|(cell, _)| self.cell_center(**cell).distance_squared(center) <= radius_sq)
            .map(|(_, entity)| *entity)
            .collect()
    }

    /// Standing tile whose cube contains `position`.
    pub fn tile_containing(&self, position: Vec3) -> Option<Entity> {
        self.tile_at(self.cell_of(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(cells: &[IVec3]) -> TileMap {
        let mut map = TileMap::new(1.0);
        for (i, cell) in cells.iter().enumerate() {
            map.insert(*cell, Entity::from_raw(i as u32));
        }
        map
    }

    #[test]
    fn ground_below_finds_surface_under_feet() {
        let map = map_with(&[IVec3::new(2, 0, 3)]);
        assert_eq!(map.ground_below(Vec3::new(2.2, 0.55, 2.9), 1.0), Some(0.5));
        assert_eq!(map.ground_below(Vec3::new(2.2, 0.55, 4.0), 1.0), None);
    }

    #[test]
    fn ground_below_respects_probe_distance() {
        let map = map_with(&[IVec3::new(0, 0, 0)]);
        assert_eq!(map.ground_below(Vec3::new(0.0, 3.0, 0.0), 1.0), None);
        assert_eq!(map.ground_below(Vec3::new(0.0, 3.0, 0.0), 3.0), Some(0.5));
    }

    #[test]
    fn ground_below_prefers_highest_layer() {
        let map = map_with(&[IVec3::new(0, 0, 0), IVec3::new(0, 2, 0)]);
        assert_eq!(map.ground_below(Vec3::new(0.0, 2.6, 0.0), 5.0), Some(2.5));
        // Standing between the layers only sees the lower one
        assert_eq!(map.ground_below(Vec3::new(0.0, 1.0, 0.0), 5.0), Some(0.5));
    }

    #[test]
    fn tiles_within_uses_cell_centers() {
        let map = map_with(&[IVec3::new(0, 0, 0), IVec3::new(1, 0, 0), IVec3::new(4, 0, 0)]);
        assert_eq!(map.tiles_within(Vec3::ZERO, 1.5).len(), 2);
        assert_eq!(map.tiles_within(Vec3::ZERO, 5.0).len(), 3);
    }

    #[test]
    fn removed_tiles_are_not_ground() {
        let mut map = map_with(&[IVec3::ZERO]);
        map.remove(IVec3::ZERO);
        assert_eq!(map.ground_below(Vec3::new(0.0, 0.5, 0.0), 1.0), None);
        assert!(map.is_empty());
    }
}

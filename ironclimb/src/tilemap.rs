//! Tile-based levels loaded from Tiled JSON (`.tmj`) maps.
//!
//! Only what the game needs is kept: orthogonal, finite maps with tile layers
//! stored as plain gid arrays, and embedded tilesets whose tiles may carry the
//! boolean properties `collide` (solid ground) and `coletavel` (collectible).

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{GameError, GameResult};
use crate::math::{Rect, Vec2};

/// Tiled stores flip/rotation flags in the top four bits of each gid.
const GID_MASK: u32 = 0x0FFF_FFFF;

/// Boolean properties a tile may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileProperties {
    /// Solid for bodies that collide with the layer.
    pub collide: bool,
    /// Can be picked up by the player.
    pub collectible: bool,
}

/// A non-empty cell of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub gid: u32,
    pub properties: TileProperties,
}

#[derive(Clone, Debug)]
pub struct Tileset {
    pub name: String,
    pub first_gid: u32,
    pub tile_count: u32,
    properties: HashMap<u32, TileProperties>,
}

impl Tileset {
    fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count
    }
}

#[derive(Clone, Debug)]
pub struct TileLayer {
    pub name: String,
    pub visible: bool,
    /// Row-major gids, 0 = empty.
    gids: Vec<u32>,
}

/// Index of a layer inside its map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

/// A parsed level. Cloning is cheap enough to give every gameplay scene its own copy.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: usize,
    height: usize,
    tile_width: f32,
    tile_height: f32,
    layers: Vec<TileLayer>,
    tilesets: Vec<Tileset>,
}

impl TileMap {
    /// Parse a Tiled JSON map.
    pub fn from_json(text: &str) -> GameResult<Self> {
        let raw: RawMap = serde_json::from_str(text).map_err(GameError::MapParse)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawMap) -> GameResult<Self> {
        if raw.infinite {
            return Err(GameError::UnsupportedMap("infinite maps".into()));
        }
        if !raw.orientation.is_empty() && raw.orientation != "orthogonal" {
            return Err(GameError::UnsupportedMap(format!(
                "{} orientation",
                raw.orientation
            )));
        }

        let mut tilesets: Vec<Tileset> = raw
            .tilesets
            .into_iter()
            .map(|ts| Tileset {
                name: ts.name,
                first_gid: ts.firstgid,
                tile_count: ts.tilecount,
                properties: ts
                    .tiles
                    .into_iter()
                    .map(|tile| (tile.id, properties_from(&tile.properties)))
                    .collect(),
            })
            .collect();
        tilesets.sort_by_key(|ts| ts.first_gid);

        let expected = raw.width.checked_mul(raw.height).ok_or_else(|| {
            GameError::UnsupportedMap(format!("{}x{} tiles", raw.width, raw.height))
        })?;
        let mut layers = Vec::new();
        for layer in raw.layers.into_iter().filter(|l| l.kind == "tilelayer") {
            if layer.data.len() != expected {
                return Err(GameError::LayerSize {
                    name: layer.name,
                    expected,
                    actual: layer.data.len(),
                });
            }
            let gids: Vec<u32> = layer.data.iter().map(|gid| gid & GID_MASK).collect();
            if let Some(&gid) = gids
                .iter()
                .find(|&&gid| gid != 0 && !tilesets.iter().any(|ts| ts.contains(gid)))
            {
                return Err(GameError::UnknownGid(gid));
            }
            layers.push(TileLayer {
                name: layer.name,
                visible: layer.visible,
                gids,
            });
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            tile_width: raw.tilewidth as f32,
            tile_height: raw.tileheight as f32,
            layers,
            tilesets,
        })
    }

    /// Map width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width_in_pixels(&self) -> f32 {
        self.width as f32 * self.tile_width
    }

    pub fn height_in_pixels(&self) -> f32 {
        self.height as f32 * self.tile_height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width_in_pixels(), self.height_in_pixels())
    }

    /// Look up a tile layer by name.
    pub fn layer_id(&self, name: &str) -> GameResult<LayerId> {
        self.layers
            .iter()
            .position(|l| l.name == name)
            .map(LayerId)
            .ok_or_else(|| GameError::MissingLayer(name.to_string()))
    }

    pub fn layer(&self, id: LayerId) -> &TileLayer {
        &self.layers[id.0]
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &TileLayer)> {
        self.layers.iter().enumerate().map(|(i, l)| (LayerId(i), l))
    }

    pub fn tileset_for(&self, gid: u32) -> Option<&Tileset> {
        self.tilesets.iter().find(|ts| ts.contains(gid))
    }

    /// Properties of a gid, defaulting to all-false for unknown or unflagged tiles.
    pub fn properties(&self, gid: u32) -> TileProperties {
        self.tileset_for(gid)
            .and_then(|ts| ts.properties.get(&(gid - ts.first_gid)).copied())
            .unwrap_or_default()
    }

    /// Tile coordinates containing a world position, if inside the map.
    pub fn world_to_tile(&self, world: Vec2) -> Option<(usize, usize)> {
        if world.x < 0.0 || world.y < 0.0 {
            return None;
        }
        let x = (world.x / self.tile_width).floor() as usize;
        let y = (world.y / self.tile_height).floor() as usize;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// World-space rectangle covered by a tile.
    pub fn tile_rect(&self, x: usize, y: usize) -> Rect {
        Rect::new(
            x as f32 * self.tile_width,
            y as f32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
    }

    pub fn tile_at(&self, layer: LayerId, x: usize, y: usize) -> Option<Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let gid = self.layers[layer.0].gids[y * self.width + x];
        (gid != 0).then(|| Tile {
            x,
            y,
            gid,
            properties: self.properties(gid),
        })
    }

    pub fn tile_at_world(&self, layer: LayerId, world: Vec2) -> Option<Tile> {
        let (x, y) = self.world_to_tile(world)?;
        self.tile_at(layer, x, y)
    }

    /// Clear a cell. Returns whether a tile was there.
    pub fn remove_tile(&mut self, layer: LayerId, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let cell = &mut self.layers[layer.0].gids[y * self.width + x];
        let had_tile = *cell != 0;
        *cell = 0;
        had_tile
    }

    pub fn is_solid(&self, layer: LayerId, x: usize, y: usize) -> bool {
        self.tile_at(layer, x, y)
            .map(|t| t.properties.collide)
            .unwrap_or(false)
    }

    /// World rectangles of the solid tiles of `layer` overlapping `area`.
    pub fn solid_rects_in(&self, layer: LayerId, area: Rect) -> Vec<Rect> {
        let mut rects = Vec::new();
        if self.width == 0 || self.height == 0 {
            return rects;
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let x0 = (area.x / self.tile_width).floor().clamp(0.0, max_x) as usize;
        let x1 = (area.right() / self.tile_width).floor().clamp(0.0, max_x) as usize;
        let y0 = (area.y / self.tile_height).floor().clamp(0.0, max_y) as usize;
        let y1 = (area.bottom() / self.tile_height).floor().clamp(0.0, max_y) as usize;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.is_solid(layer, x, y) {
                    let rect = self.tile_rect(x, y);
                    if rect.intersects(&area) {
                        rects.push(rect);
                    }
                }
            }
        }
        rects
    }

    /// Every non-empty tile of a layer, row by row.
    pub fn tiles(&self, layer: LayerId) -> impl Iterator<Item = Tile> + '_ {
        let width = self.width;
        self.layers[layer.0]
            .gids
            .iter()
            .enumerate()
            .filter(|(_, gid)| **gid != 0)
            .map(move |(i, &gid)| Tile {
                x: i % width,
                y: i / width,
                gid,
                properties: self.properties(gid),
            })
    }
}

fn properties_from(raw: &[RawProperty]) -> TileProperties {
    let flag = |name: &str| {
        raw.iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_bool())
            .unwrap_or(false)
    };
    TileProperties {
        collide: flag("collide"),
        collectible: flag("coletavel"),
    }
}

#[derive(Deserialize)]
struct RawMap {
    width: usize,
    height: usize,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    orientation: String,
    #[serde(default)]
    infinite: bool,
    layers: Vec<RawLayer>,
    #[serde(default)]
    tilesets: Vec<RawTileset>,
}

#[derive(Deserialize)]
struct RawLayer {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default = "default_visible")]
    visible: bool,
}

fn default_visible() -> bool {
    true
}

#[derive(Deserialize)]
struct RawTileset {
    firstgid: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    tiles: Vec<RawTile>,
}

#[derive(Deserialize)]
struct RawTile {
    id: u32,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Deserialize)]
struct RawProperty {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

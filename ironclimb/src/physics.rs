//! Arcade-style physics: axis-aligned bodies, per-body gravity and
//! separation against the solid tiles of one tilemap layer.

use crate::math::{Rect, Vec2};
use crate::tilemap::{LayerId, TileMap};

/// Longest time slice integrated at once. Keeps fast bodies from skipping a tile.
const MAX_SUBSTEP: f32 = 1.0 / 60.0;

/// Shrinks the cross-axis query so bodies sliding along a surface don't snag on it.
const EDGE_EPSILON: f32 = 0.01;

/// Which sides of a body were stopped during the last step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Blocked {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// An axis-aligned body. `position` is the centre of the box.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    /// Downward acceleration in px/s^2, applied while `allow_gravity` is set.
    pub gravity: f32,
    pub allow_gravity: bool,
    /// Separate from solid tiles. Turned off while climbing a ladder.
    pub collides_with_tiles: bool,
    pub collide_world_bounds: bool,
    pub blocked: Blocked,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            gravity: 0.0,
            allow_gravity: true,
            collides_with_tiles: true,
            collide_world_bounds: false,
            blocked: Blocked::default(),
        }
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    #[must_use]
    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.position, self.size)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.bounds().intersects(&other.bounds())
    }
}

/// Steps bodies against the world rectangle and one solid tile layer.
#[derive(Clone, Copy, Debug)]
pub struct ArcadePhysics {
    bounds: Rect,
    solid_layer: LayerId,
}

impl ArcadePhysics {
    pub fn new(bounds: Rect, solid_layer: LayerId) -> Self {
        Self {
            bounds,
            solid_layer,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Integrate `body` over `dt` seconds, splitting long frames into substeps.
    pub fn step(&self, body: &mut Body, map: &TileMap, dt: f32) {
        body.blocked = Blocked::default();
        if dt <= 0.0 {
            return;
        }
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let slice = dt / steps as f32;
        for _ in 0..steps {
            self.substep(body, map, slice);
        }
    }

    fn substep(&self, body: &mut Body, map: &TileMap, dt: f32) {
        if body.allow_gravity {
            body.velocity.y += body.gravity * dt;
        }

        body.position.x += body.velocity.x * dt;
        if body.collides_with_tiles && body.velocity.x != 0.0 {
            let mut probe = body.bounds();
            probe.y += EDGE_EPSILON;
            probe.h -= 2.0 * EDGE_EPSILON;
            let hits = map.solid_rects_in(self.solid_layer, probe);
            if body.velocity.x > 0.0 {
                if let Some(wall) = hits.iter().map(|r| r.x).reduce(f32::min) {
                    body.position.x = wall - body.size.x / 2.0;
                    body.velocity.x = 0.0;
                    body.blocked.right = true;
                }
            } else if let Some(wall) = hits.iter().map(|r| r.right()).reduce(f32::max) {
                body.position.x = wall + body.size.x / 2.0;
                body.velocity.x = 0.0;
                body.blocked.left = true;
            }
        }

        body.position.y += body.velocity.y * dt;
        if body.collides_with_tiles {
            let mut probe = body.bounds();
            probe.x += EDGE_EPSILON;
            probe.w -= 2.0 * EDGE_EPSILON;
            let hits = map.solid_rects_in(self.solid_layer, probe);
            if body.velocity.y >= 0.0 {
                if let Some(floor) = hits.iter().map(|r| r.y).reduce(f32::min) {
                    body.position.y = floor - body.size.y / 2.0;
                    body.velocity.y = 0.0;
                    body.blocked.down = true;
                }
            } else if let Some(ceiling) = hits.iter().map(|r| r.bottom()).reduce(f32::max) {
                body.position.y = ceiling + body.size.y / 2.0;
                body.velocity.y = 0.0;
                body.blocked.up = true;
            }
        }

        if body.collide_world_bounds {
            self.clamp_to_bounds(body);
        }
    }

    fn clamp_to_bounds(&self, body: &mut Body) {
        let half = body.size / 2.0;
        let b = self.bounds;
        if body.position.x - half.x < b.x {
            body.position.x = b.x + half.x;
            body.velocity.x = body.velocity.x.max(0.0);
            body.blocked.left = true;
        } else if body.position.x + half.x > b.right() {
            body.position.x = b.right() - half.x;
            body.velocity.x = body.velocity.x.min(0.0);
            body.blocked.right = true;
        }
        if body.position.y - half.y < b.y {
            body.position.y = b.y + half.y;
            body.velocity.y = body.velocity.y.max(0.0);
            body.blocked.up = true;
        } else if body.position.y + half.y >= b.bottom() {
            body.position.y = b.bottom() - half.y;
            body.velocity.y = body.velocity.y.min(0.0);
            body.blocked.down = true;
        }
    }

    /// Whether the body overlaps any solid tile.
    pub fn touches_solid(&self, body: &Body, map: &TileMap) -> bool {
        !map.solid_rects_in(self.solid_layer, body.bounds()).is_empty()
    }

    /// Whether the body lies completely outside the world rectangle.
    pub fn is_outside(&self, body: &Body) -> bool {
        !body.bounds().intersects(&self.bounds)
    }
}

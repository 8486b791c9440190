//! Player, enemies and projectiles.

use crate::animation::{Animator, ENEMY_IDLE};
use crate::config::{EnemyTuning, PlayerTuning, ProjectileTuning};
use crate::math::Vec2;
use crate::physics::Body;

/// The controllable character.
#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub health: f32,
    pub has_weapon: bool,
    pub has_shield: bool,
    /// Locks movement and actions while shooting or shielding.
    pub animating: bool,
    pub shield_active: bool,
    /// Facing left.
    pub flip_x: bool,
    pub animator: Animator,
}

impl Player {
    pub fn spawn(tuning: &PlayerTuning) -> Self {
        let body = Body::new(tuning.spawn, tuning.body_size)
            .with_gravity(tuning.gravity)
            .with_world_bounds();
        Self {
            body,
            health: tuning.max_health,
            has_weapon: false,
            has_shield: false,
            animating: false,
            shield_active: false,
            flip_x: false,
            animator: Animator::new(),
        }
    }

    /// Restore full health and drop both capabilities.
    pub fn reset(&mut self, tuning: &PlayerTuning) {
        self.health = tuning.max_health;
        self.has_weapon = false;
        self.has_shield = false;
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// -1.0 when facing left, 1.0 when facing right.
    pub fn facing(&self) -> f32 {
        if self.flip_x {
            -1.0
        } else {
            1.0
        }
    }

    pub fn activate_shield(&mut self) {
        if self.has_shield {
            self.shield_active = true;
            self.animating = true;
        }
    }

    pub fn deactivate_shield(&mut self) {
        self.shield_active = false;
        self.animating = false;
    }

    /// Apply one enemy hit. Returns true when the hit was fatal.
    pub fn take_hit(&mut self, damage: f32) -> bool {
        if self.shield_active {
            return false;
        }
        self.health -= damage;
        self.health <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyId(pub u32);

/// A stationary turret-like enemy.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EnemyId,
    pub body: Body,
    pub health: f32,
    pub flip_x: bool,
    pub animator: Animator,
}

impl Enemy {
    pub fn spawn(id: EnemyId, position: Vec2, tuning: &EnemyTuning) -> Self {
        let body = Body::new(position, tuning.body_size)
            .with_gravity(tuning.gravity)
            .with_world_bounds();
        let mut animator = Animator::new();
        animator.play(ENEMY_IDLE);
        Self {
            id,
            body,
            health: tuning.max_health,
            flip_x: false,
            animator,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Health only ever goes down. Returns true once the enemy is dead.
    pub fn apply_damage(&mut self, damage: f32) -> bool {
        self.health -= damage.max(0.0);
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub owner: Owner,
    pub body: Body,
    pub flip_x: bool,
}

impl Projectile {
    pub fn new(
        owner: Owner,
        position: Vec2,
        velocity: Vec2,
        flip_x: bool,
        tuning: &ProjectileTuning,
    ) -> Self {
        let body = Body::new(position, tuning.size)
            .with_gravity(tuning.gravity)
            .with_velocity(velocity);
        Self {
            owner,
            body,
            flip_x,
        }
    }

    /// Fired by the player from just in front of the chest.
    pub fn from_player(player: &Player, tuning: &ProjectileTuning) -> Self {
        let facing = player.facing();
        let position = player.position() + Vec2::new(10.0 * facing, -10.0);
        let velocity = Vec2::new(tuning.player_speed * facing, 0.0);
        Self::new(Owner::Player, position, velocity, player.flip_x, tuning)
    }

    /// Fired by an enemy along `angle` (radians).
    pub fn from_enemy(enemy: &Enemy, angle: f32, tuning: &ProjectileTuning) -> Self {
        let offset_x = if enemy.flip_x { -20.0 } else { 20.0 };
        let position = enemy.position() + Vec2::new(offset_x, -10.0);
        let velocity = Vec2::from_angle(angle) * tuning.enemy_speed;
        Self::new(Owner::Enemy, position, velocity, enemy.flip_x, tuning)
    }
}

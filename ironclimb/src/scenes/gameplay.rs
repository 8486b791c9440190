//! The level itself: movement, ladders, pickups, combat, win and loss.

use std::rc::Rc;
use std::time::Duration;

use crate::animation::{ENEMY_IDLE, ENEMY_SHOOT, PLAYER_RUN, PLAYER_SHOOT};
use crate::camera::{Camera, Fade};
use crate::canvas::{Canvas, Color};
use crate::config::{GameConfig, ProjectileTuning};
use crate::entities::{Enemy, EnemyId, Owner, Player, Projectile};
use crate::error::GameResult;
use crate::input::Controls;
use crate::math::{Rect, Vec2};
use crate::physics::ArcadePhysics;
use crate::popup::Popups;
use crate::resources::GameResources;
use crate::scene::{FrameContext, Scene, SceneTransitions};
use crate::tilemap::{LayerId, TileMap};
use crate::timer::Clock;

use super::{draw_background, draw_fade, VictoryScene};

pub const WEAPON_MESSAGE: &str = "You picked up the WEAPON!\nControls:\n- Space: Fire";
pub const SHIELD_MESSAGE: &str = "You picked up the SHIELD!\nControls:\n- S: Shield";
pub const LOSS_MESSAGE: &str = "You lost.\nRestarting game";

/// Deferred work scheduled on the scene clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    /// Every enemy in range starts a shot.
    EnemyVolley,
    /// The muzzle delay of one enemy's shot elapsed.
    EnemyBullet { enemy: EnemyId, angle: f32 },
    /// Show the loss popup in a freshly restarted scene.
    LossPopup,
}

#[derive(Clone, Copy, Debug)]
struct Layers {
    ground: LayerId,
    ladders: LayerId,
    decoration: LayerId,
    weapon: LayerId,
    shield: LayerId,
    win: LayerId,
}

impl Layers {
    fn resolve(map: &TileMap) -> GameResult<Self> {
        Ok(Self {
            ground: map.layer_id("ground")?,
            ladders: map.layer_id("escadas")?,
            decoration: map.layer_id("objetos")?,
            weapon: map.layer_id("arma")?,
            shield: map.layer_id("escudo")?,
            win: map.layer_id("win")?,
        })
    }
}

pub struct GameplayScene {
    resources: Rc<GameResources>,
    map: TileMap,
    layers: Layers,
    physics: ArcadePhysics,
    player: Player,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    clock: Clock<GameEvent>,
    popups: Popups,
    camera: Camera,
    fade: Fade,
    /// Set once a restart has been requested; the scene stops simulating.
    restarting: bool,
}

impl GameplayScene {
    pub fn new(resources: Rc<GameResources>) -> GameResult<Self> {
        let config = &resources.config;
        let map = resources.level.clone();
        let layers = Layers::resolve(&map)?;
        let physics = ArcadePhysics::new(map.bounds(), layers.ground);

        let player = Player::spawn(&config.player);
        let enemies = config
            .enemy
            .spawns
            .iter()
            .enumerate()
            .map(|(i, &at)| Enemy::spawn(EnemyId(i as u32), at, &config.enemy))
            .collect();

        let mut clock = Clock::new();
        clock.every(
            Duration::from_millis(config.enemy.fire_interval_ms),
            GameEvent::EnemyVolley,
        );

        let viewport = Vec2::new(config.window.width as f32, config.window.height as f32);
        let mut camera = Camera::new(viewport, map.bounds(), config.camera.zoom);
        camera.follow(player.position());
        let fade = Fade::new(config.fade_duration());

        Ok(Self {
            resources,
            map,
            layers,
            physics,
            player,
            enemies,
            projectiles: Vec::new(),
            clock,
            popups: Popups::new(),
            camera,
            fade,
            restarting: false,
        })
    }

    /// A fresh scene that announces the previous run was lost.
    pub fn after_loss(resources: Rc<GameResources>) -> GameResult<Self> {
        let delay = Duration::from_millis(resources.config.popup.loss_delay_ms);
        let mut scene = Self::new(resources)?;
        scene.clock.after(delay, GameEvent::LossPopup);
        Ok(scene)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Add a projectile to the world, as if fired this frame.
    pub fn spawn_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    pub fn popups(&self) -> &Popups {
        &self.popups
    }

    /// This run's copy of the level.
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_fading_out(&self) -> bool {
        self.fade.is_started()
    }

    pub fn is_restarting(&self) -> bool {
        self.restarting
    }

    fn config(&self) -> &GameConfig {
        &self.resources.config
    }

    fn apply_movement(&mut self, controls: &Controls, speed: f32) {
        let player = &mut self.player;
        if player.animating {
            return;
        }
        if controls.left {
            player.body.velocity.x = -speed;
            player.animator.play(PLAYER_RUN);
            player.flip_x = true;
        } else if controls.right {
            player.body.velocity.x = speed;
            player.animator.play(PLAYER_RUN);
            player.flip_x = false;
        } else {
            player.body.velocity.x = 0.0;
            player.animator.stop();
        }
    }

    fn try_fire(&mut self, tuning: &ProjectileTuning) {
        let player = &mut self.player;
        if player.body.velocity.x != 0.0
            || player.animating
            || player.shield_active
            || !player.has_weapon
        {
            return;
        }
        player.animating = true;
        player.animator.play(PLAYER_SHOOT);
        self.projectiles
            .push(Projectile::from_player(&self.player, tuning));
    }

    fn apply_shield(&mut self, controls: &Controls) {
        let player = &mut self.player;
        if controls.shield {
            if player.body.velocity.x == 0.0
                && !player.animating
                && !player.shield_active
                && player.has_shield
            {
                player.activate_shield();
            }
        } else if player.shield_active {
            player.deactivate_shield();
        }
    }

    /// Returns whether the player climbs this frame.
    fn apply_ladder(&mut self, controls: &Controls, speed: f32) -> bool {
        let on_ladder = self
            .map
            .tile_at_world(self.layers.ladders, self.player.position())
            .is_some();
        if !on_ladder || self.player.animating || !(controls.up || controls.down) {
            return false;
        }
        let body = &mut self.player.body;
        body.velocity.y = if controls.up { -speed } else { speed };
        body.allow_gravity = false;
        body.collides_with_tiles = false;
        true
    }

    fn apply_gravity_and_jump(&mut self, controls: &Controls, jump_velocity: f32) {
        let body = &mut self.player.body;
        body.allow_gravity = true;
        body.collides_with_tiles = true;
        if controls.up && body.blocked.down {
            body.velocity.y = jump_velocity;
        }
    }

    fn collect_items(&mut self, ttl: Duration) {
        let at = self.player.position();
        if !self.player.has_weapon {
            if let Some(tile) = self
                .map
                .tile_at_world(self.layers.weapon, at)
                .filter(|t| t.properties.collectible)
            {
                self.map.remove_tile(self.layers.weapon, tile.x, tile.y);
                self.player.has_weapon = true;
                log::debug!("weapon collected at tile ({}, {})", tile.x, tile.y);
                self.popups.show(WEAPON_MESSAGE, ttl);
            }
        }
        if !self.player.has_shield {
            if let Some(tile) = self
                .map
                .tile_at_world(self.layers.shield, at)
                .filter(|t| t.properties.collectible)
            {
                self.map.remove_tile(self.layers.shield, tile.x, tile.y);
                self.player.has_shield = true;
                log::debug!("shield collected at tile ({}, {})", tile.x, tile.y);
                self.popups.show(SHIELD_MESSAGE, ttl);
            }
        }
    }

    fn check_win(&mut self) {
        let on_win = self
            .map
            .tile_at_world(self.layers.win, self.player.position())
            .is_some();
        if on_win && self.fade.start() {
            log::info!("win tile reached, fading out");
        }
    }

    fn step_physics(&mut self, dt: f32) {
        let physics = self.physics;
        physics.step(&mut self.player.body, &self.map, dt);
        for enemy in &mut self.enemies {
            physics.step(&mut enemy.body, &self.map, dt);
        }
        for shot in &mut self.projectiles {
            physics.step(&mut shot.body, &self.map, dt);
        }
    }

    /// Projectile overlaps: shots against enemies, shots against the player,
    /// then shots against the ground and the world edge. Returns whether the
    /// player died.
    fn resolve_hits(&mut self) -> bool {
        let enemy_damage = self.config().enemy.damage_taken_per_hit;
        let player_damage = self.config().player.damage_taken_per_hit;
        let physics = self.physics;
        let map = &self.map;
        let enemies = &mut self.enemies;
        let player = &mut self.player;
        let mut player_died = false;

        self.projectiles.retain(|shot| {
            match shot.owner {
                Owner::Player => {
                    if let Some(enemy) = enemies
                        .iter_mut()
                        .find(|e| !e.is_dead() && e.body.overlaps(&shot.body))
                    {
                        if enemy.apply_damage(enemy_damage) {
                            log::debug!("enemy {} destroyed", enemy.id.0);
                        } else {
                            log::debug!("enemy {} hit, health {}", enemy.id.0, enemy.health);
                        }
                        return false;
                    }
                }
                Owner::Enemy => {
                    if shot.body.overlaps(&player.body) {
                        if player.shield_active {
                            log::debug!("shot blocked by shield");
                        } else {
                            log::debug!("player hit");
                        }
                        player_died |= player.take_hit(player_damage);
                        return false;
                    }
                }
            }
            let hit_ground = shot.body.blocked.any() || physics.touches_solid(&shot.body, map);
            !hit_ground && !physics.is_outside(&shot.body)
        });
        enemies.retain(|e| !e.is_dead());
        player_died
    }

    fn advance_animations(&mut self, dt: f32) {
        if self.player.animator.update(dt) == Some(PLAYER_SHOOT) {
            self.player.animating = false;
            self.player.animator.stop();
        }
        for enemy in &mut self.enemies {
            if enemy.animator.update(dt) == Some(ENEMY_SHOOT) {
                enemy.animator.play(ENEMY_IDLE);
            }
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::EnemyVolley => self.enemy_volley(),
            GameEvent::EnemyBullet { enemy, angle } => {
                let tuning = &self.resources.config.projectile;
                let shot = self
                    .enemies
                    .iter()
                    .find(|e| e.id == enemy)
                    .map(|e| Projectile::from_enemy(e, angle, tuning));
                if let Some(shot) = shot {
                    self.projectiles.push(shot);
                }
            }
            GameEvent::LossPopup => {
                let ttl = self.config().popup_ttl();
                self.popups.show(LOSS_MESSAGE, ttl);
            }
        }
    }

    fn enemy_volley(&mut self) {
        let tuning = &self.resources.config.enemy;
        let target = self.player.position();
        let delay = Duration::from_millis(tuning.muzzle_delay_ms);
        for enemy in &mut self.enemies {
            let from = enemy.position();
            if from.distance(target) > tuning.fire_range {
                continue;
            }
            enemy.flip_x = target.x < from.x;
            enemy.animator.play(ENEMY_SHOOT);
            self.clock.after(
                delay,
                GameEvent::EnemyBullet {
                    enemy: enemy.id,
                    angle: from.angle_to(target),
                },
            );
        }
    }

    fn lose(&mut self, transitions: &mut dyn SceneTransitions) -> GameResult<()> {
        let resources = Rc::clone(&self.resources);
        self.player.reset(&resources.config.player);
        self.restarting = true;
        log::info!("player lost, restarting level");
        transitions.replace(Box::new(GameplayScene::after_loss(resources)?));
        Ok(())
    }

    fn draw_level(&self, canvas: &mut Canvas) {
        let scroll = self.camera.scroll();
        let visible = self.camera.visible_size();
        let view = Rect::new(scroll.x, scroll.y, visible.x, visible.y);
        for (id, layer) in self.map.layers() {
            if !layer.visible {
                continue;
            }
            for tile in self.map.tiles(id) {
                let rect = self.map.tile_rect(tile.x, tile.y);
                if !rect.intersects(&view) {
                    continue;
                }
                let color = self.tile_color(id, tile.properties.collide);
                canvas.world_rect(rect, color);
            }
        }
    }

    fn tile_color(&self, layer: LayerId, solid: bool) -> Color {
        let l = &self.layers;
        if layer == l.ground {
            if solid {
                Color::rgb(0.35, 0.25, 0.18)
            } else {
                Color::rgb(0.45, 0.40, 0.35)
            }
        } else if layer == l.ladders {
            Color::rgb(0.65, 0.45, 0.20)
        } else if layer == l.decoration {
            Color::rgb(0.25, 0.50, 0.25)
        } else if layer == l.weapon {
            Color::rgb(0.80, 0.80, 0.85)
        } else if layer == l.shield {
            Color::rgb(0.30, 0.75, 0.95)
        } else if layer == l.win {
            Color::rgb(0.95, 0.85, 0.20)
        } else {
            Color::rgb(0.5, 0.5, 0.5)
        }
    }

    fn draw_actors(&self, canvas: &mut Canvas) {
        for enemy in &self.enemies {
            let color = if enemy.animator.is_playing(ENEMY_SHOOT) {
                Color::rgb(0.95, 0.35, 0.25)
            } else {
                Color::rgb(0.75, 0.15, 0.15)
            };
            let body = enemy.body.bounds();
            canvas.world_rect(body, color);
            let eye_x = if enemy.flip_x { body.x + 4.0 } else { body.right() - 12.0 };
            canvas.world_rect(Rect::new(eye_x, body.y + 10.0, 8.0, 6.0), Color::WHITE);
        }

        let player = &self.player;
        let body = player.body.bounds();
        let color = if player.shield_active {
            Color::rgb(0.0, 1.0, 1.0)
        } else {
            Color::rgb(0.95, 0.60, 0.20)
        };
        canvas.world_rect(body, color);
        if player.shield_active {
            let x = player.position().x + player.facing() * (body.w / 2.0 + 4.0) - 3.0;
            canvas.world_rect(
                Rect::new(x, body.y - 4.0, 6.0, body.h + 8.0),
                Color::rgba(0.6, 0.9, 1.0, 0.9),
            );
        }

        for shot in &self.projectiles {
            let color = match shot.owner {
                Owner::Player => Color::rgb(1.0, 0.95, 0.4),
                Owner::Enemy => Color::rgb(1.0, 0.4, 0.3),
            };
            canvas.world_rect(shot.body.bounds(), color);
        }
    }

    fn draw_health(&self, canvas: &mut Canvas) {
        let max = self.config().player.max_health.max(1.0);
        let fraction = (self.player.health / max).clamp(0.0, 1.0);
        canvas.screen_rect(Rect::new(10.0, 10.0, 154.0, 18.0), Color::rgba(0.0, 0.0, 0.0, 0.6));
        canvas.screen_rect(
            Rect::new(12.0, 12.0, 150.0 * fraction, 14.0),
            Color::rgb(0.85, 0.2, 0.2),
        );
    }
}

impl Scene for GameplayScene {
    fn name(&self) -> &'static str {
        "gameplay"
    }

    fn on_enter(&mut self) -> GameResult<()> {
        log::info!("gameplay started with {} enemies", self.enemies.len());
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &FrameContext,
        transitions: &mut dyn SceneTransitions,
    ) -> GameResult<()> {
        if self.restarting {
            return Ok(());
        }
        let controls = ctx.controls;
        let tuning = self.config().player.clone();
        let projectile = self.config().projectile.clone();
        let popup_ttl = self.config().popup_ttl();
        let dt = ctx.dt.as_secs_f32();

        self.apply_movement(&controls, tuning.speed);
        if controls.fire {
            self.try_fire(&projectile);
        }
        self.apply_shield(&controls);
        let climbing = self.apply_ladder(&controls, tuning.speed);
        if !climbing && !self.player.animating {
            self.apply_gravity_and_jump(&controls, tuning.jump_velocity);
        }

        self.collect_items(popup_ttl);
        self.check_win();

        if self.player.position().y > tuning.fall_limit_y {
            log::info!("player fell out of the level");
            return self.lose(transitions);
        }

        self.step_physics(dt);
        if self.resolve_hits() {
            return self.lose(transitions);
        }

        self.advance_animations(dt);
        for event in self.clock.advance(ctx.dt) {
            self.handle_event(event);
        }
        self.popups.update(ctx.dt);
        self.camera.follow(self.player.position());

        if self.fade.update(ctx.dt) {
            transitions.replace(Box::new(VictoryScene::new(Rc::clone(&self.resources))));
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut Canvas) {
        draw_background(canvas, self.camera.parallax_offsets());
        canvas.set_view(self.camera.view());
        self.draw_level(canvas);
        self.draw_actors(canvas);
        self.draw_health(canvas);
        self.popups.draw(canvas);
        draw_fade(canvas, &self.fade);
    }
}

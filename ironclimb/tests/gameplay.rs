use std::rc::Rc;
use std::time::Duration;

use ironclimb::animation::ENEMY_SHOOT;
use ironclimb::entities::{Owner, Projectile};
use ironclimb::scenes::{LOSS_MESSAGE, SHIELD_MESSAGE, WEAPON_MESSAGE};
use ironclimb::{Controls, FrameContext, GameResources, GameplayScene, PendingTransition, Scene, Vec2};

const FRAME: Duration = Duration::from_millis(16);

fn resources() -> Rc<GameResources> {
    Rc::new(GameResources::with_defaults().unwrap())
}

fn scene() -> GameplayScene {
    GameplayScene::new(resources()).unwrap()
}

fn ctx(controls: Controls) -> FrameContext {
    FrameContext::new(FRAME, controls, Vec2::new(1000.0, 550.0))
}

/// Run `frames` updates with the same controls and report the requested transition.
fn run(scene: &mut GameplayScene, controls: Controls, frames: usize) -> Option<&'static str> {
    let mut transitions = PendingTransition::new();
    for _ in 0..frames {
        scene.update(&ctx(controls), &mut transitions).unwrap();
        if transitions.is_pending() {
            break;
        }
    }
    transitions.target()
}

fn popup_messages(scene: &GameplayScene) -> Vec<String> {
    scene.popups().iter().map(|p| p.message.clone()).collect()
}

#[test]
fn new_scene_starts_with_default_player_and_all_enemies() {
    let scene = scene();
    let player = scene.player();
    assert_eq!(player.position(), Vec2::new(100.0, 300.0));
    assert_eq!(
        (player.health, player.has_weapon, player.has_shield),
        (100.0, false, false)
    );
    assert_eq!(scene.enemies().len(), 6);
    assert!(scene.projectiles().is_empty());
}

#[test]
fn player_lands_and_jumps() {
    let mut scene = scene();
    run(&mut scene, Controls::default(), 60);
    assert!(scene.player().body.blocked.down);
    let ground_y = scene.player().position().y;
    assert_eq!(ground_y, 352.0 - 18.0);

    let up = Controls {
        up: true,
        ..Controls::default()
    };
    run(&mut scene, up, 5);
    assert!(scene.player().position().y < ground_y - 10.0);
}

#[test]
fn walking_faces_the_direction_of_travel() {
    let mut scene = scene();
    run(&mut scene, Controls::default(), 30);
    let left = Controls {
        left: true,
        ..Controls::default()
    };
    run(&mut scene, left, 1);
    assert_eq!(scene.player().body.velocity.x, -160.0);
    assert!(scene.player().flip_x);
    run(&mut scene, Controls::default(), 1);
    assert_eq!(scene.player().body.velocity.x, 0.0);
}

#[test]
fn weapon_pickup_removes_tile_and_sets_flag() {
    let mut scene = scene();
    let weapon = scene.map().layer_id("arma").unwrap();
    assert!(scene.map().tile_at(weapon, 8, 10).is_some());

    scene.player_mut().body.position = Vec2::new(272.0, 334.0);
    run(&mut scene, Controls::default(), 1);

    assert!(scene.player().has_weapon);
    assert!(scene.map().tile_at(weapon, 8, 10).is_none());
    assert_eq!(popup_messages(&scene), vec![WEAPON_MESSAGE.to_string()]);

    // Walking away keeps the capability.
    scene.player_mut().body.position = Vec2::new(100.0, 334.0);
    run(&mut scene, Controls::default(), 10);
    assert!(scene.player().has_weapon);
}

#[test]
fn shield_pickup_on_the_platform() {
    let mut scene = scene();
    scene.player_mut().body.position = Vec2::new(784.0, 206.0);
    run(&mut scene, Controls::default(), 1);
    assert!(scene.player().has_shield);
    assert_eq!(popup_messages(&scene), vec![SHIELD_MESSAGE.to_string()]);
}

#[test]
fn pickup_popups_expire_after_five_seconds() {
    let mut scene = scene();
    scene.player_mut().body.position = Vec2::new(272.0, 334.0);
    run(&mut scene, Controls::default(), 1);
    run(&mut scene, Controls::default(), 300);
    assert_eq!(scene.popups().iter().count(), 1);
    run(&mut scene, Controls::default(), 20);
    assert!(scene.popups().is_empty());
}

#[test]
fn firing_requires_the_weapon() {
    let mut scene = scene();
    run(&mut scene, Controls::default(), 30);
    let fire = Controls {
        fire: true,
        ..Controls::default()
    };
    run(&mut scene, fire, 1);
    assert!(scene.projectiles().is_empty());

    scene.player_mut().has_weapon = true;
    run(&mut scene, fire, 1);
    assert_eq!(scene.projectiles().len(), 1);
    assert_eq!(scene.projectiles()[0].owner, Owner::Player);
    assert!(scene.player().animating);

    // The shoot animation (7 frames at 20 fps) releases the lock.
    run(&mut scene, Controls::default(), 30);
    assert!(!scene.player().animating);
}

#[test]
fn two_player_shots_destroy_an_enemy() {
    let mut scene = scene();
    let tuning = resources().config.projectile.clone();
    let first = scene.enemies()[0].id;

    let at = scene.enemies()[0].position();
    scene.spawn_projectile(Projectile::new(
        Owner::Player,
        at,
        Vec2::new(800.0, 0.0),
        false,
        &tuning,
    ));
    run(&mut scene, Controls::default(), 1);
    assert_eq!(scene.enemies()[0].health, 50.0);
    assert!(scene.projectiles().is_empty());

    let at = scene.enemies()[0].position();
    scene.spawn_projectile(Projectile::new(
        Owner::Player,
        at,
        Vec2::new(800.0, 0.0),
        false,
        &tuning,
    ));
    run(&mut scene, Controls::default(), 1);
    assert_eq!(scene.enemies().len(), 5);
    assert!(scene.enemies().iter().all(|e| e.id != first));
}

#[test]
fn unshielded_hit_costs_25_health() {
    let mut scene = scene();
    let tuning = resources().config.projectile.clone();
    let at = scene.player().position();
    scene.spawn_projectile(Projectile::new(Owner::Enemy, at, Vec2::ZERO, false, &tuning));
    run(&mut scene, Controls::default(), 1);
    assert_eq!(scene.player().health, 75.0);
    assert!(scene.projectiles().is_empty());
}

#[test]
fn active_shield_blocks_all_damage() {
    let mut scene = scene();
    let tuning = resources().config.projectile.clone();
    run(&mut scene, Controls::default(), 30);
    scene.player_mut().has_shield = true;

    let shield = Controls {
        shield: true,
        ..Controls::default()
    };
    for _ in 0..4 {
        let at = scene.player().position();
        scene.spawn_projectile(Projectile::new(Owner::Enemy, at, Vec2::ZERO, false, &tuning));
        run(&mut scene, shield, 1);
    }
    assert!(scene.player().shield_active);
    assert_eq!(scene.player().health, 100.0);

    run(&mut scene, Controls::default(), 1);
    assert!(!scene.player().shield_active);
    assert!(!scene.player().animating);
}

#[test]
fn lethal_hit_restarts_the_level() {
    let mut scene = scene();
    let tuning = resources().config.projectile.clone();
    scene.player_mut().health = 25.0;
    scene.player_mut().has_weapon = true;
    let at = scene.player().position();
    scene.spawn_projectile(Projectile::new(Owner::Enemy, at, Vec2::ZERO, false, &tuning));

    assert_eq!(run(&mut scene, Controls::default(), 1), Some("gameplay"));
    assert!(scene.is_restarting());
    let player = scene.player();
    assert_eq!(
        (player.health, player.has_weapon, player.has_shield),
        (100.0, false, false)
    );
}

#[test]
fn falling_into_a_pit_restarts_the_level() {
    let mut scene = scene();
    scene.player_mut().has_shield = true;
    scene.player_mut().body.position = Vec2::new(480.0, 300.0);
    assert_eq!(run(&mut scene, Controls::default(), 120), Some("gameplay"));
    assert!(!scene.player().has_shield);
}

#[test]
fn restarted_scene_is_fresh_and_announces_the_loss() {
    let resources = resources();
    let mut scene = GameplayScene::after_loss(Rc::clone(&resources)).unwrap();
    let weapon = scene.map().layer_id("arma").unwrap();
    assert!(scene.map().tile_at(weapon, 8, 10).is_some());
    assert!(scene.popups().is_empty());

    run(&mut scene, Controls::default(), 7);
    assert_eq!(popup_messages(&scene), vec![LOSS_MESSAGE.to_string()]);
    assert_eq!(scene.player().health, 100.0);
}

#[test]
fn collected_tiles_return_after_a_restart() {
    let resources = resources();
    let mut first = GameplayScene::new(Rc::clone(&resources)).unwrap();
    first.player_mut().body.position = Vec2::new(272.0, 334.0);
    run(&mut first, Controls::default(), 1);
    assert!(first.player().has_weapon);

    let second = GameplayScene::new(resources).unwrap();
    let weapon = second.map().layer_id("arma").unwrap();
    assert!(second.map().tile_at(weapon, 8, 10).is_some());
    assert!(!second.player().has_weapon);
}

#[test]
fn ladders_let_the_player_climb() {
    let mut scene = scene();
    scene.player_mut().body.position = Vec2::new(656.0, 334.0);
    let up = Controls {
        up: true,
        ..Controls::default()
    };
    run(&mut scene, up, 10);
    let body = &scene.player().body;
    assert!(body.position.y < 334.0 - 20.0);
    assert_eq!(body.velocity.y, -160.0);
    assert!(!body.allow_gravity);
    assert!(!body.collides_with_tiles);
}

#[test]
fn enemies_in_range_fire_at_the_player() {
    let mut scene = scene();
    scene.player_mut().body.position = Vec2::new(1000.0, 334.0);

    let mut transitions = PendingTransition::new();
    let mut enemy_shot_seen = false;
    for _ in 0..150 {
        scene
            .update(&ctx(Controls::default()), &mut transitions)
            .unwrap();
        if scene
            .projectiles()
            .iter()
            .any(|p| p.owner == Owner::Enemy)
        {
            enemy_shot_seen = true;
            break;
        }
    }
    assert!(enemy_shot_seen);
    assert!(scene.enemies()[0].flip_x);
}

#[test]
fn enemy_killed_before_its_muzzle_delay_never_fires() {
    let mut scene = scene();
    let tuning = resources().config.projectile.clone();
    // Only the first enemy is within range from here.
    scene.player_mut().body.position = Vec2::new(800.0, 334.0);
    let target = scene.enemies()[0].id;

    let mut frames = 0;
    while !scene.enemies()[0].animator.is_playing(ENEMY_SHOOT) {
        run(&mut scene, Controls::default(), 1);
        frames += 1;
        assert!(frames < 200, "volley never started");
    }

    for _ in 0..2 {
        let at = scene.enemies()[0].position();
        scene.spawn_projectile(Projectile::new(Owner::Player, at, Vec2::ZERO, false, &tuning));
        run(&mut scene, Controls::default(), 1);
    }
    assert!(scene.enemies().iter().all(|e| e.id != target));

    for _ in 0..30 {
        run(&mut scene, Controls::default(), 1);
        assert!(scene.projectiles().iter().all(|p| p.owner != Owner::Enemy));
    }
}

#[test]
fn projectiles_leaving_the_world_are_removed() {
    let mut scene = scene();
    let tuning = resources().config.projectile.clone();
    scene.spawn_projectile(Projectile::new(
        Owner::Player,
        Vec2::new(2550.0, 100.0),
        Vec2::new(800.0, 0.0),
        false,
        &tuning,
    ));
    run(&mut scene, Controls::default(), 1);
    assert_eq!(scene.projectiles().len(), 1);
    run(&mut scene, Controls::default(), 4);
    assert!(scene.projectiles().is_empty());
}

#[test]
fn enemies_out_of_range_hold_fire() {
    let mut scene = scene();
    run(&mut scene, Controls::default(), 150);
    assert!(scene.projectiles().is_empty());
}

#[test]
fn win_tile_fades_into_victory() {
    let mut scene = scene();
    scene.player_mut().body.position = Vec2::new(2480.0, 334.0);

    assert_eq!(run(&mut scene, Controls::default(), 1), None);
    assert!(scene.is_fading_out());
    assert_eq!(run(&mut scene, Controls::default(), 40), Some("victory"));
}

#[test]
fn camera_follows_the_player_within_the_world() {
    let mut scene = scene();
    scene.player_mut().body.position = Vec2::new(1200.0, 334.0);
    run(&mut scene, Controls::default(), 1);
    let camera = scene.camera();
    let centre = camera.scroll().x + camera.visible_size().x / 2.0;
    assert!((centre - scene.player().position().x).abs() < 1.0);
    assert!(camera.scroll().y >= 0.0);
}

use std::rc::Rc;
use std::time::Duration;

use ironclimb::canvas::DrawCommand;
use ironclimb::{
    Canvas, Controls, FrameContext, GameResources, MenuScene, PendingTransition, Scene,
    SceneManager, Vec2, VictoryScene,
};

const SCREEN: Vec2 = Vec2::new(1000.0, 550.0);

fn resources() -> Rc<GameResources> {
    Rc::new(GameResources::with_defaults().unwrap())
}

fn frame(ms: u64, controls: Controls) -> FrameContext {
    FrameContext::new(Duration::from_millis(ms), controls, SCREEN)
}

fn confirm() -> Controls {
    Controls {
        confirm: true,
        ..Controls::default()
    }
}

#[test]
fn menu_waits_for_input() {
    let mut menu = MenuScene::new(resources());
    let mut transitions = PendingTransition::new();
    for _ in 0..100 {
        menu.update(&frame(16, Controls::default()), &mut transitions)
            .unwrap();
    }
    assert!(!menu.is_fading());
    assert!(!transitions.is_pending());
}

#[test]
fn menu_confirm_fades_into_gameplay() {
    let mut menu = MenuScene::new(resources());
    let mut transitions = PendingTransition::new();
    menu.update(&frame(16, confirm()), &mut transitions).unwrap();
    assert!(menu.is_fading());

    menu.update(&frame(250, Controls::default()), &mut transitions)
        .unwrap();
    assert!(!transitions.is_pending());
    menu.update(&frame(250, Controls::default()), &mut transitions)
        .unwrap();
    assert_eq!(transitions.target(), Some("gameplay"));
}

#[test]
fn clicking_start_starts_the_game() {
    let mut menu = MenuScene::new(resources());
    let mut transitions = PendingTransition::new();

    let miss = Controls {
        click: Some(Vec2::new(20.0, 20.0)),
        ..Controls::default()
    };
    menu.update(&frame(16, miss), &mut transitions).unwrap();
    assert!(!menu.is_fading());

    let hit = Controls {
        click: Some(Vec2::new(500.0, 550.0 / 1.7)),
        ..Controls::default()
    };
    menu.update(&frame(16, hit), &mut transitions).unwrap();
    assert!(menu.is_fading());
}

#[test]
fn menu_draws_title_and_start_label() {
    let menu = MenuScene::new(resources());
    let mut canvas = Canvas::new(SCREEN);
    menu.draw(&mut canvas);
    let texts: Vec<&str> = canvas.texts().collect();
    assert!(texts.contains(&"Start"));
    assert!(!canvas
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::Text { text, .. } if text.is_empty())));
}

#[test]
fn victory_back_returns_to_the_menu() {
    let mut victory = VictoryScene::new(resources());
    let mut transitions = PendingTransition::new();
    victory.on_enter().unwrap();

    let back = Controls {
        click: Some(Vec2::new(500.0, 550.0 / 1.3)),
        ..Controls::default()
    };
    victory.update(&frame(16, back), &mut transitions).unwrap();
    for _ in 0..40 {
        victory
            .update(&frame(16, Controls::default()), &mut transitions)
            .unwrap();
    }
    assert_eq!(transitions.target(), Some("menu"));
}

#[test]
fn victory_credits_are_drawn() {
    let victory = VictoryScene::new(resources());
    let mut canvas = Canvas::new(SCREEN);
    victory.draw(&mut canvas);
    let texts: Vec<&str> = canvas.texts().collect();
    assert!(texts.contains(&"Developed by"));
    assert!(texts.contains(&"Inteli"));
    assert!(texts.contains(&"Back"));
}

#[test]
fn manager_runs_menu_into_gameplay() {
    let mut scenes = SceneManager::new(Box::new(MenuScene::new(resources())));
    scenes.update(&frame(16, confirm())).unwrap();
    assert_eq!(scenes.active_name(), "menu");

    for _ in 0..40 {
        scenes.update(&frame(16, Controls::default())).unwrap();
    }
    assert_eq!(scenes.active_name(), "gameplay");

    let mut canvas = Canvas::new(SCREEN);
    scenes.draw(&mut canvas);
    assert!(!canvas.commands().is_empty());
}

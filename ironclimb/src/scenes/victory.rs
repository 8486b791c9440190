use std::rc::Rc;

use crate::camera::Fade;
use crate::canvas::{Canvas, Color, TextAlign};
use crate::error::GameResult;
use crate::math::Vec2;
use crate::resources::GameResources;
use crate::scene::{FrameContext, Scene, SceneTransitions};

use super::{draw_background, draw_fade, draw_title, MenuScene, UiButton};

const BACK_BUTTON: UiButton = UiButton {
    label: "Back",
    anchor: Vec2::new(0.5, 1.0 / 1.3),
    size: Vec2::new(220.0, 64.0),
};

/// Shown after reaching the win tile. Back returns to the menu.
pub struct VictoryScene {
    resources: Rc<GameResources>,
    fade: Fade,
}

impl VictoryScene {
    pub fn new(resources: Rc<GameResources>) -> Self {
        let fade = Fade::new(resources.config.fade_duration());
        Self { resources, fade }
    }
}

impl Scene for VictoryScene {
    fn name(&self) -> &'static str {
        "victory"
    }

    fn on_enter(&mut self) -> GameResult<()> {
        log::info!("level complete");
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &FrameContext,
        transitions: &mut dyn SceneTransitions,
    ) -> GameResult<()> {
        if self.fade.is_started() {
            if self.fade.update(ctx.dt) {
                transitions.replace(Box::new(MenuScene::new(Rc::clone(&self.resources))));
            }
            return Ok(());
        }

        let controls = &ctx.controls;
        if controls.confirm || BACK_BUTTON.clicked(ctx.screen, controls.click) {
            self.fade.start();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut Canvas) {
        let size = canvas.size();
        draw_background(canvas, [0.0; 5]);
        draw_title(canvas, "You made it!");
        canvas.screen_text(
            "Developed by",
            Vec2::new(size.x / 3.0, size.y / 2.4),
            22.0,
            Color::WHITE,
            TextAlign::Center,
        );
        canvas.screen_text(
            "Inteli",
            Vec2::new(size.x / 1.4, size.y / 2.4),
            22.0,
            Color::WHITE,
            TextAlign::Center,
        );
        BACK_BUTTON.draw(canvas);
        draw_fade(canvas, &self.fade);
    }
}

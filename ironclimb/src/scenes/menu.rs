use std::rc::Rc;

use crate::camera::Fade;
use crate::canvas::Canvas;
use crate::error::GameResult;
use crate::math::Vec2;
use crate::resources::GameResources;
use crate::scene::{FrameContext, Scene, SceneTransitions};

use super::{draw_background, draw_fade, draw_title, GameplayScene, UiButton};

const START_BUTTON: UiButton = UiButton {
    label: "Start",
    anchor: Vec2::new(0.5, 1.0 / 1.7),
    size: Vec2::new(220.0, 64.0),
};

/// Title screen. Start (click or Enter) fades into a fresh gameplay scene.
pub struct MenuScene {
    resources: Rc<GameResources>,
    fade: Fade,
}

impl MenuScene {
    pub fn new(resources: Rc<GameResources>) -> Self {
        let fade = Fade::new(resources.config.fade_duration());
        Self { resources, fade }
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_started()
    }
}

impl Scene for MenuScene {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn update(
        &mut self,
        ctx: &FrameContext,
        transitions: &mut dyn SceneTransitions,
    ) -> GameResult<()> {
        if self.fade.is_started() {
            if self.fade.update(ctx.dt) {
                let gameplay = GameplayScene::new(Rc::clone(&self.resources))?;
                transitions.replace(Box::new(gameplay));
            }
            return Ok(());
        }

        let controls = &ctx.controls;
        if controls.confirm || START_BUTTON.clicked(ctx.screen, controls.click) {
            self.fade.start();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut Canvas) {
        draw_background(canvas, [0.0; 5]);
        draw_title(canvas, "IronClimb");
        START_BUTTON.draw(canvas);
        draw_fade(canvas, &self.fade);
    }
}

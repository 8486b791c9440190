//! The three screens of the game and the bits of UI they share.

mod gameplay;
mod menu;
mod victory;

pub use gameplay::{GameEvent, GameplayScene, LOSS_MESSAGE, SHIELD_MESSAGE, WEAPON_MESSAGE};
pub use menu::MenuScene;
pub use victory::VictoryScene;

use crate::camera::Fade;
use crate::canvas::{Canvas, Color, TextAlign};
use crate::math::{Rect, Vec2};

const SKY: Color = Color::rgb(0.36, 0.55, 0.78);
const HILL_COLORS: [Color; 5] = [
    Color::rgb(0.47, 0.62, 0.80),
    Color::rgb(0.40, 0.52, 0.70),
    Color::rgb(0.31, 0.42, 0.58),
    Color::rgb(0.22, 0.32, 0.44),
    Color::rgb(0.15, 0.22, 0.30),
];

/// Paint the five background layers, shifted by their parallax offsets.
pub(crate) fn draw_background(canvas: &mut Canvas, offsets: [f32; 5]) {
    let size = canvas.size();
    canvas.screen_rect(Rect::new(0.0, 0.0, size.x, size.y), SKY);
    for (layer, (offset, color)) in offsets.iter().zip(HILL_COLORS).enumerate() {
        let spacing = 140.0 + layer as f32 * 30.0;
        let width = spacing * 0.6;
        let base = size.y * (0.45 + layer as f32 * 0.1);
        let shift = offset.rem_euclid(spacing);
        let count = (size.x / spacing).ceil() as usize + 1;
        for i in 0..count {
            let x = i as f32 * spacing - shift;
            // Vary the silhouette heights a little per column.
            let seed = (i + (offset / spacing).floor() as usize + layer) % 3;
            let height = 40.0 + seed as f32 * 25.0;
            canvas.screen_rect(Rect::new(x, base - height, width, size.y - base + height), color);
        }
    }
}

/// Black overlay for the current fade progress.
pub(crate) fn draw_fade(canvas: &mut Canvas, fade: &Fade) {
    canvas.overlay(Color::BLACK.with_alpha(fade.progress()));
}

/// A clickable rectangle placed relative to the screen size.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UiButton {
    pub label: &'static str,
    /// Centre as fractions of the screen size.
    pub anchor: Vec2,
    pub size: Vec2,
}

impl UiButton {
    pub fn rect(&self, screen: Vec2) -> Rect {
        Rect::centered(Vec2::new(screen.x * self.anchor.x, screen.y * self.anchor.y), self.size)
    }

    pub fn clicked(&self, screen: Vec2, click: Option<Vec2>) -> bool {
        click.is_some_and(|p| self.rect(screen).contains(p))
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let rect = self.rect(canvas.size());
        canvas.screen_rect(rect, Color::rgb(0.12, 0.12, 0.16));
        canvas.screen_rect(
            Rect::new(rect.x + 3.0, rect.y + 3.0, rect.w - 6.0, rect.h - 6.0),
            Color::rgb(0.85, 0.55, 0.15),
        );
        canvas.screen_text(
            self.label,
            Vec2::new(rect.center().x, rect.y + (rect.h - 24.0) / 2.0),
            24.0,
            Color::WHITE,
            TextAlign::Center,
        );
    }
}

/// Large centred title text.
pub(crate) fn draw_title(canvas: &mut Canvas, text: &str) {
    let size = canvas.size();
    canvas.screen_text(
        text,
        Vec2::new(size.x / 2.0, size.y / 4.0 - 30.0),
        56.0,
        Color::WHITE,
        TextAlign::Center,
    );
}

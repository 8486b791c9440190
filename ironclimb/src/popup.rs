use std::time::Duration;

use crate::canvas::{Canvas, Color, TextAlign};
use crate::math::{Rect, Vec2};

const MARGIN: f32 = 10.0;
const WIDTH: f32 = 230.0;
const HEIGHT: f32 = 150.0;
/// Distance from the right edge of the screen to the panel's right edge.
const RIGHT_INSET: f32 = 200.0;
const TEXT_SIZE: f32 = 16.0;
const BACKGROUND: Color = Color::rgba(0.0, 0.0, 0.0, 0.8);

/// A self-dismissing notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub message: String,
    pub remaining: Duration,
}

/// Notifications shown in the top-right corner of the screen.
#[derive(Clone, Debug, Default)]
pub struct Popups {
    active: Vec<Popup>,
}

impl Popups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, ttl: Duration) {
        let message = message.into();
        log::debug!("popup: {}", message.replace('\n', " / "));
        self.active.push(Popup {
            message,
            remaining: ttl,
        });
    }

    /// Age every popup and drop the expired ones.
    pub fn update(&mut self, dt: Duration) {
        for popup in &mut self.active {
            popup.remaining = popup.remaining.saturating_sub(dt);
        }
        self.active.retain(|p| !p.remaining.is_zero());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Popup> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Draw every popup in screen space, newest on top.
    pub fn draw(&self, canvas: &mut Canvas) {
        let screen = canvas.size();
        let right = screen.x - RIGHT_INSET;
        let panel = Rect::new(right - WIDTH, MARGIN, WIDTH, HEIGHT);
        for popup in &self.active {
            canvas.screen_rect(panel, BACKGROUND);
            canvas.screen_text(
                &popup.message,
                Vec2::new(panel.right() - MARGIN, panel.y + MARGIN),
                TEXT_SIZE,
                Color::WHITE,
                TextAlign::Right,
            );
        }
    }
}

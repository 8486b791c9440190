//! Per-frame display list.
//!
//! Scenes never talk to the GPU. They push rectangles and text into a
//! [`Canvas`], either in world space (seen through the camera) or in screen
//! space (HUD, popups, menus), and the renderer replays the list.

use crate::math::{Rect, Vec2};

/// RGBA colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Coordinate space of a draw command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    /// World pixels, transformed by the canvas camera.
    World,
    /// Logical screen pixels, origin top-left.
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    /// `position` is the top-right corner of the text block.
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Rect {
        space: Space,
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        position: Vec2,
        size: f32,
        color: Color,
        align: TextAlign,
    },
}

/// Camera placement used for world-space commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub scroll: Vec2,
    pub zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Display list filled by the active scene each frame.
#[derive(Clone, Debug)]
pub struct Canvas {
    size: Vec2,
    view: View,
    clear_color: Color,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            view: View::default(),
            clear_color: Color::BLACK,
            commands: Vec::new(),
        }
    }

    /// Screen size in logical pixels.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Drop last frame's commands and reset the camera and clear colour.
    pub fn begin(&mut self) {
        self.commands.clear();
        self.view = View::default();
        self.clear_color = Color::BLACK;
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn world_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect {
            space: Space::World,
            rect,
            color,
        });
    }

    pub fn screen_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect {
            space: Space::Screen,
            rect,
            color,
        });
    }

    /// Queue screen-space text. Lines are separated by `\n`.
    pub fn screen_text(
        &mut self,
        text: &str,
        position: Vec2,
        size: f32,
        color: Color,
        align: TextAlign,
    ) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            size,
            color,
            align,
        });
    }

    /// Cover the whole screen, used for fades.
    pub fn overlay(&mut self, color: Color) {
        if color.a > 0.0 {
            self.screen_rect(Rect::new(0.0, 0.0, self.size.x, self.size.y), color);
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Rect { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_resets_the_frame() {
        let mut canvas = Canvas::new(Vec2::new(100.0, 50.0));
        canvas.set_view(View {
            scroll: Vec2::new(10.0, 0.0),
            zoom: 2.0,
        });
        canvas.world_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        canvas.screen_text("hi", Vec2::ZERO, 16.0, Color::WHITE, TextAlign::Left);
        assert_eq!(canvas.commands().len(), 2);
        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["hi"]);

        canvas.begin();
        assert!(canvas.commands().is_empty());
        assert_eq!(canvas.view(), View::default());
    }

    #[test]
    fn transparent_overlay_is_skipped() {
        let mut canvas = Canvas::new(Vec2::new(100.0, 50.0));
        canvas.overlay(Color::BLACK.with_alpha(0.0));
        assert!(canvas.commands().is_empty());
        canvas.overlay(Color::BLACK.with_alpha(0.5));
        assert_eq!(
            canvas.commands()[0],
            DrawCommand::Rect {
                space: Space::Screen,
                rect: Rect::new(0.0, 0.0, 100.0, 50.0),
                color: Color::rgba(0.0, 0.0, 0.0, 0.5),
            }
        );
    }
}

//! Turns a [`Canvas`] into GPU-ready batches.
//!
//! Text is drawn after the rectangles of its batch, so a rectangle queued
//! after some text (a fade overlay, a popup on top of a label) starts a new
//! batch to keep the painter's order.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::canvas::{Canvas, Color, DrawCommand, Space, TextAlign};
use crate::math::{screen_projection, world_projection, Rect, Vec2};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

pub(crate) struct TextItem<'a> {
    pub text: &'a str,
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
}

#[derive(Default)]
pub(crate) struct Batch<'a> {
    pub vertices: Vec<QuadVertex>,
    pub texts: Vec<TextItem<'a>>,
}

/// Split the display list into batches, transforming rectangles to clip space.
pub(crate) fn build_batches(canvas: &Canvas) -> Vec<Batch<'_>> {
    let size = canvas.size();
    let view = canvas.view();
    let world = world_projection(size.x, size.y, view.scroll, view.zoom);
    let screen = screen_projection(size.x, size.y);

    let mut batches = Vec::new();
    let mut current = Batch::default();
    for command in canvas.commands() {
        match command {
            DrawCommand::Rect { space, rect, color } => {
                if !current.texts.is_empty() {
                    batches.push(std::mem::take(&mut current));
                }
                let matrix = match space {
                    Space::World => &world,
                    Space::Screen => &screen,
                };
                push_quad(&mut current.vertices, matrix, *rect, *color);
            }
            DrawCommand::Text {
                text,
                position,
                size,
                color,
                align,
            } => current.texts.push(TextItem {
                text,
                position: *position,
                size: *size,
                color: *color,
                align: *align,
            }),
        }
    }
    batches.push(current);
    batches
}

fn push_quad(out: &mut Vec<QuadVertex>, matrix: &Mat4, rect: Rect, color: Color) {
    let corner = |x: f32, y: f32| {
        let p = matrix.project_point3(Vec3::new(x, y, 0.0));
        QuadVertex {
            position: [p.x, p.y],
            color: color.to_array(),
        }
    };
    let tl = corner(rect.x, rect.y);
    let tr = corner(rect.right(), rect.y);
    let br = corner(rect.right(), rect.bottom());
    let bl = corner(rect.x, rect.bottom());
    out.extend_from_slice(&[tl, tr, br, tl, br, bl]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::View;

    #[test]
    fn rects_after_text_start_a_new_batch() {
        let mut canvas = Canvas::new(Vec2::new(100.0, 100.0));
        canvas.screen_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        canvas.screen_text("a", Vec2::ZERO, 16.0, Color::WHITE, TextAlign::Left);
        canvas.screen_text("b", Vec2::ZERO, 16.0, Color::WHITE, TextAlign::Left);
        canvas.overlay(Color::BLACK.with_alpha(0.5));

        let batches = build_batches(&canvas);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].vertices.len(), 6);
        assert_eq!(batches[0].texts.len(), 2);
        assert_eq!(batches[1].vertices.len(), 6);
        assert!(batches[1].texts.is_empty());
    }

    #[test]
    fn world_rects_follow_the_camera() {
        let mut canvas = Canvas::new(Vec2::new(100.0, 100.0));
        canvas.set_view(View {
            scroll: Vec2::new(50.0, 0.0),
            zoom: 1.0,
        });
        canvas.world_rect(Rect::new(50.0, 0.0, 10.0, 10.0), Color::WHITE);
        canvas.screen_rect(Rect::new(50.0, 0.0, 10.0, 10.0), Color::WHITE);

        let batches = build_batches(&canvas);
        let world_tl = batches[0].vertices[0].position;
        let screen_tl = batches[0].vertices[6].position;
        assert!((world_tl[0] + 1.0).abs() < 1e-5);
        assert!((screen_tl[0] - 0.0).abs() < 1e-5);
        assert!((world_tl[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_canvas_still_yields_one_batch() {
        let canvas = Canvas::new(Vec2::new(100.0, 100.0));
        assert_eq!(build_batches(&canvas).len(), 1);
    }
}

//! Follow camera, parallax offsets and the fade-out effect.

use std::time::Duration;

use crate::canvas::View;
use crate::math::{Rect, Vec2};

/// Scroll factors of the five background layers, back to front.
pub const PARALLAX_FACTORS: [f32; 5] = [0.05, 0.1, 0.15, 0.2, 0.25];

/// Camera that keeps a target centred while staying inside the world.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World position of the top-left corner of the view.
    scroll: Vec2,
    zoom: f32,
    /// Screen size in logical pixels.
    viewport: Vec2,
    bounds: Rect,
}

impl Camera {
    pub fn new(viewport: Vec2, bounds: Rect, zoom: f32) -> Self {
        Self {
            scroll: Vec2::new(bounds.x, bounds.y),
            zoom: zoom.max(f32::EPSILON),
            viewport,
            bounds,
        }
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Size of the visible world area.
    pub fn visible_size(&self) -> Vec2 {
        self.viewport / self.zoom
    }

    /// Centre the view on `target`, clamped to the world bounds.
    pub fn follow(&mut self, target: Vec2) {
        let visible = self.visible_size();
        let desired = target - visible / 2.0;
        self.scroll = Vec2::new(
            clamp_axis(desired.x, self.bounds.x, self.bounds.w, visible.x),
            clamp_axis(desired.y, self.bounds.y, self.bounds.h, visible.y),
        );
    }

    pub fn view(&self) -> View {
        View {
            scroll: self.scroll,
            zoom: self.zoom,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.scroll) * self.zoom
    }

    /// Horizontal texture offset of each background layer.
    pub fn parallax_offsets(&self) -> [f32; 5] {
        PARALLAX_FACTORS.map(|f| self.scroll.x * f)
    }
}

fn clamp_axis(desired: f32, start: f32, length: f32, visible: f32) -> f32 {
    if visible >= length {
        // World smaller than the view: centre it.
        start + (length - visible) / 2.0
    } else {
        desired.clamp(start, start + length - visible)
    }
}

/// Fade to black. Reports completion exactly once.
#[derive(Clone, Copy, Debug)]
pub struct Fade {
    duration: Duration,
    elapsed: Duration,
    state: FadeState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FadeState {
    Idle,
    Running,
    Done,
}

impl Fade {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            state: FadeState::Idle,
        }
    }

    /// Begin fading. Has no effect once a fade has started.
    pub fn start(&mut self) -> bool {
        if self.state != FadeState::Idle {
            return false;
        }
        self.state = FadeState::Running;
        true
    }

    pub fn is_started(&self) -> bool {
        self.state != FadeState::Idle
    }

    /// Advance the fade. Returns true on the update that completes it.
    pub fn update(&mut self, dt: Duration) -> bool {
        if self.state != FadeState::Running {
            return false;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.elapsed >= self.duration {
            self.state = FadeState::Done;
            return true;
        }
        false
    }

    /// 0.0 before the fade starts, 1.0 once it is complete.
    pub fn progress(&self) -> f32 {
        match self.state {
            FadeState::Idle => 0.0,
            FadeState::Done => 1.0,
            FadeState::Running if self.duration.is_zero() => 1.0,
            FadeState::Running => self.elapsed.as_secs_f32() / self.duration.as_secs_f32(),
        }
    }
}

//! IronClimb - a small side-scrolling platformer.
//!
//! The gameplay is headless: scenes consume a [`FrameContext`] and describe
//! each frame into a [`Canvas`]. The [`Engine`] owns the window, samples
//! input, drives the [`SceneManager`] and hands the canvas to the renderer.

pub mod animation;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod input;
pub mod math;
pub mod physics;
pub mod popup;
pub mod render;
pub mod resources;
pub mod scene;
pub mod scenes;
pub mod tilemap;
pub mod timer;

pub use crate::canvas::Canvas;
pub use crate::config::GameConfig;
pub use crate::engine::Engine;
pub use crate::error::{GameError, GameResult};
pub use crate::input::{Controls, InputMap, InputState};
pub use crate::math::{Rect, Vec2};
pub use crate::resources::GameResources;
pub use crate::scene::{FrameContext, PendingTransition, Scene, SceneManager, SceneTransitions};
pub use crate::scenes::{GameplayScene, MenuScene, VictoryScene};
pub use winit::keyboard::KeyCode;

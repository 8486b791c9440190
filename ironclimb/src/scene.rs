use std::time::Duration;

use crate::canvas::Canvas;
use crate::error::GameResult;
use crate::input::Controls;
use crate::math::Vec2;

/// Everything a scene sees about the current frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub dt: Duration,
    pub controls: Controls,
    /// Logical screen size, the coordinate space of `controls.click`.
    pub screen: Vec2,
}

impl FrameContext {
    pub fn new(dt: Duration, controls: Controls, screen: Vec2) -> Self {
        Self {
            dt,
            controls,
            screen,
        }
    }
}

/// Handle through which a scene asks for the next scene.
/// This allows scenes to transition without direct access to the manager.
pub trait SceneTransitions {
    /// Replace the active scene. Applied at the next frame boundary.
    fn replace(&mut self, scene: Box<dyn Scene>);
}

/// One screen of the game: menu, gameplay or victory.
pub trait Scene {
    fn name(&self) -> &'static str;

    /// Called when this scene becomes active.
    fn on_enter(&mut self) -> GameResult<()> {
        Ok(())
    }

    /// Called when this scene is replaced.
    fn on_exit(&mut self) -> GameResult<()> {
        Ok(())
    }

    /// Advance the scene by one frame.
    fn update(
        &mut self,
        ctx: &FrameContext,
        transitions: &mut dyn SceneTransitions,
    ) -> GameResult<()>;

    /// Describe this frame into the display list.
    fn draw(&self, canvas: &mut Canvas);
}

/// Records the last requested transition. Used by the manager and by
/// anything driving a scene directly.
#[derive(Default)]
pub struct PendingTransition {
    next: Option<Box<dyn Scene>>,
}

impl PendingTransition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<Box<dyn Scene>> {
        self.next.take()
    }

    pub fn is_pending(&self) -> bool {
        self.next.is_some()
    }

    /// Name of the requested scene, if any.
    pub fn target(&self) -> Option<&'static str> {
        self.next.as_ref().map(|s| s.name())
    }
}

impl SceneTransitions for PendingTransition {
    fn replace(&mut self, scene: Box<dyn Scene>) {
        self.next = Some(scene);
    }
}

/// Owns the single active scene and applies deferred transitions.
pub struct SceneManager {
    active: Box<dyn Scene>,
    pending: PendingTransition,
    started: bool,
}

impl SceneManager {
    pub fn new(initial: Box<dyn Scene>) -> Self {
        Self {
            active: initial,
            pending: PendingTransition::new(),
            started: false,
        }
    }

    pub fn active_name(&self) -> &'static str {
        self.active.name()
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_pending()
    }

    /// Swap in the requested scene, if any.
    pub fn apply_transitions(&mut self) -> GameResult<()> {
        if let Some(mut next) = self.pending.take() {
            log::info!("scene: {} -> {}", self.active.name(), next.name());
            self.active.on_exit()?;
            next.on_enter()?;
            self.active = next;
        }
        Ok(())
    }

    /// Apply pending transitions, then update the active scene.
    pub fn update(&mut self, ctx: &FrameContext) -> GameResult<()> {
        if !self.started {
            self.started = true;
            log::info!("scene: starting {}", self.active.name());
            self.active.on_enter()?;
        }
        self.apply_transitions()?;
        self.active.update(ctx, &mut self.pending)
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        self.active.draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        next: Option<&'static str>,
    }

    impl Scene for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_enter(&mut self) -> GameResult<()> {
            self.log.borrow_mut().push(format!("enter {}", self.name));
            Ok(())
        }

        fn on_exit(&mut self) -> GameResult<()> {
            self.log.borrow_mut().push(format!("exit {}", self.name));
            Ok(())
        }

        fn update(
            &mut self,
            _ctx: &FrameContext,
            transitions: &mut dyn SceneTransitions,
        ) -> GameResult<()> {
            self.log.borrow_mut().push(format!("update {}", self.name));
            if let Some(name) = self.next.take() {
                transitions.replace(Box::new(Recorder {
                    name,
                    log: Rc::clone(&self.log),
                    next: None,
                }));
            }
            Ok(())
        }

        fn draw(&self, _canvas: &mut Canvas) {}
    }

    #[test]
    fn transitions_apply_at_the_next_frame() {
        let log: Log = Rc::default();
        let mut manager = SceneManager::new(Box::new(Recorder {
            name: "menu",
            log: Rc::clone(&log),
            next: Some("gameplay"),
        }));
        let ctx = FrameContext::new(Duration::from_millis(16), Controls::default(), Vec2::ZERO);

        manager.update(&ctx).unwrap();
        assert_eq!(manager.active_name(), "menu");
        assert!(manager.has_pending_transition());

        manager.update(&ctx).unwrap();
        assert_eq!(manager.active_name(), "gameplay");
        assert_eq!(
            *log.borrow(),
            vec![
                "enter menu",
                "update menu",
                "exit menu",
                "enter gameplay",
                "update gameplay",
            ]
        );
    }
}

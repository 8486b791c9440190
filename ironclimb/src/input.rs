use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::math::Vec2;

/// Tracks keyboard and mouse state across frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,

    mouse: Vec2,
    mouse_down: [bool; 3],
    mouse_pressed: [bool; 3],
    mouse_released: [bool; 3],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.fill(false);
        self.mouse_released.fill(false);
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(keycode) = event.physical_key {
            self.set_key(keycode, event.state == ElementState::Pressed);
        }
    }

    /// Press or release a key. Used by the event loop and by headless drivers.
    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if down {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Handle a mouse button input event from winit.
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.set_mouse_button(button, state == ElementState::Pressed);
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        let Some(idx) = mouse_button_index(button) else {
            return;
        };
        if down {
            if !self.mouse_down[idx] {
                self.mouse_pressed[idx] = true;
            }
            self.mouse_down[idx] = true;
        } else {
            if self.mouse_down[idx] {
                self.mouse_released[idx] = true;
            }
            self.mouse_down[idx] = false;
        }
    }

    /// Handle mouse cursor movement, in logical pixels.
    pub fn handle_cursor_moved(&mut self, x: f32, y: f32) {
        self.mouse = Vec2::new(x, y);
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        mouse_button_index(button)
            .map(|idx| self.mouse_down[idx])
            .unwrap_or(false)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        mouse_button_index(button)
            .map(|idx| self.mouse_pressed[idx])
            .unwrap_or(false)
    }

    pub fn is_mouse_released(&self, button: MouseButton) -> bool {
        mouse_button_index(button)
            .map(|idx| self.mouse_released[idx])
            .unwrap_or(false)
    }

    /// Current mouse cursor position in logical pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }
}

fn mouse_button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Logical actions the scenes react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Shield,
    Confirm,
}

/// Mapping from actions to keys. Mouse clicks reach scenes as [`Controls::click`].
#[derive(Clone, Debug, Default)]
pub struct InputMap {
    actions: HashMap<Action, Vec<KeyCode>>,
}

impl InputMap {
    /// Create an empty input map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrows to move and climb, Space to fire, S for the shield and Enter
    /// to confirm. Escape is handled by the engine.
    pub fn with_default_bindings() -> Self {
        let mut map = Self::new();
        map.bind_key(Action::Left, KeyCode::ArrowLeft);
        map.bind_key(Action::Right, KeyCode::ArrowRight);
        map.bind_key(Action::Up, KeyCode::ArrowUp);
        map.bind_key(Action::Down, KeyCode::ArrowDown);
        map.bind_key(Action::Fire, KeyCode::Space);
        map.bind_key(Action::Shield, KeyCode::KeyS);
        map.bind_key(Action::Confirm, KeyCode::Enter);
        map.bind_key(Action::Confirm, KeyCode::NumpadEnter);
        map
    }

    pub fn bind_key(&mut self, action: Action, key: KeyCode) {
        self.actions.entry(action).or_default().push(key);
    }

    pub fn action_down(&self, input: &InputState, action: Action) -> bool {
        self.actions
            .get(&action)
            .map(|keys| keys.iter().any(|&k| input.is_key_down(k)))
            .unwrap_or(false)
    }

    pub fn action_pressed(&self, input: &InputState, action: Action) -> bool {
        self.actions
            .get(&action)
            .map(|keys| keys.iter().any(|&k| input.is_key_pressed(k)))
            .unwrap_or(false)
    }

    /// Snapshot the actions a scene needs for one update.
    pub fn controls(&self, input: &InputState) -> Controls {
        Controls {
            left: self.action_down(input, Action::Left),
            right: self.action_down(input, Action::Right),
            up: self.action_down(input, Action::Up),
            down: self.action_down(input, Action::Down),
            fire: self.action_pressed(input, Action::Fire),
            shield: self.action_down(input, Action::Shield),
            confirm: self.action_pressed(input, Action::Confirm),
            click: input
                .is_mouse_pressed(MouseButton::Left)
                .then(|| input.mouse_position()),
        }
    }
}

/// Per-frame control state handed to scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire was pressed this frame.
    pub fire: bool,
    /// Shield is held.
    pub shield: bool,
    /// Confirm was pressed this frame.
    pub confirm: bool,
    /// Screen position of a left click made this frame.
    pub click: Option<Vec2>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_only_lasts_one_frame() {
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);
        assert!(input.is_key_pressed(KeyCode::Space));
        input.begin_frame();
        input.set_key(KeyCode::Space, true);
        assert!(input.is_key_down(KeyCode::Space));
        assert!(!input.is_key_pressed(KeyCode::Space));
        input.set_key(KeyCode::Space, false);
        assert!(input.is_key_released(KeyCode::Space));
        assert!(!input.is_key_down(KeyCode::Space));
    }

    #[test]
    fn default_bindings_produce_controls() {
        let map = InputMap::with_default_bindings();
        let mut input = InputState::new();
        input.set_key(KeyCode::ArrowLeft, true);
        input.set_key(KeyCode::KeyS, true);
        input.set_key(KeyCode::Space, true);
        let controls = map.controls(&input);
        assert!(controls.left && controls.shield && controls.fire);
        assert!(!controls.right && !controls.confirm);

        input.begin_frame();
        let controls = map.controls(&input);
        assert!(controls.left && !controls.fire);
    }

    #[test]
    fn clicks_carry_the_cursor_position() {
        let map = InputMap::with_default_bindings();
        let mut input = InputState::new();
        input.handle_cursor_moved(500.0, 320.0);
        input.set_mouse_button(MouseButton::Left, true);
        assert_eq!(map.controls(&input).click, Some(Vec2::new(500.0, 320.0)));
        input.begin_frame();
        assert!(input.is_mouse_down(MouseButton::Left));
        assert_eq!(map.controls(&input).click, None);
        input.set_mouse_button(MouseButton::Left, false);
        assert!(input.is_mouse_released(MouseButton::Left));
        assert!(!input.is_mouse_down(MouseButton::Left));
    }
}

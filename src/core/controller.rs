/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    Space,
    Shift,
    Escape,
    /// Toggles the debug overlay
    Digit1,
    /// Toggles progressive denoising
    KeyR,
    /// Toggles pause
    KeyP,
    MouseLeft,
    MouseRight,
}

/// Controller - handles button input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Check if button went down since the last frame
    fn just_pressed(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Mouse movement accumulated since the last frame
    fn mouse_delta(&self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

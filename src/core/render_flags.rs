use super::controller::{Button, Controller};

/// Runtime toggles flipped from the keyboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderFlags {
    /// Draw the reference grid and stats overlay
    pub debug: bool,
    /// Blend each frame with the accumulated history
    pub denoise: bool,
    /// Ask the shader to hold the previous image
    pub pause: bool,
}

impl RenderFlags {
    /// Applies `1` / `R` / `P` presses; returns true if anything changed
    pub fn apply_input(&mut self, controller: &dyn Controller) -> bool {
        let before = *self;

        if controller.just_pressed(Button::Digit1) {
            self.debug = !self.debug;
        }
        if controller.just_pressed(Button::KeyR) {
            self.denoise = !self.denoise;
        }
        if controller.just_pressed(Button::KeyP) {
            self.pause = !self.pause;
        }

        if *self != before {
            log::info!(
                "Flags: debug={} denoise={} pause={}",
                self.debug,
                self.denoise,
                self.pause
            );
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input_adapter::WinitController;

    #[test]
    fn test_default_flags_off() {
        let flags = RenderFlags::default();
        assert!(!flags.debug && !flags.denoise && !flags.pause);
    }

    #[test]
    fn test_toggle_on_press_only() {
        let mut controller = WinitController::new();
        let mut flags = RenderFlags::default();

        controller.press(Button::KeyR);
        assert!(flags.apply_input(&controller));
        assert!(flags.denoise);

        // Still held next frame: no second toggle
        controller.end_frame();
        assert!(!flags.apply_input(&controller));
        assert!(flags.denoise);

        controller.release(Button::KeyR);
        controller.press(Button::KeyR);
        flags.apply_input(&controller);
        assert!(!flags.denoise);
    }

    #[test]
    fn test_independent_toggles() {
        let mut controller = WinitController::new();
        let mut flags = RenderFlags::default();

        controller.press(Button::Digit1);
        controller.press(Button::KeyP);
        flags.apply_input(&controller);

        assert_eq!(
            flags,
            RenderFlags {
                debug: true,
                denoise: false,
                pause: true
            }
        );
    }
}

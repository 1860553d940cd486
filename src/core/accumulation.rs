/// Progressive accumulation state for the two ping-pong render targets
///
/// Each frame the shader writes into the `current` target while sampling the
/// other one as the previous frame. `num_rendered_frames` is the running-average
/// weight: it counts frames since denoising was switched on and stays at 0
/// while denoising is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    num_rendered_frames: u32,
    current: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the frame counter and returns the value to upload
    pub fn advance(&mut self, denoise: bool) -> u32 {
        self.num_rendered_frames = if denoise {
            self.num_rendered_frames.saturating_add(1)
        } else {
            0
        };
        self.num_rendered_frames
    }

    pub fn num_rendered_frames(&self) -> u32 {
        self.num_rendered_frames
    }

    /// Index of the target written this frame
    pub fn current(&self) -> usize {
        self.current
    }

    /// Index of the target holding last frame's image
    pub fn previous(&self) -> usize {
        1 - self.current
    }

    /// Flips the roles of the two targets once a frame has been presented
    pub fn swap(&mut self) {
        self.current = self.previous();
    }

    /// Drops accumulated history; the next denoised frame starts from 1
    pub fn reset(&mut self) {
        self.num_rendered_frames = 0;
    }
}

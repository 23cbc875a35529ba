use tracing::{debug, warn};

use crate::monitor::tracker::{Frame, Presenter, Violations};

/// Presents frames to the log only. Keeps a running tally so a driver can
/// report conformance at the end of a run.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    pub frames: u64,
    pub frames_with_violations: u64,
    /// Union of every violation seen so far.
    pub all_violations: Violations,
    pub last_violations: Violations,
    /// Mean of the three channels over the last frame, 0.0..=255.0.
    pub last_brightness: f64,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_conformant(&self) -> bool {
        self.all_violations.is_empty()
    }
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, frame: &Frame<'_>) {
        let pixels = frame.framebuffer.pixels();
        let total: u64 = pixels
            .iter()
            .map(|p| p.red as u64 + p.green as u64 + p.blue as u64)
            .sum();
        self.last_brightness = if pixels.is_empty() {
            0.0
        } else {
            total as f64 / (pixels.len() * 3) as f64
        };

        self.frames += 1;
        self.last_violations = frame.violations;
        if frame.violations.is_empty() {
            debug!(
                "Frame {}: {}x{}, brightness {:.1}",
                frame.number,
                frame.framebuffer.width(),
                frame.framebuffer.height(),
                self.last_brightness
            );
        } else {
            self.frames_with_violations += 1;
            self.all_violations.horizontal |= frame.violations.horizontal;
            self.all_violations.vertical |= frame.violations.vertical;
            warn!(
                "Frame {}: timing violations {:#06x} (h: {:?}, v: {:?})",
                frame.number,
                frame.violations.bits(),
                frame.violations.horizontal,
                frame.violations.vertical
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::classify::PhaseFlags;
    use crate::monitor::framebuffer::{Framebuffer, Pixel};

    #[test]
    fn test_tally() {
        let mut fb = Framebuffer::new(2, 2);
        let mut presenter = HeadlessPresenter::new();
        presenter.present(&Frame {
            number: 0,
            framebuffer: &fb,
            violations: Violations::default(),
        });
        assert_eq!(presenter.frames, 1);
        assert_eq!(presenter.last_brightness, 0.0);
        assert!(presenter.is_conformant());

        fb.set(0, 0, Pixel::rgb(0xff, 0xff, 0xff));
        let violations = Violations {
            horizontal: PhaseFlags::RGB_IN_BACK_PORCH,
            vertical: PhaseFlags::empty(),
        };
        presenter.present(&Frame {
            number: 1,
            framebuffer: &fb,
            violations,
        });
        assert_eq!(presenter.frames, 2);
        assert_eq!(presenter.frames_with_violations, 1);
        assert_eq!(presenter.all_violations, violations);
        assert_eq!(presenter.last_brightness, 255.0 / 4.0);
        assert!(!presenter.is_conformant());
    }
}

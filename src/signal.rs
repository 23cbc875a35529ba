//! A reference VGA signal source. Steps a raster one pixel clock at a time and
//! produces exactly what a correctly timed video generator would drive on its
//! pins, so the tracker can be exercised without a hardware model.

use crate::monitor::timing::{ColorDepth, Nanos, TimingSpec};
use crate::monitor::tracker::Sample;

/// Raw channel values as driven on the pins.
pub type Rgb = (u8, u8, u8);

/// Built-in test images for the active area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pattern {
    /// Every channel at full scale.
    #[default]
    White,
    /// Eight vertical bars cycling through every RGB combination.
    Bars,
    /// 8x8 pixel checkerboard.
    Checker,
}

impl Pattern {
    pub fn color(&self, x: usize, y: usize, width: usize, depth: ColorDepth) -> Rgb {
        let max = depth.max_value();
        let on = |bit: bool| if bit { max } else { 0 };
        match self {
            Pattern::White => (max, max, max),
            Pattern::Bars => {
                let bar = x * 8 / width.max(1);
                (on(bar & 4 != 0), on(bar & 2 != 0), on(bar & 1 != 0))
            }
            Pattern::Checker => {
                let v = on((x / 8 + y / 8) % 2 == 0);
                (v, v, v)
            }
        }
    }
}

pub struct SignalGen<F> {
    timing: TimingSpec,
    pattern: F,
    pub x: usize, // 0..htot-1, 0 at the hsync falling edge
    pub y: usize, // 0..vtot-1, 0 at the vsync falling edge
    h_sync_pixels: usize,
    h_visible_start: usize,
    v_sync_lines: usize,
    v_visible_start: usize,
}

impl<F: FnMut(usize, usize) -> Rgb> SignalGen<F> {
    /// `pattern` is asked for the color of each visible pixel, in visible-area
    /// coordinates.
    pub fn new(timing: TimingSpec, pattern: F) -> Self {
        let h = timing.horizontal;
        let v = timing.vertical;
        Self {
            pattern,
            x: 0,
            y: 0,
            h_sync_pixels: (h.sync_pulse / timing.pixel_period) as usize,
            h_visible_start: (h.visible_start() / timing.pixel_period) as usize,
            v_sync_lines: (v.sync_pulse / timing.line_period) as usize,
            v_visible_start: (v.visible_start() / timing.line_period) as usize,
            timing,
        }
    }

    pub fn timing(&self) -> &TimingSpec {
        &self.timing
    }

    /// Time between two consecutive samples.
    pub fn delta(&self) -> Nanos {
        self.timing.pixel_period
    }

    /// Emits the sample for the current raster position and advances by one
    /// pixel clock.
    pub fn tick(&mut self) -> (Sample, Nanos) {
        let h_sync = self.x >= self.h_sync_pixels;
        let v_sync = self.y >= self.v_sync_lines;

        let visible_x = self.x.checked_sub(self.h_visible_start);
        let visible_y = self.y.checked_sub(self.v_visible_start);
        let (red, green, blue) = match (visible_x, visible_y) {
            (Some(x), Some(y)) if x < self.timing.width && y < self.timing.height => {
                (self.pattern)(x, y)
            }
            _ => (0, 0, 0),
        };

        // Advance raster
        self.x += 1;
        if self.x == self.timing.htot() {
            self.x = 0;
            self.y += 1;
            if self.y == self.timing.vtot() {
                self.y = 0;
            }
        }

        (
            Sample {
                h_sync,
                v_sync,
                red,
                green,
                blue,
            },
            self.delta(),
        )
    }
}

/// A source that paints `pattern` at the given depth.
pub fn pattern_source(
    timing: TimingSpec,
    depth: ColorDepth,
    pattern: Pattern,
) -> SignalGen<impl FnMut(usize, usize) -> Rgb> {
    let width = timing.width;
    SignalGen::new(timing, move |x, y| pattern.color(x, y, width, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::timing::Mode;

    fn timing() -> TimingSpec {
        TimingSpec::new(Mode::Vga640x480At60Hz)
    }

    #[test]
    fn test_signal_gen_frame() {
        let timing = timing();
        let mut source = pattern_source(timing, ColorDepth::default(), Pattern::White);
        let mut h_last = true;
        let mut v_last = true;
        let mut lines = 0;
        let mut frames = 0;
        for _ in 0..timing.pixel_tot() {
            let (sample, delta) = source.tick();
            assert_eq!(delta, 40);
            if h_last && !sample.h_sync {
                lines += 1;
            }
            if v_last && !sample.v_sync {
                frames += 1;
            }
            h_last = sample.h_sync;
            v_last = sample.v_sync;
        }

        assert_eq!(source.x, 0);
        assert_eq!(source.y, 0);
        assert_eq!(lines, 525);
        assert_eq!(frames, 1);
    }

    #[test]
    fn test_sync_runs() {
        let timing = timing();
        let mut source = pattern_source(timing, ColorDepth::default(), Pattern::White);
        let first_line: Vec<Sample> = (0..timing.htot()).map(|_| source.tick().0).collect();
        assert!(first_line[..96].iter().all(|s| !s.h_sync && !s.v_sync));
        assert!(first_line[96..].iter().all(|s| s.h_sync && !s.v_sync));
        assert!(first_line.iter().all(Sample::is_blank));
    }

    #[test]
    fn test_visible_pixels() {
        let timing = timing();
        let mut seen = Vec::new();
        let mut source = SignalGen::new(timing, |x, y| {
            seen.push((x, y));
            (1, 2, 3)
        });
        let mut lit = 0;
        for _ in 0..timing.pixel_tot() {
            if !source.tick().0.is_blank() {
                lit += 1;
            }
        }
        drop(source);
        assert_eq!(lit, 640 * 480);
        assert_eq!(seen.first(), Some(&(0, 0)));
        assert_eq!(seen.last(), Some(&(639, 479)));
    }

    #[test]
    fn test_bars() {
        let depth = ColorDepth::default();
        assert_eq!(Pattern::Bars.color(0, 0, 640, depth), (0, 0, 0));
        assert_eq!(Pattern::Bars.color(80, 0, 640, depth), (0, 0, 7));
        assert_eq!(Pattern::Bars.color(639, 0, 640, depth), (7, 7, 7));
        assert_eq!(Pattern::Checker.color(8, 0, 640, depth), (0, 0, 0));
        assert_eq!(Pattern::Checker.color(8, 8, 640, depth), (7, 7, 7));
    }
}

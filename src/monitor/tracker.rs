//! Reconstructs frames from the sync and color lines of a VGA signal.
//!
//! The tracker only trusts falling edges: a new line starts when hsync drops
//! and a new frame starts when vsync drops. Between edges the pixel position is
//! derived from the time elapsed since the edge. Timing conformance is checked
//! independently on both axes and reported per frame.

use tracing::{debug, info, trace};

use super::classify::{PhaseFlags, classify};
use super::config::{ConfigError, MonitorConfig, check_tolerance};
use super::framebuffer::{Framebuffer, Pixel};
use super::timing::{Nanos, TimingSpec};

/// The four signal lines at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub h_sync: bool,
    pub v_sync: bool,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Sample {
    pub fn is_blank(&self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0
    }
}

/// Timing violations seen on both axes during one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Violations {
    pub horizontal: PhaseFlags,
    pub vertical: PhaseFlags,
}

impl Default for Violations {
    fn default() -> Self {
        Self {
            horizontal: PhaseFlags::empty(),
            vertical: PhaseFlags::empty(),
        }
    }
}

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }

    /// Packed 14-bit mask: horizontal flags in bits 0..7, vertical in 7..14.
    pub fn bits(&self) -> u16 {
        self.horizontal.bits() as u16 | (self.vertical.bits() as u16) << PhaseFlags::BITS
    }

    pub fn from_bits(bits: u16) -> Self {
        Self {
            horizontal: PhaseFlags::from_bits_truncate(bits as u8),
            vertical: PhaseFlags::from_bits_truncate((bits >> PhaseFlags::BITS) as u8),
        }
    }
}

/// A completed frame, lent to the presenter at the frame boundary.
pub struct Frame<'a> {
    /// Zero-based count of completed frames.
    pub number: u64,
    pub framebuffer: &'a Framebuffer,
    pub violations: Violations,
}

/// Receives each completed frame. The framebuffer is only valid for the
/// duration of the call; the tracker starts overwriting it with the next
/// sample.
pub trait Presenter {
    fn present(&mut self, frame: &Frame<'_>);
}

impl<F: FnMut(&Frame<'_>)> Presenter for F {
    fn present(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

/// Maps the time since the last edges to a visible-area position. Returns
/// `None` while either axis is still in its sync pulse or back porch. The
/// position is not bounds checked.
pub fn raster_position(
    timing: &TimingSpec,
    h_elapsed: Nanos,
    v_elapsed: Nanos,
) -> Option<(usize, usize)> {
    let x_time = h_elapsed - timing.horizontal.visible_start();
    let y_time = v_elapsed - timing.vertical.visible_start();
    if x_time < 0 || y_time < 0 || timing.pixel_period <= 0 || timing.line_period <= 0 {
        return None;
    }
    Some((
        (x_time / timing.pixel_period) as usize,
        (y_time / timing.line_period) as usize,
    ))
}

pub struct FrameTracker<P> {
    timing: TimingSpec,
    shift: u8,
    tolerance: f64,
    show_timing_info: bool,

    h_elapsed: Nanos,
    v_elapsed: Nanos,
    // Sync idles high, so a source that starts in a pulse opens the first frame
    h_sync_prev: bool,
    v_sync_prev: bool,
    h_violations: PhaseFlags,
    v_violations: PhaseFlags,

    framebuffer: Framebuffer,
    in_frame: bool,
    frames_completed: u64,

    presenter: P,
}

impl<P: Presenter> FrameTracker<P> {
    pub fn new(config: MonitorConfig, presenter: P) -> Result<Self, ConfigError> {
        let tolerance = check_tolerance(config.tolerance)?;
        let timing = config.timing();
        info!(
            "Monitor mode {} ({}x{}), {} bits per color, tolerance {}",
            timing.mode,
            timing.width,
            timing.height,
            config.depth.bits(),
            tolerance
        );
        Ok(Self {
            timing,
            shift: config.depth.shift(),
            tolerance,
            show_timing_info: config.show_timing_info,
            h_elapsed: 0,
            v_elapsed: 0,
            h_sync_prev: true,
            v_sync_prev: true,
            h_violations: PhaseFlags::empty(),
            v_violations: PhaseFlags::empty(),
            framebuffer: Framebuffer::new(timing.width, timing.height),
            in_frame: false,
            frames_completed: 0,
            presenter,
        })
    }

    /// Feeds one sample taken `delta` after the previous one.
    pub fn sample(&mut self, sample: Sample, delta: Nanos) {
        self.h_elapsed += delta;
        self.v_elapsed += delta;
        let rgb_off = sample.is_blank();

        // Frame starts on the falling edge of vsync
        if self.v_sync_prev && !sample.v_sync {
            trace!("vsync falling edge after {}ns", self.v_elapsed);
            if self.in_frame {
                self.end_frame();
            }
            // Anything seen before the first edge was classified against an
            // arbitrary origin
            self.h_violations = PhaseFlags::empty();
            self.v_violations = PhaseFlags::empty();
            self.in_frame = true;
            self.v_elapsed = 0;
        }
        self.v_violations |= classify(
            self.v_elapsed,
            &self.timing.vertical,
            self.tolerance,
            sample.v_sync,
            rgb_off,
        );

        // Line starts on the falling edge of hsync
        if self.h_sync_prev && !sample.h_sync {
            trace!("hsync falling edge after {}ns", self.h_elapsed);
            self.h_elapsed = 0;
        }
        self.h_violations |= classify(
            self.h_elapsed,
            &self.timing.horizontal,
            self.tolerance,
            sample.h_sync,
            rgb_off,
        );

        if let Some((x, y)) = raster_position(&self.timing, self.h_elapsed, self.v_elapsed) {
            let pixel = Pixel::rgb(
                sample.red << self.shift,
                sample.green << self.shift,
                sample.blue << self.shift,
            );
            self.framebuffer.set(x, y, pixel);
        }

        self.h_sync_prev = sample.h_sync;
        self.v_sync_prev = sample.v_sync;
    }

    fn end_frame(&mut self) {
        let violations = Violations {
            horizontal: self.h_violations,
            vertical: self.v_violations,
        };
        debug!(
            "Frame {} complete, violations {:#06x}",
            self.frames_completed,
            violations.bits()
        );
        if self.show_timing_info {
            log_timing_info(self.frames_completed, &violations);
        }

        self.presenter.present(&Frame {
            number: self.frames_completed,
            framebuffer: &self.framebuffer,
            violations,
        });

        self.frames_completed += 1;
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), ConfigError> {
        self.tolerance = check_tolerance(tolerance)?;
        Ok(())
    }

    pub fn set_show_timing_info(&mut self, show: bool) {
        self.show_timing_info = show;
    }
}

impl<P> FrameTracker<P> {
    pub fn timing(&self) -> &TimingSpec {
        &self.timing
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn h_elapsed(&self) -> Nanos {
        self.h_elapsed
    }

    pub fn v_elapsed(&self) -> Nanos {
        self.v_elapsed
    }

    /// The frame being drawn. Only a snapshot once a frame boundary has been
    /// presented; mid-frame it is partially overwritten.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Violations accumulated so far in the current frame.
    pub fn pending_violations(&self) -> Violations {
        Violations {
            horizontal: self.h_violations,
            vertical: self.v_violations,
        }
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }
}

fn log_timing_info(frame: u64, violations: &Violations) {
    if violations.is_empty() {
        info!("Frame {frame}: timing OK");
        return;
    }
    for (axis, flags) in [
        ("horizontal", violations.horizontal),
        ("vertical", violations.vertical),
    ] {
        for (name, _) in flags.iter_names() {
            info!("Frame {frame}: {axis} {name}");
        }
    }
}

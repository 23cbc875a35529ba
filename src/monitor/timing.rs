//! Video timing for the simulated monitor. Every duration is kept in signed
//! nanoseconds so that the tracker can subtract porches from elapsed time and
//! test the sign directly.

use std::fmt;
use std::str::FromStr;

use super::config::ConfigError;

/// Signed nanoseconds.
pub type Nanos = i64;

/// Video modes the monitor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Vga640x480At60Hz,
}

impl Mode {
    pub const ALL: [Mode; 1] = [Mode::Vga640x480At60Hz];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Vga640x480At60Hz => "640x480@60",
        }
    }

    /// Looks up the mode with the given visible dimensions.
    pub fn from_resolution(width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.counts().h.visible == width && mode.counts().v.visible == height)
            .ok_or_else(|| ConfigError::UnsupportedMode(format!("{width}x{height}")))
    }

    fn pixel_clock_hz(&self) -> f64 {
        match self {
            Mode::Vga640x480At60Hz => 25.175e6,
        }
    }

    fn counts(&self) -> ModeCounts {
        match self {
            // Horizontal in pixels, vertical in lines
            Mode::Vga640x480At60Hz => ModeCounts {
                h: AxisCounts {
                    sync: 96,
                    back_porch: 48,
                    visible: 640,
                    front_porch: 16,
                }, // Htot = 800
                v: AxisCounts {
                    sync: 2,
                    back_porch: 33,
                    visible: 480,
                    front_porch: 10,
                }, // Vtot = 525
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    /// Accepts `640x480`, `640x480@60` or `vga`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vga" | "640x480" | "640x480@60" | "640x480-60" => Ok(Mode::Vga640x480At60Hz),
            _ => Err(ConfigError::UnsupportedMode(s.to_owned())),
        }
    }
}

/// Bits per color channel of the incoming samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorDepth {
    #[default]
    Rgb3BitsPerColor,
}

impl ColorDepth {
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        match bits {
            3 => Ok(ColorDepth::Rgb3BitsPerColor),
            _ => Err(ConfigError::UnsupportedColorDepth(bits)),
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            ColorDepth::Rgb3BitsPerColor => 3,
        }
    }

    /// Left shift that moves a raw sample into the high bits of an 8-bit
    /// channel.
    pub fn shift(&self) -> u8 {
        8 - self.bits()
    }

    /// Largest raw channel value.
    pub fn max_value(&self) -> u8 {
        (1 << self.bits()) - 1
    }
}

#[derive(Clone, Copy, Debug)]
struct AxisCounts {
    sync: usize,
    back_porch: usize,
    visible: usize,
    front_porch: usize,
}

#[derive(Clone, Copy, Debug)]
struct ModeCounts {
    h: AxisCounts,
    v: AxisCounts,
}

/// The four ordered intervals of one axis, starting at the sync falling edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisTiming {
    pub sync_pulse: Nanos,
    pub back_porch: Nanos,
    pub visible_area: Nanos,
    pub front_porch: Nanos, // sync_pulse + back_porch + visible_area + front_porch = period
}

impl AxisTiming {
    fn from_counts(counts: AxisCounts, unit: Nanos) -> Self {
        Self {
            sync_pulse: counts.sync as Nanos * unit,
            back_porch: counts.back_porch as Nanos * unit,
            visible_area: counts.visible as Nanos * unit,
            front_porch: counts.front_porch as Nanos * unit,
        }
    }

    pub fn period(&self) -> Nanos {
        self.sync_pulse + self.back_porch + self.visible_area + self.front_porch
    }

    /// Time from the sync falling edge to the first visible pixel or line.
    pub fn visible_start(&self) -> Nanos {
        self.sync_pulse + self.back_porch
    }

    pub fn visible_end(&self) -> Nanos {
        self.visible_start() + self.visible_area
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingSpec {
    pub mode: Mode,
    pub pixel_period: Nanos,
    pub horizontal: AxisTiming,
    pub line_period: Nanos,
    pub vertical: AxisTiming,
    pub frame_period: Nanos,
    pub width: usize,
    pub height: usize,
}

impl TimingSpec {
    pub fn new(mode: Mode) -> Self {
        let counts = mode.counts();
        let pixel_period = (1.0e9 / mode.pixel_clock_hz()).round() as Nanos;
        let horizontal = AxisTiming::from_counts(counts.h, pixel_period);
        let line_period = horizontal.period();
        let vertical = AxisTiming::from_counts(counts.v, line_period);
        let frame_period = vertical.period();
        Self {
            mode,
            pixel_period,
            horizontal,
            line_period,
            vertical,
            frame_period,
            width: (horizontal.visible_area / pixel_period) as usize,
            height: (vertical.visible_area / line_period) as usize,
        }
    }

    /// Pixel clocks per line, including blanking.
    pub fn htot(&self) -> usize {
        (self.line_period / self.pixel_period) as usize
    }

    /// Lines per frame, including blanking.
    pub fn vtot(&self) -> usize {
        (self.frame_period / self.line_period) as usize
    }

    /// Pixel clocks per frame.
    pub fn pixel_tot(&self) -> usize {
        self.htot() * self.vtot()
    }
}

use super::timing::{ColorDepth, Mode, TimingSpec};

pub const DEFAULT_TOLERANCE: f64 = 0.0075;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unsupported video mode: {0}")]
    UnsupportedMode(String),
    #[error("unsupported color depth: {0} bits per color")]
    UnsupportedColorDepth(u8),
    #[error("timing tolerance must be in [0, 1), got {0}")]
    InvalidTolerance(f64),
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<f64, ConfigError> {
    if tolerance.is_finite() && (0.0..1.0).contains(&tolerance) {
        Ok(tolerance)
    } else {
        Err(ConfigError::InvalidTolerance(tolerance))
    }
}

/// Setup parameters for a [`FrameTracker`](super::tracker::FrameTracker).
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub mode: Mode,
    pub depth: ColorDepth,
    /// Fraction applied symmetrically to every timing window boundary.
    pub tolerance: f64,
    /// Log the individual violation flags at every frame boundary.
    pub show_timing_info: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            depth: ColorDepth::default(),
            tolerance: DEFAULT_TOLERANCE,
            show_timing_info: false,
        }
    }
}

impl MonitorConfig {
    pub fn new(mode: Mode, depth: ColorDepth) -> Self {
        Self {
            mode,
            depth,
            ..Default::default()
        }
    }

    /// Builds a config from the visible resolution and channel width.
    pub fn from_dimensions(
        width: usize,
        height: usize,
        bits_per_color: u8,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Mode::from_resolution(width, height)?,
            ColorDepth::from_bits(bits_per_color)?,
        ))
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        self.tolerance = check_tolerance(tolerance)?;
        Ok(self)
    }

    pub fn show_timing_info(mut self, show: bool) -> Self {
        self.show_timing_info = show;
        self
    }

    pub fn timing(&self) -> TimingSpec {
        TimingSpec::new(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.mode, Mode::Vga640x480At60Hz);
        assert_eq!(config.depth.bits(), 3);
        assert_eq!(config.tolerance, 0.0075);
        assert!(!config.show_timing_info);
    }

    #[test]
    fn test_from_dimensions() {
        assert_eq!(
            MonitorConfig::from_dimensions(640, 480, 3),
            Ok(MonitorConfig::default())
        );
        assert_eq!(
            MonitorConfig::from_dimensions(640, 480, 5),
            Err(ConfigError::UnsupportedColorDepth(5))
        );
        assert_eq!(
            MonitorConfig::from_dimensions(320, 200, 3),
            Err(ConfigError::UnsupportedMode("320x200".to_owned()))
        );
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(0.0075, true)]
    #[case(0.5, true)]
    #[case(-0.01, false)]
    #[case(1.0, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn test_tolerance_range(#[case] tolerance: f64, #[case] ok: bool) {
        assert_eq!(
            MonitorConfig::default().with_tolerance(tolerance).is_ok(),
            ok
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::UnsupportedMode("1024x768".into()).to_string(),
            "unsupported video mode: 1024x768"
        );
        assert_eq!(
            ConfigError::UnsupportedColorDepth(8).to_string(),
            "unsupported color depth: 8 bits per color"
        );
    }
}

//! A simulated VGA monitor. Watches the sync and color lines of a clocked
//! video source, rebuilds the picture it draws and checks the signal against
//! the VESA timing of the configured mode.

pub mod host;
pub mod monitor;
pub mod signal;

pub use monitor::classify::{Phase, PhaseFlags, classify, phase_at};
pub use monitor::config::{ConfigError, DEFAULT_TOLERANCE, MonitorConfig};
pub use monitor::framebuffer::{Framebuffer, Pixel};
pub use monitor::timing::{AxisTiming, ColorDepth, Mode, Nanos, TimingSpec};
pub use monitor::tracker::{Frame, FrameTracker, Presenter, Sample, Violations};

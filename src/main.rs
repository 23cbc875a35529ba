use std::time::Instant;

use clap::{Parser, ValueEnum};
use tracing::{Level, info, warn};

use vga_monitor::host::logging::{setup_logging_file, setup_logging_stdio};
use vga_monitor::host::presenter::headless::HeadlessPresenter;
use vga_monitor::signal::{Pattern, Rgb, SignalGen, pattern_source};
use vga_monitor::{ColorDepth, FrameTracker, Mode, MonitorConfig, Presenter};

/// Simulated VGA monitor
/// Feeds a reference VGA signal through the monitor and reports timing violations
#[derive(Parser)]
#[command(name = "vga-monitor")]
#[command(about = "A simulated VGA monitor driven by a reference signal source")]
struct Args {
    /// Video mode, e.g. 640x480
    #[arg(long, default_value = "640x480@60")]
    mode: String,

    /// Bits per color channel
    #[arg(long, default_value_t = 3)]
    depth: u8,

    /// Timing tolerance as a fraction
    #[arg(long, default_value_t = vga_monitor::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Number of frames to present
    #[arg(long, default_value_t = 3)]
    frames: u64,

    /// Test image painted by the signal source
    #[arg(long, value_enum, default_value_t = PatternArg::Bars)]
    pattern: PatternArg,

    /// Hold hsync low two extra pixel clocks on this line of every frame
    #[arg(long, value_name = "LINE")]
    late_hsync: Option<usize>,

    /// Log each violated timing flag at every frame boundary
    #[arg(long)]
    show_timing_info: bool,

    /// Draw frames in the terminal
    #[cfg(feature = "tui")]
    #[arg(long)]
    display: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PatternArg {
    White,
    Bars,
    Checker,
}

impl From<PatternArg> for Pattern {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::White => Pattern::White,
            PatternArg::Bars => Pattern::Bars,
            PatternArg::Checker => Pattern::Checker,
        }
    }
}

/// Runs the source until the tracker has presented `frames` frames. Returns
/// the number of samples fed.
fn run<P: Presenter, F: FnMut(usize, usize) -> Rgb>(
    tracker: &mut FrameTracker<P>,
    source: &mut SignalGen<F>,
    frames: u64,
    late_hsync: Option<usize>,
) -> u64 {
    let mut samples = 0;
    while tracker.frames_completed() < frames {
        let (x, y) = (source.x, source.y);
        let (mut sample, delta) = source.tick();
        if late_hsync == Some(y) && (96..98).contains(&x) {
            sample.h_sync = false;
        }
        tracker.sample(sample, delta);
        samples += 1;
    }
    samples
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let level = if args.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };

    #[cfg(feature = "tui")]
    let display = args.display;
    #[cfg(not(feature = "tui"))]
    let display = false;

    if display {
        let logfile = setup_logging_file(level)?;
        eprintln!("Logging to {}", logfile.display());
    } else {
        setup_logging_stdio(level);
    }

    let mode: Mode = args.mode.parse()?;
    let depth = ColorDepth::from_bits(args.depth)?;
    let config = MonitorConfig::new(mode, depth)
        .with_tolerance(args.tolerance)?
        .show_timing_info(args.show_timing_info);
    let timing = config.timing();
    let mut source = pattern_source(timing, depth, args.pattern.into());

    info!("Simulated VGA monitor starting...");
    let start_time = Instant::now();

    #[cfg(feature = "tui")]
    let samples = if display {
        use vga_monitor::host::presenter::ratatui::TuiPresenter;
        let mut tracker = FrameTracker::new(config, TuiPresenter::new()?)?;
        run(&mut tracker, &mut source, args.frames, args.late_hsync)
    } else {
        run_headless(config, &mut source, args.frames, args.late_hsync)?
    };
    #[cfg(not(feature = "tui"))]
    let samples = run_headless(config, &mut source, args.frames, args.late_hsync)?;

    let elapsed = start_time.elapsed();
    info!("Run completed:");
    info!("  Samples: {}", samples);
    info!("  Simulated time: {}ns", samples as i64 * timing.pixel_period);
    info!("  Time elapsed: {:?}", elapsed);
    if elapsed.as_secs_f64() > 0.0 {
        info!(
            "  Samples per second: {:.0}",
            samples as f64 / elapsed.as_secs_f64()
        );
    }

    Ok(())
}

fn run_headless<F: FnMut(usize, usize) -> Rgb>(
    config: MonitorConfig,
    source: &mut SignalGen<F>,
    frames: u64,
    late_hsync: Option<usize>,
) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let mut tracker = FrameTracker::new(config, HeadlessPresenter::new())?;
    let samples = run(&mut tracker, source, frames, late_hsync);

    let presenter = tracker.presenter();
    if presenter.is_conformant() {
        info!("{} frames, timing OK", presenter.frames);
    } else {
        warn!(
            "{} of {} frames had timing violations {:#06x}",
            presenter.frames_with_violations,
            presenter.frames,
            presenter.all_violations.bits()
        );
    }
    Ok(samples)
}

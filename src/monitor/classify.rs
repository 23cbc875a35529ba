//! Timing conformance checks for a single axis.
//!
//! Given the time since the last sync falling edge, [`phase_at`] decides which
//! interval the signal should be in, and [`classify`] compares the observed
//! sync level and color against what that interval expects. Elapsed times that
//! land between two tolerance-widened windows belong to no phase and are never
//! flagged.

use bitflags::bitflags;

use super::timing::{AxisTiming, Nanos};

bitflags! {
    /// Violations on one axis. Seven flags, so a pair fits in 14 bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PhaseFlags: u8 {
        const SYNC_HIGH_IN_PULSE = 1 << 0;
        const RGB_IN_PULSE = 1 << 1;
        const SYNC_LOW_IN_BACK_PORCH = 1 << 2;
        const RGB_IN_BACK_PORCH = 1 << 3;
        const SYNC_LOW_IN_ACTIVE_AREA = 1 << 4;
        const SYNC_LOW_IN_FRONT_PORCH = 1 << 5;
        const RGB_IN_FRONT_PORCH = 1 << 6;
    }
}

impl PhaseFlags {
    pub const BITS: u32 = 7;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    SyncPulse,
    BackPorch,
    ActiveArea,
    FrontPorch,
}

impl Phase {
    /// Sync is active low: low during the pulse, high everywhere else.
    pub fn expects_sync_high(&self) -> bool {
        !matches!(self, Phase::SyncPulse)
    }

    pub fn expects_blank(&self) -> bool {
        !matches!(self, Phase::ActiveArea)
    }
}

/// The phase `elapsed` falls in, or `None` when it sits too close to a
/// boundary to tell.
pub fn phase_at(elapsed: Nanos, axis: &AxisTiming, tolerance: f64) -> Option<Phase> {
    let late = elapsed as f64 * (1.0 + tolerance);
    let early = elapsed as f64 * (1.0 - tolerance);

    let sync_end = axis.sync_pulse as f64;
    let back_porch_end = axis.visible_start() as f64;
    let active_end = axis.visible_end() as f64;
    let period = axis.period() as f64;

    if late < sync_end {
        Some(Phase::SyncPulse)
    } else if early > sync_end && late < back_porch_end {
        Some(Phase::BackPorch)
    } else if early > back_porch_end && late < active_end {
        Some(Phase::ActiveArea)
    } else if early > active_end && late < period {
        Some(Phase::FrontPorch)
    } else {
        None
    }
}

/// Checks one observation against the expected phase and returns the flags it
/// violates. Pure: identical inputs always give identical flags.
pub fn classify(
    elapsed: Nanos,
    axis: &AxisTiming,
    tolerance: f64,
    sync: bool,
    rgb_off: bool,
) -> PhaseFlags {
    let mut flags = PhaseFlags::empty();
    let Some(phase) = phase_at(elapsed, axis, tolerance) else {
        return flags;
    };

    let sync_wrong = sync != phase.expects_sync_high();
    let rgb_wrong = phase.expects_blank() && !rgb_off;

    match phase {
        Phase::SyncPulse => {
            flags.set(PhaseFlags::SYNC_HIGH_IN_PULSE, sync_wrong);
            flags.set(PhaseFlags::RGB_IN_PULSE, rgb_wrong);
        }
        Phase::BackPorch => {
            flags.set(PhaseFlags::SYNC_LOW_IN_BACK_PORCH, sync_wrong);
            flags.set(PhaseFlags::RGB_IN_BACK_PORCH, rgb_wrong);
        }
        Phase::ActiveArea => {
            flags.set(PhaseFlags::SYNC_LOW_IN_ACTIVE_AREA, sync_wrong);
        }
        Phase::FrontPorch => {
            flags.set(PhaseFlags::SYNC_LOW_IN_FRONT_PORCH, sync_wrong);
            flags.set(PhaseFlags::RGB_IN_FRONT_PORCH, rgb_wrong);
        }
    }
    flags
}

//! Size and rate constants.

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

/// Bits per second in one megabit per second.
pub const MBPS: u64 = 1_000_000;

pub const BITS_PER_BYTE: u64 = 8;

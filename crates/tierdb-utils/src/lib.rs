//! Small shared helpers for TierDB crates.

pub mod case;

//! Peak tracking for correlation scans.

pub(crate) mod peak;

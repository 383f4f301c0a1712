//! Feature gates consulted at initialization

use std::collections::HashSet;

/// Flag that wipes the persistent store when the local store starts
pub const RESET_LOCAL_FLAG: &str = "resetLocal";

/// External on/off signal keyed by flag name
pub trait FeatureGate {
    fn has(&self, flag: &str) -> bool;
}

/// Constant gate: every flag on or every flag off
impl FeatureGate for bool {
    fn has(&self, _flag: &str) -> bool {
        *self
    }
}

impl<F: Fn(&str) -> bool> FeatureGate for F {
    fn has(&self, flag: &str) -> bool {
        self(flag)
    }
}

/// Set of flags active for the running version
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
    flags: HashSet<String>,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn enable(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn disable(&mut self, flag: &str) {
        self.flags.remove(flag);
    }
}

impl FeatureGate for VersionRegistry {
    fn has(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

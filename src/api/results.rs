use serde::Serialize;

use crate::model::Snapshot;
use crate::report::ComparisonResult;

/// Result of comparing two schema sources.
#[derive(Debug, Clone, Serialize)]
pub struct CompareResult {
    /// Differences and verdict
    pub comparison: ComparisonResult,
    /// Fingerprint of the normalized expected snapshot
    pub expected_fingerprint: String,
    /// Fingerprint of the normalized actual snapshot
    pub actual_fingerprint: String,
}

impl CompareResult {
    pub fn is_valid(&self) -> bool {
        self.comparison.is_valid
    }

    /// True when both normalized snapshots are byte-for-byte identical.
    pub fn snapshots_identical(&self) -> bool {
        self.expected_fingerprint == self.actual_fingerprint
    }
}

/// Result of building one normalized snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResult {
    pub snapshot: Snapshot,
    pub fingerprint: String,
}

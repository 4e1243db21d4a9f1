/// Scan-wide configuration.
///
/// One `ScanOptions` value is fixed at scan start and read-only for the
/// duration of the scan; there is no way to reconfigure a running scan.

/// Largest directory depth at which subdirectory work may be handed to
/// another worker lane. At or beyond this depth everything runs inline.
pub const DEFAULT_DEPTH_CAP: usize = 8;

/// Number of directory entries accumulated before a batch is drained.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Options controlling a single scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// When false the worker pool is forced to a single lane.
    pub use_parallel: bool,

    /// Upper bound on worker lanes. Zero means "use the host's reported
    /// hardware parallelism".
    pub max_threads: usize,

    /// Depth cap for the fan-out rule.
    pub depth_cap: usize,

    /// Directory-iterator drain granularity.
    pub batch_size: usize,

    /// Discard the root's children after aggregation, keeping only the
    /// aggregated size.
    pub root_only: bool,

    /// Seed each directory node with the directory entry's own reported
    /// size in addition to the sum of its children.
    pub include_directory_self_size: bool,

    /// Query the per-file allocation attribute (space reserved on the
    /// storage medium) instead of the logical size.
    pub use_allocated_size: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            use_parallel: true,
            max_threads: 0,
            depth_cap: DEFAULT_DEPTH_CAP,
            batch_size: DEFAULT_BATCH_SIZE,
            root_only: false,
            include_directory_self_size: false,
            use_allocated_size: false,
        }
    }
}

impl ScanOptions {
    /// Resolve the worker-pool size: hardware parallelism by default,
    /// overridable, floor of one, and forced to one in sequential mode.
    pub fn pool_size(&self) -> usize {
        if !self.use_parallel {
            return 1;
        }
        if self.max_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.max_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = ScanOptions::default();
        assert!(opts.use_parallel);
        assert_eq!(opts.max_threads, 0);
        assert_eq!(opts.depth_cap, 8);
        assert_eq!(opts.batch_size, 64);
        assert!(!opts.root_only);
        assert!(!opts.include_directory_self_size);
        assert!(!opts.use_allocated_size);
    }

    #[test]
    fn sequential_mode_forces_one_lane() {
        let opts = ScanOptions {
            use_parallel: false,
            max_threads: 16,
            ..ScanOptions::default()
        };
        assert_eq!(opts.pool_size(), 1);
    }

    #[test]
    fn explicit_thread_count_wins_over_auto() {
        let opts = ScanOptions {
            max_threads: 3,
            ..ScanOptions::default()
        };
        assert_eq!(opts.pool_size(), 3);
    }

    #[test]
    fn auto_thread_count_is_at_least_one() {
        let opts = ScanOptions::default();
        assert!(opts.pool_size() >= 1);
    }
}

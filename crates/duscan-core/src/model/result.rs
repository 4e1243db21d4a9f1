/// The outcome of one scan: the finished tree plus its wall-clock cost.
use super::node::FileNode;
use std::sync::Arc;
use std::time::Duration;

/// Root node and elapsed wall-clock time of a completed scan.
///
/// The result solely owns the tree; dropping it releases every node that
/// no other handle still references.
#[derive(Debug)]
pub struct ScanResult {
    root: Arc<FileNode>,
    elapsed: Duration,
}

impl ScanResult {
    pub(crate) fn new(root: FileNode, elapsed: Duration) -> Self {
        Self {
            root: Arc::new(root),
            elapsed,
        }
    }

    /// The root of the size tree.
    pub fn root(&self) -> &Arc<FileNode> {
        &self.root
    }

    /// Wall-clock duration from entry to the tree becoming visible.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in milliseconds, as exposed over the C ABI.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn elapsed_ms_converts_duration() {
        let result = ScanResult::new(
            FileNode::leaf(PathBuf::from("/f"), 1),
            Duration::from_millis(1500),
        );
        assert!((result.elapsed_ms() - 1500.0).abs() < f64::EPSILON);
    }
}

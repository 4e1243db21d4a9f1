/// Scanner: the entry facade, its per-scan context, and the walk machinery.
///
/// `scan` is the single externally-visible routine. Everything mutable
/// during a traversal lives in one `ScanContext` shared across lanes: the
/// visited-paths set behind its own mutex and the entry-path marker, set
/// exactly once. The boundary oracle and options are read-only after scan
/// start and need no locking.
mod policy;
pub mod pool;
mod walker;

use crate::boundary::BoundaryOracle;
use crate::config::ScanOptions;
use crate::model::node::FileNode;
use crate::model::result::ScanResult;
use crate::platform::probe;
use compact_str::CompactString;
use parking_lot::Mutex;
use pool::WorkerPool;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info};

/// The entry path as first seen by the skip policy, with its device and
/// mount status captured at that moment.
pub(crate) struct EntryMark {
    pub path: PathBuf,
    pub device: Option<u64>,
    pub is_mount: bool,
}

/// Process-wide state for exactly one scan.
pub(crate) struct ScanContext {
    options: ScanOptions,
    oracle: BoundaryOracle,
    fs_type: CompactString,
    pool: WorkerPool,
    visited: Mutex<HashSet<PathBuf>>,
    entry: OnceLock<EntryMark>,
}

impl ScanContext {
    pub(crate) fn new(
        options: ScanOptions,
        oracle: BoundaryOracle,
        fs_type: CompactString,
    ) -> Self {
        let pool = WorkerPool::new(options.pool_size());
        Self {
            options,
            oracle,
            fs_type,
            pool,
            visited: Mutex::new(HashSet::new()),
            entry: OnceLock::new(),
        }
    }

    pub(crate) fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub(crate) fn oracle(&self) -> &BoundaryOracle {
        &self.oracle
    }

    pub(crate) fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Record `path` in the visited set; false if it was already present.
    /// This is the cycle guard: any absolute path enters the tree at most
    /// once per scan.
    pub(crate) fn mark_visited(&self, path: &Path) -> bool {
        self.visited.lock().insert(path.to_path_buf())
    }

    /// The scan's entry path, recorded on first use.
    pub(crate) fn entry_mark(&self, path: &Path) -> &EntryMark {
        self.entry.get_or_init(|| EntryMark {
            path: path.to_path_buf(),
            device: probe::device_of(path),
            is_mount: self.oracle.is_mount(path),
        })
    }
}

/// Compute the size tree rooted at `path`.
///
/// Never fails: unreadable, missing, or unclassifiable roots come back as
/// zero-size nodes, and per-entry failures inside the tree degrade to
/// zero-size leaves. The elapsed time covers entry to the moment the tree
/// is visible to the caller.
pub fn scan(path: impl AsRef<Path>, options: ScanOptions) -> ScanResult {
    let path = path.as_ref().to_path_buf();
    let start = Instant::now();

    let fs_type = probe::fs_type(&path);
    let oracle = BoundaryOracle::snapshot();
    info!(
        path = %path.display(),
        fs_type = %fs_type,
        lanes = options.pool_size(),
        "scan starting"
    );
    let ctx = Arc::new(ScanContext::new(options, oracle, fs_type));

    let root = if probe::is_symlink(&path) {
        walker::file_leaf(&ctx, path)
    } else {
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => walker::process_directory(&ctx, path.clone(), 0)
                .unwrap_or_else(|| FileNode::empty_dir(path)),
            Ok(_) => walker::file_leaf(&ctx, path),
            Err(_) => FileNode::leaf(path, 0),
        }
    };

    let elapsed = start.elapsed();
    debug!(
        fs_type = %ctx.fs_type,
        elapsed_ms = elapsed.as_millis() as u64,
        total_bytes = root.size(),
        "scan finished"
    );
    ScanResult::new(root, elapsed)
}

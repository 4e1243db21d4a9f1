/// Filesystem-boundary oracle.
///
/// Three orthogonal predicates over process-wide state captured once at
/// scan start: the mount-point set, the firmlink map of the split-volume
/// layout, and hard-link aliasing of top-level directories. A plain
/// device-id check cannot replace this: firmlinks bridge the installed and
/// data volumes on the same device while the data-volume mirror must still
/// be skipped.
use crate::platform::{mounts, probe};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Installed paths that the standard split-volume layout exposes through
/// firmlinks. The relative path beneath the data root is the installed
/// path minus its leading slash.
const DEFAULT_FIRMLINKS: &[&str] = &[
    "/AppleInternal",
    "/Applications",
    "/Library",
    "/System/Library/Caches",
    "/System/Library/Assets",
    "/System/Library/PreinstalledAssets",
    "/System/Library/AssetsV2",
    "/System/Library/PreinstalledAssetsV2",
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Library",
    "/System/Library/Speech",
    "/Users",
    "/Volumes",
    "/cores",
    "/opt",
    "/private",
    "/usr/local",
    "/usr/libexec/cups",
    "/usr/share/snmp",
];

/// Where the data-volume hierarchy is mounted on the standard layout.
const DEFAULT_DATA_ROOTS: &[&str] = &["/System/Volumes/Data"];

/// Immutable boundary state for one scan.
pub struct BoundaryOracle {
    /// Mount roots other than `/`, as captured at scan start.
    mounts: Vec<PathBuf>,
    /// Firmlink values: paths relative to a data root.
    firmlink_targets: Vec<PathBuf>,
    data_roots: Vec<PathBuf>,
}

impl BoundaryOracle {
    /// Snapshot the host's mount table and install the default firmlink
    /// layout. The root filesystem is excluded; every other mount counts
    /// as a potential boundary.
    pub fn snapshot() -> Self {
        let mounts: Vec<PathBuf> = mounts::enumerate_mounts()
            .into_iter()
            .filter(|entry| entry.path != Path::new("/"))
            .map(|entry| entry.path)
            .collect();
        debug!(mounts = mounts.len(), "boundary snapshot");
        Self::with_tables(mounts, DEFAULT_FIRMLINKS, DEFAULT_DATA_ROOTS)
    }

    /// Oracle over explicit tables. Tests inject synthetic layouts here;
    /// `snapshot` routes the live host through the same path.
    pub fn with_tables(
        mounts: Vec<PathBuf>,
        firmlinks: &[&str],
        data_roots: &[&str],
    ) -> Self {
        let firmlink_targets = firmlinks
            .iter()
            .map(|installed| PathBuf::from(installed.trim_start_matches('/')))
            .collect();
        let data_roots = data_roots.iter().map(PathBuf::from).collect();
        Self {
            mounts,
            firmlink_targets,
            data_roots,
        }
    }

    /// True iff `path` is itself a recorded mount point.
    pub fn is_mount(&self, path: &Path) -> bool {
        self.mounts.iter().any(|mount| mount == path)
    }

    /// True iff `path` lies strictly below a recorded mount point.
    pub fn is_sub_of_any_mount(&self, path: &Path) -> bool {
        self.mounts
            .iter()
            .any(|mount| path != mount && path.starts_with(mount))
    }

    /// True iff `path` sits under a data root at a position that a
    /// firmlink already exposes on the system volume. Such paths would be
    /// counted twice if descended.
    pub fn covered_by_firmlink(&self, path: &Path) -> bool {
        for root in &self.data_roots {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if self
                .firmlink_targets
                .iter()
                .any(|target| relative.starts_with(target))
            {
                return true;
            }
        }
        false
    }

    /// True iff a top-level directory `/<basename>` hard-link-aliases
    /// `path` — the signature of a firmlink mirror of a root child on a
    /// secondary volume. The path itself never aliases.
    pub fn aliases_root_child(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let candidate = Path::new("/").join(name);
        if candidate == path {
            return false;
        }
        probe::same_inode(&candidate, path)
    }
}

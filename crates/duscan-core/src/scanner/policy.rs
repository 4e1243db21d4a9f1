/// Descend-or-skip decision for directories.
///
/// Evaluated in a fixed order so that the entry path itself is always
/// descended while secondary volumes discovered inside the entry subtree
/// are not: a scan of `/` stays off removable volumes and the data-volume
/// shadow, but a scan that starts *at* such a volume works normally.
use super::ScanContext;
use crate::platform::probe;
use std::path::Path;

/// Whether `path` should be skipped (kept in the tree as an empty node,
/// never descended).
///
/// Rules, in order:
/// 1. firmlink-covered paths are skipped
/// 2. the first path ever evaluated is recorded as the scan's entry path
/// 3. a mount point strictly beneath the entry path is skipped
/// 4. a path below some mount is kept on the entry's own device, or when
///    the entry itself is the mount being traversed; otherwise skipped
pub(crate) fn should_skip(ctx: &ScanContext, path: &Path) -> bool {
    if ctx.oracle().covered_by_firmlink(path) {
        return true;
    }

    let entry = ctx.entry_mark(path);

    if ctx.oracle().is_mount(path) && path != entry.path && path.starts_with(&entry.path) {
        return true;
    }

    if ctx.oracle().is_sub_of_any_mount(path) {
        if let (Some(device), Some(entry_device)) = (probe::device_of(path), entry.device) {
            if device == entry_device {
                return false;
            }
        }
        if entry.is_mount && path.starts_with(&entry.path) {
            return false;
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryOracle;
    use crate::config::ScanOptions;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context_with(oracle: BoundaryOracle) -> ScanContext {
        ScanContext::new(
            ScanOptions {
                use_parallel: false,
                ..ScanOptions::default()
            },
            oracle,
            Default::default(),
        )
    }

    fn oracle(mounts: &[&str]) -> BoundaryOracle {
        BoundaryOracle::with_tables(
            mounts.iter().map(PathBuf::from).collect(),
            &["/Users"],
            &["/System/Volumes/Data"],
        )
    }

    #[test]
    fn firmlink_coverage_skips_even_the_entry_path() {
        let ctx = context_with(oracle(&[]));
        assert!(should_skip(&ctx, Path::new("/System/Volumes/Data/Users")));
    }

    #[test]
    fn entry_path_is_never_skipped_as_a_mount() {
        let ctx = context_with(oracle(&["/Volumes/USB"]));
        // first evaluation records the entry; the entry equals the mount
        assert!(!should_skip(&ctx, Path::new("/Volumes/USB")));
    }

    #[test]
    fn mount_strictly_beneath_the_entry_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let entry = tmp.path().to_path_buf();
        let mount = entry.join("usb");
        let ctx = context_with(oracle(&[mount.to_str().unwrap()]));

        assert!(!should_skip(&ctx, &entry));
        assert!(should_skip(&ctx, &mount));
    }

    #[test]
    fn same_device_below_a_mount_is_descended() {
        // entry and the "mounted" subtree share a device because both are
        // plain directories in the same tempdir
        let tmp = TempDir::new().unwrap();
        let entry = tmp.path().to_path_buf();
        let mount = entry.join("vol");
        let inside = mount.join("deep");
        std::fs::create_dir_all(&inside).unwrap();

        let ctx = context_with(oracle(&[mount.to_str().unwrap()]));
        assert!(!should_skip(&ctx, &entry));
        assert!(!should_skip(&ctx, &inside));
    }

    #[test]
    fn foreign_device_below_a_mount_is_skipped() {
        // neither path exists, so both device probes fail and neither
        // exemption applies
        let ctx = context_with(oracle(&["/Volumes/USB"]));
        assert!(!should_skip(&ctx, Path::new("/scan/entry")));
        assert!(should_skip(&ctx, Path::new("/Volumes/USB/folder")));
    }

    #[test]
    fn mount_entry_keeps_its_own_subtree() {
        // entry is itself a mount; its interior stays descendable even
        // when the device probe cannot answer
        let ctx = context_with(oracle(&["/Volumes/USB"]));
        assert!(!should_skip(&ctx, Path::new("/Volumes/USB")));
        assert!(!should_skip(&ctx, Path::new("/Volumes/USB/folder")));
    }

    #[test]
    fn plain_directories_are_descended() {
        let ctx = context_with(oracle(&["/Volumes/USB"]));
        assert!(!should_skip(&ctx, Path::new("/home/me")));
        assert!(!should_skip(&ctx, Path::new("/home/me/projects")));
    }
}

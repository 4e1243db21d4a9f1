/// Per-path stat probes.
///
/// Every probe maps failure to a neutral value (false, zero, empty) so a
/// single unreadable or vanished entry can never abort a traversal. All
/// type and size queries go through `lstat` semantics and never follow
/// symbolic links; only `self_size` and `device_of` deliberately use the
/// following `stat`.
use compact_str::CompactString;
use std::ffi::CString;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Size and kind of one directory entry, as reported by `info`.
#[derive(Debug, Clone, Copy)]
pub struct EntryInfo {
    pub bytes: u64,
    pub is_dir: bool,
}

/// True iff the inode at `path` is a symbolic link.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Size and directory flag for `path`.
///
/// A symbolic link reports the size of the link itself (the length of its
/// target string) and is never a directory. Regular entries report the
/// allocated or logical size depending on the scan-wide mode.
pub fn info(path: &Path, use_allocated_size: bool) -> EntryInfo {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return EntryInfo {
            bytes: 0,
            is_dir: false,
        };
    };
    if meta.file_type().is_symlink() {
        return EntryInfo {
            bytes: meta.len(),
            is_dir: false,
        };
    }
    let bytes = if use_allocated_size {
        allocated_size(path)
    } else {
        meta.len()
    };
    EntryInfo {
        bytes,
        is_dir: meta.is_dir(),
    }
}

/// Bytes actually reserved on the storage medium for `path`.
///
/// May exceed the logical size (block rounding) or undercut it (sparse,
/// compressed, or cloned files). Zero on any failure.
#[cfg(target_os = "macos")]
pub fn allocated_size(path: &Path) -> u64 {
    // getattrlist(2) with ATTR_FILE_ALLOCSIZE. The reply buffer is the
    // 4-byte length word immediately followed by the 8-byte allocation
    // count, hence the packed layout.
    const ATTR_BIT_MAP_COUNT: libc::c_ushort = 5;
    const ATTR_FILE_ALLOCSIZE: u32 = 0x0000_0004;

    #[repr(C, packed)]
    struct AllocReply {
        length: u32,
        allocsize: u64,
    }

    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return 0;
    };
    let mut request: libc::attrlist = unsafe { std::mem::zeroed() };
    request.bitmapcount = ATTR_BIT_MAP_COUNT;
    request.fileattr = ATTR_FILE_ALLOCSIZE;

    let mut reply = AllocReply {
        length: 0,
        allocsize: 0,
    };
    let rc = unsafe {
        libc::getattrlist(
            cpath.as_ptr(),
            &mut request as *mut libc::attrlist as *mut libc::c_void,
            &mut reply as *mut AllocReply as *mut libc::c_void,
            std::mem::size_of::<AllocReply>(),
            0,
        )
    };
    if rc != 0 {
        return 0;
    }
    let allocsize = reply.allocsize;
    allocsize
}

/// Bytes actually reserved on the storage medium for `path`.
///
/// Non-macOS hosts have no bulk attribute call; `st_blocks` is defined in
/// 512-byte units regardless of the filesystem block size.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn allocated_size(path: &Path) -> u64 {
    fs::symlink_metadata(path)
        .map(|meta| meta.blocks() * 512)
        .unwrap_or(0)
}

/// The path's own reported size via the following `stat`, used for the
/// optional directory self-size contribution. Zero on failure.
pub fn self_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// True iff both paths stat successfully and share an inode number.
pub fn same_inode(a: &Path, b: &Path) -> bool {
    match (fs::symlink_metadata(a), fs::symlink_metadata(b)) {
        (Ok(meta_a), Ok(meta_b)) => meta_a.ino() == meta_b.ino(),
        _ => false,
    }
}

/// Device id of the filesystem object at `path`, if it can be stat'ed.
pub fn device_of(path: &Path) -> Option<u64> {
    fs::metadata(path).map(|meta| meta.dev()).ok()
}

/// Whether the calling identity may read `path`. Side-effect free: this
/// checks permission bits via access(2) rather than opening the path.
pub fn readable(path: &Path) -> bool {
    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(cpath.as_ptr(), libc::R_OK) == 0 }
}

/// Filesystem type name of the filesystem containing `path`; empty on
/// failure.
#[cfg(target_os = "macos")]
pub fn fs_type(path: &Path) -> CompactString {
    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return CompactString::default();
    };
    let mut st: libc::statfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statfs(cpath.as_ptr(), &mut st) } != 0 {
        return CompactString::default();
    }
    let name = unsafe { std::ffi::CStr::from_ptr(st.f_fstypename.as_ptr()) };
    CompactString::new(name.to_string_lossy())
}

/// Filesystem type name of the filesystem containing `path`; empty on
/// failure.
///
/// Linux statfs(2) reports a numeric magic instead of a name, so the
/// common magics are mapped and everything else comes back empty.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn fs_type(path: &Path) -> CompactString {
    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return CompactString::default();
    };
    let mut st: libc::statfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statfs(cpath.as_ptr(), &mut st) } != 0 {
        return CompactString::default();
    }
    let name = match st.f_type as u64 {
        0xEF53 => "ext4",
        0x9123_683E => "btrfs",
        0x5846_5342 => "xfs",
        0x0102_1994 => "tmpfs",
        0x6969 => "nfs",
        0x2FC1_2FC1 => "zfs",
        0x794C_7630 => "overlay",
        _ => "",
    };
    CompactString::const_new(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn info_reports_logical_size_and_kind() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.bin");
        File::create(&file).unwrap().write_all(&[0u8; 321]).unwrap();

        let file_info = info(&file, false);
        assert_eq!(file_info.bytes, 321);
        assert!(!file_info.is_dir);

        let dir_info = info(tmp.path(), false);
        assert!(dir_info.is_dir);
    }

    #[test]
    fn symlink_info_is_target_string_length() {
        let tmp = TempDir::new().unwrap();
        let link = tmp.path().join("link");
        symlink("0123456789", &link).unwrap();

        assert!(is_symlink(&link));
        let link_info = info(&link, false);
        assert_eq!(link_info.bytes, 10);
        assert!(!link_info.is_dir);
        // allocated mode must not change symlink handling
        let link_info = info(&link, true);
        assert_eq!(link_info.bytes, 10);
    }

    #[test]
    fn missing_paths_probe_to_neutral_values() {
        let gone = Path::new("/no/such/path/for/duscan");
        assert!(!is_symlink(gone));
        let gone_info = info(gone, false);
        assert_eq!(gone_info.bytes, 0);
        assert!(!gone_info.is_dir);
        assert_eq!(allocated_size(gone), 0);
        assert_eq!(self_size(gone), 0);
        assert!(device_of(gone).is_none());
        assert!(fs_type(gone).is_empty());
    }

    #[test]
    fn same_inode_matches_hard_links_only() {
        let tmp = TempDir::new().unwrap();
        let original = tmp.path().join("a");
        let alias = tmp.path().join("b");
        let other = tmp.path().join("c");
        File::create(&original).unwrap();
        File::create(&other).unwrap();
        fs::hard_link(&original, &alias).unwrap();

        assert!(same_inode(&original, &alias));
        assert!(!same_inode(&original, &other));
        assert!(!same_inode(&original, Path::new("/no/such/path")));
    }

    #[test]
    fn readable_accepts_own_tempdir() {
        let tmp = TempDir::new().unwrap();
        assert!(readable(tmp.path()));
        assert!(!readable(Path::new("/no/such/path/for/duscan")));
    }
}

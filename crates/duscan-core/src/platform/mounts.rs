/// Mount-table enumeration.
///
/// One snapshot is taken per scan; the walker never re-reads the table.
/// Failure to enumerate degrades to an empty table (no mount boundaries)
/// rather than failing the scan.
use compact_str::CompactString;
use std::path::PathBuf;
use tracing::warn;

/// One mounted filesystem as reported by the host's mount table.
#[derive(Debug, Clone)]
pub struct MountEntry {
    /// Path at which the filesystem is attached.
    pub path: PathBuf,
    /// Filesystem type name (e.g. "apfs", "nfs", "ext4").
    pub fs_type: CompactString,
}

/// Read the kernel's mount table via getmntinfo(3).
#[cfg(target_os = "macos")]
pub fn enumerate_mounts() -> Vec<MountEntry> {
    use std::ffi::CStr;
    use std::os::unix::ffi::OsStrExt;

    let mut table: *mut libc::statfs = std::ptr::null_mut();
    let count = unsafe { libc::getmntinfo(&mut table, libc::MNT_NOWAIT) };
    if count <= 0 || table.is_null() {
        warn!("getmntinfo failed; scanning without mount boundaries");
        return Vec::new();
    }

    let mut mounts = Vec::with_capacity(count as usize);
    for i in 0..count as isize {
        let st = unsafe { &*table.offset(i) };
        let on = unsafe { CStr::from_ptr(st.f_mntonname.as_ptr()) };
        let fs_name = unsafe { CStr::from_ptr(st.f_fstypename.as_ptr()) };
        mounts.push(MountEntry {
            path: PathBuf::from(std::ffi::OsStr::from_bytes(on.to_bytes())),
            fs_type: CompactString::new(fs_name.to_string_lossy()),
        });
    }
    mounts
}

/// Read the kernel's mount table from /proc/self/mounts.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn enumerate_mounts() -> Vec<MountEntry> {
    let table = match std::fs::read_to_string("/proc/self/mounts") {
        Ok(table) => table,
        Err(err) => {
            warn!(%err, "cannot read mount table; scanning without mount boundaries");
            return Vec::new();
        }
    };
    table
        .lines()
        .filter_map(|line| {
            // "<device> <mount point> <fs type> <options> <freq> <passno>"
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let target = fields.next()?;
            let fs_type = fields.next()?;
            Some(MountEntry {
                path: PathBuf::from(unescape_mount_path(target)),
                fs_type: CompactString::new(fs_type),
            })
        })
        .collect()
}

/// Undo the octal escaping the kernel applies to whitespace in mount
/// paths ("\040" for space and friends).
#[cfg(all(unix, not(target_os = "macos")))]
fn unescape_mount_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let digits: String = chars.clone().take(3).collect();
        if digits.len() == 3 {
            if let Ok(code) = u8::from_str_radix(&digits, 8) {
                out.push(code as char);
                chars.nth(2);
                continue;
            }
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_table_enumerates_root() {
        let mounts = enumerate_mounts();
        // every Unix host has at least the root filesystem mounted
        assert!(mounts.iter().any(|m| m.path == PathBuf::from("/")));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn octal_escapes_round_trip() {
        assert_eq!(unescape_mount_path(r"/mnt/usb"), "/mnt/usb");
        assert_eq!(unescape_mount_path(r"/mnt/my\040drive"), "/mnt/my drive");
        assert_eq!(unescape_mount_path(r"/mnt/tab\011sep"), "/mnt/tab\tsep");
        // malformed escapes pass through untouched
        assert_eq!(unescape_mount_path(r"/mnt/bad\9x"), r"/mnt/bad\9x");
    }
}

//! C ABI over the duscan scanner.
//!
//! Host applications see two opaque handle types: a scan result and a tree
//! node. Node handles returned by [`duscan_node_child`] are freshly owned
//! (the underlying tree is reference-counted) and must be released
//! independently of the result; releasing the result drops the last
//! reference to every node no handle still points at.
//!
//! Every function is null-safe: a null handle yields the neutral value
//! (zero, false, or null) rather than undefined behaviour.

use duscan_core::{scan, FileNode, ScanOptions, ScanResult};
use std::ffi::{c_char, c_double, CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque node handle: one owned reference into the scanned tree, plus the
/// NUL-terminated path it hands out. The path pointer returned by
/// [`duscan_node_path`] stays valid exactly as long as this handle lives.
pub struct NodeHandle {
    node: Arc<FileNode>,
    path: CString,
}

impl NodeHandle {
    fn new(node: Arc<FileNode>) -> Self {
        // paths cannot contain interior NULs on POSIX; an empty string is
        // the neutral fallback rather than a panic across the ABI
        let path = CString::new(node.path().as_os_str().as_bytes()).unwrap_or_default();
        Self { node, path }
    }
}

/// Scan `path` with the default parallel configuration.
///
/// Returns an owned result handle, or null if `path` is null. The scan
/// itself never fails; a missing path produces a zero-size root.
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn duscan_scan(
    path: *const c_char,
    root_only: bool,
    include_directory_self_size: bool,
    use_allocated_size: bool,
) -> *mut ScanResult {
    duscan_scan_with(
        path,
        true,
        0,
        root_only,
        include_directory_self_size,
        use_allocated_size,
    )
}

/// Scan `path` with explicit parallelism controls. `max_threads` of zero
/// means "use the host's hardware parallelism".
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn duscan_scan_with(
    path: *const c_char,
    use_parallel: bool,
    max_threads: u32,
    root_only: bool,
    include_directory_self_size: bool,
    use_allocated_size: bool,
) -> *mut ScanResult {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let bytes = unsafe { CStr::from_ptr(path) }.to_bytes();
    let path = PathBuf::from(OsStr::from_bytes(bytes));
    let options = ScanOptions {
        use_parallel,
        max_threads: max_threads as usize,
        root_only,
        include_directory_self_size,
        use_allocated_size,
        ..ScanOptions::default()
    };
    Box::into_raw(Box::new(scan(path, options)))
}

/// Fresh owned handle to the result's root node; null for a null result.
///
/// # Safety
///
/// `result` must be null or a live pointer from [`duscan_scan`] /
/// [`duscan_scan_with`].
#[no_mangle]
pub unsafe extern "C" fn duscan_result_root(result: *const ScanResult) -> *mut NodeHandle {
    let Some(result) = (unsafe { result.as_ref() }) else {
        return std::ptr::null_mut();
    };
    Box::into_raw(Box::new(NodeHandle::new(Arc::clone(result.root()))))
}

/// Wall-clock milliseconds the scan took; 0.0 for a null result.
///
/// # Safety
///
/// `result` must be null or a live pointer from [`duscan_scan`] /
/// [`duscan_scan_with`].
#[no_mangle]
pub unsafe extern "C" fn duscan_result_elapsed_ms(result: *const ScanResult) -> c_double {
    unsafe { result.as_ref() }.map_or(0.0, ScanResult::elapsed_ms)
}

/// The node's absolute path as a NUL-terminated string, valid while the
/// handle lives; null for a null handle.
///
/// # Safety
///
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_path(node: *const NodeHandle) -> *const c_char {
    unsafe { node.as_ref() }.map_or(std::ptr::null(), |handle| handle.path.as_ptr())
}

/// Aggregated size in bytes; 0 for a null handle.
///
/// # Safety
///
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_size(node: *const NodeHandle) -> u64 {
    unsafe { node.as_ref() }.map_or(0, |handle| handle.node.size())
}

/// Whether the node is a directory; false for a null handle.
///
/// # Safety
///
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_is_directory(node: *const NodeHandle) -> bool {
    unsafe { node.as_ref() }.is_some_and(|handle| handle.node.is_dir())
}

/// Number of direct children; 0 for a null handle.
///
/// # Safety
///
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_children_count(node: *const NodeHandle) -> usize {
    unsafe { node.as_ref() }.map_or(0, |handle| handle.node.children().len())
}

/// Fresh owned handle to child `index`, or null when the handle is null or
/// the index is out of bounds.
///
/// # Safety
///
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_child(
    node: *const NodeHandle,
    index: usize,
) -> *mut NodeHandle {
    let Some(handle) = (unsafe { node.as_ref() }) else {
        return std::ptr::null_mut();
    };
    match handle.node.children().get(index) {
        Some(child) => Box::into_raw(Box::new(NodeHandle::new(Arc::clone(child)))),
        None => std::ptr::null_mut(),
    }
}

/// Release a node handle. Null is a no-op.
///
/// # Safety
///
/// `node` must be null or a pointer previously returned by
/// [`duscan_result_root`] or [`duscan_node_child`], released at most once.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_release(node: *mut NodeHandle) {
    if !node.is_null() {
        drop(unsafe { Box::from_raw(node) });
    }
}

/// Release a result handle. Null is a no-op.
///
/// # Safety
///
/// `result` must be null or a pointer previously returned by
/// [`duscan_scan`] / [`duscan_scan_with`], released at most once.
#[no_mangle]
pub unsafe extern "C" fn duscan_result_release(result: *mut ScanResult) {
    if !result.is_null() {
        drop(unsafe { Box::from_raw(result) });
    }
}

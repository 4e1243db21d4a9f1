/// The recursive walk: probe entries, fan out subdirectories, emit leaves.
///
/// Each directory runs the same machine: enter, classify self, dedup,
/// iterate in batches, join spawned children, finalise. Failures never
/// travel upward as errors; they degrade to zero-size nodes so the shape
/// of the tree survives whatever the filesystem does mid-scan.
use super::pool::TaskReceipt;
use super::{policy, ScanContext};
use crate::model::node::{FileNode, NodeBuilder};
use crate::platform::probe;
use std::fs::{self, DirEntry};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// A spawned subdirectory: the path is kept so a lost lane can still be
/// represented in the parent.
type SpawnedChild = (PathBuf, TaskReceipt<Option<FileNode>>);

/// Leaf for a regular file or symlink. Symlinks report the size of the
/// link itself; regular files report the allocated or logical size per
/// the scan mode; probe failures come back as zero-size leaves.
pub(crate) fn file_leaf(ctx: &ScanContext, path: PathBuf) -> FileNode {
    let info = probe::info(&path, ctx.options().use_allocated_size);
    FileNode::leaf(path, info.bytes)
}

/// Process one directory, returning its finished node.
///
/// `None` means the node is suppressed entirely: the path was already
/// visited in this scan, or it hard-link-aliases a top-level directory.
/// Suppressed subtrees contribute neither size nor structure.
pub(crate) fn process_directory(
    ctx: &Arc<ScanContext>,
    path: PathBuf,
    depth: usize,
) -> Option<FileNode> {
    if !probe::readable(&path) {
        return Some(FileNode::empty_dir(path));
    }
    if probe::is_symlink(&path) {
        // a symlink where a directory was expected is a leaf, not a container
        return Some(file_leaf(ctx, path));
    }
    if !path.exists() {
        return Some(FileNode::empty_dir(path));
    }
    if policy::should_skip(ctx, &path) {
        debug!(path = %path.display(), "boundary skip");
        return Some(FileNode::empty_dir(path));
    }
    if ctx.oracle().aliases_root_child(&path) {
        return None;
    }
    if !ctx.mark_visited(&path) {
        return None;
    }

    let mut node = NodeBuilder::dir(path.clone());
    if ctx.options().include_directory_self_size {
        node.seed_self_size(probe::self_size(&path));
    }

    let mut spawned: Vec<SpawnedChild> = Vec::new();
    if let Ok(entries) = fs::read_dir(&path) {
        let mut batch: Vec<DirEntry> = Vec::with_capacity(ctx.options().batch_size);
        for entry in entries {
            match entry {
                Ok(entry) => {
                    batch.push(entry);
                    if batch.len() >= ctx.options().batch_size {
                        drain_batch(ctx, &mut batch, &mut node, &mut spawned, depth);
                    }
                }
                // unreadable entries vanish silently; any other mid-stream
                // failure ends iteration of this directory only
                Err(err) if err.kind() == ErrorKind::PermissionDenied => continue,
                Err(_) => break,
            }
        }
        drain_batch(ctx, &mut batch, &mut node, &mut spawned, depth);
    }

    for (child_path, receipt) in spawned {
        match receipt.join() {
            Some(Some(child)) => node.push(child),
            // suppressed subtree: no size, no child
            Some(None) => {}
            // the lane was lost; keep the directory visible with zero size
            None => node.push(FileNode::empty_dir(child_path)),
        }
    }

    Some(node.finish(depth == 0 && ctx.options().root_only))
}

/// Drain one batch of directory entries: probe, classify, and either emit
/// a leaf, recurse inline, or hand the subdirectory to another lane.
fn drain_batch(
    ctx: &Arc<ScanContext>,
    batch: &mut Vec<DirEntry>,
    node: &mut NodeBuilder,
    spawned: &mut Vec<SpawnedChild>,
    depth: usize,
) {
    for entry in batch.drain(..) {
        let entry_path = entry.path();
        if !probe::readable(&entry_path) {
            node.push(FileNode::leaf(entry_path, 0));
            continue;
        }
        if probe::is_symlink(&entry_path) {
            node.push(file_leaf(ctx, entry_path));
            continue;
        }
        let info = probe::info(&entry_path, ctx.options().use_allocated_size);
        if info.is_dir {
            // fan out only at shallow depths, and only while a lane is free
            if depth < ctx.options().depth_cap {
                let task_ctx = Arc::clone(ctx);
                let task_path = entry_path.clone();
                if let Some(receipt) = ctx
                    .pool()
                    .try_spawn(move || process_directory(&task_ctx, task_path, depth + 1))
                {
                    spawned.push((entry_path, receipt));
                    continue;
                }
            }
            if let Some(child) = process_directory(ctx, entry_path, depth + 1) {
                node.push(child);
            }
        } else if info.bytes > 0 {
            // zero-byte files (and failed probes) contribute nothing and
            // are not recorded
            node.push(FileNode::leaf(entry_path, info.bytes));
        }
    }
}

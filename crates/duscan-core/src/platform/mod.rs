/// Platform layer: POSIX stat probes and mount-table enumeration.
///
/// Everything syscall-shaped lives here so the scanner above it stays free
/// of `unsafe` and of per-OS conditionals.
pub mod mounts;
pub mod probe;

pub use mounts::{enumerate_mounts, MountEntry};

//! Filesystem primitives shared by the snapshot store and the result cache

mod atomic;

pub use atomic::{atomic_write, ensure_dir};

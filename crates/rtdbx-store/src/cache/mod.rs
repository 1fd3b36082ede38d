//! File cache for large read results

mod file_cache;

pub use file_cache::{
    CachedResult, ReadResult, ResultCache, DEFAULT_PREVIEW_CHARS, DEFAULT_THRESHOLD_BYTES,
};

//! Download configuration constants

/// Number of concurrent download workers in multiprocess mode.
/// Ten workers saturate the descriptor endpoint without tripping its
/// rate limiting; descriptors are a few kilobytes each so the bound is
/// latency, not bandwidth.
pub const DOWNLOAD_POOL_WIDTH: usize = 10;

/// Consecutive already-existing files tolerated before asking the user
/// whether to continue. A handful of hits is normal when extending an
/// earlier run; more than ten in a row usually means the whole range was
/// downloaded before and the rest of the run would be a no-op.
pub const EXISTING_FILE_THRESHOLD: u32 = 10;

/// File extension for torrent descriptors.
pub const TORRENT_EXTENSION: &str = "torrent";

/// File extension for poster images.
pub const POSTER_EXTENSION: &str = "jpg";

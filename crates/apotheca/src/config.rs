//! Configuration constants for the storefront core

/// Application metadata
pub mod app {
    /// Application name (used for the data directory)
    pub const NAME: &str = "apotheca";
}

/// Durable storage layout
pub mod storage {
    /// Key holding the JSON array of wishlisted product ids
    pub const WISHLIST_KEY: &str = "wishlist";

    /// Key holding the JSON array of compared product snapshots
    pub const COMPARISON_KEY: &str = "comparison";

    /// File extension used by file-backed storage
    pub const FILE_EXTENSION: &str = "json";
}

/// Comparison list limits
pub mod comparison {
    /// Maximum number of products that can be compared side by side
    pub const CAPACITY: usize = 4;
}

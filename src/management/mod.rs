mod cache;
mod state;

pub use cache::CacheError;
pub use cache::CoverCache;
pub use state::ProcessedSet;

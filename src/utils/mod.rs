pub mod cache;
pub mod logger;

pub use cache::CachedSource;
pub use logger::init_tracing;

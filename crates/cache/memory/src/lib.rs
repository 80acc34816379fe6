mod store;

pub use store::MemoryCache;

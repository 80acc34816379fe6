mod config;
mod key_render;
mod store;

pub use config::RedisCacheConfig;
pub use key_render::render_key;
pub use store::RedisCache;

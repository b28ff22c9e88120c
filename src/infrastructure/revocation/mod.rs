mod in_memory;
mod redis_store;
mod sweeper;

pub use in_memory::InMemoryRevocationStore;
pub use redis_store::RedisRevocationStore;
pub use sweeper::spawn_revocation_sweeper;

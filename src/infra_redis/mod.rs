mod record_store_redis;

pub use record_store_redis::*;

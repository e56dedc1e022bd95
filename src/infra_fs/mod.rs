mod file_store_local;

pub use file_store_local::*;

mod file_store_memory;
mod manual_clock;
mod record_store_memory;

pub use file_store_memory::*;
pub use manual_clock::*;
pub use record_store_memory::*;

// store

mod record_store;

pub use record_store::*;

// files

mod file_store;

pub use file_store::*;

mod clock;

pub use clock::*;

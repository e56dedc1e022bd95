mod record_store_mysql;

pub use record_store_mysql::*;

mod util;

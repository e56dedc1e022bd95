mod admin;
mod document;
mod item;
mod portfolio;
mod seed;

pub use admin::*;
pub use document::*;
pub use item::*;
pub use portfolio::*;
pub use seed::*;

pub mod error;
pub mod model;
pub mod packer;
pub mod loader;
pub mod drill;
pub mod export;
pub mod search;
pub mod human;

pub use error::{Error, Result};
pub use model::*;
pub use packer::{compute_layout, BubblePacker, PackConfig};
pub use drill::DrillPath;
pub use loader::{LoadMsg, Loader};

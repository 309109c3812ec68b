//! Display drivers

pub mod pcd8544;
pub mod screen;

pub use pcd8544::{Pcd8544, Pcd8544Error};
pub use screen::Screen;

//! Configuration components
//!
//! One focused section per concern, each with safe defaults.

pub mod context;
pub mod navigation;
pub mod registry;
pub mod render;
pub mod server;

pub use context::*;
pub use navigation::*;
pub use registry::*;
pub use render::*;
pub use server::*;

//! Scene graph, ray casting and point selection for pointpick
//!
//! A pick turns a pointer position into a world-space ray, collects every
//! intersection in the [`Scene`], keeps the closest one that belongs to the
//! point cloud and hands it to the [`SelectionStateMachine`], which rewrites
//! the cloud's color buffer.

pub mod scene;
pub mod raycaster;
pub mod picking;
pub mod selection;

pub use scene::*;
pub use raycaster::*;
pub use picking::*;
pub use selection::*;

//! WebGPU rendering module
//!
//! A frame goes state -> [`scene::build_scene`] (display list) ->
//! [`shapes::tessellate`] (NDC triangles) -> [`RenderState::render`].

pub mod assets;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod sky;
pub mod vertex;

pub use assets::{AssetId, AssetStatus, NoAssets};
pub use pipeline::RenderState;
pub use scene::{DrawCmd, Scene, build_scene};
pub use shapes::{Mesh, Viewport, tessellate};

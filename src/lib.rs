//! Loaders for the text formats a scene is assembled from.
//!
//! A scene file places OBJ models and declares lights. Each model may pull
//! in MTL material libraries, which in turn reference texture images. The
//! loaders here read that chain into plain, deduplicated data: every model
//! file is parsed once per scene and every texture once per model. Turning
//! the result into GPU resources is left to the caller; [`mesh`] provides
//! the flattening step most renderers need.

pub mod cursor;
pub mod error;
pub mod material;
pub mod mesh;
pub mod model;
pub mod scene;
pub mod tables;
pub mod texture;

pub use error::{LoadError, Result};
pub use material::{Material, MaterialSet};
pub use mesh::{build_group, MeshBatch, MeshVertex};
pub use model::{Model, Triangle, TriangleGroup, TriangleVertices, VertexType};
pub use scene::{
    Attenuation, DirectionalLight, ModelCache, ModelHandle, Placement, PointLight, Scene,
    SpotLight,
};
pub use texture::{ImageTextureLoader, Texture, TextureLoader};

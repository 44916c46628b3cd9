use std::path::Path;

use log::debug;

use crate::error::{LoadError, Result};

/// Decoded RGBA8 texture data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decodes texture images referenced by material libraries.
pub trait TextureLoader {
    fn load(&self, path: &Path) -> Result<Texture>;
}

/// Loader backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTextureLoader;

impl TextureLoader for ImageTextureLoader {
    fn load(&self, path: &Path) -> Result<Texture> {
        let image = image::open(path)
            .map_err(|err| match err {
                image::ImageError::IoError(source) => LoadError::io(path, source),
                other => LoadError::Texture {
                    path: path.to_path_buf(),
                    source: Box::new(other),
                },
            })?
            .to_rgba8();
        debug!(
            "decoded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Texture {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }
}

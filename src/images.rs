//! Slot image loading
//!
//! Decodes image files with the `image` crate and uploads them as egui
//! textures, once per URL. Remote URLs (such as the start placeholder) are
//! never fetched; the panel draws its own placeholder instead.

use eframe::egui;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Size the image panels reserve, in points
pub const PANEL_SIZE: [f32; 2] = [337.0, 335.0];

pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn decode(path: &Path) -> anyhow::Result<egui::ColorImage> {
    let rgba = image::open(path)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Textures keyed by URL. Failed loads are remembered as `None` so a missing
/// file is reported once rather than every frame.
#[derive(Default)]
pub struct ImageCache {
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl ImageCache {
    pub fn texture(&mut self, ctx: &egui::Context, url: &str) -> Option<egui::TextureHandle> {
        if is_remote(url) {
            return None;
        }

        self.textures
            .entry(url.to_string())
            .or_insert_with(|| match decode(Path::new(url)) {
                Ok(image) => {
                    info!("Loaded slot image {} ({}x{})", url, image.size[0], image.size[1]);
                    Some(ctx.load_texture(url, image, egui::TextureOptions::LINEAR))
                }
                Err(e) => {
                    warn!("Failed to load slot image {}: {}", url, e);
                    None
                }
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_urls_are_not_loaded() {
        assert!(is_remote(crate::config::DEFAULT_PLACEHOLDER_URL));
        assert!(!is_remote("public/img/3.png"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(decode(Path::new("does/not/exist.png")).is_err());
    }
}

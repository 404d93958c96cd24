//! Raster export through resvg.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use log::debug;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

/// Rasterize a standalone SVG document at `scale` device pixels per CSS pixel.
///
/// The canvas is filled white first, so the returned pixels are fully opaque.
pub fn rasterize(svg: &str, scale: f32) -> Result<RgbaImage> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(anyhow!("Invalid raster scale {}", scale));
    }
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).context("Failed to parse exported SVG")?;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    debug!("Rasterizing {}x{} at {}x -> {}x{}", size.width(), size.height(), scale, width, height);

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| anyhow!("Failed to allocate {}x{} pixmap", width, height))?;
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // an opaque canvas makes premultiplied and straight alpha identical
    RgbaImage::from_raw(width, height, pixmap.take()).ok_or_else(|| anyhow!("Pixel buffer does not match image size"))
}

pub fn write_png<P: AsRef<Path>>(svg: &str, scale: f32, path: P) -> Result<()> {
    let path = path.as_ref();
    let image = rasterize(svg, scale)?;
    image.save(path).with_context(|| format!("Failed to write PNG to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="20" height="10" viewBox="0 0 20 10" xmlns="http://www.w3.org/2000/svg">
  <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
</svg>
"##;

    #[test]
    fn test_rasterize_scales_and_fills_white() {
        let image = rasterize(SQUARE, 2.0).unwrap();
        assert_eq!(image.dimensions(), (40, 20));
        assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(35, 15).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(rasterize(SQUARE, 0.0).is_err());
    }
}

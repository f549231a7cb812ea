//! Decode/resize/encode helpers for image attachments.

use anyhow::{Context, Result, anyhow};

/// Decoded image payload encoded as PNG bytes, with original dimensions.
#[derive(Debug, Clone)]
pub struct DecodedImagePng {
    pub png_bytes: Vec<u8>,
    pub source_width: u32,
    pub source_height: u32,
}

/// Decodes uploaded image bytes and returns PNG bytes, downscaled to fit
/// `max_dims` when the source exceeds them.
///
/// If the upload is already PNG and does not exceed `max_dims`, the bytes
/// are passed through as-is (fast path).
///
/// # Errors
/// Returns an error if format detection, decoding, resizing, or PNG
/// encoding fails.
pub fn decode_image_to_png(data: &[u8], max_dims: (u32, u32)) -> Result<DecodedImagePng> {
    let is_png = data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    let reader = image::ImageReader::new(std::io::Cursor::new(data))
        .with_guessed_format()
        .context("detect image format")?;
    let (width, height) = reader.into_dimensions().context("read image dimensions")?;

    let (max_w, max_h) = (max_dims.0.max(1), max_dims.1.max(1));
    let needs_resize = width > max_w || height > max_h;

    let png_bytes = if is_png && !needs_resize {
        data.to_vec()
    } else {
        let reader = image::ImageReader::new(std::io::Cursor::new(data))
            .with_guessed_format()
            .context("detect image format")?;
        let dyn_img = reader.decode().context("decode image")?;
        let resized = if needs_resize {
            let (dst_w, dst_h) = fit_dimensions(width, height, max_w, max_h);
            resize_image_fast(&dyn_img, dst_w, dst_h)?
        } else {
            dyn_img
        };

        encode_png_fast(&resized)?
    };

    Ok(DecodedImagePng {
        png_bytes,
        source_width: width,
        source_height: height,
    })
}

/// Largest dimensions within `(max_w, max_h)` preserving aspect ratio.
fn fit_dimensions(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let scale = f64::min(
        f64::from(max_w) / f64::from(width),
        f64::from(max_h) / f64::from(height),
    );
    let dst_w = (f64::from(width) * scale).round() as u32;
    let dst_h = (f64::from(height) * scale).round() as u32;
    (dst_w.max(1), dst_h.max(1))
}

fn resize_image_fast(
    src: &image::DynamicImage,
    dst_w: u32,
    dst_h: u32,
) -> Result<image::DynamicImage> {
    use fast_image_resize as fir;

    if src.width() == dst_w && src.height() == dst_h {
        return Ok(src.clone());
    }

    let src_rgba = src.to_rgba8();
    let src_w = src_rgba.width();
    let src_h = src_rgba.height();
    let src_pixels = src_rgba.into_raw();

    let src_image = fir::images::Image::from_vec_u8(src_w, src_h, src_pixels, fir::PixelType::U8x4)
        .context("resize input buffer")?;

    let mut dst_image = fir::images::Image::new(dst_w, dst_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let options = fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Nearest);
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .context("resize image")?;

    let dst_pixels = dst_image.into_vec();
    let rgba = image::RgbaImage::from_raw(dst_w, dst_h, dst_pixels)
        .ok_or_else(|| anyhow!("resize produced an invalid output buffer"))?;
    Ok(image::DynamicImage::ImageRgba8(rgba))
}

fn encode_png_fast(img: &image::DynamicImage) -> Result<Vec<u8>> {
    use image::ImageEncoder as _;
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};

    let has_alpha = img.color().has_alpha();
    let mut buf = Vec::new();

    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::Adaptive);

    if has_alpha {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        encoder
            .write_image(rgba.as_raw(), w, h, image::ExtendedColorType::Rgba8)
            .context("encode PNG")?;
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        encoder
            .write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)
            .context("encode PNG")?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([10, 20, 30]),
        ));
        encode_png_fast(&img).unwrap()
    }

    #[test]
    fn small_png_passes_through_untouched() {
        let bytes = png_bytes(4, 3);
        let decoded = decode_image_to_png(&bytes, (64, 64)).unwrap();
        assert_eq!(decoded.png_bytes, bytes);
        assert_eq!((decoded.source_width, decoded.source_height), (4, 3));
    }

    #[test]
    fn oversized_image_is_downscaled_preserving_aspect() {
        let bytes = png_bytes(64, 32);
        let decoded = decode_image_to_png(&bytes, (16, 16)).unwrap();
        let reread = image::load_from_memory(&decoded.png_bytes).unwrap();
        assert_eq!((reread.width(), reread.height()), (16, 8));
        // Original dimensions are reported, not the downscaled ones.
        assert_eq!((decoded.source_width, decoded.source_height), (64, 32));
    }

    #[test]
    fn jpeg_input_is_reencoded_to_png() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([200, 100, 50]),
        ));
        let mut jpeg = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut jpeg),
            image::ImageFormat::Jpeg,
        )
        .unwrap();

        let decoded = decode_image_to_png(&jpeg, (64, 64)).unwrap();
        assert_eq!(&decoded.png_bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_image_to_png(b"definitely not an image", (64, 64));
        assert!(err.is_err());
    }

    #[test]
    fn fit_dimensions_never_hits_zero() {
        assert_eq!(fit_dimensions(1000, 1, 10, 10), (10, 1));
    }
}

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::errors::AppResult;

/// Decode an image file into memory
pub fn load_image(file_path: &str) -> AppResult<DynamicImage> {
    log::debug!("Decoding image: {}", file_path);
    Ok(image::open(file_path)?)
}

/// Serialize an in-memory image to a PNG byte buffer for transport
pub fn encode_png(image: &DynamicImage) -> AppResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Decode a capture from disk and re-encode it as PNG, regardless of the
/// source format
pub fn encode_png_file(file_path: &str) -> AppResult<Vec<u8>> {
    let image = load_image(file_path)?;
    encode_png(&image)
}

/// Returns (width, height, file size in bytes)
pub fn get_image_info(file_path: &str) -> AppResult<(u32, u32, u64)> {
    let (width, height) = image::image_dimensions(file_path)?;
    let file_size = std::fs::metadata(file_path)?.len();
    Ok((width, height, file_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    fn create_test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn test_encode_png_produces_png_signature() {
        let image = create_test_image();
        let bytes = encode_png(&image).expect("encoding should succeed");
        assert!(bytes.len() > PNG_SIGNATURE.len());
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let image = create_test_image();
        let bytes = encode_png(&image).expect("encoding should succeed");

        let decoded = image::load_from_memory(&bytes).expect("decoding should succeed");
        assert_eq!(decoded.width(), 2);
        assert_eq!(decoded.height(), 2);
    }

    #[test]
    fn test_encode_png_file_re_encodes_jpeg() {
        let temp_path = std::env::temp_dir().join("nestup_test_encode.jpg");
        create_test_image()
            .to_rgb8()
            .save_with_format(&temp_path, ImageFormat::Jpeg)
            .expect("saving test jpeg should succeed");

        let result = encode_png_file(&temp_path.to_string_lossy());

        let _ = std::fs::remove_file(&temp_path);

        let bytes = result.expect("re-encoding should succeed");
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_get_image_info() {
        let temp_path = std::env::temp_dir().join("nestup_test_info.png");
        create_test_image()
            .save_with_format(&temp_path, ImageFormat::Png)
            .expect("saving test png should succeed");

        let result = get_image_info(&temp_path.to_string_lossy());

        let _ = std::fs::remove_file(&temp_path);

        let (width, height, size) = result.expect("image info should succeed");
        assert_eq!(width, 2);
        assert_eq!(height, 2);
        assert!(size > 0);
    }

    #[test]
    fn test_load_image_nonexistent_file() {
        assert!(load_image("definitely_does_not_exist.png").is_err());
    }
}

//! Lossless PNG encoding.

use crate::raster::RasterImage;
use crate::{ExportError, ExportResult};

pub fn encode_png(image: &RasterImage) -> ExportResult<Vec<u8>> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.pixels.len() != expected {
        return Err(ExportError::Encode(format!(
            "expected {} bytes of RGBA, got {}",
            expected,
            image.pixels.len()
        )));
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.pixels)?;
        writer.finish()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_png_signature() {
        let image = RasterImage {
            width: 2,
            height: 1,
            pixels: vec![255, 255, 255, 255, 0, 0, 0, 255],
        };
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decodes_back_to_the_same_pixels() {
        let image = RasterImage {
            width: 1,
            height: 2,
            pixels: vec![1, 2, 3, 255, 249, 249, 249, 255],
        };
        let bytes = encode_png(&image).unwrap();
        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (1, 2));
        assert_eq!(&buf[..info.buffer_size()], image.pixels.as_slice());
    }

    #[test]
    fn short_buffers_are_rejected() {
        let image = RasterImage {
            width: 2,
            height: 2,
            pixels: vec![0; 4],
        };
        assert!(matches!(encode_png(&image), Err(ExportError::Encode(_))));
    }
}

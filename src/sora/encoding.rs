//! Host image tensor to PNG data-URI encoding.
//!
//! The host hands images over as float tensors laid out `[H, W, C]` or
//! `[B, H, W, C]` with values normalized to `[0, 1]`. The API wants a single
//! 8-bit PNG, base64-encoded behind a `data:` prefix.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use super::client::SoraError;

/// Prefix of every data URI produced by [`encode_image`].
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Row-major float pixel buffer in the host's image layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl ImageTensor {
    /// Wrap a raw buffer. The shape is validated lazily by [`encode_image`].
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self { shape, data }
    }

    /// Build a single-frame `[1, H, W, C]` tensor from a decoded image.
    ///
    /// Grayscale images keep one channel, images with alpha get four, and
    /// everything else is converted to RGB.
    pub fn from_image(img: &DynamicImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let color = img.color();

        let (channels, bytes) = if color.has_alpha() {
            (4, img.to_rgba8().into_raw())
        } else if !color.has_color() {
            (1, img.to_luma8().into_raw())
        } else {
            (3, img.to_rgb8().into_raw())
        };

        let data = bytes.into_iter().map(|b| f32::from(b) / 255.0).collect();
        Self::new(vec![1, height, width, channels], data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Encode a host image tensor as a `data:image/png;base64,...` URI.
///
/// # Errors
///
/// Returns `SoraError::Encoding` when the shape is not `[H, W]`, `[H, W, C]`
/// or `[B, H, W, C]`, when a dimension is zero, when `C` is not 1, 3 or 4, or
/// when the buffer length does not match the shape. Returns
/// `SoraError::Image` if the PNG encoder fails.
pub fn encode_image(tensor: &ImageTensor) -> Result<String, SoraError> {
    let layout = FrameLayout::of(tensor)?;
    let bytes: Vec<u8> = layout.pixels.iter().copied().map(quantize).collect();

    let width = to_u32(layout.width, "width")?;
    let height = to_u32(layout.height, "height")?;

    let image = match layout.channels {
        1 => GrayImage::from_raw(width, height, bytes).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgba8),
    }
    .ok_or_else(|| encoding_error("pixel buffer does not fit image dimensions"))?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    log::debug!(
        "Encoded {}x{}x{} reference image ({} PNG bytes)",
        layout.width,
        layout.height,
        layout.channels,
        png.len()
    );

    Ok(format!(
        "{}{}",
        PNG_DATA_URI_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&png)
    ))
}

/// Decode a data URI produced by [`encode_image`] back into an image.
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage, SoraError> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| encoding_error("missing data:image/png;base64, prefix"))?;

    let png = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| encoding_error(&format!("invalid base64 payload: {}", e)))?;

    Ok(image::load_from_memory_with_format(&png, ImageFormat::Png)?)
}

/// The first frame of a validated tensor.
struct FrameLayout<'a> {
    height: usize,
    width: usize,
    channels: usize,
    pixels: &'a [f32],
}

impl<'a> FrameLayout<'a> {
    fn of(tensor: &'a ImageTensor) -> Result<Self, SoraError> {
        let (frames, height, width, channels) = match *tensor.shape() {
            [h, w] => (1, h, w, 1),
            [h, w, c] => (1, h, w, c),
            [b, h, w, c] => (b, h, w, c),
            _ => {
                return Err(encoding_error(&format!(
                    "expected shape [H, W, C] or [B, H, W, C], got {:?}",
                    tensor.shape()
                )))
            }
        };

        if frames == 0 || height == 0 || width == 0 || channels == 0 {
            return Err(encoding_error(&format!(
                "zero-sized dimension in shape {:?}",
                tensor.shape()
            )));
        }

        if !matches!(channels, 1 | 3 | 4) {
            return Err(encoding_error(&format!(
                "unsupported channel count {} (expected 1, 3 or 4)",
                channels
            )));
        }

        let frame_len = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| encoding_error("image dimensions overflow"))?;
        let expected = frame_len
            .checked_mul(frames)
            .ok_or_else(|| encoding_error("image dimensions overflow"))?;

        if tensor.data().len() != expected {
            return Err(encoding_error(&format!(
                "buffer holds {} values but shape {:?} needs {}",
                tensor.data().len(),
                tensor.shape(),
                expected
            )));
        }

        if frames > 1 {
            log::warn!(
                "Image batch holds {} frames; only the first is used as reference",
                frames
            );
        }

        Ok(Self {
            height,
            width,
            channels,
            pixels: &tensor.data()[..frame_len],
        })
    }
}

/// Map a normalized float to an 8-bit channel value.
fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_u32(value: usize, name: &str) -> Result<u32, SoraError> {
    u32::try_from(value).map_err(|_| encoding_error(&format!("image {} {} is too large", name, value)))
}

fn encoding_error(reason: &str) -> SoraError {
    SoraError::Encoding {
        reason: reason.to_string(),
    }
}

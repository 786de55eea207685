use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
use tracing::debug;

use crate::error::AccountError;
use crate::model::AvatarImage;

pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_AVATAR_DIMENSION: u32 = 4096;
pub const MAX_AVATAR_ALLOC: u64 = 64 * 1024 * 1024;
pub const AVATAR_SIZE: u32 = 192;

/// Decodes a downloaded avatar and re-encodes it as a PNG no larger than
/// `AVATAR_SIZE` on either side.
pub fn decode_avatar(bytes: &[u8]) -> Result<AvatarImage, AccountError> {
    if bytes.is_empty() {
        return Err(image_error("empty body"));
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(image_error(format!(
            "{} bytes exceeds maximum {MAX_AVATAR_BYTES}",
            bytes.len()
        )));
    }

    let img = decode_limited(bytes)?;
    let (w, h) = img.dimensions();
    let img = if w > AVATAR_SIZE || h > AVATAR_SIZE {
        img.thumbnail(AVATAR_SIZE, AVATAR_SIZE)
    } else {
        img
    };
    let (width, height) = img.dimensions();

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| image_error(e.to_string()))?;

    debug!(
        source_width = w,
        source_height = h,
        width,
        height,
        png_bytes = png.len(),
        "avatar decoded"
    );
    Ok(AvatarImage { width, height, png })
}

fn decode_limited(bytes: &[u8]) -> Result<DynamicImage, AccountError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| image_error(e.to_string()))?;
    if reader.format().is_none() {
        return Err(image_error("unsupported image format"));
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_AVATAR_DIMENSION);
    limits.max_image_height = Some(MAX_AVATAR_DIMENSION);
    limits.max_alloc = Some(MAX_AVATAR_ALLOC);
    reader.limits(limits);

    reader.decode().map_err(|e| image_error(e.to_string()))
}

fn image_error(message: impl Into<String>) -> AccountError {
    AccountError::Image {
        message: message.into(),
    }
}

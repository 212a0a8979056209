//! Content classification: assigns an [`ItemKind`] to raw content and
//! derives the cached previews (truncated text snippet, thumbnail PNG).

use crate::types::ItemKind;
use std::io::Cursor;
use std::path::Path;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ClassifyError {
        /// Source bytes could not be read. Aborts ingestion for that item only.
        #[error("content unreadable: {0}")]
        ContentUnreadable(#[from] std::io::Error),

        #[error("image error: {0}")]
        Image(#[from] image::ImageError),

        #[error("resize error: {0}")]
        Resize(#[from] fast_image_resize::ResizeError),
    }
}

use error::ClassifyError;

/// Maximum preview snippet length, in characters.
pub const PREVIEW_TEXT_MAX: usize = 50;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Classification result: the kind plus both derived previews.
#[derive(Debug, Clone)]
pub struct Classified {
    pub kind: ItemKind,
    pub preview_text: String,
    pub preview_image: Option<Vec<u8>>,
}

pub fn is_supported_image(file_name: &str) -> bool {
    let ext = file_name
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Kind for plain text content: `http(s)://` prefix is a link, a strict
/// `#RGB`/`#RRGGBB` value is a color, everything else is text.
pub fn classify_text(text: &str) -> ItemKind {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return ItemKind::Link;
    }
    if is_hex_color(trimmed) {
        return ItemKind::Color;
    }
    ItemKind::Text
}

fn is_hex_color(text: &str) -> bool {
    let Some(digits) = text.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Trims, then truncates to [`PREVIEW_TEXT_MAX`] characters.
pub fn preview_text(text: &str) -> String {
    text.trim().chars().take(PREVIEW_TEXT_MAX).collect()
}

/// Classifies plain text content. Collections without the rich kind set
/// (`rich = false`) fold links and colors into plain text.
pub fn classify_text_content(text: &str, rich: bool) -> Classified {
    let kind = if rich { classify_text(text) } else { ItemKind::Text };

    Classified {
        kind,
        preview_text: preview_text(text),
        preview_image: None,
    }
}

/// Classifies a file by extension and derives its thumbnail.
///
/// Image extensions yield `Image` with a downscaled PNG preview; if the
/// bytes don't decode, the generic badge stands in. Everything else is
/// `File` with a badge. An unreadable source fails with `ContentUnreadable`.
pub fn classify_file(path: &Path, cap: u32) -> Result<Classified, ClassifyError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    if is_supported_image(&file_name) {
        let bytes = std::fs::read(path).map_err(ClassifyError::ContentUnreadable)?;
        let preview = match image::load_from_memory(&bytes) {
            Ok(decoded) => downscale_to_png(decoded, cap)?,
            Err(_) => file_badge(&extension, cap)?,
        };
        return Ok(Classified {
            kind: ItemKind::Image,
            preview_text: String::new(),
            preview_image: Some(preview),
        });
    }

    // Non-image files only need to be readable; content stays opaque.
    std::fs::metadata(path).map_err(ClassifyError::ContentUnreadable)?;

    Ok(Classified {
        kind: ItemKind::File,
        preview_text: String::new(),
        preview_image: Some(file_badge(&extension, cap)?),
    })
}

/// Classifies in-memory image bytes (explicit hint path, e.g. a pasteboard
/// image read).
pub fn classify_image_bytes(bytes: &[u8], cap: u32) -> Result<Classified, ClassifyError> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(Classified {
        kind: ItemKind::Image,
        preview_text: String::new(),
        preview_image: Some(downscale_to_png(decoded, cap)?),
    })
}

/// Downscales so neither dimension exceeds `cap` (never upscales),
/// preserving aspect ratio, and encodes as PNG.
pub fn downscale_to_png(src_image: image::DynamicImage, cap: u32) -> Result<Vec<u8>, ClassifyError> {
    let (src_width, src_height) = (src_image.width(), src_image.height());

    let scale = (cap as f32 / src_width.max(src_height) as f32).min(1.0);
    let dst_width = ((src_width as f32 * scale) as u32).max(1);
    let dst_height = ((src_height as f32 * scale) as u32).max(1);

    let mut dst_image = image::DynamicImage::new(dst_width, dst_height, src_image.color());

    let mut resizer = fast_image_resize::Resizer::new();
    resizer.resize(
        &src_image,
        &mut dst_image,
        Some(&fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Convolution(fast_image_resize::FilterType::Lanczos3),
        )),
    )?;

    encode_png(&dst_image)
}

/// Generic file-type badge: stands in for the OS icon service, which is the
/// embedding app's concern. Deterministic per extension.
pub fn file_badge(extension: &str, cap: u32) -> Result<Vec<u8>, ClassifyError> {
    let accent = badge_accent(extension);
    let band_top = cap - cap / 4;

    let badge = image::RgbaImage::from_fn(cap, cap, |_, y| {
        if y >= band_top {
            accent
        } else {
            image::Rgba([235, 236, 240, 255])
        }
    });

    encode_png(&image::DynamicImage::ImageRgba8(badge))
}

fn badge_accent(extension: &str) -> image::Rgba<u8> {
    let sum: u32 = extension
        .bytes()
        .map(|b| u32::from(b.to_ascii_lowercase()))
        .sum();
    // Spread extensions over a few stable accent colors.
    const ACCENTS: &[[u8; 4]] = &[
        [86, 132, 227, 255],
        [92, 184, 122, 255],
        [227, 150, 62, 255],
        [196, 92, 204, 255],
        [210, 84, 84, 255],
        [108, 110, 122, 255],
    ];
    image::Rgba(ACCENTS[(sum as usize) % ACCENTS.len()])
}

fn encode_png(image: &image::DynamicImage) -> Result<Vec<u8>, ClassifyError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

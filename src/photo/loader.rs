/// Photo loader
///
/// Reads a picked image file and decodes it to RGBA8. The read is async,
/// the decode runs on the blocking pool because it is CPU-intensive. On
/// any failure the caller just drops the result; the app keeps showing
/// whatever it showed before.

use image::RgbaImage;
use std::path::PathBuf;
use tokio::task;

/// File extensions offered by the photo picker
pub const PHOTO_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "tiff", "webp"];

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Could not read photo: {0}")]
    Fetch(#[from] std::io::Error),
    #[error("Could not decode photo: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Decode task failed: {0}")]
    Task(#[from] task::JoinError),
}

/// Load a photo file and decode it to an RGBA bitmap
pub async fn load_photo(path: PathBuf) -> Result<RgbaImage, LoadError> {
    let bytes = tokio::fs::read(&path).await?;

    // Decoding a multi-megapixel photo takes long enough to stutter the UI
    let bitmap = task::spawn_blocking(move || -> Result<RgbaImage, LoadError> {
        let decoded = image::load_from_memory(&bytes)?;
        Ok(decoded.to_rgba8())
    })
    .await??;

    println!("🖼️  Loaded photo: {}x{}", bitmap.width(), bitmap.height());

    Ok(bitmap)
}

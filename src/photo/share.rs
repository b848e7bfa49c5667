/// Share the filtered photo
///
/// Desktop sharing here means a save dialog: the rendered output is
/// encoded as PNG to wherever the user points it. The suggested filename
/// comes from the active filter's label.

use image::RgbaImage;
use rfd::FileDialog;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ShareError {
    #[error("Could not save photo: {0}")]
    Encode(#[from] image::ImageError),
}

/// Ask the user where to save the photo and write it there
///
/// Returns `Ok(None)` when the dialog is cancelled.
pub fn share_image(image: &RgbaImage, label: &str) -> Result<Option<PathBuf>, ShareError> {
    let target = FileDialog::new()
        .set_title("Share filtered photo")
        .set_file_name(share_filename(label))
        .add_filter("PNG image", &["png"])
        .save_file();

    let Some(path) = target else {
        return Ok(None);
    };

    export_to(image, &path)?;
    Ok(Some(path))
}

/// Encode the image to the given path
pub fn export_to(image: &RgbaImage, path: &Path) -> Result<(), ShareError> {
    image.save(path)?;
    println!("📤 Shared photo: {}", path.display());
    Ok(())
}

/// Suggested filename for a filter label, e.g. "Sepia Tone" -> "sepia-tone.png"
fn share_filename(label: &str) -> String {
    let slug: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{}.png", slug)
}

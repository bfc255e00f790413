use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use crate::error::LogoError;

/// Fetches a logo and stores it as `<images dir>/<file_name>` in WebP.
pub trait LogoConverter {
    async fn convert(&self, url: &str, file_name: &str) -> Result<(), LogoError>;

    /// Remove a file `convert` wrote, once the record pointing at it is abandoned.
    fn discard(&self, file_name: &str) -> std::io::Result<()>;
}

pub struct HttpLogoConverter {
    client: reqwest::Client,
    images_dir: PathBuf,
}

impl HttpLogoConverter {
    pub fn new(client: reqwest::Client, images_dir: impl Into<PathBuf>) -> Self {
        HttpLogoConverter {
            client,
            images_dir: images_dir.into(),
        }
    }
}

impl LogoConverter for HttpLogoConverter {
    async fn convert(&self, url: &str, file_name: &str) -> Result<(), LogoError> {
        info!("Fetching logo {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LogoError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes of logo", bytes.len());
        write_webp(&bytes, &self.images_dir.join(file_name))
    }

    fn discard(&self, file_name: &str) -> std::io::Result<()> {
        let path = self.images_dir.join(file_name);
        fs::remove_file(&path)?;
        info!("Removed {}", path.display());
        Ok(())
    }
}

/// Decode any format the `image` crate understands and write it as WebP.
pub fn write_webp(bytes: &[u8], target: &Path) -> Result<(), LogoError> {
    let decoded = image::load_from_memory(bytes)?;
    // WebP encoding only takes 8-bit RGB(A)
    let rgba = DynamicImage::ImageRgba8(decoded.to_rgba8());

    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir)?;
    }
    let temp_path = target.with_extension("webp.tmp");
    if let Err(e) = rgba.save_with_format(&temp_path, ImageFormat::WebP) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, target) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    info!("Wrote {}", target.display());
    Ok(())
}

// ── Tests ──

//! Image textures with a needs-update flag, and the background image loader.

use image::RgbaImage;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

use crate::context::Context;

/// A GPU texture with its view and sampler.
pub struct GpuTexture {
    /// The underlying wgpu texture.
    pub texture: wgpu::Texture,
    /// The texture view for binding.
    pub view: wgpu::TextureView,
    /// The sampler for the texture.
    pub sampler: wgpu::Sampler,
    /// Texture dimensions (width, height).
    pub size: (u32, u32),
}

impl GpuTexture {
    /// Creates a new texture with the given RGBA data.
    pub fn new(
        width: u32,
        height: u32,
        data: &[u8],
        format: wgpu::TextureFormat,
        address_mode: wgpu::AddressMode,
    ) -> Arc<GpuTexture> {
        let ctxt = Context::get();

        let texture = ctxt.create_texture(&wgpu::TextureDescriptor {
            label: Some("texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctxt.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Arc::new(GpuTexture {
            texture,
            view,
            sampler,
            size: (width, height),
        })
    }

    /// Creates a default white 1x1 texture.
    pub fn new_default() -> Arc<GpuTexture> {
        let white_pixel: [u8; 4] = [255, 255, 255, 255];
        Self::new(
            1,
            1,
            &white_pixel,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::AddressMode::ClampToEdge,
        )
    }
}

/// A texture backed by a lazily-loaded image.
///
/// The texture starts empty; until pixels arrive the renderer substitutes a
/// default white texture. When a decoded image is handed over with
/// [`set_image`](ImageTexture::set_image), the needs-update flag is raised so
/// the next render re-uploads the pixels. The renderer clears the flag when
/// it consumes the image (see [`gpu_texture`](ImageTexture::gpu_texture)).
pub struct ImageTexture {
    image: Option<RgbaImage>,
    needs_update: bool,
    gpu: Option<Arc<GpuTexture>>,
}

impl Default for ImageTexture {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTexture {
    /// Creates an empty texture with a lowered needs-update flag.
    pub fn new() -> ImageTexture {
        ImageTexture {
            image: None,
            needs_update: false,
            gpu: None,
        }
    }

    /// Hands decoded pixels to the texture and raises the needs-update flag.
    ///
    /// Setting an image while the flag is already raised just replaces the
    /// pending pixels.
    pub fn set_image(&mut self, image: RgbaImage) {
        self.image = Some(image);
        self.needs_update = true;
    }

    /// Whether fresh pixels are waiting to be uploaded.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Lowers the needs-update flag without uploading.
    ///
    /// Renderers that consumed the pixels by other means (e.g. test stubs)
    /// use this to acknowledge the update.
    pub fn clear_needs_update(&mut self) {
        self.needs_update = false;
    }

    /// The decoded image, if one has been loaded.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Returns the GPU texture, uploading pending pixels first.
    ///
    /// Consumes the needs-update flag: if it was raised, the current image is
    /// uploaded and the flag lowered. Without an image this returns the
    /// default white texture. Requires an initialized [`Context`].
    pub fn gpu_texture(&mut self) -> Arc<GpuTexture> {
        if self.gpu.is_none() || self.needs_update {
            let texture = match &self.image {
                Some(image) => GpuTexture::new(
                    image.width(),
                    image.height(),
                    image.as_raw(),
                    wgpu::TextureFormat::Rgba8UnormSrgb,
                    wgpu::AddressMode::ClampToEdge,
                ),
                None => GpuTexture::new_default(),
            };
            self.gpu = Some(texture);
            self.needs_update = false;
        }

        self.gpu.as_ref().unwrap().clone()
    }
}

/// Loads and decodes an image on a background thread.
///
/// The result crosses back to the render thread through a channel, so all
/// scene mutation stays on one thread. The load fires at most once; there is
/// no retry and no cancellation.
pub struct TextureLoader {
    rx: Receiver<Result<RgbaImage, image::ImageError>>,
}

impl TextureLoader {
    /// Starts loading the image at `path` on a background thread.
    pub fn spawn(path: PathBuf) -> TextureLoader {
        let (tx, rx) = channel();

        thread::spawn(move || {
            let result = image::open(&path).map(|img| img.to_rgba8());
            // The receiver may be gone if the viewer shut down early.
            let _ = tx.send(result);
        });

        TextureLoader { rx }
    }

    /// Returns the load result if it has arrived.
    ///
    /// Yields `Some` at most once; afterwards (and before completion) it
    /// returns `None`.
    pub fn poll(&self) -> Option<Result<RgbaImage, image::ImageError>> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until_done(loader: &TextureLoader) -> Result<RgbaImage, image::ImageError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = loader.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_needs_update_transitions() {
        let mut texture = ImageTexture::new();
        assert!(!texture.needs_update());
        assert!(texture.image().is_none());

        texture.set_image(RgbaImage::new(2, 2));
        assert!(texture.needs_update());

        // Setting again while already raised is a no-op on the flag.
        texture.set_image(RgbaImage::new(2, 2));
        assert!(texture.needs_update());

        texture.clear_needs_update();
        assert!(!texture.needs_update());
        assert!(texture.image().is_some());
    }

    #[test]
    fn test_loader_reports_missing_file() {
        let loader = TextureLoader::spawn(PathBuf::from("definitely/not/here.png"));
        assert!(poll_until_done(&loader).is_err());
        // The result is delivered exactly once.
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_loader_decodes_saved_image() {
        let path = std::env::temp_dir().join("skysphere_loader_test.png");
        let mut img = RgbaImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let loader = TextureLoader::spawn(path.clone());
        let loaded = poll_until_done(&loader).unwrap();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [255, 0, 0, 255]);

        let _ = std::fs::remove_file(path);
    }
}

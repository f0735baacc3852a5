//! Image decoding and body textures.
//!
//! [`load_image`] is the only place image files are decoded. The
//! [`TextureRegistry`] hands out [`TextureHandle`]s; handle 0 is a 1×1 white
//! texture, so a body whose texture failed to load is drawn in its plain
//! vertex color.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::frame::TextureHandle;

/// Color format of every uploaded texture.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture is {width}x{height}, device limit is {max}x{max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// A decoded image expanded to RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Tightly packed RGBA8 rows, top row first.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file before expansion.
    pub channels: u8,
}

impl DecodedImage {
    /// A single-color RGBA image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let texels = width as usize * height as usize;
        Self {
            pixels: rgba.repeat(texels),
            width,
            height,
            channels: 4,
        }
    }
}

/// Decode an image file to RGBA8.
pub fn load_image(path: &Path) -> Result<DecodedImage, TextureError> {
    let decoded = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let channels = decoded.color().channel_count();
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    validate_dimensions(width, height)?;
    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
        channels,
    })
}

pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

/// Reject images the device cannot hold in a 2D or cube texture.
pub fn check_texture_limit(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

pub(crate) fn validate_data_size(image: &DecodedImage) -> Result<(), TextureError> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.pixels.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: image.pixels.len(),
            expected,
            width: image.width,
            height: image.height,
        });
    }
    Ok(())
}

/// A GPU texture with its view and ready-to-bind bind group.
pub struct ManagedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}

/// Body textures addressed by [`TextureHandle`].
pub struct TextureRegistry {
    fallback: ManagedTexture,
    textures: Vec<ManagedTexture>,
    by_path: FxHashMap<PathBuf, TextureHandle>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl TextureRegistry {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let fallback = upload(
            device,
            queue,
            &bind_group_layout,
            &sampler,
            "texture-fallback",
            &DecodedImage::solid(1, 1, [255; 4]),
        );

        Self {
            fallback,
            textures: Vec::new(),
            by_path: FxHashMap::default(),
            sampler,
            bind_group_layout,
        }
    }

    /// Upload an already decoded image.
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
    ) -> Result<TextureHandle, TextureError> {
        validate_dimensions(image.width, image.height)?;
        check_texture_limit(
            image.width,
            image.height,
            device.limits().max_texture_dimension_2d,
        )?;
        validate_data_size(image)?;

        self.textures.push(upload(
            device,
            queue,
            &self.bind_group_layout,
            &self.sampler,
            label,
            image,
        ));
        let handle = TextureHandle(self.textures.len() as u32);
        log::info!(
            "Created texture '{label}' ({}x{}) as {handle:?}",
            image.width,
            image.height
        );
        Ok(handle)
    }

    /// Load `path`, or log and return [`TextureHandle::NONE`] if it cannot be
    /// decoded. Each path is attempted once.
    pub fn load_or_fallback(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> TextureHandle {
        if let Some(&handle) = self.by_path.get(path) {
            return handle;
        }

        let label = path.display().to_string();
        let handle = match load_image(path)
            .and_then(|image| self.create_texture(device, queue, &label, &image))
        {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Texture unavailable, drawing untextured: {e}");
                TextureHandle::NONE
            }
        };
        self.by_path.insert(path.to_path_buf(), handle);
        handle
    }

    /// The texture for `handle`; unknown handles resolve to the fallback.
    pub fn get(&self, handle: TextureHandle) -> &ManagedTexture {
        (handle.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.textures.get(index))
            .unwrap_or(&self.fallback)
    }

    pub fn bind_group(&self, handle: TextureHandle) -> &wgpu::BindGroup {
        &self.get(handle).bind_group
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Textures loaded so far, not counting the fallback.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    image: &DecodedImage,
) -> ManagedTexture {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.width * 4),
            rows_per_image: None,
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bind-group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    ManagedTexture {
        texture,
        view,
        bind_group,
        dimensions: (image.width, image.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_load_rgba_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("earth.png");
        RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.channels, 4);
        assert_eq!(image.pixels.len(), 4 * 2 * 4);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_rgb_png_expands_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mars.png");
        RgbImage::from_pixel(3, 3, Rgb([200, 100, 50]))
            .save(&path)
            .unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.channels, 3);
        assert_eq!(image.pixels.len(), 3 * 3 * 4);
        assert_eq!(&image.pixels[4..8], &[200, 100, 50, 255]);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_image(Path::new("/nonexistent/sun.jpg")).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(
            load_image(&path),
            Err(TextureError::Decode { .. })
        ));
    }

    #[test]
    fn test_solid_image() {
        let image = DecodedImage::solid(2, 3, [1, 2, 3, 4]);
        assert_eq!(image.pixels.len(), 24);
        assert!(image.pixels.chunks(4).all(|px| px == [1, 2, 3, 4]));
        assert!(validate_data_size(&image).is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            validate_dimensions(0, 4),
            Err(TextureError::ZeroDimensions { .. })
        ));
        let mut image = DecodedImage::solid(2, 2, [0; 4]);
        image.pixels.pop();
        assert!(matches!(
            validate_data_size(&image),
            Err(TextureError::DataSizeMismatch {
                actual: 15,
                expected: 16,
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let max = wgpu::Limits::default().max_texture_dimension_2d;
        assert!(check_texture_limit(max, max, max).is_ok());
        assert!(matches!(
            check_texture_limit(max * 2, max, max),
            Err(TextureError::TooLarge { width, max: m, .. }) if width == max * 2 && m == max
        ));
        assert!(matches!(
            check_texture_limit(16, max + 1, max),
            Err(TextureError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_missing_texture_falls_back_to_none() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut registry = TextureRegistry::new(&device, &queue);
        let handle = registry.load_or_fallback(&device, &queue, Path::new("/nonexistent/moon.jpg"));
        assert_eq!(handle, TextureHandle::NONE);
        assert!(registry.is_empty());
        assert_eq!(registry.get(handle).dimensions, (1, 1));
    }

    #[test]
    fn test_same_path_is_cached() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sun.png");
        RgbaImage::from_pixel(8, 4, Rgba([255, 200, 0, 255]))
            .save(&path)
            .unwrap();

        let mut registry = TextureRegistry::new(&device, &queue);
        let a = registry.load_or_fallback(&device, &queue, &path);
        let b = registry.load_or_fallback(&device, &queue, &path);
        assert_eq!(a, b);
        assert_eq!(a, TextureHandle(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(a).dimensions, (8, 4));
    }

    #[test]
    fn test_unknown_handle_resolves_to_fallback() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let registry = TextureRegistry::new(&device, &queue);
        assert_eq!(registry.get(TextureHandle(42)).dimensions, (1, 1));
    }
}

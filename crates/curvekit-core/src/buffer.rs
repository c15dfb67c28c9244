//! Pixel buffer representation shared by every adjustment.

use std::slice::{ChunksExact, ChunksExactMut};

use ::image::{DynamicImage, Rgba32FImage};

use crate::error::CoreError;

/// Interleaved HxWxC image with values nominally in `[0, 1]`.
///
/// Channel layout follows the host tensors: 1 = gray, 2 = gray + alpha,
/// 3 = RGB, 4 = RGBA. The channel count is never zero, so buffers are only
/// built through the constructors:
///
/// ```compile_fail
/// let buf = curvekit_core::PixelBuffer { width: 1, height: 1, channels: 0, data: vec![] };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Values per pixel. Read it with [`PixelBuffer::channels`].
    pub(crate) channels: usize,
    /// Row-major, channel-interleaved samples. Length = width × height × channels.
    pub data: Vec<f32>,
}

impl PixelBuffer {
    /// Wrap existing samples, checking the length against the shape.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<f32>) -> Result<Self, CoreError> {
        if channels == 0 {
            return Err(CoreError::InvalidParameter("channel count must be at least 1"));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(CoreError::BufferLength {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Buffer with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: usize, value: f32) -> Self {
        let channels = channels.max(1);
        Self {
            width,
            height,
            channels,
            data: vec![value; width as usize * height as usize * channels],
        }
    }

    /// Build a buffer by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn(
        width: u32,
        height: u32,
        channels: usize,
        mut f: impl FnMut(u32, u32, usize) -> f32,
    ) -> Self {
        let channels = channels.max(1);
        let mut data = Vec::with_capacity(width as usize * height as usize * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Values per pixel, at least 1.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height, channels)`.
    pub fn shape(&self) -> (u32, u32, usize) {
        (self.width, self.height, self.channels)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Number of leading colour channels (1 for gray layouts, 3 otherwise).
    ///
    /// Anything past these is alpha or extra data and is carried through
    /// untouched by the colour adjustments.
    pub fn color_channels(&self) -> usize {
        if self.channels < 3 { 1 } else { 3 }
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 2 || self.channels >= 4
    }

    /// Sample at `(x, y, channel)`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32, channel: usize) -> f32 {
        self.data[(y as usize * self.width as usize + x as usize) * self.channels + channel]
    }

    /// Iterate pixels as channel slices.
    pub fn pixels(&self) -> ChunksExact<'_, f32> {
        self.data.chunks_exact(self.channels)
    }

    pub fn pixels_mut(&mut self) -> ChunksExactMut<'_, f32> {
        self.data.chunks_exact_mut(self.channels)
    }

    /// Convert from an RGBA f32 image (4 channels).
    pub fn from_rgba32f(image: &Rgba32FImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            channels: 4,
            data: image.as_raw().clone(),
        }
    }

    /// Convert any decoded image, keeping alpha only when the source has it.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            return Self::from_rgba32f(&image.to_rgba32f());
        }
        let rgb = image.to_rgb32f();
        Self {
            width: rgb.width(),
            height: rgb.height(),
            channels: 3,
            data: rgb.into_raw(),
        }
    }

    /// Expand to RGBA f32. Gray is replicated, missing alpha becomes 1.0.
    pub fn to_rgba32f(&self) -> Rgba32FImage {
        let mut raw = Vec::with_capacity(self.pixel_count() * 4);
        for px in self.pixels() {
            let rgba = match px.len() {
                1 => [px[0], px[0], px[0], 1.0],
                2 => [px[0], px[0], px[0], px[1]],
                3 => [px[0], px[1], px[2], 1.0],
                _ => [px[0], px[1], px[2], px[3]],
            };
            raw.extend_from_slice(&rgba);
        }
        Rgba32FImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| Rgba32FImage::new(self.width, self.height))
    }

    /// Clamp every colour sample to `[0, 1]`, leaving alpha alone.
    pub fn clamp_colors(&mut self) {
        let color = self.color_channels();
        for px in self.pixels_mut() {
            for v in &mut px[..color] {
                *v = v.clamp(0.0, 1.0);
            }
        }
    }
}

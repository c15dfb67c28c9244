//! Opacity masks and original/processed compositing.
//!
//! ```text
//!   mask ──resize──→ clamp ──invert?──→ blur? ──┐
//!                                               ▼
//!   original × (1 − m) + processed × m ──→ result
//! ```
//!
//! The mask is broadcast across every channel, alpha included.

use crate::blur::{blur_plane, gaussian_kernel, max_kernel_size};
use crate::buffer::PixelBuffer;
use crate::channel::{LUMA_REC601, luma};
use crate::error::CoreError;

/// Single-channel weight map; 0 keeps the original, 1 takes the processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Mask {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(CoreError::BufferLength {
                width,
                height,
                channels: 1,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Take the first channel of an `H×W×C` buffer (usually `C = 1`).
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            data: buffer.pixels().map(|px| px[0]).collect(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Bilinear resample with half-pixel centres (`align_corners = false`).
    ///
    /// Fails when the mask is empty but the target is not.
    pub fn resize_bilinear(&self, width: u32, height: u32) -> Result<Self, CoreError> {
        if (width, height) == self.dimensions() {
            return Ok(self.clone());
        }
        if width == 0 || height == 0 {
            return Ok(Self::filled(width, height, 0.0));
        }
        if self.is_empty() {
            return Err(CoreError::IncompatibleMask {
                mask: self.dimensions(),
                image: (width, height),
            });
        }

        let (sw, sh) = (self.width as usize, self.height as usize);
        let scale_x = sw as f32 / width as f32;
        let scale_y = sh as f32 / height as f32;
        let taps = |dst: u32, scale: f32, len: usize| {
            let src = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (src.floor() as usize).min(len - 1);
            let i1 = (i0 + 1).min(len - 1);
            (i0, i1, src - i0 as f32)
        };

        Ok(Self::from_fn(width, height, |x, y| {
            let (x0, x1, fx) = taps(x, scale_x, sw);
            let (y0, y1, fy) = taps(y, scale_y, sh);
            let at = |xi: usize, yi: usize| self.data[yi * sw + xi];
            let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
            let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
            top * (1.0 - fy) + bottom * fy
        }))
    }

    pub fn clamped(mut self) -> Self {
        for v in &mut self.data {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        self
    }

    pub fn inverted(mut self) -> Self {
        for v in &mut self.data {
            *v = 1.0 - *v;
        }
        self
    }

    /// Feather with a Gaussian of kernel `⌈radius⌉ × 4 + 1` and sigma `radius / 3`.
    pub fn feathered(self, radius: f32) -> Self {
        if !radius.is_finite() || radius <= 0.0 {
            return self;
        }
        let extent = self.width.max(self.height) as usize;
        let kernel = gaussian_kernel(feather_kernel_size(radius, extent), radius / 3.0);
        let data = blur_plane(&self.data, self.width as usize, self.height as usize, &kernel);
        Self { data, ..self }
    }

    /// Resize, clamp, invert and feather in that order.
    pub fn prepare(
        &self,
        width: u32,
        height: u32,
        blur_radius: f32,
        invert: bool,
    ) -> Result<Self, CoreError> {
        let mut mask = self.resize_bilinear(width, height)?.clamped();
        if invert {
            mask = mask.inverted();
        }
        Ok(mask.feathered(blur_radius))
    }
}

/// Kernel size for mask feathering, `⌈r⌉ × 4 + 1`, capped at
/// [`max_kernel_size`] of `extent`. Always odd.
pub fn feather_kernel_size(radius: f32, extent: usize) -> usize {
    (radius.ceil() as usize)
        .saturating_mul(4)
        .saturating_add(1)
        .min(max_kernel_size(extent))
}

/// Blend `original` and `processed` through `mask`.
///
/// The mask is resized to the image when needed. Mismatched image shapes
/// or an empty mask over a non-empty image are errors.
pub fn composite_with_mask(
    original: &PixelBuffer,
    processed: &PixelBuffer,
    mask: &Mask,
    blur_radius: f32,
    invert: bool,
) -> Result<PixelBuffer, CoreError> {
    if original.shape() != processed.shape() {
        return Err(CoreError::ShapeMismatch {
            original: original.shape(),
            processed: processed.shape(),
        });
    }
    let mask = mask.prepare(original.width, original.height, blur_radius, invert)?;

    let mut out = processed.clone();
    for ((dst, src), &m) in out
        .data
        .chunks_exact_mut(original.channels)
        .zip(original.pixels())
        .zip(mask.data())
    {
        for (p, &o) in dst.iter_mut().zip(src) {
            *p = o * (1.0 - m) + *p * m;
        }
    }
    Ok(out)
}

/// As [`composite_with_mask`], returning `processed` unchanged when there is
/// no mask.
pub fn composite_optional(
    original: &PixelBuffer,
    processed: PixelBuffer,
    mask: Option<&Mask>,
    blur_radius: f32,
    invert: bool,
) -> Result<PixelBuffer, CoreError> {
    match mask {
        Some(mask) => composite_with_mask(original, &processed, mask, blur_radius, invert),
        None => Ok(processed),
    }
}

/// 1 where the Rec. 601 luma lies in `[low, high]`, 0 elsewhere.
pub fn luminance_mask(image: &PixelBuffer, low: f32, high: f32) -> Mask {
    let color = image.color_channels();
    let data = image
        .pixels()
        .map(|px| {
            let y = if color == 3 { luma(px, LUMA_REC601) } else { px[0] };
            if (low..=high).contains(&y) { 1.0 } else { 0.0 }
        })
        .collect();
    Mask {
        width: image.width,
        height: image.height,
        data,
    }
}

//! Separable Gaussian blur over f32 planes.
//!
//! # Algorithm
//!
//! One horizontal and one vertical 1-D convolution with a normalised
//! Gaussian kernel. Out-of-range taps reflect about the edge sample
//! without repeating it (`dcb|abcd|cba`), so a constant plane stays exactly
//! constant and an all-zero plane stays exactly zero.
//!
//! Both passes run row-parallel on the rayon pool.
//!
//! # Complexity
//!
//! O(W × H × K) per plane for a kernel of K taps.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// Normalised 1-D Gaussian kernel of `size` taps.
///
/// Even sizes are bumped to the next odd size. When `sigma <= 0` it is
/// derived from the size as `0.3 × ((size − 1) / 2 − 1) + 0.8`.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = if size % 2 == 0 { size + 1 } else { size };
    let sigma = if sigma > 0.0 && sigma.is_finite() {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size / 2) as f32;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - center;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 {
        let inv = 1.0 / sum;
        for v in &mut kernel {
            *v *= inv;
        }
    }
    kernel
}

/// Reflect-101 border index (`gfedcb|abcdefgh|gfedcba`).
fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    let period = 2 * (n - 1);
    let i = i.rem_euclid(period);
    (if i >= n { period - i } else { i }) as usize
}

/// Blur a single `width × height` plane with `kernel` along both axes.
pub fn blur_plane(plane: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    if width == 0 || height == 0 || kernel.len() <= 1 {
        return plane.to_vec();
    }
    let radius = (kernel.len() / 2) as isize;

    // --- Horizontal pass ---
    let mut tmp = vec![0.0f32; width * height];
    tmp.par_chunks_mut(width).enumerate().for_each(|(y, row_out)| {
        let row_in = &plane[y * width..(y + 1) * width];
        for (x, out) in row_out.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| w * row_in[reflect101(x as isize + k as isize - radius, width)])
                .sum();
        }
    });

    // --- Vertical pass ---
    let mut out = vec![0.0f32; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row_out)| {
        for (x, v) in row_out.iter_mut().enumerate() {
            *v = kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| {
                    let sy = reflect101(y as isize + k as isize - radius, height);
                    w * tmp[sy * width + x]
                })
                .sum();
        }
    });
    out
}

/// Largest kernel worth building for a plane whose longer side is `extent`.
///
/// Taps past `2 × extent + 1` only revisit reflected samples.
pub fn max_kernel_size(extent: usize) -> usize {
    extent.saturating_mul(2).saturating_add(1)
}

/// Kernel size used by [`blur_image`]: `floor(radius × 6) + 1`, forced odd
/// and capped at [`max_kernel_size`] of `extent`.
pub fn kernel_size_for_radius(radius: f32, extent: usize) -> usize {
    // Float to int casts saturate
    let size = ((radius * 6.0).floor() as usize).saturating_add(1);
    let size = if size % 2 == 0 { size.saturating_add(1) } else { size };
    size.min(max_kernel_size(extent))
}

/// Gaussian blur of the colour channels of `image` with `sigma = radius`.
///
/// Alpha is copied unchanged. A non-positive radius returns a copy.
pub fn blur_image(image: &PixelBuffer, radius: f32) -> PixelBuffer {
    if !radius.is_finite() || radius <= 0.0 || image.is_empty() {
        return image.clone();
    }
    let (w, h) = (image.width as usize, image.height as usize);
    let kernel = gaussian_kernel(kernel_size_for_radius(radius, w.max(h)), radius);
    let stride = image.channels;

    let mut out = image.clone();
    for c in 0..image.color_channels() {
        let plane: Vec<f32> = image.data.iter().skip(c).step_by(stride).copied().collect();
        let blurred = blur_plane(&plane, w, h, &kernel);
        for (px, v) in out.data.chunks_exact_mut(stride).zip(blurred) {
            px[c] = v;
        }
    }
    out
}

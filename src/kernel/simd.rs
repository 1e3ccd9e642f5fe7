//! SIMD-accelerated kernel using the `wide` crate.
//!
//! The template row loop is vectorized to process 8 pixels at a time with
//! `f32x8`; each row's partial sum is folded into an `f64` accumulator.

use crate::image::ImageView;
use crate::kernel::Kernel;
use crate::template::TemplateLevel;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 u8 values and convert to f32x8.
#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// 8-lane correlation kernel.
pub struct NccSimd;

impl Kernel for NccSimd {
    fn dot(image: ImageView<'_, u8>, tpl: &TemplateLevel, x: usize, y: usize) -> f64 {
        let width = tpl.width();
        let zero_mean = tpl.zero_mean();
        let simd_end = width / LANES * LANES;
        let mut dot = 0.0f64;

        for ty in 0..tpl.height() {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            let window = &img_row[x..x + width];
            let tpl_row = &zero_mean[ty * width..(ty + 1) * width];

            let mut acc = f32x8::ZERO;
            let mut tx = 0;
            while tx < simd_end {
                acc += load_f32x8(&tpl_row[tx..]) * load_u8x8_as_f32x8(&window[tx..]);
                tx += LANES;
            }
            let mut row_dot: f64 = acc.to_array().iter().map(|&v| f64::from(v)).sum();
            for (&value, &t) in window[simd_end..].iter().zip(&tpl_row[simd_end..]) {
                row_dot += f64::from(t) * f64::from(value);
            }
            dot += row_dot;
        }
        dot
    }
}

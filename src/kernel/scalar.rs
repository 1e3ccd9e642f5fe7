//! Scalar reference kernel.

use crate::image::ImageView;
use crate::kernel::Kernel;
use crate::template::TemplateLevel;

/// Scalar correlation kernel with `f64` accumulation.
pub struct NccScalar;

impl Kernel for NccScalar {
    fn dot(image: ImageView<'_, u8>, tpl: &TemplateLevel, x: usize, y: usize) -> f64 {
        let width = tpl.width();
        let zero_mean = tpl.zero_mean();
        let mut dot = 0.0f64;
        for ty in 0..tpl.height() {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            let window = &img_row[x..x + width];
            let tpl_row = &zero_mean[ty * width..(ty + 1) * width];
            for (&value, &t) in window.iter().zip(tpl_row) {
                dot += f64::from(t) * f64::from(value);
            }
        }
        dot
    }
}

//! Normalized cross-correlation kernels.
//!
//! The window statistics of the background come from summation tables in
//! O(1); only the template dot product is computed directly, and that inner
//! loop is what the [`Kernel`] implementations provide.

use crate::image::ImageView;
use crate::integral::SummationTables;
use crate::template::TemplateLevel;
use crate::trace::{trace_debug, trace_warn};
use crate::util::math::clamp_correlation;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::NccScalar as DefaultKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::NccSimd as DefaultKernel;

/// Score reported for windows whose correlation is undefined.
pub const INVALID_SCORE: f64 = -1.0;

/// Window variances at or below this value are treated as flat.
const MIN_WINDOW_VARIANCE: f64 = 1e-8;

/// Inner-product kernel for correlation scoring.
pub trait Kernel {
    /// Returns `sum image(x + i, y + j) * zero_mean(i, j)` over the template
    /// window placed at `(x, y)`.
    ///
    /// The caller guarantees that the window lies inside `image`.
    fn dot(image: ImageView<'_, u8>, tpl: &TemplateLevel, x: usize, y: usize) -> f64;
}

/// Normalized cross-correlation of `tpl` against `image` at `(x, y)`.
///
/// `tables` must be the summation tables of `image`. The result lies in
/// `[-1, 1]`. Flat windows, non-finite denominators, windows outside the
/// image, and results drifting more than `1e-3` outside `[-1, 1]` all yield
/// [`INVALID_SCORE`].
pub fn score_at(
    image: ImageView<'_, u8>,
    tables: &SummationTables,
    tpl: &TemplateLevel,
    x: usize,
    y: usize,
) -> f64 {
    score_at_with::<DefaultKernel>(image, tables, tpl, x, y)
}

/// [`score_at`] with an explicit kernel.
pub fn score_at_with<K: Kernel>(
    image: ImageView<'_, u8>,
    tables: &SummationTables,
    tpl: &TemplateLevel,
    x: usize,
    y: usize,
) -> f64 {
    let width = tpl.width();
    let height = tpl.height();
    if x + width > image.width() || y + height > image.height() {
        return INVALID_SCORE;
    }
    debug_assert!(tpl.sum_sq() > 0.0, "template must not be flat");
    debug_assert_eq!(tables.width(), image.width());

    let (f1, f2) = tables.region_sums(x, y, width, height);
    let n = (width * height) as f64;
    let var_i = f2 - f1 * f1 / n;
    let denom = (var_i * tpl.sum_sq()).sqrt();
    if var_i <= MIN_WINDOW_VARIANCE || !denom.is_finite() || denom <= 0.0 {
        trace_debug!("invalid_denominator", x = x, y = y, var_i = var_i);
        return INVALID_SCORE;
    }

    let score = K::dot(image, tpl, x, y) / denom;
    match clamp_correlation(score) {
        Some(score) => score,
        None => {
            trace_warn!("correlation_out_of_range", x = x, y = y, score = score);
            INVALID_SCORE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{score_at, score_at_with, scalar::NccScalar, INVALID_SCORE};
    use crate::image::ImageView;
    use crate::integral::SummationTables;
    use crate::template::TemplateLevel;

    fn textured(width: usize, height: usize, seed: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| ((i * 73 + seed * 31 + (i / width) * (i % width) * 7) % 256) as u8)
            .collect()
    }

    fn brute_force(
        image: &[u8],
        img_width: usize,
        tpl: &[u8],
        w: usize,
        h: usize,
        x: usize,
        y: usize,
    ) -> f64 {
        let n = (w * h) as f64;
        let mean_t = tpl.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let mut mean_i = 0.0;
        for j in 0..h {
            for i in 0..w {
                mean_i += f64::from(image[(y + j) * img_width + x + i]);
            }
        }
        mean_i /= n;
        let (mut num, mut var_t, mut var_i) = (0.0, 0.0, 0.0);
        for j in 0..h {
            for i in 0..w {
                let a = f64::from(image[(y + j) * img_width + x + i]) - mean_i;
                let b = f64::from(tpl[j * w + i]) - mean_t;
                num += a * b;
                var_i += a * a;
                var_t += b * b;
            }
        }
        num / (var_i * var_t).sqrt()
    }

    #[test]
    fn score_matches_bruteforce_ncc() {
        let (iw, ih, tw, th) = (20, 15, 6, 4);
        let image = textured(iw, ih, 1);
        let tpl = textured(tw, th, 9);
        let view = ImageView::from_slice(&image, iw, ih).unwrap();
        let tables = SummationTables::build(view);
        let level = TemplateLevel::from_view(ImageView::from_slice(&tpl, tw, th).unwrap()).unwrap();

        for y in 0..=ih - th {
            for x in 0..=iw - tw {
                let expected = brute_force(&image, iw, &tpl, tw, th, x, y);
                let got = score_at_with::<NccScalar>(view, &tables, &level, x, y);
                assert!((got - expected).abs() < 1e-5, "({x}, {y}): {got} vs {expected}");
                assert!((-1.000001..=1.000001).contains(&got));
            }
        }
    }

    #[test]
    fn exact_copy_scores_one() {
        let (iw, ih) = (16, 16);
        let image = textured(iw, ih, 4);
        let view = ImageView::from_slice(&image, iw, ih).unwrap();
        let tables = SummationTables::build(view);
        let patch = view.roi(5, 7, 8, 6).unwrap();
        let level = TemplateLevel::from_view(patch).unwrap();
        let score = score_at(view, &tables, &level, 5, 7);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flat_window_returns_sentinel() {
        let mut image = vec![128u8; 12 * 12];
        image[0] = 3;
        let view = ImageView::from_slice(&image, 12, 12).unwrap();
        let tables = SummationTables::build(view);
        let tpl = textured(4, 4, 2);
        let level = TemplateLevel::from_view(ImageView::from_slice(&tpl, 4, 4).unwrap()).unwrap();
        assert_eq!(score_at(view, &tables, &level, 5, 5), INVALID_SCORE);
        assert_ne!(score_at(view, &tables, &level, 0, 0), INVALID_SCORE);
    }

    #[test]
    fn window_outside_image_returns_sentinel() {
        let image = textured(8, 8, 0);
        let view = ImageView::from_slice(&image, 8, 8).unwrap();
        let tables = SummationTables::build(view);
        let tpl = textured(4, 4, 5);
        let level = TemplateLevel::from_view(ImageView::from_slice(&tpl, 4, 4).unwrap()).unwrap();
        assert_eq!(score_at(view, &tables, &level, 5, 0), INVALID_SCORE);
    }
}

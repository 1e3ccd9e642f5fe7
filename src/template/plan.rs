//! Per-orientation template preparation for normalized cross-correlation.

use crate::image::pyramid::downsample_2x;
use crate::image::{ImageView, OwnedImage};
use crate::template::{GateTemplate, LayerKind, Orientation, TemplateId};
use crate::util::math::halvings_for_scale;
use crate::util::{GateMatchError, GateMatchResult};

/// Zero-mean template buffer at one resolution.
#[derive(Clone, Debug)]
pub struct TemplateLevel {
    width: usize,
    height: usize,
    mean: f64,
    zero_mean: Vec<f32>,
    sum_sq: f64,
}

impl TemplateLevel {
    /// Subtracts the mean from every pixel and accumulates
    /// `sum (pixel - mean)^2`.
    ///
    /// Returns `None` if the image has zero variance.
    pub fn from_view(tpl: ImageView<'_, u8>) -> Option<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = (width * height) as f64;

        let mut sum = 0.0f64;
        for y in 0..height {
            sum += tpl.row(y)?.iter().map(|&v| f64::from(v)).sum::<f64>();
        }
        let mean = sum / count;

        let mut zero_mean = Vec::with_capacity(width * height);
        let mut sum_sq = 0.0f64;
        for y in 0..height {
            for &value in tpl.row(y)? {
                let centered = f64::from(value) - mean;
                sum_sq += centered * centered;
                zero_mean.push(centered as f32);
            }
        }

        if sum_sq <= 1e-8 {
            return None;
        }
        Some(Self {
            width,
            height,
            mean,
            zero_mean,
            sum_sq,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mean pixel value before centering.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Zero-mean pixel buffer in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }

    /// Sum of squared zero-mean values; always > 0.
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }
}

/// A gate template prepared for one orientation and one downscale factor.
///
/// Built by [`prepare_template`]; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct PreparedTemplate {
    template_id: TemplateId,
    orientation: Orientation,
    scale: usize,
    full_image: OwnedImage,
    scaled_image: OwnedImage,
    full: TemplateLevel,
    scaled: TemplateLevel,
}

impl PreparedTemplate {
    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Downscale factor of the reduced-resolution copy.
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Full-resolution width.
    pub fn width(&self) -> usize {
        self.full.width
    }

    /// Full-resolution height.
    pub fn height(&self) -> usize {
        self.full.height
    }

    /// Oriented full-resolution image.
    pub fn full_image(&self) -> ImageView<'_, u8> {
        self.full_image.view()
    }

    /// Oriented reduced-resolution image.
    pub fn scaled_image(&self) -> ImageView<'_, u8> {
        self.scaled_image.view()
    }

    /// Zero-mean data for the full-resolution image.
    pub fn full(&self) -> &TemplateLevel {
        &self.full
    }

    /// Zero-mean data for the reduced-resolution image.
    pub fn scaled(&self) -> &TemplateLevel {
        &self.scaled
    }
}

/// Prepares `template`'s `layer` image for `orientation` at a power-of-two
/// `scale`.
///
/// The reduced copy is produced by repeated 2x box downscaling. Flat images
/// (zero variance at either resolution) are rejected as
/// [`GateMatchError::DegenerateTemplate`]; templates that vanish before
/// reaching `scale` as [`GateMatchError::TemplateTooSmall`].
pub fn prepare_template(
    template: &GateTemplate,
    layer: LayerKind,
    orientation: Orientation,
    scale: usize,
) -> GateMatchResult<PreparedTemplate> {
    if !scale.is_power_of_two() {
        return Err(GateMatchError::InvalidInput("scale must be a power of two"));
    }
    let source = template.require_image(layer)?;
    let full_image = orientation.apply(source);

    let mut scaled_image = full_image.clone();
    for _ in 0..halvings_for_scale(scale) {
        scaled_image =
            downsample_2x(scaled_image.view()).ok_or_else(|| GateMatchError::TemplateTooSmall {
                name: template.name().to_string(),
                width: template.width(),
                height: template.height(),
                scale,
            })?;
    }

    let degenerate = |reason| GateMatchError::DegenerateTemplate {
        name: template.name().to_string(),
        reason,
    };
    let full = TemplateLevel::from_view(full_image.view())
        .ok_or_else(|| degenerate("zero variance at full resolution"))?;
    let scaled = TemplateLevel::from_view(scaled_image.view())
        .ok_or_else(|| degenerate("zero variance at reduced resolution"))?;

    Ok(PreparedTemplate {
        template_id: template.id(),
        orientation,
        scale,
        full_image,
        scaled_image,
        full,
        scaled,
    })
}

#[cfg(test)]
mod tests {
    use super::{prepare_template, TemplateLevel};
    use crate::image::{ImageView, OwnedImage};
    use crate::template::{GateTemplate, LayerKind, Orientation, TemplateId};
    use crate::util::GateMatchError;

    fn gradient_template(width: usize, height: usize) -> GateTemplate {
        let data = (0..width * height).map(|i| (i * 5 % 251) as u8).collect();
        let img = OwnedImage::new(data, width, height).unwrap();
        GateTemplate::new(TemplateId(3), "xor", [(LayerKind::Logic, img)]).unwrap()
    }

    #[test]
    fn template_level_matches_known_stats() {
        let data = [0u8, 1, 2, 3];
        let level = TemplateLevel::from_view(ImageView::from_slice(&data, 2, 2).unwrap()).unwrap();
        assert!((level.mean() - 1.5).abs() < 1e-12);
        assert!((level.sum_sq() - 5.0).abs() < 1e-12);
        assert_eq!(level.zero_mean(), &[-1.5f32, -0.5, 0.5, 1.5]);
    }

    #[test]
    fn flat_level_is_rejected() {
        let data = [9u8; 6];
        assert!(TemplateLevel::from_view(ImageView::from_slice(&data, 3, 2).unwrap()).is_none());
    }

    #[test]
    fn prepared_scaled_copy_halves_per_octave() {
        let tpl = gradient_template(16, 12);
        let prepared = prepare_template(&tpl, LayerKind::Logic, Orientation::FlipBoth, 4).unwrap();
        assert_eq!((prepared.width(), prepared.height()), (16, 12));
        assert_eq!(prepared.scaled().width(), 4);
        assert_eq!(prepared.scaled().height(), 3);
        assert_eq!(
            prepared.full_image().get(0, 0),
            tpl.image(LayerKind::Logic).unwrap().get(15, 11)
        );
        assert!(prepared.full().sum_sq() > 0.0);
        assert!(prepared.scaled().sum_sq() > 0.0);
    }

    #[test]
    fn checkerboard_degenerates_when_downscaled() {
        let data = (0..16).map(|i| if (i % 4 + i / 4) % 2 == 0 { 0 } else { 200 }).collect();
        let img = OwnedImage::new(data, 4, 4).unwrap();
        let tpl = GateTemplate::new(TemplateId(0), "checker", [(LayerKind::Metal, img)]).unwrap();

        assert!(prepare_template(&tpl, LayerKind::Metal, Orientation::Normal, 1).is_ok());
        let err = prepare_template(&tpl, LayerKind::Metal, Orientation::Normal, 2)
            .err()
            .unwrap();
        assert_eq!(
            err,
            GateMatchError::DegenerateTemplate {
                name: "checker".to_string(),
                reason: "zero variance at reduced resolution",
            }
        );
    }

    #[test]
    fn template_too_small_for_scale() {
        let tpl = gradient_template(3, 3);
        let err = prepare_template(&tpl, LayerKind::Logic, Orientation::Normal, 4)
            .err()
            .unwrap();
        assert!(matches!(err, GateMatchError::TemplateTooSmall { scale: 4, .. }));
    }
}

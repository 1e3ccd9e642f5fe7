//! Background preparation: grayscale crops of the search area at full and
//! reduced resolution, each with its summation tables.

use crate::geometry::BoundingBox;
use crate::image::{GrayPixel, ImageSource, ImageView, OwnedImage};
use crate::integral::SummationTables;
use crate::kernel::score_at;
use crate::template::TemplateLevel;
use crate::trace::{trace_event, trace_span};
use crate::util::{GateMatchError, GateMatchResult};

/// A grayscale crop together with its summation tables.
#[derive(Clone, Debug)]
pub struct BackgroundLevel {
    image: OwnedImage,
    tables: SummationTables,
}

impl BackgroundLevel {
    /// Builds the summation tables for `image`.
    pub fn new(image: OwnedImage) -> Self {
        let tables = SummationTables::build(image.view());
        Self { image, tables }
    }

    pub fn view(&self) -> ImageView<'_, u8> {
        self.image.view()
    }

    pub fn tables(&self) -> &SummationTables {
        &self.tables
    }

    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    /// Correlation of `tpl` placed at `(x, y)` in this crop.
    pub fn score(&self, tpl: &TemplateLevel, x: usize, y: usize) -> f64 {
        score_at(self.image.view(), &self.tables, tpl, x, y)
    }
}

/// Search-area crops at full and reduced resolution.
///
/// Positions handed around by the search are full-resolution offsets
/// relative to the top-left corner of [`Background::area`].
#[derive(Clone, Debug)]
pub struct Background {
    area: BoundingBox,
    scale: usize,
    scaled_origin: (usize, usize),
    full: BackgroundLevel,
    scaled: BackgroundLevel,
}

impl Background {
    /// The search area after clipping to the image.
    pub fn area(&self) -> BoundingBox {
        self.area
    }

    /// Actual downscale factor of the reduced crop (1 if none was available).
    pub fn scale(&self) -> usize {
        self.scale
    }

    pub fn full(&self) -> &BackgroundLevel {
        &self.full
    }

    pub fn scaled(&self) -> &BackgroundLevel {
        &self.scaled
    }

    /// Maps a full-resolution offset into the reduced crop.
    pub fn scaled_position(&self, x: usize, y: usize) -> (usize, usize) {
        if self.scale == 1 {
            return (x, y);
        }
        let sx = (self.area.min_x() + x) / self.scale - self.scaled_origin.0;
        let sy = (self.area.min_y() + y) / self.scale - self.scaled_origin.1;
        (sx, sy)
    }
}

/// Crops `area` from `source` at full resolution and at the pyramid level
/// chosen for `scale_down`, converts both to grayscale, and builds their
/// summation tables.
///
/// The area is clipped to the image; an area outside the image is
/// [`GateMatchError::InvalidSearchArea`]. If the source has no level for
/// `scale_down`, the reduced crop is the full-resolution crop.
pub fn prepare_background<S: ImageSource>(
    source: &S,
    area: BoundingBox,
    scale_down: usize,
) -> GateMatchResult<Background> {
    let _span = trace_span!("prepare_background", scale_down = scale_down).entered();

    let (_, base) = source.image_for_scale(1);
    let image_box = BoundingBox::from_origin_size(0, 0, base.width(), base.height())?;
    let area = area
        .intersection(&image_box)
        .ok_or(GateMatchError::InvalidSearchArea {
            img_width: base.width(),
            img_height: base.height(),
        })?;

    let full_crop = base
        .roi(area.min_x(), area.min_y(), area.width(), area.height())?
        .to_gray()?;
    let full = BackgroundLevel::new(full_crop);

    let (scale, level) = source.image_for_scale(scale_down);
    let scaled_crop = if scale > 1 {
        crop_scaled(level, area, scale)?
    } else {
        None
    };

    let background = match scaled_crop {
        Some((origin, crop)) => Background {
            area,
            scale,
            scaled_origin: origin,
            full,
            scaled: BackgroundLevel::new(crop),
        },
        None => Background {
            area,
            scale: 1,
            scaled_origin: (area.min_x(), area.min_y()),
            scaled: full.clone(),
            full,
        },
    };

    trace_event!(
        "background_ready",
        width = background.full.width(),
        height = background.full.height(),
        scale = background.scale,
    );
    Ok(background)
}

/// Crops the reduced-resolution counterpart of `area` from a level image.
///
/// Returns `None` when the area collapses to nothing at this scale.
fn crop_scaled<P: GrayPixel>(
    level: ImageView<'_, P>,
    area: BoundingBox,
    scale: usize,
) -> GateMatchResult<Option<((usize, usize), OwnedImage)>> {
    let x0 = area.min_x() / scale;
    let y0 = area.min_y() / scale;
    let x1 = ((area.max_x() + 1) / scale).min(level.width());
    let y1 = ((area.max_y() + 1) / scale).min(level.height());
    if x1 <= x0 || y1 <= y0 {
        return Ok(None);
    }
    let crop = level.roi(x0, y0, x1 - x0, y1 - y0)?.to_gray()?;
    Ok(Some(((x0, y0), crop)))
}

#[cfg(test)]
mod tests {
    use super::prepare_background;
    use crate::geometry::BoundingBox;
    use crate::image::{ImagePyramid, ImageSource, ImageView};
    use crate::util::GateMatchError;

    fn pyramid(width: usize, height: usize, levels: usize) -> ImagePyramid {
        let data: Vec<u8> = (0..width * height).map(|i| (i % 251) as u8).collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        ImagePyramid::build_u8(view, levels).unwrap()
    }

    struct RgbaSource {
        data: Vec<[u8; 4]>,
    }

    impl ImageSource for RgbaSource {
        type Pixel = [u8; 4];

        fn image_for_scale(&self, _scale: usize) -> (usize, ImageView<'_, [u8; 4]>) {
            (1, ImageView::from_slice(&self.data, 4, 2).unwrap())
        }
    }

    #[test]
    fn crops_and_clips_search_area() {
        let source = pyramid(64, 48, 3);
        let area = BoundingBox::new(40, 100, 8, 23).unwrap();
        let bg = prepare_background(&source, area, 4).unwrap();

        assert_eq!(bg.area(), BoundingBox::new(40, 63, 8, 23).unwrap());
        assert_eq!(bg.scale(), 4);
        assert_eq!((bg.full().width(), bg.full().height()), (24, 16));
        assert_eq!((bg.scaled().width(), bg.scaled().height()), (6, 4));
        assert_eq!(bg.full().view().get(0, 0).copied(), Some(((8 * 64 + 40) % 251) as u8));
        assert_eq!(bg.scaled_position(5, 9), (1, 2));
    }

    #[test]
    fn missing_level_degenerates_to_unscaled() {
        let source = pyramid(32, 32, 1);
        let area = BoundingBox::new(0, 15, 0, 15).unwrap();
        let bg = prepare_background(&source, area, 2).unwrap();
        assert_eq!(bg.scale(), 1);
        assert_eq!(bg.scaled().width(), 16);
        assert_eq!(bg.scaled_position(7, 3), (7, 3));
    }

    #[test]
    fn area_outside_image_is_rejected() {
        let source = pyramid(16, 16, 1);
        let area = BoundingBox::new(20, 30, 0, 5).unwrap();
        let err = prepare_background(&source, area, 1).err().unwrap();
        assert_eq!(
            err,
            GateMatchError::InvalidSearchArea {
                img_width: 16,
                img_height: 16,
            }
        );
    }

    #[test]
    fn color_sources_are_converted_to_gray() {
        let source = RgbaSource {
            data: vec![[200, 200, 200, 255]; 8],
        };
        let area = BoundingBox::new(0, 3, 0, 1).unwrap();
        let bg = prepare_background(&source, area, 1).unwrap();
        assert_eq!(bg.full().view().get(3, 1).copied(), Some(200));
        assert_eq!(bg.full().tables().single(3, 1), 1600.0);
    }
}

//! Gate templates, orientation transforms, and per-orientation preparation.

use crate::image::{ImageView, OwnedImage};
use crate::util::{GateMatchError, GateMatchResult};
use std::collections::BTreeMap;

mod orient;
mod plan;

pub use orient::Orientation;
pub use plan::{prepare_template, PreparedTemplate, TemplateLevel};

/// Die layer a template image (or a background pyramid) was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    Transistor,
    Logic,
    Metal,
}

impl LayerKind {
    /// Lower-case layer name used in errors and reports.
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Transistor => "transistor",
            LayerKind::Logic => "logic",
            LayerKind::Metal => "metal",
        }
    }
}

/// Stable identifier of a gate template within a gate library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(pub u32);

/// A known logic-gate cell: one grayscale image per die layer.
///
/// All layer images share the template footprint. Templates are read-only
/// inputs to matching.
#[derive(Clone, Debug)]
pub struct GateTemplate {
    id: TemplateId,
    name: String,
    fill_color: [u8; 4],
    frame_color: [u8; 4],
    width: usize,
    height: usize,
    images: BTreeMap<LayerKind, OwnedImage>,
}

impl GateTemplate {
    /// Creates a template from per-layer images of identical size.
    pub fn new(
        id: TemplateId,
        name: impl Into<String>,
        images: impl IntoIterator<Item = (LayerKind, OwnedImage)>,
    ) -> GateMatchResult<Self> {
        let images: BTreeMap<_, _> = images.into_iter().collect();
        let (width, height) = match images.values().next() {
            Some(img) => (img.width(), img.height()),
            None => return Err(GateMatchError::InvalidInput("template has no layer images")),
        };
        if images
            .values()
            .any(|img| img.width() != width || img.height() != height)
        {
            return Err(GateMatchError::InvalidInput(
                "template layer images differ in size",
            ));
        }
        Ok(Self {
            id,
            name: name.into(),
            fill_color: [0, 0, 0, 0],
            frame_color: [0, 0, 0, 0],
            width,
            height,
            images,
        })
    }

    /// Sets the RGBA fill and frame colors used by host renderers.
    pub fn with_colors(mut self, fill: [u8; 4], frame: [u8; 4]) -> Self {
        self.fill_color = fill;
        self.frame_color = frame;
        self
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fill_color(&self) -> [u8; 4] {
        self.fill_color
    }

    pub fn frame_color(&self) -> [u8; 4] {
        self.frame_color
    }

    /// Footprint width in full-resolution pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Footprint height in full-resolution pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Footprint area used to order templates before matching.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns the image for a layer, if the template carries one.
    pub fn image(&self, layer: LayerKind) -> Option<ImageView<'_, u8>> {
        self.images.get(&layer).map(OwnedImage::view)
    }

    pub(crate) fn require_image(&self, layer: LayerKind) -> GateMatchResult<ImageView<'_, u8>> {
        self.image(layer).ok_or_else(|| GateMatchError::MissingLayerImage {
            name: self.name.clone(),
            layer: layer.name(),
        })
    }
}

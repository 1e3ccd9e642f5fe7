//! The four flip states a gate may be placed in.

use crate::image::{ImageView, OwnedImage};

/// Geometric orientation of a gate cell on the die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    /// As drawn in the template.
    Normal,
    /// Mirrored top to bottom.
    FlipUpDown,
    /// Mirrored left to right.
    FlipLeftRight,
    /// Mirrored on both axes.
    FlipBoth,
}

impl Orientation {
    /// All orientations in the order they are tried by default.
    pub const ALL: [Orientation; 4] = [
        Orientation::Normal,
        Orientation::FlipUpDown,
        Orientation::FlipLeftRight,
        Orientation::FlipBoth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Normal => "normal",
            Orientation::FlipUpDown => "flip-up-down",
            Orientation::FlipLeftRight => "flip-left-right",
            Orientation::FlipBoth => "flip-both",
        }
    }

    fn flips(self) -> (bool, bool) {
        match self {
            Orientation::Normal => (false, false),
            Orientation::FlipUpDown => (false, true),
            Orientation::FlipLeftRight => (true, false),
            Orientation::FlipBoth => (true, true),
        }
    }

    /// Returns an oriented copy of `src`; dimensions are unchanged.
    pub fn apply(self, src: ImageView<'_, u8>) -> OwnedImage {
        let (flip_x, flip_y) = self.flips();
        let width = src.width();
        let height = src.height();
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            let sy = if flip_y { height - 1 - y } else { y };
            let row = src.row(sy).expect("row in bounds");
            if flip_x {
                out.extend(row.iter().rev());
            } else {
                out.extend_from_slice(row);
            }
        }
        OwnedImage::new(out, width, height).expect("oriented output is contiguous")
    }
}

#[cfg(test)]
mod tests {
    use super::Orientation;
    use crate::image::ImageView;

    #[test]
    fn flips_mirror_expected_axes() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let view = ImageView::from_slice(&data, 3, 2).unwrap();
        assert_eq!(Orientation::Normal.apply(view).data(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(Orientation::FlipUpDown.apply(view).data(), &[4, 5, 6, 1, 2, 3]);
        assert_eq!(Orientation::FlipLeftRight.apply(view).data(), &[3, 2, 1, 6, 5, 4]);
        assert_eq!(Orientation::FlipBoth.apply(view).data(), &[6, 5, 4, 3, 2, 1]);
    }
}

//! Summation tables (integral images) for O(1) window statistics.
//!
//! `single(x, y)` holds the sum of all pixels in `[0, x] x [0, y]` and
//! `squared(x, y)` the sum of their squares, built with the recurrence
//! `S(x, y) = f(x, y) + S(x-1, y) + S(x, y-1) - S(x-1, y-1)`. Tables are kept
//! in `f64` so sums over large crops stay exact.

use crate::image::ImageView;

/// Integral images of pixel values and squared pixel values.
#[derive(Clone, Debug)]
pub struct SummationTables {
    width: usize,
    height: usize,
    single: Vec<f64>,
    squared: Vec<f64>,
}

impl SummationTables {
    /// Builds both tables for a grayscale image.
    pub fn build(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let mut single = vec![0.0f64; width * height];
        let mut squared = vec![0.0f64; width * height];

        for y in 0..height {
            let row = image.row(y).expect("row within bounds for table build");
            let mut row_sum = 0.0f64;
            let mut row_sum_sq = 0.0f64;
            for (x, &value) in row.iter().enumerate() {
                let v = f64::from(value);
                row_sum += v;
                row_sum_sq += v * v;
                let idx = y * width + x;
                // Row prefix + S(x, y-1) == the four-term recurrence.
                if y == 0 {
                    single[idx] = row_sum;
                    squared[idx] = row_sum_sq;
                } else {
                    single[idx] = row_sum + single[idx - width];
                    squared[idx] = row_sum_sq + squared[idx - width];
                }
            }
        }

        Self {
            width,
            height,
            single,
            squared,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cumulative sum over `[0, x] x [0, y]`.
    pub fn single(&self, x: usize, y: usize) -> f64 {
        self.single[y * self.width + x]
    }

    /// Cumulative sum of squares over `[0, x] x [0, y]`.
    pub fn squared(&self, x: usize, y: usize) -> f64 {
        self.squared[y * self.width + x]
    }

    /// Returns `(sum, sum_of_squares)` over the `width x height` window at
    /// `(x, y)`.
    ///
    /// The window must lie inside the table; edge terms for `x == 0` or
    /// `y == 0` are treated as zero.
    pub fn region_sums(&self, x: usize, y: usize, width: usize, height: usize) -> (f64, f64) {
        debug_assert!(width > 0 && height > 0);
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let x1 = x + width - 1;
        let y1 = y + height - 1;
        let corners = |table: &[f64]| {
            let at = |cx: usize, cy: usize| table[cy * self.width + cx];
            let mut sum = at(x1, y1);
            if x > 0 {
                sum -= at(x - 1, y1);
            }
            if y > 0 {
                sum -= at(x1, y - 1);
            }
            if x > 0 && y > 0 {
                sum += at(x - 1, y - 1);
            }
            sum
        };
        (corners(&self.single), corners(&self.squared))
    }
}

#[cfg(test)]
mod tests {
    use super::SummationTables;
    use crate::image::ImageView;

    fn pattern(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| ((i * 37 + (i / width) * 11) & 0xFF) as u8)
            .collect()
    }

    #[test]
    fn region_sums_match_bruteforce_for_all_windows() {
        let (width, height) = (7, 5);
        let data = pattern(width, height);
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let tables = SummationTables::build(view);

        for y in 0..height {
            for x in 0..width {
                for h in 1..=height - y {
                    for w in 1..=width - x {
                        let mut sum = 0.0f64;
                        let mut sum_sq = 0.0f64;
                        for yy in y..y + h {
                            for xx in x..x + w {
                                let v = f64::from(data[yy * width + xx]);
                                sum += v;
                                sum_sq += v * v;
                            }
                        }
                        assert_eq!(tables.region_sums(x, y, w, h), (sum, sum_sq));
                    }
                }
            }
        }
    }

    #[test]
    fn cumulative_entries_follow_recurrence() {
        let data = [1u8, 2, 3, 4];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let tables = SummationTables::build(view);
        assert_eq!(tables.single(0, 0), 1.0);
        assert_eq!(tables.single(1, 0), 3.0);
        assert_eq!(tables.single(0, 1), 4.0);
        assert_eq!(tables.single(1, 1), 10.0);
        assert_eq!(tables.squared(1, 1), 30.0);
    }

    #[test]
    fn strided_roi_fills_every_row() {
        let data = pattern(9, 6);
        let full = ImageView::from_slice(&data, 9, 6).unwrap();
        let roi = full.roi(2, 1, 4, 4).unwrap();
        let tables = SummationTables::build(roi);

        let px = |x: usize, y: usize| f64::from(data[y * 9 + x]);
        let expected: f64 = (1..5).flat_map(|y| (2..6).map(move |x| px(x, y))).sum();
        assert_eq!(tables.single(3, 3), expected);
        let last_row: f64 = (2..6).map(|x| px(x, 4)).sum();
        assert_eq!(tables.region_sums(0, 3, 4, 1).0, last_row);
    }
}

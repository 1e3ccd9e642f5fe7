//! Full-resolution hill climbing from a coarse hit.

use crate::background::BackgroundLevel;
use crate::kernel::INVALID_SCORE;
use crate::template::TemplateLevel;
use std::collections::HashMap;

/// Local maximum reached by [`hill_climb`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climb {
    pub x: usize,
    pub y: usize,
    pub score: f64,
}

/// Steepest-ascent search around `(seed_x, seed_y)` at full resolution.
///
/// Each round scores every placement within Chebyshev distance `radius` of
/// the current best (clipped to valid placements) and moves to the best one
/// if it strictly improves; ties keep the first in raster order. The seed is
/// scored as well, so the result is never worse than the seed.
pub fn hill_climb(
    level: &BackgroundLevel,
    tpl: &TemplateLevel,
    seed_x: usize,
    seed_y: usize,
    radius: usize,
) -> Climb {
    if level.width() < tpl.width() || level.height() < tpl.height() {
        return Climb {
            x: seed_x,
            y: seed_y,
            score: INVALID_SCORE,
        };
    }
    let max_x = level.width() - tpl.width();
    let max_y = level.height() - tpl.height();

    let mut cache: HashMap<(usize, usize), f64> = HashMap::new();
    let mut score = |x: usize, y: usize| -> f64 {
        *cache
            .entry((x, y))
            .or_insert_with(|| level.score(tpl, x, y))
    };

    let (sx, sy) = (seed_x.min(max_x), seed_y.min(max_y));
    let mut best = Climb {
        x: sx,
        y: sy,
        score: score(sx, sy),
    };

    loop {
        let mut next: Option<Climb> = None;
        let y0 = best.y.saturating_sub(radius);
        let y1 = best.y.saturating_add(radius).min(max_y);
        let x0 = best.x.saturating_sub(radius);
        let x1 = best.x.saturating_add(radius).min(max_x);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if (x, y) == (best.x, best.y) {
                    continue;
                }
                let s = score(x, y);
                let bar = next.map_or(best.score, |n| n.score);
                if s > bar {
                    next = Some(Climb { x, y, score: s });
                }
            }
        }
        match next {
            Some(n) => best = n,
            None => return best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::hill_climb;
    use crate::background::BackgroundLevel;
    use crate::image::{ImageView, OwnedImage};
    use crate::template::TemplateLevel;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(width: usize, height: usize, seed: u64) -> OwnedImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..width * height).map(|_| rng.random::<u8>()).collect();
        OwnedImage::new(data, width, height).unwrap()
    }

    fn cut(img: &OwnedImage, x: usize, y: usize, w: usize, h: usize) -> TemplateLevel {
        let roi = img.view().roi(x, y, w, h).unwrap();
        TemplateLevel::from_view(roi).unwrap()
    }

    #[test]
    fn climbs_to_embedded_template() {
        let img = noise(48, 40, 7);
        let tpl = cut(&img, 20, 15, 9, 7);
        let level = BackgroundLevel::new(img);

        let climb = hill_climb(&level, &tpl, 18, 13, 3);
        assert_eq!((climb.x, climb.y), (20, 15));
        assert!((climb.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn never_worse_than_seed() {
        let img = noise(40, 40, 11);
        let tpl = TemplateLevel::from_view(noise(8, 8, 12).view()).unwrap();
        let level = BackgroundLevel::new(img);

        for &(x, y) in &[(0, 0), (5, 17), (32, 32), (16, 3)] {
            let seed = level.score(&tpl, x, y);
            let climb = hill_climb(&level, &tpl, x, y, 2);
            assert!(climb.score >= seed, "seed ({x},{y}) {seed} > {}", climb.score);
            assert!(climb.x <= 32 && climb.y <= 32);
        }
    }

    #[test]
    fn template_larger_than_level_is_invalid() {
        let data = vec![0u8; 16];
        let img = OwnedImage::from_view(ImageView::from_slice(&data, 4, 4).unwrap()).unwrap();
        let level = BackgroundLevel::new(img);
        let tpl = TemplateLevel::from_view(noise(5, 5, 1).view()).unwrap();
        assert_eq!(hill_climb(&level, &tpl, 0, 0, 1).score, -1.0);
    }

    #[test]
    fn huge_radius_is_clipped_to_the_level() {
        let img = noise(24, 20, 5);
        let tpl = cut(&img, 9, 6, 6, 5);
        let level = BackgroundLevel::new(img);

        let climb = hill_climb(&level, &tpl, 3, 2, usize::MAX);
        assert_eq!((climb.x, climb.y), (9, 6));
        assert!((climb.score - 1.0).abs() < 1e-9);
    }
}

use crate::error::{Error, Result};
use image::{Rgba, RgbaImage};
use ndarray::ArrayView2;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Class-id to RGBA lookup sized from the model's class count
///
/// Each class gets a fully opaque color with its hue spread evenly around the
/// color wheel. Ids outside `[0, num_classes)` render transparent.
#[derive(Clone, Debug)]
pub struct SemanticPalette {
    colors: Vec<[u8; 4]>,
}

impl SemanticPalette {
    pub fn new(num_classes: usize) -> Self {
        let colors = (0..num_classes)
            .map(|id| {
                let hue = id as f32 * 360.0 / num_classes as f32;
                let [r, g, b] = hsv_to_rgb(hue, 0.85, 1.0);
                [r, g, b, 255]
            })
            .collect();
        Self { colors }
    }

    pub fn num_classes(&self) -> usize {
        self.colors.len()
    }

    pub fn color(&self, class_id: i32) -> Rgba<u8> {
        let color = usize::try_from(class_id)
            .ok()
            .and_then(|id| self.colors.get(id))
            .copied()
            .unwrap_or(TRANSPARENT);
        Rgba(color)
    }

    /// Render a `[height, width]` class map
    pub fn map_to_image(&self, class_map: ArrayView2<'_, i32>) -> Result<RgbaImage> {
        let (rows, cols) = class_map.dim();
        let width = u32::try_from(cols).unwrap_or(u32::MAX);
        let height = u32::try_from(rows).unwrap_or(u32::MAX);
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        Ok(RgbaImage::from_fn(width, height, |x, y| {
            self.color(class_map[[y as usize, x as usize]])
        }))
    }
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let c = value * saturation;
    let h = (hue % 360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn palette_has_one_color_per_class() {
        let palette = SemanticPalette::new(8);
        assert_eq!(palette.num_classes(), 8);
        let first = palette.color(0);
        assert_eq!(first.0, [255, 38, 38, 255]);
        for id in 1..8 {
            assert_ne!(palette.color(id), first);
            assert_eq!(palette.color(id).0[3], 255);
        }
    }

    #[test]
    fn unknown_ids_are_transparent() {
        let palette = SemanticPalette::new(3);
        assert_eq!(palette.color(-1).0, TRANSPARENT);
        assert_eq!(palette.color(3).0, TRANSPARENT);
        assert_eq!(SemanticPalette::new(0).color(0).0, TRANSPARENT);
    }

    #[test]
    fn map_is_rendered_row_major() {
        let palette = SemanticPalette::new(4);
        let map = arr2(&[[0, 1, 2], [3, 9, 0]]);
        let img = palette.map_to_image(map.view()).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(*img.get_pixel(2, 0), palette.color(2));
        assert_eq!(*img.get_pixel(0, 1), palette.color(3));
        assert_eq!(img.get_pixel(1, 1).0, TRANSPARENT);
    }

    #[test]
    fn empty_map_is_rejected() {
        let palette = SemanticPalette::new(2);
        let map = Array2::<i32>::zeros((2, 0));
        assert!(matches!(
            palette.map_to_image(map.view()),
            Err(Error::InvalidDimensions { .. })
        ));
    }
}

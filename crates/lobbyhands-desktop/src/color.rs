//! Color search over captured images.

use lobbyhands_protocols::Rgb;
use screenshots::image::RgbaImage;

/// Centroid of the pixels matching a color, relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMatch {
    pub x: u32,
    pub y: u32,
    pub pixels: usize,
}

fn pixel_rgb(p: &screenshots::image::Rgba<u8>) -> Rgb {
    Rgb::new(p.0[0], p.0[1], p.0[2])
}

/// Find every pixel within `tolerance` of `target` and return their centroid.
pub fn locate_color(image: &RgbaImage, target: Rgb, tolerance: u8) -> Option<ColorMatch> {
    let (mut sum_x, mut sum_y, mut pixels) = (0u64, 0u64, 0usize);
    for (x, y, p) in image.enumerate_pixels() {
        if target.matches(pixel_rgb(p), tolerance) {
            sum_x += u64::from(x);
            sum_y += u64::from(y);
            pixels += 1;
        }
    }
    if pixels == 0 {
        return None;
    }
    Some(ColorMatch {
        x: (sum_x / pixels as u64) as u32,
        y: (sum_y / pixels as u64) as u32,
        pixels,
    })
}

/// Number of pixels within `tolerance` of `target`.
pub fn count_color(image: &RgbaImage, target: Rgb, tolerance: u8) -> usize {
    image
        .pixels()
        .filter(|p| target.matches(pixel_rgb(p), tolerance))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenshots::image::Rgba;

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn test_locate_color_centroid() {
        let mut image = canvas();
        for x in 4..=8 {
            for y in 2..=4 {
                image.put_pixel(x, y, Rgba([250, 205, 5, 255]));
            }
        }

        let found = locate_color(&image, Rgb::new(255, 200, 0), 10).unwrap();
        assert_eq!(found, ColorMatch { x: 6, y: 3, pixels: 15 });
    }

    #[test]
    fn test_locate_color_absent() {
        assert!(locate_color(&canvas(), Rgb::new(255, 200, 0), 30).is_none());
    }

    #[test]
    fn test_tolerance_excludes_far_colors() {
        let mut image = canvas();
        image.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
        assert_eq!(count_color(&image, Rgb::new(255, 0, 0), 40), 0);
        assert_eq!(count_color(&image, Rgb::new(255, 0, 0), 55), 1);
    }

    #[test]
    fn test_count_color() {
        let mut image = canvas();
        for x in 0..7 {
            image.put_pixel(x, 9, Rgba([255, 0, 0, 255]));
        }
        assert_eq!(count_color(&image, Rgb::new(255, 0, 0), 0), 7);
        assert_eq!(count_color(&image, Rgb::new(0, 0, 0), 0), 193);
    }
}

use std::path::Path;

use dbm_filters::connections::Activation;
use dbm_filters::model::ImageStack;
use dbm_filters::{Error, Result};
use image::{Rgb, RgbImage};
use log::info;

use crate::terminal;

const PAD: usize = 1;
const BORDER: usize = 1;
const BACKGROUND: [f32; 3] = [0.5, 0.5, 0.5];

/// A grid of equally sized image patches, filled row by row.
///
/// Each patch is surrounded by a border. When a patch is added with an
/// [`Activation`] the border is coloured yellow for a positive connection and
/// magenta for a negative one, as bright as its magnitude.
pub struct PatchViewer {
    grid_shape: (usize, usize),
    patch_shape: (usize, usize),
    is_color: bool,
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
    cur: usize,
}

impl PatchViewer {
    pub fn new(grid_shape: (usize, usize), patch_shape: (usize, usize), is_color: bool) -> Self {
        let (grid_rows, grid_cols) = grid_shape;
        let (cell_h, cell_w) = cell_shape(patch_shape);

        let width = grid_cols * cell_w + grid_cols.saturating_sub(1) * PAD;
        let height = grid_rows * cell_h + grid_rows.saturating_sub(1) * PAD;

        Self {
            grid_shape,
            patch_shape,
            is_color,
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
            cur: 0,
        }
    }

    /// Lays out every image of `images` on a near-square grid, rescaled.
    pub fn from_images(images: &ImageStack) -> Result<Self> {
        let (rows, cols, _) = images.image_shape();
        let mut viewer = Self::new(
            near_square_grid(images.len()),
            (rows, cols),
            images.is_color(),
        );

        for idx in 0..images.len() {
            viewer.add_patch(images.image(idx), true, None)?;
        }

        Ok(viewer)
    }

    pub fn grid_shape(&self) -> (usize, usize) {
        self.grid_shape
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_full(&self) -> bool {
        self.cur >= self.grid_shape.0 * self.grid_shape.1
    }

    /// Places `patch` (row, column, channel order, values in [-1, 1]) in the
    /// next free cell. With `rescale` the patch is first divided by its largest
    /// magnitude.
    pub fn add_patch(
        &mut self,
        patch: &[f32],
        rescale: bool,
        activation: Option<Activation>,
    ) -> Result<()> {
        let (ph, pw) = self.patch_shape;
        let channels = if self.is_color { 3 } else { 1 };

        if patch.len() != ph * pw * channels {
            return Err(Error::Render(format!(
                "patch has {} values, expected {}x{}x{}",
                patch.len(),
                ph,
                pw,
                channels
            )));
        }

        if self.is_full() {
            return Err(Error::Render(format!(
                "grid {:?} is already full",
                self.grid_shape
            )));
        }

        let scale = if rescale {
            let max = patch.iter().fold(0.0_f32, |m, v| m.max(v.abs()));
            if max > 0.0 {
                max.recip()
            } else {
                1.0
            }
        } else {
            1.0
        };

        let (cell_h, cell_w) = cell_shape(self.patch_shape);
        let top = (self.cur / self.grid_shape.1) * (cell_h + PAD);
        let left = (self.cur % self.grid_shape.1) * (cell_w + PAD);

        if let Some(activation) = activation {
            let border = border_color(activation);
            for y in 0..cell_h {
                for x in 0..cell_w {
                    self.pixels[(top + y) * self.width + left + x] = border;
                }
            }
        }

        for y in 0..ph {
            for x in 0..pw {
                let at = (y * pw + x) * channels;
                let color = if self.is_color {
                    [patch[at], patch[at + 1], patch[at + 2]]
                } else {
                    [patch[at]; 3]
                };
                let offset = (top + BORDER + y) * self.width + left + BORDER + x;
                self.pixels[offset] = color.map(|v| ((v * scale + 1.0) / 2.0).clamp(0.0, 1.0));
            }
        }

        self.cur += 1;

        Ok(())
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.pixels[y * self.width + x]
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgb(self.pixel(x as usize, y as usize).map(|v| (v * 255.0).round() as u8))
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Saving {}", path.display());

        self.to_image()
            .save(path)
            .map_err(|e| Error::Render(format!("could not write {}: {e}", path.display())))
    }

    pub fn show(&self, title: &str) -> Result<()> {
        terminal::show(&self.to_image(), title)
            .map_err(|e| Error::Render(format!("could not display {title}: {e}")))
    }
}

fn cell_shape((ph, pw): (usize, usize)) -> (usize, usize) {
    (ph + 2 * BORDER, pw + 2 * BORDER)
}

/// Yellow for excitatory, magenta for inhibitory.
pub fn border_color(activation: Activation) -> [f32; 3] {
    let Activation { positive, negative } = activation;
    [positive.max(negative), positive, negative].map(|v| v.clamp(0.0, 1.0))
}

/// `(rows, cols)` with `cols = ceil(sqrt(n))`, just enough rows to hold `n`.
pub fn near_square_grid(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }

    let mut cols = (n as f64).sqrt() as usize;
    if cols * cols < n {
        cols += 1;
    }

    (n.div_ceil(cols), cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_square_grid() {
        assert_eq!(near_square_grid(1), (1, 1));
        assert_eq!(near_square_grid(4), (2, 2));
        assert_eq!(near_square_grid(5), (2, 3));
        assert_eq!(near_square_grid(10), (3, 4));
        assert_eq!(near_square_grid(100), (10, 10));
    }

    #[test]
    fn test_dimensions() {
        let viewer = PatchViewer::new((2, 3), (4, 5), false);

        // cells are 6x7 with one pixel between them
        assert_eq!(viewer.dimensions(), (3 * 7 + 2, 2 * 6 + 1));
    }

    #[test]
    fn test_border_colors() {
        assert_eq!(border_color(Activation::from_weight(0.5)), [0.5, 0.5, 0.0]);
        assert_eq!(border_color(Activation::from_weight(-1.0)), [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_add_patch_rescales_and_draws_border() {
        let mut viewer = PatchViewer::new((1, 2), (1, 2), false);

        viewer
            .add_patch(&[2.0, -4.0], true, Some(Activation::from_weight(1.0)))
            .unwrap();

        assert_eq!(viewer.pixel(0, 0), [1.0, 1.0, 0.0]);
        assert_eq!(viewer.pixel(1, 1), [0.75; 3]);
        assert_eq!(viewer.pixel(2, 1), [0.0; 3]);
        // separator and untouched second cell keep the background
        assert_eq!(viewer.pixel(4, 1), BACKGROUND);
        assert_eq!(viewer.pixel(6, 1), BACKGROUND);
    }

    #[test]
    fn test_add_patch_errors() {
        let mut viewer = PatchViewer::new((1, 1), (2, 2), false);

        assert!(viewer.add_patch(&[0.0; 3], true, None).is_err());
        viewer.add_patch(&[0.0; 4], true, None).unwrap();
        assert!(viewer.is_full());
        assert!(viewer.add_patch(&[0.0; 4], true, None).is_err());
    }

    #[test]
    fn test_color_patch() {
        let mut viewer = PatchViewer::new((1, 1), (1, 1), true);

        viewer.add_patch(&[1.0, -1.0, 0.0], false, None).unwrap();

        assert_eq!(viewer.pixel(1, 1), [1.0, 0.0, 0.5]);
        assert_eq!(viewer.to_image().get_pixel(1, 1), &Rgb([255, 0, 128]));
    }
}

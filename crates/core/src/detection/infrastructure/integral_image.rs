use ndarray::Array2;

use super::gray_image::GrayImage;

/// Summed-area tables of pixel values and squared pixel values.
///
/// Both tables are `(height + 1) x (width + 1)` with a zero first row and
/// column, so any rectangle sum costs four lookups.
pub struct IntegralImage {
    sum: Array2<i64>,
    sqsum: Array2<f64>,
}

impl IntegralImage {
    pub fn new(image: &GrayImage) -> Self {
        let w = image.width() as usize;
        let h = image.height() as usize;
        let mut sum = Array2::<i64>::zeros((h + 1, w + 1));
        let mut sqsum = Array2::<f64>::zeros((h + 1, w + 1));

        for y in 0..h {
            let mut row_sum = 0i64;
            let mut row_sqsum = 0f64;
            for x in 0..w {
                let v = image.get(x as u32, y as u32) as i64;
                row_sum += v;
                row_sqsum += (v * v) as f64;
                sum[[y + 1, x + 1]] = sum[[y, x + 1]] + row_sum;
                sqsum[[y + 1, x + 1]] = sqsum[[y, x + 1]] + row_sqsum;
            }
        }
        Self { sum, sqsum }
    }

    /// Width of the source image.
    pub fn width(&self) -> usize {
        self.sum.ncols() - 1
    }

    /// Height of the source image.
    pub fn height(&self) -> usize {
        self.sum.nrows() - 1
    }

    pub fn rect_sum(&self, x: usize, y: usize, w: usize, h: usize) -> i64 {
        let s = &self.sum;
        s[[y + h, x + w]] - s[[y, x + w]] - s[[y + h, x]] + s[[y, x]]
    }

    pub fn rect_sqsum(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        let s = &self.sqsum;
        s[[y + h, x + w]] - s[[y, x + w]] - s[[y + h, x]] + s[[y, x]]
    }
}

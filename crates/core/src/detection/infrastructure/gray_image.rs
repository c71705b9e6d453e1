use crate::shared::frame::Frame;

/// Fixed-point precision of the luma weights.
const LUMA_SHIFT: u32 = 14;
/// BT.601 luma weights scaled by `2^LUMA_SHIFT`.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;

/// Fixed-point precision of the bilinear interpolation weights.
const RESIZE_BITS: u32 = 11;
const RESIZE_SCALE: f64 = (1 << RESIZE_BITS) as f64;

/// Single-channel 8-bit image used as detector input.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize));
        Self {
            data,
            width,
            height,
        }
    }

    /// Converts an RGB(A) or gray frame to luma. Alpha is ignored.
    pub fn from_frame(frame: &Frame) -> Self {
        let channels = frame.channels() as usize;
        let data = if channels < 3 {
            frame.data().iter().step_by(channels.max(1)).copied().collect()
        } else {
            frame
                .data()
                .chunks_exact(channels)
                .map(|px| {
                    let y = px[0] as u32 * R_WEIGHT
                        + px[1] as u32 * G_WEIGHT
                        + px[2] as u32 * B_WEIGHT
                        + (1 << (LUMA_SHIFT - 1));
                    (y >> LUMA_SHIFT) as u8
                })
                .collect()
        };
        Self::new(data, frame.width(), frame.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Bilinear resize with pixel-center alignment and edge clamping.
    pub fn resize(&self, width: u32, height: u32) -> GrayImage {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return GrayImage::new(Vec::new(), 0, 0);
        }

        let xs = interpolation_taps(self.width, width);
        let ys = interpolation_taps(self.height, height);
        let src_w = self.width as usize;

        // Horizontal pass into one row of fixed-point values, then blend rows.
        let horizontal = |row: usize| -> Vec<i32> {
            let line = &self.data[row * src_w..(row + 1) * src_w];
            xs.iter()
                .map(|t| line[t.lo] as i32 * t.w_lo + line[t.hi] as i32 * t.w_hi)
                .collect()
        };

        let mut data = Vec::with_capacity(width as usize * height as usize);
        let mut cache: Option<(usize, Vec<i32>, Vec<i32>)> = None;
        for t in &ys {
            let rows = match cache.take() {
                Some((lo, a, b)) if lo == t.lo => (lo, a, b),
                _ => (t.lo, horizontal(t.lo), horizontal(t.hi)),
            };
            let (_, top, bottom) = &rows;
            for (a, b) in top.iter().zip(bottom) {
                let v = *a as i64 * t.w_lo as i64 + *b as i64 * t.w_hi as i64;
                let rounded = (v + (1 << (2 * RESIZE_BITS - 1))) >> (2 * RESIZE_BITS);
                data.push(rounded.clamp(0, 255) as u8);
            }
            cache = Some(rows);
        }
        GrayImage::new(data, width, height)
    }
}

#[derive(Clone, Copy, Debug)]
struct Tap {
    lo: usize,
    hi: usize,
    w_lo: i32,
    w_hi: i32,
}

fn interpolation_taps(src: u32, dst: u32) -> Vec<Tap> {
    let scale = src as f64 / dst as f64;
    let last = src as usize - 1;
    (0..dst)
        .map(|d| {
            let f = (d as f64 + 0.5) * scale - 0.5;
            let mut lo = f.floor();
            let mut frac = f - lo;
            if lo < 0.0 {
                lo = 0.0;
                frac = 0.0;
            }
            let mut lo = lo as usize;
            if lo >= last {
                lo = last;
                frac = 0.0;
            }
            let w_hi = (frac * RESIZE_SCALE).round() as i32;
            Tap {
                lo,
                hi: (lo + 1).min(last),
                w_lo: RESIZE_SCALE as i32 - w_hi,
                w_hi,
            }
        })
        .collect()
}

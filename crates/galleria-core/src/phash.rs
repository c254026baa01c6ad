//! DCT perceptual hashing for near-duplicate image detection.
//!
//! The fingerprint is built the way `pHash` does it:
//!
//! 1. Decode, convert to greyscale, resize to a 32×32 sample (aspect ignored).
//! 2. Run a 2-D DCT-II over the sample.
//! 3. Keep the 8×8 block of lowest frequencies, skipping the DC row and column.
//! 4. Emit one bit per coefficient: `1` if above the block mean, else `0`.
//!
//! The result is a 64-character string of `'0'`/`'1'`. Re-encoding, resizing,
//! and small brightness changes leave it identical or within a few bits.

use std::f64::consts::PI;

use image::imageops::FilterType;

use crate::defaults::{PHASH_LOW_SIZE, PHASH_SAMPLE_SIZE};
use crate::error::{Error, Result};
use crate::traits::PerceptualHasher;

/// Perceptual hasher using a discrete cosine transform.
#[derive(Debug, Clone)]
pub struct DctHasher {
    sample_size: u32,
    low_size: usize,
    /// `cos[i][u]` for sample index `i` and frequency `u`
    cosines: Vec<Vec<f64>>,
}

impl Default for DctHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl DctHasher {
    pub fn new() -> Self {
        let n = PHASH_SAMPLE_SIZE as usize;
        let cosines = (0..n)
            .map(|i| {
                (0..n)
                    .map(|u| (((2 * i + 1) as f64) / (2.0 * n as f64) * u as f64 * PI).cos())
                    .collect()
            })
            .collect();
        Self {
            sample_size: PHASH_SAMPLE_SIZE,
            low_size: PHASH_LOW_SIZE,
            cosines,
        }
    }

    /// Greyscale sample, indexed `[x][y]`.
    fn sample(&self, image_data: &[u8]) -> Result<Vec<Vec<f64>>> {
        let img = image::load_from_memory(image_data)
            .map_err(|e| Error::Hashing(format!("Failed to decode image: {}", e)))?;
        let grey = img
            .grayscale()
            .resize_exact(self.sample_size, self.sample_size, FilterType::Triangle)
            .to_luma8();

        let n = self.sample_size as usize;
        let mut signal = vec![vec![0.0; n]; n];
        for (x, y, pixel) in grey.enumerate_pixels() {
            signal[x as usize][y as usize] = f64::from(pixel[0]);
        }
        Ok(signal)
    }

    /// Low-frequency DCT coefficients `F[u][v]` for `u, v` in `1..=low_size`.
    ///
    /// The normalisation factor is constant over this block and is dropped;
    /// only the ordering against the mean matters.
    fn low_frequencies(&self, signal: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n = signal.len();
        let low = self.low_size;

        // Transform along x first: partial[u][j] = Σ_i cos[i][u]·f[i][j]
        let mut partial = vec![vec![0.0; n]; low];
        for (row, u) in partial.iter_mut().zip(1..=low) {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..n).map(|i| self.cosines[i][u] * signal[i][j]).sum();
            }
        }

        partial
            .iter()
            .map(|row| {
                (1..=low)
                    .map(|v| (0..n).map(|j| self.cosines[j][v] * row[j]).sum())
                    .collect()
            })
            .collect()
    }
}

impl PerceptualHasher for DctHasher {
    fn hash(&self, image_data: &[u8]) -> Result<String> {
        if image_data.is_empty() {
            return Err(Error::Hashing("Image data is empty".to_string()));
        }

        let signal = self.sample(image_data)?;
        let block = self.low_frequencies(&signal);

        let count = (self.low_size * self.low_size) as f64;
        let mean = block.iter().flatten().sum::<f64>() / count;

        Ok(block
            .iter()
            .flatten()
            .map(|&c| if c > mean { '1' } else { '0' })
            .collect())
    }
}

/// Number of differing bits between two fingerprints.
///
/// Returns `None` if the fingerprints differ in length or contain anything
/// other than `'0'` and `'1'`.
pub fn hamming_distance(a: &str, b: &str) -> Option<u32> {
    if a.len() != b.len() {
        return None;
    }
    let mut distance = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        if !matches!(x, b'0' | b'1') || !matches!(y, b'0' | b'1') {
            return None;
        }
        if x != y {
            distance += 1;
        }
    }
    Some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::PHASH_BITS;
    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Luma};
    use std::io::Cursor;

    fn pattern(x: u32, y: u32) -> f64 {
        let fx = x as f64 / 63.0 * PI;
        let fy = y as f64 / 63.0 * PI;
        100.0 + 60.0 * (3.0 * fx).sin() * (2.0 * fy).cos() + 30.0 * (fx + 2.0 * fy).cos()
    }

    fn encode(img: ImageBuffer<Luma<u8>, Vec<u8>>) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    fn test_png(offset: f64) -> Vec<u8> {
        encode(ImageBuffer::from_fn(64, 64, |x, y| {
            Luma([(pattern(x, y) + offset).round() as u8])
        }))
    }

    fn inverted_png() -> Vec<u8> {
        encode(ImageBuffer::from_fn(64, 64, |x, y| {
            Luma([255 - pattern(x, y).round() as u8])
        }))
    }

    #[test]
    fn test_hash_is_64_binary_chars() {
        let hash = DctHasher::new().hash(&test_png(0.0)).unwrap();
        assert_eq!(hash.len(), PHASH_BITS);
        assert!(hash.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = DctHasher::new();
        let data = test_png(0.0);
        assert_eq!(hasher.hash(&data).unwrap(), hasher.hash(&data).unwrap());
    }

    #[test]
    fn test_brightness_shift_stays_close() {
        let hasher = DctHasher::new();
        let a = hasher.hash(&test_png(0.0)).unwrap();
        let b = hasher.hash(&test_png(12.0)).unwrap();
        assert!(hamming_distance(&a, &b).unwrap() <= 4);
    }

    #[test]
    fn test_inverted_image_is_far() {
        let hasher = DctHasher::new();
        let a = hasher.hash(&test_png(0.0)).unwrap();
        let b = hasher.hash(&inverted_png()).unwrap();
        assert!(hamming_distance(&a, &b).unwrap() > 32);
    }

    #[test]
    fn test_empty_input_fails() {
        let err = DctHasher::new().hash(&[]).unwrap_err();
        assert!(matches!(err, Error::Hashing(_)));
    }

    #[test]
    fn test_corrupt_input_fails() {
        let err = DctHasher::new()
            .hash(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, Error::Hashing(_)));
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance("0101", "0101"), Some(0));
        assert_eq!(hamming_distance("0101", "1100"), Some(2));
        assert_eq!(hamming_distance("01", "011"), None);
        assert_eq!(hamming_distance("0a", "01"), None);
    }
}

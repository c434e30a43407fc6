//! PNG export of assembled images

use std::path::Path;
use image::{ImageBuffer, Luma};
use log::info;

use crate::array::{Element, NdArray};
use crate::detector::errors::{DetError, DetResult};

/// Linear rescale of the finite value range onto 16-bit gray
pub fn to_gray16<T: Element>(image: &NdArray<T, 2>) -> DetResult<ImageBuffer<Luma<u16>, Vec<u16>>> {
    let [rows, cols] = image.shape();
    if image.is_empty() {
        return Err(DetError::GenericError("Cannot render an empty image".to_string()));
    }

    let finite = image.as_slice().iter().map(|v| v.to_f64()).filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi > lo { hi - lo } else { 1.0 };

    let pixels: Vec<u16> = image.as_slice().iter()
        .map(|v| {
            let v = v.to_f64();
            if v.is_finite() {
                (((v - lo) / span) * u16::MAX as f64).round() as u16
            } else {
                0
            }
        })
        .collect();

    ImageBuffer::from_raw(cols as u32, rows as u32, pixels)
        .ok_or_else(|| DetError::GenericError("Image buffer size mismatch".to_string()))
}

/// Save an image as 16-bit grayscale PNG
pub fn save_png<T: Element, P: AsRef<Path>>(image: &NdArray<T, 2>, path: P) -> DetResult<()> {
    let gray = to_gray16(image)?;
    gray.save(path.as_ref())?;
    info!("Image {:?} saved to {}", image.shape(), path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_to_full_range() {
        let img = NdArray::from_vec([1, 3], vec![-1.0f64, 0.0, 1.0]).unwrap();
        let gray = to_gray16(&img).unwrap();
        assert_eq!(gray.dimensions(), (3, 1));
        assert_eq!(gray.as_raw(), &vec![0, 32768, 65535]);
    }

    #[test]
    fn constant_and_empty_images() {
        let flat = NdArray::filled([2, 2], 7u16);
        assert!(to_gray16(&flat).unwrap().as_raw().iter().all(|&v| v == 0));
        assert!(to_gray16(&NdArray::<f64, 2>::empty()).is_err());
    }
}

//! Image assembly from per-pixel index maps

use crate::array::NdArray;
use crate::detector::errors::{DetError, DetResult};

/// Scatter per-pixel values into a 2-D image
///
/// The image is `(max row + 1) x (max col + 1)`; cells no pixel maps to
/// keep `T::default()`. Pixels sharing a cell overwrite each other in
/// input order, so the last one wins.
///
/// The image size is the one the geometry table defines through its
/// largest row and column indexes; no padding or cropping is applied.
///
/// # Arguments
/// * `values` - One value per pixel
/// * `rows` - Image row of every pixel
/// * `cols` - Image column of every pixel
///
/// # Returns
/// The image, an empty array for empty input, or `LengthMismatch` when
/// the three slices differ in length
pub fn assemble<T: Copy + Default>(values: &[T], rows: &[u32], cols: &[u32]) -> DetResult<NdArray<T, 2>> {
    if values.len() != rows.len() {
        return Err(DetError::LengthMismatch { what: "image values/row index", left: values.len(), right: rows.len() });
    }
    if rows.len() != cols.len() {
        return Err(DetError::LengthMismatch { what: "image row/column index", left: rows.len(), right: cols.len() });
    }
    if values.is_empty() {
        return Ok(NdArray::empty());
    }

    let n_rows = rows.iter().max().map_or(0, |&r| r as usize + 1);
    let n_cols = cols.iter().max().map_or(0, |&c| c as usize + 1);

    let mut image = NdArray::filled([n_rows, n_cols], T::default());
    for ((&v, &r), &c) in values.iter().zip(rows).zip(cols) {
        image[[r as usize, c as usize]] = v;
    }
    Ok(image)
}

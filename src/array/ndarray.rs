//! Canonical dense array
//!
//! Row-major, contiguous, fixed rank. Every extraction strategy produces
//! this representation; an empty array (size 0, rank kept) means "no data".

use std::ops::{Index, IndexMut};
use num_traits::AsPrimitive;

use crate::detector::errors::{DetError, DetResult};

/// Dense array of rank `N`
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T, const N: usize> {
    shape: [usize; N],
    data: Vec<T>,
}

impl<T: Copy, const N: usize> NdArray<T, N> {
    /// Array without elements, every dimension 0
    pub fn empty() -> Self {
        NdArray { shape: [0; N], data: Vec::new() }
    }

    /// Wrap row-major data, checking it against the shape
    pub fn from_vec(shape: [usize; N], data: Vec<T>) -> DetResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(DetError::ShapeMismatch { expected, actual: data.len() });
        }
        Ok(NdArray { shape, data })
    }

    /// Array of the given shape with every element set to `value`
    pub fn filled(shape: [usize; N], value: T) -> Self {
        let size = shape.iter().product();
        NdArray { shape, data: vec![value; size] }
    }

    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    pub fn rank(&self) -> usize {
        N
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Element at a multi-index, `None` when out of bounds
    pub fn get(&self, index: [usize; N]) -> Option<T> {
        self.offset(index).map(|i| self.data[i])
    }

    /// Elements of the `i`-th slab along the first axis
    pub fn subarray(&self, i: usize) -> &[T] {
        let len = self.slab_len();
        &self.data[i * len..(i + 1) * len]
    }

    /// Mutable elements of the `i`-th slab along the first axis
    pub fn subarray_mut(&mut self, i: usize) -> &mut [T] {
        let len = self.slab_len();
        &mut self.data[i * len..(i + 1) * len]
    }

    /// Per-element cast into another element type, same shape
    pub fn cast<U>(&self) -> NdArray<U, N>
    where
        T: AsPrimitive<U>,
        U: Copy + 'static,
    {
        NdArray {
            shape: self.shape,
            data: self.data.iter().map(|v| v.as_()).collect(),
        }
    }

    fn slab_len(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    fn offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for (i, (&idx, &dim)) in index.iter().zip(self.shape.iter()).enumerate() {
            if idx >= dim {
                return None;
            }
            let stride: usize = self.shape[i + 1..].iter().product();
            offset += idx * stride;
        }
        Some(offset)
    }
}

impl<T: Copy, const N: usize> Default for NdArray<T, N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Copy, const N: usize> Index<[usize; N]> for NdArray<T, N> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        match self.offset(index) {
            Some(i) => &self.data[i],
            None => panic!("index {:?} out of bounds for shape {:?}", index, self.shape),
        }
    }
}

impl<T: Copy, const N: usize> IndexMut<[usize; N]> for NdArray<T, N> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        match self.offset(index) {
            Some(i) => &mut self.data[i],
            None => panic!("index {:?} out of bounds for shape {:?}", index, self.shape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keeps_rank() {
        let a = NdArray::<u16, 3>::empty();
        assert_eq!(a.size(), 0);
        assert_eq!(a.rank(), 3);
        assert_eq!(a.shape(), [0, 0, 0]);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(NdArray::<u8, 2>::from_vec([2, 3], vec![0; 6]).is_ok());
        match NdArray::<u8, 2>::from_vec([2, 3], vec![0; 5]) {
            Err(DetError::ShapeMismatch { expected: 6, actual: 5 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn row_major_indexing_and_slabs() {
        let a = NdArray::from_vec([2, 2, 3], (0..12).collect::<Vec<i32>>()).unwrap();
        assert_eq!(a[[1, 0, 2]], 8);
        assert_eq!(a.get([1, 2, 0]), None);
        assert_eq!(a.subarray(1), &[6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn cast_preserves_shape() {
        let a = NdArray::from_vec([1, 2], vec![-1i16, 2]).unwrap();
        let b: NdArray<u16, 2> = a.cast();
        assert_eq!(b.shape(), [1, 2]);
        assert_eq!(b.as_slice(), &[65535, 2]);
    }
}

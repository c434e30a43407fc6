//! Element types of canonical arrays
//!
//! The set is closed: raw data uses int16, uint16 and uint8; calibration
//! and geometry add int32, uint32, float32 and float64.

use std::fmt;
use std::io::{self, Write};
use byteorder::{LittleEndian, WriteBytesExt};
use num_traits::AsPrimitive;

/// Numeric element of a canonical array
pub trait Element: Copy + Default + PartialEq + PartialOrd + fmt::Debug + fmt::Display + Send + 'static {
    /// NumPy type descriptor (little-endian)
    const NPY_DESCR: &'static str;

    /// Human-readable type name
    const NAME: &'static str;

    /// Write the value in little-endian byte order
    fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()>;

    /// Widen to f64 for display and image scaling
    fn to_f64(self) -> f64;
}

macro_rules! impl_element {
    ($t:ty, $descr:expr, $name:expr, |$v:ident, $w:ident| $write:expr) => {
        impl Element for $t {
            const NPY_DESCR: &'static str = $descr;
            const NAME: &'static str = $name;

            fn write_le<W: Write>(self, $w: &mut W) -> io::Result<()> {
                let $v = self;
                $write
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_element!(i16, "<i2", "int16", |v, w| w.write_i16::<LittleEndian>(v));
impl_element!(u16, "<u2", "uint16", |v, w| w.write_u16::<LittleEndian>(v));
impl_element!(u8, "|u1", "uint8", |v, w| w.write_u8(v));
impl_element!(i32, "<i4", "int32", |v, w| w.write_i32::<LittleEndian>(v));
impl_element!(u32, "<u4", "uint32", |v, w| w.write_u32::<LittleEndian>(v));
impl_element!(f32, "<f4", "float32", |v, w| w.write_f32::<LittleEndian>(v));
impl_element!(f64, "<f8", "float64", |v, w| w.write_f64::<LittleEndian>(v));

/// Per-element cast with `as` semantics (truncating/wrapping)
pub fn convert<S, T>(src: &[S]) -> Vec<T>
where
    S: AsPrimitive<T>,
    T: Copy + 'static,
{
    src.iter().map(|v| v.as_()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_uses_cast_semantics() {
        let wide: [i16; 3] = [-1, 300, 7];
        let narrow: Vec<u8> = convert(&wide);
        assert_eq!(narrow, vec![255, 44, 7]);

        let back: Vec<u16> = convert(&wide);
        assert_eq!(back, vec![65535, 300, 7]);
    }

    #[test]
    fn writes_little_endian() {
        let mut buf = Vec::new();
        0x1234u16.write_le(&mut buf).unwrap();
        (-2i16).write_le(&mut buf).unwrap();
        assert_eq!(buf, vec![0x34, 0x12, 0xfe, 0xff]);
    }
}

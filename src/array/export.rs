//! Writing canonical arrays to disk (CSV, JSON, NumPy `.npy`)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};

use crate::detector::errors::{DetError, DetResult};
use super::element::Element;
use super::ndarray::NdArray;

/// Supported on-disk array formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Npy,
}

impl ExportFormat {
    pub fn parse(name: &str) -> DetResult<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "npy" => Ok(ExportFormat::Npy),
            _ => Err(DetError::GenericError(format!("Unsupported array format: {}", name))),
        }
    }
}

impl<T: Element, const N: usize> NdArray<T, N> {
    /// Save the array to a file in the specified format
    ///
    /// # Arguments
    /// * `path` - Path to save the file
    /// * `format` - Format to use ("csv", "json", "npy")
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: &str) -> DetResult<()> {
        let format = ExportFormat::parse(format)?;
        info!("Writing {} array {:?} to {} as {:?}",
              T::NAME, self.shape(), path.as_ref().display(), format);

        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        match format {
            ExportFormat::Csv => self.write_csv(&mut writer)?,
            ExportFormat::Json => self.write_json(&mut writer)?,
            ExportFormat::Npy => self.write_npy(&mut writer)?,
        }
        writer.flush()?;
        Ok(())
    }

    /// Leading axes are flattened into rows, the last axis becomes columns
    fn table_dims(&self) -> (usize, usize) {
        let shape = self.shape();
        let cols = shape.last().copied().unwrap_or(1);
        let rows = if cols == 0 { 0 } else { self.size() / cols };
        (rows, cols)
    }

    pub fn write_csv<W: Write>(&self, writer: &mut W) -> DetResult<()> {
        let (rows, cols) = self.table_dims();
        let data = self.as_slice();

        write!(writer, "row/col")?;
        for x in 0..cols {
            write!(writer, ",{}", x)?;
        }
        writeln!(writer)?;

        for y in 0..rows {
            write!(writer, "{}", y)?;
            for value in &data[y * cols..(y + 1) * cols] {
                write!(writer, ",{}", value)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> DetResult<()> {
        let shape = self.shape();
        let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();

        writeln!(writer, "{{")?;
        writeln!(writer, "  \"dtype\": \"{}\",", T::NAME)?;
        writeln!(writer, "  \"shape\": [{}],", dims.join(", "))?;
        write!(writer, "  \"data\": ")?;
        write_nested(writer, &shape, self.as_slice())?;
        writeln!(writer)?;
        writeln!(writer, "}}")?;
        Ok(())
    }

    pub fn write_npy<W: Write>(&self, writer: &mut W) -> DetResult<()> {
        let shape = self.shape();
        let dims = match N {
            1 => format!("{},", shape[0]),
            _ => shape.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", "),
        };
        let header_str = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': ({}), }}",
            T::NPY_DESCR, dims
        );

        // magic(6) + version(2) + header length(2) + header must be a multiple of 64
        let header_len = header_str.len() + 1;
        let padding_len = (64 - ((header_len + 10) % 64)) % 64;
        let padded_header = format!("{}{}\n", header_str, " ".repeat(padding_len));
        debug!("npy header: {} bytes", padded_header.len());

        writer.write_all(b"\x93NUMPY")?;
        writer.write_all(&[0x01, 0x00])?;
        writer.write_u16::<LittleEndian>(padded_header.len() as u16)?;
        writer.write_all(padded_header.as_bytes())?;

        for &value in self.as_slice() {
            value.write_le(writer)?;
        }
        Ok(())
    }
}

fn write_nested<W: Write, T: Element>(writer: &mut W, shape: &[usize], data: &[T]) -> DetResult<()> {
    write!(writer, "[")?;
    match shape {
        [] => {}
        [_] => {
            for (i, value) in data.iter().enumerate() {
                if i > 0 {
                    write!(writer, ", ")?;
                }
                write!(writer, "{}", value)?;
            }
        }
        [outer, rest @ ..] => {
            let chunk: usize = rest.iter().product();
            for i in 0..*outer {
                if i > 0 {
                    write!(writer, ", ")?;
                }
                write_nested(writer, rest, &data[i * chunk..(i + 1) * chunk])?;
            }
        }
    }
    write!(writer, "]")?;
    Ok(())
}

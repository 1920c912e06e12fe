//! Encodes a computed [Field] as bytes.
//!
//! The crate does not write files itself; a [Format] turns a field into a byte stream
//! which the caller can write wherever it likes.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::engine::Field;
use crate::error::Result;
use crate::point::FieldPoint;

type Endianness = LittleEndian;

/// A trait implemented for each output format.
pub trait Format {
    /// Writes data indicating the start of the field.
    fn write_header<W: Write>(writer: &mut W, field: &Field) -> Result<()>;

    /// Writes data associated with a single point; `index` is its position in the field.
    fn write_point<W: Write>(writer: &mut W, index: usize, point: &FieldPoint) -> Result<()>;

    /// Writes data indicating the end of the field.
    fn write_footer<W: Write>(_writer: &mut W) -> Result<()> {
        Ok(())
    }

    /// Writes the whole field: the header, every point in order, then the footer.
    fn write_field<W: Write>(writer: &mut W, field: &Field) -> Result<()> {
        Self::write_header(writer, field)?;
        for (index, point) in field.iter().enumerate() {
            Self::write_point(writer, index, point)?;
        }
        Self::write_footer(writer)
    }
}

/// Writes `field` to `writer` in the format `F`.
pub fn write_field<F: Format, W: Write>(writer: &mut W, field: &Field) -> Result<()> {
    F::write_field(writer, field)
}

/// Encodes `field` in the format `F`.
///
/// For example, `serialize::<Binary>(&field)`.
pub fn serialize<F: Format>(field: &Field) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    F::write_field(&mut bytes, field)?;
    Ok(bytes)
}

/// A human readable format, in cylindrical polar components.
///
/// The output begins with the line `points n`, where `n` is the number of points.
/// This is followed by one line per point, `r phi z Br Bphi Bz`, separated by spaces.
pub struct Text {}
impl Format for Text {
    fn write_header<W: Write>(writer: &mut W, field: &Field) -> Result<()> {
        writeln!(writer, "points {}", field.len())?;
        Ok(())
    }

    fn write_point<W: Write>(writer: &mut W, _index: usize, point: &FieldPoint) -> Result<()> {
        let position = point.polar_coordinates();
        let field = point.polar_field();
        writeln!(
            writer,
            "{} {} {} {} {} {}",
            position.x, position.y, position.z, field.x, field.y, field.z
        )?;
        Ok(())
    }
}

/// A compact little-endian binary format, in cartesian components.
///
/// The output begins with the number of points as a `u64`, followed by six `f64`
/// per point: `x, y, z, Bx, By, Bz`.
pub struct Binary {}
impl Format for Binary {
    fn write_header<W: Write>(writer: &mut W, field: &Field) -> Result<()> {
        writer.write_u64::<Endianness>(field.len() as u64)?;
        Ok(())
    }

    fn write_point<W: Write>(writer: &mut W, _index: usize, point: &FieldPoint) -> Result<()> {
        let position = point.cartesian_coordinates();
        let field = point.cartesian_field();
        for element in position.iter().chain(field.iter()) {
            writer.write_f64::<Endianness>(*element)?;
        }
        Ok(())
    }
}

/// JSON, keeping each point in its native representation.
///
/// The output is a single document, `{"points":[...]}`, identical to serializing the
/// [Field] with serde_json.
pub struct Json {}
impl Format for Json {
    fn write_header<W: Write>(writer: &mut W, _field: &Field) -> Result<()> {
        writer.write_all(b"{\"points\":[")?;
        Ok(())
    }

    fn write_point<W: Write>(writer: &mut W, index: usize, point: &FieldPoint) -> Result<()> {
        if index > 0 {
            writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut *writer, point)?;
        Ok(())
    }

    fn write_footer<W: Write>(writer: &mut W) -> Result<()> {
        writer.write_all(b"]}")?;
        Ok(())
    }
}

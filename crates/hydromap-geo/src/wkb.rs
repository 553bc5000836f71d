//! Well-known-binary geometry decoding.
//!
//! Stateless codec from WKB/EWKB bytes to [`Geometry`]. The catalog only
//! stores points today, but the decoder admits LineString and Polygon with
//! the same machinery. Decoding is exact: the same input bytes always yield
//! the same coordinates.

use thiserror::Error;

/// Geometry type code for Point.
const TYPE_POINT: u32 = 1;
/// Geometry type code for LineString.
const TYPE_LINESTRING: u32 = 2;
/// Geometry type code for Polygon.
const TYPE_POLYGON: u32 = 3;

/// EWKB flag: an SRID follows the type word.
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
/// EWKB flag: coordinates carry a Z dimension.
const EWKB_Z_FLAG: u32 = 0x8000_0000;
/// EWKB flag: coordinates carry an M dimension.
const EWKB_M_FLAG: u32 = 0x4000_0000;

/// Decoding failure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WkbError {
    /// Input ended before the structure it promised.
    #[error("truncated WKB buffer: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// Leading byte-order marker was neither 0 (big endian) nor 1 (little endian).
    #[error("unknown WKB byte order marker: {0:#04x}")]
    UnknownByteOrder(u8),

    /// Geometry type code outside the supported set.
    #[error("unsupported WKB geometry type code: {0}")]
    UnsupportedType(u32),

    /// Z/M dimensions are not part of the catalog's data model.
    #[error("unsupported WKB coordinate dimension (Z/M flags set)")]
    UnsupportedDimension,

    /// A coordinate decoded to NaN or infinity.
    #[error("non-finite coordinate in WKB geometry")]
    NonFiniteCoordinate,

    /// Bytes remained after a complete geometry was decoded.
    #[error("trailing bytes after WKB geometry: {0}")]
    TrailingBytes(usize),
}

/// A geographic position, longitude first (GeoJSON axis order).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

/// Decoded geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

/// A geometry together with the EWKB SRID, when one was present.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGeometry {
    pub geometry: Geometry,
    pub srid: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
enum ByteOrder {
    Big,
    Little,
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WkbError> {
        if self.remaining() < n {
            return Err(WkbError::Truncated {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, WkbError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self, order: ByteOrder) -> Result<u32, WkbError> {
        let raw: [u8; 4] = self.take(4)?.try_into().expect("slice length checked");
        Ok(match order {
            ByteOrder::Big => u32::from_be_bytes(raw),
            ByteOrder::Little => u32::from_le_bytes(raw),
        })
    }

    fn read_f64(&mut self, order: ByteOrder) -> Result<f64, WkbError> {
        let raw: [u8; 8] = self.take(8)?.try_into().expect("slice length checked");
        Ok(match order {
            ByteOrder::Big => f64::from_be_bytes(raw),
            ByteOrder::Little => f64::from_le_bytes(raw),
        })
    }

    fn read_position(&mut self, order: ByteOrder) -> Result<Position, WkbError> {
        let lon = self.read_f64(order)?;
        let lat = self.read_f64(order)?;
        if !lon.is_finite() || !lat.is_finite() {
            return Err(WkbError::NonFiniteCoordinate);
        }
        Ok(Position { lon, lat })
    }

    /// Read an element count, bounding it by the bytes actually present so a
    /// corrupt count cannot trigger a huge allocation.
    fn read_count(&mut self, order: ByteOrder, element_size: usize) -> Result<usize, WkbError> {
        let count = self.read_u32(order)? as usize;
        if count.saturating_mul(element_size) > self.remaining() {
            return Err(WkbError::Truncated {
                offset: self.offset,
                needed: count.saturating_mul(element_size) - self.remaining(),
            });
        }
        Ok(count)
    }
}

/// Decode a WKB or EWKB geometry from `bytes`.
///
/// Accepts both byte orders and the PostGIS EWKB SRID extension. Rejects
/// Z/M dimensions, unknown geometry type codes, truncated buffers, trailing
/// bytes, and non-finite coordinates.
pub fn decode(bytes: &[u8]) -> Result<DecodedGeometry, WkbError> {
    let mut reader = Reader::new(bytes);
    let decoded = decode_geometry(&mut reader)?;
    let trailing = reader.remaining();
    if trailing > 0 {
        return Err(WkbError::TrailingBytes(trailing));
    }
    Ok(decoded)
}

fn decode_geometry(reader: &mut Reader<'_>) -> Result<DecodedGeometry, WkbError> {
    let order = match reader.read_u8()? {
        0 => ByteOrder::Big,
        1 => ByteOrder::Little,
        other => return Err(WkbError::UnknownByteOrder(other)),
    };

    let type_word = reader.read_u32(order)?;
    if type_word & (EWKB_Z_FLAG | EWKB_M_FLAG) != 0 {
        return Err(WkbError::UnsupportedDimension);
    }

    let srid = if type_word & EWKB_SRID_FLAG != 0 {
        Some(reader.read_u32(order)?)
    } else {
        None
    };

    let geometry = match type_word & !(EWKB_SRID_FLAG | EWKB_Z_FLAG | EWKB_M_FLAG) {
        TYPE_POINT => Geometry::Point(reader.read_position(order)?),
        TYPE_LINESTRING => Geometry::LineString(decode_ring(reader, order)?),
        TYPE_POLYGON => {
            let ring_count = reader.read_count(order, 4)?;
            let mut rings = Vec::with_capacity(ring_count);
            for _ in 0..ring_count {
                rings.push(decode_ring(reader, order)?);
            }
            Geometry::Polygon(rings)
        }
        other => return Err(WkbError::UnsupportedType(other)),
    };

    Ok(DecodedGeometry { geometry, srid })
}

fn decode_ring(reader: &mut Reader<'_>, order: ByteOrder) -> Result<Vec<Position>, WkbError> {
    let count = reader.read_count(order, 16)?;
    let mut positions = Vec::with_capacity(count);
    for _ in 0..count {
        positions.push(reader.read_position(order)?);
    }
    Ok(positions)
}

// src/native/message.rs
//! Encoding and decoding of HDF5 datatype messages (message type 0x0003)
//!
//! Every message starts with an 8-byte header:
//!
//! | byte | content                                        |
//! |------|------------------------------------------------|
//! | 0    | class (low nibble) and version (high nibble)   |
//! | 1-3  | class bit field                                |
//! | 4-7  | element size, little-endian                    |
//!
//! followed by class-specific properties. Composite classes embed the
//! messages of their member/base types recursively.

use crate::datatype::{element_count, Datatype, EnumMembers};
use crate::error::{ModelError, Result};
use crate::types::{ByteOrder, DatatypeClass, Sign, TypeSize};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use bytes::{BufMut, BytesMut};

/// Deepest type tree accepted from a message
pub const MAX_NESTING_DEPTH: usize = 32;

const CLASS_FIXED_POINT: u8 = 0;
const CLASS_FLOATING_POINT: u8 = 1;
const CLASS_TIME: u8 = 2;
const CLASS_STRING: u8 = 3;
const CLASS_BITFIELD: u8 = 4;
const CLASS_OPAQUE: u8 = 5;
const CLASS_COMPOUND: u8 = 6;
const CLASS_REFERENCE: u8 = 7;
const CLASS_ENUM: u8 = 8;
const CLASS_VLEN: u8 = 9;
const CLASS_ARRAY: u8 = 10;
const CLASS_COMPLEX: u8 = 11;

/// Size used for variable-length descriptors (pointer + length)
const VLEN_DESCRIPTOR_SIZE: u32 = 16;

// Sizes substituted for NATIVE when a type is written out
const NATIVE_INTEGER_SIZE: u64 = 4;
const NATIVE_FLOAT_SIZE: u64 = 4;
const NATIVE_REFERENCE_SIZE: u64 = 8;
const NATIVE_BYTE_SIZE: u64 = 1;

/// IEEE layout: (exponent location, exponent size, mantissa location, mantissa size, bias)
fn ieee_layout(size: u64) -> Option<(u8, u8, u8, u8, u32)> {
    match size {
        2 => Some((10, 5, 0, 10, 15)),
        4 => Some((23, 8, 0, 23, 127)),
        8 => Some((52, 11, 0, 52, 1023)),
        16 => Some((112, 15, 0, 112, 16383)),
        _ => None,
    }
}

/// Encode a datatype as an HDF5 datatype message
pub fn encode(datatype: &Datatype) -> Result<Vec<u8>> {
    let mut buf = BytesMut::with_capacity(64);
    encode_into(datatype, &mut buf)?;
    Ok(buf.to_vec())
}

fn put_header(buf: &mut BytesMut, class: u8, version: u8, bits: [u8; 3], size: u64) -> Result<()> {
    let size = u32::try_from(size)
        .map_err(|_| ModelError::Unsupported(format!("datatype size {} exceeds 32 bits", size)))?;
    buf.put_u8((class & 0x0F) | ((version & 0x0F) << 4));
    buf.put_slice(&bits);
    buf.put_u32_le(size);
    Ok(())
}

/// Element size carried by the message header, with NATIVE resolved
fn encoded_size(datatype: &Datatype) -> Result<u64> {
    if datatype.is_char() {
        return Ok(1);
    }
    if datatype.is_variable_str() {
        return Ok(VLEN_DESCRIPTOR_SIZE as u64);
    }
    if let Some(size) = datatype.size().bytes() {
        return Ok(size);
    }

    let size = match datatype.class() {
        DatatypeClass::Integer | DatatypeClass::Enum => NATIVE_INTEGER_SIZE,
        DatatypeClass::Float => NATIVE_FLOAT_SIZE,
        DatatypeClass::Time => 8,
        DatatypeClass::Reference => NATIVE_REFERENCE_SIZE,
        DatatypeClass::String | DatatypeClass::Opaque | DatatypeClass::BitField | DatatypeClass::Char => {
            NATIVE_BYTE_SIZE
        }
        DatatypeClass::Vlen => VLEN_DESCRIPTOR_SIZE as u64,
        DatatypeClass::Complex => checked_size(2, encoded_size(required_base(datatype)?)?, "complex size")?,
        DatatypeClass::Array => {
            let elements = element_count(datatype.array_dims().unwrap_or(&[]))?;
            checked_size(elements, encoded_size(required_base(datatype)?)?, "array size")?
        }
        DatatypeClass::Compound => datatype
            .compound_members()
            .record_size()?
            .ok_or_else(|| ModelError::Unsupported("compound with unresolved size".to_string()))?,
        DatatypeClass::NoClass => {
            return Err(ModelError::Unsupported(
                "datatype without a class has no native form".to_string(),
            ))
        }
    };
    Ok(size)
}

fn order_bit(order: ByteOrder) -> u8 {
    match order.resolve() {
        ByteOrder::BigEndian => 0x01,
        _ => 0x00,
    }
}

fn encode_into(datatype: &Datatype, buf: &mut BytesMut) -> Result<()> {
    match datatype.class() {
        DatatypeClass::Integer | DatatypeClass::Char => {
            let size = encoded_size(datatype)?;
            let mut bf0 = order_bit(datatype.order());
            if datatype.sign() != Sign::None {
                bf0 |= 0x08;
            }
            put_header(buf, CLASS_FIXED_POINT, 1, [bf0, 0, 0], size)?;
            buf.put_u16_le(0);
            buf.put_u16_le(bit_precision(size)?);
        }
        DatatypeClass::Float => {
            let size = encoded_size(datatype)?;
            let (exp_loc, exp_size, mant_loc, mant_size, bias) = ieee_layout(size).ok_or_else(|| {
                ModelError::Unsupported(format!("no IEEE layout for {}-byte floating point", size))
            })?;
            // mantissa normalization "implied MSB" in bits 4-5
            let mut bf0 = 0x20u8;
            match datatype.order().resolve() {
                ByteOrder::BigEndian => bf0 |= 0x01,
                ByteOrder::Vax => bf0 |= 0x41,
                _ => {}
            }
            let sign_location = (size * 8 - 1) as u8;
            put_header(buf, CLASS_FLOATING_POINT, 1, [bf0, sign_location, 0], size)?;
            buf.put_u16_le(0);
            buf.put_u16_le(bit_precision(size)?);
            buf.put_u8(exp_loc);
            buf.put_u8(exp_size);
            buf.put_u8(mant_loc);
            buf.put_u8(mant_size);
            buf.put_u32_le(bias);
        }
        DatatypeClass::Time => {
            let size = encoded_size(datatype)?;
            put_header(buf, CLASS_TIME, 1, [order_bit(datatype.order()), 0, 0], size)?;
            buf.put_u16_le(bit_precision(size)?);
        }
        DatatypeClass::String if datatype.is_variable_str() => {
            // VL string: type 1, null-terminated, ASCII, over 1-byte characters
            put_header(buf, CLASS_VLEN, 1, [0x01, 0x00, 0], VLEN_DESCRIPTOR_SIZE as u64)?;
            put_header(buf, CLASS_FIXED_POINT, 1, [0, 0, 0], 1)?;
            buf.put_u16_le(0);
            buf.put_u16_le(8);
        }
        DatatypeClass::String => {
            let size = encoded_size(datatype)?;
            put_header(buf, CLASS_STRING, 1, [0, 0, 0], size)?;
        }
        DatatypeClass::BitField => {
            let size = encoded_size(datatype)?;
            put_header(buf, CLASS_BITFIELD, 1, [order_bit(datatype.order()), 0, 0], size)?;
            buf.put_u16_le(0);
            buf.put_u16_le(bit_precision(size)?);
        }
        DatatypeClass::Opaque => {
            // no tag
            let size = encoded_size(datatype)?;
            put_header(buf, CLASS_OPAQUE, 1, [0, 0, 0], size)?;
        }
        DatatypeClass::Compound => encode_compound(datatype, buf)?,
        DatatypeClass::Reference => {
            let size = encoded_size(datatype)?;
            put_header(buf, CLASS_REFERENCE, 1, [0, 0, 0], size)?;
        }
        DatatypeClass::Enum => encode_enum(datatype, buf)?,
        DatatypeClass::Vlen => {
            let base = required_base(datatype)?;
            put_header(buf, CLASS_VLEN, 1, [0, 0, 0], VLEN_DESCRIPTOR_SIZE as u64)?;
            encode_into(base, buf)?;
        }
        DatatypeClass::Array => encode_array(datatype, buf)?,
        DatatypeClass::Complex => {
            let base = required_base(datatype)?;
            let part = encoded_size(base)?;
            // bit 0: homogeneous parts
            put_header(buf, CLASS_COMPLEX, 1, [0x01, 0, 0], checked_size(2, part, "complex size")?)?;
            encode_into(base, buf)?;
        }
        DatatypeClass::NoClass => {
            return Err(ModelError::Unsupported(
                "datatype without a class has no native form".to_string(),
            ));
        }
    }
    Ok(())
}

fn checked_size(count: u64, element: u64, field: &'static str) -> Result<u64> {
    count.checked_mul(element).ok_or(ModelError::InvalidDatatypeSpec {
        field,
        value: i64::try_from(element).unwrap_or(i64::MAX),
    })
}

fn bit_precision(size: u64) -> Result<u16> {
    size.checked_mul(8)
        .and_then(|bits| u16::try_from(bits).ok())
        .ok_or_else(|| ModelError::Unsupported(format!("{}-byte atomic type is too wide", size)))
}

fn required_base(datatype: &Datatype) -> Result<&Datatype> {
    datatype.base().ok_or_else(|| {
        ModelError::Unsupported(format!("{} datatype without a base type", datatype.class().name()))
    })
}

/// Width of a member offset field for a v3 compound of the given size
fn offset_width(compound_size: u64) -> usize {
    if compound_size <= 0xFF {
        1
    } else if compound_size <= 0xFFFF {
        2
    } else {
        4
    }
}

fn encode_compound(datatype: &Datatype, buf: &mut BytesMut) -> Result<()> {
    let members = datatype.compound_members();
    let size = encoded_size(datatype)?;
    let count = u16::try_from(members.len())
        .map_err(|_| ModelError::Unsupported(format!("{} compound members", members.len())))?;
    let [lo, hi] = count.to_le_bytes();
    put_header(buf, CLASS_COMPOUND, 3, [lo, hi, 0], size)?;

    let width = offset_width(size);
    for member in members {
        buf.put_slice(member.name.as_bytes());
        buf.put_u8(0);
        if member.offset > size {
            return Err(ModelError::Unsupported(format!(
                "member '{}' offset {} beyond record size {}",
                member.name, member.offset, size
            )));
        }
        let mut offset = [0u8; 8];
        LittleEndian::write_uint(&mut offset, member.offset, width);
        buf.put_slice(&offset[..width]);
        encode_into(&member.datatype, buf)?;
    }
    Ok(())
}

fn encode_enum(datatype: &Datatype, buf: &mut BytesMut) -> Result<()> {
    let base = required_base(datatype)?;
    let size = encoded_size(base)?;
    if size > 8 {
        return Err(ModelError::Unsupported(format!("{}-byte enum values", size)));
    }
    let width = size as usize;
    let signed = base.sign() != Sign::None;

    let mut members: Vec<(i128, &str)> = datatype
        .enum_members()
        .iter()
        .map(|(value, name)| {
            value
                .parse::<i128>()
                .ok()
                .filter(|v| fits(*v, width, signed))
                .map(|v| (v, name))
                .ok_or_else(|| {
                    ModelError::Unsupported(format!(
                        "enum value '{}' does not fit a {}-byte {} integer",
                        value,
                        width,
                        if signed { "signed" } else { "unsigned" }
                    ))
                })
        })
        .collect::<Result<_>>()?;
    members.sort();

    let count = u16::try_from(members.len())
        .map_err(|_| ModelError::Unsupported(format!("{} enum members", members.len())))?;
    let [lo, hi] = count.to_le_bytes();
    put_header(buf, CLASS_ENUM, 3, [lo, hi, 0], size)?;
    encode_into(base, buf)?;

    for (_, name) in &members {
        buf.put_slice(name.as_bytes());
        buf.put_u8(0);
    }

    let big_endian = base.order().resolve() == ByteOrder::BigEndian;
    for (value, _) in &members {
        let mut bytes = [0u8; 8];
        match (signed, big_endian) {
            (true, false) => LittleEndian::write_int(&mut bytes, *value as i64, width),
            (true, true) => BigEndian::write_int(&mut bytes, *value as i64, width),
            (false, false) => LittleEndian::write_uint(&mut bytes, *value as u64, width),
            (false, true) => BigEndian::write_uint(&mut bytes, *value as u64, width),
        }
        buf.put_slice(&bytes[..width]);
    }
    Ok(())
}

fn fits(value: i128, width: usize, signed: bool) -> bool {
    let bits = (width * 8) as u32;
    if signed {
        let half = 1i128 << (bits - 1);
        (-half..half).contains(&value)
    } else {
        (0..(1i128 << bits)).contains(&value)
    }
}

fn encode_array(datatype: &Datatype, buf: &mut BytesMut) -> Result<()> {
    let base = required_base(datatype)?;
    let dims = datatype
        .array_dims()
        .ok_or_else(|| ModelError::Unsupported("array datatype without dimensions".to_string()))?;
    let rank = u8::try_from(dims.len())
        .map_err(|_| ModelError::Unsupported(format!("array rank {}", dims.len())))?;
    let size = encoded_size(datatype)?;

    put_header(buf, CLASS_ARRAY, 3, [0, 0, 0], size)?;
    buf.put_u8(rank);
    for &dim in dims {
        let dim = u32::try_from(dim)
            .map_err(|_| ModelError::Unsupported(format!("array dimension {} exceeds 32 bits", dim)))?;
        buf.put_u32_le(dim);
    }
    encode_into(base, buf)
}

/// Decode an HDF5 datatype message
///
/// Returns the datatype and the number of bytes consumed.
pub fn decode(data: &[u8]) -> Result<(Datatype, usize)> {
    let mut reader = MessageReader::new(data);
    let datatype = decode_at(&mut reader, 1)?;
    Ok((datatype, reader.pos))
}

struct MessageReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MessageReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        MessageReader { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(ModelError::UnexpectedEof {
                expected: self.pos + n,
                available: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn uint(&mut self, width: usize) -> Result<u64> {
        Ok(LittleEndian::read_uint(self.take(width)?, width))
    }

    /// Null-terminated name
    fn cstr(&mut self) -> Result<String> {
        let remaining = &self.data[self.pos..];
        let len = remaining.iter().position(|&b| b == 0).ok_or(ModelError::UnexpectedEof {
            expected: self.data.len() + 1,
            available: self.data.len(),
        })?;
        let name = String::from_utf8_lossy(&remaining[..len]).into_owned();
        self.pos += len + 1;
        Ok(name)
    }
}

fn fixed_order(bf0: u8) -> ByteOrder {
    if bf0 & 0x01 == 0 {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    }
}

fn sized(size: u32) -> Result<TypeSize> {
    TypeSize::from_raw(size as i64)
}

fn decode_at(reader: &mut MessageReader<'_>, depth: usize) -> Result<Datatype> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ModelError::NestingTooDeep(MAX_NESTING_DEPTH));
    }

    let class_and_version = reader.u8()?;
    let class = class_and_version & 0x0F;
    let version = class_and_version >> 4;
    let bits = reader.take(3)?;
    let (bf0, bf1) = (bits[0], bits[1]);
    let size = reader.u32()?;

    let datatype = match class {
        CLASS_FIXED_POINT => {
            let _bit_offset = reader.u16()?;
            let _precision = reader.u16()?;
            let sign = if bf0 & 0x08 != 0 { Sign::TwosComplement } else { Sign::None };
            // CHAR has no class of its own on disk and comes back as a 1-byte INTEGER
            Datatype::from_parts(DatatypeClass::Integer, sized(size)?, fixed_order(bf0), sign, None)
        }
        CLASS_FLOATING_POINT => {
            reader.take(12)?;
            let order = match ((bf0 >> 6) & 0x01, bf0 & 0x01) {
                (0, 0) => ByteOrder::LittleEndian,
                (0, _) => ByteOrder::BigEndian,
                _ => ByteOrder::Vax,
            };
            Datatype::from_parts(DatatypeClass::Float, sized(size)?, order, Sign::Native, None)
        }
        CLASS_TIME => {
            let _precision = reader.u16()?;
            Datatype::from_parts(DatatypeClass::Time, sized(size)?, fixed_order(bf0), Sign::Native, None)
        }
        CLASS_STRING => {
            check_padding(bf0 & 0x0F)?;
            check_charset(bf0 >> 4)?;
            Datatype::from_parts(DatatypeClass::String, sized(size)?, ByteOrder::None, Sign::Native, None)
        }
        CLASS_BITFIELD => {
            reader.take(4)?;
            Datatype::from_parts(DatatypeClass::BitField, sized(size)?, fixed_order(bf0), Sign::Native, None)
        }
        CLASS_OPAQUE => {
            let tag_len = bf0 as usize;
            reader.take((tag_len + 7) & !7)?;
            Datatype::from_parts(DatatypeClass::Opaque, sized(size)?, ByteOrder::None, Sign::Native, None)
        }
        CLASS_COMPOUND => {
            if version != 3 {
                return Err(ModelError::InvalidDatatypeVersion { class, version });
            }
            let count = u16::from_le_bytes([bf0, bf1]);
            let width = offset_width(size as u64);
            let mut members = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let name = reader.cstr()?;
                let offset = reader.uint(width)?;
                let member = decode_at(reader, depth + 1)?;
                members.push((name, member, offset));
            }
            Datatype::compound(size as i64, members)?
        }
        CLASS_REFERENCE => {
            Datatype::from_parts(DatatypeClass::Reference, sized(size)?, ByteOrder::None, Sign::Native, None)
        }
        CLASS_ENUM => {
            if version != 3 {
                return Err(ModelError::InvalidDatatypeVersion { class, version });
            }
            let count = u16::from_le_bytes([bf0, bf1]) as usize;
            let base = decode_at(reader, depth + 1)?;
            let width = base.size().bytes().unwrap_or(0) as usize;
            if width == 0 || width > 8 {
                return Err(ModelError::Unsupported(format!("{}-byte enum values", width)));
            }
            let signed = base.sign() == Sign::TwosComplement;
            let big_endian = base.order() == ByteOrder::BigEndian;

            let names = (0..count).map(|_| reader.cstr()).collect::<Result<Vec<_>>>()?;
            let mut members = EnumMembers::new();
            for name in names {
                let raw = reader.take(width)?;
                let value = match (signed, big_endian) {
                    (true, false) => LittleEndian::read_int(raw, width).to_string(),
                    (true, true) => BigEndian::read_int(raw, width).to_string(),
                    (false, false) => LittleEndian::read_uint(raw, width).to_string(),
                    (false, true) => BigEndian::read_uint(raw, width).to_string(),
                };
                members.insert(value, name);
            }

            let mut enumeration = Datatype::enumeration(base, "")?;
            enumeration.replace_enum_members(members);
            enumeration
        }
        CLASS_VLEN => {
            let is_string = bf0 & 0x0F == 1;
            if is_string {
                check_padding(bf0 >> 4)?;
                check_charset(bf1 & 0x0F)?;
            }
            let base = decode_at(reader, depth + 1)?;
            if is_string {
                Datatype::variable_string()
            } else {
                Datatype::vlen(base)
            }
        }
        CLASS_ARRAY => {
            let rank = reader.u8()? as usize;
            match version {
                2 => {
                    reader.take(3)?;
                }
                3 => {}
                _ => return Err(ModelError::InvalidDatatypeVersion { class, version }),
            }
            let dims = (0..rank)
                .map(|_| reader.u32().map(u64::from))
                .collect::<Result<Vec<_>>>()?;
            if version == 2 {
                // permutation indices
                reader.take(rank * 4)?;
            }
            let base = decode_at(reader, depth + 1)?;
            Datatype::array(base, &dims)?
        }
        CLASS_COMPLEX => {
            let base = decode_at(reader, depth + 1)?;
            Datatype::complex(base)?
        }
        other => return Err(ModelError::InvalidDatatypeClass(other)),
    };

    Ok(datatype)
}

fn check_padding(value: u8) -> Result<()> {
    match value {
        0..=2 => Ok(()),
        v => Err(ModelError::InvalidStringPadding(v)),
    }
}

fn check_charset(value: u8) -> Result<()> {
    match value {
        0 | 1 => Ok(()),
        v => Err(ModelError::InvalidCharacterSet(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(size: i64, order: ByteOrder, sign: Sign) -> Datatype {
        Datatype::new(DatatypeClass::Integer, size, order, sign, None).unwrap()
    }

    fn float(size: i64) -> Datatype {
        Datatype::new(DatatypeClass::Float, size, ByteOrder::LittleEndian, Sign::Native, None).unwrap()
    }

    #[test]
    fn test_fixed_point_header() {
        let bytes = encode(&int(4, ByteOrder::BigEndian, Sign::TwosComplement)).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[0], 0x10);
        assert_eq!(bytes[1], 0x09);
        assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
        assert_eq!(&bytes[10..12], &32u16.to_le_bytes());
    }

    #[test]
    fn test_float_properties() {
        let bytes = encode(&float(8)).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes[0] & 0x0F, CLASS_FLOATING_POINT);
        assert_eq!(bytes[12], 52);
        assert_eq!(bytes[13], 11);
        assert_eq!(&bytes[16..20], &1023u32.to_le_bytes());
    }

    #[test]
    fn test_odd_float_size_unsupported() {
        assert!(matches!(encode(&float(3)), Err(ModelError::Unsupported(_))));
    }

    #[test]
    fn test_roundtrip_atomic() {
        for dt in [
            int(2, ByteOrder::LittleEndian, Sign::None),
            int(8, ByteOrder::BigEndian, Sign::TwosComplement),
            float(4),
            Datatype::new(DatatypeClass::Float, 8, ByteOrder::Vax, Sign::Native, None).unwrap(),
            Datatype::new(DatatypeClass::String, 12, ByteOrder::None, Sign::Native, None).unwrap(),
            Datatype::new(DatatypeClass::Opaque, 16, ByteOrder::None, Sign::Native, None).unwrap(),
            Datatype::new(DatatypeClass::BitField, 2, ByteOrder::BigEndian, Sign::Native, None).unwrap(),
            Datatype::new(DatatypeClass::Reference, 8, ByteOrder::None, Sign::Native, None).unwrap(),
            Datatype::new(DatatypeClass::Time, 8, ByteOrder::LittleEndian, Sign::Native, None).unwrap(),
        ] {
            let bytes = encode(&dt).unwrap();
            let (decoded, consumed) = decode(&bytes).unwrap();
            assert_eq!(consumed, bytes.len());
            assert_eq!(decoded, dt, "roundtrip of {}", dt);
        }
    }

    #[test]
    fn test_single_byte_fixed_point_is_integer() {
        let byte = int(1, ByteOrder::LittleEndian, Sign::TwosComplement);
        let (decoded, _) = decode(&encode(&byte).unwrap()).unwrap();
        assert_eq!(decoded, byte);

        let ch = Datatype::new(DatatypeClass::Char, 1, ByteOrder::LittleEndian, Sign::None, None).unwrap();
        let (decoded, _) = decode(&encode(&ch).unwrap()).unwrap();
        assert!(decoded.is_integer());
        assert!(!decoded.is_char());
        assert_eq!(decoded.description(), ch.description());
    }

    #[test]
    fn test_native_values_resolve() {
        let native = Datatype::new(DatatypeClass::Integer, -1, ByteOrder::Native, Sign::Native, None).unwrap();
        let (decoded, _) = decode(&encode(&native).unwrap()).unwrap();
        assert_eq!(decoded.size(), TypeSize::Bytes(NATIVE_INTEGER_SIZE));
        assert_eq!(decoded.order(), ByteOrder::host());
        assert_eq!(decoded.sign(), Sign::TwosComplement);
    }

    #[test]
    fn test_enum_values_follow_base() {
        let base = int(2, ByteOrder::BigEndian, Sign::TwosComplement);
        let dt = Datatype::enumeration(base, "-1=LOW, 0=MID, 300=HIGH").unwrap();
        let (decoded, _) = decode(&encode(&dt).unwrap()).unwrap();
        assert_eq!(decoded, dt);
        assert_eq!(decoded.enum_label("-1"), Some("LOW"));
        assert_eq!(decoded.enum_label("300"), Some("HIGH"));
    }

    #[test]
    fn test_enum_value_out_of_range() {
        let base = int(1, ByteOrder::LittleEndian, Sign::None);
        let dt = Datatype::enumeration(base, "256=TOO_BIG").unwrap();
        assert!(matches!(encode(&dt), Err(ModelError::Unsupported(_))));

        let base = int(1, ByteOrder::LittleEndian, Sign::None);
        let dt = Datatype::enumeration(base, "x=NOT_A_NUMBER").unwrap();
        assert!(encode(&dt).is_err());
    }

    #[test]
    fn test_variable_string_roundtrip() {
        let bytes = encode(&Datatype::variable_string()).unwrap();
        assert_eq!(bytes[0] & 0x0F, CLASS_VLEN);
        let (decoded, _) = decode(&bytes).unwrap();
        assert!(decoded.is_string());
        assert!(decoded.is_variable_str());
    }

    #[test]
    fn test_array_v2_decodes() {
        let mut bytes = vec![(2 << 4) | CLASS_ARRAY, 0, 0, 0];
        bytes.extend_from_slice(&24u32.to_le_bytes());
        bytes.extend_from_slice(&[2, 0, 0, 0]);
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&encode(&int(4, ByteOrder::LittleEndian, Sign::None)).unwrap());

        let (decoded, consumed) = decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.array_dims(), Some(&[2u64, 3][..]));
        assert_eq!(decoded.description(), "Array [2 x 3] of 32-bit unsigned integer");
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode(&[0u8; 4]), Err(ModelError::UnexpectedEof { .. })));

        let mut bad_class = vec![0x1D, 0, 0, 0];
        bad_class.extend_from_slice(&4u32.to_le_bytes());
        assert!(matches!(decode(&bad_class), Err(ModelError::InvalidDatatypeClass(13))));

        let mut bad_padding = vec![0x13, 0x05, 0, 0];
        bad_padding.extend_from_slice(&4u32.to_le_bytes());
        assert!(matches!(decode(&bad_padding), Err(ModelError::InvalidStringPadding(5))));

        let mut zero_size = vec![0x13, 0, 0, 0];
        zero_size.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(decode(&zero_size), Err(ModelError::InvalidDatatypeSpec { field: "size", .. })));
    }

    #[test]
    fn test_oversized_arrays_are_rejected() {
        let mut bytes = vec![(3 << 4) | CLASS_ARRAY, 0, 0, 0];
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.push(3);
        for _ in 0..3 {
            bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        }
        bytes.extend_from_slice(&encode(&int(4, ByteOrder::LittleEndian, Sign::None)).unwrap());
        assert!(matches!(decode(&bytes), Err(ModelError::InvalidDatatypeSpec { .. })));

        let native = Datatype::new(DatatypeClass::Integer, -1, ByteOrder::Native, Sign::Native, None).unwrap();
        let array = Datatype::array(native, &[u64::MAX, 2]).unwrap();
        assert!(matches!(encode(&array), Err(ModelError::InvalidDatatypeSpec { .. })));
    }

    #[test]
    fn test_nesting_limit() {
        let mut bytes = Vec::new();
        for _ in 0..MAX_NESTING_DEPTH {
            bytes.extend_from_slice(&[CLASS_VLEN | 0x10, 0, 0, 0]);
            bytes.extend_from_slice(&16u32.to_le_bytes());
        }
        bytes.extend_from_slice(&encode(&int(4, ByteOrder::LittleEndian, Sign::None)).unwrap());
        assert!(matches!(decode(&bytes), Err(ModelError::NestingTooDeep(MAX_NESTING_DEPTH))));
    }
}

//! Decoder for `FileDescriptorSet` from protobuf binary format.

use super::*;
use crate::Error;
use bytes::Buf;

/// Maximum size for a single embedded message (64 MiB). Prevents unbounded
/// allocation from a malicious or corrupt descriptor set.
const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Maximum bytes for a 64-bit varint (10 bytes).
const MAX_VARINT_BYTES: usize = 10;

/// Wire types as defined by the protobuf encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireType {
    Varint,
    I64,
    Len,
    I32,
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::I64),
            2 => Ok(Self::Len),
            5 => Ok(Self::I32),
            _ => Err(Error::InvalidWireType(value)),
        }
    }
}

/// Decode a `FileDescriptorSet` from protobuf binary data.
pub fn decode_file_descriptor_set(data: &[u8]) -> Result<FileDescriptorSet, Error> {
    let mut buf = data;
    let mut fds = FileDescriptorSet::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => {
                let msg_data = read_length_delimited(&mut buf)?;
                fds.file.push(decode_file_descriptor_proto(msg_data)?);
            }
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(fds)
}

fn decode_file_descriptor_proto(data: &[u8]) -> Result<FileDescriptorProto, Error> {
    let mut buf = data;
    let mut fdp = FileDescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => fdp.name = Some(decode_string(&mut buf)?),
            2 => fdp.package = Some(decode_string(&mut buf)?),
            3 => fdp.dependency.push(decode_string(&mut buf)?),
            4 => fdp.message_type.push(decode_descriptor_proto(read_length_delimited(&mut buf)?)?),
            5 => fdp.enum_type.push(decode_enum_descriptor_proto(read_length_delimited(&mut buf)?)?),
            6 => fdp.service.push(decode_service_descriptor_proto(read_length_delimited(&mut buf)?)?),
            8 => fdp.options = Some(decode_file_options(read_length_delimited(&mut buf)?)?),
            9 => fdp.source_code_info = Some(decode_source_code_info(read_length_delimited(&mut buf)?)?),
            12 => fdp.syntax = Some(decode_string(&mut buf)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(fdp)
}

fn decode_descriptor_proto(data: &[u8]) -> Result<DescriptorProto, Error> {
    let mut buf = data;
    let mut dp = DescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => dp.name = Some(decode_string(&mut buf)?),
            2 => dp.field.push(decode_field_descriptor_proto(read_length_delimited(&mut buf)?)?),
            3 => dp.nested_type.push(decode_descriptor_proto(read_length_delimited(&mut buf)?)?),
            4 => dp.enum_type.push(decode_enum_descriptor_proto(read_length_delimited(&mut buf)?)?),
            7 => dp.options = Some(decode_message_options(read_length_delimited(&mut buf)?)?),
            8 => dp.oneof_decl.push(decode_oneof_descriptor_proto(read_length_delimited(&mut buf)?)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(dp)
}

fn decode_field_descriptor_proto(data: &[u8]) -> Result<FieldDescriptorProto, Error> {
    let mut buf = data;
    let mut fdp = FieldDescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => fdp.name = Some(decode_string(&mut buf)?),
            3 => fdp.number = Some(decode_varint(&mut buf)? as i32),
            4 => fdp.label = Some(decode_varint(&mut buf)? as i32),
            5 => fdp.r#type = Some(decode_varint(&mut buf)? as i32),
            6 => fdp.type_name = Some(decode_string(&mut buf)?),
            7 => fdp.default_value = Some(decode_string(&mut buf)?),
            9 => fdp.oneof_index = Some(decode_varint(&mut buf)? as i32),
            10 => fdp.json_name = Some(decode_string(&mut buf)?),
            17 => fdp.proto3_optional = Some(decode_varint(&mut buf)? != 0),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(fdp)
}

fn decode_enum_descriptor_proto(data: &[u8]) -> Result<EnumDescriptorProto, Error> {
    let mut buf = data;
    let mut edp = EnumDescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => edp.name = Some(decode_string(&mut buf)?),
            2 => edp.value.push(decode_enum_value_descriptor_proto(read_length_delimited(&mut buf)?)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(edp)
}

fn decode_enum_value_descriptor_proto(data: &[u8]) -> Result<EnumValueDescriptorProto, Error> {
    let mut buf = data;
    let mut evdp = EnumValueDescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => evdp.name = Some(decode_string(&mut buf)?),
            2 => evdp.number = Some(decode_varint(&mut buf)? as i32),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(evdp)
}

fn decode_oneof_descriptor_proto(data: &[u8]) -> Result<OneofDescriptorProto, Error> {
    let mut buf = data;
    let mut odp = OneofDescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => odp.name = Some(decode_string(&mut buf)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(odp)
}

fn decode_service_descriptor_proto(data: &[u8]) -> Result<ServiceDescriptorProto, Error> {
    let mut buf = data;
    let mut sdp = ServiceDescriptorProto::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => sdp.name = Some(decode_string(&mut buf)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(sdp)
}

fn decode_message_options(data: &[u8]) -> Result<MessageOptions, Error> {
    let mut buf = data;
    let mut mo = MessageOptions::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            7 => mo.map_entry = Some(decode_varint(&mut buf)? != 0),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(mo)
}

fn decode_file_options(data: &[u8]) -> Result<FileOptions, Error> {
    let mut buf = data;
    let mut fo = FileOptions::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => fo.java_package = Some(decode_string(&mut buf)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(fo)
}

fn decode_source_code_info(data: &[u8]) -> Result<SourceCodeInfo, Error> {
    let mut buf = data;
    let mut sci = SourceCodeInfo::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => sci.location.push(decode_location(read_length_delimited(&mut buf)?)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(sci)
}

fn decode_location(data: &[u8]) -> Result<Location, Error> {
    let mut buf = data;
    let mut loc = Location::default();

    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(&mut buf)?;
        match field_number {
            1 => {
                // `path` is a packed repeated int32.
                let chunk = read_length_delimited(&mut buf)?;
                let mut inner = chunk;
                while inner.has_remaining() {
                    loc.path.push(decode_varint(&mut inner)? as i32);
                }
            }
            3 => loc.leading_comments = Some(decode_string(&mut buf)?),
            4 => loc.trailing_comments = Some(decode_string(&mut buf)?),
            6 => loc.leading_detached_comments.push(decode_string(&mut buf)?),
            _ => skip_field(&mut buf, wire_type)?,
        }
    }

    Ok(loc)
}

/// Decode a field key (tag number + wire type).
fn decode_key(buf: &mut &[u8]) -> Result<(u32, WireType), Error> {
    let key = decode_varint(buf)?;
    let wire_type = WireType::try_from((key & 0x07) as u8)?;
    let field_number = (key >> 3) as u32;
    Ok((field_number, wire_type))
}

/// Decode a varint (LEB128) with an iteration limit to reject malformed
/// input instead of looping forever.
fn decode_varint(buf: &mut &[u8]) -> Result<u64, Error> {
    let mut result: u64 = 0;
    let mut shift = 0;

    for i in 0..MAX_VARINT_BYTES {
        if !buf.has_remaining() {
            return Err(Error::UnexpectedEof);
        }
        let byte = buf.get_u8();

        if shift == 63 && (byte & 0x7E) != 0 {
            return Err(Error::InvalidVarint);
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;

        if i == MAX_VARINT_BYTES - 1 {
            return Err(Error::InvalidVarint);
        }
    }

    Err(Error::InvalidVarint)
}

/// Decode a length value and validate it is within bounds and available.
fn decode_len(buf: &mut &[u8]) -> Result<usize, Error> {
    let len = decode_varint(buf)?;
    if len > MAX_MESSAGE_SIZE as u64 {
        return Err(Error::DecodeError("message size exceeds maximum".into()));
    }
    let len = len as usize;
    if buf.remaining() < len {
        return Err(Error::UnexpectedEof);
    }
    Ok(len)
}

/// Read and advance past a length-delimited field, returning its payload.
fn read_length_delimited<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], Error> {
    let len = decode_len(buf)?;
    let data = &buf[..len];
    buf.advance(len);
    Ok(data)
}

fn decode_string(buf: &mut &[u8]) -> Result<String, Error> {
    let data = read_length_delimited(buf)?;
    std::str::from_utf8(data).map(str::to_string).map_err(|_| Error::InvalidUtf8)
}

/// Skip a field based on its wire type.
fn skip_field(buf: &mut &[u8], wire_type: WireType) -> Result<(), Error> {
    match wire_type {
        WireType::Varint => {
            decode_varint(buf)?;
        }
        WireType::I64 => {
            if buf.remaining() < 8 {
                return Err(Error::UnexpectedEof);
            }
            buf.advance(8);
        }
        WireType::Len => {
            let len = decode_len(buf)?;
            buf.advance(len);
        }
        WireType::I32 => {
            if buf.remaining() < 4 {
                return Err(Error::UnexpectedEof);
            }
            buf.advance(4);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_varint_roundtrips() {
        let mut buf: &[u8] = &[0x01];
        assert_eq!(decode_varint(&mut buf).unwrap(), 1);

        let mut buf: &[u8] = &[0xAC, 0x02];
        assert_eq!(decode_varint(&mut buf).unwrap(), 300);

        let mut buf: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert_eq!(decode_varint(&mut buf).unwrap(), u64::MAX);
    }

    #[test]
    fn decode_varint_rejects_overflow_and_truncation() {
        let mut buf: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(decode_varint(&mut buf), Err(Error::InvalidVarint)));

        let mut buf: &[u8] = &[0x80];
        assert!(matches!(decode_varint(&mut buf), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn decode_string_rejects_invalid_utf8() {
        let mut buf: &[u8] = &[0x02, 0xFF, 0xFE];
        assert!(matches!(decode_string(&mut buf), Err(Error::InvalidUtf8)));
    }

    #[test]
    fn decode_string_rejects_truncated_input() {
        let mut buf: &[u8] = &[0x05, b'h', b'i'];
        assert!(matches!(decode_string(&mut buf), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn decode_len_rejects_oversized_message() {
        let mut buf: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(matches!(decode_len(&mut buf), Err(Error::DecodeError(_))));
    }

    #[test]
    fn decode_key_splits_tag_and_wire_type() {
        let mut buf: &[u8] = &[0x08];
        let (field, wire) = decode_key(&mut buf).unwrap();
        assert_eq!(field, 1);
        assert_eq!(wire, WireType::Varint);

        let mut buf: &[u8] = &[0x12];
        let (field, wire) = decode_key(&mut buf).unwrap();
        assert_eq!(field, 2);
        assert_eq!(wire, WireType::Len);
    }

    #[test]
    fn decode_empty_file_descriptor_set() {
        let fds = decode_file_descriptor_set(&[]).unwrap();
        assert!(fds.file.is_empty());
    }

    #[test]
    fn decode_location_path_is_packed_varints() {
        // path = [4, 0, 2, 1], leading_comments omitted.
        let path_bytes: Vec<u8> = vec![4, 0, 2, 1];
        let mut data = Vec::new();
        data.push(0x0A); // field 1, wire type 2 (len)
        data.push(path_bytes.len() as u8);
        data.extend_from_slice(&path_bytes);
        let loc = decode_location(&data).unwrap();
        assert_eq!(loc.path, vec![4, 0, 2, 1]);
    }
}

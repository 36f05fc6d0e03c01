use std::io::{self, BufReader, ErrorKind, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    attributes::{Attributes, CodeAttribute, ExceptionTableEntry},
    class_file::{FieldInfo, MethodInfo},
    constant_pool::{ConstantTag, CpInfo},
};

use super::*;

type Endian = BigEndian;

pub const MAGIC: u32 = 0xCAFEBABE;

/// Tracks how many bytes have been pulled out of the underlying reader so
/// failures can name the offset they happened at.
struct Counted<R> {
    inner: R,
    position: u64,
}
impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Forward-only big-endian reader over a class file (or an attribute payload).
pub struct Parser<R> {
    r: Counted<BufReader<R>>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: Counted {
                inner: BufReader::new(r),
                position: 0,
            },
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.r.position
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.read_fixed(interfaces.len() * 2, |r| {
            r.read_u16_into::<Endian>(&mut interfaces)
        })?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        log::debug!(
            "parsed class file v{}.{}: {} constant pool slot(s), {} field(s), {} method(s), {} byte(s)",
            major_version,
            minor_version,
            constant_pool.len(),
            fields.len(),
            methods.len(),
            self.position()
        );

        Ok(ClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<u32> {
        match self.read_u32()? {
            MAGIC => Ok(MAGIC),
            magic_identifier => Err(ClassFileError::BadMagic(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        // Long and Double take two slots, the second one is never written.
        let slots = (constant_pool_count as usize).saturating_sub(1);
        let mut used = 0;
        let mut res = Vec::with_capacity(slots);
        while used < slots {
            let cp_info = self.parse_cp_info()?;
            log::trace!("constant pool #{}: {:?}", used + 1, cp_info.tag());
            used += cp_info.tag().slot_size();
            res.push(cp_info);
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<CpInfo> {
        let offset = self.position();
        let tag = self.read_u8()?;
        let tag = ConstantTag::try_from(tag)
            .map_err(|tag| ClassFileError::UnknownConstantTag { tag, offset })?;

        let info = match tag.payload_len() {
            Some(length) => self.read_bytes(length)?,
            None => {
                let length = self.read_u16()?;
                let mut info = Vec::with_capacity(2 + length as usize);
                info.extend_from_slice(&length.to_be_bytes());
                info.extend(self.read_bytes(length as usize)?);
                info
            }
        };

        CpInfo::new(tag, info)
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self
            .read_bytes(attribute_length as usize)
            .map_err(|e| match e {
                ClassFileError::TruncatedInput { offset, .. } => {
                    ClassFileError::TruncatedAttribute {
                        name_index: attribute_name_index,
                        length: attribute_length,
                        offset,
                    }
                }
                e => e,
            })?;

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    pub fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.r).take(n as u64).read_to_end(&mut bytes)?;
        if bytes.len() < n {
            return Err(ClassFileError::TruncatedInput {
                offset: self.position(),
                needed: n - bytes.len(),
            });
        }
        Ok(bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_fixed(4, |r| r.read_u32::<Endian>())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_fixed(2, |r| r.read_u16::<Endian>())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_fixed(1, |r| r.read_u8())
    }

    fn read_fixed<T>(
        &mut self,
        width: usize,
        read: impl FnOnce(&mut Counted<BufReader<R>>) -> io::Result<T>,
    ) -> Result<T> {
        let start = self.position();
        read(&mut self.r).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => ClassFileError::TruncatedInput {
                offset: self.position(),
                needed: width - (self.position() - start) as usize,
            },
            _ => e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let mut parser = Parser::new(&[0x12, 0x34, 0xCA, 0xFE, 0xBA, 0xBE, 0x7F][..]);

        assert_eq!(0x1234, parser.read_u16().unwrap());
        assert_eq!(0xCAFEBABE, parser.read_u32().unwrap());
        assert_eq!(0x7F, parser.read_u8().unwrap());
        assert_eq!(7, parser.position());
    }

    #[test]
    fn u16_and_u32_survive_encoding() {
        for x in [0u16, 1, 0x00FF, 0xFF00, 0x7FFF, u16::MAX] {
            assert_eq!(x, Parser::new(&x.to_be_bytes()[..]).read_u16().unwrap());
        }
        for x in [0u32, 1, 0xDEAD_BEEF, 0x0001_0000, u32::MAX] {
            assert_eq!(x, Parser::new(&x.to_be_bytes()[..]).read_u32().unwrap());
        }
    }

    #[test]
    fn short_read_is_truncated_input() {
        let mut parser = Parser::new(&[0x00, 0x01, 0x02][..]);

        assert!(matches!(
            parser.read_u32(),
            Err(ClassFileError::TruncatedInput {
                offset: 3,
                needed: 1
            })
        ));
    }

    #[test]
    fn read_bytes_reports_missing_count() {
        let mut parser = Parser::new(&[1, 2, 3][..]);

        assert_eq!(vec![1, 2], parser.read_bytes(2).unwrap());
        assert!(matches!(
            parser.read_bytes(4),
            Err(ClassFileError::TruncatedInput {
                offset: 3,
                needed: 3
            })
        ));
    }

    #[test]
    fn bad_magic_stops_after_four_bytes() {
        let mut parser = Parser::new(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x34][..]);

        assert!(matches!(
            parser.parse(),
            Err(ClassFileError::BadMagic(0xDEADBEEF))
        ));
        assert_eq!(4, parser.position());
    }

    #[test]
    fn unknown_constant_tag_is_fatal() {
        let bytes = [
            0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34, // header
            0x00, 0x02, // one entry
            0x02, // no such tag
        ];

        assert!(matches!(
            Parser::new(&bytes[..]).parse(),
            Err(ClassFileError::UnknownConstantTag { tag: 2, offset: 10 })
        ));
    }
}

use std::{borrow::Cow, fmt};

use crate::{parser::Parser, ClassFileError, ConstantPool, Result};

/// A named, length-prefixed attribute whose payload is left uninterpreted.
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl Attribute {
    pub fn attribute_length(&self) -> u32 {
        self.info.len() as u32
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.attribute_name_index)
    }

    /// Reads the payload with the `Code` layout. Any read past the end of the
    /// payload is reported as `TruncatedAttribute`.
    pub fn to_code_attribute(&self) -> Result<CodeAttribute> {
        Parser::new(&self.info[..])
            .parse_code_attribute()
            .map_err(|e| match e {
                ClassFileError::TruncatedInput { offset, .. } => {
                    ClassFileError::TruncatedAttribute {
                        name_index: self.attribute_name_index,
                        length: self.attribute_length(),
                        offset,
                    }
                }
                e => e,
            })
    }

    /// Reads the payload as a single constant pool index, the layout shared by
    /// `ConstantValue`, `SourceFile` and a few others.
    pub fn to_index(&self) -> Result<u16> {
        match self.info[..] {
            [hi, lo, ..] => Ok(u16::from_be_bytes([hi, lo])),
            _ => Err(ClassFileError::TruncatedAttribute {
                name_index: self.attribute_name_index,
                length: self.attribute_length(),
                offset: self.info.len() as u64,
            }),
        }
    }
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    /// First attribute called `name`. Fails if any attribute before it has a
    /// name that does not resolve to a `Utf8` entry.
    pub fn find_by_name(
        &self,
        name: &str,
        constant_pool: &ConstantPool,
    ) -> Result<Option<&Attribute>> {
        for attribute in &self.0 {
            if attribute.name(constant_pool)? == name {
                return Ok(Some(attribute));
            }
        }
        Ok(None)
    }

    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        self.find_by_name("Code", constant_pool)?
            .map(Attribute::to_code_attribute)
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }
}

#[derive(Debug, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero for a handler that catches everything (`finally`).
    pub catch_type: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

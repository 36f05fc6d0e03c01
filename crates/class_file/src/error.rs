use thiserror::Error;

use crate::constant_pool::ConstantTag;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    BadMagic(u32),
    #[error("Truncated input at offset {offset}: {needed} more byte(s) required")]
    TruncatedInput { offset: u64, needed: usize },
    #[error("Unknown constant pool tag {tag} at offset {offset}")]
    UnknownConstantTag { tag: u8, offset: u64 },
    #[error("Constant pool index {index} out of range 1..={len}")]
    InvalidConstantPoolIndex { index: u16, len: usize },
    #[error("Constant pool index {0} is the unusable second slot of a Long or Double")]
    UnusableConstantPoolSlot(u16),
    #[error("Constant pool entry #{0} is not valid modified UTF-8")]
    InvalidModifiedUtf8(u16),
    #[error("Constant pool entry #{index}: expected {expected}, found {found:?}")]
    TypeMismatch {
        index: u16,
        expected: &'static str,
        found: ConstantTag,
    },
    #[error("Attribute (name #{name_index}) declares {length} bytes, payload ends early at offset {offset}")]
    TruncatedAttribute {
        name_index: u16,
        length: u32,
        offset: u64,
    },
}

use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};
use cesu8::Cesu8DecodingError;

use super::ConstantTag;

/// Interpretation of a constant pool payload as one kind of entry.
///
/// `from_info` is only called after `accepts` returned true for the entry's
/// tag, and `CpInfo::new` guarantees the payload is long enough for that tag.
pub trait CpView<'a>: Sized {
    const EXPECTED: &'static str;

    fn accepts(tag: ConstantTag) -> bool;

    fn from_info(info: &'a [u8]) -> Self;
}

fn u16_at(info: &[u8], at: usize) -> u16 {
    BigEndian::read_u16(&info[at..])
}

macro_rules! single_tag_view {
    ($ty:ident, $tag:ident) => {
        impl<'a> CpView<'a> for $ty {
            const EXPECTED: &'static str = stringify!($tag);

            fn accepts(tag: ConstantTag) -> bool {
                tag == ConstantTag::$tag
            }

            fn from_info(info: &'a [u8]) -> Self {
                Self::read(info)
            }
        }
    };
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Utf8Info<'a> {
    bytes: &'a [u8],
}
impl<'a> Utf8Info<'a> {
    /// Declared length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Exactly `len()` bytes, regardless of what follows them in the payload.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decodes the bytes as Java's modified UTF-8: `NUL` is `C0 80` and
    /// supplementary characters are surrogate pairs of three bytes each.
    pub fn to_str(&self) -> Result<Cow<'a, str>, Cesu8DecodingError> {
        cesu8::from_java_cesu8(self.bytes)
    }
}
impl<'a> CpView<'a> for Utf8Info<'a> {
    const EXPECTED: &'static str = "Utf8";

    fn accepts(tag: ConstantTag) -> bool {
        tag == ConstantTag::Utf8
    }

    fn from_info(info: &'a [u8]) -> Self {
        let length = u16_at(info, 0) as usize;
        Self {
            bytes: &info[2..2 + length],
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ClassInfo {
    // The constant_pool entry at name_index must be a CONSTANT_Utf8_info
    // structure representing a binary class or interface name in internal form.
    pub name_index: u16,
}
impl ClassInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            name_index: u16_at(info, 0),
        }
    }
}
single_tag_view!(ClassInfo, Class);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StringInfo {
    pub string_index: u16,
}
impl StringInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            string_index: u16_at(info, 0),
        }
    }
}
single_tag_view!(StringInfo, String);

/// Shared by `Fieldref`, `Methodref` and `InterfaceMethodref`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}
impl<'a> CpView<'a> for RefInfo {
    const EXPECTED: &'static str = "FieldRef, MethodRef or InterfaceMethodRef";

    fn accepts(tag: ConstantTag) -> bool {
        matches!(
            tag,
            ConstantTag::FieldRef | ConstantTag::MethodRef | ConstantTag::InterfaceMethodRef
        )
    }

    fn from_info(info: &'a [u8]) -> Self {
        Self {
            class_index: u16_at(info, 0),
            name_and_type_index: u16_at(info, 2),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}
impl NameAndTypeInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            name_index: u16_at(info, 0),
            descriptor_index: u16_at(info, 2),
        }
    }
}
single_tag_view!(NameAndTypeInfo, NameAndType);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct IntegerInfo(pub i32);
impl IntegerInfo {
    fn read(info: &[u8]) -> Self {
        Self(BigEndian::read_i32(info))
    }
}
single_tag_view!(IntegerInfo, Integer);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FloatInfo(pub f32);
impl FloatInfo {
    fn read(info: &[u8]) -> Self {
        Self(BigEndian::read_f32(info))
    }
}
single_tag_view!(FloatInfo, Float);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct LongInfo(pub i64);
impl LongInfo {
    fn read(info: &[u8]) -> Self {
        Self(BigEndian::read_i64(info))
    }
}
single_tag_view!(LongInfo, Long);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DoubleInfo(pub f64);
impl DoubleInfo {
    fn read(info: &[u8]) -> Self {
        Self(BigEndian::read_f64(info))
    }
}
single_tag_view!(DoubleInfo, Double);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}
impl MethodHandleInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            reference_kind: info[0],
            reference_index: u16_at(info, 1),
        }
    }
}
single_tag_view!(MethodHandleInfo, MethodHandle);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
impl MethodTypeInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            descriptor_index: u16_at(info, 0),
        }
    }
}
single_tag_view!(MethodTypeInfo, MethodType);

/// Shared by `Dynamic` and `InvokeDynamic`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}
impl<'a> CpView<'a> for DynamicInfo {
    const EXPECTED: &'static str = "Dynamic or InvokeDynamic";

    fn accepts(tag: ConstantTag) -> bool {
        matches!(tag, ConstantTag::Dynamic | ConstantTag::InvokeDynamic)
    }

    fn from_info(info: &'a [u8]) -> Self {
        Self {
            bootstrap_method_attr_index: u16_at(info, 0),
            name_and_type_index: u16_at(info, 2),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ModuleInfo {
    pub name_index: u16,
}
impl ModuleInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            name_index: u16_at(info, 0),
        }
    }
}
single_tag_view!(ModuleInfo, Module);

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PackageInfo {
    pub name_index: u16,
}
impl PackageInfo {
    fn read(info: &[u8]) -> Self {
        Self {
            name_index: u16_at(info, 0),
        }
    }
}
single_tag_view!(PackageInfo, Package);

mod view;

use std::borrow::Cow;

pub use self::view::{
    ClassInfo, CpView, DoubleInfo, DynamicInfo, FloatInfo, IntegerInfo, LongInfo,
    MethodHandleInfo, MethodTypeInfo, ModuleInfo, NameAndTypeInfo, PackageInfo, RefInfo,
    StringInfo, Utf8Info,
};
use crate::{ClassFileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}
impl ConstantTag {
    /// Size of the payload following the tag byte, or `None` for `Utf8` whose
    /// payload is a two byte length followed by that many bytes.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            ConstantTag::Utf8 => None,
            ConstantTag::Class
            | ConstantTag::String
            | ConstantTag::MethodType
            | ConstantTag::Module
            | ConstantTag::Package => Some(2),
            ConstantTag::MethodHandle => Some(3),
            ConstantTag::Integer
            | ConstantTag::Float
            | ConstantTag::FieldRef
            | ConstantTag::MethodRef
            | ConstantTag::InterfaceMethodRef
            | ConstantTag::NameAndType
            | ConstantTag::Dynamic
            | ConstantTag::InvokeDynamic => Some(4),
            ConstantTag::Long | ConstantTag::Double => Some(8),
        }
    }

    /// Number of constant pool slots an entry with this tag occupies.
    pub fn slot_size(self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}
impl TryFrom<u8> for ConstantTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ConstantTag::Utf8),
            3 => Ok(ConstantTag::Integer),
            4 => Ok(ConstantTag::Float),
            5 => Ok(ConstantTag::Long),
            6 => Ok(ConstantTag::Double),
            7 => Ok(ConstantTag::Class),
            8 => Ok(ConstantTag::String),
            9 => Ok(ConstantTag::FieldRef),
            10 => Ok(ConstantTag::MethodRef),
            11 => Ok(ConstantTag::InterfaceMethodRef),
            12 => Ok(ConstantTag::NameAndType),
            15 => Ok(ConstantTag::MethodHandle),
            16 => Ok(ConstantTag::MethodType),
            17 => Ok(ConstantTag::Dynamic),
            18 => Ok(ConstantTag::InvokeDynamic),
            19 => Ok(ConstantTag::Module),
            20 => Ok(ConstantTag::Package),
            _ => Err(value),
        }
    }
}

/// A constant pool record as it appears in the file: its tag and the raw
/// payload that follows it. Typed access goes through [`ConstantPool::view`].
#[derive(Debug, PartialEq, Clone)]
pub struct CpInfo {
    tag: ConstantTag,
    info: Vec<u8>,
}
impl CpInfo {
    /// Fails with `TruncatedInput` if `info` is shorter than `tag` requires.
    /// Longer payloads are accepted, the views only look at the declared bytes.
    pub fn new(tag: ConstantTag, info: Vec<u8>) -> Result<Self> {
        let required = match tag.payload_len() {
            Some(len) => len,
            None if info.len() < 2 => 2,
            None => 2 + u16::from_be_bytes([info[0], info[1]]) as usize,
        };
        if info.len() < required {
            return Err(ClassFileError::TruncatedInput {
                offset: info.len() as u64,
                needed: required - info.len(),
            });
        }

        Ok(Self { tag, info })
    }

    pub fn tag(&self) -> ConstantTag {
        self.tag
    }

    pub fn info(&self) -> &[u8] {
        &self.info
    }
}

/// The 1-indexed constant pool. Slot `i` lives at `cp_infos[i - 1]`; the
/// slot following a Long or Double is `None`.
#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<Option<CpInfo>>,
}
impl ConstantPool {
    pub fn new(entries: Vec<CpInfo>) -> Self {
        let mut cp_infos = Vec::with_capacity(entries.len());
        for cp_info in entries {
            let slot_size = cp_info.tag.slot_size();
            cp_infos.push(Some(cp_info));
            (1..slot_size).for_each(|_| cp_infos.push(None));
        }
        Self { cp_infos }
    }

    /// Number of slots, which is `constant_pool_count - 1` for a parsed pool.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        let slot = (index as usize)
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i))
            .ok_or(ClassFileError::InvalidConstantPoolIndex {
                index,
                len: self.len(),
            })?;

        slot.as_ref()
            .ok_or(ClassFileError::UnusableConstantPoolSlot(index))
    }

    /// Interprets the entry at `index` as `V`, failing with `TypeMismatch` if
    /// its tag is not one `V` accepts. Indices inside the view are returned
    /// as-is, never followed.
    pub fn view<'a, V: CpView<'a>>(&'a self, index: u16) -> Result<V> {
        let cp_info = self.get(index)?;
        if !V::accepts(cp_info.tag) {
            return Err(ClassFileError::TypeMismatch {
                index,
                expected: V::EXPECTED,
                found: cp_info.tag,
            });
        }

        Ok(V::from_info(&cp_info.info))
    }

    pub fn utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        self.view::<Utf8Info>(index)?
            .to_str()
            .map_err(|_| ClassFileError::InvalidModifiedUtf8(index))
    }

    /// Binary name of the `Class` entry at `index`, e.g. `java/lang/Object`.
    pub fn class_name(&self, index: u16) -> Result<Cow<'_, str>> {
        let ClassInfo { name_index } = self.view(index)?;
        self.utf8(name_index)
    }

    /// Usable slots with their 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|cp_info| (i as u16 + 1, cp_info)))
    }
}

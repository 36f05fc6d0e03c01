use std::{borrow::Cow, io::Read};

use crate::{attributes::Attributes, parser::Parser, AccessFlags, ConstantPool, Result};

#[derive(Debug)]
pub struct ClassFile {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    /// Binary name of the direct superclass, `None` when `super_class` is zero
    /// (only `java/lang/Object` has no superclass).
    pub fn super_class(&self) -> Result<Option<Cow<'_, str>>> {
        if self.super_class == 0 {
            return Ok(None);
        }

        self.constant_pool.class_name(self.super_class).map(Some)
    }

    pub fn class_name(&self) -> Result<Cow<'_, str>> {
        // The constant_pool entry at this_class must be a CONSTANT_Class_info
        // structure representing the class or interface defined by this file.
        self.constant_pool.class_name(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<Cow<'_, str>>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    /// Value of the class-level `SourceFile` attribute, if present.
    pub fn source_file(&self) -> Result<Option<Cow<'_, str>>> {
        self.attributes
            .find_by_name("SourceFile", &self.constant_pool)?
            .map(|a| self.constant_pool.utf8(a.to_index()?))
            .transpose()
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

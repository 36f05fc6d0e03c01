use std::{collections::BTreeSet, fmt::Write as _};

use decaf_class_file::{
    constant_pool::{DoubleInfo, FloatInfo, IntegerInfo, LongInfo, StringInfo},
    ClassFile, ClassFileError, CodeAttribute, ConstantTag, FieldInfo, MethodInfo,
};

use crate::{
    access::{self, CLASS_FLAGS, FIELD_FLAGS, METHOD_FLAGS},
    bytecode::Annotator,
    descriptor::JavaType,
    DescriptorCache, Result,
};

const CONSTRUCTOR: &str = "<init>";
const STATIC_INITIALIZER: &str = "<clinit>";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub indent: String,
    /// Emit the annotated bytecode inside method bodies.
    pub bytecode: bool,
    /// Emit the exception table after the bytecode.
    pub exception_table: bool,
}
impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_owned(),
            bytecode: true,
            exception_table: true,
        }
    }
}

/// A rendered field or method with the imports its types need.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Member {
    pub text: String,
    pub imports: BTreeSet<String>,
}
impl Member {
    fn import(&mut self, java_type: &JavaType) {
        self.imports.extend(java_type.import.clone());
    }
}

/// Renders one class file. Holds the descriptor cache for its constant pool,
/// so members may be rendered from several threads.
pub struct Decompiler<'a> {
    class_file: &'a ClassFile,
    options: RenderOptions,
    descriptors: DescriptorCache,
}
impl<'a> Decompiler<'a> {
    pub fn new(class_file: &'a ClassFile) -> Self {
        Self::with_options(class_file, RenderOptions::default())
    }

    pub fn with_options(class_file: &'a ClassFile, options: RenderOptions) -> Self {
        Self {
            class_file,
            options,
            descriptors: DescriptorCache::new(),
        }
    }

    pub fn descriptors(&self) -> &DescriptorCache {
        &self.descriptors
    }

    pub fn render(&self) -> Result<String> {
        let class_file = self.class_file;
        let mut imports = BTreeSet::new();

        let header = self.render_header(&mut imports)?;

        let mut members = Vec::new();
        for field in &class_file.fields {
            members.push(self.render_field(field)?);
        }
        for method in &class_file.methods {
            members.push(self.render_method(method)?);
        }

        let mut out = String::new();
        for member in &members {
            imports.extend(member.imports.iter().cloned());
        }
        for import in &imports {
            writeln!(out, "import {import};")?;
        }
        if !imports.is_empty() {
            out.push('\n');
        }

        if let Some(source_file) = class_file.source_file()? {
            writeln!(out, "// Compiled from {source_file}")?;
        }
        writeln!(
            out,
            "// class version {}.{}",
            class_file.major_version, class_file.minor_version
        )?;
        writeln!(out, "{header} {{")?;

        let (fields, methods) = members.split_at(class_file.fields.len());
        for field in fields {
            writeln!(out, "{}{}", self.options.indent, field.text)?;
        }
        for method in methods {
            out.push('\n');
            for line in method.text.lines() {
                writeln!(out, "{}{}", self.options.indent, line)?;
            }
        }
        out.push_str("}\n");

        let simple_name = self
            .descriptors
            .class_type(&class_file.constant_pool, class_file.this_class)?
            .name
            .clone();
        Ok(out.replace(CONSTRUCTOR, &simple_name))
    }

    fn render_header(&self, imports: &mut BTreeSet<String>) -> Result<String> {
        let class_file = self.class_file;
        let cp = &class_file.constant_pool;

        let mut header = access::prefix(class_file.access_flags, CLASS_FLAGS, "class")?;
        header.push_str(access::class_kind(class_file.access_flags));

        let this_class = self.descriptors.class_type(cp, class_file.this_class)?;
        imports.extend(this_class.import.clone());
        write!(header, " {}", this_class.name)?;

        if class_file.super_class != 0 {
            let super_class = self.descriptors.class_type(cp, class_file.super_class)?;
            imports.extend(super_class.import.clone());
            write!(header, " extends {}", super_class.name)?;
        }

        if !class_file.interfaces.is_empty() {
            let mut names = Vec::with_capacity(class_file.interfaces.len());
            for &index in &class_file.interfaces {
                let interface = self.descriptors.class_type(cp, index)?;
                imports.extend(interface.import.clone());
                names.push(interface.name.clone());
            }
            write!(header, " implements {}", names.join(", "))?;
        }

        Ok(header)
    }

    pub fn render_field(&self, field: &FieldInfo) -> Result<Member> {
        let class_file = self.class_file;
        let cp = &class_file.constant_pool;
        let mut member = Member::default();

        let name = class_file.field_name(field)?;
        let java_type = self.descriptors.field_type(cp, field.descriptor_index)?;
        member.import(&java_type);

        member.text = access::prefix(field.access_flags, FIELD_FLAGS, "field")?;
        write!(member.text, "{} {}", java_type.name, name)?;

        if let Some(constant_value) = field.attributes.find_by_name("ConstantValue", cp)? {
            let value = self.constant_value(constant_value.to_index()?, &java_type)?;
            write!(member.text, " = {value}")?;
        }
        member.text.push(';');

        log::debug!("field {}: {}", name, member.text);
        Ok(member)
    }

    fn constant_value(&self, index: u16, java_type: &JavaType) -> Result<String> {
        let cp = &self.class_file.constant_pool;

        Ok(match cp.get(index)?.tag() {
            ConstantTag::Integer => {
                let IntegerInfo(value) = cp.view(index)?;
                match java_type.name.as_str() {
                    "boolean" => (value != 0).to_string(),
                    _ => value.to_string(),
                }
            }
            ConstantTag::Float => format!("{}f", cp.view::<FloatInfo>(index)?.0),
            ConstantTag::Long => format!("{}L", cp.view::<LongInfo>(index)?.0),
            ConstantTag::Double => format!("{:?}", cp.view::<DoubleInfo>(index)?.0),
            ConstantTag::String => {
                let StringInfo { string_index } = cp.view(index)?;
                format!("{:?}", cp.utf8(string_index)?)
            }
            found => {
                return Err(ClassFileError::TypeMismatch {
                    index,
                    expected: "Integer, Float, Long, Double or String",
                    found,
                }
                .into())
            }
        })
    }

    pub fn render_method(&self, method: &MethodInfo) -> Result<Member> {
        let class_file = self.class_file;
        let cp = &class_file.constant_pool;
        let mut member = Member::default();

        let name = class_file.method_name(method)?;
        let descriptor = self.descriptors.method_descriptor(cp, method.descriptor_index)?;
        member
            .imports
            .extend(descriptor.imports().map(str::to_owned));

        let code = method.attributes.code_attribute(cp)?;

        if name == STATIC_INITIALIZER {
            member.text.push_str("static {\n");
        } else {
            member.text = access::prefix(method.access_flags, METHOD_FLAGS, "method")?;
            if name != CONSTRUCTOR {
                write!(member.text, "{} ", descriptor.return_type.name)?;
            }
            let parameters = descriptor
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.java_type.name, p.name))
                .collect::<Vec<_>>();
            write!(member.text, "{}({})", name, parameters.join(", "))?;

            if code.is_none() {
                member.text.push_str(";\n");
                log::debug!("method {} has no code", name);
                return Ok(member);
            }
            member.text.push_str(" {\n");
        }

        if let Some(code) = code {
            log::debug!(
                "method {}: {} byte(s) of code, max_stack {}, max_locals {}",
                name,
                code.code.len(),
                code.max_stack,
                code.max_locals
            );
            self.render_body(&code, &mut member)?;
        }
        member.text.push_str("}\n");

        Ok(member)
    }

    fn render_body(&self, code: &CodeAttribute, member: &mut Member) -> Result<()> {
        let indent = &self.options.indent;

        if self.options.bytecode {
            for annotation in Annotator::new(&code.code) {
                writeln!(member.text, "{indent}{annotation}")?;
            }
        }

        if self.options.exception_table {
            for entry in &code.exception_table {
                let catch_type = match entry.catch_type {
                    0 => "any".to_owned(),
                    index => {
                        let java_type = self
                            .descriptors
                            .class_type(&self.class_file.constant_pool, index)?;
                        member.import(&java_type);
                        java_type.name.clone()
                    }
                };
                writeln!(
                    member.text,
                    "{indent}// exception table: {}..{} -> {} catch {}",
                    entry.start_pc, entry.end_pc, entry.handler_pc, catch_type
                )?;
            }
        }

        Ok(())
    }
}

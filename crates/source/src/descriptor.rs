//! Field and method descriptors, decoded into Java type names.
//!
//! Only `I`, `Z`, `V` and `L<binary name>;` are understood. Everything else,
//! including arrays and the remaining primitives, is `UnsupportedDescriptor`.

use crate::{DecompileError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaType {
    /// Name as written in source, e.g. `int` or `String`.
    pub name: String,
    /// Fully qualified name to import, e.g. `java.lang.String`. Types in the
    /// default package and primitives have none.
    pub import: Option<String>,
}
impl JavaType {
    fn primitive(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            import: None,
        }
    }

    /// Type named by a binary class name such as `java/lang/String`.
    pub fn class(binary_name: &str) -> Self {
        match binary_name.rsplit_once('/') {
            Some((_, simple_name)) => Self {
                name: simple_name.to_owned(),
                import: Some(binary_name.replace('/', ".")),
            },
            None => Self {
                name: binary_name.to_owned(),
                import: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Positional name, `param0`, `param1`, ...
    pub name: String,
    pub java_type: JavaType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<Parameter>,
    pub return_type: JavaType,
}
impl MethodDescriptor {
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .map(|p| &p.java_type)
            .chain(std::iter::once(&self.return_type))
            .filter_map(|t| t.import.as_deref())
    }
}

/// Decodes the first type in `input`, returning it and what follows.
fn next_type(input: &str) -> Result<(JavaType, &str)> {
    let unsupported = || DecompileError::UnsupportedDescriptor(input.to_owned());

    match input.as_bytes().first() {
        Some(b'I') => Ok((JavaType::primitive("int"), &input[1..])),
        Some(b'Z') => Ok((JavaType::primitive("boolean"), &input[1..])),
        Some(b'V') => Ok((JavaType::primitive("void"), &input[1..])),
        Some(b'L') => {
            let end = input.find(';').ok_or_else(unsupported)?;
            let binary_name = &input[1..end];
            if binary_name.is_empty() {
                return Err(unsupported());
            }
            Ok((JavaType::class(binary_name), &input[end + 1..]))
        }
        _ => Err(unsupported()),
    }
}

/// Decodes a complete field descriptor. `V` is not a field type.
pub fn field_type(descriptor: &str) -> Result<JavaType> {
    if descriptor.starts_with('V') {
        return Err(DecompileError::UnsupportedDescriptor(descriptor.to_owned()));
    }
    return_type(descriptor)
}

/// Decodes a complete return type: a field type or `V`.
fn return_type(descriptor: &str) -> Result<JavaType> {
    match next_type(descriptor)? {
        (java_type, "") => Ok(java_type),
        _ => Err(DecompileError::UnsupportedDescriptor(descriptor.to_owned())),
    }
}

/// Decodes `(<parameters>)<return type>`.
pub fn method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    let malformed = || DecompileError::MalformedMethodDescriptor(descriptor.to_owned());

    let (mut params, returns) = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .ok_or_else(malformed)?;

    let return_type = return_type(returns)?;

    let mut parameters = Vec::new();
    while !params.is_empty() {
        if params.starts_with('V') {
            return Err(DecompileError::UnsupportedDescriptor(params.to_owned()));
        }
        let (java_type, rest) = next_type(params)?;
        parameters.push(Parameter {
            name: format!("param{}", parameters.len()),
            java_type,
        });
        params = rest;
    }

    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
pub mod constant_pool;
mod error;
mod parser;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use attributes::{Attribute, Attributes, CodeAttribute, ExceptionTableEntry};
pub use constant_pool::{ConstantPool, ConstantTag, CpInfo};
pub use error::ClassFileError;
pub use parser::{Parser, MAGIC};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

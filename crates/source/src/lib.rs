//! Best-effort reconstruction of Java source declarations from a parsed class
//! file: type descriptors, access flags, annotated bytecode and the final text.

pub mod access;
pub mod bytecode;
mod cache;
pub mod descriptor;
mod error;
mod renderer;

use decaf_class_file::ClassFile;

pub use cache::DescriptorCache;
pub use descriptor::{JavaType, MethodDescriptor, Parameter};
pub use error::DecompileError;
pub use renderer::{Decompiler, Member, RenderOptions};

pub type Result<T, E = DecompileError> = std::result::Result<T, E>;

/// Renders `class_file` with the default options.
pub fn decompile(class_file: &ClassFile) -> Result<String> {
    Decompiler::new(class_file).render()
}

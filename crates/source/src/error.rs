use decaf_class_file::ClassFileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecompileError {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
    #[error("Unsupported descriptor: {0:?}")]
    UnsupportedDescriptor(String),
    #[error("Malformed method descriptor: {0:?}")]
    MalformedMethodDescriptor(String),
    #[error("Unrecognized {context} access flag bits: 0x{bits:04X}")]
    UnrecognizedAccessFlagBits { context: &'static str, bits: u16 },
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

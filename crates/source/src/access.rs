//! Access flags to source keywords.
//!
//! Each table is walked in order: a set flag contributes its keyword (if it has
//! one) and is cleared. Whatever is left afterwards is not valid in that
//! position and fails the render.

use decaf_class_file::AccessFlags;

use crate::{DecompileError, Result};

pub type FlagTable = &'static [(AccessFlags, Option<&'static str>)];

pub const CLASS_FLAGS: FlagTable = &[
    (AccessFlags::PUBLIC, Some("public")),
    (AccessFlags::FINAL, Some("final")),
    (AccessFlags::SUPER, None),
    (AccessFlags::INTERFACE, None),
    (AccessFlags::ABSTRACT, Some("abstract")),
    (AccessFlags::SYNTHETIC, Some("/* synthetic */")),
    (AccessFlags::ANNOTATION, None),
    (AccessFlags::ENUM, None),
    (AccessFlags::MODULE, None),
];

pub const FIELD_FLAGS: FlagTable = &[
    (AccessFlags::PUBLIC, Some("public")),
    (AccessFlags::PRIVATE, Some("private")),
    (AccessFlags::PROTECTED, Some("protected")),
    (AccessFlags::STATIC, Some("static")),
    (AccessFlags::FINAL, Some("final")),
    (AccessFlags::VOLATILE, Some("volatile")),
    (AccessFlags::TRANSIENT, Some("transient")),
    (AccessFlags::SYNTHETIC, Some("/* synthetic */")),
    (AccessFlags::ENUM, Some("/* enum */")),
];

pub const METHOD_FLAGS: FlagTable = &[
    (AccessFlags::PUBLIC, Some("public")),
    (AccessFlags::PRIVATE, Some("private")),
    (AccessFlags::PROTECTED, Some("protected")),
    (AccessFlags::STATIC, Some("static")),
    (AccessFlags::FINAL, Some("final")),
    (AccessFlags::SYNCHRONIZED, Some("synchronized")),
    (AccessFlags::BRIDGE, Some("/* bridge */")),
    (AccessFlags::VARARGS, Some("/* varargs */")),
    (AccessFlags::NATIVE, Some("native")),
    (AccessFlags::ABSTRACT, Some("abstract")),
    (AccessFlags::STRICT, Some("strictfp")),
    (AccessFlags::SYNTHETIC, Some("/* synthetic */")),
];

pub fn keywords(
    flags: AccessFlags,
    table: FlagTable,
    context: &'static str,
) -> Result<Vec<&'static str>> {
    let mut remaining = flags;
    let mut keywords = Vec::new();
    for &(flag, keyword) in table {
        if remaining.contains(flag) {
            remaining.remove(flag);
            keywords.extend(keyword);
        }
    }

    if !remaining.is_empty() {
        return Err(DecompileError::UnrecognizedAccessFlagBits {
            context,
            bits: remaining.bits(),
        });
    }

    Ok(keywords)
}

/// `keywords` joined with a trailing space, ready to prefix a declaration.
pub fn prefix(flags: AccessFlags, table: FlagTable, context: &'static str) -> Result<String> {
    Ok(keywords(flags, table, context)?
        .iter()
        .map(|k| format!("{k} "))
        .collect())
}

/// The declaration keyword implied by a class's flags.
pub fn class_kind(flags: AccessFlags) -> &'static str {
    if flags.contains(AccessFlags::MODULE) {
        "module"
    } else if flags.contains(AccessFlags::ANNOTATION) {
        "@interface"
    } else if flags.contains(AccessFlags::INTERFACE) {
        "interface"
    } else if flags.contains(AccessFlags::ENUM) {
        "enum"
    } else {
        "class"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_abstract_class() {
        let flags = AccessFlags::from_bits_truncate(0x0001 | 0x0400);

        assert_eq!(
            vec!["public", "abstract"],
            keywords(flags, CLASS_FLAGS, "class").unwrap()
        );
    }

    #[test]
    fn super_is_silent() {
        assert_eq!(
            "public ",
            prefix(
                AccessFlags::PUBLIC | AccessFlags::SUPER,
                CLASS_FLAGS,
                "class"
            )
            .unwrap()
        );
    }

    #[test]
    fn order_follows_the_table() {
        let flags = AccessFlags::FINAL | AccessFlags::STATIC | AccessFlags::PRIVATE;

        assert_eq!(
            vec!["private", "static", "final"],
            keywords(flags, FIELD_FLAGS, "field").unwrap()
        );
    }

    #[test]
    fn leftover_bits_fail() {
        let flags = AccessFlags::PUBLIC | AccessFlags::PRIVATE;

        assert!(matches!(
            keywords(flags, CLASS_FLAGS, "class"),
            Err(DecompileError::UnrecognizedAccessFlagBits {
                context: "class",
                bits: 0x0002
            })
        ));
        assert!(matches!(
            keywords(AccessFlags::NATIVE, FIELD_FLAGS, "field"),
            Err(DecompileError::UnrecognizedAccessFlagBits { bits: 0x0100, .. })
        ));
    }

    #[test]
    fn aliased_bits_read_per_position() {
        let flags = AccessFlags::from_bits_truncate(0x0020 | 0x0040);

        assert_eq!(
            vec!["synchronized", "/* bridge */"],
            keywords(flags, METHOD_FLAGS, "method").unwrap()
        );
        assert_eq!(
            vec!["volatile"],
            keywords(AccessFlags::from_bits_truncate(0x0040), FIELD_FLAGS, "field").unwrap()
        );
    }

    #[test]
    fn kinds() {
        assert_eq!("class", class_kind(AccessFlags::PUBLIC | AccessFlags::SUPER));
        assert_eq!(
            "interface",
            class_kind(AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
        );
        assert_eq!(
            "@interface",
            class_kind(AccessFlags::INTERFACE | AccessFlags::ANNOTATION)
        );
        assert_eq!("enum", class_kind(AccessFlags::ENUM | AccessFlags::FINAL));
        assert_eq!("module", class_kind(AccessFlags::MODULE));
    }
}

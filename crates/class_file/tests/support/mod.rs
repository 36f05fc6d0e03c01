//! Assembles class files byte by byte for tests.
#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_ABSTRACT: u16 = 0x0400;

#[derive(Default)]
pub struct ClassBuilder {
    pub magic: Option<u32>,
    constant_pool: Vec<u8>,
    slots: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}
impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        let mut builder = Self {
            access_flags: ACC_PUBLIC | ACC_SUPER,
            ..Default::default()
        };
        builder.this_class = builder.class(name);
        builder
    }

    fn push_entry(&mut self, tag: u8, payload: &[u8], slots: u16) -> u16 {
        self.constant_pool.push(tag);
        self.constant_pool.extend_from_slice(payload);
        let index = self.slots + 1;
        self.slots += slots;
        index
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        let mut payload = Vec::new();
        payload.write_u16::<BigEndian>(s.len() as u16).unwrap();
        payload.extend_from_slice(s.as_bytes());
        self.push_entry(1, &payload, 1)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.push_entry(7, &name_index.to_be_bytes(), 1)
    }

    pub fn string(&mut self, s: &str) -> u16 {
        let string_index = self.utf8(s);
        self.push_entry(8, &string_index.to_be_bytes(), 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.push_entry(3, &value.to_be_bytes(), 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.push_entry(5, &value.to_be_bytes(), 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        self.push_entry(6, &value.to_be_bytes(), 2)
    }

    /// An entry taking a single slot. Use `long`/`double` for the wide kinds.
    pub fn raw_entry(&mut self, tag: u8, payload: &[u8]) -> u16 {
        self.push_entry(tag, payload, 1)
    }

    pub fn access_flags(&mut self, access_flags: u16) -> &mut Self {
        self.access_flags = access_flags;
        self
    }

    pub fn super_class(&mut self, name: &str) -> &mut Self {
        self.super_class = self.class(name);
        self
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    /// Attribute bytes (name index, length, payload) ready to attach somewhere.
    pub fn attribute(&mut self, name: &str, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u16::<BigEndian>(self.utf8(name)).unwrap();
        bytes.write_u32::<BigEndian>(payload.len() as u32).unwrap();
        bytes.extend_from_slice(payload);
        bytes
    }

    pub fn code(&mut self, max_stack: u16, max_locals: u16, code: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.write_u16::<BigEndian>(max_stack).unwrap();
        payload.write_u16::<BigEndian>(max_locals).unwrap();
        payload.write_u32::<BigEndian>(code.len() as u32).unwrap();
        payload.extend_from_slice(code);
        payload.write_u16::<BigEndian>(0).unwrap();
        payload.write_u16::<BigEndian>(0).unwrap();
        self.attribute("Code", &payload)
    }

    fn member(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u16::<BigEndian>(access_flags).unwrap();
        bytes.write_u16::<BigEndian>(self.utf8(name)).unwrap();
        bytes.write_u16::<BigEndian>(self.utf8(descriptor)).unwrap();
        bytes.write_u16::<BigEndian>(attributes.len() as u16).unwrap();
        attributes.iter().for_each(|a| bytes.extend_from_slice(a));
        bytes
    }

    pub fn field(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> &mut Self {
        let field = self.member(access_flags, name, descriptor, attributes);
        self.fields.push(field);
        self
    }

    pub fn method(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> &mut Self {
        let method = self.member(access_flags, name, descriptor, attributes);
        self.methods.push(method);
        self
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u32::<BigEndian>(self.magic.unwrap_or(0xCAFEBABE)).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(52).unwrap();
        bytes.write_u16::<BigEndian>(self.slots + 1).unwrap();
        bytes.extend_from_slice(&self.constant_pool);
        bytes.write_u16::<BigEndian>(self.access_flags).unwrap();
        bytes.write_u16::<BigEndian>(self.this_class).unwrap();
        bytes.write_u16::<BigEndian>(self.super_class).unwrap();
        bytes.write_u16::<BigEndian>(self.interfaces.len() as u16).unwrap();
        self.interfaces
            .iter()
            .for_each(|&i| bytes.write_u16::<BigEndian>(i).unwrap());
        for members in [&self.fields, &self.methods, &self.attributes] {
            bytes.write_u16::<BigEndian>(members.len() as u16).unwrap();
            members.iter().for_each(|m| bytes.extend_from_slice(m));
        }
        bytes
    }
}

/// `public class Foo extends Object { public int x; public int getX() { return 0; } }`
pub fn foo_class() -> Vec<u8> {
    let mut builder = ClassBuilder::new("Foo");
    builder
        .super_class("java/lang/Object")
        .field(ACC_PUBLIC, "x", "I", vec![]);
    let init = builder.code(1, 1, &[0x2A, 0xB7, 0x00, 0x01, 0xB1]);
    builder.method(ACC_PUBLIC, "<init>", "()V", vec![init]);
    let get_x = builder.code(1, 1, &[0x03, 0xAC]);
    builder.method(ACC_PUBLIC, "getX", "()I", vec![get_x]);
    builder.build()
}

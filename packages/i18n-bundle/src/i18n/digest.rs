//! Digest Module
//!
//! Computes message ids with the decimal fingerprint digest shared by the
//! XMB and XTB formats.

use crate::i18n::i18n_ast::{self as i18n, visit_all, Message, Visitor};
use std::collections::HashMap;

/// Return the message id or compute it using the XMB/XTB digest.
pub fn decimal_digest(message: &Message) -> String {
    if !message.id.is_empty() {
        message.id.clone()
    } else {
        compute_decimal_digest(message)
    }
}

/// Compute the message id using the XMB/XTB digest.
///
/// Only the message content and its meaning are hashed: description,
/// sources and ICU switch expressions are not. Placeholders take part by
/// position, never by their internal spelling.
pub fn compute_decimal_digest(message: &Message) -> String {
    compute_msg_id(&serialize_for_digest(&message.nodes), &message.meaning)
}

/// Serialize the i18n ast to something xml-like in order to generate an UID.
pub fn serialize_for_digest(nodes: &[i18n::Node]) -> String {
    let mut visitor = SerializerIgnoreIcuExpVisitor::default();
    visit_all(&mut visitor, nodes).join("")
}

/// Serializer visitor that ignores ICU expressions and replaces placeholder
/// names with their first-appearance ordinal.
#[derive(Default)]
struct SerializerIgnoreIcuExpVisitor {
    placeholder_ordinals: HashMap<String, usize>,
}

impl SerializerIgnoreIcuExpVisitor {
    fn ordinal(&mut self, name: &str) -> String {
        let next = self.placeholder_ordinals.len();
        let ordinal = *self
            .placeholder_ordinals
            .entry(name.to_string())
            .or_insert(next);
        format!("#{}", ordinal)
    }

    fn serialize_icu(&mut self, icu: &i18n::Icu) -> String {
        let str_cases: Vec<String> = icu
            .cases
            .iter()
            .map(|(k, v)| format!("{} {{{}}}", k, v.visit(self)))
            .collect();
        // Do not take the expression into account
        format!("{{{}, {}}}", icu.type_, str_cases.join(", "))
    }
}

impl Visitor for SerializerIgnoreIcuExpVisitor {
    type Output = String;

    fn visit_text(&mut self, text: &i18n::Text) -> String {
        text.value.clone()
    }

    fn visit_container(&mut self, container: &i18n::Container) -> String {
        format!("[{}]", visit_all(self, &container.children).join(", "))
    }

    fn visit_icu(&mut self, icu: &i18n::Icu) -> String {
        self.serialize_icu(icu)
    }

    fn visit_tag_placeholder(&mut self, ph: &i18n::TagPlaceholder) -> String {
        let start_name = self.ordinal(&ph.start_name);
        if ph.is_void {
            return format!("<ph tag=\"{}\" name=\"{}\"/>", ph.tag, start_name);
        }
        let children = visit_all(self, &ph.children).join(", ");
        let close_name = self.ordinal(&ph.close_name);
        format!(
            "<ph tag=\"{}\" name=\"{}\">{}</ph name=\"{}\">",
            ph.tag, start_name, children, close_name
        )
    }

    fn visit_placeholder(&mut self, ph: &i18n::Placeholder) -> String {
        let name = self.ordinal(&ph.name);
        if ph.value.is_empty() {
            format!("<ph name=\"{}\"/>", name)
        } else {
            format!("<ph name=\"{}\">{}</ph>", name, ph.value)
        }
    }

    fn visit_icu_placeholder(&mut self, ph: &i18n::IcuPlaceholder) -> String {
        let name = self.ordinal(&ph.name);
        let icu = self.serialize_icu(&ph.value);
        format!("<ph icu name=\"{}\">{}</ph>", name, icu)
    }
}

/// Compute the fingerprint of the given string
///
/// The output is a 64 bit number: the high word is hashed with seed 0, the
/// low word with seed 102072.
pub fn fingerprint(s: &str) -> u64 {
    let utf8 = s.as_bytes();
    let mut hi = hash32(utf8, 0);
    let mut lo = hash32(utf8, 102072);

    if hi == 0 && (lo == 0 || lo == 1) {
        hi ^= 0x130f9bef;
        lo ^= (-0x6b5f56d8_i32) as u32;
    }

    ((hi as u64) << 32) | (lo as u64)
}

/// Compute a message id from the serialized message and its meaning.
pub fn compute_msg_id(msg: &str, meaning: &str) -> String {
    let mut msg_fingerprint = fingerprint(msg);

    if !meaning.is_empty() {
        // Rotate the 64-bit message fingerprint one bit to the left and then add the meaning
        // fingerprint.
        msg_fingerprint = msg_fingerprint.rotate_left(1);
        msg_fingerprint = msg_fingerprint.wrapping_add(fingerprint(meaning));
    }

    (msg_fingerprint & 0x7FFF_FFFF_FFFF_FFFF).to_string()
}

fn hash32(bytes: &[u8], mut c: u32) -> u32 {
    let length = bytes.len();
    let mut a = 0x9e3779b9u32;
    let mut b = 0x9e3779b9u32;
    let mut index = 0;

    while index + 12 <= length {
        a = a.wrapping_add(read_u32_le(bytes, index));
        b = b.wrapping_add(read_u32_le(bytes, index + 4));
        c = c.wrapping_add(read_u32_le(bytes, index + 8));
        (a, b, c) = mix(a, b, c);
        index += 12;
    }

    let remainder = length - index;
    // the first byte of c is reserved for the length
    c = c.wrapping_add(length as u32);

    if remainder >= 4 {
        a = a.wrapping_add(read_u32_le(bytes, index));
        index += 4;

        if remainder >= 8 {
            b = b.wrapping_add(read_u32_le(bytes, index));
            index += 4;

            // Partial 32-bit word for c
            for shift in [8, 16, 24].into_iter().take(remainder - 8) {
                c = c.wrapping_add((bytes[index] as u32) << shift);
                index += 1;
            }
        } else {
            // Partial 32-bit word for b
            for shift in [0, 8, 16].into_iter().take(remainder - 4) {
                b = b.wrapping_add((bytes[index] as u32) << shift);
                index += 1;
            }
        }
    } else {
        // Partial 32-bit word for a
        for shift in [0, 8, 16].into_iter().take(remainder) {
            a = a.wrapping_add((bytes[index] as u32) << shift);
            index += 1;
        }
    }

    mix(a, b, c).2
}

fn mix(mut a: u32, mut b: u32, mut c: u32) -> (u32, u32, u32) {
    a = a.wrapping_sub(b).wrapping_sub(c);
    a ^= c >> 13;
    b = b.wrapping_sub(c).wrapping_sub(a);
    b ^= a << 8;
    c = c.wrapping_sub(a).wrapping_sub(b);
    c ^= b >> 13;
    a = a.wrapping_sub(b).wrapping_sub(c);
    a ^= c >> 12;
    b = b.wrapping_sub(c).wrapping_sub(a);
    b ^= a << 16;
    c = c.wrapping_sub(a).wrapping_sub(b);
    c ^= b >> 5;
    a = a.wrapping_sub(b).wrapping_sub(c);
    a ^= c >> 3;
    b = b.wrapping_sub(c).wrapping_sub(a);
    b ^= a << 10;
    c = c.wrapping_sub(a).wrapping_sub(b);
    c ^= b >> 15;
    (a, b, c)
}

fn read_u32_le(bytes: &[u8], index: usize) -> u32 {
    u32::from_le_bytes([bytes[index], bytes[index + 1], bytes[index + 2], bytes[index + 3]])
}

//! Digest Tests
//!
//! Message ids shared by the XMB and XTB formats.

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod digest_tests {
    use super::utils::*;
    use i18n_bundle::i18n::digest::{
        compute_decimal_digest, compute_msg_id, decimal_digest, serialize_for_digest,
    };

    mod msg_id {
        use super::*;

        #[test]
        fn should_compute_well_known_ids() {
            assert_eq!(compute_msg_id("", ""), "4416290763660062288");
            assert_eq!(compute_msg_id("Hello", ""), "3902961887793684628");
            assert_eq!(compute_msg_id("Hello world!", ""), "3022994926184248873");
            assert_eq!(compute_msg_id("Jalape\u{00f1}o", ""), "8054366208386598941");
        }

        #[test]
        fn should_take_the_meaning_into_account() {
            assert_eq!(compute_msg_id("hello", "meaning"), "3652479489138699077");
            assert_eq!(compute_msg_id("Hello", "greeting"), "5905004912418243898");
        }

        #[test]
        fn should_only_use_positive_ids() {
            for s in ["a", "ab", "abc", "abcdefghijklm", "\u{1F600}"] {
                let id: u64 = compute_msg_id(s, "").parse().unwrap();
                assert!(id < (1 << 63));
            }
        }
    }

    mod message_digest {
        use super::*;

        #[test]
        fn should_return_the_id_when_set() {
            let msg = message_with_id("custom", vec![text("Hello")]);
            assert_eq!(decimal_digest(&msg), "custom");
            assert_eq!(compute_decimal_digest(&msg), "3902961887793684628");
        }

        #[test]
        fn should_compute_the_id_from_content() {
            let msg = message(vec![text("Hi "), ph("NAME", "name"), text("!")]);
            assert_eq!(
                serialize_for_digest(&msg.nodes),
                "Hi <ph name=\"#0\">name</ph>!"
            );
            assert_eq!(decimal_digest(&msg), "2692341710714159203");
        }

        #[test]
        fn should_be_deterministic() {
            let msg = message(vec![text("Hello "), ph("NAME", "name")]);
            assert_eq!(decimal_digest(&msg), decimal_digest(&msg.clone()));
        }

        #[test]
        fn should_ignore_sources_and_description() {
            let a = message_with(vec![text("Save")], "", "A button")
                .with_sources(vec![source("a.html", 1, 1)]);
            let b = message_with(vec![text("Save")], "", "Another description")
                .with_sources(vec![source("b.html", 10, 12)]);
            assert_eq!(decimal_digest(&a), decimal_digest(&b));
        }

        #[test]
        fn should_change_with_text_or_meaning() {
            let base = message(vec![text("Save")]);
            assert_ne!(decimal_digest(&base), decimal_digest(&message(vec![text("Save!")])));
            assert_ne!(
                decimal_digest(&base),
                decimal_digest(&message_with(vec![text("Save")], "verb", ""))
            );
            assert_ne!(
                decimal_digest(&message_with(vec![text("Save")], "verb", "")),
                decimal_digest(&message_with(vec![text("Save")], "noun", ""))
            );
        }

        #[test]
        fn should_not_depend_on_placeholder_spelling() {
            let a = message(vec![text("Hi "), ph("NAME", "name"), text(", "), ph("NAME", "name")]);
            let b = message(vec![
                text("Hi "),
                ph("INTERPOLATION", "name"),
                text(", "),
                ph("INTERPOLATION", "name"),
            ]);
            assert_eq!(decimal_digest(&a), decimal_digest(&b));
        }

        #[test]
        fn should_depend_on_placeholder_positions_and_reuse() {
            let reused = message(vec![ph("A", "x"), ph("A", "x")]);
            let distinct = message(vec![ph("A", "x"), ph("B", "x")]);
            assert_ne!(decimal_digest(&reused), decimal_digest(&distinct));
        }

        #[test]
        fn should_depend_on_tag_placeholder_elements() {
            let bold = message(vec![tag_ph("b", "START_BOLD_TEXT", "CLOSE_BOLD_TEXT", vec![text("x")])]);
            let italic = message(vec![tag_ph("i", "START_BOLD_TEXT", "CLOSE_BOLD_TEXT", vec![text("x")])]);
            assert_ne!(decimal_digest(&bold), decimal_digest(&italic));
            assert_eq!(
                serialize_for_digest(&bold.nodes),
                "<ph tag=\"b\" name=\"#0\">x</ph name=\"#1\">"
            );
        }

        #[test]
        fn should_serialize_void_tag_placeholders() {
            let msg = message(vec![text("a"), void_tag_ph("br", "LINE_BREAK"), text("b")]);
            assert_eq!(
                serialize_for_digest(&msg.nodes),
                "a<ph tag=\"br\" name=\"#0\"/>b"
            );
        }
    }

    mod icu_digest {
        use super::*;

        fn plural(expression: &str, cases: Vec<(&str, &str)>) -> i18n_bundle::Message {
            let cases = cases
                .into_iter()
                .map(|(k, v)| (k, container(vec![text(v)])))
                .collect();
            message(vec![icu(expression, "plural", cases)])
        }

        #[test]
        fn should_ignore_the_icu_expression() {
            let a = plural("count", vec![("=0", "none"), ("other", "many")]);
            let b = plural("items.length", vec![("=0", "none"), ("other", "many")]);
            assert_eq!(
                serialize_for_digest(&a.nodes),
                "{plural, =0 {[none]}, other {[many]}}"
            );
            assert_eq!(decimal_digest(&a), "1464785570676666662");
            assert_eq!(decimal_digest(&a), decimal_digest(&b));
        }

        #[test]
        fn should_depend_on_case_order() {
            let a = plural("count", vec![("=0", "none"), ("other", "many")]);
            let b = plural("count", vec![("other", "many"), ("=0", "none")]);
            assert_ne!(decimal_digest(&a), decimal_digest(&b));
        }

        #[test]
        fn should_serialize_icu_placeholders_without_expression() {
            let value = icu_value("gender", "select", vec![("male", text("he")), ("other", text("they"))]);
            let msg = message(vec![icu_ph("ICU", value)]);
            assert_eq!(
                serialize_for_digest(&msg.nodes),
                "<ph icu name=\"#0\">{select, male {he}, other {they}}</ph>"
            );
        }
    }
}

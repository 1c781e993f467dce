//! XMB Serializer Tests

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod xmb_tests {
    use super::utils::*;
    use i18n_bundle::i18n::serializers::xmb::{
        xmb_load_to_xml, xmb_write, xmb_write_with_config, DOCTYPE,
    };
    use i18n_bundle::i18n::serializers::xml_helper as xml;
    use i18n_bundle::{BundleConfig, Message};

    const XMB_PREFIX: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<!DOCTYPE messagebundle [\n";

    fn write(messages: &[Message]) -> String {
        xmb_write(messages, None, &[])
    }

    /// The serialized `msg` elements, one per line.
    fn msg_lines(xmb: &str) -> Vec<String> {
        xmb.lines()
            .map(str::trim)
            .filter(|line| line.starts_with("<msg "))
            .map(str::to_string)
            .collect()
    }

    mod document {
        use super::*;

        #[test]
        fn should_write_a_single_message() {
            init_tracing();
            let xmb = write(&[message_with_id("m1", vec![text("Hello")])]);
            let expected = format!(
                "{}{}\n]>\n<messagebundle>\n  <msg id=\"m1\">Hello</msg>\n</messagebundle>\n",
                XMB_PREFIX, DOCTYPE
            );
            assert_eq!(xmb, expected);
        }

        #[test]
        fn should_start_with_the_declaration_and_doctype() {
            let xmb = write(&[]);
            assert!(xmb.starts_with(XMB_PREFIX));
            assert!(xmb.contains("<!ELEMENT messagebundle (msg)*>\n<!ATTLIST messagebundle class CDATA #IMPLIED>\n"));
            assert!(xmb.contains("<!ATTLIST msg xml:space (default|preserve) \"default\">\n"));
            assert!(xmb.contains("<!ATTLIST ph name CDATA #REQUIRED>\n\n<!ELEMENT ex (#PCDATA)>\n]>\n"));
            assert!(xmb.ends_with("<messagebundle>\n</messagebundle>\n"));
        }

        #[test]
        fn should_write_messages_in_order() {
            let xmb = write(&[
                message_with_id("b", vec![text("second")]),
                message_with_id("a", vec![text("first")]),
            ]);
            assert_eq!(
                msg_lines(&xmb),
                vec!["<msg id=\"b\">second</msg>", "<msg id=\"a\">first</msg>"]
            );
        }

        #[test]
        fn should_write_description_meaning_and_sources() {
            let msg = message_with(vec![text("Save & quit")], "verb", "Button \"label\"")
                .with_id("1")
                .with_sources(vec![source("app.html", 10, 10), source("menu.html", 2, 4)]);
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec![
                    "<msg id=\"1\" desc=\"Button &quot;label&quot;\" meaning=\"verb\">\
                     <source>app.html:10</source><source>menu.html:2,4</source>\
                     Save &amp; quit</msg>"
                ]
            );
        }

        #[test]
        fn should_write_root_attributes_from_the_config() {
            let mut config = BundleConfig::default();
            config.root_attrs.insert("class".to_string(), "app".to_string());
            let xmb = xmb_write_with_config(&[], None, &[], &config);
            assert!(xmb.contains("\n<messagebundle class=\"app\">\n</messagebundle>\n"));
        }
    }

    mod placeholders {
        use super::*;

        #[test]
        fn should_write_placeholders_with_examples() {
            let msg = message_with_id("1", vec![text("Hi "), ph("INTERPOLATION", "user.name")]);
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec!["<msg id=\"1\">Hi <ph name=\"INTERPOLATION\"><ex>{{user.name}}</ex></ph></msg>"]
            );
        }

        #[test]
        fn should_wrap_tag_placeholder_children() {
            let msg = message_with_id(
                "1",
                vec![tag_ph("b", "START_BOLD_TEXT", "CLOSE_BOLD_TEXT", vec![text("bold")])],
            );
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec![
                    "<msg id=\"1\"><ph name=\"START_BOLD_TEXT\"><ex>&lt;b&gt;</ex></ph>bold\
                     <ph name=\"CLOSE_BOLD_TEXT\"><ex>&lt;/b&gt;</ex></ph></msg>"
                ]
            );
        }

        #[test]
        fn should_not_close_void_tag_placeholders() {
            let msg = message_with_id("1", vec![text("a"), void_tag_ph("br", "LINE_BREAK"), text("b")]);
            let xmb = write(&[msg]);
            assert_eq!(
                msg_lines(&xmb),
                vec!["<msg id=\"1\">a<ph name=\"LINE_BREAK\"><ex>&lt;br&gt;</ex></ph>b</msg>"]
            );
            assert!(!xmb.contains("&lt;/br&gt;"));
        }

        #[test]
        fn should_map_placeholder_names_to_public_names() {
            let msg = message_with_id("1", vec![ph("interp-1", "a"), ph("INTERP_1", "b")]);
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec![
                    "<msg id=\"1\"><ph name=\"INTERP_1\"><ex>{{a}}</ex></ph>\
                     <ph name=\"INTERP_1_1\"><ex>{{b}}</ex></ph></msg>"
                ]
            );
        }

        #[test]
        fn should_give_every_placeholder_an_example() {
            let msg = message_with_id(
                "1",
                vec![
                    ph("EMPTY", ""),
                    tag_ph("span", "START_TAG_SPAN", "CLOSE_TAG_SPAN", vec![ph("INNER", "x")]),
                    void_tag_ph("img", "TAG_IMG"),
                    icu_ph("ICU", icu_value("n", "plural", vec![("other", text("x"))])),
                ],
            );
            let xmb = write(&[msg]);
            assert_eq!(xmb.matches("<ph ").count(), 6);
            assert_eq!(xmb.matches("<ph ").count(), xmb.matches("<ex>").count());
            assert!(!xmb.contains("<ex></ex>"));
            assert!(!xmb.contains("\"/>"));
        }
    }

    mod icu {
        use super::*;

        #[test]
        fn should_write_icu_expressions_as_text() {
            let mut plural = icu_value(
                "count",
                "plural",
                vec![
                    ("=0", container(vec![text("none")])),
                    ("other", container(vec![ph("INTERPOLATION", "count"), text(" items")])),
                ],
            );
            plural.expression_placeholder = Some("VAR_PLURAL".to_string());
            let msg = message_with_id("1", vec![i18n_bundle::i18n::i18n_ast::Node::Icu(plural)]);
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec![
                    "<msg id=\"1\">{VAR_PLURAL, plural, =0 {none} other {\
                     <ph name=\"INTERPOLATION\"><ex>{{count}}</ex></ph> items} }</msg>"
                ]
            );
        }

        #[test]
        fn should_fall_back_to_the_expression() {
            let msg = message_with_id("1", vec![icu("g", "select", vec![("male", text("he"))])]);
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec!["<msg id=\"1\">{g, select, male {he} }</msg>"]
            );
        }

        #[test]
        fn should_write_icu_placeholders_with_case_labels_only() {
            let value = icu_value(
                "gender",
                "select",
                vec![("male", text("he")), ("female", text("she")), ("other", text("they"))],
            );
            let msg = message_with_id("1", vec![text("by "), icu_ph("ICU", value)]);
            assert_eq!(
                msg_lines(&write(&[msg])),
                vec![
                    "<msg id=\"1\">by <ph name=\"ICU\">\
                     <ex>{gender, select, male {...} female {...} other {...}}</ex></ph></msg>"
                ]
            );
        }
    }

    mod existing_nodes {
        use super::*;

        const EXISTING: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<messagebundle>
  <msg id="old" desc="kept">Old &amp; <ph name="X"/></msg>
  <msg>no id</msg>
</messagebundle>
"#;

        #[test]
        fn should_load_messages_by_id() {
            let existing = xmb_load_to_xml(EXISTING).unwrap();
            assert_eq!(existing.len(), 1);
            assert_eq!(
                xml::serialize(&[existing["old"].clone()]),
                "<msg id=\"old\" desc=\"kept\">Old &amp; <ph name=\"X\"/></msg>"
            );
        }

        #[test]
        fn should_splice_existing_nodes_first() {
            let existing: Vec<xml::Node> = xmb_load_to_xml(EXISTING).unwrap().into_values().collect();
            let xmb = xmb_write(&[message_with_id("new", vec![text("New")])], None, &existing);
            assert!(xmb.ends_with(
                "<messagebundle>\n  <msg id=\"old\" desc=\"kept\">Old &amp; <ph name=\"X\"><ex>X</ex></ph></msg>\n  <msg id=\"new\">New</msg>\n</messagebundle>\n"
            ));
        }

        #[test]
        fn should_use_the_default_example_for_unnamed_placeholders() {
            let existing = vec![xml::Node::from(xml::Tag::element(
                "msg",
                vec![xml::Tag::element("ph", vec![]).into()],
            ))];
            let mut config = BundleConfig::default();
            config.default_example = "???".to_string();
            let xmb = xmb_write_with_config(&[], None, &existing, &config);
            assert!(xmb.contains("<msg><ph><ex>???</ex></ph></msg>"));
        }

        #[test]
        fn should_report_parse_errors() {
            let err = xmb_load_to_xml("<messagebundle><msg id=\"a\">text</messagebundle>").unwrap_err();
            let message = err.to_string();
            assert!(message.starts_with("xmb parse errors:\n"), "{}", message);
            assert!(message.contains("Unexpected closing tag \"messagebundle\""), "{}", message);
        }
    }
}

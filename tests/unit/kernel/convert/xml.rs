use super::*;
use serde_json::{json, Value};

fn as_json(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

#[test]
fn repeated_siblings_coalesce_into_array() {
    let out = xml_to_json("<r><a>1</a><a>2</a></r>").unwrap();
    assert_eq!(as_json(&out), json!({"a": ["1", "2"]}));
}

#[test]
fn later_repeats_append_to_the_array() {
    let out = xml_to_json("<r><a>1</a><b>x</b><a>2</a><a>3</a></r>").unwrap();
    assert_eq!(as_json(&out), json!({"a": ["1", "2", "3"], "b": "x"}));
}

#[test]
fn leaf_text_is_trimmed_and_empty_leaf_is_empty_string() {
    let out = xml_to_json("<r><a>  hi \n</a><b/><c></c></r>").unwrap();
    assert_eq!(as_json(&out), json!({"a": "hi", "b": "", "c": ""}));
}

#[test]
fn attributes_are_not_carried_into_json() {
    let out = xml_to_json(r#"<r id="1"><a kind="k">x</a></r>"#).unwrap();
    assert_eq!(as_json(&out), json!({"a": "x"}));
}

#[test]
fn json_to_xml_wraps_in_root_and_maps_values() {
    let out = json_to_xml(r#"{"a b": 1, "list": [1, null], "s": "x", "t": true}"#).unwrap();
    let expected = "<root>\n  <a_b>1</a_b>\n  <list>\n    <item>1</item>\n    <item>null</item>\n  </list>\n  <s>x</s>\n  <t>true</t>\n</root>";
    assert_eq!(out, expected);
}

#[test]
fn json_to_xml_top_level_array_uses_items() {
    let out = json_to_xml("[1, 2]").unwrap();
    assert_eq!(out, "<root>\n  <item>1</item>\n  <item>2</item>\n</root>");
}

#[test]
fn xml_json_round_trip_is_stable_without_repeats() {
    let docs = [
        "<doc><name>n</name><inner><v>1</v><w/></inner></doc>",
        "<a><b><c><d>deep</d></c></b><e>1.5</e></a>",
    ];
    for doc in docs {
        let first = xml_to_json(doc).unwrap();
        let second = xml_to_json(&json_to_xml(&first).unwrap()).unwrap();
        assert_eq!(as_json(&first), as_json(&second), "doc {doc}");
    }
}

#[test]
fn format_indents_nested_elements() {
    let out = format_xml(r#"<a><b x="1">text</b><c/><d>  </d></a>"#).unwrap();
    assert_eq!(out, "<a>\n  <b x=\"1\">text</b>\n  <c/>\n  <d/>\n</a>");
}

#[test]
fn format_keeps_declaration_and_prolog_comment() {
    let out = format_xml("<?xml version=\"1.0\" encoding=\"UTF-8\"?><!-- hi --><a/>").unwrap();
    assert_eq!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- hi -->\n<a/>");
}

#[test]
fn format_keeps_doctype_instructions_and_trailing_comment() {
    let input = "<?xml version=\"1.0\"?>\n<?xml-stylesheet type=\"text/xsl\" href=\"s.xsl\"?>\n<!DOCTYPE note SYSTEM \"note.dtd\">\n<note><to>A</to><?pi data?></note>\n<!-- trailer -->";

    let out = format_xml(input).unwrap();

    assert_eq!(
        out,
        "<?xml version=\"1.0\"?>\n<?xml-stylesheet type=\"text/xsl\" href=\"s.xsl\"?>\n<!DOCTYPE note SYSTEM \"note.dtd\">\n<note>\n  <to>A</to>\n  <?pi data?>\n</note>\n<!-- trailer -->"
    );
    assert_eq!(format_xml(&out).unwrap(), out);
}

#[test]
fn minify_keeps_markup_outside_the_root() {
    let out = minify_xml("<!DOCTYPE a>\n<a>\n  <b/>\n</a>\n<?done?>\n<!-- end -->").unwrap();
    assert_eq!(out, "<!DOCTYPE a><a><b/></a><?done?><!-- end -->");
}

#[test]
fn entities_declared_in_the_internal_subset_resolve() {
    let input = "<!DOCTYPE r [\n  <!ENTITY who \"World\">\n]>\n<r greeting=\"&who;\">Hello &who;</r>";

    let doc = parse_document(input).unwrap();
    assert_eq!(doc.root.text(), "Hello World");
    assert_eq!(
        doc.root.attributes,
        vec![("greeting".to_string(), "World".to_string())]
    );

    let out = format_xml(input).unwrap();
    assert!(out.starts_with("<!DOCTYPE r [\n  <!ENTITY who \"World\">\n]>\n"));
    assert!(out.ends_with("<r greeting=\"World\">Hello World</r>"));
}

#[test]
fn doctype_after_the_root_is_rejected() {
    assert!(matches!(
        format_xml("<a/><!DOCTYPE a>"),
        Err(ConversionError::ParseError(_))
    ));
}

#[test]
fn format_is_idempotent() {
    let once = format_xml("<a><b>1</b><!--c--><d><e>2</e></d></a>").unwrap();
    assert_eq!(format_xml(&once).unwrap(), once);
}

#[test]
fn minify_removes_whitespace_between_tags() {
    let out = minify_xml("<a>\n  <b attr=\"1\">x</b>\n  <c>\n    <d/>\n  </c>\n</a>").unwrap();
    assert_eq!(out, "<a><b attr=\"1\">x</b><c><d/></c></a>");
}

#[test]
fn entities_survive_reserialization() {
    let out = minify_xml("<a t=\"&quot;q&quot;\">1 &lt; 2 &amp; 3</a>").unwrap();
    assert!(out.contains("1 &lt; 2 &amp; 3"), "{out}");
    assert!(out.contains("t=\"&quot;q&quot;\""), "{out}");
}

#[test]
fn cdata_is_preserved() {
    let out = minify_xml("<a><![CDATA[x < y]]></a>").unwrap();
    assert_eq!(out, "<a><![CDATA[x < y]]></a>");
}

#[test]
fn multiple_roots_are_rejected() {
    assert!(matches!(format_xml("<a/><b/>"), Err(ConversionError::ParseError(_))));
}

#[test]
fn mismatched_and_unclosed_tags_are_parse_errors() {
    assert!(matches!(format_xml("<a><b></a>"), Err(ConversionError::ParseError(_))));
    assert!(matches!(minify_xml("<a><b>"), Err(ConversionError::ParseError(_))));
}

#[test]
fn non_markup_is_unrecognized() {
    assert_eq!(format_xml("hello"), Err(ConversionError::UnrecognizedFormat));
    assert_eq!(xml_to_json("{\"a\":1}"), Err(ConversionError::UnrecognizedFormat));
}

#[test]
fn parse_document_records_tree_shape() {
    let doc = parse_document("<a>\n  <b/>\n  <c>t</c>\n</a>").unwrap();
    let names: Vec<&str> = doc.root.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["b", "c"]);
    assert_eq!(doc.root.offset, 0);
    let c = doc.root.child_elements().nth(1).unwrap();
    assert!(c.offset > doc.root.offset);
    assert_eq!(c.text(), "t");
}

#[test]
fn yaml_and_xml_convert_through_json() {
    let xml = yaml_to_xml("a: 1\nb:\n  - x\n  - y\n").unwrap();
    assert_eq!(
        xml,
        "<root>\n  <a>1</a>\n  <b>\n    <item>x</item>\n    <item>y</item>\n  </b>\n</root>"
    );

    let yaml = xml_to_yaml("<r><name>n</name><v>1</v></r>").unwrap();
    let back: Value = serde_yaml_ng::from_str(&yaml).unwrap();
    assert_eq!(back, json!({"name": "n", "v": "1"}));
}

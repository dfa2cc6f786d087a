//! Round-trip tests: parse(serialize(tree)) preserves structure
use crate::ast::{forests_structurally_eq, ElementNode};
use crate::rules::tags;
use crate::*;

fn newsletter() -> ElementNode {
    let head = ElementNode::new(tags::HEAD)
        .with_child(ElementNode::new("mj-title").with_content("Weekly digest"))
        .with_child(
            ElementNode::new("mj-attributes")
                .with_child(ElementNode::new("mj-all").with_attribute("font-family", "Arial")),
        );

    let hero_column = ElementNode::new(tags::COLUMN)
        .with_attribute("width", "100%")
        .with_child(
            ElementNode::new(tags::IMAGE)
                .with_attribute("src", "https://cdn.example.com/hero.png")
                .with_attribute("alt", ""),
        )
        .with_child(
            ElementNode::new(tags::TEXT)
                .with_attribute("font-size", "20px")
                .with_content("<p>Hello <b>there</b></p>\n<p>Second line</p>"),
        )
        .with_child(
            ElementNode::new(tags::BUTTON)
                .with_attribute("href", "https://example.com/?a=1&b=2")
                .with_content("Read more"),
        );

    let social = ElementNode::new(tags::SOCIAL).with_child(
        ElementNode::new(tags::SOCIAL_ELEMENT)
            .with_attribute("name", "twitter")
            .with_content("Follow"),
    );

    let body = ElementNode::new(tags::BODY)
        .with_child(ElementNode::new(tags::SECTION).with_child(hero_column))
        .with_child(
            ElementNode::new(tags::SECTION)
                .with_child(ElementNode::new(tags::COLUMN).with_child(social))
                .with_child(ElementNode::new(tags::COLUMN)),
        )
        .with_child(ElementNode::new(tags::RAW).with_content("<div class=\"footer\">&copy;</div>"));

    ElementNode::new(tags::MJML).with_child(head).with_child(body)
}

#[test]
fn test_roundtrip_newsletter() {
    let original = vec![newsletter()];
    let markup = serialize(&original);
    let reparsed = parse(&markup).unwrap_or_else(|e| panic!("Failed to reparse:\n{}\n{}", markup, e));

    assert!(
        forests_structurally_eq(
            &original.into_iter().map(std::sync::Arc::new).collect::<Vec<_>>(),
            &reparsed.into_iter().map(std::sync::Arc::new).collect::<Vec<_>>(),
        ),
        "structure changed:\n{}",
        markup
    );
}

#[test]
fn test_roundtrip_reassigns_ids() {
    let original = newsletter();
    let reparsed = parse(&serialize(&[original.clone()])).unwrap();
    let original_ids: std::collections::HashSet<_> = original.descendant_ids().into_iter().collect();

    for id in reparsed[0].descendant_ids() {
        assert!(!original_ids.contains(&id));
    }
}

#[test]
fn test_roundtrip_is_stable() {
    let markup = serialize(&[newsletter()]);
    let again = serialize(&parse(&markup).unwrap());
    assert_eq!(markup, again);
}

#[test]
fn test_roundtrip_attribute_with_quotes_and_entities() {
    let node = ElementNode::new(tags::TEXT)
        .with_attribute("css-class", "a \"b\" 'c' &amp; <d>")
        .with_content("x");
    let reparsed = parse(&serialize(&[node.clone()])).unwrap();
    assert_eq!(reparsed[0].attributes, node.attributes);
}

#[test]
fn test_roundtrip_multiple_roots() {
    let nodes = vec![
        ElementNode::new(tags::SECTION),
        ElementNode::new(tags::SECTION).with_attribute("padding", "0"),
    ];
    let reparsed = parse(&serialize(&nodes)).unwrap();
    assert_eq!(reparsed.len(), 2);
    assert!(reparsed[1].structurally_eq(&nodes[1]));
}

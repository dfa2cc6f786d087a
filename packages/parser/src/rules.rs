//! # Structural Rule Table
//!
//! One row per known tag. Each row says what the tag may directly contain,
//! how it serializes, and what a freshly created instance looks like.
//! Everything that checks structural legality (placement, the reducer, the
//! linter) and everything that depends on serialization shape (serializer,
//! parser) reads the same [`RuleTable`].

use crate::ast::{Attributes, ElementNode};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Tag names used directly by the engine
pub mod tags {
    pub const MJML: &str = "mjml";
    pub const HEAD: &str = "mj-head";
    pub const BODY: &str = "mj-body";
    pub const WRAPPER: &str = "mj-wrapper";
    pub const SECTION: &str = "mj-section";
    pub const GROUP: &str = "mj-group";
    pub const COLUMN: &str = "mj-column";
    pub const HERO: &str = "mj-hero";
    pub const TEXT: &str = "mj-text";
    pub const BUTTON: &str = "mj-button";
    pub const IMAGE: &str = "mj-image";
    pub const DIVIDER: &str = "mj-divider";
    pub const SPACER: &str = "mj-spacer";
    pub const RAW: &str = "mj-raw";
    pub const TABLE: &str = "mj-table";
    pub const SOCIAL: &str = "mj-social";
    pub const SOCIAL_ELEMENT: &str = "mj-social-element";
    pub const NAVBAR: &str = "mj-navbar";
    pub const NAVBAR_LINK: &str = "mj-navbar-link";
}

/// How a tag is written out and read back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Holds child elements
    Container,
    /// Holds raw markup content, read verbatim up to the closing tag
    Ending,
    /// Never has content or children; written self-closing
    Void,
}

#[derive(Debug)]
pub struct TagSpec {
    pub name: &'static str,
    pub kind: TagKind,
    pub allowed_children: &'static [&'static str],
    pub default_attributes: &'static [(&'static str, &'static str)],
    /// May be synthesized to make room for a dropped node
    pub scaffold: bool,
    /// At most one per parent
    pub singleton: bool,
}

const fn container(
    name: &'static str,
    allowed_children: &'static [&'static str],
    default_attributes: &'static [(&'static str, &'static str)],
    scaffold: bool,
) -> TagSpec {
    TagSpec {
        name,
        kind: TagKind::Container,
        allowed_children,
        default_attributes,
        scaffold,
        singleton: false,
    }
}

const fn ending(name: &'static str, default_attributes: &'static [(&'static str, &'static str)]) -> TagSpec {
    TagSpec {
        name,
        kind: TagKind::Ending,
        allowed_children: &[],
        default_attributes,
        scaffold: false,
        singleton: false,
    }
}

const fn void(name: &'static str, default_attributes: &'static [(&'static str, &'static str)]) -> TagSpec {
    TagSpec {
        name,
        kind: TagKind::Void,
        allowed_children: &[],
        default_attributes,
        scaffold: false,
        singleton: false,
    }
}

const COLUMN_CONTENT: &[&str] = &[
    "mj-text",
    "mj-button",
    "mj-image",
    "mj-divider",
    "mj-spacer",
    "mj-social",
    "mj-navbar",
    "mj-table",
    "mj-accordion",
    "mj-carousel",
    "mj-raw",
];

pub static STANDARD_TAGS: &[TagSpec] = &[
    TagSpec {
        name: "mjml",
        kind: TagKind::Container,
        allowed_children: &["mj-head", "mj-body"],
        default_attributes: &[],
        scaffold: false,
        singleton: false,
    },
    TagSpec {
        name: "mj-head",
        kind: TagKind::Container,
        allowed_children: &[
            "mj-attributes",
            "mj-breakpoint",
            "mj-font",
            "mj-preview",
            "mj-style",
            "mj-title",
            "mj-raw",
        ],
        default_attributes: &[],
        scaffold: false,
        singleton: true,
    },
    TagSpec {
        name: "mj-body",
        kind: TagKind::Container,
        allowed_children: &["mj-section", "mj-wrapper", "mj-hero", "mj-raw"],
        default_attributes: &[],
        scaffold: false,
        singleton: true,
    },
    container(
        "mj-attributes",
        &[
            "mj-all",
            "mj-class",
            "mj-section",
            "mj-column",
            "mj-text",
            "mj-button",
            "mj-image",
            "mj-divider",
            "mj-spacer",
        ],
        &[],
        false,
    ),
    void("mj-all", &[]),
    void("mj-class", &[]),
    void("mj-breakpoint", &[("width", "480px")]),
    void("mj-font", &[]),
    ending("mj-preview", &[]),
    ending("mj-style", &[]),
    ending("mj-title", &[]),
    container("mj-wrapper", &["mj-section", "mj-raw"], &[("padding", "20px 0")], false),
    container(
        "mj-section",
        &["mj-column", "mj-group", "mj-raw"],
        &[("padding", "20px 0")],
        true,
    ),
    container("mj-group", &["mj-column", "mj-raw"], &[], false),
    container("mj-column", COLUMN_CONTENT, &[("vertical-align", "top")], true),
    container("mj-hero", COLUMN_CONTENT, &[("mode", "fixed-height")], false),
    ending("mj-text", &[("padding", "10px 25px")]),
    ending("mj-button", &[("href", "#"), ("align", "center")]),
    void("mj-image", &[("padding", "10px 25px")]),
    void("mj-divider", &[("border-width", "4px")]),
    void("mj-spacer", &[("height", "20px")]),
    container("mj-social", &["mj-social-element", "mj-raw"], &[("mode", "horizontal")], true),
    ending("mj-social-element", &[]),
    container("mj-navbar", &["mj-navbar-link", "mj-raw"], &[], true),
    ending("mj-navbar-link", &[]),
    ending("mj-table", &[]),
    ending("mj-raw", &[]),
    container("mj-accordion", &["mj-accordion-element", "mj-raw"], &[], true),
    container(
        "mj-accordion-element",
        &["mj-accordion-title", "mj-accordion-text", "mj-raw"],
        &[],
        true,
    ),
    ending("mj-accordion-title", &[]),
    ending("mj-accordion-text", &[]),
    container("mj-carousel", &["mj-carousel-image"], &[], true),
    void("mj-carousel-image", &[]),
];

/// Lookup table over a set of [`TagSpec`] rows
#[derive(Debug)]
pub struct RuleTable {
    specs: HashMap<&'static str, &'static TagSpec>,
}

impl RuleTable {
    pub fn from_specs(specs: &'static [TagSpec]) -> Self {
        Self {
            specs: specs.iter().map(|spec| (spec.name, spec)).collect(),
        }
    }

    /// The shared table for the standard tag vocabulary
    pub fn standard() -> &'static RuleTable {
        static TABLE: OnceLock<RuleTable> = OnceLock::new();
        TABLE.get_or_init(|| RuleTable::from_specs(STANDARD_TAGS))
    }

    pub fn spec(&self, tag: &str) -> Option<&'static TagSpec> {
        self.specs.get(tag).copied()
    }

    pub fn is_known(&self, tag: &str) -> bool {
        self.specs.contains_key(tag)
    }

    /// Tags `parent` may directly contain; empty for unknown tags
    pub fn allowed_children(&self, parent: &str) -> &'static [&'static str] {
        self.spec(parent).map(|spec| spec.allowed_children).unwrap_or(&[])
    }

    pub fn can_contain(&self, parent: &str, child: &str) -> bool {
        self.allowed_children(parent).contains(&child)
    }

    pub fn is_void(&self, tag: &str) -> bool {
        matches!(self.spec(tag), Some(TagSpec { kind: TagKind::Void, .. }))
    }

    pub fn is_ending(&self, tag: &str) -> bool {
        matches!(self.spec(tag), Some(TagSpec { kind: TagKind::Ending, .. }))
    }

    pub fn is_singleton(&self, tag: &str) -> bool {
        self.spec(tag).map(|spec| spec.singleton).unwrap_or(false)
    }

    pub fn default_attributes(&self, tag: &str) -> Attributes {
        self.spec(tag)
            .map(|spec| spec.default_attributes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// A new node of `tag` carrying the tag's default attributes
    pub fn instantiate(&self, tag: &str) -> ElementNode {
        ElementNode::new(tag).with_attributes(self.default_attributes(tag))
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static TagSpec> + '_ {
        self.specs.values().copied()
    }
}

//! LSB document structure definitions

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Serialize, Serializer};

use crate::error::FormatError;

/// Fixed 40-byte header at the start of every LSB buffer
///
/// None of these fields gate decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsbHeader {
    pub magic: u32,
    pub length: u32,
    pub endianness: u32,
    pub reserved: u32,
    /// 64-bit, not 32 as some format notes claim
    pub created_timestamp: u64,
    pub version_major: u32,
    pub version_minor: u32,
    pub version_build: u32,
    pub version_revision: u32,
}

/// Attribute type tags understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    UInt32 = 0x05,
    Bool = 0x13,
    FixedString = 0x16,
    LsString = 0x17,
    TranslatedString = 0x1C,
}

impl AttributeType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::UInt32 => "uint32",
            AttributeType::Bool => "bool",
            AttributeType::FixedString => "FixedString",
            AttributeType::LsString => "LSString",
            AttributeType::TranslatedString => "TranslatedString",
        }
    }
}

impl TryFrom<u32> for AttributeType {
    type Error = FormatError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0x05 => Ok(AttributeType::UInt32),
            0x13 => Ok(AttributeType::Bool),
            0x16 => Ok(AttributeType::FixedString),
            0x17 => Ok(AttributeType::LsString),
            0x1C => Ok(AttributeType::TranslatedString),
            _ => Err(FormatError::UnknownAttributeType(tag)),
        }
    }
}

/// A decoded attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LsbAttribute {
    UInt(u32),
    Bool(bool),
    /// Both string tags decode to this variant
    String(String),
    /// Default display text plus the opaque handle used to find translations
    TranslatedString { value: String, handle: String },
}

impl LsbAttribute {
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            LsbAttribute::UInt(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LsbAttribute::String(s) => Some(s),
            LsbAttribute::TranslatedString { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl From<u32> for LsbAttribute {
    fn from(value: u32) -> Self {
        LsbAttribute::UInt(value)
    }
}

impl From<bool> for LsbAttribute {
    fn from(value: bool) -> Self {
        LsbAttribute::Bool(value)
    }
}

impl From<&str> for LsbAttribute {
    fn from(value: &str) -> Self {
        LsbAttribute::String(value.to_string())
    }
}

// Translated strings are written as `[text, handle]`
impl Serialize for LsbAttribute {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            LsbAttribute::UInt(v) => serializer.serialize_u32(*v),
            LsbAttribute::Bool(v) => serializer.serialize_bool(*v),
            LsbAttribute::String(s) => serializer.serialize_str(s),
            LsbAttribute::TranslatedString { value, handle } => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(value)?;
                tuple.serialize_element(handle)?;
                tuple.end()
            }
        }
    }
}

/// One node of an LSB tree. Children are owned; there are no parent links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LsbNode {
    pub name: String,
    pub attributes: IndexMap<String, LsbAttribute>,
    pub children: Vec<LsbNode>,
}

impl LsbNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&LsbAttribute> {
        self.attributes.get(name)
    }

    /// Direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LsbNode> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Total number of nodes in this subtree, including this one
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(LsbNode::node_count).sum::<usize>()
    }
}

/// Key the child list is written under
const CHILDREN_KEY: &str = "_children";

/// Node body: attributes first, then `_children`
///
/// An attribute that is itself named `_children` is replaced by the child list.
struct NodeBody<'a>(&'a LsbNode);

impl Serialize for NodeBody<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let node = self.0;
        let shadowed = usize::from(node.attributes.contains_key(CHILDREN_KEY));
        let mut map = serializer.serialize_map(Some(node.attributes.len() + 1 - shadowed))?;

        for (key, value) in node.attributes.iter().filter(|(key, _)| *key != CHILDREN_KEY) {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(CHILDREN_KEY, &node.children)?;

        map.end()
    }
}

// A node is written as `{ name: { ...attributes, "_children": [...] } }`
impl Serialize for LsbNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &NodeBody(self))?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_type_tags() {
        assert_eq!(AttributeType::try_from(0x05).unwrap(), AttributeType::UInt32);
        assert_eq!(AttributeType::try_from(0x17).unwrap().name(), "LSString");
        assert!(matches!(
            AttributeType::try_from(0x06),
            Err(FormatError::UnknownAttributeType(0x06))
        ));
    }

    #[test]
    fn test_node_json_shape() {
        let mut child = LsbNode::new("Child");
        child.attributes.insert("Flag".to_string(), true.into());

        let mut root = LsbNode::new("Root");
        root.attributes.insert("Count".to_string(), 3u32.into());
        root.attributes.insert(
            "Title".to_string(),
            LsbAttribute::TranslatedString {
                value: "Hello".to_string(),
                handle: "h123".to_string(),
            },
        );
        root.children.push(child);

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Root": {
                    "Count": 3,
                    "Title": ["Hello", "h123"],
                    "_children": [
                        { "Child": { "Flag": true, "_children": [] } }
                    ]
                }
            })
        );
        assert_eq!(root.node_count(), 2);
    }

    #[test]
    fn test_children_key_wins_over_attribute() {
        let mut root = LsbNode::new("Root");
        root.attributes.insert("_children".to_string(), 7u32.into());
        root.attributes.insert("Name".to_string(), "box".into());
        root.children.push(LsbNode::new("Leaf"));

        let json = serde_json::to_string(&root).unwrap();
        assert_eq!(json, r#"{"Root":{"Name":"box","_children":[{"Leaf":{"_children":[]}}]}}"#);
    }
}

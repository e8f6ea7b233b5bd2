use super::element::Element;

/// What a label, title or error slot can display.
///
/// Text compares by value. Nodes compare by identity, so re-applying the
/// same live node is a no-op while an equal-looking copy is not.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Text(String),
    Node(Element),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Element> for Content {
    fn from(node: Element) -> Self {
        Content::Node(node)
    }
}

impl From<&Element> for Content {
    fn from(node: &Element) -> Self {
        Content::Node(node.clone())
    }
}

//! Node payloads stored in the document arena.

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The document root.
    Document,
    /// An element with its tag name and attributes.
    Element(ElementData),
    /// A text run.
    Text(String),
    /// A comment.
    Comment(String),
}

impl Node {
    /// The element payload, if this node is an element.
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable element payload, if this node is an element.
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Tag name and attributes of an element.
///
/// Tag names are stored lowercase. Attribute names keep the case they were
/// first set with (SVG uses `viewBox`) and match case-insensitively.
/// Attribute order is kept so serialization is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    /// Create an element with no attributes.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Lowercase tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the tag name matches (case-insensitive).
    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    /// All attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self
            .attrs
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(idx).1)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Whitespace-separated class list.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut list: Vec<&str> = self.classes().collect();
        list.push(class);
        let joined = list.join(" ");
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
    }

    /// Toggle a class. Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    /// Read one property from the inline `style` attribute.
    pub fn style(&self, property: &str) -> Option<String> {
        parse_style(self.attr("style").unwrap_or(""))
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
            .map(|(_, v)| v)
    }

    /// Set one property in the inline `style` attribute, keeping the others.
    pub fn set_style(&mut self, property: &str, value: &str) {
        let mut decls = parse_style(self.attr("style").unwrap_or(""));
        match decls
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
        {
            Some(slot) => slot.1 = value.to_string(),
            None => decls.push((property.to_ascii_lowercase(), value.to_string())),
        }
        let style = decls
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attr("style", style);
    }
}

/// Split a `style` attribute into `(property, value)` pairs.
fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty()).then(|| (k.to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_list_editing() {
        let mut el = ElementData::new("A");
        assert_eq!(el.name(), "a");

        el.add_class("nav-link");
        el.add_class("active");
        el.add_class("active");
        assert_eq!(el.attr("class"), Some("nav-link active"));

        el.remove_class("nav-link");
        assert_eq!(el.attr("class"), Some("active"));

        assert!(!el.toggle_class("active"));
        assert!(el.toggle_class("open"));
        assert!(el.has_class("open"));
    }

    #[test]
    fn inline_style_keeps_other_properties() {
        let mut el = ElementData::new("span");
        el.set_attr("style", "color: red; display: block");
        el.set_style("display", "none");
        assert_eq!(el.style("display").as_deref(), Some("none"));
        assert_eq!(el.style("color").as_deref(), Some("red"));
        assert_eq!(el.attr("style"), Some("color: red; display: none"));
    }

    #[test]
    fn empty_id_is_treated_as_missing() {
        let mut el = ElementData::new("h2");
        el.set_attr("id", "");
        assert_eq!(el.id(), None);
        el.set_attr("ID", "intro");
        assert_eq!(el.id(), Some("intro"));
    }

    #[test]
    fn attribute_names_keep_their_case() {
        let mut el = ElementData::new("svg");
        el.set_attr("viewBox", "0 0 24 24");
        assert_eq!(el.attr("viewbox"), Some("0 0 24 24"));
        el.set_attr("VIEWBOX", "0 0 16 16");
        assert_eq!(el.attrs().collect::<Vec<_>>(), vec![("viewBox", "0 0 16 16")]);
    }
}

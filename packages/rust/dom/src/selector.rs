//! A small CSS selector matcher for [`Document`] trees.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! compounds of those, the descendant combinator, the child combinator `>`,
//! and comma-separated groups. That covers every selector the site chrome
//! uses; anything else is rejected at parse time.

use docnav_shared::{DocNavError, Result};

use crate::document::{Document, NodeId};
use crate::node::ElementData;

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Complex>,
}

/// One comma-separated alternative, stored right-to-left.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// The compound that must match the subject element.
    subject: Compound,
    /// Remaining compounds, nearest first, each with the combinator joining it
    /// to the compound on its right.
    ancestors: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let groups = source
            .split(',')
            .map(|group| parse_complex(group.trim(), source))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            source: source.to_string(),
            groups,
        })
    }

    /// The text this selector was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the element `id` matches any group.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.groups.iter().any(|g| g.matches(doc, id))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = DocNavError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(el) = doc.element(id) else {
            return false;
        };
        if !self.subject.matches(el) {
            return false;
        }
        self.match_ancestors(doc, id, 0)
    }

    /// Match `self.ancestors[from..]` starting above `id`, backtracking over
    /// descendant combinators.
    fn match_ancestors(&self, doc: &Document, id: NodeId, from: usize) -> bool {
        let Some((combinator, compound)) = self.ancestors.get(from) else {
            return true;
        };
        match combinator {
            Combinator::Child => doc.parent(id).is_some_and(|p| {
                doc.element(p).is_some_and(|el| compound.matches(el))
                    && self.match_ancestors(doc, p, from + 1)
            }),
            Combinator::Descendant => doc.ancestors(id).any(|a| {
                doc.element(a).is_some_and(|el| compound.matches(el))
                    && self.match_ancestors(doc, a, from + 1)
            }),
        }
    }
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !el.is(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(v) => el.attr(name) == Some(v.as_str()),
            None => el.has_attr(name),
        })
    }
}

fn parse_complex(group: &str, source: &str) -> Result<Complex> {
    if group.is_empty() {
        return Err(DocNavError::parse(format!("empty selector group in {source:?}")));
    }

    // Split into compounds and combinators, left to right.
    let spaced = group.replace('>', " > ");
    let mut parts: Vec<(Combinator, Compound)> = Vec::new();
    let mut pending = Combinator::Descendant;
    for token in spaced.split_whitespace() {
        if token == ">" {
            if parts.is_empty() {
                return Err(DocNavError::parse(format!("dangling '>' in {source:?}")));
            }
            pending = Combinator::Child;
            continue;
        }
        parts.push((pending, parse_compound(token, source)?));
        pending = Combinator::Descendant;
    }
    if pending == Combinator::Child {
        return Err(DocNavError::parse(format!("dangling '>' in {source:?}")));
    }

    // Re-associate combinators with the compound on their left, right-to-left.
    let (joins, compounds): (Vec<_>, Vec<_>) = parts.into_iter().unzip();
    let mut compounds = compounds.into_iter().rev();
    let subject = compounds
        .next()
        .ok_or_else(|| DocNavError::parse(format!("empty selector group in {source:?}")))?;
    let ancestors = joins.into_iter().skip(1).rev().zip(compounds).collect();

    Ok(Complex { subject, ancestors })
}

fn parse_compound(token: &str, source: &str) -> Result<Compound> {
    let bad = || DocNavError::parse(format!("unsupported selector {source:?}"));
    let mut compound = Compound::default();
    let mut rest = token;

    let tag_end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    if !tag.is_empty() && tag != "*" {
        if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(bad());
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }
    rest = &rest[tag_end..];

    while let Some(first) = rest.chars().next() {
        match first {
            '#' | '.' => {
                let body = &rest[1..];
                let end = body.find(['#', '.', '[']).unwrap_or(body.len());
                let name = &body[..end];
                if name.is_empty() {
                    return Err(bad());
                }
                if first == '#' {
                    compound.id = Some(name.to_string());
                } else {
                    compound.classes.push(name.to_string());
                }
                rest = &body[end..];
            }
            '[' => {
                let close = rest.find(']').ok_or_else(bad)?;
                let inner = &rest[1..close];
                let attr = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        (name.trim().to_ascii_lowercase(), Some(value.to_string()))
                    }
                    None => (inner.trim().to_ascii_lowercase(), None),
                };
                if attr.0.is_empty() {
                    return Err(bad());
                }
                compound.attrs.push(attr);
                rest = &rest[close + 1..];
            }
            _ => return Err(bad()),
        }
    }

    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r#"<html><body>
<nav id="sidebar"><a class="nav-link active" href="/guide">Guide</a></nav>
<main class="main"><div class="md-content">
  <h2 id="intro">Intro</h2>
  <h3>Details</h3>
  <pre><code class="language-rust">fn main() {}</code></pre>
</div></main>
</body></html>"#,
        )
    }

    fn names(doc: &Document, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| doc.tag_name(id).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn descendant_groups_in_document_order() {
        let doc = doc();
        let sel = Selector::parse(".md-content h2, .md-content h3").unwrap();
        let found = doc.select(doc.root(), &sel);
        assert_eq!(names(&doc, &found), vec!["h2", "h3"]);
    }

    #[test]
    fn compound_and_attribute_selectors() {
        let doc = doc();
        let active = Selector::parse(".nav-link.active").unwrap();
        assert_eq!(doc.select(doc.root(), &active).len(), 1);

        let by_href = Selector::parse("a[href=\"/guide\"]").unwrap();
        assert_eq!(doc.select(doc.root(), &by_href).len(), 1);

        let main = Selector::parse("main.main").unwrap();
        assert!(doc.select_first(doc.root(), &main).is_some());

        let id = Selector::parse("#intro").unwrap();
        assert_eq!(names(&doc, &doc.select(doc.root(), &id)), vec!["h2"]);
    }

    #[test]
    fn child_combinator() {
        let doc = doc();
        let direct = Selector::parse("pre > code").unwrap();
        assert_eq!(doc.select(doc.root(), &direct).len(), 1);

        let not_direct = Selector::parse("main > h2").unwrap();
        assert!(doc.select(doc.root(), &not_direct).is_empty());
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse("ul ~ li").is_err());
        assert!(Selector::parse("> a").is_err());
        assert!(Selector::parse("a,").is_err());
    }
}

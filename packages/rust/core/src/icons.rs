//! Icon placeholders (`<i data-lucide="name">`) rendered as inline SVG shells.

use tracing::debug;

use docnav_dom::Document;

pub const ICON_ATTR: &str = "data-lucide";

/// Presentation attributes every rendered icon carries.
const SVG_ATTRS: &[(&str, &str)] = &[
    ("xmlns", "http://www.w3.org/2000/svg"),
    ("width", "24"),
    ("height", "24"),
    ("viewBox", "0 0 24 24"),
    ("fill", "none"),
    ("stroke", "currentColor"),
    ("stroke-width", "2"),
    ("stroke-linecap", "round"),
    ("stroke-linejoin", "round"),
];

/// Replace every unrendered placeholder in the document. Returns how many.
pub(crate) fn render_icons(doc: &mut Document) -> usize {
    let root = doc.root();
    let placeholders: Vec<_> = doc
        .descendants(root)
        .into_iter()
        .filter(|&n| {
            doc.element(n)
                .is_some_and(|el| el.has_attr(ICON_ATTR) && !el.is("svg"))
        })
        .collect();

    for &placeholder in &placeholders {
        let Some(el) = doc.element(placeholder) else {
            continue;
        };
        let name = el.attr(ICON_ATTR).unwrap_or_default().to_string();
        let carried: Vec<(String, String)> = el
            .attrs()
            .filter(|(k, _)| *k != "class")
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let extra_classes: Vec<String> = el.classes().map(str::to_string).collect();

        let svg = doc.create_element("svg");
        if let Some(svg_el) = doc.element_mut(svg) {
            for (k, v) in SVG_ATTRS {
                svg_el.set_attr(k, *v);
            }
            svg_el.add_class("lucide");
            svg_el.add_class(&format!("lucide-{name}"));
            for class in &extra_classes {
                svg_el.add_class(class);
            }
            for (k, v) in carried {
                svg_el.set_attr(&k, v);
            }
        }
        doc.replace_with(placeholder, svg);
    }

    if !placeholders.is_empty() {
        debug!(count = placeholders.len(), "icons rendered");
    }
    placeholders.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_become_svg_once() {
        let mut doc = Document::parse(
            r#"<html><body><button id="theme-toggle"><i data-lucide="moon" class="theme-icon-moon"></i></button></body></html>"#,
        );
        assert_eq!(render_icons(&mut doc), 1);
        assert_eq!(render_icons(&mut doc), 0);

        let button = doc.get_element_by_id("theme-toggle").unwrap();
        let svg = doc.element_children(button)[0];
        let el = doc.element(svg).unwrap();
        assert!(el.is("svg"));
        assert!(el.has_class("lucide-moon"));
        assert!(el.has_class("theme-icon-moon"));
        assert_eq!(el.attr(ICON_ATTR), Some("moon"));
        assert!(doc.outer_html(svg).contains(r#"viewBox="0 0 24 24""#));
    }
}

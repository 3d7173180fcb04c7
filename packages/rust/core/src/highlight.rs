//! Syntax highlighting for code blocks.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

/// CSS class prefix for highlighted spans.
const CLASS_PREFIX: &str = "hljs-";

/// Turns source text into highlighted markup.
pub trait Highlighter: Send + Sync {
    /// Highlighted inner HTML for `code`, or `None` if the language is unknown.
    fn highlight(&self, code: &str, language: &str) -> Option<String>;
}

/// Leaves code untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, _code: &str, _language: &str) -> Option<String> {
        None
    }
}

/// Class-based highlighting with syntect's bundled grammars.
#[derive(Debug)]
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Option<String> {
        let Some(syntax) = self.syntaxes.find_syntax_by_token(language) else {
            debug!(language, "no grammar for language");
            return None;
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::SpacedPrefixed {
                prefix: CLASS_PREFIX,
            },
        );
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                warn!(language, error = %e, "highlighting failed");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_gets_classed_spans() {
        let html = SyntectHighlighter::new()
            .highlight("fn main() {}\n", "rust")
            .unwrap();
        assert!(html.contains("<span class=\""));
        assert!(html.contains(CLASS_PREFIX));
        assert!(html.contains("main"));
    }

    #[test]
    fn unknown_language_is_none() {
        assert!(
            SyntectHighlighter::new()
                .highlight("x", "no-such-language")
                .is_none()
        );
        assert!(PlainHighlighter.highlight("x", "rust").is_none());
    }
}

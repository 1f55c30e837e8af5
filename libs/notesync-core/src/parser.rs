//! Markdown sectionizer for note bodies.
//!
//! Every top-level header (`# Title`) opens a section that runs until the
//! next top-level header. Deeper headers (`##`, `###`, ...) inside a section
//! become labels on the section title instead of body text.
//!
//! ```markdown
//! # Topic
//! intro
//! ## Detail A
//! body
//! # Next
//! ```
//!
//! Lines between triple-backtick fences never start a section, so a
//! `# comment` in a shell snippet stays in the body. Sub-header lines count as
//! labels wherever they appear, fenced or not.

use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CollisionKind, Section, TitleCollision};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# (.*)$").expect("header pattern is valid"));
static SUBHEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##+").expect("sub-header pattern is valid"));
static SUBHEADER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##+ ").expect("sub-header marker pattern is valid"));

const FENCE: &str = "```";

/// Sections of one note keyed by card title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sectionized {
    pub cards: BTreeMap<String, String>,
    /// Titles produced more than once; the first section kept its slot.
    pub collisions: Vec<TitleCollision>,
}

/// Split a note into card titles and bodies.
pub fn sectionize(note_title: &str, markdown: &str, excluded_headers: &[String]) -> Sectionized {
    let mut result = Sectionized::default();

    for section in parse(markdown, excluded_headers) {
        let title = section.card_title(note_title);
        match result.cards.entry(title) {
            Entry::Vacant(slot) => {
                slot.insert(section.body);
            }
            Entry::Occupied(slot) => {
                result
                    .collisions
                    .push(TitleCollision::new(CollisionKind::Section, slot.key().clone()));
            }
        }
    }

    result
}

/// Parse markdown into top-level sections, in document order.
///
/// Headers whose text starts with one of `excluded_headers`, or that contain
/// `==`, are dropped together with their bodies.
pub fn parse(markdown: &str, excluded_headers: &[String]) -> Vec<Section> {
    let mut parser = Parser::new(excluded_headers);
    for line in markdown.split('\n') {
        parser.process_line(line.strip_suffix('\r').unwrap_or(line));
    }
    parser.finish()
}

struct SectionBuilder {
    header: String,
    labels: Vec<String>,
    body: String,
}

impl SectionBuilder {
    fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
            labels: Vec::new(),
            body: String::new(),
        }
    }

    fn build(self) -> Section {
        Section {
            header: self.header,
            labels: self.labels,
            body: self.body,
        }
    }
}

struct Parser<'a> {
    excluded: &'a [String],
    in_fence: bool,
    current: Option<SectionBuilder>,
    sections: Vec<Section>,
}

impl<'a> Parser<'a> {
    fn new(excluded: &'a [String]) -> Self {
        Self {
            excluded,
            in_fence: false,
            current: None,
            sections: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str) {
        match self.classify(line) {
            LineType::Header(text) => self.handle_header(line, text),
            LineType::SubHeader => self.handle_subheader(line),
            LineType::Fence => {
                self.in_fence = !self.in_fence;
                self.push_text(line);
            }
            LineType::Text => self.push_text(line),
        }
    }

    fn classify<'l>(&self, line: &'l str) -> LineType<'l> {
        if line.starts_with(FENCE) {
            return LineType::Fence;
        }
        if !self.in_fence {
            if let Some(text) = HEADER.captures(line).and_then(|c| c.get(1)) {
                return LineType::Header(text.as_str());
            }
        }
        if SUBHEADER.is_match(line) {
            return LineType::SubHeader;
        }
        LineType::Text
    }

    fn handle_header(&mut self, line: &str, text: &str) {
        self.flush();
        if self.is_excluded(line, text) {
            return;
        }
        self.current = Some(SectionBuilder::new(text));
    }

    fn handle_subheader(&mut self, line: &str) {
        if let Some(ref mut section) = self.current {
            let line = rewrite_math(line);
            let label = SUBHEADER_MARKER.replace(&line, "");
            section.labels.push(label.into_owned());
        }
    }

    fn push_text(&mut self, line: &str) {
        if let Some(ref mut section) = self.current {
            section.body.push_str(&rewrite_math(line));
        }
    }

    fn is_excluded(&self, line: &str, text: &str) -> bool {
        if line.contains("==") {
            return true;
        }
        let line = line.trim_end();
        self.excluded
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()) || line.starts_with(prefix.as_str()))
    }

    fn flush(&mut self) {
        if let Some(section) = self.current.take() {
            self.sections.push(section.build());
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.sections
    }
}

enum LineType<'a> {
    Header(&'a str),
    SubHeader,
    Fence,
    Text,
}

/// Rewrite `$...$` pairs into the flashcard renderer's `[$]...[/$]` markers.
///
/// Lines with an odd or zero number of `$` are returned untouched.
pub fn rewrite_math(line: &str) -> Cow<'_, str> {
    let count = line.matches('$').count();
    if count == 0 || count % 2 != 0 {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len() + count * 3);
    let mut in_formula = false;
    for ch in line.chars() {
        if ch == '$' {
            out.push_str(if in_formula { "[/$]" } else { "[$]" });
            in_formula = !in_formula;
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_exclusions() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn one_entry_per_header() {
        let input = "# One\na\n# Two\nb\n# Three\nc";
        let result = sectionize("Note", input, &no_exclusions());
        assert_eq!(result.cards.len(), 3);
        assert_eq!(result.cards["Note / One"], "a");
        assert_eq!(result.cards["Note / Three"], "c");
        assert!(result.collisions.is_empty());
    }

    #[test]
    fn subheaders_become_labels() {
        let input = "# Topic\nintro\n## Detail A\nbody\n## Detail B\nmore\n# Next\n";
        let result = sectionize("Note", input, &no_exclusions());

        let mut expected = BTreeMap::new();
        expected.insert(
            "Note / Topic ['Detail A', 'Detail B']".to_string(),
            "introbodymore".to_string(),
        );
        expected.insert("Note / Next".to_string(), String::new());
        assert_eq!(result.cards, expected);
    }

    #[test]
    fn deep_subheaders_all_count() {
        let input = "# Topic\n### Deep\n#### Deeper\ntext";
        let sections = parse(input, &no_exclusions());
        assert_eq!(sections[0].labels, vec!["Deep", "Deeper"]);
        assert_eq!(sections[0].body, "text");
    }

    #[test]
    fn fenced_headers_are_not_sections() {
        let input = "# Real\n```bash\n# foo\n## bar\n```\nafter";
        let result = sectionize("Note", input, &no_exclusions());
        assert_eq!(result.cards.len(), 1);
        assert!(!result.cards.keys().any(|k| k.contains("foo")));
        assert_eq!(result.cards["Note / Real ['bar']"], "```bash# foo```after");
    }

    #[test]
    fn fenced_subheaders_still_label() {
        let input = "# Topic\n```python\n## comment\n```\ntext";
        let result = sectionize("Note", input, &no_exclusions());
        let keys: Vec<&str> = result.cards.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Note / Topic ['comment']"]);
        assert_eq!(result.cards["Note / Topic ['comment']"], "```python```text");
    }

    #[test]
    fn no_headers_yields_nothing() {
        let result = sectionize("Note", "just text\n## not top level", &no_exclusions());
        assert!(result.cards.is_empty());
    }

    #[test]
    fn text_before_first_header_is_ignored() {
        let sections = parse("preamble\n# Topic\nbody", &no_exclusions());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "body");
    }

    #[test]
    fn header_needs_a_space() {
        let sections = parse("#tag\n# Topic", &no_exclusions());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].header, "Topic");
    }

    #[test]
    fn excluded_prefix_is_dropped() {
        let excluded = vec!["Draft".to_string()];
        let input = "# Draft ideas\nsecret\n# Kept\nvisible";
        let result = sectionize("Note", input, &excluded);
        assert_eq!(result.cards.len(), 1);
        assert_eq!(result.cards["Note / Kept"], "visible");
    }

    #[test]
    fn excluded_prefix_may_include_marker() {
        let excluded = vec!["# TODO".to_string()];
        let sections = parse("# TODO later\nx\n# Done\ny", &excluded);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].header, "Done");
    }

    #[test]
    fn double_equals_headers_are_dropped() {
        let sections = parse("# a == b\nx\n# Kept\ny", &no_exclusions());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].header, "Kept");
    }

    #[test]
    fn excluded_header_still_ends_previous_section() {
        let excluded = vec!["Skip".to_string()];
        let sections = parse("# Keep\na\n# Skip\nb", &excluded);
        assert_eq!(sections[0].body, "a");
    }

    #[test]
    fn duplicate_headers_keep_first() {
        let input = "# Same\nfirst\n# Same\nsecond";
        let result = sectionize("Note", input, &no_exclusions());
        assert_eq!(result.cards["Note / Same"], "first");
        assert_eq!(
            result.collisions,
            vec![TitleCollision::new(CollisionKind::Section, "Note / Same")]
        );
    }

    #[test]
    fn empty_body_is_kept() {
        let result = sectionize("Note", "# A\n# B", &no_exclusions());
        assert_eq!(result.cards["Note / A"], "");
        assert_eq!(result.cards["Note / B"], "");
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let sections = parse("# Topic\r\nline\r\n", &no_exclusions());
        assert_eq!(sections[0].header, "Topic");
        assert_eq!(sections[0].body, "line");
    }

    #[test]
    fn body_math_is_rewritten() {
        let sections = parse("# Physics\nEnergy is $E=mc^2$ here", &no_exclusions());
        assert_eq!(sections[0].body, "Energy is [$]E=mc^2[/$] here");
    }

    #[test]
    fn rewrite_math_pairs() {
        assert_eq!(
            rewrite_math("Energy is $E=mc^2$ here"),
            "Energy is [$]E=mc^2[/$] here"
        );
        assert_eq!(rewrite_math("$a$ and $b$"), "[$]a[/$] and [$]b[/$]");
    }

    #[test]
    fn rewrite_math_leaves_odd_counts() {
        let line = "costs $5 or $6 or $7";
        assert!(matches!(rewrite_math(line), Cow::Borrowed(_)));
        assert_eq!(rewrite_math(line), line);
        assert_eq!(rewrite_math("no math"), "no math");
    }
}

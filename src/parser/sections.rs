const MARKER: &[u8] = b"###";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Split an issue-form body into `### Heading` sections.
///
/// A heading marker is exactly three `#` followed by a space or tab, either at
/// the start of the text or right after whitespace, so a marker may also sit in
/// the middle of a line. The heading runs to the end of its line and the body
/// runs from the next line up to the following marker. Text before the first
/// marker is dropped.
pub fn split_sections(text: &str) -> Vec<Section> {
    let text = text.replace("\r\n", "\n");
    let markers = find_markers(&text);
    let mut sections = Vec::with_capacity(markers.len());

    for (n, &start) in markers.iter().enumerate() {
        let after = start + MARKER.len();
        let next = markers.get(n + 1).copied().unwrap_or(text.len());
        let line_end = text[after..]
            .find('\n')
            .map(|p| after + p)
            .unwrap_or(text.len());

        // A second marker on the heading line cuts the heading short.
        let heading_end = line_end.min(next);
        let body = if heading_end == line_end && line_end < next {
            &text[line_end + 1..next]
        } else {
            ""
        };

        sections.push(Section {
            heading: text[after..heading_end].trim().to_string(),
            body: body.to_string(),
        });
    }

    sections
}

/// Byte offsets of every heading marker in `text`.
fn find_markers(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut i = 0;

    while i + MARKER.len() < bytes.len() {
        let at_boundary = i == 0 || bytes[i - 1].is_ascii_whitespace();
        let followed_by_space = matches!(bytes[i + MARKER.len()], b' ' | b'\t');
        if at_boundary && followed_by_space && bytes[i..].starts_with(MARKER) {
            markers.push(i);
            i += MARKER.len();
        } else {
            i += 1;
        }
    }

    markers
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(text: &str) -> Vec<String> {
        split_sections(text).into_iter().map(|s| s.heading).collect()
    }

    #[test]
    fn splits_issue_form() {
        let md = std::fs::read_to_string("tests/fixtures/full_submission.md").unwrap();
        let h = headings(&md);
        assert_eq!(h.len(), 9);
        assert_eq!(h[0], "Nombre de la comunidad");
        assert_eq!(h[8], "Imagen o logotipo de la comunidad");
    }

    #[test]
    fn preamble_is_dropped() {
        let sections = split_sections("intro text\n### A\none\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "A");
        assert_eq!(sections[0].body, "one\n");
    }

    #[test]
    fn crlf_is_normalized() {
        let sections = split_sections("### A\r\nline one\r\nline two\r\n### B\r\n");
        assert_eq!(sections[0].body, "line one\nline two\n");
        assert_eq!(sections[1].heading, "B");
    }

    #[test]
    fn heading_at_end_of_text_has_empty_body() {
        let sections = split_sections("### A\nvalue\n### B");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].heading, "B");
        assert_eq!(sections[1].body, "");
    }

    #[test]
    fn marker_mid_line_is_a_heading() {
        let sections = split_sections("some text ### Tipo\nMeetup");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Tipo");
        assert_eq!(sections[0].body, "Meetup");
    }

    #[test]
    fn two_markers_on_one_line() {
        let sections = split_sections("### A ### B\nvalue");
        assert_eq!(headings("### A ### B\nvalue"), vec!["A", "B"]);
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[1].body, "value");
    }

    #[test]
    fn other_hashes_are_text() {
        let body = "### Temas\nC# y F#\n#rustlang\n#### no es cabecera\nfoo###bar\n";
        let sections = split_sections(body);
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].body,
            "C# y F#\n#rustlang\n#### no es cabecera\nfoo###bar\n"
        );
    }

    #[test]
    fn no_markers_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("plain text only").is_empty());
        assert!(split_sections("###").is_empty());
    }
}

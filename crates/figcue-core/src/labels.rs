//! Pairing labeler output with encoded tokens.

use crate::error::FigcueError;
use crate::features::FeaturedBody;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureLabel {
    /// `<figure_head>`: the heading line, e.g. "Figure 3".
    Head,
    /// `<label>`: the figure number.
    Label,
    /// `<figDesc>`: caption text.
    Description,
    /// `<content>`: text drawn inside the figure.
    Content,
    /// Body prose and anything unrecognized.
    Other,
}

impl FigureLabel {
    /// Parse one label column. A leading `I-` marks the first token of a
    /// new span and is reported separately.
    pub fn parse(raw: &str) -> (FigureLabel, bool) {
        let raw = raw.trim();
        let (begins, tag) = match raw.strip_prefix("I-") {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let label = match tag {
            "<figure_head>" => FigureLabel::Head,
            "<label>" => FigureLabel::Label,
            "<figDesc>" => FigureLabel::Description,
            "<content>" => FigureLabel::Content,
            _ => FigureLabel::Other,
        };
        (label, begins)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            FigureLabel::Head => "<figure_head>",
            FigureLabel::Label => "<label>",
            FigureLabel::Description => "<figDesc>",
            FigureLabel::Content => "<content>",
            FigureLabel::Other => "<other>",
        }
    }

    /// Heading, number or caption text of a figure.
    pub fn is_caption(&self) -> bool {
        matches!(
            self,
            FigureLabel::Head | FigureLabel::Label | FigureLabel::Description
        )
    }
}

impl fmt::Display for FigureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A retained token with the label the oracle gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledToken {
    pub text: String,
    pub position: usize,
    pub page_number: usize,
    pub label: FigureLabel,
    pub begins: bool,
}

/// Pair every record of `body` with the label in the last column of the
/// matching line of `labeled`.
///
/// Blank lines are ignored. The line count must equal the record count and
/// every line must start with its record's token.
pub fn align_labels(body: &FeaturedBody, labeled: &str) -> Result<Vec<LabeledToken>, FigcueError> {
    let lines: Vec<&str> = labeled.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() != body.records.len() {
        return Err(FigcueError::MisalignedLabels {
            expected: body.records.len(),
            actual: lines.len(),
        });
    }

    lines
        .iter()
        .zip(&body.records)
        .enumerate()
        .map(|(i, (line, record))| {
            let mut cols = line.split_whitespace();
            let first = cols.next().unwrap_or_default();
            let last = line.split_whitespace().last().unwrap_or_default();
            if first != record.text || cols.next().is_none() {
                return Err(FigcueError::LabelMismatch {
                    line: i + 1,
                    expected: record.text.clone(),
                    found: line.to_string(),
                });
            }
            let (label, begins) = FigureLabel::parse(last);
            Ok(LabeledToken {
                text: record.text.clone(),
                position: record.position,
                page_number: record.page_number,
                label,
                begins,
            })
        })
        .collect()
}

/// A run of consecutive tokens sharing one label on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSegment {
    pub label: FigureLabel,
    pub page_number: usize,
    pub text: String,
    /// Token positions of the first and last token, inclusive.
    pub first_position: usize,
    pub last_position: usize,
}

/// Group labeled tokens into segments. A segment ends where the label or
/// the page changes, or where a token begins a new span.
pub fn group_segments(tokens: &[LabeledToken]) -> Vec<LabeledSegment> {
    let mut segments: Vec<LabeledSegment> = Vec::new();

    for token in tokens {
        let continues = segments.last().is_some_and(|s| {
            s.label == token.label && s.page_number == token.page_number && !token.begins
        });
        match segments.last_mut() {
            Some(segment) if continues => {
                if needs_space(&segment.text, &token.text) {
                    segment.text.push(' ');
                }
                segment.text.push_str(&token.text);
                segment.last_position = token.position;
            }
            _ => segments.push(LabeledSegment {
                label: token.label,
                page_number: token.page_number,
                text: token.text.clone(),
                first_position: token.position,
                last_position: token.position,
            }),
        }
    }

    segments
}

/// Only the heading and caption segments.
pub fn caption_segments(tokens: &[LabeledToken]) -> Vec<LabeledSegment> {
    group_segments(tokens)
        .into_iter()
        .filter(|s| s.label.is_caption())
        .collect()
}

fn needs_space(before: &str, next: &str) -> bool {
    let closes = matches!(next, "." | "," | ":" | ";" | ")" | "]" | "!" | "?");
    let opens = before.ends_with('(') || before.ends_with('[');
    !closes && !opens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::encode;
    use crate::model::{LayoutDocument, LayoutToken};

    fn body(words: &[&str]) -> FeaturedBody {
        let doc = LayoutDocument::from_blocks(vec![(
            2,
            words.iter().map(|w| LayoutToken::new(*w)).collect(),
        )]);
        encode(&doc, &[doc.full_range()]).unwrap()
    }

    fn labeled(body: &FeaturedBody, labels: &[&str]) -> String {
        body.records
            .iter()
            .zip(labels)
            .map(|(r, l)| format!("{} {}\n", r.to_line(), l))
            .collect()
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(FigureLabel::parse("I-<figDesc>"), (FigureLabel::Description, true));
        assert_eq!(FigureLabel::parse("<label>"), (FigureLabel::Label, false));
        assert_eq!(FigureLabel::parse("<body>"), (FigureLabel::Other, false));
    }

    #[test]
    fn test_align_and_group() {
        let b = body(&["Fig", ".", "1", ":", "A", "cat", "sits", "here"]);
        let text = labeled(
            &b,
            &[
                "I-<figure_head>",
                "<figure_head>",
                "I-<label>",
                "I-<figDesc>",
                "<figDesc>",
                "<figDesc>",
                "I-<other>",
                "<other>",
            ],
        );
        let tokens = align_labels(&b, &format!("{text}\n")).unwrap();
        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[2].label, FigureLabel::Label);
        assert_eq!(tokens[2].page_number, 2);

        let captions = caption_segments(&tokens);
        let texts: Vec<&str> = captions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Fig.", "1", ": A cat"]);
        assert_eq!(captions[2].first_position, 3);
        assert_eq!(captions[2].last_position, 5);

        let all = group_segments(&tokens);
        assert_eq!(all.last().unwrap().text, "sits here");
    }

    #[test]
    fn test_line_count_mismatch() {
        let b = body(&["one", "two"]);
        let text = labeled(&b, &["<other>"]);
        match align_labels(&b, &text) {
            Err(FigcueError::MisalignedLabels { expected, actual }) => {
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("expected MisalignedLabels, got {other:?}"),
        }
    }

    #[test]
    fn test_token_mismatch() {
        let b = body(&["one", "two"]);
        let err = align_labels(&b, "one x <other>\nthree x <other>\n").unwrap_err();
        assert!(matches!(err, FigcueError::LabelMismatch { line: 2, .. }));
        assert!(err.is_external());
    }

    #[test]
    fn test_empty_body_accepts_empty_output() {
        let b = FeaturedBody::default();
        assert!(align_labels(&b, "").unwrap().is_empty());
    }
}

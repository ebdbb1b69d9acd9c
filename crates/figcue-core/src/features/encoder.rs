use crate::error::FigcueError;
use crate::features::lexical;
use crate::features::record::{
    BlockStatus, FeatureRecord, FontSizeStatus, FontStatus, LineStatus, PageStatus,
};
use crate::model::{LayoutDocument, LayoutToken, ZoneRange};

/// Number of buckets for relative positions.
pub const NBBINS: usize = 12;

/// Font sizes closer than this count as the same size.
pub const FONT_SIZE_TOLERANCE: f64 = 1e-3;

/// Token the layout step inserts where a new page begins.
pub const PAGE_MARKER: &str = "@PAGE";
/// Prefix of tokens that stand for an embedded image.
pub const IMAGE_MARKER: &str = "@IMAGE";
/// File extensions that mark embedded-resource tokens.
pub const RESOURCE_EXTENSIONS: &[&str] = &[".pbm", ".vec", ".jpg", ".png"];

/// Encoder output: one record and one token text per retained token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturedBody {
    pub records: Vec<FeatureRecord>,
    pub tokenization: Vec<String>,
}

impl FeaturedBody {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newline-delimited feature text for the labeler.
    pub fn feature_text(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_line());
            out.push('\n');
        }
        out
    }
}

/// How the encoder treats one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRole {
    /// The literal `\n` token.
    Newline,
    /// The page-break marker.
    PageBreak,
    /// Whitespace or an embedded-resource marker.
    Skipped,
    /// Emitted, carrying the whitespace-stripped text.
    Retained(String),
}

pub fn token_role(text: &str) -> TokenRole {
    if text == "\n" {
        return TokenRole::Newline;
    }
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        TokenRole::Skipped
    } else if stripped.starts_with(PAGE_MARKER) {
        TokenRole::PageBreak
    } else if is_resource_marker(&stripped) {
        TokenRole::Skipped
    } else {
        TokenRole::Retained(stripped)
    }
}

pub fn is_resource_marker(text: &str) -> bool {
    text.starts_with(IMAGE_MARKER) || RESOURCE_EXTENSIONS.iter().any(|ext| text.contains(ext))
}

/// `floor(position * NBBINS / total)`, clamped to `[0, NBBINS - 1]`.
pub fn relative_bin(position: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (position.saturating_mul(NBBINS) / total).min(NBBINS - 1)
}

/// A block clipped to one zone range.
#[derive(Debug, Clone, Copy)]
struct Segment {
    page_number: usize,
    start: usize,
    end: usize,
}

/// Fold state of one `encode` call.
struct FoldState {
    current_font: Option<String>,
    current_font_size: Option<f64>,
    page_pending: bool,
    document_position: usize,
    document_length: usize,
    page_position: usize,
    page_length: usize,
    /// The computed record waiting for its successor before it is emitted.
    pending: Option<FeatureRecord>,
}

/// Encode the body tokens selected by `ranges` into feature records.
///
/// Records are emitted with a one-token lag: a record stays pending until
/// the next retained token is seen, so a page break can retag it `PAGEEND`.
/// Empty `ranges` or a document without blocks give an empty result.
pub fn encode(
    document: &LayoutDocument,
    ranges: &[ZoneRange],
) -> Result<FeaturedBody, FigcueError> {
    if ranges.is_empty() || document.blocks.is_empty() {
        return Ok(FeaturedBody::default());
    }
    validate(document, ranges)?;

    let segments = segments(document, ranges);
    let roles: Vec<Vec<TokenRole>> = segments
        .iter()
        .map(|s| {
            document.tokens[s.start..s.end]
                .iter()
                .map(|t| token_role(&t.text))
                .collect()
        })
        .collect();

    let mut state = FoldState {
        current_font: None,
        current_font_size: None,
        page_pending: true,
        document_position: 0,
        document_length: ranges.iter().map(ZoneRange::len).sum(),
        page_position: 0,
        page_length: page_length(&roles, 0, 0),
        pending: None,
    };
    let mut body = FeaturedBody::default();
    let mut skipped = 0usize;

    for (seg_idx, segment) in segments.iter().enumerate() {
        let seg_roles = &roles[seg_idx];
        let mut block_started = false;
        let mut line_start = true;

        for (n, role) in seg_roles.iter().enumerate() {
            let position = segment.start + n;
            match role {
                TokenRole::Newline => {
                    line_start = true;
                    skipped += 1;
                }
                TokenRole::Skipped => skipped += 1,
                TokenRole::PageBreak => {
                    skipped += 1;
                    line_start = true;
                    state.page_pending = true;
                    state.page_position = 0;
                    state.page_length = page_length(&roles, seg_idx, n + 1);
                    state.document_position += 1;
                    continue;
                }
                TokenRole::Retained(text) => {
                    let (line_end, block_end) = lookahead(&seg_roles[n + 1..]);
                    let line = if line_start || !block_started {
                        LineStatus::LineStart
                    } else if line_end {
                        LineStatus::LineEnd
                    } else {
                        LineStatus::LineIn
                    };
                    let block = if !block_started {
                        BlockStatus::BlockStart
                    } else if block_end {
                        BlockStatus::BlockEnd
                    } else {
                        BlockStatus::BlockIn
                    };

                    let record = build_record(
                        &mut state,
                        &document.tokens[position],
                        text,
                        position,
                        segment.page_number,
                        line,
                        block,
                    );
                    if let Some(previous) = state.pending.replace(record) {
                        emit(&mut body, document, previous);
                    }

                    block_started = true;
                    line_start = false;
                }
            }
            state.document_position += 1;
            state.page_position += 1;
        }
    }

    if let Some(last) = state.pending.take() {
        emit(&mut body, document, last);
    }

    tracing::debug!(
        records = body.records.len(),
        skipped,
        document_length = state.document_length,
        "encoded body tokens"
    );

    Ok(body)
}

fn emit(body: &mut FeaturedBody, document: &LayoutDocument, record: FeatureRecord) {
    body.tokenization
        .push(document.tokens[record.position].text.clone());
    body.records.push(record);
}

fn build_record(
    state: &mut FoldState,
    token: &LayoutToken,
    text: &str,
    position: usize,
    page_number: usize,
    line: LineStatus,
    block: BlockStatus,
) -> FeatureRecord {
    let page = if state.page_pending {
        state.page_pending = false;
        if let Some(previous) = state.pending.as_mut() {
            previous.page = PageStatus::PageEnd;
        }
        PageStatus::PageStart
    } else {
        PageStatus::PageIn
    };

    let font = match &state.current_font {
        Some(current) if *current == token.font => FontStatus::SameFont,
        _ => {
            state.current_font = Some(token.font.clone());
            FontStatus::NewFont
        }
    };

    let size = token.font_size;
    let font_size = match state.current_font_size {
        None => FontSizeStatus::HigherFont,
        Some(current) if (size - current).abs() < FONT_SIZE_TOLERANCE => {
            FontSizeStatus::SameFontSize
        }
        Some(current) if current < size => FontSizeStatus::HigherFont,
        Some(_) => FontSizeStatus::LowerFont,
    };
    state.current_font_size = Some(size);

    FeatureRecord {
        text: text.to_string(),
        position,
        page_number,
        line,
        block,
        page,
        punctuation: lexical::punctuation(text),
        capitalisation: lexical::capitalisation(text),
        digits: lexical::digits(text),
        single_char: lexical::is_single_char(text),
        common_word: lexical::is_common_word(text),
        proper_name: lexical::is_proper_name(text),
        month: lexical::is_month(text),
        year: lexical::is_year(text),
        email: lexical::is_email(text),
        url: lexical::is_url(text),
        bold: token.bold,
        italic: token.italic,
        font,
        font_size,
        document_bin: relative_bin(state.document_position, state.document_length),
        page_bin: relative_bin(state.page_position, state.page_length),
    }
}

/// `(line_end, block_end)` for a token followed by `rest` in its block.
///
/// The line ends when a newline or page break comes before the next retained
/// token; the block ends when no retained token follows.
fn lookahead(rest: &[TokenRole]) -> (bool, bool) {
    for role in rest {
        match role {
            TokenRole::Retained(_) => return (false, false),
            TokenRole::Newline | TokenRole::PageBreak => {
                let block_end = !rest.iter().any(|r| matches!(r, TokenRole::Retained(_)));
                return (true, block_end);
            }
            TokenRole::Skipped => {}
        }
    }
    (true, true)
}

/// Tokens from `(seg_idx, offset)` up to the next page break or the end.
fn page_length(roles: &[Vec<TokenRole>], seg_idx: usize, offset: usize) -> usize {
    let mut length = 0;
    for (i, seg_roles) in roles.iter().enumerate().skip(seg_idx) {
        let from = if i == seg_idx { offset } else { 0 };
        for role in seg_roles.iter().skip(from) {
            if *role == TokenRole::PageBreak {
                return length;
            }
            length += 1;
        }
    }
    length
}

fn segments(document: &LayoutDocument, ranges: &[ZoneRange]) -> Vec<Segment> {
    let mut out = Vec::new();
    for range in ranges.iter().filter(|r| !r.is_empty()) {
        for block in &document.blocks {
            let start = block.start_token.max(range.start);
            let end = block.end_token.min(range.end);
            if start < end {
                out.push(Segment {
                    page_number: block.page_number,
                    start,
                    end,
                });
            }
        }
    }
    out
}

/// Reject ranges and blocks that would visit a token twice or read past the
/// token stream.
fn validate(document: &LayoutDocument, ranges: &[ZoneRange]) -> Result<(), FigcueError> {
    let token_count = document.tokens.len();

    let mut previous_end = 0;
    for range in ranges {
        if range.start > range.end {
            return Err(invalid(range.start, range.end, "start is after end"));
        }
        if range.end > token_count {
            return Err(invalid(
                range.start,
                range.end,
                &format!("document has {token_count} token(s)"),
            ));
        }
        if range.start < previous_end {
            return Err(invalid(
                range.start,
                range.end,
                "ranges overlap or are out of order",
            ));
        }
        previous_end = range.end;
    }

    let mut previous_end = 0;
    for block in &document.blocks {
        if block.start_token > block.end_token || block.end_token > token_count {
            return Err(invalid(
                block.start_token,
                block.end_token,
                "block lies outside the token stream",
            ));
        }
        if block.start_token < previous_end {
            return Err(invalid(
                block.start_token,
                block.end_token,
                "blocks overlap or are out of order",
            ));
        }
        previous_end = block.end_token;
    }

    Ok(())
}

fn invalid(start: usize, end: usize, reason: &str) -> FigcueError {
    FigcueError::InvalidRange {
        start,
        end,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::record::{DigitClass, Punctuation};
    use crate::model::Block;

    fn tok(text: &str) -> LayoutToken {
        LayoutToken {
            text: text.to_string(),
            font: "Times".into(),
            font_size: 10.0,
            ..Default::default()
        }
    }

    fn doc(blocks: &[&[&str]]) -> LayoutDocument {
        LayoutDocument::from_blocks(
            blocks
                .iter()
                .map(|b| (0, b.iter().map(|t| tok(t)).collect()))
                .collect(),
        )
    }

    fn encode_all(d: &LayoutDocument) -> FeaturedBody {
        encode(d, &[d.full_range()]).unwrap()
    }

    #[test]
    fn test_caption_example() {
        let d = doc(&[&["Fig", ".", "1", ":", "A", "cat", "\n"]]);
        let body = encode_all(&d);

        assert_eq!(body.len(), 6);
        assert_eq!(body.tokenization, vec!["Fig", ".", "1", ":", "A", "cat"]);

        let first = &body.records[0];
        assert_eq!(first.line, LineStatus::LineStart);
        assert_eq!(first.block, BlockStatus::BlockStart);
        assert_eq!(first.page, PageStatus::PageStart);

        let last = &body.records[5];
        assert_eq!(last.text, "cat");
        assert_eq!(last.line, LineStatus::LineEnd);
        assert_eq!(last.block, BlockStatus::BlockEnd);

        assert_eq!(body.records[2].digits, DigitClass::AllDigit);
        assert_eq!(body.records[1].punctuation, Punctuation::Dot);
        assert_eq!(body.records[3].punctuation, Punctuation::Punct);
        assert_eq!(body.records[2].line, LineStatus::LineIn);
        assert_eq!(body.records[2].block, BlockStatus::BlockIn);
    }

    #[test]
    fn test_page_break_retags_previous_record() {
        let d = doc(&[
            &["Results", "are", "shown"],
            &["below", "\n", PAGE_MARKER],
            &["Figure", "2", "shows"],
        ]);
        let body = encode_all(&d);

        let texts: Vec<&str> = body.records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Results", "are", "shown", "below", "Figure", "2", "shows"]);

        let below = &body.records[3];
        assert_eq!(below.page, PageStatus::PageEnd);
        let figure = &body.records[4];
        assert_eq!(figure.page, PageStatus::PageStart);
        assert_eq!(figure.page_bin, 0);
        assert_eq!(body.records[5].page, PageStatus::PageIn);
        assert_eq!(body.records[2].page, PageStatus::PageIn);
    }

    #[test]
    fn test_skipped_tokens_keep_alignment() {
        let d = doc(&[
            &["@IMAGE", "img-1.png", "Table", "  ", "1", "\n"],
            &["plot.vec", "Values", "scan.jpg", "x.pbm"],
        ]);
        let body = encode_all(&d);
        assert_eq!(body.tokenization, vec!["Table", "1", "Values"]);
        assert_eq!(body.records.len(), body.tokenization.len());
        assert_eq!(body.records[0].block, BlockStatus::BlockStart);
        assert_eq!(body.records[0].line, LineStatus::LineStart);
        assert_eq!(body.records[2].block, BlockStatus::BlockStart);
        assert_eq!(body.records[2].position, 7);
        // counters advance over skipped tokens: "Values" is the 8th of 10
        assert_eq!(body.records[2].document_bin, 7 * NBBINS / 10);
    }

    #[test]
    fn test_newline_sets_line_boundaries() {
        let d = doc(&[&["one", "two", "\n", "three", "four"]]);
        let body = encode_all(&d);
        let lines: Vec<LineStatus> = body.records.iter().map(|r| r.line).collect();
        assert_eq!(
            lines,
            vec![
                LineStatus::LineStart,
                LineStatus::LineEnd,
                LineStatus::LineStart,
                LineStatus::LineEnd,
            ]
        );
        assert_eq!(body.records[1].block, BlockStatus::BlockIn);
        assert_eq!(body.records[3].block, BlockStatus::BlockEnd);
    }

    #[test]
    fn test_font_transitions() {
        let mut d = doc(&[&["a", "b", "c", "d"]]);
        d.tokens[1].font_size = 12.4;
        d.tokens[2].font = "Helvetica".into();
        d.tokens[2].font_size = 12.9;
        d.tokens[3].font = "Helvetica".into();
        d.tokens[3].font_size = 8.0;
        let body = encode_all(&d);

        let fonts: Vec<FontStatus> = body.records.iter().map(|r| r.font).collect();
        assert_eq!(
            fonts,
            vec![
                FontStatus::NewFont,
                FontStatus::SameFont,
                FontStatus::NewFont,
                FontStatus::SameFont,
            ]
        );
        let sizes: Vec<FontSizeStatus> = body.records.iter().map(|r| r.font_size).collect();
        assert_eq!(
            sizes,
            vec![
                FontSizeStatus::HigherFont,
                FontSizeStatus::HigherFont,
                FontSizeStatus::HigherFont,
                FontSizeStatus::LowerFont,
            ]
        );
    }

    #[test]
    fn test_fractional_font_size_drop() {
        let mut d = doc(&[&["Body", "Fig", "1", "small"]]);
        d.tokens[0].font_size = 9.96;
        d.tokens[1].font_size = 9.5;
        d.tokens[2].font_size = 9.5;
        d.tokens[3].font_size = 9.0;
        let body = encode_all(&d);

        let sizes: Vec<FontSizeStatus> = body.records.iter().map(|r| r.font_size).collect();
        assert_eq!(
            sizes,
            vec![
                FontSizeStatus::HigherFont,
                FontSizeStatus::LowerFont,
                FontSizeStatus::SameFontSize,
                FontSizeStatus::LowerFont,
            ]
        );
    }

    #[test]
    fn test_bins_stay_in_bounds() {
        let words: Vec<String> = (0..100).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let d = doc(&[&refs[..37], &refs[37..]]);
        let body = encode_all(&d);
        assert_eq!(body.len(), 100);
        assert!(body
            .records
            .iter()
            .all(|r| r.document_bin < NBBINS && r.page_bin < NBBINS));
        assert_eq!(body.records[0].document_bin, 0);
        assert_eq!(body.records[99].document_bin, NBBINS - 1);
    }

    #[test]
    fn test_ranges_select_body_tokens() {
        let d = doc(&[&["Title", "words"], &["body", "text", "here"], &["Refs"]]);
        let body = encode(&d, &[ZoneRange::new(3, 6)]).unwrap();
        assert_eq!(body.tokenization, vec!["text", "here", "Refs"]);
        // clipped block starts a block
        assert_eq!(body.records[0].block, BlockStatus::BlockStart);
        assert_eq!(body.records[1].block, BlockStatus::BlockEnd);
        assert_eq!(body.records[2].block, BlockStatus::BlockStart);
    }

    #[test]
    fn test_empty_inputs_give_empty_result() {
        let d = doc(&[&["a"]]);
        assert!(encode(&d, &[]).unwrap().is_empty());
        let no_blocks = LayoutDocument {
            tokens: vec![tok("a")],
            blocks: vec![],
        };
        assert!(encode(&no_blocks, &[ZoneRange::new(0, 1)]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_ranges_are_fatal() {
        let d = doc(&[&["a", "b", "c"]]);
        assert!(matches!(
            encode(&d, &[ZoneRange::new(0, 9)]),
            Err(FigcueError::InvalidRange { .. })
        ));
        assert!(encode(&d, &[ZoneRange::new(2, 1)]).is_err());
        assert!(encode(&d, &[ZoneRange::new(0, 2), ZoneRange::new(1, 3)]).is_err());

        let overlapping = LayoutDocument {
            tokens: d.tokens.clone(),
            blocks: vec![
                Block {
                    page_number: 0,
                    start_token: 0,
                    end_token: 2,
                },
                Block {
                    page_number: 0,
                    start_token: 1,
                    end_token: 3,
                },
            ],
        };
        assert!(encode(&overlapping, &[ZoneRange::new(0, 3)]).is_err());
    }

    #[test]
    fn test_encode_is_repeatable() {
        let d = doc(&[&["Fig", "1"], &[PAGE_MARKER, "next"]]);
        let first = encode_all(&d);
        let second = encode_all(&d);
        assert_eq!(first, second);
    }

    #[test]
    fn test_relative_bin() {
        assert_eq!(relative_bin(0, 0), 0);
        assert_eq!(relative_bin(5, 10), 6);
        assert_eq!(relative_bin(10, 10), NBBINS - 1);
        assert_eq!(relative_bin(50, 10), NBBINS - 1);
    }
}

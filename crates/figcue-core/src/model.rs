use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute declaring a clip zone on a region marker.
pub const ZONE_ID_ATTR: &str = "idClipZone";
/// Attribute claiming membership of a clip zone on any other element.
pub const ZONE_REF_ATTR: &str = "clipZone";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Declares a clip zone and its geometry.
    RegionMarker,
    /// A `<GROUP>` element, the canvas drawable that carries a figure's paths.
    Group,
    /// Any other drawable (path, text, image).
    Drawable,
}

impl PrimitiveKind {
    pub fn classify(tag: &str, declares_zone: bool) -> PrimitiveKind {
        if declares_zone {
            PrimitiveKind::RegionMarker
        } else if tag.eq_ignore_ascii_case("group") {
            PrimitiveKind::Group
        } else {
            PrimitiveKind::Drawable
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::RegionMarker => write!(f, "region"),
            PrimitiveKind::Group => write!(f, "group"),
            PrimitiveKind::Drawable => write!(f, "drawable"),
        }
    }
}

/// Integer pixel bounds. Attribute values are parsed as floats and truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Bounds {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_floats(x: f64, y: f64, width: f64, height: f64) -> Self {
        Bounds::new(x as i32, y as i32, width as i32, height as i32)
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Strict interior overlap, as `java.awt.Rectangle::intersects` defines it.
    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (ax2, ay2) = (
            i64::from(self.x) + i64::from(self.width),
            i64::from(self.y) + i64::from(self.height),
        );
        let (bx2, by2) = (
            i64::from(other.x) + i64::from(other.width),
            i64::from(other.y) + i64::from(other.height),
        );
        i64::from(self.x) < bx2
            && i64::from(other.x) < ax2
            && i64::from(self.y) < by2
            && i64::from(other.y) < ay2
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x >= self.x
            && other.y >= self.y
            && i64::from(other.x) + i64::from(other.width)
                <= i64::from(self.x) + i64::from(self.width)
            && i64::from(other.y) + i64::from(other.height)
                <= i64::from(self.y) + i64::from(self.height)
    }
}

/// One top-level element of a vector page file.
///
/// `events` holds the element's complete markup (start tag through matching
/// end tag) so a merged zone can be written back without losing children.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicPrimitive {
    pub tag: String,
    pub kind: PrimitiveKind,
    pub bounds: Bounds,
    pub zone: Option<String>,
    pub(crate) events: Vec<Event<'static>>,
}

impl GraphicPrimitive {
    pub(crate) fn from_events(
        tag: String,
        kind: PrimitiveKind,
        bounds: Bounds,
        zone: Option<String>,
        events: Vec<Event<'static>>,
    ) -> Self {
        GraphicPrimitive {
            tag,
            kind,
            bounds,
            zone,
            events,
        }
    }

    /// Build a region marker element, `<CLIPZONE idClipZone=".." .../>`.
    pub fn region_marker(key: &str, bounds: Bounds) -> Self {
        Self::synthetic("CLIPZONE", PrimitiveKind::RegionMarker, ZONE_ID_ATTR, key, bounds)
    }

    /// Build a member element claiming zone `key`.
    pub fn member(tag: &str, key: &str, bounds: Bounds) -> Self {
        let kind = PrimitiveKind::classify(tag, false);
        Self::synthetic(tag, kind, ZONE_REF_ATTR, key, bounds)
    }

    fn synthetic(tag: &str, kind: PrimitiveKind, attr: &str, key: &str, bounds: Bounds) -> Self {
        let x = bounds.x.to_string();
        let y = bounds.y.to_string();
        let width = bounds.width.to_string();
        let height = bounds.height.to_string();
        let mut start = BytesStart::new(tag.to_string());
        start.push_attribute((attr, key));
        start.push_attribute(("x", x.as_str()));
        start.push_attribute(("y", y.as_str()));
        start.push_attribute(("width", width.as_str()));
        start.push_attribute(("height", height.as_str()));
        let events = vec![
            Event::Start(start.into_owned()),
            Event::End(BytesEnd::new(tag.to_string())),
        ];
        GraphicPrimitive {
            tag: tag.to_string(),
            kind,
            bounds,
            zone: (!key.is_empty()).then(|| key.to_string()),
            events,
        }
    }

    /// Name of the attribute carrying this primitive's zone key.
    pub fn zone_attribute(&self) -> &'static str {
        match self.kind {
            PrimitiveKind::RegionMarker => ZONE_ID_ATTR,
            _ => ZONE_REF_ATTR,
        }
    }

    /// The zone key, with empty keys treated as absent.
    pub fn zone_key(&self) -> Option<&str> {
        self.zone.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// One lexical unit of body text, as produced by the upstream layout step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutToken {
    pub text: String,
    #[serde(default)]
    pub page_number: usize,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub font_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub rotation: bool,
    #[serde(default)]
    pub rotation_value: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl LayoutToken {
    pub fn new(text: impl Into<String>) -> Self {
        LayoutToken {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A layout block: a half-open span `[start_token, end_token)` of the
/// document token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub page_number: usize,
    pub start_token: usize,
    pub end_token: usize,
}

/// A half-open span `[start, end)` of token positions to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRange {
    pub start: usize,
    pub end: usize,
}

impl ZoneRange {
    pub fn new(start: usize, end: usize) -> Self {
        ZoneRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token stream plus its block segmentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub tokens: Vec<LayoutToken>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl LayoutDocument {
    /// Build a document from blocks given as token lists, assigning
    /// consecutive token positions.
    pub fn from_blocks(blocks: Vec<(usize, Vec<LayoutToken>)>) -> Self {
        let mut doc = LayoutDocument::default();
        for (page_number, tokens) in blocks {
            let start_token = doc.tokens.len();
            doc.tokens.extend(tokens);
            doc.blocks.push(Block {
                page_number,
                start_token,
                end_token: doc.tokens.len(),
            });
        }
        doc
    }

    /// A range covering every token.
    pub fn full_range(&self) -> ZoneRange {
        ZoneRange::new(0, self.tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_truncate_floats() {
        let b = Bounds::from_floats(10.9, 20.2, 30.7, 40.99);
        assert_eq!(b, Bounds::new(10, 20, 30, 40));
        assert_eq!(b.area(), 1200);
    }

    #[test]
    fn test_intersects_and_contains() {
        let outer = Bounds::new(0, 0, 100, 100);
        let inner = Bounds::new(10, 10, 20, 20);
        let apart = Bounds::new(200, 200, 5, 5);
        let touching = Bounds::new(100, 0, 10, 10);
        assert!(outer.intersects(&inner));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.intersects(&apart));
        assert!(!outer.intersects(&touching));
    }

    #[test]
    fn test_synthetic_primitives() {
        let m = GraphicPrimitive::region_marker("p1_c1", Bounds::new(0, 0, 1, 1));
        assert_eq!(m.kind, PrimitiveKind::RegionMarker);
        assert_eq!(m.zone_attribute(), ZONE_ID_ATTR);
        let g = GraphicPrimitive::member("GROUP", "p1_c1", Bounds::default());
        assert_eq!(g.kind, PrimitiveKind::Group);
        let blank = GraphicPrimitive::member("PATH", "", Bounds::default());
        assert_eq!(blank.zone_key(), None);
    }

    #[test]
    fn test_from_blocks_assigns_positions() {
        let doc = LayoutDocument::from_blocks(vec![
            (0, vec![LayoutToken::new("a"), LayoutToken::new("b")]),
            (0, vec![LayoutToken::new("c")]),
        ]);
        assert_eq!(doc.blocks[1].start_token, 2);
        assert_eq!(doc.blocks[1].end_token, 3);
        assert_eq!(doc.full_range(), ZoneRange::new(0, 3));
    }
}

//! Reading and writing `.vec` page files.
//!
//! A vector page file is an XML document whose root (`VECTORIALIMAGES`) holds
//! one element per graphic primitive. Every top-level element carries
//! `x`/`y`/`width`/`height` and either `idClipZone` (region markers) or
//! `clipZone` (everything else).

use crate::error::FigcueError;
use crate::model::{Bounds, GraphicPrimitive, PrimitiveKind, ZONE_ID_ATTR, ZONE_REF_ATTR};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

pub const ROOT_ELEMENT: &str = "VECTORIALIMAGES";

/// Parse a vector page file into its top-level primitives, in document order.
pub fn parse_vec(xml: &str) -> Result<Vec<GraphicPrimitive>, FigcueError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut primitives = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<(BytesStart<'static>, Vec<Event<'static>>)> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => seen_root = true,
                    2 => {
                        let start = e.into_owned();
                        let events = vec![Event::Start(start.clone())];
                        current = Some((start, events));
                    }
                    _ => push_event(&mut current, Event::Start(e.into_owned())),
                }
            }
            Event::Empty(e) => match depth {
                0 => seen_root = true,
                1 => {
                    let start = e.into_owned();
                    let events = vec![Event::Empty(start.clone())];
                    primitives.push(build_primitive(&start, events)?);
                }
                _ => push_event(&mut current, Event::Empty(e.into_owned())),
            },
            Event::End(e) => {
                if depth == 0 {
                    return Err(FigcueError::VecParse("unbalanced end tag".into()));
                }
                if depth == 2 {
                    if let Some((start, mut events)) = current.take() {
                        events.push(Event::End(e.into_owned()));
                        primitives.push(build_primitive(&start, events)?);
                    }
                } else if depth > 2 {
                    push_event(&mut current, Event::End(e.into_owned()));
                }
                depth -= 1;
            }
            other => {
                if depth >= 2 {
                    push_event(&mut current, other.into_owned());
                }
            }
        }
    }

    if !seen_root {
        return Err(FigcueError::VecParse("document has no root element".into()));
    }
    if depth != 0 {
        return Err(FigcueError::VecParse("document ends inside an element".into()));
    }

    Ok(primitives)
}

/// Read and parse a vector page file from disk.
pub fn read_vec_file(path: &Path) -> Result<Vec<GraphicPrimitive>, FigcueError> {
    let xml = std::fs::read_to_string(path)?;
    parse_vec(&xml)
}

fn push_event(
    current: &mut Option<(BytesStart<'static>, Vec<Event<'static>>)>,
    event: Event<'static>,
) {
    if let Some((_, events)) = current.as_mut() {
        events.push(event);
    }
}

fn build_primitive(
    start: &BytesStart<'_>,
    events: Vec<Event<'static>>,
) -> Result<GraphicPrimitive, FigcueError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_string();

    let mut zone_id: Option<String> = None;
    let mut zone_ref: Option<String> = None;
    let mut x = None;
    let mut y = None;
    let mut width = None;
    let mut height = None;

    for attr in start.attributes() {
        let attr = attr.map_err(|e| FigcueError::VecParse(format!("<{tag}>: {e}")))?;
        let value = attr.unescape_value()?.to_string();
        match attr.key.as_ref() {
            b"idClipZone" => zone_id = Some(value),
            b"clipZone" => zone_ref = Some(value),
            b"x" => x = Some(value),
            b"y" => y = Some(value),
            b"width" => width = Some(value),
            b"height" => height = Some(value),
            _ => {}
        }
    }

    let bounds = Bounds::from_floats(
        parse_number(&tag, "x", x.as_deref())?,
        parse_number(&tag, "y", y.as_deref())?,
        parse_number(&tag, "width", width.as_deref())?,
        parse_number(&tag, "height", height.as_deref())?,
    );

    let kind = PrimitiveKind::classify(&tag, zone_id.is_some());
    let zone = zone_id.or(zone_ref);

    Ok(GraphicPrimitive::from_events(tag, kind, bounds, zone, events))
}

fn parse_number(tag: &str, attribute: &str, value: Option<&str>) -> Result<f64, FigcueError> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| FigcueError::InvalidAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        })
}

/// Serialize zone members as a standalone vector page file.
///
/// Each member's zone attribute is rewritten to its current key, so merged
/// members all point at the surviving zone.
pub fn render_zone<'a, I>(members: I) -> Result<Vec<u8>, FigcueError>
where
    I: IntoIterator<Item = &'a GraphicPrimitive>,
{
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

    for primitive in members {
        for (i, event) in primitive.events.iter().enumerate() {
            if i == 0 {
                writer.write_event(rewrite_zone(primitive, event)?)?;
            } else {
                writer.write_event(event.clone())?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    Ok(writer.into_inner())
}

/// Write zone members to `path`.
pub fn write_zone_file<'a, I>(path: &Path, members: I) -> Result<(), FigcueError>
where
    I: IntoIterator<Item = &'a GraphicPrimitive>,
{
    let bytes = render_zone(members)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn rewrite_zone(
    primitive: &GraphicPrimitive,
    event: &Event<'static>,
) -> Result<Event<'static>, FigcueError> {
    let (start, empty) = match event {
        Event::Start(s) => (s, false),
        Event::Empty(s) => (s, true),
        other => return Ok(other.clone()),
    };

    let key = match primitive.zone_key() {
        Some(k) => k,
        None => return Ok(event.clone()),
    };
    let zone_attr = primitive.zone_attribute();
    let stale_attr = if zone_attr == ZONE_ID_ATTR {
        ZONE_REF_ATTR
    } else {
        ZONE_ID_ATTR
    };

    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut rewritten = BytesStart::new(name);
    let mut replaced = false;
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FigcueError::VecParse(e.to_string()))?;
        let attr_key = attr.key.as_ref();
        if attr_key == zone_attr.as_bytes() {
            rewritten.push_attribute((zone_attr, key));
            replaced = true;
        } else if attr_key != stale_attr.as_bytes() {
            rewritten.push_attribute(attr);
        }
    }
    if !replaced {
        rewritten.push_attribute((zone_attr, key));
    }

    let rewritten = rewritten.into_owned();
    Ok(if empty {
        Event::Empty(rewritten)
    } else {
        Event::Start(rewritten)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VECTORIALIMAGES>
  <CLIPZONE idClipZone="p3_c1" x="10.5" y="20.0" width="100.9" height="50"/>
  <GROUP clipZone="p3_c1" x="12" y="22" width="30" height="10">
    <PATH d="M 0 0 L 10 10"/>
    <PATH d="M 10 10 L 20 0"/>
  </GROUP>
  <TEXT clipZone="" x="1" y="1" width="5" height="5">orphan</TEXT>
</VECTORIALIMAGES>
"#;

    #[test]
    fn test_parse_vec_primitives() {
        let prims = parse_vec(PAGE).unwrap();
        assert_eq!(prims.len(), 3);

        assert_eq!(prims[0].kind, PrimitiveKind::RegionMarker);
        assert_eq!(prims[0].zone_key(), Some("p3_c1"));
        assert_eq!(prims[0].bounds, Bounds::new(10, 20, 100, 50));

        assert_eq!(prims[1].kind, PrimitiveKind::Group);
        assert_eq!(prims[1].zone_key(), Some("p3_c1"));
        // start, two empty paths, end
        assert_eq!(prims[1].events.len(), 4);

        assert_eq!(prims[2].kind, PrimitiveKind::Drawable);
        assert_eq!(prims[2].zone_key(), None);
    }

    #[test]
    fn test_missing_numeric_attribute_is_fatal() {
        let xml = r#"<VECTORIALIMAGES><PATH clipZone="p1_c1" x="1" y="1" width="2"/></VECTORIALIMAGES>"#;
        match parse_vec(xml) {
            Err(FigcueError::InvalidAttribute { tag, attribute }) => {
                assert_eq!(tag, "PATH");
                assert_eq!(attribute, "height");
            }
            other => panic!("expected InvalidAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_number_is_fatal() {
        let xml = r#"<VECTORIALIMAGES><PATH clipZone="p1" x="abc" y="1" width="2" height="2"/></VECTORIALIMAGES>"#;
        assert!(matches!(
            parse_vec(xml),
            Err(FigcueError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(parse_vec("").is_err());
    }

    #[test]
    fn test_render_rewrites_zone_key() {
        let mut prims = parse_vec(PAGE).unwrap();
        prims[1].zone = Some("p3_c9".into());
        let out = String::from_utf8(render_zone(&prims[..2]).unwrap()).unwrap();

        assert!(out.contains("<VECTORIALIMAGES>"));
        assert!(out.contains(r#"clipZone="p3_c9""#));
        assert!(out.contains(r#"idClipZone="p3_c1""#));
        assert!(out.contains("M 10 10 L 20 0"));

        let reparsed = parse_vec(&out).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed[1].zone_key(), Some("p3_c9"));
        assert_eq!(reparsed[1].bounds, prims[1].bounds);
    }
}

use crate::clipzone::MergedZones;
use crate::error::FigcueError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const VEC_EXTENSION: &str = "vec";

static PAGE_IN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"p(\d+)").expect("valid page pattern"));

/// Page number embedded in a zone key: the digits following the first `p`
/// that is followed by digits ("p3_c1" -> 3).
pub fn page_number(key: &str) -> Result<usize, FigcueError> {
    PAGE_IN_KEY
        .captures(key)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| FigcueError::ZoneKey(key.to_string()))
}

/// Where one surviving zone gets written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOutput {
    pub key: String,
    pub page_number: usize,
    /// 1-based index among the zones of the same page.
    pub figure_number: usize,
    pub file_name: String,
}

/// Assign an output file name to every zone.
///
/// A page with one zone gets `page<N>.vec`; a page with several gets
/// `page<N>Figure<M>.vec`, numbered in accumulation order. Fails on the first
/// key without a page number.
pub fn plan_outputs(zones: &MergedZones) -> Result<Vec<ZoneOutput>, FigcueError> {
    let pages: Vec<(String, usize)> = zones
        .keys()
        .map(|k| page_number(k).map(|p| (k.to_string(), p)))
        .collect::<Result<_, _>>()?;

    let mut per_page: HashMap<usize, usize> = HashMap::new();
    for (_, page) in &pages {
        *per_page.entry(*page).or_default() += 1;
    }

    let mut seen: HashMap<usize, usize> = HashMap::new();
    let outputs = pages
        .into_iter()
        .map(|(key, page_number)| {
            let figure_number = {
                let n = seen.entry(page_number).or_default();
                *n += 1;
                *n
            };
            let file_name = if per_page[&page_number] > 1 {
                format!("page{page_number}Figure{figure_number}.{VEC_EXTENSION}")
            } else {
                format!("page{page_number}.{VEC_EXTENSION}")
            };
            ZoneOutput {
                key,
                page_number,
                figure_number,
                file_name,
            }
        })
        .collect();

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipzone::{merge, MergeOptions, OverlapPolicy};
    use crate::model::{Bounds, GraphicPrimitive};

    #[test]
    fn test_page_number() {
        assert_eq!(page_number("p3_c1").unwrap(), 3);
        assert_eq!(page_number("p12").unwrap(), 12);
        assert_eq!(page_number("clip_p7_z2").unwrap(), 7);
        assert!(matches!(page_number("zone1"), Err(FigcueError::ZoneKey(_))));
        assert!(page_number("p_").is_err());
    }

    fn pair(key: &str) -> Vec<GraphicPrimitive> {
        vec![
            GraphicPrimitive::member("PATH", key, Bounds::new(0, 0, 1, 1)),
            GraphicPrimitive::member("PATH", key, Bounds::new(0, 0, 1, 1)),
        ]
    }

    #[test]
    fn test_plan_outputs_numbers_shared_pages() {
        let mut prims = pair("p1_a");
        prims.extend(pair("p2_a"));
        prims.extend(pair("p1_b"));
        let options = MergeOptions {
            overlap: OverlapPolicy::RectIntersect,
            ..Default::default()
        };
        let zones = merge(prims, &options);
        let outputs = plan_outputs(&zones).unwrap();

        let names: Vec<&str> = outputs.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(names, vec!["page1Figure1.vec", "page2.vec", "page1Figure2.vec"]);
        assert_eq!(outputs[2].figure_number, 2);
    }

    #[test]
    fn test_plan_outputs_rejects_bad_key() {
        let zones = merge(pair("figure"), &MergeOptions::default());
        assert!(matches!(plan_outputs(&zones), Err(FigcueError::ZoneKey(k)) if k == "figure"));
    }
}

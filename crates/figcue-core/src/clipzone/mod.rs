pub mod merge;
pub mod naming;

use crate::model::{Bounds, GraphicPrimitive, PrimitiveKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use merge::merge;

/// How two region markers are judged to overlap during the merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Every compared pair overlaps, so all keyed markers on a page collapse
    /// into the smallest one.
    #[default]
    AlwaysOverlap,
    /// Rectangles share interior area.
    RectIntersect,
    /// One rectangle encloses the other.
    RectContains,
}

/// Policy used when no other is configured.
pub const DEFAULT_OVERLAP_POLICY: OverlapPolicy = OverlapPolicy::AlwaysOverlap;

impl OverlapPolicy {
    pub fn overlaps(&self, a: &Bounds, b: &Bounds) -> bool {
        match self {
            OverlapPolicy::AlwaysOverlap => true,
            OverlapPolicy::RectIntersect => a.intersects(b),
            OverlapPolicy::RectContains => a.contains(b) || b.contains(a),
        }
    }

    pub fn from_name(name: &str) -> Option<OverlapPolicy> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "always" | "always_overlap" => Some(OverlapPolicy::AlwaysOverlap),
            "intersect" | "rect_intersect" => Some(OverlapPolicy::RectIntersect),
            "contains" | "rect_contains" => Some(OverlapPolicy::RectContains),
            _ => None,
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::AlwaysOverlap => write!(f, "always_overlap"),
            OverlapPolicy::RectIntersect => write!(f, "rect_intersect"),
            OverlapPolicy::RectContains => write!(f, "rect_contains"),
        }
    }
}

/// Which merged groups survive the filtering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// Drop groups with a single member.
    #[default]
    DropSingletons,
    /// Drop groups without a `<GROUP>` drawable.
    RequireGroup,
}

impl EligibilityPolicy {
    pub fn is_eligible<'a, I>(&self, members: I) -> bool
    where
        I: IntoIterator<Item = &'a GraphicPrimitive>,
    {
        match self {
            EligibilityPolicy::DropSingletons => members.into_iter().nth(1).is_some(),
            EligibilityPolicy::RequireGroup => members
                .into_iter()
                .any(|p| p.kind == PrimitiveKind::Group),
        }
    }

    pub fn from_name(name: &str) -> Option<EligibilityPolicy> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "singletons" | "drop_singletons" => Some(EligibilityPolicy::DropSingletons),
            "group" | "require_group" => Some(EligibilityPolicy::RequireGroup),
            _ => None,
        }
    }
}

impl fmt::Display for EligibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityPolicy::DropSingletons => write!(f, "drop_singletons"),
            EligibilityPolicy::RequireGroup => write!(f, "require_group"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    #[serde(default)]
    pub overlap: OverlapPolicy,
    #[serde(default)]
    pub eligibility: EligibilityPolicy,
}

/// Result of a merge: the page's primitives (zone keys already rewritten)
/// and the surviving groups as index lists into them.
#[derive(Debug, Clone, Default)]
pub struct MergedZones {
    primitives: Vec<GraphicPrimitive>,
    groups: IndexMap<String, Vec<usize>>,
}

impl MergedZones {
    pub(crate) fn new(primitives: Vec<GraphicPrimitive>, groups: IndexMap<String, Vec<usize>>) -> Self {
        MergedZones { primitives, groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|k| k.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<ZoneGroup<'_>> {
        self.groups
            .get_key_value(key)
            .map(|(key, indices)| ZoneGroup {
                key,
                primitives: &self.primitives,
                indices,
            })
    }

    /// Surviving groups in accumulation order.
    pub fn iter(&self) -> impl Iterator<Item = ZoneGroup<'_>> {
        self.groups.iter().map(|(key, indices)| ZoneGroup {
            key,
            primitives: &self.primitives,
            indices,
        })
    }

    /// Every surviving member, group after group, as a fresh primitive list.
    pub fn flatten(&self) -> Vec<GraphicPrimitive> {
        self.iter()
            .flat_map(|g| g.members().cloned().collect::<Vec<_>>())
            .collect()
    }
}

/// A borrowed view of one surviving zone.
#[derive(Debug, Clone, Copy)]
pub struct ZoneGroup<'a> {
    pub key: &'a str,
    primitives: &'a [GraphicPrimitive],
    indices: &'a [usize],
}

impl<'a> ZoneGroup<'a> {
    pub fn members(&self) -> impl Iterator<Item = &'a GraphicPrimitive> + 'a {
        let primitives = self.primitives;
        self.indices.iter().map(move |&i| &primitives[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn region_count(&self) -> usize {
        self.members()
            .filter(|p| p.kind == PrimitiveKind::RegionMarker)
            .count()
    }
}

use crate::clipzone::{MergeOptions, MergedZones};
use crate::model::{GraphicPrimitive, PrimitiveKind};
use indexmap::IndexMap;

/// Group primitives by zone key, merge overlapping region markers, and drop
/// ineligible groups.
///
/// Steps:
/// 1. Bucket every keyed primitive under its key, in document order.
/// 2. Visit keyed region markers by ascending area (stable). Each marker
///    absorbs every later marker the overlap policy pairs it with: the
///    absorbed group's members move to the end of the survivor's group and
///    take the survivor's key, and the absorbed group is deleted.
/// 3. Apply the eligibility policy.
pub fn merge(primitives: Vec<GraphicPrimitive>, options: &MergeOptions) -> MergedZones {
    let mut primitives = primitives;

    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (idx, primitive) in primitives.iter().enumerate() {
        if let Some(key) = primitive.zone_key() {
            groups.entry(key.to_string()).or_default().push(idx);
        }
    }

    let mut markers: Vec<usize> = primitives
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == PrimitiveKind::RegionMarker && p.zone_key().is_some())
        .map(|(i, _)| i)
        .collect();
    markers.sort_by_key(|&i| primitives[i].bounds.area());

    let mut absorbed = vec![false; markers.len()];
    let mut merges = 0usize;
    for a in 0..markers.len() {
        if absorbed[a] {
            continue;
        }
        for b in (a + 1)..markers.len() {
            if absorbed[b] {
                continue;
            }
            let (i, j) = (markers[a], markers[b]);
            if !options
                .overlap
                .overlaps(&primitives[i].bounds, &primitives[j].bounds)
            {
                continue;
            }

            let survivor = zone_of(&primitives[i]);
            let victim = zone_of(&primitives[j]);
            if survivor != victim {
                absorb(&mut groups, &mut primitives, &survivor, &victim);
                merges += 1;
            }
            absorbed[b] = true;
        }
    }

    let before = groups.len();
    groups.retain(|_, indices| {
        options
            .eligibility
            .is_eligible(indices.iter().map(|&i| &primitives[i]))
    });

    tracing::debug!(
        markers = markers.len(),
        merges,
        dropped = before - groups.len(),
        surviving = groups.len(),
        "merged clip zones"
    );

    MergedZones::new(primitives, groups)
}

fn zone_of(primitive: &GraphicPrimitive) -> String {
    primitive.zone_key().unwrap_or_default().to_string()
}

/// Move the `victim` group into `survivor` and retarget its members' keys.
fn absorb(
    groups: &mut IndexMap<String, Vec<usize>>,
    primitives: &mut [GraphicPrimitive],
    survivor: &str,
    victim: &str,
) {
    let Some(moved) = groups.shift_remove(victim) else {
        return;
    };
    for &idx in &moved {
        primitives[idx].zone = Some(survivor.to_string());
    }
    groups.entry(survivor.to_string()).or_default().extend(moved);
}

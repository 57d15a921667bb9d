use super::players::compare_names;
use super::strategy::OpeningRef;
use crate::indexes::Indexes;
use crate::model::OpeningEntry;
use serde::Serialize;
use std::collections::BTreeMap;

/// ECO volumes, always all present.
pub const ECO_CATEGORIES: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Openings sharing one classifier code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcoGroup {
    pub code: String,
    pub root_name: String,
    pub root_fen: String,
    pub root_opening: OpeningRef,
    pub children: Vec<OpeningRef>,
    pub total_games: usize,
}

/// Volume letter -> groups ordered by code.
pub type EcoCategories = BTreeMap<String, Vec<EcoGroup>>;

fn opening_ref(name: &str, entry: &OpeningEntry) -> OpeningRef {
    OpeningRef {
        name: name.to_string(),
        eco: entry.eco.clone(),
        fen: entry.fen.clone(),
        game_count: entry.game_ids.len(),
    }
}

/// The family head: a name with no `: variation` suffix, else the shortest.
fn is_better_root(candidate: &OpeningRef, current: &OpeningRef) -> bool {
    let key = |o: &OpeningRef| (o.name.contains(':'), o.name.len());
    let (a, b) = (key(candidate), key(current));
    a < b || (a == b && compare_names(&candidate.name, &current.name).is_lt())
}

fn build_group(code: &str, mut members: Vec<OpeningRef>) -> Option<EcoGroup> {
    if members.is_empty() {
        return None;
    }
    let mut root_at = 0;
    for (i, member) in members.iter().enumerate().skip(1) {
        if is_better_root(member, &members[root_at]) {
            root_at = i;
        }
    }
    let root = members.remove(root_at);
    members.sort_by(|a, b| compare_names(&a.name, &b.name));

    let total_games = root.game_count + members.iter().map(|c| c.game_count).sum::<usize>();
    Some(EcoGroup {
        code: code.to_string(),
        root_name: root.name.clone(),
        root_fen: root.fen.clone(),
        root_opening: root,
        children: members,
        total_games,
    })
}

/// Group the name index by classifier code under its ECO volume.
///
/// Header codes from the code index are only compared against: a differing
/// tally is logged and otherwise ignored.
pub fn list_openings_by_eco_category(indexes: &Indexes) -> EcoCategories {
    let mut by_code: BTreeMap<&str, Vec<OpeningRef>> = BTreeMap::new();
    for (name, entry) in &indexes.openings {
        by_code
            .entry(entry.eco.as_str())
            .or_default()
            .push(opening_ref(name, entry));
    }

    let mut categories: EcoCategories = ECO_CATEGORIES
        .iter()
        .map(|c| (c.to_string(), Vec::new()))
        .collect();

    for (code, members) in by_code {
        let volume = code.get(..1).map(str::to_ascii_uppercase).unwrap_or_default();
        let Some(groups) = categories.get_mut(&volume) else {
            tracing::debug!(code, "Skipping code outside ECO volumes A-E");
            continue;
        };
        let Some(group) = build_group(code, members) else {
            continue;
        };

        let header_tally = indexes.eco.get(code).map_or(0, Vec::len);
        if header_tally != group.total_games {
            tracing::warn!(
                code,
                name_index = group.total_games,
                code_index = header_tally,
                "ECO tally mismatch between name and code indexes"
            );
        }
        groups.push(group);
    }

    categories
}

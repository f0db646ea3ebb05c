//! Terraform output parsing: plan/apply/destroy summaries and provider
//! installation lines. Requires `-no-color` output (the assembler always
//! appends it).

use serde::Serialize;

use crate::utils::parser::{extract_all_groups, extract_count, extract_groups};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanChanges {
    pub add: u32,
    pub change: u32,
    pub destroy: u32,
}

impl PlanChanges {
    pub fn has_changes(&self) -> bool {
        self.add > 0 || self.change > 0 || self.destroy > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyResults {
    pub added: u32,
    pub changed: u32,
    pub destroyed: u32,
}

/// `Plan: 3 to add, 1 to change, 0 to destroy` — all zeros when absent.
pub fn parse_plan_changes(output: &str) -> PlanChanges {
    let mut changes = PlanChanges::default();

    if let Some(groups) = extract_groups(
        output,
        r"Plan: (\d+) to add, (\d+) to change, (\d+) to destroy",
    ) {
        let nums: Vec<u32> = groups.iter().filter_map(|s| s.parse().ok()).collect();
        if let [add, change, destroy] = nums[..] {
            changes.add = add;
            changes.change = change;
            changes.destroy = destroy;
        }
    }

    changes
}

/// `Apply complete! Resources: 2 added, 1 changed, 0 destroyed`.
pub fn parse_apply_results(output: &str) -> ApplyResults {
    let mut results = ApplyResults::default();

    if let Some(groups) = extract_groups(output, r"(\d+) added, (\d+) changed, (\d+) destroyed") {
        let nums: Vec<u32> = groups.iter().filter_map(|s| s.parse().ok()).collect();
        if let [added, changed, destroyed] = nums[..] {
            results.added = added;
            results.changed = changed;
            results.destroyed = destroyed;
        }
    }

    results
}

/// `Destroy complete! Resources: 4 destroyed` — zero when absent.
pub fn count_destroyed(output: &str) -> u32 {
    extract_count(output, r"Destroy complete! Resources: (\d+) destroyed")
}

/// `- Installed hashicorp/aws v5.0.1` lines from init output, rendered as
/// `name@version`.
pub fn parse_providers(output: &str) -> Vec<String> {
    extract_all_groups(output, r"- Installed ([^\s]+) v([\d.]+)")
        .into_iter()
        .filter_map(|groups| match &groups[..] {
            [name, version] => Some(format!("{}@{}", name, version)),
            _ => None,
        })
        .collect()
}

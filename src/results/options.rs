use super::types::*;
use crate::chart::ChartSelection;
use serde::Serialize;

/// Property preselected when nothing else is configured
pub const DEFAULT_PROPERTY: &str = "avg_fps";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    pub available: Vec<String>,
    pub selected: Vec<String>,
}

impl OptionSet {
    fn offer(&mut self, value: &str) {
        if !self.available.iter().any(|v| v == value) {
            self.available.push(value.to_string());
        }
    }
}

/// The chart options a report offers: every property that can be charted and every
/// server that ran something, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayOptions {
    pub properties: OptionSet,
    pub servers: OptionSet,
}

impl DisplayOptions {
    pub fn from_tree(tree: &ResultTree) -> Self {
        Self::with_default_properties(tree, &[DEFAULT_PROPERTY.to_string()])
    }

    /// Preselect `defaults` and the first server seen.
    pub fn with_default_properties(tree: &ResultTree, defaults: &[String]) -> Self {
        let mut options = Self::default();
        options.properties.selected = defaults.to_vec();

        for record in tree.testcases() {
            // the "no results" placeholder has nothing to chart
            if record.result_type().is_none() {
                continue;
            }
            options.servers.offer(&record.identity.server_name);
            for property in DESCRIPTIVE_PROPERTIES {
                options.properties.offer(property);
            }
            if let Some(perf) = record.performance() {
                for metric in FpsMetric::ALL {
                    if perf.fps(metric).is_some() {
                        options.properties.offer(metric.name());
                    }
                }
            }
        }

        if let Some(first) = options.servers.available.first() {
            options.servers.selected = vec![first.clone()];
        }
        options
    }

    pub fn selection(&self) -> ChartSelection {
        ChartSelection::new(
            self.properties.selected.iter().cloned(),
            self.servers.selected.iter().cloned(),
        )
    }
}

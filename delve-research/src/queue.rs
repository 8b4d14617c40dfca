//! Ordered work queue of unmet research items

use crate::strategy::DepthHeuristic;
use crate::types::{Category, ProgressRecord, ResearchItem, ResearchPlan};
use delve_core::Document;

/// Unmet items, grouped by category in priority order and never interleaved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkQueue {
    items: Vec<ResearchItem>,
}

impl WorkQueue {
    /// Every item of every unmet category, minus items that are already deep enough
    pub fn build(
        plan: &ResearchPlan,
        progress: &ProgressRecord,
        evidence: &[Document],
        depth: &DepthHeuristic,
    ) -> Self {
        let items = Category::ALL
            .iter()
            .filter(|category| !progress.is_met(**category))
            .flat_map(|category| {
                plan.items(*category)
                    .iter()
                    .map(move |text| ResearchItem::new(*category, text.clone()))
            })
            .filter(|item| !depth.is_sufficiently_deep(&item.text, evidence))
            .collect();

        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResearchItem> {
        self.items.iter()
    }
}

impl IntoIterator for WorkQueue {
    type Item = ResearchItem;
    type IntoIter = std::vec::IntoIter<ResearchItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, warn};

use crate::Result;

/// A kind of quest that can appear in the statistics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestType {
    /// Stable identifier, as stored in the statistics
    pub name: String,

    /// Icon resource shown inside the bubble
    pub icon: String,
}

impl QuestType {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Resolves quest type names found in the statistics
pub trait QuestTypeRegistry: Send + Sync {
    fn get_by_name(&self, name: &str) -> Option<QuestType>;
}

impl QuestTypeRegistry for Vec<QuestType> {
    fn get_by_name(&self, name: &str) -> Option<QuestType> {
        self.iter().find(|quest_type| quest_type.name == name).cloned()
    }
}

impl QuestTypeRegistry for HashMap<String, QuestType> {
    fn get_by_name(&self, name: &str) -> Option<QuestType> {
        self.get(name).cloned()
    }
}

/// Where solved-quest counts come from
pub trait StatisticsSource: Send + Sync {
    /// Solved count per quest type name
    fn solved_counts(&self) -> Result<HashMap<String, u32>>;

    /// Whether the counts are still being synchronized and may be incomplete
    fn is_synchronizing(&self) -> bool {
        false
    }
}

impl StatisticsSource for HashMap<String, u32> {
    fn solved_counts(&self) -> Result<HashMap<String, u32>> {
        Ok(self.clone())
    }
}

/// What the scene shows instead of bubbles when there are none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Statistics are still being synchronized
    Syncing,

    /// The user has not solved any quest yet
    NoQuests,
}

/// Solved counts resolved against the quest type registry, largest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvedQuests {
    entries: Vec<(QuestType, u32)>,
}

impl SolvedQuests {
    /// Loads the counts, dropping unknown quest types and zero counts.
    ///
    /// Entries are ordered by count descending, ties by quest type name.
    pub fn load(source: &dyn StatisticsSource, registry: &dyn QuestTypeRegistry) -> Result<Self> {
        let counts = source.solved_counts()?;

        let mut entries = Vec::with_capacity(counts.len());
        for (name, count) in counts {
            if count == 0 {
                continue;
            }
            match registry.get_by_name(&name) {
                Some(quest_type) => entries.push((quest_type, count)),
                None => warn!("skipping statistics for unknown quest type {}", name),
            }
        }
        entries.sort_by(|(a, count_a), (b, count_b)| match count_b.cmp(count_a) {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        });

        debug!("loaded statistics for {} quest types", entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(QuestType, u32)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(quest_type, _)| quest_type.name == name)
            .map(|(_, count)| *count)
    }

    /// Sum of all solved counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| u64::from(*count)).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

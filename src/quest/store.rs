//! The published quest graph.
//!
//! A `QuestStore` is only ever built whole by the loader and is immutable
//! afterwards. Readers share it through `Arc`; a reload builds a new one.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use super::definition::{Objective, Quest};
use super::relations::{QuestRelationResult, QuestRelations};
use crate::error::ContentError;

#[derive(Debug)]
pub struct QuestStore {
    quests: BTreeMap<u32, Quest>,
    auto_push: Vec<u32>,
    objective_index: HashMap<u32, u32>,
    exclusive_groups: HashMap<i32, Vec<u32>>,
    area_triggers: HashMap<u32, Vec<u32>>,
    relations: QuestRelations,
    loaded_at: DateTime<Utc>,
}

impl QuestStore {
    pub fn new(
        quests: BTreeMap<u32, Quest>,
        auto_push: Vec<u32>,
        objective_index: HashMap<u32, u32>,
        exclusive_groups: HashMap<i32, Vec<u32>>,
        area_triggers: HashMap<u32, Vec<u32>>,
        relations: QuestRelations,
    ) -> Self {
        Self {
            quests,
            auto_push,
            objective_index,
            exclusive_groups,
            area_triggers,
            relations,
            loaded_at: Utc::now(),
        }
    }

    /// An empty store, published before the first load completes
    pub fn empty() -> Self {
        Self::new(
            BTreeMap::new(),
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            QuestRelations::default(),
        )
    }

    /// Get a quest by ID
    pub fn get_quest_template(&self, quest_id: u32) -> Option<&Quest> {
        self.quests.get(&quest_id)
    }

    /// Get a quest that must exist
    pub fn try_get_quest_template(&self, quest_id: u32) -> Result<&Quest, ContentError> {
        self.quests
            .get(&quest_id)
            .ok_or(ContentError::UnknownQuest(quest_id))
    }

    /// All quests in id order
    pub fn quest_templates(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Quests pushed to the player without a quest giver
    pub fn auto_push_quests(&self) -> impl Iterator<Item = &Quest> {
        self.auto_push.iter().filter_map(|id| self.quests.get(id))
    }

    pub fn get_exclusive_quest_group_bounds(&self, group: i32) -> &[u32] {
        self.exclusive_groups
            .get(&group)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_quest_objective(&self, objective_id: u32) -> Option<&Objective> {
        let quest_id = self.objective_index.get(&objective_id)?;
        self.quests.get(quest_id)?.get_objective(objective_id)
    }

    pub fn get_quests_for_area_trigger(&self, trigger_id: u32) -> &[u32] {
        lookup(&self.area_triggers, trigger_id)
    }

    /// Quests a creature starts, subject to quest availability
    pub fn get_creature_quest_relations(&self, entry: u32) -> QuestRelationResult<'_> {
        QuestRelationResult::new(lookup(&self.relations.creature_starters, entry), true)
    }

    /// Quests a creature ends
    pub fn get_creature_quest_involved_relations(&self, entry: u32) -> QuestRelationResult<'_> {
        QuestRelationResult::new(lookup(&self.relations.creature_enders, entry), false)
    }

    /// Creatures that end `quest_id`
    pub fn get_creature_quest_involved_relations_reverse(&self, quest_id: u32) -> &[u32] {
        lookup(&self.relations.creature_enders_reverse, quest_id)
    }

    pub fn get_go_quest_relations(&self, entry: u32) -> QuestRelationResult<'_> {
        QuestRelationResult::new(lookup(&self.relations.gameobject_starters, entry), true)
    }

    pub fn get_go_quest_involved_relations(&self, entry: u32) -> QuestRelationResult<'_> {
        QuestRelationResult::new(lookup(&self.relations.gameobject_enders, entry), false)
    }

    pub fn get_go_quest_involved_relations_reverse(&self, quest_id: u32) -> &[u32] {
        lookup(&self.relations.gameobject_enders_reverse, quest_id)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn objective_count(&self) -> usize {
        self.objective_index.len()
    }

    /// When this snapshot finished loading
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl Default for QuestStore {
    fn default() -> Self {
        Self::empty()
    }
}

fn lookup(map: &HashMap<u32, Vec<u32>>, key: u32) -> &[u32] {
    map.get(&key).map(Vec::as_slice).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::rows::QuestTemplateRow;

    fn store_with(ids: &[u32]) -> QuestStore {
        let quests = ids
            .iter()
            .map(|&id| (id, Quest::from_row(&QuestTemplateRow { id, ..Default::default() })))
            .collect();
        QuestStore::new(
            quests,
            vec![ids[0], 9999],
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            QuestRelations::default(),
        )
    }

    #[test]
    fn test_try_get_unknown_quest() {
        let store = store_with(&[5, 3]);

        assert_eq!(store.try_get_quest_template(3).unwrap().id, 3);
        assert!(matches!(
            store.try_get_quest_template(4),
            Err(ContentError::UnknownQuest(4))
        ));
    }

    #[test]
    fn test_iteration_is_in_id_order() {
        let store = store_with(&[5, 3, 8]);
        let ids: Vec<u32> = store.quest_templates().map(|q| q.id).collect();
        assert_eq!(ids, vec![3, 5, 8]);
        // ids without a quest are skipped
        assert_eq!(store.auto_push_quests().count(), 1);
    }

    #[test]
    fn test_empty_lookups() {
        let store = QuestStore::empty();
        assert!(store.is_empty());
        assert!(store.get_quest_objective(1).is_none());
        assert!(store.get_exclusive_quest_group_bounds(1).is_empty());
        assert!(store.get_creature_quest_relations(1).is_empty());
        assert!(store.get_go_quest_involved_relations_reverse(1).is_empty());
    }
}

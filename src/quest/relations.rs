//! Quest relation indices: which creatures, gameobjects and area triggers
//! start or end which quests.

use std::collections::HashMap;
use tracing::{error, info, warn};

use super::definition::QuestSpecialFlags;
use super::loader::{ContentCleanup, QuestLoader};
use super::rows::{QuestRelationRow, QuestTables};
use crate::data::{ContentStores, GameObjectType, NpcFlags};

/// Source tables of the relation indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    CreatureStarter,
    CreatureEnder,
    GameObjectStarter,
    GameObjectEnder,
    AreaTrigger,
}

impl RelationKind {
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::CreatureStarter => "creature_queststarter",
            RelationKind::CreatureEnder => "creature_questender",
            RelationKind::GameObjectStarter => "gameobject_queststarter",
            RelationKind::GameObjectEnder => "gameobject_questender",
            RelationKind::AreaTrigger => "areatrigger_involvedrelation",
        }
    }
}

/// Decides whether a quest is currently offered.
///
/// Quest pools and seasonal events live outside the content store; whatever
/// tracks them implements this.
pub trait QuestAvailability {
    fn is_quest_active(&self, quest_id: u32) -> bool;
}

impl<F: Fn(u32) -> bool> QuestAvailability for F {
    fn is_quest_active(&self, quest_id: u32) -> bool {
        self(quest_id)
    }
}

/// Availability source that treats every quest as active
#[derive(Debug, Clone, Copy, Default)]
pub struct AllQuestsActive;

impl QuestAvailability for AllQuestsActive {
    fn is_quest_active(&self, _quest_id: u32) -> bool {
        true
    }
}

/// Quests related to one creature or gameobject
#[derive(Debug, Clone, Copy)]
pub struct QuestRelationResult<'a> {
    quest_ids: &'a [u32],
    only_active: bool,
}

impl<'a> QuestRelationResult<'a> {
    pub fn new(quest_ids: &'a [u32], only_active: bool) -> Self {
        Self {
            quest_ids,
            only_active,
        }
    }

    /// Whether `quest_id` is in the set, honoring the only-active filter
    pub fn has_quest(&self, quest_id: u32, availability: &impl QuestAvailability) -> bool {
        self.quest_ids.contains(&quest_id)
            && (!self.only_active || availability.is_quest_active(quest_id))
    }

    /// Every quest id, unfiltered
    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        self.quest_ids.iter().copied()
    }

    /// Quest ids passing the only-active filter
    pub fn active<'b>(
        &'b self,
        availability: &'b impl QuestAvailability,
    ) -> impl Iterator<Item = u32> + 'b {
        self.iter()
            .filter(move |&id| !self.only_active || availability.is_quest_active(id))
    }

    pub fn is_only_active(&self) -> bool {
        self.only_active
    }

    pub fn len(&self) -> usize {
        self.quest_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quest_ids.is_empty()
    }
}

/// Forward and reverse relation multimaps
#[derive(Debug, Clone, Default)]
pub struct QuestRelations {
    /// Creature entry -> quests it starts
    pub creature_starters: HashMap<u32, Vec<u32>>,
    /// Creature entry -> quests it ends
    pub creature_enders: HashMap<u32, Vec<u32>>,
    /// Quest id -> creatures ending it
    pub creature_enders_reverse: HashMap<u32, Vec<u32>>,
    pub gameobject_starters: HashMap<u32, Vec<u32>>,
    pub gameobject_enders: HashMap<u32, Vec<u32>>,
    pub gameobject_enders_reverse: HashMap<u32, Vec<u32>>,
}

impl QuestRelations {
    /// Number of forward relations
    pub fn len(&self) -> usize {
        [
            &self.creature_starters,
            &self.creature_enders,
            &self.gameobject_starters,
            &self.gameobject_enders,
        ]
        .iter()
        .flat_map(|map| map.values())
        .map(Vec::len)
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Push `value` under `key` unless the pair is already present
fn insert_unique(map: &mut HashMap<u32, Vec<u32>>, key: u32, value: u32) -> bool {
    let values = map.entry(key).or_default();
    if values.contains(&value) {
        return false;
    }
    values.push(value);
    true
}

impl QuestLoader<'_> {
    /// Area trigger -> quests explored through it
    pub(super) fn load_area_trigger_relations(
        &mut self,
        rows: &[QuestRelationRow],
        stores: &ContentStores,
    ) -> HashMap<u32, Vec<u32>> {
        let table = RelationKind::AreaTrigger.table();
        let mut by_trigger = HashMap::new();
        let mut count = 0;

        for row in rows {
            if !stores.area_triggers.contains(row.entry) {
                error!(
                    "Table `{}` has area trigger {} for quest {} but such trigger does not exist",
                    table, row.entry, row.quest_id
                );
                self.dropped_rows += 1;
                self.schedule_cleanup(ContentCleanup::Relation {
                    table,
                    entry: row.entry,
                    quest_id: row.quest_id,
                });
                continue;
            }

            if !self.relation_quest_exists(table, row) {
                continue;
            }

            if let Some(quest) = self.quests.get_mut(&row.quest_id) {
                if !quest.has_special_flag(QuestSpecialFlags::EXPLORATION_OR_EVENT) {
                    error!(
                        "Table `{}` has area trigger {} for quest {} which is not flagged \
                         exploration or event, adding the flag",
                        table, row.entry, row.quest_id
                    );
                    quest.set_special_flag(QuestSpecialFlags::EXPLORATION_OR_EVENT);
                }
            }

            if insert_unique(&mut by_trigger, row.entry, row.quest_id) {
                count += 1;
            }
        }

        info!("Loaded {} quest trigger points", count);
        by_trigger
    }

    /// Build the creature and gameobject relation indices
    pub(super) fn load_relations(
        &mut self,
        tables: &QuestTables,
        stores: &mut ContentStores,
    ) -> QuestRelations {
        let mut relations = QuestRelations::default();

        for row in &tables.creature_starters {
            if !self.relation_quest_exists(RelationKind::CreatureStarter.table(), row) {
                continue;
            }
            check_creature_relation(RelationKind::CreatureStarter, row, stores);
            insert_unique(&mut relations.creature_starters, row.entry, row.quest_id);
        }

        for row in &tables.creature_enders {
            if !self.relation_quest_exists(RelationKind::CreatureEnder.table(), row) {
                continue;
            }
            check_creature_relation(RelationKind::CreatureEnder, row, stores);
            if insert_unique(&mut relations.creature_enders, row.entry, row.quest_id) {
                insert_unique(&mut relations.creature_enders_reverse, row.quest_id, row.entry);
            }
        }

        for row in &tables.gameobject_starters {
            if !self.relation_quest_exists(RelationKind::GameObjectStarter.table(), row) {
                continue;
            }
            check_gameobject_relation(RelationKind::GameObjectStarter, row, stores);
            insert_unique(&mut relations.gameobject_starters, row.entry, row.quest_id);
        }

        for row in &tables.gameobject_enders {
            if !self.relation_quest_exists(RelationKind::GameObjectEnder.table(), row) {
                continue;
            }
            check_gameobject_relation(RelationKind::GameObjectEnder, row, stores);
            if insert_unique(&mut relations.gameobject_enders, row.entry, row.quest_id) {
                insert_unique(&mut relations.gameobject_enders_reverse, row.quest_id, row.entry);
            }
        }

        info!("Loaded {} quest relations", relations.len());
        relations
    }
}

fn check_creature_relation(kind: RelationKind, row: &QuestRelationRow, stores: &mut ContentStores) {
    let Some(creature) = stores.creatures.get_mut(row.entry) else {
        error!(
            "Table `{}` has data for non existing creature entry {}, quest {}",
            kind.table(),
            row.entry,
            row.quest_id
        );
        return;
    };

    if !creature.is_quest_giver() {
        warn!(
            "Table `{}` has creature entry {} for quest {} but npcflag does not include \
             QUESTGIVER, patching",
            kind.table(),
            row.entry,
            row.quest_id
        );
        creature.npc_flags.insert(NpcFlags::QUEST_GIVER);
    }
}

fn check_gameobject_relation(kind: RelationKind, row: &QuestRelationRow, stores: &ContentStores) {
    let Some(gameobject) = stores.gameobjects.get(row.entry) else {
        error!(
            "Table `{}` has data for non existing gameobject entry {}, quest {}",
            kind.table(),
            row.entry,
            row.quest_id
        );
        return;
    };

    if kind == RelationKind::GameObjectEnder && gameobject.kind != GameObjectType::QuestGiver {
        warn!(
            "Table `{}` has gameobject entry {} for quest {} \
             but GO is not GAMEOBJECT_TYPE_QUESTGIVER",
            kind.table(),
            row.entry,
            row.quest_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentConfig;
    use crate::data::{AreaTrigger, CreatureTemplate, GameObjectTemplate};
    use crate::quest::rows::QuestTemplateRow;

    fn relation(entry: u32, quest_id: u32) -> QuestRelationRow {
        QuestRelationRow { entry, quest_id }
    }

    fn stores() -> ContentStores {
        let mut stores = ContentStores::default();
        stores.creatures.insert(CreatureTemplate {
            entry: 197,
            name: "Marshal McBride".to_string(),
            npc_flags: NpcFlags(NpcFlags::QUEST_GIVER),
        });
        stores.creatures.insert(CreatureTemplate {
            entry: 823,
            name: "Deputy Willem".to_string(),
            npc_flags: NpcFlags(NpcFlags::GOSSIP),
        });
        stores.gameobjects.insert(GameObjectTemplate {
            entry: 31,
            name: "Old Lion Statue".to_string(),
            kind: GameObjectType::Generic,
        });
        stores.area_triggers.insert(AreaTrigger::new(88));
        stores
    }

    fn tables() -> QuestTables {
        QuestTables {
            templates: vec![
                QuestTemplateRow { id: 783, ..Default::default() },
                QuestTemplateRow { id: 7, ..Default::default() },
            ],
            creature_starters: vec![relation(197, 783), relation(197, 783), relation(823, 7)],
            creature_enders: vec![relation(197, 783), relation(197, 999)],
            gameobject_starters: vec![relation(31, 7)],
            gameobject_enders: vec![relation(31, 7), relation(31, 404)],
            area_triggers: vec![relation(88, 7), relation(89, 783), relation(88, 404)],
            ..Default::default()
        }
    }

    #[test]
    fn test_relations_for_missing_quests_are_dropped() {
        let config = ContentConfig {
            auto_clean: true,
            ..Default::default()
        };
        let mut stores = stores();
        let load = QuestLoader::load(&config, &tables(), &mut stores);
        let store = &load.store;

        assert!(!store.get_creature_quest_involved_relations(197).iter().any(|q| q == 999));
        assert!(store.get_go_quest_involved_relations(31).iter().all(|q| q == 7));
        assert!(store.get_go_quest_involved_relations_reverse(404).is_empty());
        assert!(store.get_quests_for_area_trigger(88).iter().all(|&q| q == 7));

        assert!(load.cleanup.contains(&ContentCleanup::Relation {
            table: "creature_questender",
            entry: 197,
            quest_id: 999,
        }));
        assert!(load.cleanup.contains(&ContentCleanup::Relation {
            table: "areatrigger_involvedrelation",
            entry: 89,
            quest_id: 783,
        }));
        assert_eq!(load.report.dropped_rows, 4);
    }

    #[test]
    fn test_duplicate_relations_are_stored_once() {
        let mut stores = stores();
        let load = QuestLoader::load(&ContentConfig::default(), &tables(), &mut stores);
        let starters = load.store.get_creature_quest_relations(197);

        assert_eq!(starters.iter().collect::<Vec<_>>(), vec![783]);
        assert_eq!(load.store.get_creature_quest_involved_relations_reverse(783), &[197]);
        assert_eq!(load.report.relations, 5);
    }

    #[test]
    fn test_missing_quest_giver_flag_is_patched() {
        let mut stores = stores();
        QuestLoader::load(&ContentConfig::default(), &tables(), &mut stores);

        let willem = stores.creatures.get(823).unwrap();
        assert!(willem.npc_flags.contains(NpcFlags::GOSSIP | NpcFlags::QUEST_GIVER));
    }

    #[test]
    fn test_area_trigger_sets_exploration_flag() {
        let mut stores = stores();
        let load = QuestLoader::load(&ContentConfig::default(), &tables(), &mut stores);

        assert_eq!(load.store.get_quests_for_area_trigger(88), &[7]);
        assert!(load.store.get_quests_for_area_trigger(89).is_empty());
        let quest = load.store.get_quest_template(7).unwrap();
        assert!(quest.has_special_flag(QuestSpecialFlags::EXPLORATION_OR_EVENT));
        assert_eq!(load.report.area_trigger_relations, 1);
    }

    #[test]
    fn test_only_active_filter() {
        let ids = [1, 2, 3];
        let starters = QuestRelationResult::new(&ids, true);
        let enders = QuestRelationResult::new(&ids, false);
        let odd_only = |quest_id: u32| quest_id % 2 == 1;

        assert!(starters.has_quest(1, &odd_only));
        assert!(!starters.has_quest(2, &odd_only));
        assert!(enders.has_quest(2, &odd_only));
        assert!(!enders.has_quest(4, &AllQuestsActive));
        assert_eq!(starters.active(&odd_only).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(enders.active(&odd_only).count(), 3);
    }
}

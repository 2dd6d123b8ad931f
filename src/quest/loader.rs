//! Quest Loader
//!
//! Builds a complete `QuestStore` from the quest tables in four passes:
//!
//! 1. `quest_template` rows become `Quest`s
//! 2. satellite tables are joined onto the quests by id
//! 3. every quest and objective is checked against the content stores
//! 4. the quest graph is linked and the relation indices are built
//!
//! Bad content is logged and corrected where possible. Loading itself never
//! fails; with auto-clean enabled the offending rows are collected as
//! `ContentCleanup`s for the caller to delete at the source.

use std::collections::{BTreeMap, HashMap};
use tracing::{error, info, warn};

use super::definition::{Quest, QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT};
use super::rows::{QuestRelationRow, QuestTables};
use super::store::QuestStore;
use crate::config::ContentConfig;
use crate::data::ContentStores;

/// A source row scheduled for deletion by auto-clean
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCleanup {
    /// Every row of a satellite table belonging to a quest
    QuestRows { table: &'static str, quest_id: u32 },
    Objective { objective_id: u32 },
    VisualEffect { objective_id: u32 },
    Relation { table: &'static str, entry: u32, quest_id: u32 },
}

/// Counters describing a finished load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub quests: usize,
    pub objectives: usize,
    pub auto_push: usize,
    pub exclusive_groups: usize,
    pub relations: usize,
    pub area_trigger_relations: usize,
    /// Satellite and relation rows that named a missing quest
    pub dropped_rows: usize,
}

/// Result of a full load
#[derive(Debug)]
pub struct QuestLoad {
    pub store: QuestStore,
    pub report: LoadReport,
    pub cleanup: Vec<ContentCleanup>,
}

/// Working state while the quest tables are being loaded
pub struct QuestLoader<'a> {
    pub(super) config: &'a ContentConfig,
    pub(super) quests: BTreeMap<u32, Quest>,
    pub(super) auto_push: Vec<u32>,
    /// Objective id -> owning quest id
    pub(super) objective_index: HashMap<u32, u32>,
    pub(super) exclusive_groups: HashMap<i32, Vec<u32>>,
    pub(super) cleanup: Vec<ContentCleanup>,
    pub(super) dropped_rows: usize,
}

impl<'a> QuestLoader<'a> {
    pub fn new(config: &'a ContentConfig) -> Self {
        Self {
            config,
            quests: BTreeMap::new(),
            auto_push: Vec::new(),
            objective_index: HashMap::new(),
            exclusive_groups: HashMap::new(),
            cleanup: Vec::new(),
            dropped_rows: 0,
        }
    }

    /// Run every pass over `tables` and produce a finished store.
    ///
    /// `stores` is only written to when a creature used by a quest relation
    /// is missing its quest-giver flag.
    pub fn load(
        config: &ContentConfig,
        tables: &QuestTables,
        stores: &mut ContentStores,
    ) -> QuestLoad {
        let mut loader = QuestLoader::new(config);

        loader.load_quest_templates(tables);
        loader.load_satellites(tables);
        loader.validate(stores);
        loader.link_quests();

        let area_triggers = loader.load_area_trigger_relations(&tables.area_triggers, stores);
        let relations = loader.load_relations(tables, stores);

        let report = LoadReport {
            quests: loader.quests.len(),
            objectives: loader.objective_index.len(),
            auto_push: loader.auto_push.len(),
            exclusive_groups: loader.exclusive_groups.len(),
            relations: relations.len(),
            area_trigger_relations: area_triggers.values().map(Vec::len).sum(),
            dropped_rows: loader.dropped_rows,
        };

        let QuestLoader {
            quests,
            auto_push,
            objective_index,
            exclusive_groups,
            cleanup,
            ..
        } = loader;

        let store = QuestStore::new(
            quests,
            auto_push,
            objective_index,
            exclusive_groups,
            area_triggers,
            relations,
        );

        QuestLoad {
            store,
            report,
            cleanup,
        }
    }

    /// Pass 1: one quest per `quest_template` row
    pub(super) fn load_quest_templates(&mut self, tables: &QuestTables) {
        self.quests.clear();
        self.auto_push.clear();

        for row in &tables.templates {
            if self.quests.insert(row.id, Quest::from_row(row)).is_some() {
                warn!("Duplicate quest ID {} in `quest_template`, overwriting", row.id);
            }
        }

        self.auto_push = self
            .quests
            .values()
            .filter(|q| q.is_auto_push())
            .map(|q| q.id)
            .collect();

        info!("Loaded {} quest definitions", self.quests.len());
    }

    /// Pass 2: join every satellite table onto the loaded quests
    pub(super) fn load_satellites(&mut self, tables: &QuestTables) {
        self.join_quest_rows(
            "quest_reward_choice_items",
            &tables.reward_choice_items,
            |row| row.quest_id,
            |quest, row| {
                if let Err(e) = quest.load_reward_choice_items(row) {
                    error!("Table `quest_reward_choice_items` quest {}: {}", quest.id, e);
                }
            },
        );
        self.join_quest_rows(
            "quest_reward_display_spell",
            &tables.reward_display_spells,
            |row| row.quest_id,
            Quest::load_reward_display_spell,
        );
        self.join_quest_rows(
            "quest_details",
            &tables.details,
            |row| row.quest_id,
            Quest::load_quest_details,
        );
        self.join_quest_rows(
            "quest_request_items",
            &tables.request_items,
            |row| row.quest_id,
            Quest::load_request_items,
        );
        self.join_quest_rows(
            "quest_offer_reward",
            &tables.offer_rewards,
            |row| row.quest_id,
            Quest::load_offer_reward,
        );
        self.join_quest_rows(
            "quest_template_addon",
            &tables.template_addons,
            |row| row.quest_id,
            Quest::load_template_addon,
        );
        self.join_quest_rows(
            "quest_mail_sender",
            &tables.mail_senders,
            |row| row.quest_id,
            Quest::load_mail_sender,
        );

        let objectives = self.join_quest_rows(
            "quest_objectives",
            &tables.objectives,
            |row| row.quest_id,
            Quest::load_objective,
        );
        for quest in self.quests.values_mut() {
            quest.objectives.sort_by_key(|o| (o.order, o.storage_index));
        }
        info!("Loaded {} quest objectives", objectives);

        self.load_visual_effects(tables);
    }

    /// Hand each row to its quest, dropping rows for unknown quests.
    /// Returns the number of rows applied.
    fn join_quest_rows<R>(
        &mut self,
        table: &'static str,
        rows: &[R],
        quest_id: impl Fn(&R) -> u32,
        mut apply: impl FnMut(&mut Quest, &R),
    ) -> usize {
        let mut applied = 0;

        for row in rows {
            let id = quest_id(row);
            if let Some(quest) = self.quests.get_mut(&id) {
                apply(quest, row);
                applied += 1;
                continue;
            }

            error!("Table `{}` has data for quest {} but such quest does not exist", table, id);
            self.dropped_rows += 1;
            self.schedule_cleanup(ContentCleanup::QuestRows { table, quest_id: id });
        }

        applied
    }

    fn load_visual_effects(&mut self, tables: &QuestTables) {
        let mut count = 0;

        for row in &tables.visual_effects {
            let Some(quest_id) = row.quest_id else {
                error!(
                    "Table `quest_visual_effect` has visual effect for objective {} \
                     but such objective does not exist",
                    row.objective_id
                );
                self.schedule_cleanup(ContentCleanup::VisualEffect {
                    objective_id: row.objective_id,
                });
                continue;
            };

            let Some(quest) = self.quests.get_mut(&quest_id) else {
                error!(
                    "Table `quest_visual_effect` has visual effect for objective {} of quest {} \
                     but such quest does not exist",
                    row.objective_id, quest_id
                );
                self.dropped_rows += 1;
                continue;
            };

            match quest.get_objective_mut(row.objective_id) {
                Some(objective) => {
                    if objective.set_visual_effect(row.index, row.visual_effect) {
                        count += 1;
                    } else {
                        error!(
                            "Table `quest_visual_effect` has index {} for objective {} \
                             above the limit {}, skipped",
                            row.index, row.objective_id, QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT
                        );
                        self.dropped_rows += 1;
                    }
                }
                None => {
                    error!(
                        "Table `quest_visual_effect` has visual effect for objective {} \
                         which is not part of quest {}",
                        row.objective_id, quest_id
                    );
                }
            }
        }

        info!("Loaded {} quest objective visual effects", count);
    }

    /// Queue a cleanup when auto-clean is enabled
    pub(super) fn schedule_cleanup(&mut self, cleanup: ContentCleanup) {
        if self.config.auto_clean && !self.cleanup.contains(&cleanup) {
            self.cleanup.push(cleanup);
        }
    }

    /// Shared check for relation rows: the quest must exist
    pub(super) fn relation_quest_exists(
        &mut self,
        table: &'static str,
        row: &QuestRelationRow,
    ) -> bool {
        if self.quests.contains_key(&row.quest_id) {
            return true;
        }

        error!(
            "Table `{}`: quest {} listed for entry {} does not exist",
            table, row.quest_id, row.entry
        );
        self.dropped_rows += 1;
        self.schedule_cleanup(ContentCleanup::Relation {
            table,
            entry: row.entry,
            quest_id: row.quest_id,
        });
        false
    }
}

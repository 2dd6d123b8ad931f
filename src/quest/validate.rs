//! Post-load validation of quests and objectives.
//!
//! Every check follows the same policy: log the problem, correct the quest in
//! memory where a correction exists (zero a dangling id, mask flags), and keep
//! going. Nothing here removes a quest.

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{error, info, warn};

use super::definition::{
    LootItemType, Objective, ObjectiveType, Quest, QuestFlags, QuestSpecialFlags,
};
use super::loader::{ContentCleanup, QuestLoader};
use crate::config::ContentConfig;
use crate::data::{ContentStores, Record, RecordStore};

/// Objective id meaning "any area trigger"
pub const ANY_AREA_TRIGGER: i32 = -1;

/// Something wrong with a single objective
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectiveIssue {
    #[error("has invalid StorageIndex = {0} for objective type {1:?}")]
    InvalidStorageIndex(i32, ObjectiveType),
    #[error("has non existing item entry {0}")]
    MissingItem(i32),
    #[error("has non existing creature entry {0}")]
    MissingCreature(i32),
    #[error("has non existing gameobject entry {0}")]
    MissingGameObject(i32),
    #[error("has non existing faction id {0}")]
    MissingFaction(i32),
    #[error("has non existing currency {0}")]
    MissingCurrency(i32),
    #[error("has invalid amount {0}")]
    NonPositiveAmount(i32),
    #[error("has non existing spell id {0}")]
    MissingSpell(i32),
    #[error("has non existing battle pet species id {0}")]
    MissingBattlePetSpecies(i32),
    #[error("has non existing criteria tree id {0}")]
    MissingCriteriaTree(i32),
    #[error("has non existing areatrigger id {0}")]
    MissingAreaTrigger(i32),
    #[error("has non existing areatrigger template id {0}")]
    MissingAreaTriggerTemplate(i32),
    #[error("has unhandled type {0:?}")]
    UnhandledType(ObjectiveType),
}

impl ObjectiveIssue {
    /// Whether auto-clean should delete the objective row
    pub fn is_cleanable(&self) -> bool {
        !matches!(
            self,
            ObjectiveIssue::InvalidStorageIndex(..) | ObjectiveIssue::UnhandledType(_)
        )
    }
}

fn exists<T: Record>(store: &RecordStore<T>, id: i32) -> bool {
    u32::try_from(id).is_ok_and(|id| store.contains(id))
}

/// Check one objective against the content stores.
///
/// Returns every problem found; an empty list means the objective is valid.
pub fn check_objective(objective: &Objective, stores: &ContentStores) -> Vec<ObjectiveIssue> {
    let mut issues = Vec::new();
    let id = objective.object_id;

    if objective.storage_index < 0 && objective.objective_type.stores_progress() {
        issues.push(ObjectiveIssue::InvalidStorageIndex(
            objective.storage_index,
            objective.objective_type,
        ));
    }

    match objective.objective_type {
        ObjectiveType::Item => {
            if !exists(&stores.items, id) {
                issues.push(ObjectiveIssue::MissingItem(id));
            }
        }
        ObjectiveType::Monster | ObjectiveType::TalkTo => {
            if !exists(&stores.creatures, id) {
                issues.push(ObjectiveIssue::MissingCreature(id));
            }
        }
        ObjectiveType::WinPetBattleAgainstNpc => {
            if id != 0 && !exists(&stores.creatures, id) {
                issues.push(ObjectiveIssue::MissingCreature(id));
            }
        }
        ObjectiveType::GameObject => {
            if !exists(&stores.gameobjects, id) {
                issues.push(ObjectiveIssue::MissingGameObject(id));
            }
        }
        ObjectiveType::MinReputation
        | ObjectiveType::MaxReputation
        | ObjectiveType::IncreaseReputation => {
            if !exists(&stores.factions, id) {
                issues.push(ObjectiveIssue::MissingFaction(id));
            }
        }
        ObjectiveType::PlayerKills => {
            if objective.amount <= 0 {
                issues.push(ObjectiveIssue::NonPositiveAmount(objective.amount));
            }
        }
        ObjectiveType::Currency | ObjectiveType::HaveCurrency | ObjectiveType::ObtainCurrency => {
            if !exists(&stores.currencies, id) {
                issues.push(ObjectiveIssue::MissingCurrency(id));
            }
            if objective.amount <= 0 {
                issues.push(ObjectiveIssue::NonPositiveAmount(objective.amount));
            }
        }
        ObjectiveType::LearnSpell => {
            if !exists(&stores.spells, id) {
                issues.push(ObjectiveIssue::MissingSpell(id));
            }
        }
        ObjectiveType::DefeatBattlePet => {
            if !exists(&stores.battle_pet_species, id) {
                issues.push(ObjectiveIssue::MissingBattlePetSpecies(id));
            }
        }
        ObjectiveType::CriteriaTree => {
            if !exists(&stores.criteria_trees, id) {
                issues.push(ObjectiveIssue::MissingCriteriaTree(id));
            }
        }
        ObjectiveType::AreaTrigger => {
            if id != ANY_AREA_TRIGGER && !exists(&stores.area_triggers, id) {
                issues.push(ObjectiveIssue::MissingAreaTrigger(id));
            }
        }
        ObjectiveType::AreaTriggerEnter | ObjectiveType::AreaTriggerExit => {
            let known = u32::try_from(id).is_ok_and(|id| stores.has_area_trigger_template(id));
            if !known {
                issues.push(ObjectiveIssue::MissingAreaTriggerTemplate(id));
            }
        }
        ObjectiveType::Money | ObjectiveType::WinPvpPetBattles | ObjectiveType::ProgressBar => {}
        other => issues.push(ObjectiveIssue::UnhandledType(other)),
    }

    issues
}

impl QuestLoader<'_> {
    /// Pass 3: check every quest and objective and index the objectives
    pub(super) fn validate(&mut self, stores: &ContentStores) {
        let known_quests: HashSet<u32> = self.quests.keys().copied().collect();
        let mut mail_template_users: HashMap<u32, u32> = HashMap::new();
        let mut objective_issues = 0;

        for quest in self.quests.values_mut() {
            check_flags(quest);
            check_requirements(quest, stores);
            check_rewards(quest, stores, self.config, &known_quests, &mut mail_template_users);

            for objective in &quest.objectives {
                if let Some(previous) = self.objective_index.insert(objective.id, quest.id) {
                    if previous != quest.id {
                        error!(
                            "Quest objective {} is used by quests {} and {}, keeping {}",
                            objective.id, previous, quest.id, quest.id
                        );
                    }
                }

                let issues = check_objective(objective, stores);
                for issue in &issues {
                    error!("Quest {} objective {} {}", quest.id, objective.id, issue);
                }
                objective_issues += issues.len();

                if self.config.auto_clean && issues.iter().any(ObjectiveIssue::is_cleanable) {
                    let cleanup = ContentCleanup::Objective {
                        objective_id: objective.id,
                    };
                    if !self.cleanup.contains(&cleanup) {
                        self.cleanup.push(cleanup);
                    }
                }
            }

            if quest.objectives.iter().any(Objective::is_sequenced) {
                quest.set_special_flag(QuestSpecialFlags::SEQUENCED_OBJECTIVES);
            }
        }

        for item in stores.items.all() {
            if item.start_quest != 0 && !known_quests.contains(&item.start_quest) {
                error!(
                    "Item {} has StartQuest {} but such quest does not exist",
                    item.entry, item.start_quest
                );
            }
        }

        info!(
            "Validated {} quests, {} objective problems",
            self.quests.len(),
            objective_issues
        );
    }
}

/// Flag invariants: allowed special flags, repeatable dailies, timers
fn check_flags(quest: &mut Quest) {
    let disallowed = quest.special_flags.0 & !QuestSpecialFlags::DB_ALLOWED;
    if disallowed != 0 {
        error!(
            "Quest {} has SpecialFlags = {:#x} > max allowed value, stripping {:#x}",
            quest.id, quest.special_flags.0, disallowed
        );
        quest.special_flags.remove(disallowed);
    }

    if quest.is_daily() && quest.is_weekly() {
        error!("Quest {} is flagged both daily and weekly, removing daily", quest.id);
        quest.flags.remove(QuestFlags::DAILY);
    }

    if (quest.is_daily() || quest.is_weekly() || quest.is_monthly()) && !quest.is_repeatable() {
        error!(
            "Quest {} is daily, weekly or monthly but not flagged repeatable, adding it",
            quest.id
        );
        quest.set_special_flag(QuestSpecialFlags::REPEATABLE);
    }

    if quest.time_allowed > 0 {
        quest.set_special_flag(QuestSpecialFlags::TIMED);
    }
}

fn check_requirements(quest: &mut Quest, stores: &ContentStores) {
    if quest.required_skill_id != 0 && !stores.skill_lines.contains(quest.required_skill_id) {
        error!(
            "Quest {} has RequiredSkillId = {} but this skill does not exist",
            quest.id, quest.required_skill_id
        );
        quest.required_skill_id = 0;
    }

    if quest.required_min_rep_faction != 0
        && !stores.factions.contains(quest.required_min_rep_faction)
    {
        error!(
            "Quest {} has RequiredMinRepFaction = {} but faction does not exist",
            quest.id, quest.required_min_rep_faction
        );
        quest.required_min_rep_faction = 0;
    }

    if quest.required_max_rep_faction != 0
        && !stores.factions.contains(quest.required_max_rep_faction)
    {
        error!(
            "Quest {} has RequiredMaxRepFaction = {} but faction does not exist",
            quest.id, quest.required_max_rep_faction
        );
        quest.required_max_rep_faction = 0;
    }

    if quest.required_min_rep_faction != 0
        && quest.required_min_rep_faction == quest.required_max_rep_faction
        && quest.required_min_rep_value >= quest.required_max_rep_value
    {
        warn!(
            "Quest {} has RequiredMinRepValue {} >= RequiredMaxRepValue {}, quest can't be done",
            quest.id, quest.required_min_rep_value, quest.required_max_rep_value
        );
    }

    if quest.source_item_id != 0 {
        if !stores.items.contains(quest.source_item_id) {
            error!(
                "Quest {} has SourceItemId = {} but item does not exist",
                quest.id, quest.source_item_id
            );
            quest.source_item_id = 0;
            quest.source_item_count = 0;
        } else if quest.source_item_count == 0 {
            quest.source_item_count = 1;
        }
    }

    if quest.source_spell_id != 0 && !stores.spells.contains(quest.source_spell_id) {
        error!(
            "Quest {} has SourceSpellId = {} but spell does not exist",
            quest.id, quest.source_spell_id
        );
        quest.source_spell_id = 0;
    }
}

fn check_rewards(
    quest: &mut Quest,
    stores: &ContentStores,
    config: &ContentConfig,
    known_quests: &HashSet<u32>,
    mail_template_users: &mut HashMap<u32, u32>,
) {
    let quest_id = quest.id;

    for (slot, choice) in quest.reward_choice_items.iter_mut().enumerate() {
        if choice.item_id == 0 {
            continue;
        }
        let exists = match choice.kind {
            LootItemType::Item => stores.items.contains(choice.item_id),
            LootItemType::Currency => stores.currencies.contains(choice.item_id),
        };
        if !exists {
            error!(
                "Quest {} has RewardChoiceItemId{} = {} ({:?}) but it does not exist",
                quest_id,
                slot + 1,
                choice.item_id,
                choice.kind
            );
            *choice = Default::default();
        } else if choice.quantity == 0 {
            warn!(
                "Quest {} has RewardChoiceItemId{} = {} but RewardChoiceItemQuantity{} = 0",
                quest_id,
                slot + 1,
                choice.item_id,
                slot + 1
            );
        }
    }

    for (slot, reward) in quest.reward_items.iter_mut().enumerate() {
        if reward.item_id == 0 {
            continue;
        }
        if !stores.items.contains(reward.item_id) {
            error!(
                "Quest {} has RewardItemId{} = {} but item does not exist",
                quest_id,
                slot + 1,
                reward.item_id
            );
            *reward = Default::default();
        } else if reward.amount == 0 {
            warn!(
                "Quest {} has RewardItemId{} = {} but RewardItemCount{} = 0",
                quest_id,
                slot + 1,
                reward.item_id,
                slot + 1
            );
        }
    }

    for (slot, drop) in quest.item_drops.iter_mut().enumerate() {
        if drop.item_id != 0 && !stores.items.contains(drop.item_id) {
            error!(
                "Quest {} has ItemDrop{} = {} but item does not exist",
                quest_id,
                slot + 1,
                drop.item_id
            );
            *drop = Default::default();
        }
    }

    for (slot, faction) in quest.reward_factions.iter_mut().enumerate() {
        if faction.faction_id == 0 {
            continue;
        }
        if !stores.factions.contains(faction.faction_id) {
            error!(
                "Quest {} has RewardFactionId{} = {} but faction does not exist",
                quest_id,
                slot + 1,
                faction.faction_id
            );
            *faction = Default::default();
        } else {
            let limit = config.max_reward_faction_value.unsigned_abs();
            let values = [("Value", faction.value), ("Override", faction.override_value)];
            for (column, value) in values {
                if value.unsigned_abs() > limit {
                    warn!(
                        "Quest {} has RewardFaction{}{} = {} above the maximum {}",
                        quest_id,
                        column,
                        slot + 1,
                        value,
                        config.max_reward_faction_value
                    );
                }
            }
        }
    }

    for (slot, currency) in quest.reward_currencies.iter_mut().enumerate() {
        if currency.currency_id == 0 {
            continue;
        }
        if !stores.currencies.contains(currency.currency_id) {
            error!(
                "Quest {} has RewardCurrencyId{} = {} but currency does not exist",
                quest_id,
                slot + 1,
                currency.currency_id
            );
            *currency = Default::default();
        } else if currency.amount == 0 {
            warn!(
                "Quest {} has RewardCurrencyId{} = {} but RewardCurrencyCount{} = 0",
                quest_id,
                slot + 1,
                currency.currency_id,
                slot + 1
            );
        }
    }

    if quest.reward_spell != 0 && !stores.spells.contains(quest.reward_spell) {
        error!(
            "Quest {} has RewardSpell = {} but spell does not exist",
            quest_id, quest.reward_spell
        );
        quest.reward_spell = 0;
    }

    quest.reward_display_spells.retain(|spell| {
        let exists = stores.spells.contains(spell.spell_id);
        if !exists {
            error!(
                "Quest {} has RewardDisplaySpell {} but spell does not exist",
                quest_id, spell.spell_id
            );
        }
        exists
    });

    if quest.reward_title_id != 0 && !stores.char_titles.contains(quest.reward_title_id) {
        error!(
            "Quest {} has RewardTitleId = {} but title does not exist",
            quest_id, quest.reward_title_id
        );
        quest.reward_title_id = 0;
    }

    if quest.reward_skill_id != 0 && !stores.skill_lines.contains(quest.reward_skill_id) {
        error!(
            "Quest {} has RewardSkillId = {} but skill does not exist",
            quest_id, quest.reward_skill_id
        );
        quest.reward_skill_id = 0;
        quest.reward_skill_points = 0;
    }

    if quest.reward_mail_template_id != 0 {
        if !stores.mail_templates.contains(quest.reward_mail_template_id) {
            error!(
                "Quest {} has RewardMailTemplateId = {} but mail template does not exist",
                quest_id, quest.reward_mail_template_id
            );
            quest.reward_mail_template_id = 0;
            quest.reward_mail_delay = 0;
        } else if let Some(&other) = mail_template_users.get(&quest.reward_mail_template_id) {
            error!(
                "Quest {} has RewardMailTemplateId = {} already used by quest {}",
                quest_id, quest.reward_mail_template_id, other
            );
            quest.reward_mail_template_id = 0;
            quest.reward_mail_delay = 0;
        } else {
            mail_template_users.insert(quest.reward_mail_template_id, quest_id);
        }
    }

    if quest.reward_mail_sender_entry != 0
        && !stores.creatures.contains(quest.reward_mail_sender_entry)
    {
        error!(
            "Quest {} has RewardMailSenderEntry = {} but creature does not exist",
            quest_id, quest.reward_mail_sender_entry
        );
        quest.reward_mail_sender_entry = 0;
    }

    if quest.reward_next_quest != 0 && !known_quests.contains(&quest.reward_next_quest) {
        error!(
            "Quest {} has RewardNextQuest = {} but such quest does not exist",
            quest_id, quest.reward_next_quest
        );
        quest.reward_next_quest = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        AreaTrigger, AreaTriggerTemplate, CreatureTemplate, CurrencyType, Faction, ItemTemplate,
        MailTemplate, SpellInfo,
    };
    use crate::quest::definition::QuestObjectiveFlags;
    use crate::quest::rows::{
        QuestObjectiveRow, QuestTables, QuestTemplateAddonRow, QuestTemplateRow,
        RewardDisplaySpellRow,
    };

    fn stores() -> ContentStores {
        let mut stores = ContentStores::default();
        stores.items.insert(ItemTemplate {
            entry: 2589,
            name: "Linen Cloth".to_string(),
            start_quest: 0,
        });
        stores.creatures.insert(CreatureTemplate {
            entry: 299,
            name: "Young Wolf".to_string(),
            ..Default::default()
        });
        stores.factions.insert(Faction::new(72));
        stores.currencies.insert(CurrencyType::new(1220));
        stores.area_triggers.insert(AreaTrigger::new(88));
        stores.area_trigger_templates.insert(AreaTriggerTemplate { id: 5, is_custom: false });
        stores.mail_templates.insert(MailTemplate::new(3));
        stores
    }

    fn objective(objective_type: i64, object_id: i32, amount: i32) -> Objective {
        Objective::from_row(&QuestObjectiveRow {
            id: 1,
            quest_id: 1,
            objective_type,
            object_id,
            amount,
            ..Default::default()
        })
    }

    #[test]
    fn test_reference_checks_by_type() {
        let stores = stores();

        assert!(check_objective(&objective(1, 2589, 5), &stores).is_empty());
        assert_eq!(
            check_objective(&objective(1, 1, 5), &stores),
            vec![ObjectiveIssue::MissingItem(1)]
        );
        assert!(check_objective(&objective(0, 299, 8), &stores).is_empty());
        assert_eq!(
            check_objective(&objective(3, 300, 1), &stores),
            vec![ObjectiveIssue::MissingCreature(300)]
        );
        assert!(check_objective(&objective(11, 0, 1), &stores).is_empty());
        assert_eq!(
            check_objective(&objective(6, 47, 3000), &stores),
            vec![ObjectiveIssue::MissingFaction(47)]
        );
        assert_eq!(
            check_objective(&objective(9, 0, 0), &stores),
            vec![ObjectiveIssue::NonPositiveAmount(0)]
        );
        assert!(check_objective(&objective(8, 0, 100), &stores).is_empty());
    }

    #[test]
    fn test_currency_checks_are_independent() {
        let stores = stores();
        assert_eq!(
            check_objective(&objective(4, 9999, 0), &stores),
            vec![
                ObjectiveIssue::MissingCurrency(9999),
                ObjectiveIssue::NonPositiveAmount(0)
            ]
        );
        assert_eq!(
            check_objective(&objective(17, 1220, -1), &stores),
            vec![ObjectiveIssue::NonPositiveAmount(-1)]
        );
    }

    #[test]
    fn test_area_trigger_sentinel_and_templates() {
        let stores = stores();
        assert!(check_objective(&objective(10, ANY_AREA_TRIGGER, 1), &stores).is_empty());
        assert!(check_objective(&objective(10, 88, 1), &stores).is_empty());
        assert_eq!(
            check_objective(&objective(10, 89, 1), &stores),
            vec![ObjectiveIssue::MissingAreaTrigger(89)]
        );
        assert!(check_objective(&objective(19, 5, 1), &stores).is_empty());
        assert_eq!(
            check_objective(&objective(20, 88, 1), &stores),
            vec![ObjectiveIssue::MissingAreaTriggerTemplate(88)]
        );
    }

    #[test]
    fn test_unhandled_and_storage_index() {
        let stores = stores();
        assert_eq!(
            check_objective(&objective(250, 0, 1), &stores),
            vec![ObjectiveIssue::UnhandledType(ObjectiveType::Unknown(250))]
        );
        assert_eq!(
            check_objective(&objective(21, 0, 1), &stores),
            vec![ObjectiveIssue::UnhandledType(ObjectiveType::KillWithLabel)]
        );

        let mut negative = objective(0, 299, 1);
        negative.storage_index = -1;
        let issues = check_objective(&negative, &stores);
        assert_eq!(
            issues,
            vec![ObjectiveIssue::InvalidStorageIndex(-1, ObjectiveType::Monster)]
        );
        assert!(!issues[0].is_cleanable());
    }

    fn quest_tables(templates: Vec<QuestTemplateRow>) -> QuestTables {
        QuestTables {
            templates,
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_quest_becomes_repeatable() {
        let config = ContentConfig::default();
        let mut stores = stores();
        let tables = quest_tables(vec![
            QuestTemplateRow {
                id: 1,
                flags: QuestFlags::DAILY,
                ..Default::default()
            },
            QuestTemplateRow {
                id: 2,
                flags: QuestFlags::DAILY | QuestFlags::WEEKLY,
                ..Default::default()
            },
        ]);

        let load = QuestLoader::load(&config, &tables, &mut stores);
        let daily = load.store.get_quest_template(1).unwrap();
        assert!(daily.is_repeatable());

        let both = load.store.get_quest_template(2).unwrap();
        assert!(!both.is_daily());
        assert!(both.is_weekly());
        assert!(both.is_repeatable());
    }

    #[test]
    fn test_special_flags_are_masked() {
        let config = ContentConfig::default();
        let mut stores = stores();
        let mut tables = quest_tables(vec![QuestTemplateRow {
            id: 1,
            time_allowed: 900,
            ..Default::default()
        }]);
        tables.template_addons.push(QuestTemplateAddonRow {
            quest_id: 1,
            special_flags: QuestSpecialFlags::CAST | 0x8000,
            ..Default::default()
        });

        let load = QuestLoader::load(&config, &tables, &mut stores);
        let quest = load.store.get_quest_template(1).unwrap();
        assert_eq!(
            quest.special_flags.0,
            QuestSpecialFlags::CAST | QuestSpecialFlags::TIMED
        );
    }

    #[test]
    fn test_dangling_rewards_are_cleared() {
        let config = ContentConfig::default();
        let mut stores = stores();
        let mut tables = quest_tables(vec![
            QuestTemplateRow {
                id: 1,
                reward_item: [2589, 7777, 0, 0],
                reward_amount: [1, 1, 0, 0],
                reward_faction_id: [72, 47, 0, 0, 0],
                reward_currency_id: [1220, 0, 0, 0],
                reward_currency_qty: [10, 0, 0, 0],
                reward_next_quest: 55,
                reward_spell: 133,
                ..Default::default()
            },
            QuestTemplateRow {
                id: 2,
                ..Default::default()
            },
        ]);
        tables.template_addons = vec![
            QuestTemplateAddonRow {
                quest_id: 1,
                reward_mail_template_id: 3,
                reward_mail_delay: 60,
                ..Default::default()
            },
            QuestTemplateAddonRow {
                quest_id: 2,
                reward_mail_template_id: 3,
                reward_mail_delay: 60,
                ..Default::default()
            },
        ];

        tables.reward_display_spells = vec![
            RewardDisplaySpellRow {
                quest_id: 1,
                spell_id: 8326,
                ..Default::default()
            },
            RewardDisplaySpellRow {
                quest_id: 1,
                spell_id: 9999,
                ..Default::default()
            },
        ];
        stores.spells.insert(SpellInfo::new(8326));

        let load = QuestLoader::load(&config, &tables, &mut stores);
        let quest = load.store.get_quest_template(1).unwrap();
        let spells: Vec<u32> = quest.reward_display_spells.iter().map(|s| s.spell_id).collect();
        assert_eq!(spells, vec![8326]);
        assert_eq!(quest.reward_items[0].item_id, 2589);
        assert_eq!(quest.reward_items[1].item_id, 0);
        assert_eq!(quest.reward_factions[0].faction_id, 72);
        assert_eq!(quest.reward_factions[1].faction_id, 0);
        assert_eq!(quest.reward_currencies[0].currency_id, 1220);
        assert_eq!(quest.reward_next_quest, 0);
        assert_eq!(quest.reward_spell, 0);
        assert_eq!(quest.reward_mail_template_id, 3);

        // second user of the same mail template loses it
        let second = load.store.get_quest_template(2).unwrap();
        assert_eq!(second.reward_mail_template_id, 0);
        assert_eq!(second.reward_mail_delay, 0);
    }

    #[test]
    fn test_extreme_faction_values_keep_the_reward() {
        let config = ContentConfig::default();
        let mut stores = stores();
        let tables = quest_tables(vec![QuestTemplateRow {
            id: 1,
            reward_faction_id: [72, 72, 0, 0, 0],
            reward_faction_value: [i32::MIN, i32::MAX, 0, 0, 0],
            reward_faction_override: [i32::MIN, 0, 0, 0, 0],
            ..Default::default()
        }]);

        let load = QuestLoader::load(&config, &tables, &mut stores);
        let quest = load.store.get_quest_template(1).unwrap();
        assert_eq!(quest.reward_factions[0].faction_id, 72);
        assert_eq!(quest.reward_factions[0].value, i32::MIN);
        assert_eq!(quest.reward_factions[0].override_value, i32::MIN);
        assert_eq!(quest.reward_factions[1].value, i32::MAX);
    }

    #[test]
    fn test_invalid_objectives_are_kept_and_indexed() {
        let config = ContentConfig {
            auto_clean: true,
            ..Default::default()
        };
        let mut stores = stores();
        let mut tables = quest_tables(vec![QuestTemplateRow {
            id: 1,
            ..Default::default()
        }]);
        tables.objectives = vec![
            QuestObjectiveRow {
                id: 100,
                quest_id: 1,
                objective_type: 0,
                object_id: 299,
                amount: 8,
                ..Default::default()
            },
            QuestObjectiveRow {
                id: 101,
                quest_id: 1,
                objective_type: 99,
                order: 1,
                ..Default::default()
            },
            QuestObjectiveRow {
                id: 102,
                quest_id: 1,
                objective_type: 1,
                object_id: 4,
                amount: 1,
                order: 2,
                flags: QuestObjectiveFlags::SEQUENCED,
                ..Default::default()
            },
        ];

        let load = QuestLoader::load(&config, &tables, &mut stores);
        let quest = load.store.get_quest_template(1).unwrap();
        assert_eq!(quest.objectives.len(), 3);
        assert!(quest.has_sequenced_objectives());

        for objective in &quest.objectives {
            assert_eq!(load.store.get_quest_objective(objective.id), Some(objective));
        }
        assert_eq!(
            load.store.get_quest_objective(101).map(|o| o.objective_type),
            Some(ObjectiveType::Unknown(99))
        );

        // only the missing item reference is cleanable
        assert_eq!(
            load.cleanup,
            vec![ContentCleanup::Objective { objective_id: 102 }]
        );
    }
}

//! Quest Definition Structures
//!
//! A `Quest` is created from its `quest_template` row and then filled in by
//! each satellite table. Links to other quests are plain ids; the adjacency
//! lists at the bottom of `Quest` are written by the linker.

use std::collections::BTreeSet;

use super::rows::{
    MailSenderRow, OfferRewardRow, QuestDetailsRow, QuestObjectiveRow, QuestTemplateAddonRow,
    QuestTemplateRow, RequestItemsRow, RewardChoiceItemsRow, RewardDisplaySpellRow,
};

pub const QUEST_REWARD_ITEM_COUNT: usize = 4;
pub const QUEST_ITEM_DROP_COUNT: usize = 4;
pub const QUEST_REWARD_CHOICES_COUNT: usize = 6;
pub const QUEST_REWARD_REPUTATIONS_COUNT: usize = 5;
pub const QUEST_REWARD_CURRENCY_COUNT: usize = 4;
pub const QUEST_EMOTE_COUNT: usize = 4;
/// Highest accepted `quest_visual_effect.idx` plus one
pub const QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT: u32 = 64;

// ============================================================================
// Flags
// ============================================================================

macro_rules! flag_set {
    ($name:ident($repr:ty)) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(pub $repr);

        impl $name {
            pub fn contains(self, bits: $repr) -> bool {
                self.0 & bits == bits
            }

            pub fn intersects(self, bits: $repr) -> bool {
                self.0 & bits != 0
            }

            pub fn insert(&mut self, bits: $repr) {
                self.0 |= bits;
            }

            pub fn remove(&mut self, bits: $repr) {
                self.0 &= !bits;
            }
        }
    };
}

flag_set!(QuestFlags(u32));
flag_set!(QuestFlagsEx(u32));
flag_set!(QuestSpecialFlags(u32));
flag_set!(QuestObjectiveFlags(u32));

impl QuestFlags {
    pub const STAY_ALIVE: u32 = 0x0000_0001;
    pub const PARTY_ACCEPT: u32 = 0x0000_0002;
    pub const EXPLORATION: u32 = 0x0000_0004;
    pub const SHARABLE: u32 = 0x0000_0008;
    pub const RAID: u32 = 0x0000_0040;
    pub const HIDDEN_REWARDS: u32 = 0x0000_0200;
    pub const TRACKING: u32 = 0x0000_0400;
    pub const DAILY: u32 = 0x0000_1000;
    pub const PVP: u32 = 0x0000_2000;
    pub const UNAVAILABLE: u32 = 0x0000_4000;
    pub const WEEKLY: u32 = 0x0000_8000;
    pub const AUTO_COMPLETE: u32 = 0x0001_0000;
    pub const AUTO_ACCEPT: u32 = 0x0008_0000;
}

impl QuestFlagsEx {
    pub const KEEP_ADDITIONAL_ITEMS: u32 = 0x0000_0001;
    pub const SUPPRESS_GOSSIP_COMPLETE: u32 = 0x0000_0002;
    pub const AUTO_PUSH: u32 = 0x0002_0000;
}

impl QuestSpecialFlags {
    pub const REPEATABLE: u32 = 0x0001;
    /// Completed by an external event or area trigger rather than objectives
    pub const EXPLORATION_OR_EVENT: u32 = 0x0002;
    pub const AUTO_ACCEPT: u32 = 0x0004;
    pub const DF_QUEST: u32 = 0x0008;
    pub const MONTHLY: u32 = 0x0010;
    pub const CAST: u32 = 0x0020;
    /// Bits that may come from the database
    pub const DB_ALLOWED: u32 = Self::REPEATABLE
        | Self::EXPLORATION_OR_EVENT
        | Self::AUTO_ACCEPT
        | Self::DF_QUEST
        | Self::MONTHLY
        | Self::CAST;

    // Derived at load time, never stored
    pub const TIMED: u32 = 0x0100;
    pub const SEQUENCED_OBJECTIVES: u32 = 0x0200;
}

impl QuestObjectiveFlags {
    pub const TRACKED_ON_MINIMAP: u32 = 0x0001;
    pub const SEQUENCED: u32 = 0x0002;
    pub const OPTIONAL: u32 = 0x0004;
    pub const HIDDEN: u32 = 0x0008;
}

// ============================================================================
// Objectives
// ============================================================================

/// Objective types, numbered as stored in `quest_objectives.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveType {
    Monster,
    Item,
    GameObject,
    TalkTo,
    Currency,
    LearnSpell,
    MinReputation,
    MaxReputation,
    Money,
    PlayerKills,
    AreaTrigger,
    WinPetBattleAgainstNpc,
    DefeatBattlePet,
    WinPvpPetBattles,
    CriteriaTree,
    ProgressBar,
    HaveCurrency,
    ObtainCurrency,
    IncreaseReputation,
    AreaTriggerEnter,
    AreaTriggerExit,
    KillWithLabel,
    /// A value outside the known range; kept so the row still loads
    Unknown(i64),
}

impl ObjectiveType {
    pub fn from_raw(value: i64) -> Self {
        match value {
            0 => ObjectiveType::Monster,
            1 => ObjectiveType::Item,
            2 => ObjectiveType::GameObject,
            3 => ObjectiveType::TalkTo,
            4 => ObjectiveType::Currency,
            5 => ObjectiveType::LearnSpell,
            6 => ObjectiveType::MinReputation,
            7 => ObjectiveType::MaxReputation,
            8 => ObjectiveType::Money,
            9 => ObjectiveType::PlayerKills,
            10 => ObjectiveType::AreaTrigger,
            11 => ObjectiveType::WinPetBattleAgainstNpc,
            12 => ObjectiveType::DefeatBattlePet,
            13 => ObjectiveType::WinPvpPetBattles,
            14 => ObjectiveType::CriteriaTree,
            15 => ObjectiveType::ProgressBar,
            16 => ObjectiveType::HaveCurrency,
            17 => ObjectiveType::ObtainCurrency,
            18 => ObjectiveType::IncreaseReputation,
            19 => ObjectiveType::AreaTriggerEnter,
            20 => ObjectiveType::AreaTriggerExit,
            21 => ObjectiveType::KillWithLabel,
            other => ObjectiveType::Unknown(other),
        }
    }

    /// Types whose progress is kept in a client-side storage slot
    pub fn stores_progress(self) -> bool {
        matches!(
            self,
            ObjectiveType::Monster
                | ObjectiveType::Item
                | ObjectiveType::GameObject
                | ObjectiveType::TalkTo
                | ObjectiveType::PlayerKills
                | ObjectiveType::AreaTrigger
                | ObjectiveType::ObtainCurrency
        )
    }
}

/// A single quest objective
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub id: u32,
    pub quest_id: u32,
    pub objective_type: ObjectiveType,
    pub order: i32,
    /// Slot used for client-side progress tracking
    pub storage_index: i32,
    /// Creature, item, faction, ... depending on `objective_type`
    pub object_id: i32,
    pub amount: i32,
    pub flags: QuestObjectiveFlags,
    pub flags2: u32,
    pub progress_bar_weight: f32,
    pub description: String,
    pub visual_effects: Vec<i32>,
}

impl Objective {
    pub fn from_row(row: &QuestObjectiveRow) -> Self {
        Self {
            id: row.id,
            quest_id: row.quest_id,
            objective_type: ObjectiveType::from_raw(row.objective_type),
            order: row.order,
            storage_index: row.storage_index,
            object_id: row.object_id,
            amount: row.amount,
            flags: QuestObjectiveFlags(row.flags),
            flags2: row.flags2,
            progress_bar_weight: row.progress_bar_weight,
            description: row.description.clone(),
            visual_effects: Vec::new(),
        }
    }

    pub fn is_sequenced(&self) -> bool {
        self.flags.contains(QuestObjectiveFlags::SEQUENCED)
    }

    /// Record a visual effect at `index`, growing the list as needed.
    /// Returns false and leaves the list alone when `index` is past
    /// `QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT`.
    pub fn set_visual_effect(&mut self, index: u32, effect: i32) -> bool {
        if index >= QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT {
            return false;
        }
        let index = index as usize;
        if self.visual_effects.len() <= index {
            self.visual_effects.resize(index + 1, 0);
        }
        self.visual_effects[index] = effect;
        true
    }
}

// ============================================================================
// Rewards
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemReward {
    pub item_id: u32,
    pub amount: u32,
}

/// What a reward choice slot hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LootItemType {
    #[default]
    Item,
    Currency,
}

impl LootItemType {
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            0 => Some(LootItemType::Item),
            1 => Some(LootItemType::Currency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardChoiceItem {
    pub item_id: u32,
    pub quantity: u32,
    pub display_id: u32,
    pub kind: LootItemType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FactionReward {
    pub faction_id: u32,
    pub value: i32,
    pub override_value: i32,
    pub cap_in: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrencyReward {
    pub currency_id: u32,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySpell {
    pub spell_id: u32,
    pub player_condition_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestEmote {
    pub emote: u32,
    pub delay: u32,
}

/// Text and emotes shown while the quest is being turned in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestItems {
    pub emote_on_complete: u32,
    pub emote_on_incomplete: u32,
    pub emote_on_complete_delay: u32,
    pub emote_on_incomplete_delay: u32,
    pub completion_text: String,
}

// ============================================================================
// Quest
// ============================================================================

/// A fully loaded quest template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quest {
    pub id: u32,
    pub quest_type: u8,
    pub content_tuning_id: u32,
    pub quest_sort_id: i32,
    pub quest_info_id: u32,
    pub suggested_group_num: u32,
    pub allowable_races: u64,
    pub time_allowed: u32,

    pub flags: QuestFlags,
    pub flags_ex: QuestFlagsEx,
    pub special_flags: QuestSpecialFlags,

    pub log_title: String,
    pub log_description: String,
    pub quest_description: String,
    pub area_description: String,
    pub quest_completion_log: String,

    // Rewards
    pub reward_next_quest: u32,
    pub reward_xp_difficulty: u32,
    pub reward_money: i32,
    pub reward_bonus_money: u32,
    pub reward_spell: u32,
    pub reward_honor: u32,
    pub reward_title_id: u32,
    pub reward_skill_id: u32,
    pub reward_skill_points: u32,
    pub reward_items: [ItemReward; QUEST_REWARD_ITEM_COUNT],
    pub item_drops: [ItemReward; QUEST_ITEM_DROP_COUNT],
    pub reward_choice_items: [RewardChoiceItem; QUEST_REWARD_CHOICES_COUNT],
    pub reward_factions: [FactionReward; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_currencies: [CurrencyReward; QUEST_REWARD_CURRENCY_COUNT],
    pub reward_display_spells: Vec<DisplaySpell>,
    pub reward_mail_template_id: u32,
    pub reward_mail_delay: u32,
    pub reward_mail_sender_entry: u32,
    pub sound_accept: u32,
    pub sound_turn_in: u32,

    // Requirements (template addon)
    pub max_level: u32,
    pub allowable_classes: u32,
    pub source_item_id: u32,
    pub source_item_count: u32,
    pub source_spell_id: u32,
    /// Negative values are soft prerequisites
    pub prev_quest_id: i32,
    pub next_quest_id: u32,
    pub exclusive_group: i32,
    pub breadcrumb_for_quest_id: i32,
    pub required_skill_id: u32,
    pub required_skill_points: u32,
    pub required_min_rep_faction: u32,
    pub required_max_rep_faction: u32,
    pub required_min_rep_value: i32,
    pub required_max_rep_value: i32,
    pub script_name: String,

    // Dialogue
    pub details_emotes: [QuestEmote; QUEST_EMOTE_COUNT],
    pub request_items: RequestItems,
    pub offer_reward_emotes: [QuestEmote; QUEST_EMOTE_COUNT],
    pub offer_reward_text: String,

    pub objectives: Vec<Objective>,

    // Filled in by the linker
    pub dependent_previous_quests: BTreeSet<u32>,
    pub dependent_breadcrumb_quests: Vec<u32>,
}

impl Quest {
    pub fn from_row(row: &QuestTemplateRow) -> Self {
        let mut quest = Self {
            id: row.id,
            quest_type: row.quest_type,
            content_tuning_id: row.content_tuning_id,
            quest_sort_id: row.quest_sort_id,
            quest_info_id: row.quest_info_id,
            suggested_group_num: row.suggested_group_num,
            allowable_races: row.allowable_races,
            time_allowed: row.time_allowed,
            flags: QuestFlags(row.flags),
            flags_ex: QuestFlagsEx(row.flags_ex),
            log_title: row.log_title.clone(),
            log_description: row.log_description.clone(),
            quest_description: row.quest_description.clone(),
            area_description: row.area_description.clone(),
            quest_completion_log: row.quest_completion_log.clone(),
            reward_next_quest: row.reward_next_quest,
            reward_xp_difficulty: row.reward_xp_difficulty,
            reward_money: row.reward_money,
            reward_bonus_money: row.reward_bonus_money,
            reward_spell: row.reward_spell,
            reward_honor: row.reward_honor,
            reward_title_id: row.reward_title_id,
            reward_skill_id: row.reward_skill_line_id,
            reward_skill_points: row.reward_num_skill_ups,
            source_item_id: row.start_item,
            sound_accept: row.accepted_sound_kit_id,
            sound_turn_in: row.complete_sound_kit_id,
            ..Default::default()
        };

        for (slot, reward) in quest.reward_items.iter_mut().enumerate() {
            reward.item_id = row.reward_item[slot];
            reward.amount = row.reward_amount[slot];
        }
        for (slot, drop) in quest.item_drops.iter_mut().enumerate() {
            drop.item_id = row.item_drop[slot];
            drop.amount = row.item_drop_quantity[slot];
        }
        for (slot, choice) in quest.reward_choice_items.iter_mut().enumerate() {
            choice.item_id = row.reward_choice_item_id[slot];
            choice.quantity = row.reward_choice_item_quantity[slot];
            choice.display_id = row.reward_choice_item_display_id[slot];
        }
        for (slot, faction) in quest.reward_factions.iter_mut().enumerate() {
            faction.faction_id = row.reward_faction_id[slot];
            faction.value = row.reward_faction_value[slot];
            faction.override_value = row.reward_faction_override[slot];
            faction.cap_in = row.reward_faction_cap_in[slot];
        }
        for (slot, currency) in quest.reward_currencies.iter_mut().enumerate() {
            currency.currency_id = row.reward_currency_id[slot];
            currency.amount = row.reward_currency_qty[slot];
        }

        quest
    }

    pub fn load_reward_choice_items(&mut self, row: &RewardChoiceItemsRow) -> Result<(), String> {
        for (slot, choice) in self.reward_choice_items.iter_mut().enumerate() {
            choice.kind = LootItemType::from_raw(row.item_type[slot]).ok_or_else(|| {
                format!("invalid reward choice item type {} in slot {}", row.item_type[slot], slot)
            })?;
        }
        Ok(())
    }

    pub fn load_reward_display_spell(&mut self, row: &RewardDisplaySpellRow) {
        self.reward_display_spells.push(DisplaySpell {
            spell_id: row.spell_id,
            player_condition_id: row.player_condition_id,
        });
    }

    pub fn load_quest_details(&mut self, row: &QuestDetailsRow) {
        for (slot, emote) in self.details_emotes.iter_mut().enumerate() {
            emote.emote = row.emote[slot];
            emote.delay = row.emote_delay[slot];
        }
    }

    pub fn load_request_items(&mut self, row: &RequestItemsRow) {
        self.request_items = RequestItems {
            emote_on_complete: row.emote_on_complete,
            emote_on_incomplete: row.emote_on_incomplete,
            emote_on_complete_delay: row.emote_on_complete_delay,
            emote_on_incomplete_delay: row.emote_on_incomplete_delay,
            completion_text: row.completion_text.clone(),
        };
    }

    pub fn load_offer_reward(&mut self, row: &OfferRewardRow) {
        for (slot, emote) in self.offer_reward_emotes.iter_mut().enumerate() {
            emote.emote = row.emote[slot];
            emote.delay = row.emote_delay[slot];
        }
        self.offer_reward_text = row.reward_text.clone();
    }

    pub fn load_template_addon(&mut self, row: &QuestTemplateAddonRow) {
        self.max_level = row.max_level;
        self.allowable_classes = row.allowable_classes;
        self.source_spell_id = row.source_spell_id;
        self.prev_quest_id = row.prev_quest_id;
        self.next_quest_id = row.next_quest_id;
        self.exclusive_group = row.exclusive_group;
        self.breadcrumb_for_quest_id = row.breadcrumb_for_quest_id;
        self.reward_mail_template_id = row.reward_mail_template_id;
        self.reward_mail_delay = row.reward_mail_delay;
        self.required_skill_id = row.required_skill_id;
        self.required_skill_points = row.required_skill_points;
        self.required_min_rep_faction = row.required_min_rep_faction;
        self.required_max_rep_faction = row.required_max_rep_faction;
        self.required_min_rep_value = row.required_min_rep_value;
        self.required_max_rep_value = row.required_max_rep_value;
        self.source_item_count = row.provided_item_count;
        self.special_flags = QuestSpecialFlags(row.special_flags);
        self.script_name = row.script_name.clone();
    }

    pub fn load_mail_sender(&mut self, row: &MailSenderRow) {
        self.reward_mail_sender_entry = row.reward_mail_sender_entry;
    }

    pub fn load_objective(&mut self, row: &QuestObjectiveRow) {
        self.objectives.push(Objective::from_row(row));
    }

    pub fn has_flag(&self, bits: u32) -> bool {
        self.flags.contains(bits)
    }

    pub fn has_special_flag(&self, bits: u32) -> bool {
        self.special_flags.contains(bits)
    }

    pub fn set_special_flag(&mut self, bits: u32) {
        self.special_flags.insert(bits);
    }

    pub fn is_daily(&self) -> bool {
        self.has_flag(QuestFlags::DAILY)
    }

    pub fn is_weekly(&self) -> bool {
        self.has_flag(QuestFlags::WEEKLY)
    }

    pub fn is_monthly(&self) -> bool {
        self.has_special_flag(QuestSpecialFlags::MONTHLY)
    }

    pub fn is_repeatable(&self) -> bool {
        self.has_special_flag(QuestSpecialFlags::REPEATABLE)
    }

    pub fn is_auto_push(&self) -> bool {
        self.flags_ex.contains(QuestFlagsEx::AUTO_PUSH)
    }

    pub fn has_sequenced_objectives(&self) -> bool {
        self.has_special_flag(QuestSpecialFlags::SEQUENCED_OBJECTIVES)
    }

    /// Whether this quest exists only to lead to another quest
    pub fn is_breadcrumb(&self) -> bool {
        self.breadcrumb_for_quest_id != 0
    }

    /// Get objective by ID
    pub fn get_objective(&self, objective_id: u32) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == objective_id)
    }

    pub fn get_objective_mut(&mut self, objective_id: u32) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| o.id == objective_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_type_parsing() {
        assert_eq!(ObjectiveType::from_raw(0), ObjectiveType::Monster);
        assert_eq!(ObjectiveType::from_raw(10), ObjectiveType::AreaTrigger);
        assert_eq!(ObjectiveType::from_raw(20), ObjectiveType::AreaTriggerExit);
        assert_eq!(ObjectiveType::from_raw(200), ObjectiveType::Unknown(200));
        assert!(ObjectiveType::Item.stores_progress());
        assert!(!ObjectiveType::Money.stores_progress());
    }

    #[test]
    fn test_visual_effect_index_is_capped() {
        let mut objective = Objective::from_row(&QuestObjectiveRow {
            id: 7,
            quest_id: 1,
            ..Default::default()
        });

        assert!(objective.set_visual_effect(2, 11));
        assert_eq!(objective.visual_effects, vec![0, 0, 11]);

        assert!(!objective.set_visual_effect(4_000_000_000, 1));
        assert!(!objective.set_visual_effect(QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT, 1));
        assert_eq!(objective.visual_effects.len(), 3);

        assert!(objective.set_visual_effect(QUEST_OBJECTIVE_VISUAL_EFFECT_LIMIT - 1, 5));
        assert_eq!(objective.visual_effects.len(), 64);
    }

    #[test]
    fn test_quest_from_row_copies_reward_arrays() {
        let row = QuestTemplateRow {
            id: 42,
            log_title: "A Threat Within".to_string(),
            reward_item: [2589, 0, 0, 0],
            reward_amount: [5, 0, 0, 0],
            reward_faction_id: [72, 0, 0, 0, 0],
            reward_faction_value: [250, 0, 0, 0, 0],
            flags_ex: QuestFlagsEx::AUTO_PUSH,
            ..Default::default()
        };

        let quest = Quest::from_row(&row);
        assert_eq!(quest.id, 42);
        assert_eq!(quest.reward_items[0], ItemReward { item_id: 2589, amount: 5 });
        assert_eq!(quest.reward_factions[0].faction_id, 72);
        assert_eq!(quest.reward_factions[0].value, 250);
        assert!(quest.is_auto_push());
        assert!(quest.objectives.is_empty());
    }

    #[test]
    fn test_visual_effects_grow_to_index() {
        let mut objective = Objective::from_row(&QuestObjectiveRow {
            id: 1,
            quest_id: 2,
            ..Default::default()
        });
        objective.set_visual_effect(2, 77);
        objective.set_visual_effect(0, 5);
        assert_eq!(objective.visual_effects, vec![5, 0, 77]);
    }

    #[test]
    fn test_invalid_choice_item_type_is_rejected() {
        let mut quest = Quest::from_row(&QuestTemplateRow { id: 1, ..Default::default() });
        let row = RewardChoiceItemsRow {
            quest_id: 1,
            item_type: [0, 1, 9, 0, 0, 0],
        };
        assert!(quest.load_reward_choice_items(&row).is_err());
    }
}

//! Typed rows of the quest tables, one struct per table.
//!
//! `WorldDatabase` produces these; the loader consumes them. Arrays mirror the
//! numbered columns (`reward_item1` .. `reward_item4` and so on).

use super::definition::{
    QUEST_EMOTE_COUNT, QUEST_ITEM_DROP_COUNT, QUEST_REWARD_CHOICES_COUNT,
    QUEST_REWARD_CURRENCY_COUNT, QUEST_REWARD_ITEM_COUNT, QUEST_REWARD_REPUTATIONS_COUNT,
};

/// `quest_template`
#[derive(Debug, Clone, Default)]
pub struct QuestTemplateRow {
    pub id: u32,
    pub quest_type: u8,
    pub content_tuning_id: u32,
    pub quest_sort_id: i32,
    pub quest_info_id: u32,
    pub suggested_group_num: u32,
    pub reward_next_quest: u32,
    pub reward_xp_difficulty: u32,
    pub reward_money: i32,
    pub reward_bonus_money: u32,
    pub reward_spell: u32,
    pub reward_honor: u32,
    pub start_item: u32,
    pub flags: u32,
    pub flags_ex: u32,
    pub reward_item: [u32; QUEST_REWARD_ITEM_COUNT],
    pub reward_amount: [u32; QUEST_REWARD_ITEM_COUNT],
    pub item_drop: [u32; QUEST_ITEM_DROP_COUNT],
    pub item_drop_quantity: [u32; QUEST_ITEM_DROP_COUNT],
    pub reward_choice_item_id: [u32; QUEST_REWARD_CHOICES_COUNT],
    pub reward_choice_item_quantity: [u32; QUEST_REWARD_CHOICES_COUNT],
    pub reward_choice_item_display_id: [u32; QUEST_REWARD_CHOICES_COUNT],
    pub reward_title_id: u32,
    pub reward_skill_line_id: u32,
    pub reward_num_skill_ups: u32,
    pub reward_faction_id: [u32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_faction_value: [i32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_faction_override: [i32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_faction_cap_in: [i32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_currency_id: [u32; QUEST_REWARD_CURRENCY_COUNT],
    pub reward_currency_qty: [u32; QUEST_REWARD_CURRENCY_COUNT],
    pub accepted_sound_kit_id: u32,
    pub complete_sound_kit_id: u32,
    pub time_allowed: u32,
    pub allowable_races: u64,
    pub log_title: String,
    pub log_description: String,
    pub quest_description: String,
    pub area_description: String,
    pub quest_completion_log: String,
}

/// `quest_reward_choice_items`
#[derive(Debug, Clone, Default)]
pub struct RewardChoiceItemsRow {
    pub quest_id: u32,
    /// Raw loot item type per slot, validated on load
    pub item_type: [i64; QUEST_REWARD_CHOICES_COUNT],
}

/// `quest_reward_display_spell`
#[derive(Debug, Clone, Default)]
pub struct RewardDisplaySpellRow {
    pub quest_id: u32,
    pub spell_id: u32,
    pub player_condition_id: u32,
}

/// `quest_details`
#[derive(Debug, Clone, Default)]
pub struct QuestDetailsRow {
    pub quest_id: u32,
    pub emote: [u32; QUEST_EMOTE_COUNT],
    pub emote_delay: [u32; QUEST_EMOTE_COUNT],
}

/// `quest_request_items`
#[derive(Debug, Clone, Default)]
pub struct RequestItemsRow {
    pub quest_id: u32,
    pub emote_on_complete: u32,
    pub emote_on_incomplete: u32,
    pub emote_on_complete_delay: u32,
    pub emote_on_incomplete_delay: u32,
    pub completion_text: String,
}

/// `quest_offer_reward`
#[derive(Debug, Clone, Default)]
pub struct OfferRewardRow {
    pub quest_id: u32,
    pub emote: [u32; QUEST_EMOTE_COUNT],
    pub emote_delay: [u32; QUEST_EMOTE_COUNT],
    pub reward_text: String,
}

/// `quest_template_addon`
#[derive(Debug, Clone, Default)]
pub struct QuestTemplateAddonRow {
    pub quest_id: u32,
    pub max_level: u32,
    pub allowable_classes: u32,
    pub source_spell_id: u32,
    pub prev_quest_id: i32,
    pub next_quest_id: u32,
    pub exclusive_group: i32,
    pub breadcrumb_for_quest_id: i32,
    pub reward_mail_template_id: u32,
    pub reward_mail_delay: u32,
    pub required_skill_id: u32,
    pub required_skill_points: u32,
    pub required_min_rep_faction: u32,
    pub required_max_rep_faction: u32,
    pub required_min_rep_value: i32,
    pub required_max_rep_value: i32,
    pub provided_item_count: u32,
    pub special_flags: u32,
    pub script_name: String,
}

/// `quest_mail_sender`
#[derive(Debug, Clone, Default)]
pub struct MailSenderRow {
    pub quest_id: u32,
    pub reward_mail_sender_entry: u32,
}

/// `quest_objectives`
#[derive(Debug, Clone, Default)]
pub struct QuestObjectiveRow {
    pub id: u32,
    pub quest_id: u32,
    /// Raw stored type; values outside the known set become `ObjectiveType::Unknown`
    pub objective_type: i64,
    pub order: i32,
    pub storage_index: i32,
    pub object_id: i32,
    pub amount: i32,
    pub flags: u32,
    pub flags2: u32,
    pub progress_bar_weight: f32,
    pub description: String,
}

/// `quest_visual_effect` joined with `quest_objectives`.
///
/// `quest_id` is `None` when no objective with `objective_id` exists.
#[derive(Debug, Clone, Default)]
pub struct VisualEffectRow {
    pub objective_id: u32,
    pub quest_id: Option<u32>,
    pub index: u32,
    pub visual_effect: i32,
}

/// One `(entry, quest)` pair of a relation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestRelationRow {
    pub entry: u32,
    pub quest_id: u32,
}

/// Every table the quest loader consumes, fetched up front
#[derive(Debug, Clone, Default)]
pub struct QuestTables {
    pub templates: Vec<QuestTemplateRow>,
    pub reward_choice_items: Vec<RewardChoiceItemsRow>,
    pub reward_display_spells: Vec<RewardDisplaySpellRow>,
    pub details: Vec<QuestDetailsRow>,
    pub request_items: Vec<RequestItemsRow>,
    pub offer_rewards: Vec<OfferRewardRow>,
    pub template_addons: Vec<QuestTemplateAddonRow>,
    pub mail_senders: Vec<MailSenderRow>,
    pub objectives: Vec<QuestObjectiveRow>,
    pub visual_effects: Vec<VisualEffectRow>,
    pub creature_starters: Vec<QuestRelationRow>,
    pub creature_enders: Vec<QuestRelationRow>,
    pub gameobject_starters: Vec<QuestRelationRow>,
    pub gameobject_enders: Vec<QuestRelationRow>,
    /// `areatrigger_involvedrelation`, entry is the trigger id
    pub area_triggers: Vec<QuestRelationRow>,
}

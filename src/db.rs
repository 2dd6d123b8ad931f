use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::data::{
    AreaTrigger, AreaTriggerTemplate, BattlePetSpecies, CharTitle, ContentStores,
    CreatureTemplate, CriteriaTree, CurrencyType, Faction, GameObjectTemplate, GameObjectType,
    ItemTemplate, MailTemplate, NpcFlags, Record, RecordStore, SkillLine, SpellInfo,
};
use crate::quest::definition::{
    QUEST_EMOTE_COUNT, QUEST_ITEM_DROP_COUNT, QUEST_REWARD_CHOICES_COUNT,
    QUEST_REWARD_CURRENCY_COUNT, QUEST_REWARD_ITEM_COUNT, QUEST_REWARD_REPUTATIONS_COUNT,
};
use crate::quest::loader::ContentCleanup;
use crate::quest::rows::{
    MailSenderRow, OfferRewardRow, QuestDetailsRow, QuestObjectiveRow, QuestRelationRow,
    QuestTables, QuestTemplateAddonRow, QuestTemplateRow, RequestItemsRow, RewardChoiceItemsRow,
    RewardDisplaySpellRow, VisualEffectRow,
};
use crate::quest::relations::RelationKind;

/// Column definitions of `quest_template`
fn quest_template_columns() -> Vec<String> {
    let mut columns: Vec<String> = [
        "id INTEGER PRIMARY KEY",
        "quest_type INTEGER NOT NULL DEFAULT 2",
        "content_tuning_id INTEGER NOT NULL DEFAULT 0",
        "quest_sort_id INTEGER NOT NULL DEFAULT 0",
        "quest_info_id INTEGER NOT NULL DEFAULT 0",
        "suggested_group_num INTEGER NOT NULL DEFAULT 0",
        "reward_next_quest INTEGER NOT NULL DEFAULT 0",
        "reward_xp_difficulty INTEGER NOT NULL DEFAULT 0",
        "reward_money INTEGER NOT NULL DEFAULT 0",
        "reward_bonus_money INTEGER NOT NULL DEFAULT 0",
        "reward_spell INTEGER NOT NULL DEFAULT 0",
        "reward_honor INTEGER NOT NULL DEFAULT 0",
        "start_item INTEGER NOT NULL DEFAULT 0",
        "flags INTEGER NOT NULL DEFAULT 0",
        "flags_ex INTEGER NOT NULL DEFAULT 0",
        "reward_title_id INTEGER NOT NULL DEFAULT 0",
        "reward_skill_line_id INTEGER NOT NULL DEFAULT 0",
        "reward_num_skill_ups INTEGER NOT NULL DEFAULT 0",
        "accepted_sound_kit_id INTEGER NOT NULL DEFAULT 0",
        "complete_sound_kit_id INTEGER NOT NULL DEFAULT 0",
        "time_allowed INTEGER NOT NULL DEFAULT 0",
        "allowable_races INTEGER NOT NULL DEFAULT 0",
        "log_title TEXT NOT NULL DEFAULT ''",
        "log_description TEXT NOT NULL DEFAULT ''",
        "quest_description TEXT NOT NULL DEFAULT ''",
        "area_description TEXT NOT NULL DEFAULT ''",
        "quest_completion_log TEXT NOT NULL DEFAULT ''",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let numbered = [
        ("reward_item", QUEST_REWARD_ITEM_COUNT),
        ("reward_amount", QUEST_REWARD_ITEM_COUNT),
        ("item_drop", QUEST_ITEM_DROP_COUNT),
        ("item_drop_quantity", QUEST_ITEM_DROP_COUNT),
        ("reward_choice_item_id", QUEST_REWARD_CHOICES_COUNT),
        ("reward_choice_item_quantity", QUEST_REWARD_CHOICES_COUNT),
        ("reward_choice_item_display_id", QUEST_REWARD_CHOICES_COUNT),
        ("reward_faction_id", QUEST_REWARD_REPUTATIONS_COUNT),
        ("reward_faction_value", QUEST_REWARD_REPUTATIONS_COUNT),
        ("reward_faction_override", QUEST_REWARD_REPUTATIONS_COUNT),
        ("reward_faction_cap_in", QUEST_REWARD_REPUTATIONS_COUNT),
        ("reward_currency_id", QUEST_REWARD_CURRENCY_COUNT),
        ("reward_currency_qty", QUEST_REWARD_CURRENCY_COUNT),
    ];
    for (prefix, count) in numbered {
        columns.extend((1..=count).map(|n| format!("{}{} INTEGER NOT NULL DEFAULT 0", prefix, n)));
    }

    columns
}

fn emote_columns() -> String {
    (1..=QUEST_EMOTE_COUNT)
        .flat_map(|n| {
            [
                format!("emote{} INTEGER NOT NULL DEFAULT 0", n),
                format!("emote_delay{} INTEGER NOT NULL DEFAULT 0", n),
            ]
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS quest_reward_choice_items (
        quest_id INTEGER PRIMARY KEY,
        type1 INTEGER NOT NULL DEFAULT 0,
        type2 INTEGER NOT NULL DEFAULT 0,
        type3 INTEGER NOT NULL DEFAULT 0,
        type4 INTEGER NOT NULL DEFAULT 0,
        type5 INTEGER NOT NULL DEFAULT 0,
        type6 INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_reward_display_spell (
        quest_id INTEGER NOT NULL,
        idx INTEGER NOT NULL DEFAULT 0,
        spell_id INTEGER NOT NULL DEFAULT 0,
        player_condition_id INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY(quest_id, idx)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_request_items (
        quest_id INTEGER PRIMARY KEY,
        emote_on_complete INTEGER NOT NULL DEFAULT 0,
        emote_on_incomplete INTEGER NOT NULL DEFAULT 0,
        emote_on_complete_delay INTEGER NOT NULL DEFAULT 0,
        emote_on_incomplete_delay INTEGER NOT NULL DEFAULT 0,
        completion_text TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_template_addon (
        quest_id INTEGER PRIMARY KEY,
        max_level INTEGER NOT NULL DEFAULT 0,
        allowable_classes INTEGER NOT NULL DEFAULT 0,
        source_spell_id INTEGER NOT NULL DEFAULT 0,
        prev_quest_id INTEGER NOT NULL DEFAULT 0,
        next_quest_id INTEGER NOT NULL DEFAULT 0,
        exclusive_group INTEGER NOT NULL DEFAULT 0,
        breadcrumb_for_quest_id INTEGER NOT NULL DEFAULT 0,
        reward_mail_template_id INTEGER NOT NULL DEFAULT 0,
        reward_mail_delay INTEGER NOT NULL DEFAULT 0,
        required_skill_id INTEGER NOT NULL DEFAULT 0,
        required_skill_points INTEGER NOT NULL DEFAULT 0,
        required_min_rep_faction INTEGER NOT NULL DEFAULT 0,
        required_max_rep_faction INTEGER NOT NULL DEFAULT 0,
        required_min_rep_value INTEGER NOT NULL DEFAULT 0,
        required_max_rep_value INTEGER NOT NULL DEFAULT 0,
        provided_item_count INTEGER NOT NULL DEFAULT 0,
        special_flags INTEGER NOT NULL DEFAULT 0,
        script_name TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_mail_sender (
        quest_id INTEGER PRIMARY KEY,
        reward_mail_sender_entry INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_objectives (
        id INTEGER PRIMARY KEY,
        quest_id INTEGER NOT NULL DEFAULT 0,
        objective_type INTEGER NOT NULL DEFAULT 0,
        order_index INTEGER NOT NULL DEFAULT 0,
        storage_index INTEGER NOT NULL DEFAULT 0,
        object_id INTEGER NOT NULL DEFAULT 0,
        amount INTEGER NOT NULL DEFAULT 0,
        flags INTEGER NOT NULL DEFAULT 0,
        flags2 INTEGER NOT NULL DEFAULT 0,
        progress_bar_weight REAL NOT NULL DEFAULT 0,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_visual_effect (
        objective_id INTEGER NOT NULL,
        idx INTEGER NOT NULL DEFAULT 0,
        visual_effect INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY(objective_id, idx)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS creature_template (
        entry INTEGER PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        npcflag INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS gameobject_template (
        entry INTEGER PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        type INTEGER NOT NULL DEFAULT 5
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS item_template (
        entry INTEGER PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        start_quest INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS areatrigger_template (
        id INTEGER NOT NULL,
        is_custom INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY(id, is_custom)
    )
    "#,
];

/// Tables that only need to answer "does this id exist"
const ID_TABLES: &[&str] = &[
    "faction",
    "currency_types",
    "spell",
    "battle_pet_species",
    "criteria_tree",
    "areatrigger",
    "mail_template",
    "char_titles",
    "skill_line",
];

const RELATION_TABLES: &[RelationKind] = &[
    RelationKind::CreatureStarter,
    RelationKind::CreatureEnder,
    RelationKind::GameObjectStarter,
    RelationKind::GameObjectEnder,
    RelationKind::AreaTrigger,
];

fn int(row: &SqliteRow, column: &str) -> Result<i64, sqlx::Error> {
    row.try_get::<i64, _>(column)
}

fn uint(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
    Ok(narrow(column, int(row, column)?))
}

fn sint(row: &SqliteRow, column: &str) -> Result<i32, sqlx::Error> {
    Ok(narrow(column, int(row, column)?))
}

/// Fit a stored integer into the field type. Values that do not fit are
/// logged and read as the default.
fn narrow<T: TryFrom<i64> + Default>(column: &str, value: i64) -> T {
    T::try_from(value).unwrap_or_else(|_| {
        warn!("Column `{}` holds {} which is out of range, reading it as 0", column, value);
        T::default()
    })
}

/// Nullable text, read as empty when NULL
fn text(row: &SqliteRow, column: &str) -> Result<String, sqlx::Error> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

/// Read `prefix1` .. `prefixN` into an array
fn numbered<T: TryFrom<i64> + Copy + Default, const N: usize>(
    row: &SqliteRow,
    prefix: &str,
) -> Result<[T; N], sqlx::Error> {
    let mut values = [T::default(); N];
    for (slot, value) in values.iter_mut().enumerate() {
        let column = format!("{}{}", prefix, slot + 1);
        *value = narrow(&column, int(row, &column)?);
    }
    Ok(values)
}

pub struct WorldDatabase {
    pool: SqlitePool,
}

impl WorldDatabase {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        // Run migrations
        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let quest_template = format!(
            "CREATE TABLE IF NOT EXISTS quest_template (\n{}\n)",
            quest_template_columns().join(",\n")
        );
        sqlx::query(&quest_template).execute(pool).await?;

        for table in ["quest_details", "quest_offer_reward"] {
            let extra = if table == "quest_offer_reward" {
                ",\nreward_text TEXT"
            } else {
                ""
            };
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (\nquest_id INTEGER PRIMARY KEY,\n{}{}\n)",
                table,
                emote_columns(),
                extra
            );
            sqlx::query(&sql).execute(pool).await?;
        }

        for sql in SCHEMA {
            sqlx::query(sql).execute(pool).await?;
        }

        for table in ID_TABLES {
            let sql = format!("CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY)", table);
            sqlx::query(&sql).execute(pool).await?;
        }

        for kind in RELATION_TABLES {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} \
                 (id INTEGER NOT NULL, quest INTEGER NOT NULL, PRIMARY KEY(id, quest))",
                kind.table()
            );
            sqlx::query(&sql).execute(pool).await?;
        }

        info!("Database migrations complete");
        Ok(())
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<SqliteRow>, sqlx::Error> {
        sqlx::query(sql).fetch_all(&self.pool).await
    }

    /// Fetch every table the quest loader consumes
    pub async fn fetch_quest_tables(&self) -> Result<QuestTables, sqlx::Error> {
        let mut tables = QuestTables::default();

        for r in self.fetch("SELECT * FROM quest_template ORDER BY id").await? {
            tables.templates.push(QuestTemplateRow {
                id: uint(&r, "id")?,
                quest_type: narrow("quest_type", int(&r, "quest_type")?),
                content_tuning_id: uint(&r, "content_tuning_id")?,
                quest_sort_id: sint(&r, "quest_sort_id")?,
                quest_info_id: uint(&r, "quest_info_id")?,
                suggested_group_num: uint(&r, "suggested_group_num")?,
                reward_next_quest: uint(&r, "reward_next_quest")?,
                reward_xp_difficulty: uint(&r, "reward_xp_difficulty")?,
                reward_money: sint(&r, "reward_money")?,
                reward_bonus_money: uint(&r, "reward_bonus_money")?,
                reward_spell: uint(&r, "reward_spell")?,
                reward_honor: uint(&r, "reward_honor")?,
                start_item: uint(&r, "start_item")?,
                flags: uint(&r, "flags")?,
                flags_ex: uint(&r, "flags_ex")?,
                reward_item: numbered(&r, "reward_item")?,
                reward_amount: numbered(&r, "reward_amount")?,
                item_drop: numbered(&r, "item_drop")?,
                item_drop_quantity: numbered(&r, "item_drop_quantity")?,
                reward_choice_item_id: numbered(&r, "reward_choice_item_id")?,
                reward_choice_item_quantity: numbered(&r, "reward_choice_item_quantity")?,
                reward_choice_item_display_id: numbered(&r, "reward_choice_item_display_id")?,
                reward_title_id: uint(&r, "reward_title_id")?,
                reward_skill_line_id: uint(&r, "reward_skill_line_id")?,
                reward_num_skill_ups: uint(&r, "reward_num_skill_ups")?,
                reward_faction_id: numbered(&r, "reward_faction_id")?,
                reward_faction_value: numbered(&r, "reward_faction_value")?,
                reward_faction_override: numbered(&r, "reward_faction_override")?,
                reward_faction_cap_in: numbered(&r, "reward_faction_cap_in")?,
                reward_currency_id: numbered(&r, "reward_currency_id")?,
                reward_currency_qty: numbered(&r, "reward_currency_qty")?,
                accepted_sound_kit_id: uint(&r, "accepted_sound_kit_id")?,
                complete_sound_kit_id: uint(&r, "complete_sound_kit_id")?,
                time_allowed: uint(&r, "time_allowed")?,
                allowable_races: int(&r, "allowable_races")? as u64,
                log_title: text(&r, "log_title")?,
                log_description: text(&r, "log_description")?,
                quest_description: text(&r, "quest_description")?,
                area_description: text(&r, "area_description")?,
                quest_completion_log: text(&r, "quest_completion_log")?,
            });
        }

        for r in self.fetch("SELECT * FROM quest_reward_choice_items").await? {
            tables.reward_choice_items.push(RewardChoiceItemsRow {
                quest_id: uint(&r, "quest_id")?,
                item_type: numbered(&r, "type")?,
            });
        }

        for r in self
            .fetch("SELECT * FROM quest_reward_display_spell ORDER BY quest_id, idx")
            .await?
        {
            tables.reward_display_spells.push(RewardDisplaySpellRow {
                quest_id: uint(&r, "quest_id")?,
                spell_id: uint(&r, "spell_id")?,
                player_condition_id: uint(&r, "player_condition_id")?,
            });
        }

        for r in self.fetch("SELECT * FROM quest_details").await? {
            tables.details.push(QuestDetailsRow {
                quest_id: uint(&r, "quest_id")?,
                emote: numbered(&r, "emote")?,
                emote_delay: numbered(&r, "emote_delay")?,
            });
        }

        for r in self.fetch("SELECT * FROM quest_request_items").await? {
            tables.request_items.push(RequestItemsRow {
                quest_id: uint(&r, "quest_id")?,
                emote_on_complete: uint(&r, "emote_on_complete")?,
                emote_on_incomplete: uint(&r, "emote_on_incomplete")?,
                emote_on_complete_delay: uint(&r, "emote_on_complete_delay")?,
                emote_on_incomplete_delay: uint(&r, "emote_on_incomplete_delay")?,
                completion_text: text(&r, "completion_text")?,
            });
        }

        for r in self.fetch("SELECT * FROM quest_offer_reward").await? {
            tables.offer_rewards.push(OfferRewardRow {
                quest_id: uint(&r, "quest_id")?,
                emote: numbered(&r, "emote")?,
                emote_delay: numbered(&r, "emote_delay")?,
                reward_text: text(&r, "reward_text")?,
            });
        }

        for r in self.fetch("SELECT * FROM quest_template_addon").await? {
            tables.template_addons.push(QuestTemplateAddonRow {
                quest_id: uint(&r, "quest_id")?,
                max_level: uint(&r, "max_level")?,
                allowable_classes: uint(&r, "allowable_classes")?,
                source_spell_id: uint(&r, "source_spell_id")?,
                prev_quest_id: sint(&r, "prev_quest_id")?,
                next_quest_id: uint(&r, "next_quest_id")?,
                exclusive_group: sint(&r, "exclusive_group")?,
                breadcrumb_for_quest_id: sint(&r, "breadcrumb_for_quest_id")?,
                reward_mail_template_id: uint(&r, "reward_mail_template_id")?,
                reward_mail_delay: uint(&r, "reward_mail_delay")?,
                required_skill_id: uint(&r, "required_skill_id")?,
                required_skill_points: uint(&r, "required_skill_points")?,
                required_min_rep_faction: uint(&r, "required_min_rep_faction")?,
                required_max_rep_faction: uint(&r, "required_max_rep_faction")?,
                required_min_rep_value: sint(&r, "required_min_rep_value")?,
                required_max_rep_value: sint(&r, "required_max_rep_value")?,
                provided_item_count: uint(&r, "provided_item_count")?,
                special_flags: uint(&r, "special_flags")?,
                script_name: text(&r, "script_name")?,
            });
        }

        for r in self.fetch("SELECT * FROM quest_mail_sender").await? {
            tables.mail_senders.push(MailSenderRow {
                quest_id: uint(&r, "quest_id")?,
                reward_mail_sender_entry: uint(&r, "reward_mail_sender_entry")?,
            });
        }

        for r in self
            .fetch("SELECT * FROM quest_objectives ORDER BY quest_id, order_index")
            .await?
        {
            tables.objectives.push(QuestObjectiveRow {
                id: uint(&r, "id")?,
                quest_id: uint(&r, "quest_id")?,
                objective_type: int(&r, "objective_type")?,
                order: sint(&r, "order_index")?,
                storage_index: sint(&r, "storage_index")?,
                object_id: sint(&r, "object_id")?,
                amount: sint(&r, "amount")?,
                flags: uint(&r, "flags")?,
                flags2: uint(&r, "flags2")?,
                progress_bar_weight: r.try_get::<f64, _>("progress_bar_weight")? as f32,
                description: text(&r, "description")?,
            });
        }

        let visual_effects = self
            .fetch(
                "SELECT v.objective_id, o.quest_id, v.idx, v.visual_effect \
                 FROM quest_visual_effect v LEFT JOIN quest_objectives o ON o.id = v.objective_id \
                 ORDER BY v.objective_id, v.idx",
            )
            .await?;
        for r in visual_effects {
            tables.visual_effects.push(VisualEffectRow {
                objective_id: uint(&r, "objective_id")?,
                quest_id: r
                    .try_get::<Option<i64>, _>("quest_id")?
                    .map(|quest_id| narrow("quest_id", quest_id)),
                index: uint(&r, "idx")?,
                visual_effect: sint(&r, "visual_effect")?,
            });
        }

        tables.creature_starters = self.fetch_relations(RelationKind::CreatureStarter).await?;
        tables.creature_enders = self.fetch_relations(RelationKind::CreatureEnder).await?;
        tables.gameobject_starters = self.fetch_relations(RelationKind::GameObjectStarter).await?;
        tables.gameobject_enders = self.fetch_relations(RelationKind::GameObjectEnder).await?;
        tables.area_triggers = self.fetch_relations(RelationKind::AreaTrigger).await?;

        debug!(
            "Fetched {} quest templates, {} objectives",
            tables.templates.len(),
            tables.objectives.len()
        );
        Ok(tables)
    }

    async fn fetch_relations(
        &self,
        kind: RelationKind,
    ) -> Result<Vec<QuestRelationRow>, sqlx::Error> {
        let sql = format!("SELECT id, quest FROM {} ORDER BY id, quest", kind.table());
        self.fetch(&sql)
            .await?
            .iter()
            .map(|r| {
                Ok(QuestRelationRow {
                    entry: uint(r, "id")?,
                    quest_id: uint(r, "quest")?,
                })
            })
            .collect()
    }

    async fn fetch_ids<T: Record>(
        &self,
        table: &str,
        make: fn(u32) -> T,
    ) -> Result<RecordStore<T>, sqlx::Error> {
        let sql = format!("SELECT id FROM {}", table);
        self.fetch(&sql)
            .await?
            .iter()
            .map(|r| Ok(make(uint(r, "id")?)))
            .collect()
    }

    /// Load every record store the quest loader validates against
    pub async fn load_content_stores(&self) -> Result<ContentStores, sqlx::Error> {
        let creatures = self
            .fetch("SELECT entry, name, npcflag FROM creature_template")
            .await?
            .iter()
            .map(|r| {
                Ok(CreatureTemplate {
                    entry: uint(r, "entry")?,
                    name: text(r, "name")?,
                    npc_flags: NpcFlags(int(r, "npcflag")? as u64),
                })
            })
            .collect::<Result<_, sqlx::Error>>()?;

        let gameobjects = self
            .fetch("SELECT entry, name, type FROM gameobject_template")
            .await?
            .iter()
            .map(|r| {
                Ok(GameObjectTemplate {
                    entry: uint(r, "entry")?,
                    name: text(r, "name")?,
                    kind: GameObjectType::from_raw(int(r, "type")?),
                })
            })
            .collect::<Result<_, sqlx::Error>>()?;

        let items = self
            .fetch("SELECT entry, name, start_quest FROM item_template")
            .await?
            .iter()
            .map(|r| {
                Ok(ItemTemplate {
                    entry: uint(r, "entry")?,
                    name: text(r, "name")?,
                    start_quest: uint(r, "start_quest")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()?;

        // custom templates live in their own id space and are not loaded here
        let area_trigger_templates = self
            .fetch("SELECT id, is_custom FROM areatrigger_template WHERE is_custom = 0")
            .await?
            .iter()
            .map(|r| {
                Ok(AreaTriggerTemplate {
                    id: uint(r, "id")?,
                    is_custom: int(r, "is_custom")? != 0,
                })
            })
            .collect::<Result<_, sqlx::Error>>()?;

        let stores = ContentStores {
            creatures,
            gameobjects,
            items,
            factions: self.fetch_ids("faction", Faction::new).await?,
            currencies: self.fetch_ids("currency_types", CurrencyType::new).await?,
            spells: self.fetch_ids("spell", SpellInfo::new).await?,
            battle_pet_species: self.fetch_ids("battle_pet_species", BattlePetSpecies::new).await?,
            criteria_trees: self.fetch_ids("criteria_tree", CriteriaTree::new).await?,
            area_triggers: self.fetch_ids("areatrigger", AreaTrigger::new).await?,
            area_trigger_templates,
            mail_templates: self.fetch_ids("mail_template", MailTemplate::new).await?,
            char_titles: self.fetch_ids("char_titles", CharTitle::new).await?,
            skill_lines: self.fetch_ids("skill_line", SkillLine::new).await?,
        };

        info!(
            "Loaded content stores: {} creatures, {} gameobjects, {} items",
            stores.creatures.len(),
            stores.gameobjects.len(),
            stores.items.len()
        );
        Ok(stores)
    }

    /// Delete the rows collected by auto-clean, in one transaction.
    /// Returns the number of rows deleted.
    pub async fn apply_cleanup(&self, cleanup: &[ContentCleanup]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;

        for item in cleanup {
            let result = match item {
                ContentCleanup::QuestRows { table, quest_id } => {
                    let sql = format!("DELETE FROM {} WHERE quest_id = ?", table);
                    sqlx::query(&sql).bind(*quest_id).execute(&mut *tx).await?
                }
                ContentCleanup::Objective { objective_id } => {
                    sqlx::query("DELETE FROM quest_objectives WHERE id = ?")
                        .bind(*objective_id)
                        .execute(&mut *tx)
                        .await?
                }
                ContentCleanup::VisualEffect { objective_id } => {
                    sqlx::query("DELETE FROM quest_visual_effect WHERE objective_id = ?")
                        .bind(*objective_id)
                        .execute(&mut *tx)
                        .await?
                }
                ContentCleanup::Relation {
                    table,
                    entry,
                    quest_id,
                } => {
                    let sql = format!("DELETE FROM {} WHERE id = ? AND quest = ?", table);
                    sqlx::query(&sql)
                        .bind(*entry)
                        .bind(*quest_id)
                        .execute(&mut *tx)
                        .await?
                }
            };
            deleted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(deleted)
    }

    #[cfg(test)]
    async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }
}

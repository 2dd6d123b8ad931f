use std::collections::HashMap;

use super::records::{
    AreaTrigger, AreaTriggerTemplate, BattlePetSpecies, CharTitle, CreatureTemplate,
    CriteriaTree, CurrencyType, Faction, GameObjectTemplate, ItemTemplate, MailTemplate, Record,
    SkillLine, SpellInfo,
};

/// Keyed collection of content records
#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    records: HashMap<u32, T>,
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Insert a record, returning the one it replaced
    pub fn insert(&mut self, record: T) -> Option<T> {
        self.records.insert(record.id(), record)
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.records.contains_key(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> FromIterator<T> for RecordStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

/// Every lookup table the quest loader validates against.
///
/// Populated by the other content loaders before quests are loaded. The quest
/// loader only reads from it, except for patching the quest-giver flag onto
/// creatures that are referenced by quest relations.
#[derive(Debug, Clone, Default)]
pub struct ContentStores {
    pub creatures: RecordStore<CreatureTemplate>,
    pub gameobjects: RecordStore<GameObjectTemplate>,
    pub items: RecordStore<ItemTemplate>,
    pub factions: RecordStore<Faction>,
    pub currencies: RecordStore<CurrencyType>,
    pub spells: RecordStore<SpellInfo>,
    pub battle_pet_species: RecordStore<BattlePetSpecies>,
    pub criteria_trees: RecordStore<CriteriaTree>,
    pub area_triggers: RecordStore<AreaTrigger>,
    pub area_trigger_templates: RecordStore<AreaTriggerTemplate>,
    pub mail_templates: RecordStore<MailTemplate>,
    pub char_titles: RecordStore<CharTitle>,
    pub skill_lines: RecordStore<SkillLine>,
}

impl ContentStores {
    /// Whether a non-custom area trigger template exists
    pub fn has_area_trigger_template(&self, id: u32) -> bool {
        self.area_trigger_templates
            .get(id)
            .is_some_and(|template| !template.is_custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::NpcFlags;

    #[test]
    fn test_record_store_lookup() {
        let store: RecordStore<Faction> = [Faction::new(72), Faction::new(47)]
            .into_iter()
            .collect();

        assert_eq!(store.len(), 2);
        assert!(store.contains(72));
        assert!(!store.contains(1));
        assert_eq!(store.get(47).map(|f| f.id), Some(47));
    }

    #[test]
    fn test_patch_creature_flags() {
        let mut store = RecordStore::new();
        store.insert(CreatureTemplate {
            entry: 197,
            name: "Marshal McBride".to_string(),
            npc_flags: NpcFlags(NpcFlags::GOSSIP),
        });

        assert!(!store.get(197).unwrap().is_quest_giver());
        store.get_mut(197).unwrap().npc_flags.insert(NpcFlags::QUEST_GIVER);
        assert!(store.get(197).unwrap().is_quest_giver());
    }

    #[test]
    fn test_custom_area_trigger_templates_do_not_count() {
        let mut stores = ContentStores::default();
        stores.area_trigger_templates.insert(AreaTriggerTemplate { id: 10, is_custom: false });
        stores.area_trigger_templates.insert(AreaTriggerTemplate { id: 11, is_custom: true });

        assert!(stores.has_area_trigger_template(10));
        assert!(!stores.has_area_trigger_template(11));
        assert!(!stores.has_area_trigger_template(12));
    }
}

pub mod records;
pub mod store;

pub use records::{
    AreaTrigger, AreaTriggerTemplate, BattlePetSpecies, CharTitle, CreatureTemplate,
    CriteriaTree, CurrencyType, Faction, GameObjectTemplate, GameObjectType, ItemTemplate,
    MailTemplate, NpcFlags, Record, SkillLine, SpellInfo,
};
pub use store::{ContentStores, RecordStore};

// ============================================================================
// Record Trait
// ============================================================================

/// A content record addressable by a numeric id.
pub trait Record {
    fn id(&self) -> u32;
}

// ============================================================================
// NPC Flags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpcFlags(pub u64);

impl NpcFlags {
    pub const GOSSIP: u64 = 0x0000_0001;
    pub const QUEST_GIVER: u64 = 0x0000_0002;
    pub const TRAINER: u64 = 0x0000_0010;
    pub const VENDOR: u64 = 0x0000_0080;

    pub fn contains(self, bits: u64) -> bool {
        self.0 & bits == bits
    }

    pub fn insert(&mut self, bits: u64) {
        self.0 |= bits;
    }
}

// ============================================================================
// Creatures & GameObjects
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CreatureTemplate {
    pub entry: u32,
    pub name: String,
    pub npc_flags: NpcFlags,
}

impl CreatureTemplate {
    pub fn is_quest_giver(&self) -> bool {
        self.npc_flags.contains(NpcFlags::QUEST_GIVER)
    }
}

impl Record for CreatureTemplate {
    fn id(&self) -> u32 {
        self.entry
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameObjectType {
    Door,
    Button,
    QuestGiver,
    Chest,
    Goober,
    #[default]
    Generic,
    Other(i64),
}

impl GameObjectType {
    pub fn from_raw(value: i64) -> Self {
        match value {
            0 => GameObjectType::Door,
            1 => GameObjectType::Button,
            2 => GameObjectType::QuestGiver,
            3 => GameObjectType::Chest,
            5 => GameObjectType::Generic,
            10 => GameObjectType::Goober,
            other => GameObjectType::Other(other),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameObjectTemplate {
    pub entry: u32,
    pub name: String,
    pub kind: GameObjectType,
}

impl Record for GameObjectTemplate {
    fn id(&self) -> u32 {
        self.entry
    }
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ItemTemplate {
    pub entry: u32,
    pub name: String,
    /// Quest offered when the item is used, 0 for none
    pub start_quest: u32,
}

impl Record for ItemTemplate {
    fn id(&self) -> u32 {
        self.entry
    }
}

// ============================================================================
// Area Triggers
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AreaTriggerTemplate {
    pub id: u32,
    /// Server-side custom triggers live in their own id space
    pub is_custom: bool,
}

impl Record for AreaTriggerTemplate {
    fn id(&self) -> u32 {
        self.id
    }
}

// ============================================================================
// Id-only Records
// ============================================================================

macro_rules! id_record {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            pub struct $name {
                pub id: u32,
            }

            impl $name {
                pub fn new(id: u32) -> Self {
                    Self { id }
                }
            }

            impl Record for $name {
                fn id(&self) -> u32 {
                    self.id
                }
            }
        )*
    };
}

id_record!(
    Faction,
    CurrencyType,
    SpellInfo,
    BattlePetSpecies,
    CriteriaTree,
    /// Legacy client area trigger
    AreaTrigger,
    MailTemplate,
    CharTitle,
    SkillLine,
);

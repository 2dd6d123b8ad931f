//! Quest graph linking.
//!
//! Runs once every quest is loaded and validated. Quest links are plain ids,
//! so forward references and cycles are ordinary input here; the linker turns
//! them into reverse adjacency on the target quests.

use std::collections::HashSet;
use tracing::{error, info, warn};

use super::loader::QuestLoader;

impl QuestLoader<'_> {
    /// Pass 4: resolve prev/next/breadcrumb links and exclusive groups
    pub(super) fn link_quests(&mut self) {
        self.exclusive_groups.clear();

        let ids: Vec<u32> = self.quests.keys().copied().collect();
        for &id in &ids {
            self.link_quest(id);
        }
        for &id in &ids {
            self.walk_breadcrumb_chain(id);
        }

        info!(
            "Linked {} quests, {} exclusive groups",
            ids.len(),
            self.exclusive_groups.len()
        );
    }

    fn link_quest(&mut self, id: u32) {
        let Some(quest) = self.quests.get(&id) else {
            return;
        };
        let prev_quest_id = quest.prev_quest_id;
        let next_quest_id = quest.next_quest_id;
        let breadcrumb_for = quest.breadcrumb_for_quest_id;
        let exclusive_group = quest.exclusive_group;

        let prev = prev_quest_id.unsigned_abs();
        if prev != 0 {
            match self.quests.get_mut(&prev) {
                None => {
                    error!("Quest {} has PrevQuestId {} but no such quest", id, prev_quest_id);
                }
                Some(prev_quest) if prev_quest.is_breadcrumb() => {
                    error!(
                        "Quest {} is a breadcrumb, it should not be unlocked by quest {}",
                        prev, id
                    );
                }
                Some(prev_quest) => {
                    if prev_quest_id > 0 {
                        prev_quest.dependent_previous_quests.insert(id);
                    }
                }
            }
        }

        if next_quest_id != 0 {
            match self.quests.get_mut(&next_quest_id) {
                Some(next_quest) => {
                    next_quest.dependent_previous_quests.insert(id);
                }
                None => {
                    error!("Quest {} has NextQuestId {} but no such quest", id, next_quest_id);
                }
            }
        }

        let target = breadcrumb_for.unsigned_abs();
        if target != 0 {
            if !self.quests.contains_key(&target) {
                error!(
                    "Quest {} is a breadcrumb for quest {} but no such quest exists, clearing",
                    id, breadcrumb_for
                );
                if let Some(quest) = self.quests.get_mut(&id) {
                    quest.breadcrumb_for_quest_id = 0;
                }
            } else if next_quest_id != 0 {
                warn!(
                    "Quest {} is a breadcrumb, it should not unlock quest {}",
                    id, next_quest_id
                );
            }
        }

        if exclusive_group != 0 {
            self.exclusive_groups.entry(exclusive_group).or_default().push(id);
        }
    }

    /// Follow the breadcrumb chain starting at `start`, recording `start`
    /// on every quest it leads to. A revisit breaks the chain at the last
    /// quest walked.
    fn walk_breadcrumb_chain(&mut self, start: u32) {
        let mut visited = HashSet::from([start]);
        let mut current = start;

        loop {
            let Some(quest) = self.quests.get(&current) else {
                return;
            };
            let target = quest.breadcrumb_for_quest_id.unsigned_abs();
            if target == 0 {
                return;
            }

            if !visited.insert(target) {
                error!(
                    "Breadcrumb chain starting at quest {} loops back to quest {}, \
                     clearing BreadcrumbForQuestId of quest {}",
                    start, target, current
                );
                if let Some(quest) = self.quests.get_mut(&current) {
                    quest.breadcrumb_for_quest_id = 0;
                }
                return;
            }

            let Some(target_quest) = self.quests.get_mut(&target) else {
                return;
            };
            target_quest.dependent_breadcrumb_quests.push(start);
            current = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ContentConfig;
    use crate::data::ContentStores;
    use crate::quest::loader::{QuestLoad, QuestLoader};
    use crate::quest::rows::{QuestTables, QuestTemplateAddonRow, QuestTemplateRow};

    fn quest(
        id: u32,
        prev: i32,
        next: u32,
        breadcrumb: i32,
        group: i32,
    ) -> (u32, QuestTemplateAddonRow) {
        (
            id,
            QuestTemplateAddonRow {
                quest_id: id,
                prev_quest_id: prev,
                next_quest_id: next,
                breadcrumb_for_quest_id: breadcrumb,
                exclusive_group: group,
                ..Default::default()
            },
        )
    }

    fn load(quests: Vec<(u32, QuestTemplateAddonRow)>) -> QuestLoad {
        let tables = QuestTables {
            templates: quests
                .iter()
                .map(|(id, _)| QuestTemplateRow {
                    id: *id,
                    ..Default::default()
                })
                .collect(),
            template_addons: quests.into_iter().map(|(_, addon)| addon).collect(),
            ..Default::default()
        };
        QuestLoader::load(&ContentConfig::default(), &tables, &mut ContentStores::default())
    }

    #[test]
    fn test_prev_quest_registers_dependent() {
        let load = load(vec![quest(1, 0, 0, 0, 0), quest(2, 1, 0, 0, 0), quest(3, -1, 0, 0, 0)]);
        let first = load.store.get_quest_template(1).unwrap();

        // soft prerequisites (negative) are not registered
        assert_eq!(first.dependent_previous_quests.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_missing_prev_is_left_dangling() {
        let load = load(vec![quest(1, 500, 0, 0, 0)]);
        let quest = load.store.get_quest_template(1).unwrap();

        assert_eq!(quest.prev_quest_id, 500);
        assert!(load
            .store
            .quest_templates()
            .all(|q| q.dependent_previous_quests.is_empty()));
    }

    #[test]
    fn test_prev_pointing_at_breadcrumb_is_not_linked() {
        let load = load(vec![quest(1, 0, 0, 3, 0), quest(2, 1, 0, 0, 0), quest(3, 0, 0, 0, 0)]);
        let breadcrumb = load.store.get_quest_template(1).unwrap();
        assert!(breadcrumb.dependent_previous_quests.is_empty());
    }

    #[test]
    fn test_next_quest_registers_dependent_regardless_of_sign() {
        let load = load(vec![quest(1, -5, 2, 0, 0), quest(2, 0, 0, 0, 0)]);
        let next = load.store.get_quest_template(2).unwrap();
        assert!(next.dependent_previous_quests.contains(&1));
    }

    #[test]
    fn test_dangling_breadcrumb_is_cleared() {
        let load = load(vec![quest(1, 0, 0, 999, 0)]);
        assert_eq!(load.store.get_quest_template(1).unwrap().breadcrumb_for_quest_id, 0);
    }

    #[test]
    fn test_breadcrumb_chain_is_materialized() {
        // 1 -> 2 -> 3
        let load = load(vec![quest(1, 0, 0, 2, 0), quest(2, 0, 0, 3, 0), quest(3, 0, 0, 0, 0)]);

        assert_eq!(load.store.get_quest_template(2).unwrap().dependent_breadcrumb_quests, vec![1]);
        assert_eq!(
            load.store.get_quest_template(3).unwrap().dependent_breadcrumb_quests,
            vec![1, 2]
        );
    }

    #[test]
    fn test_breadcrumb_cycle_is_broken() {
        // 1 -> 2 -> 3 -> 1
        let load = load(vec![quest(1, 0, 0, 2, 0), quest(2, 0, 0, 3, 0), quest(3, 0, 0, 1, 0)]);

        let cleared = load
            .store
            .quest_templates()
            .filter(|q| q.breadcrumb_for_quest_id == 0)
            .count();
        assert!(cleared >= 1);
        // the walk from quest 1 reaches 3 and clears it
        assert_eq!(load.store.get_quest_template(3).unwrap().breadcrumb_for_quest_id, 0);
        assert_eq!(load.store.get_quest_template(1).unwrap().breadcrumb_for_quest_id, 2);
    }

    #[test]
    fn test_breadcrumb_cycle_entered_after_start() {
        // 1 -> 2 -> 3 -> 2
        let load = load(vec![quest(1, 0, 0, 2, 0), quest(2, 0, 0, 3, 0), quest(3, 0, 0, 2, 0)]);
        let store = &load.store;

        // only the edge closing the loop is cut
        assert_eq!(store.get_quest_template(1).unwrap().breadcrumb_for_quest_id, 2);
        assert_eq!(store.get_quest_template(2).unwrap().breadcrumb_for_quest_id, 3);
        assert_eq!(store.get_quest_template(3).unwrap().breadcrumb_for_quest_id, 0);

        assert!(store.get_quest_template(1).unwrap().dependent_breadcrumb_quests.is_empty());
        assert_eq!(store.get_quest_template(2).unwrap().dependent_breadcrumb_quests, vec![1]);
        assert_eq!(store.get_quest_template(3).unwrap().dependent_breadcrumb_quests, vec![1, 2]);
    }

    #[test]
    fn test_breadcrumb_chain_into_broken_cycle() {
        // 4 -> 1 -> 2 -> 1, walked in id order so 1 breaks the loop first
        let load = load(vec![quest(1, 0, 0, 2, 0), quest(2, 0, 0, 1, 0), quest(4, 0, 0, 1, 0)]);
        let store = &load.store;

        assert_eq!(store.get_quest_template(1).unwrap().breadcrumb_for_quest_id, 2);
        assert_eq!(store.get_quest_template(2).unwrap().breadcrumb_for_quest_id, 0);
        assert_eq!(store.get_quest_template(4).unwrap().breadcrumb_for_quest_id, 1);

        assert_eq!(store.get_quest_template(1).unwrap().dependent_breadcrumb_quests, vec![4]);
        assert_eq!(store.get_quest_template(2).unwrap().dependent_breadcrumb_quests, vec![1, 4]);
        assert!(store.get_quest_template(4).unwrap().dependent_breadcrumb_quests.is_empty());
    }

    #[test]
    fn test_exclusive_group_members() {
        let load = load(vec![
            quest(1, 0, 0, 0, 7),
            quest(2, 0, 0, 0, 7),
            quest(3, 0, 0, 0, 7),
            quest(4, 0, 0, 0, -2),
        ]);

        let mut members = load.store.get_exclusive_quest_group_bounds(7).to_vec();
        members.sort_unstable();
        assert_eq!(members, vec![1, 2, 3]);
        assert_eq!(load.store.get_exclusive_quest_group_bounds(-2), &[4]);
        assert!(load.store.get_exclusive_quest_group_bounds(8).is_empty());
    }
}

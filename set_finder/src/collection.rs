//! Saved lists and custom set groups of the signed-in user.

use crate::error::{AppError, AppResult};
use crate::models::{CardEntry, CardList, CustomGroup};
use crate::session::SessionService;
use crate::sorting::natural_compare;
use crate::storage::ListStore;
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Every call checks the session first and fails with `NotSignedIn` when
/// nobody is signed in.
pub struct Collection<'s, S: ListStore> {
    store: S,
    session: &'s SessionService,
}

impl<'s, S: ListStore> Collection<'s, S> {
    pub fn new(store: S, session: &'s SessionService) -> Self {
        Self { store, session }
    }

    fn user(&self) -> AppResult<String> {
        self.session.require_user()
    }

    // ----- card lists -----

    pub fn save_list(&mut self, name: &str, cards: &[CardEntry]) -> AppResult<CardList> {
        let user_id = self.user()?;
        let name = non_empty(name, "List name")?;
        let now = Utc::now();
        let list = CardList {
            id: Uuid::new_v4().to_string(),
            name,
            cards: cards.to_vec(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_list(&list)?;
        Ok(list)
    }

    /// Replaces the cards of a list, optionally renaming it
    pub fn update_list(
        &mut self,
        id: &str,
        name: Option<&str>,
        cards: &[CardEntry],
    ) -> AppResult<CardList> {
        let user_id = self.user()?;
        let mut list = self.store.get_list(&user_id, id)?;
        if let Some(name) = name {
            list.name = non_empty(name, "List name")?;
        }
        list.cards = cards.to_vec();
        list.updated_at = Utc::now();
        self.store.update_list(&list)?;
        Ok(list)
    }

    pub fn delete_list(&mut self, id: &str) -> AppResult<()> {
        let user_id = self.user()?;
        self.store.delete_list(&user_id, id)
    }

    /// Most recently created first
    pub fn lists(&self) -> AppResult<Vec<CardList>> {
        let user_id = self.user()?;
        self.store.lists_for_user(&user_id)
    }

    pub fn get_list(&self, id: &str) -> AppResult<CardList> {
        let user_id = self.user()?;
        self.store.get_list(&user_id, id)
    }

    /// Looks a list up by id, then by case-insensitive name (newest wins)
    pub fn find_list(&self, id_or_name: &str) -> AppResult<CardList> {
        let key = id_or_name.trim();
        let lists = self.lists()?;
        lists
            .iter()
            .find(|l| l.id == key)
            .or_else(|| lists.iter().find(|l| l.name.eq_ignore_ascii_case(key)))
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                kind: "list",
                id: key.to_string(),
            })
    }

    // ----- custom groups -----

    /// Groups in natural, case-insensitive name order
    pub fn groups(&self) -> AppResult<Vec<CustomGroup>> {
        let user_id = self.user()?;
        let mut groups = self.store.groups_for_user(&user_id)?;
        groups.sort_by(|a, b| natural_compare(&a.name.to_lowercase(), &b.name.to_lowercase()));
        Ok(groups)
    }

    /// Looks a group up by id, then by case-insensitive name
    pub fn find_group(&self, id_or_name: &str) -> AppResult<CustomGroup> {
        let key = id_or_name.trim();
        let groups = self.groups()?;
        groups
            .iter()
            .find(|g| g.id == key)
            .or_else(|| groups.iter().find(|g| g.name.eq_ignore_ascii_case(key)))
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                kind: "group",
                id: key.to_string(),
            })
    }

    pub fn create_group(&mut self, name: &str) -> AppResult<CustomGroup> {
        let user_id = self.user()?;
        let group = CustomGroup {
            id: Uuid::new_v4().to_string(),
            name: non_empty(name, "Group name")?,
            sets: Vec::new(),
            user_id,
        };
        self.store.insert_group(&group)?;
        Ok(group)
    }

    pub fn rename_group(&mut self, id: &str, name: &str) -> AppResult<CustomGroup> {
        let mut group = self.find_group(id)?;
        group.name = non_empty(name, "Group name")?;
        self.store.update_group(&group)?;
        Ok(group)
    }

    pub fn delete_group(&mut self, id: &str) -> AppResult<()> {
        let group = self.find_group(id)?;
        self.store.delete_group(&group.user_id, &group.id)
    }

    /// Adds an upper-cased set code that must be one of `valid_codes`
    /// and not already in the group.
    pub fn add_set(
        &mut self,
        group_id: &str,
        set_code: &str,
        valid_codes: &HashSet<String>,
    ) -> AppResult<CustomGroup> {
        let mut group = self.find_group(group_id)?;
        let code = set_code.trim().to_uppercase();
        if code.is_empty() {
            return Err(AppError::Validation("Set code must not be empty".to_string()));
        }
        if !valid_codes.contains(&code) {
            return Err(AppError::Validation(format!("Unknown set code {}", code)));
        }
        if group.contains_set(&code) {
            return Err(AppError::Validation(format!(
                "{} is already in group '{}'",
                code, group.name
            )));
        }
        group.sets.push(code);
        self.store.update_group(&group)?;
        Ok(group)
    }

    pub fn remove_set(&mut self, group_id: &str, set_code: &str) -> AppResult<CustomGroup> {
        let mut group = self.find_group(group_id)?;
        let before = group.sets.len();
        group.sets.retain(|s| !s.eq_ignore_ascii_case(set_code.trim()));
        if group.sets.len() == before {
            return Err(AppError::NotFound {
                kind: "set",
                id: set_code.trim().to_uppercase(),
            });
        }
        self.store.update_group(&group)?;
        Ok(group)
    }
}

fn non_empty(value: &str, what: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", what)));
    }
    Ok(value.to_string())
}

//! Catalog filtering.
//!
//! A [`FilterState`] is a set of optional predicates. Every field that is not
//! at its "all" default must hold for an item to be kept; the result keeps
//! the catalog's original order. Filtering is pure, so views simply re-run it
//! whenever the filter state or the progress map changes.

use crate::types::{Exercise, Program, ProgressRecord, TagValue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Either no constraint, or a concrete value to match
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Build from user input, treating empty text and "all" as no constraint
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            None | Some("") => Selection::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Selection::All,
            Some(s) => Selection::Only(s.to_string()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Named facets a catalog item may expose for filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Program focus or exercise category
    Focus,
    Duration,
    Equipment,
    /// Program level or exercise difficulty
    Level,
}

/// Filter settings for one catalog view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub focus: Selection,
    pub duration: Selection,
    pub equipment: Selection,
    pub level: Selection,
    /// Keep only items with activity at or after this instant
    pub active_since: Option<DateTime<Utc>>,
    pub completed_only: bool,
}

impl FilterState {
    /// Reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when no predicate is active
    pub fn is_default(&self) -> bool {
        self.search.trim().is_empty()
            && self.focus.is_all()
            && self.duration.is_all()
            && self.equipment.is_all()
            && self.level.is_all()
            && self.active_since.is_none()
            && !self.completed_only
    }

    fn selections(&self) -> [(Facet, &Selection); 4] {
        [
            (Facet::Focus, &self.focus),
            (Facet::Duration, &self.duration),
            (Facet::Equipment, &self.equipment),
            (Facet::Level, &self.level),
        ]
    }
}

/// Something that can appear in a filtered catalog view
pub trait Filterable {
    fn item_id(&self) -> &str;

    /// Text fields searched by the free-text predicate
    fn search_fields(&self) -> Vec<&str>;

    /// Whether the item's value for `facet` matches; items without the facet
    /// never match
    fn facet_matches(&self, facet: Facet, value: &str) -> bool;
}

impl Filterable for Program {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn facet_matches(&self, facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Focus => self.focus.matches(value),
            Facet::Duration => self.duration.eq_ignore_ascii_case(value),
            Facet::Equipment => self.equipment.matches(value),
            Facet::Level => self.level.as_str().eq_ignore_ascii_case(value),
        }
    }
}

impl Filterable for Exercise {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.category.values());
        fields.extend(self.muscles.iter().map(String::as_str));
        fields
    }

    fn facet_matches(&self, facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Focus => self.category.matches(value),
            Facet::Duration => false,
            Facet::Equipment => self.equipment.matches(value),
            Facet::Level => self.difficulty.as_str().eq_ignore_ascii_case(value),
        }
    }
}

/// Case-insensitive substring search across an item's searchable fields
pub fn matches_search<T: Filterable + ?Sized>(item: &T, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// True if `item` satisfies every active predicate in `state`
pub fn matches<T: Filterable + ?Sized>(
    item: &T,
    state: &FilterState,
    progress: Option<&HashMap<String, ProgressRecord>>,
) -> bool {
    if !matches_search(item, &state.search) {
        return false;
    }

    for (facet, selection) in state.selections() {
        if let Selection::Only(value) = selection {
            if !item.facet_matches(facet, value) {
                return false;
            }
        }
    }

    let record = progress.and_then(|p| p.get(item.item_id()));

    if state.completed_only && !record.map(|r| r.is_completed).unwrap_or(false) {
        return false;
    }

    if let Some(cutoff) = state.active_since {
        let active = record
            .and_then(|r| r.last_activity_date)
            .map(|last| last >= cutoff)
            .unwrap_or(false);
        if !active {
            return false;
        }
    }

    true
}

/// Filter a catalog list, preserving the original order
pub fn filter_items<'a, T: Filterable>(
    items: &'a [T],
    state: &FilterState,
    progress: Option<&HashMap<String, ProgressRecord>>,
) -> Vec<&'a T> {
    let filtered: Vec<&T> = items
        .iter()
        .filter(|item| matches(*item, state, progress))
        .collect();

    tracing::debug!(
        "Filtered catalog: {} of {} items kept",
        filtered.len(),
        items.len()
    );

    filtered
}

/// Distinct facet values offered by a list, in first-seen order
///
/// Used to populate selection choices for a catalog view.
pub fn facet_choices<'a, T, F>(items: &'a [T], values: F) -> Vec<&'a str>
where
    F: Fn(&'a T) -> Vec<&'a str>,
{
    let mut choices: Vec<&str> = Vec::new();
    for item in items {
        for value in values(item) {
            if !choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
                choices.push(value);
            }
        }
    }
    choices
}

/// Tag values of a program focus field, for [`facet_choices`]
pub fn program_focus(program: &Program) -> Vec<&str> {
    program.focus.values()
}

/// Tag values of an equipment field, for [`facet_choices`]
pub fn tag_values(tags: &TagValue) -> Vec<&str> {
    tags.values()
}

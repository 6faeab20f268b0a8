//! In-memory member filters over a laid-out node set.
//!
//! # Invariants
//! - Name matching is a case-insensitive substring test on the trimmed query.
//! - Generation is the user-facing number (`depth + 1`).
//! - Birth bounds are inclusive; an unparsable birth date never matches a
//!   bound.

use crate::layout::GraphNode;
use crate::model::person::Person;
use chrono::NaiveDate;

/// Search filters; every `None` or blank field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub name: String,
    pub generation: Option<usize>,
    pub birth_from: Option<NaiveDate>,
    pub birth_to: Option<NaiveDate>,
}

impl SearchFilters {
    /// Filter by name only.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// `true` when no field restricts the result.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.generation.is_none()
            && self.birth_from.is_none()
            && self.birth_to.is_none()
    }

    /// Whether one laid-out node passes every filter.
    pub fn matches(&self, node: &GraphNode) -> bool {
        self.matches_name(&node.person)
            && self
                .generation
                .map_or(true, |generation| node.generation() == generation)
            && self.matches_birth_range(&node.person)
    }

    fn matches_name(&self, person: &Person) -> bool {
        let needle = self.name.trim();
        needle.is_empty() || person.name.to_lowercase().contains(&needle.to_lowercase())
    }

    fn matches_birth_range(&self, person: &Person) -> bool {
        if self.birth_from.is_none() && self.birth_to.is_none() {
            return true;
        }
        let Some(born) = person.birth_date.parsed() else {
            return false;
        };
        self.birth_from.map_or(true, |from| born >= from)
            && self.birth_to.map_or(true, |to| born <= to)
    }
}

/// People whose nodes match `filters`, in node order.
pub fn search<'a>(nodes: &'a [GraphNode], filters: &SearchFilters) -> Vec<&'a Person> {
    nodes
        .iter()
        .filter(|node| filters.matches(node))
        .map(|node| &node.person)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{search, SearchFilters};
    use crate::layout::GraphNode;
    use crate::model::person::{Gender, Person, PersonId};
    use chrono::NaiveDate;

    fn node(id: &str, name: &str, born: &str, depth: usize) -> GraphNode {
        GraphNode {
            id: PersonId::from(id),
            x: 0.0,
            y: 0.0,
            depth,
            person: Person::with_id(PersonId::from(id), name, Gender::Male).born(born),
        }
    }

    fn ids(people: Vec<&Person>) -> Vec<&str> {
        people.into_iter().map(|person| person.id.as_str()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn empty_filters_return_every_node_in_order() {
        let nodes = vec![node("b", "Li Er", "1930-01-01", 1), node("a", "Li Yi", "1900-01-01", 0)];
        let filters = SearchFilters::default();
        assert!(filters.is_empty());
        assert_eq!(ids(search(&nodes, &filters)), vec!["b", "a"]);
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let nodes = vec![node("a", "Wang Ming", "", 0), node("b", "Li Hua", "", 1)];
        assert_eq!(ids(search(&nodes, &SearchFilters::by_name("  ming "))), vec!["a"]);
        assert!(search(&nodes, &SearchFilters::by_name("zhao")).is_empty());
    }

    #[test]
    fn generation_is_depth_plus_one() {
        let nodes = vec![node("a", "A", "", 0), node("b", "B", "", 1), node("c", "C", "", 1)];
        let filters = SearchFilters {
            generation: Some(2),
            ..SearchFilters::default()
        };
        assert_eq!(ids(search(&nodes, &filters)), vec!["b", "c"]);
    }

    #[test]
    fn birth_range_is_inclusive_and_skips_unparsable_dates() {
        let nodes = vec![
            node("a", "A", "1930-01-01", 0),
            node("b", "B", "1960-06-15", 1),
            node("c", "C", "unknown", 1),
            node("d", "D", "1990-12-31", 2),
        ];
        let filters = SearchFilters {
            birth_from: date(1930, 1, 1),
            birth_to: date(1960, 6, 15),
            ..SearchFilters::default()
        };
        assert_eq!(ids(search(&nodes, &filters)), vec!["a", "b"]);

        let open_ended = SearchFilters {
            birth_from: date(1950, 1, 1),
            ..SearchFilters::default()
        };
        assert_eq!(ids(search(&nodes, &open_ended)), vec!["b", "d"]);
    }
}

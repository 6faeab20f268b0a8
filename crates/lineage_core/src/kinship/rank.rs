use crate::model::person::Person;
use std::cmp::Ordering;

/// 1-based position of `person` among siblings sharing its parent and gender.
///
/// Siblings are ordered by birth date (unparsable dates first), ties broken by
/// id so the order is total. A person without a parent ranks first.
pub fn sibling_rank(person: &Person, active: &[Person]) -> usize {
    let Some(parent_id) = person.parent_id.as_ref() else {
        return 1;
    };

    let older = active
        .iter()
        .filter(|other| other.id != person.id)
        .filter(|other| other.parent_id.as_ref() == Some(parent_id))
        .filter(|other| other.gender == person.gender)
        .filter(|other| other.cmp_birth(person) == Ordering::Less)
        .count();
    older + 1
}

#[cfg(test)]
mod tests {
    use super::sibling_rank;
    use crate::model::person::{Gender, Person, PersonId};

    fn child(id: &str, gender: Gender, born: &str) -> Person {
        Person::with_id(PersonId::from(id), id, gender)
            .born(born)
            .child_of("root")
    }

    #[test]
    fn ranks_form_a_permutation_ordered_by_birth() {
        let people = vec![
            child("c", Gender::Male, "1935-01-01"),
            child("a", Gender::Male, "1930-01-01"),
            child("b", Gender::Male, "1932-01-01"),
        ];
        let ranks: Vec<usize> = people.iter().map(|p| sibling_rank(p, &people)).collect();
        assert_eq!(ranks, [3, 1, 2]);
    }

    #[test]
    fn ranks_ignore_other_gender() {
        let people = vec![
            child("daughter", Gender::Female, "1920-01-01"),
            child("son", Gender::Male, "1930-01-01"),
        ];
        assert_eq!(sibling_rank(&people[1], &people), 1);
        assert_eq!(sibling_rank(&people[0], &people), 1);
    }

    #[test]
    fn equal_birth_dates_break_ties_by_id() {
        let people = vec![
            child("y", Gender::Female, "1950-05-05"),
            child("x", Gender::Female, "1950-05-05"),
        ];
        assert_eq!(sibling_rank(&people[1], &people), 1);
        assert_eq!(sibling_rank(&people[0], &people), 2);
    }

    #[test]
    fn root_person_ranks_first() {
        let root = Person::with_id(PersonId::from("root"), "Root", Gender::Male);
        assert_eq!(sibling_rank(&root, std::slice::from_ref(&root)), 1);
    }
}

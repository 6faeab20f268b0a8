use super::ancestry::find_common_ancestor;
use super::rank::sibling_rank;
use super::PeopleIndex;
use crate::model::person::{Gender, Person, PersonId};
use std::cmp::Ordering;

/// Structured kinship of a target person relative to a center person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kinship {
    /// Target and center are the same person.
    SelfPerson,
    /// Target is a direct ancestor `up` generations above the center.
    Ancestor { up: usize },
    /// Target is a child of the center.
    Child { gender: Gender, rank: usize },
    /// Target is a grandchild of the center.
    Grandchild { gender: Gender },
    /// Target is a direct descendant three or more generations below.
    Descendant { down: usize },
    /// Target shares the center's parent.
    Sibling {
        gender: Gender,
        rank: usize,
        elder: bool,
    },
    /// Target is a sibling of the center's parent.
    ParentSibling {
        gender: Gender,
        rank: usize,
        elder_than_father: bool,
    },
    /// Target is a child of the center's sibling.
    SiblingChild { gender: Gender },
    /// Target shares the center's grandparent.
    Cousin { gender: Gender, elder: bool },
    /// Related through a common ancestor, but outside the named terms.
    Extended,
}

/// Term set used to render a [`Kinship`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vocabulary {
    /// Traditional genealogy terms (本尊, 父亲, 长子, 大兄, 堂弟 ...).
    #[default]
    Chinese,
    /// Descriptive English terms.
    English,
}

impl Kinship {
    /// Renders the kinship with the given vocabulary.
    pub fn render(&self, vocabulary: Vocabulary) -> String {
        match vocabulary {
            Vocabulary::Chinese => self.render_chinese(),
            Vocabulary::English => self.render_english(),
        }
    }

    fn render_chinese(&self) -> String {
        match *self {
            Self::SelfPerson => "本尊".to_string(),
            Self::Ancestor { up } => match up {
                1 => "父亲".to_string(),
                2 => "祖父".to_string(),
                3 => "曾祖".to_string(),
                4 => "高祖".to_string(),
                _ => format!("{up}世祖"),
            },
            Self::Child { gender, rank } => {
                let prefix = if rank == 1 {
                    "长".to_string()
                } else {
                    chinese_numeral(rank)
                };
                let noun = if gender == Gender::Female { "女" } else { "子" };
                format!("{prefix}{noun}")
            }
            Self::Grandchild { gender } => {
                if gender == Gender::Female {
                    "孙女".to_string()
                } else {
                    "孙子".to_string()
                }
            }
            Self::Descendant { down } => format!("{down}世孙"),
            Self::Sibling {
                gender,
                rank,
                elder,
            } => {
                let noun = match (gender == Gender::Male, elder) {
                    (true, true) => "兄",
                    (true, false) => "弟",
                    (false, true) => "姐",
                    (false, false) => "妹",
                };
                format!("{}{noun}", chinese_numeral(rank))
            }
            Self::ParentSibling {
                gender,
                rank,
                elder_than_father,
            } => {
                let noun = match (gender == Gender::Male, elder_than_father) {
                    (true, true) => "伯",
                    (true, false) => "叔",
                    (false, _) => "姑",
                };
                format!("{}{noun}", chinese_numeral(rank))
            }
            Self::SiblingChild { gender } => {
                if gender == Gender::Male {
                    "侄子".to_string()
                } else {
                    "侄女".to_string()
                }
            }
            Self::Cousin { gender, elder } => {
                let noun = match (gender == Gender::Male, elder) {
                    (true, true) => "兄",
                    (true, false) => "弟",
                    (false, true) => "姐",
                    (false, false) => "妹",
                };
                format!("堂{noun}")
            }
            Self::Extended => "族亲".to_string(),
        }
    }

    fn render_english(&self) -> String {
        match *self {
            Self::SelfPerson => "self".to_string(),
            Self::Ancestor { up } => match up {
                1 => "father".to_string(),
                2 => "grandfather".to_string(),
                3 => "great-grandfather".to_string(),
                4 => "great-great-grandfather".to_string(),
                _ => format!("{up}-generations-removed ancestor"),
            },
            Self::Child { gender, rank } => {
                let noun = if gender == Gender::Female {
                    "daughter"
                } else {
                    "son"
                };
                format!("{} {noun}", english_ordinal(rank))
            }
            Self::Grandchild { gender } => {
                if gender == Gender::Female {
                    "granddaughter".to_string()
                } else {
                    "grandson".to_string()
                }
            }
            Self::Descendant { down } => format!("{down}-generations-removed descendant"),
            Self::Sibling {
                gender,
                rank,
                elder,
            } => {
                let age = if elder { "elder" } else { "younger" };
                let noun = if gender == Gender::Male {
                    "brother"
                } else {
                    "sister"
                };
                format!("{} {age} {noun}", english_ordinal(rank))
            }
            Self::ParentSibling {
                gender,
                rank,
                elder_than_father,
            } => {
                let noun = match (gender == Gender::Male, elder_than_father) {
                    (true, true) => "elder-uncle",
                    (true, false) => "uncle",
                    (false, _) => "paternal-aunt",
                };
                format!("{} {noun}", english_ordinal(rank))
            }
            Self::SiblingChild { gender } => {
                if gender == Gender::Male {
                    "nephew".to_string()
                } else {
                    "niece".to_string()
                }
            }
            Self::Cousin { gender, elder } => {
                let age = if elder { "elder" } else { "younger" };
                let noun = if gender == Gender::Male {
                    "cousin-brother"
                } else {
                    "cousin-sister"
                };
                format!("{age} {noun}")
            }
            Self::Extended => "extended relative".to_string(),
        }
    }
}

/// Classifies how `target` relates to `center` within `active`.
///
/// Returns `None` when the two people share no ancestor in the active set.
pub fn relationship(target: &Person, center: &Person, active: &[Person]) -> Option<Kinship> {
    if target.id == center.id {
        return Some(Kinship::SelfPerson);
    }

    let index = PeopleIndex::new(active);
    let lca = find_common_ancestor(target, center, &index)?;
    let people = index.people();

    let kinship = match (lca.up, lca.down) {
        (up, 0) => Kinship::Ancestor { up },
        (0, 1) => Kinship::Child {
            gender: target.gender,
            rank: sibling_rank(target, people),
        },
        (0, 2) => Kinship::Grandchild {
            gender: target.gender,
        },
        (0, down) => Kinship::Descendant { down },
        (1, 1) => Kinship::Sibling {
            gender: target.gender,
            rank: sibling_rank(target, people),
            elder: is_elder(target, center),
        },
        (2, 1) => {
            let father = center.parent_id.as_ref().and_then(|id| index.get(id));
            Kinship::ParentSibling {
                gender: target.gender,
                rank: sibling_rank(target, people),
                elder_than_father: father.is_some_and(|father| is_elder(target, father)),
            }
        }
        (1, 2) => Kinship::SiblingChild {
            gender: target.gender,
        },
        (2, 2) => Kinship::Cousin {
            gender: target.gender,
            elder: is_elder(target, center),
        },
        _ => Kinship::Extended,
    };
    Some(kinship)
}

/// Kinship term of `target` as seen from `center`, in the default vocabulary.
pub fn relationship_label(target: &Person, center: &Person, active: &[Person]) -> Option<String> {
    relationship_label_with(target, center, active, Vocabulary::default())
}

/// Kinship term of `target` as seen from `center`, rendered in `vocabulary`.
///
/// Returns `None` when the two people share no ancestor in `active`.
pub fn relationship_label_with(
    target: &Person,
    center: &Person,
    active: &[Person],
    vocabulary: Vocabulary,
) -> Option<String> {
    relationship(target, center, active).map(|kinship| kinship.render(vocabulary))
}

/// Id-based query entry point for presentation code.
///
/// Returns `None` when either id is not in the active set or the two people
/// are unrelated.
pub fn label_by_id(
    target_id: &PersonId,
    center_id: &PersonId,
    active: &[Person],
    vocabulary: Vocabulary,
) -> Option<String> {
    let target = active.iter().find(|person| &person.id == target_id)?;
    let center = active.iter().find(|person| &person.id == center_id)?;
    relationship_label_with(target, center, active, vocabulary)
}

/// Same order as sibling ranks, so elder/younger never contradicts the rank.
fn is_elder(target: &Person, other: &Person) -> bool {
    target.cmp_birth(other) == Ordering::Less
}

fn chinese_numeral(value: usize) -> String {
    const DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    match value {
        1 => "大".to_string(),
        0..=9 => DIGITS[value].to_string(),
        _ => value.to_string(),
    }
}

fn english_ordinal(value: usize) -> String {
    const WORDS: [&str; 10] = [
        "", "eldest", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
    ];
    if (1..=9).contains(&value) {
        return WORDS[value].to_string();
    }
    let suffix = match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::{chinese_numeral, english_ordinal, Kinship, Vocabulary};
    use crate::model::person::Gender;

    #[test]
    fn chinese_numerals_use_da_for_first_and_digits_past_nine() {
        assert_eq!(chinese_numeral(1), "大");
        assert_eq!(chinese_numeral(3), "三");
        assert_eq!(chinese_numeral(12), "12");
    }

    #[test]
    fn english_ordinals() {
        assert_eq!(english_ordinal(1), "eldest");
        assert_eq!(english_ordinal(2), "second");
        assert_eq!(english_ordinal(11), "11th");
        assert_eq!(english_ordinal(22), "22nd");
    }

    #[test]
    fn eldest_child_uses_eldest_marker_not_numeral() {
        let eldest = Kinship::Child {
            gender: Gender::Female,
            rank: 1,
        };
        let second = Kinship::Child {
            gender: Gender::Male,
            rank: 2,
        };
        assert_eq!(eldest.render(Vocabulary::Chinese), "长女");
        assert_eq!(second.render(Vocabulary::Chinese), "二子");
        assert_eq!(eldest.render(Vocabulary::English), "eldest daughter");
    }

    #[test]
    fn distant_generations_fall_back_to_counted_terms() {
        assert_eq!(
            Kinship::Ancestor { up: 6 }.render(Vocabulary::Chinese),
            "6世祖"
        );
        assert_eq!(
            Kinship::Descendant { down: 3 }.render(Vocabulary::English),
            "3-generations-removed descendant"
        );
    }
}

use lineage_core::db::open_db_in_memory;
use lineage_core::{
    FamilyService, FamilyServiceError, Gender, Person, PersonId, PersonRepository,
    SqlitePersonRepository,
};
use rusqlite::Connection;

fn person(id: &str, born: &str, parent: Option<&str>) -> Person {
    let person = Person::with_id(PersonId::from(id), id, Gender::Male).born(born);
    match parent {
        Some(parent) => person.child_of(parent),
        None => person,
    }
}

fn seeded(conn: &Connection) -> FamilyService<SqlitePersonRepository<'_>> {
    let repo = SqlitePersonRepository::new(conn);
    for member in [
        person("root", "1900-01-01", None),
        person("son1", "1930-01-01", Some("root")),
        person("son2", "1932-01-01", Some("root")),
        person("gson1", "1960-01-01", Some("son1")),
        person("ggson1", "1990-01-01", Some("gson1")),
    ] {
        repo.create_person(&member).unwrap();
    }
    FamilyService::new(repo)
}

fn active_ids(service: &FamilyService<SqlitePersonRepository<'_>>) -> Vec<String> {
    service
        .active_people()
        .unwrap()
        .into_iter()
        .map(|person| person.id.as_str().to_string())
        .collect()
}

#[test]
fn create_root_founds_highlighted_male_ancestor() {
    let conn = open_db_in_memory().unwrap();
    let service = FamilyService::new(SqlitePersonRepository::new(&conn));

    let root = service.create_root(" 李 ").unwrap();
    assert_eq!(root.name, "李氏始祖");
    assert_eq!(root.gender, Gender::Male);
    assert_eq!(root.birth_date.as_str(), "1000-01-01");
    assert!(root.is_highlight);
    assert!(root.parent_id.is_none());
    assert_eq!(service.active_people().unwrap(), vec![root]);
}

#[test]
fn create_root_rejects_blank_surname() {
    let conn = open_db_in_memory().unwrap();
    let service = FamilyService::new(SqlitePersonRepository::new(&conn));
    assert!(matches!(
        service.create_root("   "),
        Err(FamilyServiceError::InvalidSurname)
    ));
}

#[test]
fn add_child_inherits_parent_address() {
    let conn = open_db_in_memory().unwrap();
    let service = FamilyService::new(SqlitePersonRepository::new(&conn));
    let root = service.create_root("王").unwrap();

    let child = service.add_child(&root.id).unwrap();
    assert_eq!(child.parent_id.as_ref(), Some(&root.id));
    assert_eq!(child.address, root.address);
    assert_eq!(child.gender, Gender::Male);
    assert_eq!(service.active_people().unwrap().len(), 2);

    let missing = service.add_child(&PersonId::from("ghost")).unwrap_err();
    assert!(matches!(missing, FamilyServiceError::ParentNotFound(_)));
}

#[test]
fn add_parent_rewires_child_through_new_ancestor() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);
    let repo = SqlitePersonRepository::new(&conn);

    let ancestor = service.add_parent(&PersonId::from("son1")).unwrap();
    assert_eq!(ancestor.parent_id, Some(PersonId::from("root")));

    let son1 = repo
        .get_person(&PersonId::from("son1"), false)
        .unwrap()
        .unwrap();
    assert_eq!(son1.parent_id, Some(ancestor.id.clone()));
}

#[test]
fn add_parent_to_root_creates_new_root() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);

    let ancestor = service.add_parent(&PersonId::from("root")).unwrap();
    assert!(ancestor.parent_id.is_none());
}

#[test]
fn soft_delete_cascades_and_restore_is_single() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);

    let affected = service
        .soft_delete_subtree(&PersonId::from("son1"))
        .unwrap();
    let affected: Vec<&str> = affected.iter().map(|id| id.as_str()).collect();
    assert_eq!(affected, vec!["son1", "gson1", "ggson1"]);
    assert_eq!(active_ids(&service), vec!["root", "son2"]);

    let deleted: Vec<String> = service
        .deleted_people()
        .unwrap()
        .into_iter()
        .map(|person| person.id.as_str().to_string())
        .collect();
    assert_eq!(deleted, vec!["son1", "gson1", "ggson1"]);

    service.restore(&PersonId::from("son1")).unwrap();
    assert_eq!(active_ids(&service), vec!["root", "son1", "son2"]);
}

#[test]
fn soft_delete_of_inactive_person_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);
    service
        .soft_delete_subtree(&PersonId::from("gson1"))
        .unwrap();

    let err = service
        .soft_delete_subtree(&PersonId::from("gson1"))
        .unwrap_err();
    assert!(matches!(err, FamilyServiceError::MemberNotFound(_)));
}

#[test]
fn restore_unknown_person_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);
    assert!(matches!(
        service.restore(&PersonId::from("ghost")),
        Err(FamilyServiceError::MemberNotFound(_))
    ));
}

#[test]
fn update_rejects_descendant_as_parent() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);

    let looped = person("son1", "1930-01-01", Some("ggson1"));
    let err = service.update_person(&looped).unwrap_err();
    assert!(matches!(err, FamilyServiceError::CycleDetected { .. }));

    let selfish = person("son2", "1932-01-01", Some("son2"));
    let err = service.update_person(&selfish).unwrap_err();
    assert!(matches!(err, FamilyServiceError::CycleDetected { .. }));
}

#[test]
fn update_replaces_record_and_validates_references() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded(&conn);

    let mut moved = person("gson1", "1961-02-03", Some("son2"));
    moved.gender = Gender::Female;
    service.update_person(&moved).unwrap();
    let stored = service
        .active_people()
        .unwrap()
        .into_iter()
        .find(|person| person.id.as_str() == "gson1")
        .unwrap();
    assert_eq!(stored, moved);

    let orphan = person("son2", "1932-01-01", Some("ghost"));
    assert!(matches!(
        service.update_person(&orphan),
        Err(FamilyServiceError::ParentNotFound(_))
    ));
    let unknown = person("ghost", "", None);
    assert!(matches!(
        service.update_person(&unknown),
        Err(FamilyServiceError::MemberNotFound(_))
    ));
}

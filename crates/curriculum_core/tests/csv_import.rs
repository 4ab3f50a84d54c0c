use curriculum_core::db::open_db_in_memory;
use curriculum_core::tree::outline::stats;
use curriculum_core::{
    parse_curriculum_csv, parse_curriculum_csv_str, CsvImportError, CurriculumStore, Level,
    LocalCurriculumStore, NodePath, SqliteKvRepository,
};

const THREE_UNITS: &str = "\
Curriculum Name,Curriculum Description,Grade Name,Book Name,Unit Name,Unit Standard Codes,Unit Learning Objectives
Math,Core numeracy,G1,B1,Counting,K.CC.1,count to 20; count by tens
Math,,G1,B1,Adding,1.OA.1|1.OA.2,add within 10
Math,,G1,B1,Shapes,,
";

#[test]
fn rows_fold_by_name_within_parent() {
    let curricula = parse_curriculum_csv_str(THREE_UNITS).unwrap();

    assert_eq!(curricula.len(), 1);
    let math = &curricula[0];
    assert_eq!(math.description.as_deref(), Some("Core numeracy"));
    assert_eq!(math.grades.len(), 1);
    assert_eq!(math.grades[0].books.len(), 1);
    let units = &math.grades[0].books[0].units;
    let names: Vec<&str> = units.iter().map(|unit| unit.name.as_str()).collect();
    assert_eq!(names, vec!["Counting", "Adding", "Shapes"]);
    assert_eq!(units[0].learning_objectives, vec!["count to 20", "count by tens"]);
    assert_eq!(units[1].standard_codes, vec!["1.OA.1", "1.OA.2"]);
    assert!(units[2].standard_codes.is_empty());
}

#[test]
fn same_name_under_different_parents_is_not_folded() {
    let csv = "Curriculum Name,Grade Name,Book Name\nMath,G1,Workbook\nMath,G2,Workbook\n";
    let curricula = parse_curriculum_csv(csv.as_bytes()).unwrap();
    let grades = &curricula[0].grades;
    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0].books.len(), 1);
    assert_eq!(grades[1].books.len(), 1);
    assert_ne!(grades[0].books[0].id, grades[1].books[0].id);
}

#[test]
fn activity_columns_populate_leaf_nodes() {
    let csv = "Curriculum Name,Grade Name,Book Name,Unit Name,Lesson Name,Stage Name,\
               Activity Name,Activity Type,Activity Duration\n\
               Math,G1,B1,U1,L1,Play,Fold paper,Hands-on,45\n\
               Math,G1,B1,U1,L1,Play,Draw,Hands-on,two weeks\n";
    let curricula = parse_curriculum_csv_str(csv).unwrap();
    let activities = &curricula[0].grades[0].books[0].units[0].lessons[0].stages[0].activities;
    assert_eq!(activities[0].name, "Fold paper");
    assert_eq!(activities[0].activity_type, "Hands-on");
    assert_eq!(activities[0].duration.as_deref(), Some("45 Minutes"));
    assert_eq!(activities[1].name, "Draw");
    assert_eq!(activities[1].duration, None);
}

#[test]
fn unreadable_record_aborts_import() {
    let csv: &[u8] = b"Curriculum Name,Grade Name\nMath,G1\n\xff\xfe,G2\n";
    let err = parse_curriculum_csv(csv).unwrap_err();
    assert!(matches!(err, CsvImportError::Read(_)), "{err}");
}

#[test]
fn imported_curricula_land_in_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();
    let mut store = LocalCurriculumStore::new(repo);
    let curricula = parse_curriculum_csv_str(THREE_UNITS).unwrap();
    let math_id = curricula[0].id.clone();

    assert!(store.import_curricula(curricula.clone()));
    assert!(!store.import_curricula(curricula));

    let counts = stats(store.tree(), &NodePath::curriculum(math_id));
    assert_eq!(counts.count(Level::Curriculum), 1);
    assert_eq!(counts.count(Level::Grade), 1);
    assert_eq!(counts.count(Level::Book), 1);
    assert_eq!(counts.count(Level::Unit), 3);
}

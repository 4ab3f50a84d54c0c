//! CSV import of flattened curriculum rows.
//!
//! # Responsibility
//! - Map header columns (case-insensitive, any order) to hierarchy fields.
//! - Fold rows into nested curricula by name within each parent.
//!
//! # Invariants
//! - Only `Curriculum Name` is required.
//! - A row stops descending at its first blank name cell.
//! - Duration cells are stored normalized; bare numbers count as minutes and
//!   cells that do not parse are dropped.
//! - Any error aborts the whole import; no partial result is returned.

use crate::duration::{normalize_input, DurationUnit};
use crate::model::curriculum::Curriculum;
use crate::model::node::{generate_id, Level, NodeData};
use crate::tree::arena::CurriculumTree;
use crate::tree::path::NodePath;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;

const REQUIRED_COLUMN: &str = "Curriculum Name";

pub type CsvImportResult<T> = Result<T, CsvImportError>;

#[derive(Debug)]
pub enum CsvImportError {
    MissingColumn(&'static str),
    Read(csv::Error),
    /// No row produced a curriculum.
    Empty,
}

impl Display for CsvImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "missing required column `{column}`"),
            Self::Read(err) => write!(f, "cannot read CSV: {err}"),
            Self::Empty => write!(f, "CSV contains no curriculum rows"),
        }
    }
}

impl Error for CsvImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::MissingColumn(_) | Self::Empty => None,
        }
    }
}

impl From<csv::Error> for CsvImportError {
    fn from(value: csv::Error) -> Self {
        Self::Read(value)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct LevelColumns {
    name: Option<usize>,
    description: Option<usize>,
    duration: Option<usize>,
    objectives: Option<usize>,
    standard_codes: Option<usize>,
    activity_type: Option<usize>,
}

impl LevelColumns {
    fn resolve(level: Level, headers: &HashMap<String, usize>) -> Self {
        let label = level.label().to_ascii_lowercase();
        let find = |suffix: &str| headers.get(&format!("{label} {suffix}")).copied();
        Self {
            name: find("name"),
            description: find("description"),
            duration: find("duration"),
            objectives: find("learning objectives"),
            standard_codes: find("standard codes"),
            activity_type: find("type"),
        }
    }

    fn node_data(&self, record: &StringRecord, name: &str) -> NodeData {
        NodeData {
            id: generate_id(),
            name: name.to_string(),
            description: cell(record, self.description).map(str::to_string),
            duration: cell(record, self.duration).and_then(duration_cell),
            learning_objectives: split_list(cell(record, self.objectives)),
            standard_codes: split_list(cell(record, self.standard_codes)),
            activity_type: cell(record, self.activity_type).map(str::to_string),
        }
    }
}

/// Parses CSV text into nested curricula with freshly generated ids.
pub fn parse_curriculum_csv<R: Read>(input: R) -> CsvImportResult<Vec<Curriculum>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, header)| (header.trim().to_ascii_lowercase(), index))
        .collect();
    let columns: Vec<LevelColumns> = Level::ALL
        .iter()
        .map(|&level| LevelColumns::resolve(level, &headers))
        .collect();
    if columns[Level::Curriculum.depth()].name.is_none() {
        return Err(CsvImportError::MissingColumn(REQUIRED_COLUMN));
    }

    let mut tree = CurriculumTree::new();
    let mut rows = 0usize;
    for record in reader.records() {
        let record = record?;
        rows += 1;
        fold_row(&mut tree, &columns, &record, rows);
    }

    let curricula = tree.to_curricula();
    if curricula.is_empty() {
        return Err(CsvImportError::Empty);
    }
    info!(
        "event=csv_import module=import status=ok rows={rows} curricula={} nodes={}",
        curricula.len(),
        tree.len()
    );
    Ok(curricula)
}

pub fn parse_curriculum_csv_str(text: &str) -> CsvImportResult<Vec<Curriculum>> {
    parse_curriculum_csv(text.as_bytes())
}

fn fold_row(tree: &mut CurriculumTree, columns: &[LevelColumns], record: &StringRecord, row: usize) {
    let mut path = NodePath::root();
    for (&level, level_columns) in Level::ALL.iter().zip(columns) {
        let Some(name) = cell(record, level_columns.name) else {
            break;
        };
        let existing = tree.children(&path).and_then(|siblings| {
            siblings
                .iter()
                .find(|sibling| sibling.data.name == name)
                .map(|sibling| sibling.data.id.clone())
        });
        let id = match existing {
            Some(id) => {
                debug!(
                    "event=csv_fold module=import status=reused row={row} level={}",
                    level.as_str()
                );
                id
            }
            None => match tree.insert(&path, level, level_columns.node_data(record, name)) {
                Some(id) => id,
                None => break,
            },
        };
        path = path.child(level, id);
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|index| record.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn duration_cell(text: &str) -> Option<String> {
    let normalized = normalize_input(text, DurationUnit::Minutes);
    if normalized.is_none() {
        debug!("event=csv_duration module=import status=dropped");
    }
    normalized
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|text| {
            text.split([',', ';', '|'])
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{parse_curriculum_csv_str, split_list, CsvImportError};

    #[test]
    fn objective_cells_split_on_all_separators() {
        assert_eq!(
            split_list(Some("count, add; subtract | ")),
            vec!["count", "add", "subtract"]
        );
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn headers_are_case_insensitive_and_order_free() {
        let csv = "unit name,CURRICULUM NAME,grade name,Book Name,Unit Duration\n\
                   Fractions,Math,G1,B1,90 minutes\n";
        let curricula = parse_curriculum_csv_str(csv).unwrap();
        let unit = &curricula[0].grades[0].books[0].units[0];
        assert_eq!(unit.name, "Fractions");
        assert_eq!(unit.total_time.as_deref(), Some("1.5 Hours"));
    }

    #[test]
    fn row_stops_at_first_blank_name() {
        let csv = "Curriculum Name,Grade Name,Book Name\nMath,,B1\n";
        let curricula = parse_curriculum_csv_str(csv).unwrap();
        assert_eq!(curricula.len(), 1);
        assert!(curricula[0].grades.is_empty());
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = parse_curriculum_csv_str("Grade Name\nG1\n").unwrap_err();
        assert!(matches!(err, CsvImportError::MissingColumn("Curriculum Name")));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse_curriculum_csv_str("Curriculum Name,Grade Name\n").unwrap_err();
        assert!(matches!(err, CsvImportError::Empty));
    }
}

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use super::*;

fn write_sheet(dir: &Path, header: &[&str], rows: &[&[&str]]) -> PathBuf {
    let path = dir.join("input.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in (0u16..).zip(header) {
        sheet.write_string(0, col, *name).unwrap();
    }
    for (row, values) in (1u32..).zip(rows) {
        for (col, value) in (0u16..).zip(*values) {
            if !value.is_empty() {
                sheet.write_string(row, col, *value).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();
    path
}

#[test]
fn reads_required_columns_in_any_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(
        dir.path(),
        &["Доставка", "Client", "City", "Area"],
        &[
            &["да", "ТОВ Ромашка", "Вінниця", "Вінницька"],
            &["нет", "ФОП Іваненко", "Луцьк", "Волинська"],
        ],
    );

    let records = read_records(&path).unwrap();
    assert_eq!(
        records,
        vec![
            InputRecord::new("Вінницька", "Вінниця", "да"),
            InputRecord::new("Волинська", "Луцьк", "нет"),
        ]
    );
}

#[test]
fn missing_delivery_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(dir.path(), &["Area", "City"], &[&["Київська", "Буча"]]);

    let err = read_records(&path).unwrap_err();
    assert!(
        matches!(err, SheetError::MissingColumn { ref column } if column == DELIVERY_COLUMN),
        "expected MissingColumn(Доставка), got: {err:?}"
    );
}

#[test]
fn header_names_are_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(
        dir.path(),
        &[" Area", "City ", " Доставка "],
        &[&["Київська", "Буча", "да"]],
    );
    assert_eq!(read_records(&path).unwrap().len(), 1);
}

#[test]
fn fully_blank_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(
        dir.path(),
        &["Area", "City", "Доставка"],
        &[
            &["Київська", "Буча", "да"],
            &["", "", ""],
            &["Київська", "Ірпінь", ""],
        ],
    );

    let records = read_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].delivery_status, "");
}

#[test]
fn numeric_cells_render_without_trailing_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("numbers.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Area").unwrap();
    sheet.write_string(0, 1, "City").unwrap();
    sheet.write_string(0, 2, "Доставка").unwrap();
    sheet.write_number(1, 0, 12.0).unwrap();
    sheet.write_string(1, 1, "Запоріжжя").unwrap();
    sheet.write_number(1, 2, 1.5).unwrap();
    workbook.save(&path).unwrap();

    let records = read_records(&path).unwrap();
    assert_eq!(records, vec![InputRecord::new("12", "Запоріжжя", "1.5")]);
}

#[test]
fn non_spreadsheet_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "definitely not a zip archive").unwrap();

    let err = read_records(&path).unwrap_err();
    assert!(matches!(err, SheetError::Open(_)), "got: {err:?}");
}

#[test]
fn dedup_keeps_first_occurrence_order() {
    let records = vec![
        InputRecord::new("Львівська", "Львів", "да"),
        InputRecord::new("Одеська", "Одеса", "нет"),
        InputRecord::new("Львівська", "Львів", "да"),
        InputRecord::new("Львівська", "Львів", "нет"),
        InputRecord::new("Одеська", "Одеса", "нет"),
    ];

    let unique = dedup_records(records);
    assert_eq!(
        unique,
        vec![
            InputRecord::new("Львівська", "Львів", "да"),
            InputRecord::new("Одеська", "Одеса", "нет"),
            InputRecord::new("Львівська", "Львів", "нет"),
        ]
    );
}

#[test]
fn dedup_never_grows_and_leaves_no_duplicates() {
    let records: Vec<InputRecord> = (0..40)
        .map(|i| InputRecord::new(format!("A{}", i % 3), format!("C{}", i % 5), "да"))
        .collect();
    let raw_len = records.len();

    let unique = dedup_records(records);
    assert!(unique.len() <= raw_len);
    assert_eq!(unique.len(), 15);
    let set: HashSet<_> = unique.iter().collect();
    assert_eq!(set.len(), unique.len());
}

#[test]
fn dedup_of_empty_is_empty() {
    assert!(dedup_records(Vec::new()).is_empty());
}

mod common;

use common::{constant_day, date, TextSheetParser};
use demand_core::ingestion::{ingest_files, FileInput, FileStatus};
use demand_parser::ErrorKind;

#[test]
fn ingestion_parses_new_file() {
    let content = constant_day(100.0);
    let inputs = [FileInput {
        name: "rgd_150324.xlsx",
        contents: &content,
    }];

    let batch = ingest_files(&inputs, &TextSheetParser::default());

    assert_eq!(batch.batches.len(), 1);
    assert_eq!(batch.batches[0].base_date, date(2024, 3, 15));
    assert_eq!(batch.reports.len(), 1);
    assert_eq!(batch.reports[0].status, FileStatus::Parsed);
    assert_eq!(batch.reports[0].readings, 24);
    assert_eq!(batch.reports[0].hash.len(), 64);
}

#[test]
fn ingestion_marks_duplicate() {
    let content = constant_day(100.0);
    let inputs = [
        FileInput {
            name: "rgd_150324.xlsx",
            contents: &content,
        },
        FileInput {
            name: "RGD_150324.xlsx",
            contents: &content,
        },
    ];

    let batch = ingest_files(&inputs, &TextSheetParser::default());

    assert_eq!(batch.batches.len(), 1);
    assert_eq!(batch.reports[1].status, FileStatus::Duplicate);
    assert_eq!(batch.failures().count(), 0);
}

#[test]
fn identical_sheets_for_different_days_are_both_parsed() {
    let content = constant_day(100.0);
    let inputs = [
        FileInput {
            name: "rgd_150324.xlsx",
            contents: &content,
        },
        FileInput {
            name: "rgd_160324.xlsx",
            contents: &content,
        },
    ];

    let batch = ingest_files(&inputs, &TextSheetParser::default());

    assert!(batch
        .reports
        .iter()
        .all(|report| report.status == FileStatus::Parsed));
    assert_eq!(batch.reports[0].hash, batch.reports[1].hash);
    let days: Vec<_> = batch.batches.iter().map(|b| b.base_date).collect();
    assert_eq!(days, vec![date(2024, 3, 15), date(2024, 3, 16)]);
}

#[test]
fn ingestion_keeps_going_after_a_failure() {
    let good = constant_day(80.0);
    let inputs = [
        FileInput {
            name: "rgd_311324.xlsx",
            contents: b"x",
        },
        FileInput {
            name: "rgd_010424.xlsx",
            contents: &good,
        },
    ];

    let batch = ingest_files(&inputs, &TextSheetParser::default());

    let failures: Vec<_> = batch.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "rgd_311324.xlsx");
    assert_eq!(failures[0].error_kind, Some(ErrorKind::Format));
    assert_eq!(batch.batches.len(), 1);
    assert_eq!(batch.batches[0].base_date, date(2024, 4, 1));
}

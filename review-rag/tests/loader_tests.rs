//! Loading review files from a data directory.

use std::fs;

use review_rag::{ColumnMapping, ReviewLoader, ReviewRagError};

#[test]
fn loads_csv_and_json_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.csv"),
        "reviewText,rating,asin,summary\n\"Quiet, even on high.\",4,B01,Calm\nNo stars here at all,,B02,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b.JSON"),
        r#"[{"reviewText": "Lasted five years so far.", "rating": "5", "asin": 12345}]"#,
    )
    .unwrap();

    let loader = ReviewLoader::new(dir.path());

    let csv = loader.load("a.csv").unwrap();
    assert_eq!(csv.len(), 2);
    assert_eq!(csv[0].text.as_deref(), Some("Quiet, even on high."));
    assert_eq!(csv[0].rating, Some(4.0));
    assert_eq!(csv[0].summary.as_deref(), Some("Calm"));
    assert_eq!(csv[1].rating, None);
    assert_eq!(csv[1].summary, None);

    let json = loader.load("b.JSON").unwrap();
    assert_eq!(json.len(), 1);
    assert_eq!(json[0].rating, Some(5.0));
    assert_eq!(json[0].product_id, "12345");
}

#[test]
fn lists_only_supported_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["z.json", "notes.txt", "a.csv", "m.parquet"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    fs::create_dir(dir.path().join("nested.csv")).unwrap();

    let files = ReviewLoader::new(dir.path()).list_files().unwrap();
    assert_eq!(files, vec!["a.csv", "z.json"]);
}

#[test]
fn json_columns_are_the_union_across_objects() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("mixed.json"),
        r#"[{"reviewText": "Only text in this one."}, {"rating": 3, "asin": "B9"}]"#,
    )
    .unwrap();

    let records = ReviewLoader::new(dir.path()).load("mixed.json").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].text, None);
}

#[test]
fn custom_column_names_are_honoured() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("c.csv"), "body,stars,sku\nSturdy handle and good grip,5,X1\n").unwrap();

    let columns = ColumnMapping {
        text: "body".into(),
        rating: "stars".into(),
        product_id: "sku".into(),
        summary: "title".into(),
    };
    let loader = ReviewLoader::new(dir.path()).with_columns(columns);
    let records = loader.load("c.csv").unwrap();
    assert_eq!(records[0].product_id, "X1");

    let err = ReviewLoader::new(dir.path()).load("c.csv").unwrap_err();
    match err {
        ReviewRagError::MissingFields { fields } => {
            assert_eq!(fields, vec!["reviewText", "rating", "asin"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReviewLoader::new(dir.path()).load("absent.csv").unwrap_err();
    assert!(matches!(err, ReviewRagError::Io(_)));
}

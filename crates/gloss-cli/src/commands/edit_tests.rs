use gloss_lib::Edit;

use super::edit::changed_ranges;
use super::test_utils::*;

#[test]
fn reports_changed_ranges() {
    let table = table(CALC_JSON);
    let old = gloss_lib::parse(&table, "1 + 2", None).unwrap();
    let edited = old.edit(&Edit::replace("1 + 2", 4..5, "30"), "1 + 30").unwrap();

    // `1` and `+` come from the old tree; only the tail is lexed again.
    assert!(
        edited.changed_ranges.iter().all(|r| r.start >= 3),
        "{:?}",
        edited.changed_ranges
    );
    let text = changed_ranges(&edited);
    assert!(text.starts_with("changed: "), "{text}");
    assert!(text.ends_with("..6\n"), "{text}");
}

#[test]
fn empty_edit_changes_nothing() {
    let table = table(CALC_JSON);
    let old = gloss_lib::parse(&table, "1", None).unwrap();
    let edited = old.edit(&Edit::replace("1", 0..0, ""), "1").unwrap();

    assert_eq!(changed_ranges(&edited), "changed: none\n");
}

#[test]
fn inconsistent_edit_is_an_error() {
    let table = table(CALC_JSON);
    let old = gloss_lib::parse(&table, "1 + 2", None).unwrap();
    let err = old.edit(&Edit::new(4, 5, 6), "1 + 2").unwrap_err();

    let err: super::CliError = err.into();
    assert_eq!(
        err.to_string(),
        "inconsistent edit: new text is 5 bytes, edit implies 6"
    );
}

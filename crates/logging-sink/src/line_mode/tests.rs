use super::LineMode;

#[test]
fn line_mode_bool_conversions_agree() {
    assert_eq!(LineMode::from(true), LineMode::WithNewline);
    assert_eq!(LineMode::from(false), LineMode::WithoutNewline);

    let append: bool = LineMode::WithNewline.into();
    assert!(append);

    let append: bool = LineMode::WithoutNewline.into();
    assert!(!append);
}

#[test]
fn default_terminates_lines() {
    assert_eq!(LineMode::default(), LineMode::WithNewline);
}

#[test]
fn terminate_appends_single_newline() {
    let mut record = String::from("boom 7");
    LineMode::WithNewline.terminate(&mut record);
    assert_eq!(record, "boom 7\n");
}

#[test]
fn terminate_keeps_existing_newline() {
    let mut record = String::from("already\n");
    LineMode::WithNewline.terminate(&mut record);
    assert_eq!(record, "already\n");
}

#[test]
fn without_newline_leaves_record_alone() {
    let mut record = String::from("progress 50%");
    LineMode::WithoutNewline.terminate(&mut record);
    assert_eq!(record, "progress 50%");
}

#[test]
fn terminate_handles_empty_record() {
    let mut record = String::new();
    LineMode::WithNewline.terminate(&mut record);
    assert_eq!(record, "\n");
}

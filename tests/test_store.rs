mod common;
use common::{gesture_labels, temp_root, write_db1_session, write_db_session};
use emgwin::{load, write_mat, MatVar};

#[test]
fn single_session_loads_with_e1_offsets() {
    let root = temp_root("store-single");
    let labels = gesture_labels(20);
    write_db1_session(&root, "DB1_s1", "s1", "E1", 3, &labels, 0.0).unwrap();

    let rec = load(&root, &["DB1".into()], &["E1".into()]).unwrap();
    assert_eq!(rec.len(), labels.len());
    assert_eq!(rec.channels(), 3);
    // E1 base is 0: labels arrive unchanged.
    assert_eq!(rec.labels[0], 0);
    assert_eq!(rec.labels[20], 1);
    assert_eq!(rec.labels[60], 2);
    assert_eq!(rec.class_count(), 3);
    // Column-major MAT data lands time-major: emg[t, c] = c + t/100.
    approx::assert_abs_diff_eq!(rec.data[[0, 2]], 2.0, epsilon = 1e-6_f32);
    approx::assert_abs_diff_eq!(rec.data[[10, 0]], 0.1, epsilon = 1e-6_f32);
}

#[test]
fn e2_labels_are_offset_but_rest_is_not() {
    let root = temp_root("store-offset");
    write_db1_session(&root, "DB1_s1", "s1", "E2", 2, &[0, 3, 3, 0], 0.0).unwrap();

    let rec = load(&root, &["DB1".into()], &["E2".into()]).unwrap();
    assert_eq!(rec.labels, vec![0, 15, 15, 0]);
    assert_eq!(rec.class_count(), 16);
}

#[test]
fn sessions_concatenate_in_sorted_subject_order() {
    let root = temp_root("store-concat");
    let labels = gesture_labels(10);
    // Written out of order; the loader sorts directory names.
    write_db1_session(&root, "DB1_s2", "s2", "E1", 2, &labels, 100.0).unwrap();
    write_db1_session(&root, "DB1_s1", "s1", "E1", 2, &labels, 0.0).unwrap();

    let rec = load(&root, &["DB1".into()], &["E1".into()]).unwrap();
    assert_eq!(rec.len(), 2 * labels.len());
    // s1's block (offset 0) comes first, s2's (offset 100) second.
    assert!(rec.data[[0, 0]] < 50.0);
    assert!(rec.data[[labels.len(), 0]] > 50.0);
}

#[test]
fn experiments_of_one_subject_stack_with_disjoint_classes() {
    let root = temp_root("store-experiments");
    write_db1_session(&root, "DB1_s1", "s1", "E1", 2, &[0, 1, 1, 0], 0.0).unwrap();
    write_db1_session(&root, "DB1_s1", "s1", "E2", 2, &[0, 1, 1, 0], 0.0).unwrap();

    let rec = load(&root, &["DB1".into()], &["E1".into(), "E2".into()]).unwrap();
    assert_eq!(rec.labels, vec![0, 1, 1, 0, 0, 13, 13, 0]);
    assert_eq!(rec.class_count(), 14);
}

#[test]
fn non_db1_databases_use_flat_session_paths() {
    let root = temp_root("store-db2");
    write_db_session(&root, "DB2", "DB2_s1", "s1", "E1", 2, &[0, 2, 2, 0], 0.0).unwrap();

    let rec = load(&root, &["DB2".into()], &["E1".into()]).unwrap();
    assert_eq!(rec.labels, vec![0, 2, 2, 0]);
}

#[test]
fn compressed_session_files_load() {
    let root = temp_root("store-compressed");
    let labels = [0u8, 1, 1, 1, 0];
    let signal = common::session_signal(5, 2, 0.0);
    let path = root.join("DB1/DB1_s1/DB1_s1/s1_A1_E1.mat");
    write_mat(
        &path,
        &[
            MatVar::f64("emg", 5, 2, &signal).compressed(),
            MatVar::u8("restimulus", 5, 1, &labels).compressed(),
        ],
    )
    .unwrap();

    let rec = load(&root, &["DB1".into()], &["E1".into()]).unwrap();
    assert_eq!(rec.labels, vec![0, 1, 1, 1, 0]);
    approx::assert_abs_diff_eq!(rec.data[[0, 1]], 1.0, epsilon = 1e-6_f32);
}

#[test]
fn missing_session_file_aborts_the_whole_load() {
    let root = temp_root("store-missing-session");
    write_db1_session(&root, "DB1_s1", "s1", "E1", 2, &[0, 1], 0.0).unwrap();
    // E2 requested but never written: the load must fail, not fall back to
    // a partial recording.
    let err = load(&root, &["DB1".into()], &["E1".into(), "E2".into()]).unwrap_err();
    assert!(err.to_string().contains("E2"), "unexpected error: {err:#}");
}

#[test]
fn malformed_subject_directory_is_fatal() {
    let root = temp_root("store-badname");
    // Directory without an _sN component.
    std::fs::create_dir_all(root.join("DB1").join("subject-one")).unwrap();
    let err = load(&root, &["DB1".into()], &["E1".into()]).unwrap_err();
    assert!(err.to_string().contains("subject"), "unexpected error: {err:#}");
}

#[test]
fn unknown_experiment_is_fatal() {
    let root = temp_root("store-badexp");
    write_db1_session(&root, "DB1_s1", "s1", "E1", 2, &[0, 1], 0.0).unwrap();
    let err = load(&root, &["DB1".into()], &["E7".into()]).unwrap_err();
    assert!(err.to_string().contains("E7"));
}

#[test]
fn session_missing_emg_variable_is_fatal() {
    let root = temp_root("store-noemg");
    let path = root.join("DB1/DB1_s1/DB1_s1/s1_A1_E1.mat");
    write_mat(&path, &[MatVar::u8("restimulus", 2, 1, &[0, 1])]).unwrap();
    let err = load(&root, &["DB1".into()], &["E1".into()]).unwrap_err();
    assert!(err.to_string().contains("emg"));
}

#[test]
fn channel_mismatch_between_sessions_is_fatal() {
    let root = temp_root("store-chmismatch");
    write_db1_session(&root, "DB1_s1", "s1", "E1", 2, &[0, 1], 0.0).unwrap();
    write_db1_session(&root, "DB1_s2", "s2", "E1", 3, &[0, 1], 0.0).unwrap();
    let err = load(&root, &["DB1".into()], &["E1".into()]).unwrap_err();
    assert!(err.to_string().contains("channel"));
}

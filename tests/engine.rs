mod common;

use common::{fixture_path, graded, sample_config, sample_engine};
use grade_rank::{
    config::{EngineConfig, FailurePolicy, ScanMode},
    engine::GradeEngine,
    error::ConfigError,
    input::{InputOptions, read_grade_records},
    records::SemesterKey,
};

#[test]
fn sample_sheet_partitions_and_dedupes() {
    let engine = sample_engine();
    assert_eq!(engine.duplicates_dropped(), 1);
    assert_eq!(
        engine.partition().keys(),
        &[SemesterKey::new(110, 1), SemesterKey::new(110, 2)]
    );
    assert_eq!(engine.partition().record_count(), 13);
    assert_eq!(
        engine.directory().student_ids(),
        &["S001", "S002", "S003", "S004"]
    );
}

#[test]
fn semester_averages_skip_ungraded_rows() {
    let engine = sample_engine();
    let averages = engine.overall_average("S001").unwrap();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0].average, 3.62);
    assert_eq!(averages[0].total_credit, 10.0);
    assert_eq!(averages[1].average, 3.7);
    assert_eq!(averages[1].total_credit, 4.0);
}

#[test]
fn students_absent_from_a_semester_get_zero() {
    let engine = sample_engine();
    let averages = engine.overall_average("S004").unwrap();
    assert_eq!(averages[0].average, 0.0);
    assert_eq!(averages[0].total_credit, 0.0);
    assert_eq!(averages[1].average, 3.7);
}

#[test]
fn core_average_excludes_labs_and_keeps_first_attempt() {
    let engine = sample_engine();

    let ann = engine.core_average("S001").unwrap();
    assert_eq!(ann.average, 3.7);
    assert!(ann.detail("General Physics Lab I").is_none());
    assert_eq!(ann.detail("General Physics I"), Some("B+ 3.3 3"));

    let ben = engine.core_average("S002").unwrap();
    assert_eq!(ben.average, 3.3);
    assert_eq!(ben.detail("Calculus I"), Some("A 4.0 4"));
    assert_eq!(ben.detail("General Chemistry I"), Some("A- 3.7 3"));
}

#[test]
fn profile_fields_resolve_from_later_semesters() {
    let engine = sample_engine();
    let cai = engine.profile("S003").unwrap();
    assert_eq!(cai.name.as_deref(), Some("Cai Lin"));
    assert_eq!(cai.department.as_deref(), Some("Mathematics"));
    assert_eq!(cai.year_level.as_deref(), Some("2"));
}

#[test]
fn ranked_table_uses_competition_ranking() {
    let engine = sample_engine();
    let ranked = engine.ranked().unwrap();
    let order: Vec<(usize, &str)> = ranked
        .rows
        .iter()
        .map(|row| (row.rank, row.item.profile.student_id.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![(1, "S003"), (2, "S001"), (2, "S004"), (4, "S002")]
    );
    assert_eq!(
        &ranked.headers[..10],
        &[
            "rank",
            "student_id",
            "student_name",
            "department",
            "year_level",
            "110_1 average",
            "110_1 credits",
            "110_2 average",
            "110_2 credits",
            "core_average",
        ]
    );
    assert_eq!(
        &ranked.headers[10..],
        &[
            "Calculus I",
            "General Physics I",
            "Calculus II",
            "General Chemistry I"
        ]
    );
}

#[test]
fn weighted_average_rounds_to_two_places() {
    let records = vec![
        graded(110, 1, "s1", "Calculus", 4.0, "A"),
        graded(110, 1, "s1", "Physics", 3.0, "B+"),
    ];
    let engine = GradeEngine::new(records, sample_config()).unwrap();
    let averages = engine.overall_average("s1").unwrap();
    // (4.0 * 4 + 3.3 * 3) / 7 = 25.9 / 7
    assert_eq!(averages[0].average, 3.7);
    assert_eq!(averages[0].total_credit, 7.0);
}

#[test]
fn unknown_letter_aborts_by_default() {
    let records = vec![
        graded(110, 1, "s1", "Calculus", 3.0, "A"),
        graded(110, 1, "s2", "Calculus", 3.0, "Z"),
    ];
    let engine = GradeEngine::new(records, sample_config()).unwrap();
    let err = engine.ranked().unwrap_err();
    assert_eq!(err.student_id(), "s2");
    assert!(err.to_string().contains("s2"));
}

#[test]
fn unknown_letter_can_skip_the_student() {
    let records = vec![
        graded(110, 1, "s1", "Calculus", 3.0, "A"),
        graded(110, 1, "s2", "Calculus", 3.0, "Z"),
    ];
    let config = EngineConfig {
        on_unknown_grade: FailurePolicy::SkipStudent,
        ..sample_config()
    };
    let engine = GradeEngine::new(records, config).unwrap();
    let summary = engine.summary().unwrap();
    assert_eq!(summary.rows.len(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].student_id, "s2");
}

#[test]
fn contiguous_scan_misses_interleaved_rows() {
    let records = vec![
        graded(110, 1, "s1", "Calculus", 3.0, "A"),
        graded(110, 1, "s2", "Calculus", 3.0, "B"),
        graded(110, 1, "s1", "English", 3.0, "C"),
    ];
    let full = GradeEngine::new(records.clone(), sample_config()).unwrap();
    assert_eq!(full.overall_average("s1").unwrap()[0].average, 3.0);

    let config = EngineConfig {
        scan_mode: ScanMode::Contiguous,
        ..sample_config()
    };
    let legacy = GradeEngine::new(records, config).unwrap();
    assert_eq!(legacy.overall_average("s1").unwrap()[0].average, 4.0);
}

#[test]
fn empty_core_fragments_are_rejected() {
    let config = EngineConfig {
        core_fragments: Vec::new(),
        ..EngineConfig::default()
    };
    let err = GradeEngine::new(Vec::new(), config).err().unwrap();
    assert_eq!(err, ConfigError::NoCoreFragments);
}

#[test]
fn legacy_registrar_export_uses_default_fragments() {
    let options = InputOptions {
        header_row: 1,
        ..InputOptions::default()
    };
    let records = read_grade_records(&fixture_path("grades_legacy.csv"), &options).unwrap();
    assert_eq!(records.len(), 7);
    assert_eq!(records[0].course_id, "M101");

    let engine = GradeEngine::new(records, EngineConfig::default()).unwrap();
    assert_eq!(engine.directory().student_ids(), &["A001", "A002"]);

    let a001 = engine.core_average("A001").unwrap();
    assert_eq!(a001.average, 3.81);
    assert!(a001.detail("普通物理學實驗(一)").is_none());

    let a002 = engine.core_average("A002").unwrap();
    assert_eq!(a002.average, 3.3);
    assert!(a002.detail("普通化學(二)").is_none());

    let ranked = engine.ranked().unwrap();
    assert_eq!(ranked.rows[0].item.profile.student_id, "A001");
    assert_eq!(ranked.rows[0].item.profile.department.as_deref(), Some("物理學系"));
}

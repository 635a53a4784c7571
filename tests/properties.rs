mod common;

use common::{graded, sample_config};
use grade_rank::{
    engine::GradeEngine,
    partition::partition,
    rank::rank_by,
    records::{GradeRecord, dedupe},
};
use proptest::prelude::*;

const LETTERS: [&str; 6] = ["A+", "A", "B", "C-", "F", ""];
const COURSES: [&str; 4] = ["Calculus I", "General Physics I", "History", "General Physics Lab"];

fn grade_row() -> impl Strategy<Value = GradeRecord> {
    (
        110..112i32,
        1..3i32,
        0..4usize,
        0..COURSES.len(),
        0..5u8,
        0..LETTERS.len(),
    )
        .prop_map(|(year, semester, student, course, credit, letter)| {
            graded(
                year,
                semester,
                &format!("s{student}"),
                COURSES[course],
                f64::from(credit),
                LETTERS[letter],
            )
        })
}

proptest! {
    #[test]
    fn dedupe_is_idempotent(rows in prop::collection::vec(grade_row(), 0..40)) {
        let once = dedupe(rows);
        let twice = dedupe(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dedupe_never_leaves_adjacent_duplicates(rows in prop::collection::vec(grade_row(), 0..40)) {
        let kept = dedupe(rows);
        for pair in kept.windows(2) {
            prop_assert!(!pair[0].same_enrolment(&pair[1]));
        }
    }

    #[test]
    fn partition_keeps_every_row(rows in prop::collection::vec(grade_row(), 0..60)) {
        let total = rows.len();
        let semesters = partition(rows);
        prop_assert_eq!(semesters.record_count(), total);
        for (key, bucket) in semesters.iter() {
            prop_assert!(bucket.iter().all(|row| row.semester_key() == *key));
        }
    }

    #[test]
    fn averages_stay_within_the_grade_scale(rows in prop::collection::vec(grade_row(), 1..60)) {
        let engine = GradeEngine::new(rows, sample_config()).unwrap();
        let ranked = engine.ranked().unwrap();
        prop_assert_eq!(ranked.len(), engine.directory().len());
        for row in &ranked.rows {
            prop_assert!((0.0..=4.3).contains(&row.item.core_average()));
            for semester in &row.item.semesters {
                prop_assert!((0.0..=4.3).contains(&semester.average));
                prop_assert!(semester.total_credit >= 0.0);
            }
        }
    }

    #[test]
    fn competition_ranks_are_consistent(scores in prop::collection::vec(0u8..=43, 0..30)) {
        let values: Vec<f64> = scores.iter().map(|s| f64::from(*s) / 10.0).collect();
        let ranked = rank_by(values, |v| *v);
        for (position, entry) in ranked.iter().enumerate() {
            let better = ranked.iter().filter(|other| other.item > entry.item).count();
            prop_assert_eq!(entry.rank, better + 1);
            prop_assert!(entry.rank <= position + 1);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].item >= pair[1].item);
        }
    }
}

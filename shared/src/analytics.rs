//! Per-organization, per-language student statistics.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::store::{row_f64, Filter, Row, Table, TableStore};
use crate::types::{AnalyticsSummary, LanguageDetail};

/// Stand-in until historical marks are recorded.
const WEEKLY_IMPROVEMENT: f64 = 1.2;
const PASS_MARK: f64 = 70.0;

async fn cohort(store: &dyn TableStore, org_id: &str, language: &str) -> Result<Vec<Row>, ApiError> {
    let filter = Filter::new().eq("org_id", org_id).eq("language", language);
    Ok(store.find(Table::Students, &filter).await?)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of `field`, counting a missing mark as 0.
fn average(students: &[Row], field: &str) -> f64 {
    let total: f64 = students.iter().map(|s| row_f64(s, field).unwrap_or(0.0)).sum();
    round1(total / students.len() as f64)
}

pub async fn student_analytics(store: &dyn TableStore, org_id: &str, language: &str) -> Result<Value, ApiError> {
    let students = cohort(store, org_id, language).await?;
    Ok(json!({ "students": students }))
}

pub fn summarize(students: &[Row]) -> AnalyticsSummary {
    if students.is_empty() {
        return AnalyticsSummary {
            avg_overall: 0.0,
            avg_fluency: 0.0,
            avg_vocab: 0.0,
            avg_sentence_mastery: 0.0,
            avg_pronunciation: 0.0,
            weekly_improvement: 0.0,
        };
    }

    AnalyticsSummary {
        avg_overall: average(students, "overall_mark"),
        avg_fluency: average(students, "fluency_mark"),
        avg_vocab: average(students, "vocab_mark"),
        avg_sentence_mastery: average(students, "sentence_mastery"),
        avg_pronunciation: average(students, "pronunciation"),
        weekly_improvement: WEEKLY_IMPROVEMENT,
    }
}

pub async fn summary(store: &dyn TableStore, org_id: &str, language: &str) -> Result<Value, ApiError> {
    let students = cohort(store, org_id, language).await?;
    Ok(json!({ "summary": summarize(&students) }))
}

/// Headcount and pass rate for one language.
///
/// Active students and tests conducted are estimates derived from the
/// headcount. Percentages use exact integer arithmetic and truncate, so
/// 29 passing out of 100 is a pass rate of 29, not the 28 a float
/// `0.29 * 100` would truncate to.
pub fn language_breakdown(language: &str, students: &[Row]) -> LanguageDetail {
    let total = students.len();
    let passing = students
        .iter()
        .filter(|s| row_f64(s, "overall_mark").unwrap_or(0.0) >= PASS_MARK)
        .count();

    LanguageDetail {
        language_name: language.to_string(),
        total_students: total,
        active_students: total * 85 / 100,
        tests_conducted: total * 4 / 10,
        pass_rate: if total == 0 { 0 } else { passing * 100 / total },
    }
}

pub async fn language_detail(store: &dyn TableStore, org_id: &str, language: &str) -> Result<LanguageDetail, ApiError> {
    let students = cohort(store, org_id, language).await?;
    Ok(language_breakdown(language, &students))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_summary_of_nobody_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.avg_overall, 0.0);
        assert_eq!(summary.weekly_improvement, 0.0);
    }

    #[test]
    fn test_summary_rounds_and_counts_missing_as_zero() {
        let students = vec![
            row(json!({"overall_mark": 80, "fluency_mark": 70.25, "pronunciation": 90})),
            row(json!({"overall_mark": 71, "fluency_mark": 60})),
            row(json!({"overall_mark": 66.5})),
        ];
        let summary = summarize(&students);

        assert_eq!(summary.avg_overall, 72.5);
        assert_eq!(summary.avg_fluency, 43.4);
        assert_eq!(summary.avg_vocab, 0.0);
        assert_eq!(summary.avg_pronunciation, 30.0);
        assert_eq!(summary.weekly_improvement, 1.2);
    }

    #[test]
    fn test_language_breakdown() {
        let students: Vec<Row> = (0..10)
            .map(|i| row(json!({"overall_mark": 60 + i * 2})))
            .chain(std::iter::once(row(json!({"name": "no marks"}))))
            .collect();
        let detail = language_breakdown("French", &students);

        assert_eq!(detail.language_name, "French");
        assert_eq!(detail.total_students, 11);
        assert_eq!(detail.active_students, 9);
        assert_eq!(detail.tests_conducted, 4);
        // 70, 72, 74, 76, 78 pass
        assert_eq!(detail.pass_rate, 45);

        assert_eq!(language_breakdown("French", &[]).pass_rate, 0);
    }

    #[tokio::test]
    async fn test_queries_are_scoped_to_org_and_language() {
        let store = MemoryStore::new();
        for (org, language, mark) in [
            ("org-1", "French", 90),
            ("org-1", "French", 50),
            ("org-1", "German", 100),
            ("org-2", "French", 100),
        ] {
            store
                .insert(
                    Table::Students,
                    row(json!({"org_id": org, "language": language, "overall_mark": mark})),
                )
                .await
                .unwrap();
        }

        let students = student_analytics(&store, "org-1", "French").await.unwrap();
        assert_eq!(students["students"].as_array().unwrap().len(), 2);

        let summary = summary(&store, "org-1", "French").await.unwrap();
        assert_eq!(summary["summary"]["avg_overall"], 70.0);

        let detail = language_detail(&store, "org-1", "French").await.unwrap();
        assert_eq!(detail.total_students, 2);
        assert_eq!(detail.pass_rate, 50);

        let empty = student_analytics(&store, "org-3", "French").await.unwrap();
        assert_eq!(empty["students"], json!([]));
    }

    #[test]
    fn test_pass_rate_is_exact() {
        let students: Vec<Row> = (0..100)
            .map(|i| {
                let mark = if i < 29 { 90 } else { 40 };
                row(json!({ "overall_mark": mark }))
            })
            .collect();
        let detail = language_breakdown("Spanish", &students);
        assert_eq!(detail.pass_rate, 29);
        assert_eq!(detail.active_students, 85);
    }
}

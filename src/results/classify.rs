use super::errors::ReportError;
use super::types::*;

/// Turns flat store rows into typed test case records.
pub struct RowClassifier;

impl RowClassifier {
    /// Classify one row by its `result_type` and copy the variant payload.
    ///
    /// Performance records start with an empty history; the builder fills it in.
    /// Whether the record fails its file is read back with
    /// [`TestCaseRecord::signals_failure`].
    pub fn classify(row: &ResultRow) -> Result<TestCaseRecord, ReportError> {
        let result_type =
            ResultType::parse(&row.result_type).ok_or_else(|| ReportError::UnknownVariant {
                result_type: row.result_type.clone(),
                case_id: row.case_id,
            })?;

        let outcome = match result_type {
            ResultType::Performance => CaseOutcome::Performance(PerformanceOutcome {
                min_fps: row.min_fps.clone(),
                avg_fps: row.avg_fps.clone(),
                mean_fps: row.mean_fps.clone(),
                max_fps: row.max_fps.clone(),
                history: Vec::new(),
            }),
            ResultType::Rendering => CaseOutcome::Rendering(RenderingOutcome {
                success: row.success.clone(),
                output_image: row.output_image.clone(),
                diff_image: row.diff_image.clone(),
                baseline_image: row.baseline_image.clone(),
            }),
            ResultType::Console => CaseOutcome::Console(Self::text_outcome(row)),
            ResultType::Custom => CaseOutcome::Custom(Self::text_outcome(row)),
            // the step never ran; any success column is meaningless here
            ResultType::Error => CaseOutcome::Error(ErrorOutcome {
                stdout: row.stdout.clone(),
                stderr: row.stderr.clone(),
            }),
        };

        Ok(TestCaseRecord {
            identity: CaseIdentity {
                name: row.case_name.clone(),
                step_name: row.step_name.clone(),
                filename: row.filename.clone(),
                case_id: row.case_id,
                step_id: row.step_id,
                server_id: row.server_id,
                server_name: row.server_name.clone(),
                time: row.timestamp,
                test_run_id: row.test_run_id,
            },
            outcome,
        })
    }

    fn text_outcome(row: &ResultRow) -> TextOutcome {
        TextOutcome {
            success: row.success.clone(),
            text_output: row.text_output.clone(),
            text_baseline: row.text_baseline.clone(),
            text_diff: row.text_diff.clone(),
        }
    }
}

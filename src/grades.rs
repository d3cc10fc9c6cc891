use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Marks thresholds in descending order. `grade_and_point_for` scans
/// top-down and takes the first row the input meets, so the table must
/// stay strictly descending.
pub const GRADE_TABLE: [(f64, &str, f64); 11] = [
    (95.0, "A+", 4.00),
    (86.0, "A", 4.00),
    (80.0, "A-", 3.70),
    (76.0, "B+", 3.30),
    (72.0, "B", 3.00),
    (68.0, "B-", 2.70),
    (64.0, "C+", 2.30),
    (60.0, "C", 2.00),
    (57.0, "C-", 1.70),
    (54.0, "D+", 1.30),
    (50.0, "D", 1.00),
];

/// Catch-all for anything below the lowest threshold (including
/// negative marks).
pub const FAIL_GRADE: (&str, f64) = ("F", 0.00);

/// Same thresholds expressed as range strings for the converter and
/// the grading-scale reference table.
pub const GRADE_RANGES: [(&str, &str); 12] = [
    ("A+", "95-100 (4.00)"),
    ("A", "86-94 (4.00)"),
    ("A-", "80-85 (3.70)"),
    ("B+", "76-79 (3.30)"),
    ("B", "72-75 (3.00)"),
    ("B-", "68-71 (2.70)"),
    ("C+", "64-67 (2.30)"),
    ("C", "60-63 (2.00)"),
    ("C-", "57-59 (1.70)"),
    ("D+", "54-56 (1.30)"),
    ("D", "50-53 (1.00)"),
    ("F", "Below 50 (0.00)"),
];

/// Total over all reals; un-clamped. NaN compares false against every
/// threshold and falls through to F.
pub fn grade_and_point_for(marks: f64) -> (&'static str, f64) {
    for (min_marks, grade, gp) in GRADE_TABLE {
        if marks >= min_marks {
            return (grade, gp);
        }
    }
    FAIL_GRADE
}

pub fn marks_range_for(grade: &str) -> Option<&'static str> {
    GRADE_RANGES
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, range)| *range)
}

pub fn remark_for(cgpa: f64) -> &'static str {
    if cgpa >= 3.5 {
        "Excellent"
    } else if cgpa >= 3.0 {
        "Very good"
    } else if cgpa >= 2.0 {
        "Keep improving"
    } else {
        "Needs more effort"
    }
}

/// Two-decimal rounding, half away from zero, matching the displayed
/// CGPA. Remark and progress arc are derived from the rounded value,
/// not the raw quotient.
pub fn round_to_2_decimals(x: f64) -> f64 {
    (100.0 * x).round() / 100.0
}

fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub id: String,
    pub subject: String,
    pub marks: String,
    pub credits: String,
    pub grade: Option<String>,
    pub grade_point: Option<f64>,
    pub updated_at: String,
}

impl SubjectRow {
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject: String::new(),
            marks: String::new(),
            credits: String::new(),
            grade: None,
            grade_point: None,
            updated_at: now_stamp(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_stamp();
    }

    fn clear_fields(&mut self) {
        self.subject.clear();
        self.marks.clear();
        self.credits.clear();
        self.grade = None;
        self.grade_point = None;
        self.touch();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowRemoval {
    /// The last row was deleted outright.
    Deleted,
    /// Only one row remained; its fields were cleared in place.
    Cleared,
}

#[derive(Debug)]
pub struct SubjectSheet {
    pub rows: Vec<SubjectRow>,
    pub scale_visible: bool,
}

impl Default for SubjectSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectSheet {
    /// A fresh sheet holds one blank row, like the empty entry form.
    pub fn new() -> Self {
        Self {
            rows: vec![SubjectRow::blank()],
            scale_visible: false,
        }
    }

    pub fn add_row(&mut self) -> &SubjectRow {
        self.rows.push(SubjectRow::blank());
        self.rows.last().expect("row just pushed")
    }

    /// Removes the last row, except that the sole remaining row is
    /// cleared in place (same id) rather than deleted.
    pub fn remove_row(&mut self) -> (RowRemoval, String) {
        if self.rows.len() > 1 {
            let row = self.rows.pop().expect("more than one row");
            (RowRemoval::Deleted, row.id)
        } else {
            let row = &mut self.rows[0];
            row.clear_fields();
            (RowRemoval::Cleared, row.id.clone())
        }
    }

    pub fn row_mut(&mut self, id: &str) -> Option<&mut SubjectRow> {
        self.rows.iter_mut().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub cgpa: String,
    pub cgpa_value: f64,
    pub weighted_grade_points: f64,
    pub total_credits: f64,
    pub progress_degrees: f64,
    pub remark: &'static str,
    pub counted_rows: usize,
    pub skipped_rows: usize,
}

/// One pass over the sheet: rows whose marks and credits both parse
/// contribute to the weighted sum and get their displayed grade/GP
/// refreshed; all other rows are skipped and have grade/GP cleared.
pub fn aggregate(rows: &mut [SubjectRow]) -> Aggregation {
    let mut weighted_grade_points = 0.0_f64;
    let mut total_credits = 0.0_f64;
    let mut counted_rows = 0_usize;
    let mut skipped_rows = 0_usize;

    for row in rows.iter_mut() {
        let marks = row.marks.trim().parse::<f64>().ok();
        let credits = row.credits.trim().parse::<f64>().ok();
        match (marks, credits) {
            (Some(m), Some(c)) => {
                let (grade, gp) = grade_and_point_for(m);
                row.grade = Some(grade.to_string());
                row.grade_point = Some(gp);
                weighted_grade_points += gp * c;
                total_credits += c;
                counted_rows += 1;
            }
            _ => {
                row.grade = None;
                row.grade_point = None;
                skipped_rows += 1;
            }
        }
    }

    let cgpa_value = if total_credits > 0.0 {
        round_to_2_decimals(weighted_grade_points / total_credits)
    } else {
        0.0
    };

    Aggregation {
        cgpa: format!("{cgpa_value:.2}"),
        cgpa_value,
        weighted_grade_points,
        total_credits,
        progress_degrees: cgpa_value / 4.0 * 360.0,
        remark: remark_for(cgpa_value),
        counted_rows,
        skipped_rows,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleEntry {
    pub grade: &'static str,
    pub min_marks: Option<f64>,
    pub range: &'static str,
    pub grade_point: f64,
}

pub fn grading_scale() -> Vec<ScaleEntry> {
    let mut entries: Vec<ScaleEntry> = GRADE_TABLE
        .iter()
        .map(|&(min_marks, grade, gp)| ScaleEntry {
            grade,
            min_marks: Some(min_marks),
            range: marks_range_for(grade).expect("every table grade has a range"),
            grade_point: gp,
        })
        .collect();
    entries.push(ScaleEntry {
        grade: FAIL_GRADE.0,
        min_marks: None,
        range: marks_range_for(FAIL_GRADE.0).expect("F has a range"),
        grade_point: FAIL_GRADE.1,
    });
    entries
}

#[derive(Debug, Default)]
pub struct ConverterState {
    pub open: bool,
    pub grade_input: String,
    pub marks_input: String,
    pub result: String,
}

impl ConverterState {
    /// Grade lookup. Populating the grade field clears the marks field;
    /// an unknown grade yields an empty result, never an error.
    pub fn convert_by_grade(&mut self, raw: &str) {
        self.grade_input = raw.trim().to_string();
        if !self.grade_input.is_empty() {
            self.marks_input.clear();
        }
        let grade = self.grade_input.to_uppercase();
        self.result = match marks_range_for(&grade) {
            Some(range) => format!("{grade}: {range}"),
            None => String::new(),
        };
    }

    /// Marks lookup, the mirror of `convert_by_grade`. Unparseable
    /// input yields an empty result.
    pub fn convert_by_marks(&mut self, raw: &str) {
        self.marks_input = raw.trim().to_string();
        if !self.marks_input.is_empty() {
            self.grade_input.clear();
        }
        self.result = match self.marks_input.parse::<f64>() {
            Ok(marks) => {
                let (grade, gp) = grade_and_point_for(marks);
                format!("{marks} marks = {grade} ({gp:.2})")
            }
            Err(_) => String::new(),
        };
    }
}

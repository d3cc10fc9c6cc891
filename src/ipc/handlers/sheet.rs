use crate::grades;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn rows_json(state: &AppState) -> serde_json::Value {
    json!(state.sheet.rows)
}

/// The display block `removeRow` resets alongside the row mutation:
/// CGPA back to "0.00", empty result line and remark, arc at rest.
fn reset_progress() -> serde_json::Value {
    json!({
        "cgpa": "0.00",
        "progressDegrees": 0.0,
        "resultText": "",
        "remark": ""
    })
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "rows": rows_json(state),
            "scaleVisible": state.sheet.scale_visible
        }),
    )
}

fn handle_add_row(state: &mut AppState, req: &Request) -> serde_json::Value {
    let row = state.sheet.add_row();
    ok(&req.id, json!({ "row": row }))
}

fn handle_remove_row(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (removal, row_id) = state.sheet.remove_row();
    ok(
        &req.id,
        json!({
            "removal": removal,
            "rowId": row_id,
            "progress": reset_progress(),
            "rows": rows_json(state)
        }),
    )
}

fn handle_update_row(state: &mut AppState, req: &Request) -> serde_json::Value {
    let row_id = match req.params.get("rowId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing rowId", None),
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing/invalid patch", None);
    };

    // Marks and credits are UI field text: accept a string or a bare
    // number, store the text, and let aggregation do the parsing.
    let mut fields: Vec<(&str, String)> = Vec::new();
    for key in ["subject", "marks", "credits"] {
        let Some(v) = patch.get(key) else {
            continue;
        };
        let text = if v.is_null() {
            String::new()
        } else if let Some(s) = v.as_str() {
            s.to_string()
        } else if v.is_number() {
            v.to_string()
        } else {
            return err(
                &req.id,
                "bad_params",
                format!("patch.{key} must be a string, number, or null"),
                None,
            );
        };
        fields.push((key, text));
    }
    if fields.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "patch must include at least one field",
            None,
        );
    }

    let Some(row) = state.sheet.row_mut(&row_id) else {
        return err(&req.id, "not_found", "row not found", None);
    };
    for (key, text) in fields {
        match key {
            "subject" => row.subject = text,
            "marks" => row.marks = text,
            "credits" => row.credits = text,
            _ => unreachable!(),
        }
    }
    row.touch();
    let row = row.clone();
    ok(&req.id, json!({ "row": row }))
}

fn handle_recalculate(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Validation gate: no name, no computation, no state change.
    let name = req
        .params
        .get("studentName")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "studentName must not be empty",
            None,
        );
    }

    let agg = grades::aggregate(&mut state.sheet.rows);
    let result_text = format!("{}, your CGPA is {}", name, agg.cgpa);
    ok(
        &req.id,
        json!({
            "studentName": name,
            "cgpa": agg.cgpa,
            "cgpaValue": agg.cgpa_value,
            "remark": agg.remark,
            "resultText": result_text,
            "progressDegrees": agg.progress_degrees,
            "weightedGradePoints": agg.weighted_grade_points,
            "totalCredits": agg.total_credits,
            "countedRows": agg.counted_rows,
            "skippedRows": agg.skipped_rows,
            "rows": rows_json(state)
        }),
    )
}

fn handle_scale_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.sheet.scale_visible = !state.sheet.scale_visible;
    ok(
        &req.id,
        json!({
            "visible": state.sheet.scale_visible,
            "scale": grades::grading_scale()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sheet.list" => Some(handle_list(state, req)),
        "sheet.addRow" => Some(handle_add_row(state, req)),
        "sheet.removeRow" => Some(handle_remove_row(state, req)),
        "sheet.updateRow" => Some(handle_update_row(state, req)),
        "sheet.recalculate" => Some(handle_recalculate(state, req)),
        "scale.toggle" => Some(handle_scale_toggle(state, req)),
        _ => None,
    }
}

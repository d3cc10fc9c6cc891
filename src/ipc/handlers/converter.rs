use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn converter_json(state: &AppState) -> serde_json::Value {
    json!({
        "open": state.converter.open,
        "gradeInput": state.converter.grade_input,
        "marksInput": state.converter.marks_input,
        "result": state.converter.result
    })
}

fn handle_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.converter.open = !state.converter.open;
    ok(&req.id, converter_json(state))
}

fn handle_by_grade(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(grade) = req.params.get("grade").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing grade", None);
    };
    state.converter.convert_by_grade(grade);
    ok(&req.id, converter_json(state))
}

fn handle_by_marks(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Field text arrives as a string; a bare number is accepted too.
    let marks = match req.params.get("marks") {
        Some(v) if v.is_string() => v.as_str().unwrap_or_default().to_string(),
        Some(v) if v.is_number() => v.to_string(),
        _ => return err(&req.id, "bad_params", "missing marks", None),
    };
    state.converter.convert_by_marks(&marks);
    ok(&req.id, converter_json(state))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "converter.toggle" => Some(handle_toggle(state, req)),
        "converter.byGrade" => Some(handle_by_grade(state, req)),
        "converter.byMarks" => Some(handle_by_marks(state, req)),
        _ => None,
    }
}

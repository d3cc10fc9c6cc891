use crate::expr;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn display_json(state: &AppState) -> serde_json::Value {
    json!({ "display": state.calculator.display() })
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, display_json(state))
}

fn handle_append(state: &mut AppState, req: &Request) -> serde_json::Value {
    let token = match req.params.get("token").and_then(|v| v.as_str()) {
        Some(s) => s,
        None => return err(&req.id, "bad_params", "missing token", None),
    };
    let mut chars = token.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return err(&req.id, "bad_params", "token must be one character", None);
    };
    if !expr::is_token_char(c) {
        return err(
            &req.id,
            "bad_params",
            format!("token '{c}' is not a calculator character"),
            None,
        );
    }

    let accepted = state.calculator.push(c);
    let mut result = display_json(state);
    result["accepted"] = json!(accepted);
    ok(&req.id, result)
}

/// Evaluation failures are computation errors, not protocol errors:
/// the reply is `ok` and the display carries the marker.
fn handle_evaluate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let _ = state.calculator.evaluate();
    ok(&req.id, display_json(state))
}

fn handle_backspace(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.calculator.backspace();
    ok(&req.id, display_json(state))
}

fn handle_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.calculator.clear();
    ok(&req.id, display_json(state))
}

/// Keyboard mapping: digits/operators/`.`/parens append, `Enter`/`=`
/// evaluate, `Backspace` deletes, `c`/`C` clears. Anything else is
/// reported unhandled so the shell lets the key through.
fn handle_key(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key = match req.params.get("key").and_then(|v| v.as_str()) {
        Some(s) => s,
        None => return err(&req.id, "bad_params", "missing key", None),
    };

    let mut handled = true;
    match key {
        "Enter" | "=" => {
            let _ = state.calculator.evaluate();
        }
        "Backspace" => state.calculator.backspace(),
        "c" | "C" => state.calculator.clear(),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if expr::is_token_char(c) => {
                    state.calculator.push(c);
                }
                _ => handled = false,
            }
        }
    }

    let mut result = display_json(state);
    result["handled"] = json!(handled);
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calculator.get" => Some(handle_get(state, req)),
        "calculator.append" => Some(handle_append(state, req)),
        "calculator.key" => Some(handle_key(state, req)),
        "calculator.evaluate" => Some(handle_evaluate(state, req)),
        "calculator.backspace" => Some(handle_backspace(state, req)),
        "calculator.clear" => Some(handle_clear(state, req)),
        _ => None,
    }
}

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn appearance_json(state: &AppState) -> serde_json::Value {
    json!({
        "theme": state.appearance.theme.as_str(),
        "accent": state.appearance.accent,
        "background": state.appearance.background,
        "animationHandle": state.appearance.animation_handle
    })
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, appearance_json(state))
}

fn handle_toggle_theme(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.appearance.theme = state.appearance.theme.toggled();
    state.appearance.restart_animation();
    ok(&req.id, appearance_json(state))
}

fn is_hex_color(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('#') && s.len() == 7 && chars.all(|c| c.is_ascii_hexdigit())
}

fn handle_set_accent(state: &mut AppState, req: &Request) -> serde_json::Value {
    let color = match req.params.get("color").and_then(|v| v.as_str()) {
        Some(s) => s.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing color", None),
    };
    if !is_hex_color(&color) {
        return err(
            &req.id,
            "bad_params",
            "color must be #rrggbb",
            Some(json!({ "color": color })),
        );
    }
    // Accent recolors in place; only theme/background changes restart
    // the animation loop.
    state.appearance.accent = color;
    ok(&req.id, appearance_json(state))
}

fn handle_set_background(state: &mut AppState, req: &Request) -> serde_json::Value {
    let style = match req.params.get("style").and_then(|v| v.as_str()) {
        Some(s) => s.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing style", None),
    };
    if style.is_empty() {
        return err(&req.id, "bad_params", "style must not be empty", None);
    }
    state.appearance.background = style;
    state.appearance.restart_animation();
    ok(&req.id, appearance_json(state))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "appearance.get" => Some(handle_get(state, req)),
        "appearance.toggleTheme" => Some(handle_toggle_theme(state, req)),
        "appearance.setAccent" => Some(handle_set_accent(state, req)),
        "appearance.setBackground" => Some(handle_set_background(state, req)),
        _ => None,
    }
}

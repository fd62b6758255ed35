use std::collections::HashSet;

use highlight_engine::{
    display, error_annotations, normalize::to_nfc, rules, sanitize_errors, HighlightEngine,
    HighlightMode,
};
use shared_types::{parse_annotations, AnnotationKind, Submission};
use wasm_bindgen::prelude::*;

// Export modules
pub mod highlight_panel;
pub mod viewport;

// Re-export commonly used items
pub use highlight_panel::HighlightPanel;
pub use viewport::{layout_change, ViewportSubscription};

fn parse_mode(mode: Option<String>) -> Result<HighlightMode, JsValue> {
    match mode.as_deref() {
        None | Some("") => Ok(HighlightMode::default()),
        Some(raw) => HighlightMode::parse(raw)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown mode: {}", raw))),
    }
}

/// Highlight `text` with a JSON annotation array.
///
/// # Arguments
/// * `text` - Essay text; NFC-normalized before slicing
/// * `annotations_json` - JSON array of `{span: {start, end}, ...}`; in
///   error mode, errors without spans are located by their `wrong` quote
/// * `mode` - "error" (default) or "uncertainty"
///
/// # Returns
/// JSON array of segments
#[wasm_bindgen(js_name = highlightJson)]
pub fn highlight_json(
    text: &str,
    annotations_json: &str,
    mode: Option<String>,
) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let mode = parse_mode(mode)?;
    let kind = match mode {
        HighlightMode::Error => AnnotationKind::Error,
        HighlightMode::Uncertainty => AnnotationKind::Uncertainty,
    };
    let value: serde_json::Value = serde_json::from_str(annotations_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse annotations: {}", e)))?;

    let text = to_nfc(text);
    let annotations = match (kind, value.as_array()) {
        (AnnotationKind::Error, Some(raw)) => error_annotations(&text, raw),
        _ => parse_annotations(&value, kind),
    };

    let engine = HighlightEngine::new();
    let segments = engine.highlight(&text, &annotations, mode);

    serde_json::to_string(&segments)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize segments: {}", e)))
}

/// Display title for a rule id, falling back to the id, the error type, then "Kural"
#[wasm_bindgen(js_name = ruleTitle)]
pub fn rule_title(rule_id: &str, error_type: Option<String>) -> String {
    rules::rule_title(rule_id, error_type.as_deref())
}

/// Filter raw model errors against the essay text.
///
/// `allowed_json` is a JSON array of rule ids; omitted means every TDK rule.
/// Returns `{errors, report}` as JSON.
#[wasm_bindgen(js_name = sanitizeJson)]
pub fn sanitize_json(
    text: &str,
    errors_json: &str,
    allowed_json: Option<String>,
) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let raw: Vec<serde_json::Value> = serde_json::from_str(errors_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse errors: {}", e)))?;
    let allowed: HashSet<String> = match allowed_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse rule ids: {}", e)))?,
        None => rules::known_rule_ids(),
    };

    let sanitized = sanitize_errors(&raw, text, &allowed);
    serde_json::to_string(&sanitized)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize result: {}", e)))
}

/// Class statistics for the dashboard charts
#[wasm_bindgen(js_name = classStatsJson)]
pub fn class_stats_json(submissions_json: &str, pass_threshold: Option<i32>) -> Result<String, JsValue> {
    let submissions: Vec<Submission> = serde_json::from_str(submissions_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse submissions: {}", e)))?;

    let engine = match pass_threshold {
        Some(threshold) => HighlightEngine::with_pass_threshold(threshold.into()),
        None => HighlightEngine::new(),
    };

    serde_json::to_string(&engine.class_stats(&submissions))
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize stats: {}", e)))
}

#[wasm_bindgen(js_name = countryFlag)]
pub fn country_flag(code: &str) -> String {
    display::country_flag(code)
}

#[wasm_bindgen(js_name = countryName)]
pub fn country_name(code: &str) -> String {
    display::country_name(code)
}

#[wasm_bindgen(js_name = reportFileName)]
pub fn report_file_name(name: &str, surname: &str) -> String {
    display::report_file_name(name, surname)
}

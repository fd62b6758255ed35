use highlight_engine::{
    activate, error_annotations, error_rows, normalize::to_nfc, Activation, ErrorRow,
    HighlightMode, MemoizedHighlighter,
};
use serde_json::Value;
use shared_types::{parse_annotations, AnalysisPayload, Annotation, AnnotationKind, Segment};
use wasm_bindgen::prelude::*;

/// Highlighted essay view with a single open detail popover.
///
/// Holds both annotation vocabularies; `mode` picks which one renders.
#[wasm_bindgen]
#[derive(Default)]
pub struct HighlightPanel {
    text: String,
    mode: HighlightMode,
    /// Errors as received; spans are resolved against `text`
    raw_errors: Vec<Value>,
    errors: Vec<Annotation>,
    uncertainty: Vec<Annotation>,
    highlighter: MemoizedHighlighter,
    active: Option<Activation>,
}

impl HighlightPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = to_nfc(text);
        self.errors = error_annotations(&self.text, &self.raw_errors);
        self.active = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_mode(&mut self, mode: HighlightMode) {
        if self.mode != mode {
            self.mode = mode;
            self.active = None;
        }
    }

    /// Errors from a JSON array, or from a whole analysis object whose three
    /// error lists are concatenated. Returns how many are placed in the
    /// current text; errors without spans are located by their quote.
    pub fn set_errors_from_value(&mut self, value: &Value) -> Result<usize, String> {
        self.raw_errors = match value {
            Value::Array(items) => items.clone(),
            Value::Object(_) => {
                let payload: AnalysisPayload =
                    serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
                payload.raw_errors()
            }
            _ => return Err("expected an array of errors or an analysis object".to_string()),
        };
        self.errors = error_annotations(&self.text, &self.raw_errors);
        self.active = None;
        Ok(self.errors.len())
    }

    pub fn set_uncertainty_from_value(&mut self, value: &Value) -> Result<usize, String> {
        if !value.is_array() {
            return Err("expected an array of uncertainty markers".to_string());
        }
        self.uncertainty = parse_annotations(value, AnnotationKind::Uncertainty);
        self.active = None;
        Ok(self.uncertainty.len())
    }

    pub fn segments(&mut self) -> &[Segment] {
        let annotations = match self.mode {
            HighlightMode::Error => &self.errors,
            HighlightMode::Uncertainty => &self.uncertainty,
        };
        self.highlighter.highlight(&self.text, annotations)
    }

    /// Open the detail for segment `index`; plain segments close it.
    pub fn activate_segment(&mut self, index: usize, x: f64, y: f64) -> Option<&Activation> {
        let annotations = match self.mode {
            HighlightMode::Error => &self.errors,
            HighlightMode::Uncertainty => &self.uncertainty,
        };
        let segments = self.highlighter.highlight(&self.text, annotations);
        self.active = activate(segments, index, x, y);
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Activation> {
        self.active.as_ref()
    }

    pub fn close_detail(&mut self) {
        self.active = None;
    }

    pub fn error_rows(&self) -> Vec<ErrorRow> {
        error_rows(&self.errors)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn parse_json(json: &str) -> Result<Value, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid JSON: {}", e)))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {}", e)))
}

// WASM bindings
#[wasm_bindgen]
impl HighlightPanel {
    #[wasm_bindgen(constructor)]
    pub fn new_wasm() -> Self {
        console_error_panic_hook::set_once();
        Self::new()
    }

    #[wasm_bindgen(js_name = setText)]
    pub fn set_text_wasm(&mut self, text: &str) {
        self.set_text(text);
    }

    /// "error" or "uncertainty"
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode_wasm(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = HighlightMode::parse(mode)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown mode: {}", mode)))?;
        self.set_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = setErrorsJson)]
    pub fn set_errors_json(&mut self, json: &str) -> Result<u32, JsValue> {
        let value = parse_json(json)?;
        self.set_errors_from_value(&value)
            .map(|n| n as u32)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = setUncertaintyJson)]
    pub fn set_uncertainty_json(&mut self, json: &str) -> Result<u32, JsValue> {
        let value = parse_json(json)?;
        self.set_uncertainty_from_value(&value)
            .map(|n| n as u32)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = getSegmentsJson)]
    pub fn get_segments_json(&mut self) -> Result<String, JsValue> {
        to_json(self.segments())
    }

    /// Detail JSON with the click coordinates, `undefined` for plain segments
    #[wasm_bindgen(js_name = activateSegment)]
    pub fn activate_segment_wasm(&mut self, index: usize, x: f64, y: f64) -> Option<String> {
        self.activate_segment(index, x, y)
            .and_then(|activation| serde_json::to_string(activation).ok())
    }

    #[wasm_bindgen(js_name = getActiveJson)]
    pub fn get_active_json(&self) -> Option<String> {
        self.active()
            .and_then(|activation| serde_json::to_string(activation).ok())
    }

    #[wasm_bindgen(js_name = closeDetail)]
    pub fn close_detail_wasm(&mut self) {
        self.close_detail();
    }

    #[wasm_bindgen(js_name = getErrorRowsJson)]
    pub fn get_error_rows_json(&self) -> Result<String, JsValue> {
        to_json(&self.error_rows())
    }

    #[wasm_bindgen(js_name = clear)]
    pub fn clear_wasm(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use highlight_engine::AnnotationDetail;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::SegmentKind;

    fn panel_with_errors() -> HighlightPanel {
        let mut panel = HighlightPanel::new();
        panel.set_text("Bende geldim, herkez gitti.");
        panel
            .set_errors_from_value(&json!({
                "student_errors": [
                    {"span": {"start": 0, "end": 5}, "wrong": "Bende", "correct": "Ben de",
                     "rule_id": "TDK_01_BAGLAC_DE", "explanation": "Bağlaç ayrı yazılır."}
                ],
                "errors": [
                    {"span": {"start": 14, "end": 20}, "wrong": "herkez", "correct": "herkes",
                     "rule_id": "TDK_24_HERKES"}
                ]
            }))
            .unwrap();
        panel
    }

    #[test]
    fn test_panel_creation() {
        let mut panel = HighlightPanel::new();
        assert!(panel.segments().is_empty());
        assert!(panel.active().is_none());
    }

    #[test]
    fn test_segments_from_analysis_object() {
        let mut panel = panel_with_errors();
        let kinds: Vec<SegmentKind> = panel.segments().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Annotated,
                SegmentKind::Plain,
                SegmentKind::Annotated,
                SegmentKind::Plain
            ]
        );
        assert_eq!(panel.error_rows().len(), 2);
    }

    #[test]
    fn test_activate_and_close_detail() {
        let mut panel = panel_with_errors();

        let activation = panel.activate_segment(2, 10.0, 20.0).unwrap();
        match &activation.detail {
            AnnotationDetail::Error { rule_title, .. } => assert_eq!(rule_title, "Herkes (s/z)"),
            other => panic!("unexpected detail: {:?}", other),
        }
        assert_eq!(panel.active().map(|a| a.segment_index), Some(2));

        // plain segment closes the popover
        assert!(panel.activate_segment(1, 0.0, 0.0).is_none());
        assert!(panel.active().is_none());

        panel.activate_segment(0, 1.0, 1.0);
        panel.close_detail();
        assert!(panel.active().is_none());
    }

    #[test]
    fn test_new_text_closes_detail() {
        let mut panel = panel_with_errors();
        panel.activate_segment(0, 1.0, 1.0);
        panel.set_text("Bende geldim.");
        assert!(panel.active().is_none());
    }

    #[test]
    fn test_uncertainty_mode() {
        let mut panel = HighlightPanel::new();
        panel.set_text("k?tap");
        panel
            .set_uncertainty_from_value(&json!([{"span": {"start": 1, "end": 2}}]))
            .unwrap();
        panel.set_mode(HighlightMode::Uncertainty);

        let texts: Vec<String> = panel.segments().iter().map(|s| s.text.clone()).collect();
        assert_eq!(texts, vec!["k", "?", "tap"]);

        let activation = panel.activate_segment(1, 0.0, 0.0).unwrap();
        assert!(matches!(
            activation.detail,
            AnnotationDetail::Uncertainty { .. }
        ));
    }

    #[test]
    fn test_rejects_non_array_uncertainty() {
        let mut panel = HighlightPanel::new();
        assert!(panel.set_uncertainty_from_value(&json!({"span": {}})).is_err());
        assert!(panel.set_errors_from_value(&json!("x")).is_err());
    }

    #[test]
    fn test_spanless_errors_follow_the_text() {
        let mut panel = HighlightPanel::new();
        let placed = panel
            .set_errors_from_value(&json!([{"wrong": "herkez", "correct": "herkes"}]))
            .unwrap();
        assert_eq!(placed, 0);

        panel.set_text("Herkez geldi.");
        let segments = panel.segments();
        assert_eq!(segments[0].text, "Herkez");
        assert_eq!(segments[0].kind, SegmentKind::Annotated);
        assert_eq!(panel.error_rows()[0].suggested, "herkes");
    }

    #[test]
    fn test_clear() {
        let mut panel = panel_with_errors();
        panel.clear();
        assert_eq!(panel.text(), "");
        assert!(panel.error_rows().is_empty());
    }

    #[test]
    fn test_wasm_methods() {
        let mut panel = HighlightPanel::new_wasm();
        panel.set_text_wasm("Herkez geldi.");
        let kept = panel
            .set_errors_json(r#"[{"span":{"start":0,"end":6},"wrong":"Herkez"},{"span":{"start":"a","end":2}}]"#)
            .unwrap();
        assert_eq!(kept, 1);

        let segments: Value = serde_json::from_str(&panel.get_segments_json().unwrap()).unwrap();
        assert_eq!(segments.as_array().unwrap().len(), 2);

        let detail = panel.activate_segment_wasm(0, 5.0, 6.0).unwrap();
        assert!(detail.contains("\"x\":5.0"));
        assert_eq!(panel.get_active_json(), Some(detail));

        panel.close_detail_wasm();
        assert!(panel.get_active_json().is_none());

        let rows: Value = serde_json::from_str(&panel.get_error_rows_json().unwrap()).unwrap();
        assert_eq!(rows[0]["suggested"], "-");
    }
}

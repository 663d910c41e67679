use serde_json::json;

use super::core::PageSession;
use crate::error::CdpError;

#[test]
fn test_call_arguments_wrap_values() {
    let args = PageSession::call_arguments(vec![json!("ul.quality-selector"), json!(3)]);
    assert_eq!(
        args,
        json!([{"value": "ul.quality-selector"}, {"value": 3}])
    );
}

#[test]
fn test_check_exception_passes_clean_result() {
    let result = json!({"result": {"type": "boolean", "value": true}});
    assert!(PageSession::check_exception(&result).is_ok());
}

#[test]
fn test_check_exception_uses_description() {
    let result = json!({
        "result": {"type": "object", "subtype": "error"},
        "exceptionDetails": {
            "exceptionId": 3,
            "text": "Uncaught",
            "lineNumber": 0,
            "columnNumber": 0,
            "exception": {"type": "object", "subtype": "error", "description": "TypeError: el.click is not a function"}
        }
    });
    let err = PageSession::check_exception(&result).unwrap_err();
    assert!(matches!(err, CdpError::JavaScript(ref m) if m.contains("el.click")));
}

#[test]
fn test_check_exception_falls_back_to_text() {
    let result = json!({"exceptionDetails": {"text": "Uncaught ReferenceError"}});
    let err = PageSession::check_exception(&result).unwrap_err();
    assert!(matches!(err, CdpError::JavaScript(ref m) if m == "Uncaught ReferenceError"));
}

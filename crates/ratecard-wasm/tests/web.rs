//! Browser-side tests for the bindings. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use ratecard_wasm::{format_currency_js, version, RateCardSession};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn object(pairs: &[(&str, JsValue)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (key, value) in pairs {
        js_sys::Reflect::set(&obj, &JsValue::from_str(key), value).unwrap();
    }
    obj.into()
}

#[wasm_bindgen_test]
fn test_version() {
    assert!(!version().is_empty());
}

#[wasm_bindgen_test]
fn test_format_currency() {
    assert_eq!(format_currency_js("1234.5").unwrap(), "$1,234.50");
}

#[wasm_bindgen_test]
fn test_session_round() {
    let mut session = RateCardSession::new();
    session.load_backup().unwrap();

    let input = object(&[
        ("role", JsValue::from_str("QA Tester")),
        ("hours", JsValue::from_f64(40.0)),
        ("rate", JsValue::from_str("120")),
        ("location", JsValue::from_str("nearshore")),
    ]);
    let id = session.add_position(input).unwrap();
    assert_eq!(id, 1);
    assert_eq!(session.mode_lock(), "rate");

    assert!(session.remove_position(id));
    assert_eq!(session.mode_lock(), "unset");
}

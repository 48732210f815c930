//! Legacy wire shape
//!
//! The original dashboard expects listings as bare arrays and everything else
//! as an object tagged with `status`:
//!
//! ```json
//! [ {...}, {...} ]
//! { "status": "success", "goals": {...}, "salaries": {...} }
//! { "status": "error", "code": 1002, "message": "Invalid credentials" }
//! ```

use serde_json::{Map, Value, json};

use super::envelope::Outcome;

pub fn to_legacy(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Ok {
            payload: Value::Array(items),
        } => Value::Array(items),
        Outcome::Ok {
            payload: Value::Object(fields),
        } => {
            let mut out = Map::with_capacity(fields.len() + 1);
            out.insert("status".into(), Value::from("success"));
            out.extend(fields);
            Value::Object(out)
        }
        Outcome::Ok { payload: Value::Null } => json!({ "status": "success" }),
        Outcome::Ok { payload } => json!({ "status": "success", "data": payload }),
        Outcome::Err { code, message } => json!({
            "status": "error",
            "code": code,
            "message": message,
        }),
    }
}

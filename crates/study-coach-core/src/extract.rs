//! Structured span extraction from generated text.
//!
//! Generators are told to answer with bare JSON but routinely wrap it in
//! prose or code fences. [`extract`] scans for the first `{...}` span that
//! balances and decodes as a JSON object, then decodes that object into a
//! [`StudyPlan`]. Schema checks are layered on separately in
//! [`validate`](crate::validate).
//!
//! # Scan order
//!
//! 1. For each `{` in the text, left to right, find its balancing `}`
//!    (string- and escape-aware). The first span that parses as a JSON
//!    object wins. A `{` inside a span that failed to parse, or after a
//!    `{` that never balances, is not a candidate: a nested cycle object
//!    is never mistaken for the plan.
//! 2. If no `{` ever balances (output cut off mid-object, or a stray `}`
//!    pattern), try the greedy span from the first `{` to the last `}`.
//! 3. No `{` at all is [`FormatError::NoObject`]; nothing decoding is
//!    [`FormatError::Malformed`].

use serde_json::Value;

use crate::error::FormatError;
use crate::models::StudyPlan;

/// Recover a [`StudyPlan`] from raw generated text.
///
/// ```rust
/// use study_coach_core::extract::extract;
///
/// let raw = "Sure! Here you go:\n{\"totalTimeMinutes\": 30, \"cycles\": []}\nGood luck!";
/// let plan = extract(raw).unwrap();
/// assert_eq!(plan.total_time_minutes, 30);
/// ```
pub fn extract(raw: &str) -> Result<StudyPlan, FormatError> {
    let mut object = find_object(raw)?;
    drop_shadowed_aliases(&mut object);
    serde_json::from_value(object).map_err(|e| FormatError::Shape {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

/// Locate and decode the first JSON object embedded in `raw`.
pub fn find_object(raw: &str) -> Result<Value, FormatError> {
    let Some(first_open) = raw.find('{') else {
        return Err(FormatError::NoObject {
            raw: raw.to_string(),
        });
    };

    let mut first_error: Option<String> = None;
    let mut any_balanced = false;
    // Candidates before this byte offset are nested in a rejected `{`.
    let mut resume_at = 0usize;

    for (start, _) in raw.match_indices('{') {
        if start < resume_at {
            continue;
        }
        let Some(end) = balanced_end(raw, start) else {
            resume_at = raw.len();
            continue;
        };
        any_balanced = true;
        match serde_json::from_str::<Value>(&raw[start..=end]) {
            Ok(value @ Value::Object(_)) => return Ok(value),
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
        resume_at = end + 1;
    }

    if !any_balanced {
        if let Some(last_close) = raw.rfind('}').filter(|&i| i > first_open) {
            match serde_json::from_str::<Value>(&raw[first_open..=last_close]) {
                Ok(value @ Value::Object(_)) => return Ok(value),
                Ok(_) => {}
                Err(e) => {
                    first_error.get_or_insert_with(|| e.to_string());
                }
            }
        }
    }

    Err(FormatError::Malformed {
        message: first_error.unwrap_or_else(|| "unbalanced braces".to_string()),
        raw: raw.to_string(),
    })
}

/// Generators sometimes emit both a canonical key and its alias
/// (`totalTimeMinutes` and `totalTime`). Keep the canonical one so the
/// decode does not fail on a duplicate field.
fn drop_shadowed_aliases(object: &mut Value) {
    const ALIASES: [(&str, &str); 1] = [("totalTimeMinutes", "totalTime")];
    const QUIZ_ALIASES: [(&str, &str); 1] = [("answerLabel", "answer")];

    fn prune(map: &mut serde_json::Map<String, Value>, aliases: &[(&str, &str)]) {
        for (canonical, alias) in aliases {
            if map.contains_key(*canonical) {
                map.remove(*alias);
            }
        }
    }

    let Value::Object(plan) = object else {
        return;
    };
    prune(plan, &ALIASES);

    let Some(Value::Array(cycles)) = plan.get_mut("cycles") else {
        return;
    };
    for cycle in cycles {
        let Some(Value::Array(quiz)) = cycle.get_mut("quiz") else {
            continue;
        };
        for item in quiz.iter_mut().filter_map(Value::as_object_mut) {
            prune(item, &QUIZ_ALIASES);
        }
    }
}

/// Byte index of the `}` that closes the `{` at `start`, if any.
///
/// Braces inside JSON string literals are ignored; `\"` does not end a
/// string.
fn balanced_end(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

//! Plan prompt construction.
//!
//! Renders the single user message sent to the generator. The prompt
//! carries everything the generator needs: the time budget (stated in the
//! header and again in the closing checks), the assembled material, the
//! exact JSON shape expected back, the arithmetic the plan must satisfy,
//! and timing heuristics. The generator does the time-budget arithmetic;
//! this module only asks for it.
//!
//! Pure: the same request and context always render the same text.

use std::fmt::Write;

use crate::models::{AssembledContext, StudyPlanRequest};

/// Budgets below this many minutes get the short-session timing guidance.
pub const SHORT_SESSION_MINUTES: u32 = 60;

/// Output shape requested from the generator. `{total}` is replaced with
/// the request's budget.
const PLAN_SCHEMA: &str = r#"{
  "totalTimeMinutes": {total},
  "pomodoroCount": <number of study cycles>,
  "cycles": [
    {
      "cycleNumber": 1,
      "studyMinutes": <minutes of focused study in this cycle>,
      "quizMinutes": <minutes for answering this cycle's quiz>,
      "focusTask": "Study topic X - focus on understanding ...",
      "objectives": ["Objective 1", "Objective 2"],
      "quiz": [
        {
          "question": "Question about this cycle's focus task?",
          "options": ["A) Option 1", "B) Option 2", "C) Option 3", "D) Option 4"],
          "answerLabel": "A"
        }
      ]
    }
  ],
  "breakMinutes": <minutes of each short break between cycles>,
  "longBreakMinutes": <minutes of the single long break>,
  "tips": ["Study tip 1", "Study tip 2"],
  "summary": "Brief summary of the study plan"
}"#;

/// Render the plan prompt for `request` over `context`.
pub fn build_prompt(request: &StudyPlanRequest, context: &AssembledContext) -> String {
    let total = request.available_time_minutes;
    let mut p = String::with_capacity(4096 + context.snippets.iter().map(String::len).sum::<usize>());

    // `write!` into a String cannot fail.
    let _ = writeln!(
        p,
        "You are a study coach. A student has exactly {total} minutes TOTAL available to study. \
         This budget covers ALL time: focused study, quiz answering, short breaks between cycles, \
         and the long break."
    );
    p.push('\n');
    let _ = writeln!(p, "Material: {}", context.material_summary);
    p.push('\n');
    p.push_str("Content preview:\n");
    p.push_str(&context.text());
    p.push_str("\n\n");

    p.push_str(
        "Create a study plan using the Pomodoro Technique. Respond with a single JSON object \
         and nothing else: begin with { and end with }. Do NOT include explanations, markdown, \
         code fences, or any text outside the JSON. Use exactly these field names and this nesting:\n\n",
    );
    p.push_str(&PLAN_SCHEMA.replace("{total}", &total.to_string()));
    p.push_str("\n\n");

    p.push_str("TIME BUDGET CONSTRAINTS:\n");
    let _ = writeln!(
        p,
        "- The sum of studyMinutes + quizMinutes over ALL cycles, plus breakMinutes multiplied by \
         (number of cycles - 1), plus longBreakMinutes, must EQUAL {total}."
    );
    p.push_str("- cycleNumber starts at 1 and increases by 1 for each cycle, with no gaps.\n");
    p.push_str("- pomodoroCount must equal the number of entries in cycles.\n");
    p.push_str(timing_guidance(total));
    p.push_str("- Choose the number of cycles so that the arithmetic works out exactly.\n\n");

    p.push_str("CONTENT RULES:\n");
    p.push_str("- Base every focusTask on the actual study material above.\n");
    p.push_str("- Make objectives specific and actionable.\n");
    p.push_str("- Give practical study tips relevant to the material.\n");
    p.push_str(
        "- Every cycle MUST include a \"quiz\" array with 2-3 multiple-choice questions that test \
         the content of that cycle's own focusTask and objectives.\n",
    );
    p.push_str(
        "- Every question has exactly 4 options labeled A), B), C), D), and answerLabel is the \
         single letter of the correct option.\n\n",
    );

    let _ = write!(
        p,
        "Before answering, verify your arithmetic: the plan must account for exactly {total} minutes."
    );

    p
}

/// Heuristic per-cycle durations, scaled to the size of the budget.
fn timing_guidance(total: u32) -> &'static str {
    if total < SHORT_SESSION_MINUTES {
        "- Timing guidance for a short session: about 10-15 minutes of study and 2-3 minutes of \
         quiz per cycle, short breaks of 3-5 minutes, and a short or zero long break.\n"
    } else {
        "- Timing guidance: about 20-25 minutes of study and 3-5 minutes of quiz per cycle, \
         5 minute short breaks between cycles, and a 15 minute long break.\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{assemble, ContextLimits};

    fn request(minutes: u32) -> StudyPlanRequest {
        StudyPlanRequest {
            owner_id: "u1".to_string(),
            available_time_minutes: minutes,
        }
    }

    fn context() -> AssembledContext {
        assemble(
            &["Mitochondria produce ATP.".to_string(), "Ribosomes build proteins.".to_string()],
            &["bio.pdf".to_string()],
            ContextLimits::default(),
        )
    }

    #[test]
    fn test_prompt_is_pure() {
        let a = build_prompt(&request(90), &context());
        let b = build_prompt(&request(90), &context());
        assert_eq!(a, b);
    }

    #[test]
    fn test_budget_stated_in_header_and_closing() {
        let p = build_prompt(&request(90), &context());
        let first_line = p.lines().next().unwrap();
        assert!(first_line.contains("exactly 90 minutes"));
        assert!(p.trim_end().ends_with("exactly 90 minutes."));
        assert!(p.contains("\"totalTimeMinutes\": 90"));
        assert!(p.contains("must EQUAL 90"));
    }

    #[test]
    fn test_context_embedded_verbatim() {
        let ctx = context();
        let p = build_prompt(&request(45), &ctx);
        assert!(p.contains(&ctx.text()));
        assert!(p.contains("Study material from bio.pdf (2 sections)"));
    }

    #[test]
    fn test_schema_enumerates_every_field() {
        let p = build_prompt(&request(45), &context());
        for field in [
            "totalTimeMinutes",
            "cycles",
            "cycleNumber",
            "studyMinutes",
            "quizMinutes",
            "focusTask",
            "objectives",
            "quiz",
            "question",
            "options",
            "answerLabel",
            "breakMinutes",
            "longBreakMinutes",
            "tips",
            "summary",
        ] {
            assert!(p.contains(&format!("\"{field}\"")), "missing {field}");
        }
        assert!(!p.contains("{total}"));
    }

    #[test]
    fn test_timing_guidance_depends_on_budget() {
        let short = build_prompt(&request(45), &context());
        let long = build_prompt(&request(120), &context());
        assert!(short.contains("short session"));
        assert!(!long.contains("short session"));
        assert!(long.contains("20-25 minutes of study"));
    }

    #[test]
    fn test_requires_quiz_per_cycle() {
        let p = build_prompt(&request(60), &context());
        assert!(p.contains("2-3 multiple-choice questions"));
        assert!(p.contains("exactly 4 options"));
    }
}

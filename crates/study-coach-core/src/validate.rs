//! Plan diagnostics.
//!
//! The generator's arithmetic and structure are advisory. [`validate`]
//! checks a decoded plan against the request and reports every problem it
//! finds as a [`PlanDiagnostic`]. Diagnostics never block delivery: a plan
//! whose breaks add up to 85 of 90 minutes is still a usable plan.

use std::fmt;

use serde::Serialize;

use crate::models::{QuizItem, StudyPlan};

/// Labels assigned to unlabeled options, by position.
const POSITIONAL_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Options every quiz item must carry.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// A non-fatal problem found in a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlanDiagnostic {
    NoCycles,
    /// `cycles[position]` should be numbered `expected`.
    CycleNumbering {
        position: usize,
        expected: u32,
        found: u32,
    },
    QuizOptionCount {
        cycle: u32,
        question: usize,
        found: usize,
    },
    QuizAnswerLabel {
        cycle: u32,
        question: usize,
        answer: String,
    },
    /// The generator echoed a total different from the one requested.
    DeclaredTotalMismatch { declared: u32, requested: u32 },
    PomodoroCountMismatch { declared: u32, cycles: usize },
    /// The time-budget arithmetic does not add up.
    PlanInconsistent { allocated: u64, total: u32 },
}

impl fmt::Display for PlanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCycles => write!(f, "plan contains no study cycles"),
            Self::CycleNumbering {
                position,
                expected,
                found,
            } => write!(
                f,
                "cycle at position {position} is numbered {found}, expected {expected}"
            ),
            Self::QuizOptionCount {
                cycle,
                question,
                found,
            } => write!(
                f,
                "cycle {cycle} question {question} has {found} options, expected {QUIZ_OPTION_COUNT}"
            ),
            Self::QuizAnswerLabel {
                cycle,
                question,
                answer,
            } => write!(
                f,
                "cycle {cycle} question {question} answer {answer:?} matches no option label"
            ),
            Self::DeclaredTotalMismatch {
                declared,
                requested,
            } => write!(
                f,
                "plan declared {declared} total minutes but {requested} were requested"
            ),
            Self::PomodoroCountMismatch { declared, cycles } => write!(
                f,
                "plan declared {declared} pomodoros but contains {cycles} cycles"
            ),
            Self::PlanInconsistent { allocated, total } => write!(
                f,
                "plan allocates {allocated} minutes but the budget is {total}"
            ),
        }
    }
}

/// Check `plan` against the requested budget.
///
/// `requested_total` is the caller's budget, not the plan's own
/// `total_time_minutes`: the arithmetic has to add up to what was asked for.
pub fn validate(plan: &StudyPlan, requested_total: u32) -> Vec<PlanDiagnostic> {
    let mut diagnostics = Vec::new();

    if plan.cycles.is_empty() {
        diagnostics.push(PlanDiagnostic::NoCycles);
    }

    for (position, cycle) in plan.cycles.iter().enumerate() {
        let expected = position as u32 + 1;
        if cycle.cycle_number != expected {
            diagnostics.push(PlanDiagnostic::CycleNumbering {
                position,
                expected,
                found: cycle.cycle_number,
            });
        }

        for (index, item) in cycle.quiz.iter().enumerate() {
            let question = index + 1;
            if item.options.len() != QUIZ_OPTION_COUNT {
                diagnostics.push(PlanDiagnostic::QuizOptionCount {
                    cycle: cycle.cycle_number,
                    question,
                    found: item.options.len(),
                });
            }
            if !answer_matches_option(item) {
                diagnostics.push(PlanDiagnostic::QuizAnswerLabel {
                    cycle: cycle.cycle_number,
                    question,
                    answer: item.answer_label.clone(),
                });
            }
        }
    }

    if plan.total_time_minutes != 0 && plan.total_time_minutes != requested_total {
        diagnostics.push(PlanDiagnostic::DeclaredTotalMismatch {
            declared: plan.total_time_minutes,
            requested: requested_total,
        });
    }

    if let Some(declared) = plan.pomodoro_count {
        if declared as usize != plan.cycles.len() {
            diagnostics.push(PlanDiagnostic::PomodoroCountMismatch {
                declared,
                cycles: plan.cycles.len(),
            });
        }
    }

    let allocated = plan.allocated_minutes();
    if allocated != u64::from(requested_total) {
        diagnostics.push(PlanDiagnostic::PlanInconsistent {
            allocated,
            total: requested_total,
        });
    }

    diagnostics
}

/// Label of an option such as `"A) Mitosis"`, `"b. Meiosis"` or `"C: ..."`.
pub fn option_label(option: &str) -> Option<char> {
    let mut chars = option.trim_start().chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    match chars.next() {
        None | Some(')' | '.' | ':') => Some(letter.to_ascii_uppercase()),
        _ => None,
    }
}

/// Whether the item's answer names one of its option labels. Unlabeled
/// options take their positional label.
pub fn answer_matches_option(item: &QuizItem) -> bool {
    let Some(answer) = option_label(&item.answer_label) else {
        return false;
    };
    item.options
        .iter()
        .enumerate()
        .filter_map(|(i, opt)| option_label(opt).or_else(|| POSITIONAL_LABELS.get(i).copied()))
        .any(|label| label == answer)
}

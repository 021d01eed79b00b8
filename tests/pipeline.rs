//! End-to-end pipeline tests: JSON store on disk, deterministic generator.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use study_coach::coach::build_coach;
use study_coach::config::Config;
use study_coach::json_store::JsonMaterialStore;
use study_coach_core::context::ContextLimits;
use study_coach_core::error::CoachError;
use study_coach_core::generation::CannedGenerator;
use study_coach_core::models::MaterialStoreState;
use study_coach_core::pipeline::StudyCoach;
use study_coach_core::request::RawPlanRequest;
use study_coach_core::store::MaterialStore;
use study_coach_core::validate::PlanDiagnostic;

/// 3 × (25 + 5) + 2 × 0 + 0 = 90.
const BALANCED_90: &str = r#"Sure! Here is your plan:
```json
{
  "totalTimeMinutes": 90,
  "pomodoroCount": 3,
  "cycles": [
    {"cycleNumber": 1, "studyMinutes": 25, "quizMinutes": 5, "focusTask": "Photosynthesis",
     "objectives": ["Light reactions"],
     "quiz": [{"question": "Where do light reactions occur?",
               "options": ["A) Stroma", "B) Thylakoid", "C) Nucleus", "D) Cytosol"],
               "answerLabel": "B"}]},
    {"cycleNumber": 2, "studyMinutes": 25, "quizMinutes": 5, "focusTask": "Calvin cycle",
     "objectives": ["Carbon fixation"], "quiz": []},
    {"cycleNumber": 3, "studyMinutes": 25, "quizMinutes": 5, "focusTask": "Review",
     "objectives": [], "quiz": []}
  ],
  "breakMinutes": 0,
  "longBreakMinutes": 0,
  "tips": ["Hydrate"],
  "summary": "Plant energy"
}
```
Good luck!"#;

/// 3 × (20 + 5) + 2 × 5 + 0 = 85, declared as 90.
const SHORT_85: &str = r#"{
  "totalTimeMinutes": 90,
  "cycles": [
    {"cycleNumber": 1, "studyMinutes": 20, "quizMinutes": 5, "focusTask": "a", "objectives": [], "quiz": []},
    {"cycleNumber": 2, "studyMinutes": 20, "quizMinutes": 5, "focusTask": "b", "objectives": [], "quiz": []},
    {"cycleNumber": 3, "studyMinutes": 20, "quizMinutes": 5, "focusTask": "c", "objectives": [], "quiz": []}
  ],
  "breakMinutes": 5,
  "longBreakMinutes": 0,
  "tips": [],
  "summary": "short"
}"#;

fn write_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("vectorstore.json");
    let store = json!({
        "vectors": [],
        "docs": {
            "u1::bio.pdf#0": {"filename": "bio.pdf", "text": "Chlorophyll absorbs light."},
            "u1::bio.pdf#1": {"filename": "bio.pdf", "text": "The Calvin cycle fixes carbon."},
            "u1::notes.md#0": {"filename": "notes.md", "text": "ATP and NADPH."},
            "u10::secret.pdf#0": {"filename": "secret.pdf", "text": "Belongs to u10."}
        }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&store).unwrap()).unwrap();
    path
}

fn coach_with(dir: &TempDir, generator: Arc<CannedGenerator>) -> StudyCoach {
    let mut config = Config::minimal();
    config.store.path = write_store(dir);
    build_coach(&config, generator)
}

/// Store wrapper that counts loads.
struct CountingStore {
    inner: JsonMaterialStore,
    loads: AtomicUsize,
}

#[async_trait]
impl MaterialStore for CountingStore {
    async fn load(&self) -> anyhow::Result<MaterialStoreState> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }
}

#[tokio::test]
async fn plan_for_owner_with_material() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(CannedGenerator::new(BALANCED_90));
    let coach = coach_with(&dir, generator.clone());

    let response = coach
        .create_plan(&RawPlanRequest::new("u1", 90))
        .await
        .unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(response.status, "success");
    assert_eq!(response.study_plan.total_time_minutes, 90);
    assert_eq!(response.study_plan.materials_used, ["bio.pdf", "notes.md"]);
    assert_eq!(response.study_plan.cycles.len(), 3);
    assert!(response.warnings.is_empty(), "{:?}", response.warnings);
}

#[tokio::test]
async fn owner_without_material_never_reaches_generator() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(CannedGenerator::new(BALANCED_90));
    let coach = coach_with(&dir, generator.clone());

    let err = coach
        .create_plan(&RawPlanRequest::new("u2", 90))
        .await
        .unwrap_err();

    assert!(matches!(err, CoachError::NoMaterialFound { .. }));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn too_short_budget_rejected_before_retrieval() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(CountingStore {
        inner: JsonMaterialStore::new(write_store(&dir)),
        loads: AtomicUsize::new(0),
    });
    let generator = Arc::new(CannedGenerator::new(BALANCED_90));
    let coach = StudyCoach::new(store.clone(), generator.clone(), ContextLimits::default());

    let err = coach
        .create_plan(&RawPlanRequest::new("u1", 5))
        .await
        .unwrap_err();

    assert!(matches!(err, CoachError::InvalidRequest(_)));
    assert_eq!(
        err.to_string(),
        "Please provide at least 10 minutes of available study time."
    );
    assert_eq!(store.loads.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn inconsistent_plan_is_delivered_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    let coach = coach_with(&dir, Arc::new(CannedGenerator::new(SHORT_85)));

    let response = coach
        .create_plan(&RawPlanRequest::new("u1", 90))
        .await
        .unwrap();

    assert_eq!(response.study_plan.total_time_minutes, 90);
    assert_eq!(
        response.warnings,
        vec![PlanDiagnostic::PlanInconsistent {
            allocated: 85,
            total: 90
        }]
    );

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["warnings"][0]["kind"], "planInconsistent");
    assert_eq!(body["warnings"][0]["allocated"], 85);
}

#[tokio::test]
async fn prefix_sharing_owners_are_isolated() {
    let dir = TempDir::new().unwrap();
    let coach = coach_with(&dir, Arc::new(CannedGenerator::new(BALANCED_90)));

    let prepared = coach.prepare(&RawPlanRequest::new("u1", 90)).await.unwrap();
    assert_eq!(prepared.context.total_chunks, 3);
    assert!(!prepared.prompt.contains("Belongs to u10."));
    assert!(!prepared.context.source_filenames.contains(&"secret.pdf".to_string()));

    let prepared = coach.prepare(&RawPlanRequest::new("u10", 90)).await.unwrap();
    assert_eq!(prepared.context.source_filenames, ["secret.pdf"]);
    assert!(!prepared.prompt.contains("Chlorophyll"));
}

#[tokio::test]
async fn repeated_runs_differ_only_in_created_at() {
    let dir = TempDir::new().unwrap();
    let coach = coach_with(&dir, Arc::new(CannedGenerator::new(BALANCED_90)));
    let request = RawPlanRequest::new("u1", 90);

    let first = coach.prepare(&request).await.unwrap();
    let second = coach.prepare(&request).await.unwrap();
    assert_eq!(first.prompt, second.prompt);

    let mut a = coach.create_plan(&request).await.unwrap();
    let mut b = coach.create_plan(&request).await.unwrap();
    assert!(a.study_plan.created_at.is_some());
    a.study_plan.created_at = None;
    b.study_plan.created_at = None;
    assert_eq!(a, b);
}

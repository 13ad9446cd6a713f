use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::get_quiz_candidates, Question},
    server::{app::AppState, errors::StoreResultExt},
    telemetry::QUIZ_QUESTIONS_CNTR,
};

use super::ApiResponse;

/// Random source shared by all quiz requests. Seed it to get repeatable picks.
#[derive(Clone)]
pub struct SharedRng(Arc<Mutex<StdRng>>);

impl SharedRng {
    pub fn from_os() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        SharedRng(Arc::new(Mutex::new(rng)))
    }

    pub fn pick(&self, candidates: &[Question]) -> Option<Question> {
        let mut rng = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        pick_question(candidates, &mut *rng)
    }
}

/// Uniform choice among `candidates`, `None` when there are none.
pub fn pick_question<R: Rng + ?Sized>(candidates: &[Question], rng: &mut R) -> Option<Question> {
    candidates.choose(rng).cloned()
}

#[derive(Debug, Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Debug, Deserialize)]
struct QuizBody {
    previous_questions: Vec<i64>,
    quiz_category: QuizCategory,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    State(rng): State<SharedRng>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<QuizResponse> {
    let Json(body) = body.or_unprocessable()?;
    // category 0 stands for "all categories"
    let category = Some(body.quiz_category.id).filter(|id| *id != 0);

    let candidates = get_quiz_candidates(&pool, category, &body.previous_questions)
        .await
        .or_unprocessable()?;
    let question = rng.pick(&candidates);
    if let Some(question) = &question {
        QUIZ_QUESTIONS_CNTR
            .with_label_values(&[question.category.to_string().as_str()])
            .inc();
    }
    tracing::debug!(
        candidates = candidates.len(),
        picked = ?question.as_ref().map(|q| q.id),
        "Next quiz question"
    );

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router() -> Router<AppState> {
    Router::new().route("/quizzes", post(next_question))
}

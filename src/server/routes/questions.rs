use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_categories_map,
            questions::{
                self, count_questions, get_all_questions, get_question_by_id, search_questions,
            },
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::{deserialize_search_term, PageQuery},
        errors::{ApiError, StoreResultExt},
        pagination::paginate,
    },
};

use super::ApiResponse;

/// Body of `POST /questions`: either a search term or a full new question.
#[derive(Debug, Default, Deserialize)]
struct QuestionsBody {
    #[serde(
        rename = "searchTerm",
        default,
        deserialize_with = "deserialize_search_term"
    )]
    search_term: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Debug, PartialEq)]
enum QuestionsRequest {
    Search(String),
    Create(NewQuestion),
}

impl TryFrom<QuestionsBody> for QuestionsRequest {
    type Error = ApiError;

    fn try_from(body: QuestionsBody) -> Result<Self, Self::Error> {
        if let Some(term) = body.search_term.filter(|term| !term.is_empty()) {
            return Ok(QuestionsRequest::Search(term));
        }
        match (body.question, body.answer, body.category, body.difficulty) {
            (Some(question), Some(answer), Some(category), Some(difficulty)) => {
                Ok(QuestionsRequest::Create(NewQuestion {
                    question,
                    answer,
                    category,
                    difficulty,
                }))
            }
            _ => Err(ApiError::Unprocessable),
        }
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    categories: BTreeMap<i64, String>,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct DeletedResponse {
    success: bool,
    deleted: i64,
    total_questions: i64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum QuestionsPostResponse {
    Found {
        success: bool,
        questions: Vec<Question>,
        total_questions: usize,
    },
    Created {
        success: bool,
        question_created: String,
        created: i64,
        questions: Vec<Question>,
        total_questions: i64,
    },
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<QuestionsPage> {
    let selection = get_all_questions(&pool).await.or_internal()?;
    let total_questions = selection.len() as i64;
    let questions = paginate(selection, PageQuery::or_default(query).page());
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    let categories = get_categories_map(&pool).await.or_internal()?;

    Ok(Json(QuestionsPage {
        success: true,
        categories,
        questions,
        total_questions,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResponse<DeletedResponse> {
    let Path(id) = path.map_err(|_| ApiError::NotFound)?;
    get_question_by_id(&pool, id)
        .await
        .or_unprocessable()?
        .ok_or(ApiError::NotFound)?;

    questions::delete_question(&pool, id)
        .await
        .or_unprocessable()?;
    tracing::info!("Deleted question {}", id);

    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
        total_questions: count_questions(&pool).await.or_unprocessable()?,
    }))
}

async fn create_or_search(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> ApiResponse<QuestionsPostResponse> {
    let Json(body) = body.or_unprocessable()?;

    match QuestionsRequest::try_from(body)? {
        // `total_questions` is the size of the returned page, not of all matches
        QuestionsRequest::Search(term) => {
            let selection = search_questions(&pool, &term).await.or_unprocessable()?;
            let questions = paginate(selection, PageQuery::or_default(query).page());
            Ok(Json(QuestionsPostResponse::Found {
                success: true,
                total_questions: questions.len(),
                questions,
            }))
        }
        QuestionsRequest::Create(new_question) => {
            let id = questions::create_question(&pool, &new_question)
                .await
                .or_unprocessable()?;
            tracing::info!("Created question {}", id);

            let selection = get_all_questions(&pool).await.or_unprocessable()?;
            let total_questions = selection.len() as i64;
            Ok(Json(QuestionsPostResponse::Created {
                success: true,
                question_created: new_question.question,
                created: id,
                questions: paginate(selection, PageQuery::or_default(query).page()),
                total_questions,
            }))
        }
    }
}

pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(get_questions).post(create_or_search))
        .route("/questions/{id}", delete(delete_question))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> QuestionsBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn search_term_wins() {
        let request = QuestionsRequest::try_from(body(serde_json::json!({
            "searchTerm": "title",
            "question": "ignored",
        })));
        assert_eq!(request, Ok(QuestionsRequest::Search("title".to_owned())));
    }

    #[test]
    fn numeric_search_term_is_searched_as_text() {
        let request = QuestionsRequest::try_from(body(serde_json::json!({"searchTerm": 1912})));
        assert_eq!(request, Ok(QuestionsRequest::Search("1912".to_owned())));
    }

    #[test]
    fn zero_or_null_search_term_means_create() {
        for term in [serde_json::json!(0), serde_json::Value::Null] {
            let request = QuestionsRequest::try_from(body(serde_json::json!({
                "searchTerm": term,
                "question": "Q?",
                "answer": "A",
                "category": 1,
                "difficulty": 1,
            })));
            assert!(matches!(request, Ok(QuestionsRequest::Create(_))));
        }
    }

    #[test]
    fn empty_search_term_means_create() {
        let request = QuestionsRequest::try_from(body(serde_json::json!({
            "searchTerm": "",
            "question": "What is X?",
            "answer": "Y",
            "category": "1",
            "difficulty": 3,
        })));
        assert_eq!(
            request,
            Ok(QuestionsRequest::Create(NewQuestion {
                question: "What is X?".to_owned(),
                answer: "Y".to_owned(),
                category: 1,
                difficulty: 3,
            }))
        );
    }

    #[test]
    fn incomplete_question_is_unprocessable() {
        let request = QuestionsRequest::try_from(body(serde_json::json!({
            "question": "What is X?",
            "answer": "Y",
        })));
        assert_eq!(request, Err(ApiError::Unprocessable));
        assert_eq!(
            QuestionsRequest::try_from(QuestionsBody::default()),
            Err(ApiError::Unprocessable)
        );
    }
}

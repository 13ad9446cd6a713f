use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_categories_map, get_category},
            questions::{count_questions, get_questions_for_category},
        },
        Question,
    },
    server::{
        app::AppState,
        deserializers::PageQuery,
        errors::{ApiError, StoreResultExt},
        pagination::paginate,
    },
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    current_category: String,
    total_questions: i64,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesResponse> {
    let categories = get_categories_map(&pool).await.or_internal()?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

// `total_questions` counts the whole bank, not only this category
async fn get_category_questions(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<CategoryQuestionsResponse> {
    let Path(category_id) = path.map_err(|_| ApiError::NotFound)?;
    let category = get_category(&pool, category_id)
        .await
        .or_internal()?
        .ok_or(ApiError::NotFound)?;

    let selection = get_questions_for_category(&pool, category_id)
        .await
        .or_bad_request()?;
    let questions = paginate(selection, PageQuery::or_default(query).page());
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    let total_questions = count_questions(&pool).await.or_bad_request()?;

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        questions,
        current_category: category.kind,
        total_questions,
    }))
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route(
            "/categories/{category_id}/questions",
            get(get_category_questions),
        )
}

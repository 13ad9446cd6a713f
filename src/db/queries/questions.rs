use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM questions
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category_id: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await
}

/// Questions whose text contains `term`, ignoring case beyond ASCII too.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let term = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|question| question.question.to_lowercase().contains(&term))
        .collect())
}

/// Questions eligible for the next quiz round: in `category` (any when `None`)
/// and not listed in `excluded`. `excluded` may be arbitrarily long.
pub async fn get_quiz_candidates(
    pool: &SqlitePool,
    category: Option<i64>,
    excluded: &[i64],
) -> sqlx::Result<Vec<Question>> {
    let selection = match category {
        Some(category) => get_questions_for_category(pool, category).await?,
        None => get_all_questions(pool).await?,
    };
    let excluded: HashSet<i64> = excluded.iter().copied().collect();
    Ok(selection
        .into_iter()
        .filter(|question| !excluded.contains(&question.id))
        .collect())
}

pub async fn create_question(pool: &SqlitePool, new_question: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&new_question.question)
    .bind(&new_question.answer)
    .bind(new_question.category)
    .bind(new_question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns the number of removed rows, 0 when `id` did not exist.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Inserts new questions and overwrites the ones whose id already exists.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::categories::{import_categories, Category};
    use crate::db::tests::memory_pool;

    async fn seeded_pool() -> SqlitePool {
        let pool = memory_pool().await;
        import_categories(
            &pool,
            vec![
                Category {
                    id: 1,
                    kind: "Science".to_owned(),
                },
                Category {
                    id: 2,
                    kind: "Art".to_owned(),
                },
            ],
        )
        .await
        .unwrap();
        for (text, category) in [
            ("What is the boiling point of water?", 1),
            ("Who painted the Mona Lisa?", 2),
            ("What is the chemical symbol for gold?", 1),
        ] {
            create_question(
                &pool,
                &NewQuestion {
                    question: text.to_owned(),
                    answer: "?".to_owned(),
                    category,
                    difficulty: 1,
                },
            )
            .await
            .unwrap();
        }
        pool
    }

    fn ids(questions: &[Question]) -> Vec<i64> {
        questions.iter().map(|q| q.id).collect()
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let pool = seeded_pool().await;
        let all = get_all_questions(&pool).await.unwrap();
        assert_eq!(ids(&all), vec![1, 2, 3]);
        assert_eq!(count_questions(&pool).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let pool = seeded_pool().await;
        let result = create_question(
            &pool,
            &NewQuestion {
                question: "Orphan?".to_owned(),
                answer: "Yes".to_owned(),
                category: 42,
                difficulty: 1,
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let pool = seeded_pool().await;
        let found = search_questions(&pool, "WHAT IS").await.unwrap();
        assert_eq!(ids(&found), vec![1, 3]);
        assert!(search_questions(&pool, "volcano").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_ignores_case_of_accented_letters() {
        let pool = seeded_pool().await;
        let id = create_question(
            &pool,
            &NewQuestion {
                question: "Où est l'ÉCOLE?".to_owned(),
                answer: "Ici".to_owned(),
                category: 2,
                difficulty: 1,
            },
        )
        .await
        .unwrap();

        let found = search_questions(&pool, "école").await.unwrap();
        assert_eq!(ids(&found), vec![id]);
        let found = search_questions(&pool, "OÙ EST").await.unwrap();
        assert_eq!(ids(&found), vec![id]);
    }

    #[tokio::test]
    async fn filter_by_category() {
        let pool = seeded_pool().await;
        let science = get_questions_for_category(&pool, 1).await.unwrap();
        assert_eq!(ids(&science), vec![1, 3]);
    }

    #[tokio::test]
    async fn quiz_candidates_skip_excluded_ids() {
        let pool = seeded_pool().await;
        let any = get_quiz_candidates(&pool, None, &[2]).await.unwrap();
        assert_eq!(ids(&any), vec![1, 3]);

        let science = get_quiz_candidates(&pool, Some(1), &[1]).await.unwrap();
        assert_eq!(ids(&science), vec![3]);

        let exhausted = get_quiz_candidates(&pool, Some(1), &[1, 3]).await.unwrap();
        assert!(exhausted.is_empty());
    }

    #[tokio::test]
    async fn quiz_candidates_accept_huge_exclusion_lists() {
        let pool = seeded_pool().await;
        let excluded: Vec<i64> = (2..=40_000).collect();
        let left = get_quiz_candidates(&pool, None, &excluded).await.unwrap();
        assert_eq!(ids(&left), vec![1]);
    }

    #[tokio::test]
    async fn delete_reports_removed_rows() {
        let pool = seeded_pool().await;
        assert_eq!(delete_question(&pool, 2).await.unwrap(), 1);
        assert_eq!(delete_question(&pool, 2).await.unwrap(), 0);
        assert_eq!(get_question_by_id(&pool, 2).await.unwrap(), None);
        assert_eq!(count_questions(&pool).await.unwrap(), 2);
    }
}

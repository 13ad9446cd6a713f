use axum::extract::{rejection::QueryRejection, Query};
use serde::{Deserialize, Deserializer};

// `?page=abc` behaves like a missing page instead of failing the whole request
pub fn deserialize_lenient_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.trim().parse::<i64>().ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

// numbers are searched for by their decimal text, a zero counts as no term at all
pub fn deserialize_search_term<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => Some(text),
        Some(TextOrNumber::Integer(0)) => None,
        Some(TextOrNumber::Integer(number)) => Some(number.to_string()),
        Some(TextOrNumber::Float(number)) if number == 0.0 => None,
        Some(TextOrNumber::Float(number)) => Some(number.to_string()),
        None => None,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_page")]
    page: Option<i64>,
}

impl PageQuery {
    // a query string serde refuses (e.g. `page=1&page=2`) means the first page
    pub fn or_default(query: Result<Query<PageQuery>, QueryRejection>) -> Self {
        query.map(|Query(query)| query).unwrap_or_default()
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

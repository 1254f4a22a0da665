//! Query expansion.
//!
//! A raw query is widened with related terms from two static tables: a
//! keyword map (canonical food or brand term → related names, e.g. "치킨" →
//! 교촌, BBQ, ...) and a food-type map (broad category → specific dishes).

use crate::fuzzy::similarity;
use crate::{Result, SearchError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tablemate_core::config::SearchConfig;

/// Canonical term → related terms.
const KEYWORDS: &[(&str, &[&str])] = &[
    ("치킨", &["치킨", "교촌", "BBQ", "BHC", "굽네", "네네", "처갓집", "페리카나", "호식이", "후라이드", "양념치킨"]),
    ("피자", &["피자", "도미노", "피자헛", "파파존스", "미스터피자", "피자스쿨", "반올림피자"]),
    ("햄버거", &["햄버거", "버거", "맥도날드", "버거킹", "롯데리아", "맘스터치", "KFC", "쉐이크쉑", "노브랜드버거"]),
    ("버거", &["버거", "햄버거", "맥도날드", "버거킹", "롯데리아", "맘스터치", "쉐이크쉑"]),
    ("커피", &["커피", "카페", "스타벅스", "이디야", "투썸", "메가커피", "빽다방", "컴포즈", "할리스"]),
    ("카페", &["카페", "커피", "디저트", "베이커리", "스타벅스", "투썸"]),
    ("분식", &["분식", "떡볶이", "김밥", "순대", "튀김", "라면", "김밥천국"]),
    ("떡볶이", &["떡볶이", "엽기떡볶이", "신전떡볶이", "죠스떡볶이", "분식"]),
    ("중식", &["중식", "중국집", "짜장면", "짬뽕", "탕수육", "마라탕", "홍콩반점"]),
    ("중국집", &["중국집", "중식", "짜장면", "짬뽕", "탕수육"]),
    ("일식", &["일식", "초밥", "스시", "라멘", "돈카츠", "우동", "사시미"]),
    ("초밥", &["초밥", "스시", "일식", "회전초밥"]),
    ("한식", &["한식", "백반", "국밥", "비빔밥", "찌개", "불고기", "한정식"]),
    ("고기", &["고기", "삼겹살", "갈비", "소고기", "돼지고기", "고깃집", "목살"]),
    ("삼겹살", &["삼겹살", "고기", "돼지고기", "오겹살", "고깃집"]),
    ("족발", &["족발", "보쌈", "가장맛있는족발"]),
    ("국밥", &["국밥", "순대국", "돼지국밥", "해장국", "설렁탕"]),
    ("디저트", &["디저트", "케이크", "베이커리", "마카롱", "아이스크림", "배스킨라빈스", "설빙"]),
    ("빵", &["빵", "베이커리", "파리바게뜨", "뚜레쥬르", "성심당"]),
    ("양식", &["양식", "파스타", "스테이크", "리조또", "레스토랑"]),
    ("술집", &["술집", "호프", "이자카야", "포차", "맥주", "와인바"]),
];

/// Broad category → specific dishes.
const FOOD_TYPES: &[(&str, &[&str])] = &[
    ("한식", &["김치찌개", "된장찌개", "비빔밥", "불고기", "제육볶음", "냉면"]),
    ("중식", &["짜장면", "짬뽕", "탕수육", "마라탕", "양꼬치"]),
    ("일식", &["초밥", "라멘", "돈카츠", "우동", "규동"]),
    ("양식", &["파스타", "피자", "스테이크", "햄버거", "샐러드"]),
    ("분식", &["떡볶이", "김밥", "라면", "순대", "튀김"]),
    ("아시안", &["쌀국수", "팟타이", "분짜", "커리", "반미"]),
    ("패스트푸드", &["햄버거", "치킨", "피자", "핫도그", "감자튀김"]),
    ("야식", &["치킨", "족발", "보쌈", "피자", "떡볶이"]),
    ("해산물", &["회", "조개구이", "대게", "아구찜", "해물탕"]),
];

static DEFAULT_TABLES: Lazy<ExpansionTables> = Lazy::new(|| ExpansionTables {
    keywords: build_table(KEYWORDS),
    food_types: build_table(FOOD_TYPES),
});

fn build_table(rows: &[(&str, &[&str])]) -> Vec<ExpansionRow> {
    rows.iter()
        .map(|(key, related)| ExpansionRow {
            key: (*key).to_string(),
            related: related.iter().map(|s| (*s).to_string()).collect(),
        })
        .collect()
}

/// Lowercase and trim, the normalization used for cache keys and terms.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One row of an expansion table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionRow {
    /// Term the query is compared against
    pub key: String,
    /// Terms added when the row fires
    pub related: Vec<String>,
}

/// The keyword and food-type tables.
///
/// Row order is preserved so expansion is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExpansionTables {
    /// Canonical food or brand term → related terms
    #[serde(default)]
    pub keywords: Vec<ExpansionRow>,
    /// Broad category → specific dishes
    #[serde(default)]
    pub food_types: Vec<ExpansionRow>,
}

impl ExpansionTables {
    /// The built-in Korean food and brand tables.
    pub fn builtin() -> Self {
        DEFAULT_TABLES.clone()
    }

    /// Parse tables from JSON of the form
    /// `{"keywords": [{"key": "..", "related": [..]}], "food_types": [..]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: ExpansionTables = serde_json::from_str(json)?;
        for row in tables.keywords.iter().chain(&tables.food_types) {
            if normalize_query(&row.key).is_empty() {
                return Err(SearchError::InvalidKeywordMap("row with an empty key".into()));
            }
            if row.related.iter().any(|term| normalize_query(term).is_empty()) {
                return Err(SearchError::InvalidKeywordMap(format!(
                    "row '{}' has an empty related term",
                    row.key
                )));
            }
        }
        Ok(tables)
    }

    /// Blank keys and related terms are dropped; an empty term matches everything.
    fn normalized(mut self) -> Self {
        for row in self.keywords.iter_mut().chain(self.food_types.iter_mut()) {
            row.key = normalize_query(&row.key);
            row.related = row
                .related
                .iter()
                .map(|term| normalize_query(term))
                .filter(|term| !term.is_empty())
                .collect();
        }
        self.keywords.retain(|row| !row.key.is_empty());
        self.food_types.retain(|row| !row.key.is_empty());
        self
    }
}

/// The set of normalized terms derived from one raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedQuery {
    normalized: String,
    terms: BTreeSet<String>,
}

impl ExpandedQuery {
    /// The trimmed, lowercased query.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Whether `term` (already normalized) is part of the expansion.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// All terms, including the query itself, in sorted order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True only for the expansion of an empty query.
    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Expands raw queries using the expansion tables and fuzzy matching.
#[derive(Debug, Clone)]
pub struct QueryExpander {
    tables: ExpansionTables,
    similarity_threshold: f64,
    min_bidirectional_len: usize,
}

impl QueryExpander {
    /// Expander over the built-in tables.
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_tables(ExpansionTables::builtin(), config)
    }

    /// Expander over custom tables.
    pub fn with_tables(tables: ExpansionTables, config: &SearchConfig) -> Self {
        Self {
            tables: tables.normalized(),
            similarity_threshold: config.expansion_similarity,
            min_bidirectional_len: config.min_bidirectional_len,
        }
    }

    /// Expand a raw query into its set of terms.
    ///
    /// The normalized query is always included. A keyword row contributes
    /// its related terms when its key and the query contain one another,
    /// or when their similarity reaches the threshold. A food-type row
    /// contributes its dishes on a containment match. An empty query
    /// expands to just itself.
    pub fn expand(&self, raw: &str) -> ExpandedQuery {
        let query = normalize_query(raw);
        let mut terms = BTreeSet::new();
        terms.insert(query.clone());

        if query.is_empty() {
            return ExpandedQuery { normalized: query, terms };
        }

        for row in &self.tables.keywords {
            if mutually_contains(&row.key, &query) {
                terms.extend(row.related.iter().cloned());
            }
        }

        for row in &self.tables.keywords {
            if similarity(&query, &row.key) >= self.similarity_threshold {
                terms.extend(row.related.iter().cloned());
            }
        }

        // Same containment rule behind a length guard. It never adds terms the
        // first pass missed; kept so the rule set stays explicit.
        if query.chars().count() >= self.min_bidirectional_len {
            for row in &self.tables.keywords {
                if mutually_contains(&row.key, &query) {
                    terms.extend(row.related.iter().cloned());
                }
            }
        }

        for row in &self.tables.food_types {
            if mutually_contains(&row.key, &query) {
                terms.extend(row.related.iter().cloned());
            }
        }

        tracing::trace!(query = %query, terms = terms.len(), "Query expanded");

        ExpandedQuery { normalized: query, terms }
    }
}

#[inline]
fn mutually_contains(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expander() -> QueryExpander {
        QueryExpander::new(&SearchConfig::default())
    }

    #[test]
    fn test_chicken_expands_to_brands() {
        let expanded = expander().expand("치킨");
        assert!(expanded.contains("치킨"));
        assert!(expanded.contains("교촌"));
        assert!(expanded.contains("bbq"));
    }

    #[test]
    fn test_query_containing_key_expands() {
        // "양념치킨집" contains the key "치킨"
        let expanded = expander().expand("양념치킨집");
        assert!(expanded.contains("양념치킨집"));
        assert!(expanded.contains("굽네"));
    }

    #[test]
    fn test_similarity_rule() {
        let tables = ExpansionTables {
            keywords: vec![ExpansionRow {
                key: "돼지국밥".into(),
                related: vec!["밀양".into()],
            }],
            food_types: vec![],
        };
        let expander = QueryExpander::with_tables(tables, &SearchConfig::default());
        // 3 of 4 units match: similarity 0.75
        assert!(expander.expand("돼지곰밥").contains("밀양"));
        // 1 of 4: similarity 0.25
        assert!(!expander.expand("소고곰밥").contains("밀양"));
    }

    #[test]
    fn test_food_type_map() {
        let expanded = expander().expand("중식");
        assert!(expanded.contains("양꼬치"));
        assert!(expanded.contains("홍콩반점"));
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let expanded = expander().expand("  피자 ");
        assert_eq!(expanded.normalized(), "피자");
        assert!(expanded.contains("도미노"));
        assert!(expanded.contains("파파존스"));
    }

    #[test]
    fn test_unrelated_query_is_only_itself() {
        let expanded = expander().expand("자전거수리");
        assert_eq!(expanded.len(), 1);
        assert!(expanded.contains("자전거수리"));
    }

    #[test]
    fn test_empty_query() {
        let expanded = expander().expand("   ");
        assert!(expanded.is_blank());
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_tables_from_json() {
        let tables = ExpansionTables::from_json(
            r#"{"keywords": [{"key": "Taco", "related": ["Burrito"]}]}"#,
        )
        .unwrap();
        let expander = QueryExpander::with_tables(tables, &SearchConfig::default());
        assert!(expander.expand("taco").contains("burrito"));
    }

    #[test]
    fn test_tables_from_json_rejects_empty_key() {
        let err = ExpansionTables::from_json(r#"{"keywords": [{"key": " ", "related": []}]}"#).unwrap_err();
        assert!(matches!(err, SearchError::InvalidKeywordMap(_)));
        assert!(ExpansionTables::from_json("[").is_err());
    }

    #[test]
    fn test_tables_from_json_rejects_blank_related_term() {
        let err = ExpansionTables::from_json(r#"{"keywords": [{"key": "taco", "related": ["burrito", "  "]}]}"#)
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidKeywordMap(_)));
    }

    #[test]
    fn test_blank_related_terms_are_dropped() {
        let tables = ExpansionTables {
            keywords: vec![],
            food_types: vec![ExpansionRow {
                key: "타코".into(),
                related: vec!["".into(), " ".into(), "부리또".into()],
            }],
        };
        let expander = QueryExpander::with_tables(tables, &SearchConfig::default());
        let expanded = expander.expand("타코");
        assert!(!expanded.contains(""));
        assert!(expanded.contains("부리또"));
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let a: Vec<String> = expander().expand("피자").terms().map(String::from).collect();
        let b: Vec<String> = expander().expand("피자").terms().map(String::from).collect();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_contains_normalized_query(q in "\\PC{0,10}") {
            let expanded = expander().expand(&q);
            prop_assert!(expanded.contains(&normalize_query(&q)));
        }
    }
}

//! Registry search API shapes and query construction
//!
//! Unlike the downloads shapes these are decoded leniently: the registry adds
//! fields to search objects over time and only `package.name` is used.

use npmdl_common::config::SearchWeightsConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `GET /-/v1/search` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub objects: Vec<SearchHit>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub time: String,
}

/// One search result object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchHit {
    pub package: SearchPackage,
    #[serde(default)]
    pub score: Score,
    #[serde(default, rename = "searchScore")]
    pub search_score: f64,
}

/// Package metadata carried by a search hit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchPackage {
    pub name: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    #[serde(default)]
    pub author: Option<serde_json::Value>,
    #[serde(default)]
    pub publisher: Option<serde_json::Value>,
    #[serde(default)]
    pub maintainers: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Score {
    #[serde(default, rename = "final")]
    pub final_score: f64,
    #[serde(default)]
    pub detail: ScoreDetail,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScoreDetail {
    #[serde(default)]
    pub quality: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub maintenance: f64,
}

/// Ranking weights sent with every search request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWeights {
    pub quality: f64,
    pub popularity: f64,
    pub maintenance: f64,
}

impl Default for SearchWeights {
    fn default() -> Self {
        SearchWeightsConfig::default().into()
    }
}

impl From<SearchWeightsConfig> for SearchWeights {
    fn from(config: SearchWeightsConfig) -> Self {
        Self {
            quality: config.quality,
            popularity: config.popularity,
            maintenance: config.maintenance,
        }
    }
}

/// One free-text search, paged independently of the others
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub weights: SearchWeights,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, weights: SearchWeights) -> Self {
        Self {
            text: text.into(),
            weights,
        }
    }

    pub fn author(name: &str, weights: SearchWeights) -> Self {
        Self::new(format!("author:{}", name), weights)
    }

    pub fn scope(scope: &str, weights: SearchWeights) -> Self {
        Self::new(format!("scope:{}", scope.trim_start_matches('@')), weights)
    }

    pub fn maintainer(name: &str, weights: SearchWeights) -> Self {
        Self::new(format!("maintainer:{}", name), weights)
    }

    pub fn keyword(keyword: &str, weights: SearchWeights) -> Self {
        Self::new(format!("keywords:{}", keyword), weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_decodes_with_extra_fields() {
        let json = r#"{
            "objects": [{
                "package": {
                    "name": "left-pad",
                    "scope": "unscoped",
                    "version": "1.3.0",
                    "description": "String left pad",
                    "keywords": ["leftpad", "pad"],
                    "date": "2018-04-09T01:23:40.440Z",
                    "links": {"npm": "https://www.npmjs.com/package/left-pad"},
                    "author": {"name": "azer"},
                    "publisher": {"username": "stevemao", "email": "x@example.com"},
                    "maintainers": [{"username": "stevemao", "email": "x@example.com"}]
                },
                "flags": {"insecure": 0},
                "score": {"final": 0.5, "detail": {"quality": 0.6, "popularity": 0.7, "maintenance": 0.3}},
                "searchScore": 100.5,
                "downloads": {"monthly": 1, "weekly": 1}
            }],
            "total": 1,
            "time": "Wed Mar 15 2023 10:00:00 GMT+0000 (Coordinated Universal Time)"
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.objects[0].package.name, "left-pad");
        assert_eq!(response.objects[0].score.detail.popularity, 0.7);
        assert_eq!(response.objects[0].search_score, 100.5);
    }

    #[test]
    fn test_query_modifiers() {
        let w = SearchWeights::default();
        assert_eq!(SearchQuery::author("sindresorhus", w).text, "author:sindresorhus");
        assert_eq!(SearchQuery::scope("@babel", w).text, "scope:babel");
        assert_eq!(SearchQuery::maintainer("ljharb", w).text, "maintainer:ljharb");
        assert_eq!(SearchQuery::keyword("eslint", w).text, "keywords:eslint");
    }
}

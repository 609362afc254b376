use serde::{Deserialize, Serialize};

/// One hit of a title search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub title: String,
    pub year: String,
    pub external_id: String,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// Result list of a title search, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<SearchResultItem>,
    pub total_available: u64,
}

impl SearchResponse {
    /// The response used when there is no search term at all.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub source: String,
    pub value: String,
}

/// Aggregated details of a single title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub external_id: String,
    pub title: String,
    pub rated: String,
    pub release_date: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub actors: String,
    pub plot_summary: String,
    pub language: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

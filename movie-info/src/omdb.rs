//! Wire format of the OMDb-style provider.
//!
//! Every body carries a `"Response"` flag of `"True"` or `"False"`; the flag is
//! what decides success, not the HTTP status.

use crate::{ItemDetail, Rating, SearchResponse, SearchResultItem, UpstreamError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Message used when the provider flags a failure without saying why.
pub const DEFAULT_PROVIDER_ERROR: &str = "Error fetching data from API";

/// Placeholder the provider uses for missing values.
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
#[serde(tag = "Response")]
enum Envelope<T> {
    #[serde(rename = "True")]
    Success(T),
    #[serde(rename = "False")]
    Failure {
        #[serde(rename = "Error", default)]
        error: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct OmdbSearch {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbSearchItem {
    title: String,
    #[serde(default)]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(default)]
    r#type: String,
    #[serde(default)]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OmdbDetail {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    title: String,
    #[serde(default)]
    rated: String,
    #[serde(default)]
    released: String,
    #[serde(default)]
    runtime: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    director: String,
    #[serde(default)]
    actors: String,
    #[serde(default)]
    plot: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    awards: Option<String>,
    #[serde(default)]
    box_office: Option<String>,
    #[serde(default)]
    ratings: Vec<OmdbRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbRating {
    source: String,
    value: String,
}

fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != NOT_AVAILABLE)
}

impl From<OmdbSearch> for SearchResponse {
    fn from(raw: OmdbSearch) -> Self {
        let items: Vec<SearchResultItem> = raw
            .search
            .into_iter()
            .map(|item| SearchResultItem {
                title: item.title,
                year: item.year,
                external_id: item.imdb_id,
                media_type: item.r#type,
                poster_url: available(item.poster),
            })
            .collect();

        let total_available = raw
            .total_results
            .and_then(|total| total.trim().parse().ok())
            .unwrap_or(items.len() as u64);

        SearchResponse {
            items,
            total_available,
        }
    }
}

impl From<OmdbDetail> for ItemDetail {
    fn from(raw: OmdbDetail) -> Self {
        ItemDetail {
            external_id: raw.imdb_id,
            title: raw.title,
            rated: raw.rated,
            release_date: raw.released,
            runtime: raw.runtime,
            genre: raw.genre,
            director: raw.director,
            actors: raw.actors,
            plot_summary: raw.plot,
            language: raw.language,
            country: raw.country,
            awards_text: available(raw.awards),
            box_office: available(raw.box_office),
            ratings: raw
                .ratings
                .into_iter()
                .map(|r| Rating {
                    source: r.source,
                    value: r.value,
                })
                .collect(),
        }
    }
}

/// Decodes a provider body, turning a `"Response": "False"` flag into
/// [`UpstreamError::NotFound`].
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, UpstreamError> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(Envelope::Success(value)) => Ok(value),
        Ok(Envelope::Failure { error }) => Err(UpstreamError::NotFound(
            error.unwrap_or_else(|| DEFAULT_PROVIDER_ERROR.to_string()),
        )),
        Err(err) => Err(UpstreamError::Decode(err.to_string())),
    }
}

pub(crate) fn decode_search(body: &str) -> Result<SearchResponse, UpstreamError> {
    decode::<OmdbSearch>(body).map(SearchResponse::from)
}

pub(crate) fn decode_detail(body: &str) -> Result<ItemDetail, UpstreamError> {
    decode::<OmdbDetail>(body).map(ItemDetail::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "Search": [
            {"Title": "Alien", "Year": "1979", "imdbID": "tt0078748", "Type": "movie",
             "Poster": "https://m.media-amazon.com/images/alien.jpg"},
            {"Title": "Aliens", "Year": "1986", "imdbID": "tt0090605", "Type": "movie",
             "Poster": "N/A"}
        ],
        "totalResults": "212",
        "Response": "True"
    }"#;

    const DETAIL_BODY: &str = r#"{
        "Title": "The Shawshank Redemption", "Year": "1994", "Rated": "R",
        "Released": "14 Oct 1994", "Runtime": "142 min", "Genre": "Drama",
        "Director": "Frank Darabont", "Writer": "Stephen King, Frank Darabont",
        "Actors": "Tim Robbins, Morgan Freeman, Bob Gunton",
        "Plot": "Two imprisoned men bond over a number of years.",
        "Language": "English", "Country": "United States",
        "Awards": "Nominated for 7 Oscars.", "Poster": "N/A",
        "Ratings": [
            {"Source": "Internet Movie Database", "Value": "9.3/10"},
            {"Source": "Rotten Tomatoes", "Value": "91%"}
        ],
        "imdbID": "tt0111161", "Type": "movie", "BoxOffice": "N/A",
        "Response": "True"
    }"#;

    #[test]
    fn test_search_keeps_provider_order() {
        let response = decode_search(SEARCH_BODY).unwrap();
        assert_eq!(response.total_available, 212);
        let ids: Vec<_> = response.items.iter().map(|i| i.external_id.as_str()).collect();
        assert_eq!(ids, vec!["tt0078748", "tt0090605"]);
        assert_eq!(response.items[0].media_type, "movie");
    }

    #[test]
    fn test_poster_placeholder_is_absent() {
        let response = decode_search(SEARCH_BODY).unwrap();
        assert!(response.items[0].poster_url.is_some());
        assert_eq!(response.items[1].poster_url, None);
    }

    #[test]
    fn test_failure_flag_is_not_found() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        assert_eq!(
            decode_search(body),
            Err(UpstreamError::NotFound("Movie not found!".to_string()))
        );
    }

    #[test]
    fn test_failure_flag_without_message() {
        let body = r#"{"Response":"False"}"#;
        assert_eq!(
            decode_detail(body),
            Err(UpstreamError::NotFound(DEFAULT_PROVIDER_ERROR.to_string()))
        );
    }

    #[test]
    fn test_missing_flag_is_decode_error() {
        assert!(matches!(
            decode_search(r#"{"Search": []}"#),
            Err(UpstreamError::Decode(_))
        ));
        assert!(matches!(decode_search("<html>"), Err(UpstreamError::Decode(_))));
    }

    #[test]
    fn test_unparsable_total_falls_back_to_item_count() {
        let body = r#"{"Search":[{"Title":"X","Year":"2001","imdbID":"tt1","Type":"movie"}],
                       "totalResults":"many","Response":"True"}"#;
        let response = decode_search(body).unwrap();
        assert_eq!(response.total_available, 1);
    }

    #[test]
    fn test_detail_mapping() {
        let detail = decode_detail(DETAIL_BODY).unwrap();
        assert_eq!(detail.external_id, "tt0111161");
        assert_eq!(detail.release_date, "14 Oct 1994");
        assert_eq!(detail.plot_summary, "Two imprisoned men bond over a number of years.");
        assert_eq!(detail.awards_text.as_deref(), Some("Nominated for 7 Oscars."));
        assert_eq!(detail.box_office, None);
        assert_eq!(detail.ratings.len(), 2);
        assert_eq!(detail.ratings[1].source, "Rotten Tomatoes");
    }
}

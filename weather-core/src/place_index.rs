//! In-memory place-name index.
//!
//! The dataset is a headerless CSV of `code,name,longitude,latitude` rows,
//! loaded once per index. Loading never fails towards the caller: a broken
//! dataset leaves the index empty and searches return nothing.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::DatasetLoadError;
use crate::model::PlaceRecord;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Where the place dataset comes from.
#[derive(Debug, Clone)]
pub enum PlaceSource {
    File(PathBuf),
    Url(String),
    Text(String),
}

impl PlaceSource {
    /// Treats `http://` and `https://` locations as URLs, anything else as a path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    async fn read(&self) -> Result<String, DatasetLoadError> {
        match self {
            Self::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Self::Url(url) => {
                let res = reqwest::get(url).await?;
                let status = res.status();
                if !status.is_success() {
                    return Err(DatasetLoadError::Status(status));
                }
                Ok(res.text().await?)
            }
            Self::Text(text) => Ok(text.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Unloaded,
    Loading,
    Ready,
}

impl IndexState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Loading,
            2 => Self::Ready,
            _ => Self::Unloaded,
        }
    }
}

#[derive(Debug)]
struct Entry {
    record: PlaceRecord,
    lower_name: String,
    name_len: usize,
}

/// Searchable set of places.
///
/// `load` is safe to call from many tasks at once: callers queue behind a
/// single load gate, and whoever gets in after a successful load sees the
/// index ready and returns without fetching again.
#[derive(Debug)]
pub struct PlaceIndex {
    source: PlaceSource,
    state: AtomicU8,
    load_gate: Mutex<()>,
    entries: RwLock<Vec<Entry>>,
}

impl PlaceIndex {
    pub fn new(source: PlaceSource) -> Self {
        Self {
            source,
            state: AtomicU8::new(IndexState::Unloaded as u8),
            load_gate: Mutex::new(()),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn state(&self) -> IndexState {
        IndexState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == IndexState::Ready
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Loads the dataset if it is not loaded yet and returns the record count.
    ///
    /// On failure the error is logged, the index stays empty and goes back to
    /// `Unloaded`, so a later call may retry.
    pub async fn load(&self) -> usize {
        if self.is_ready() {
            return self.len();
        }

        let _gate = self.load_gate.lock().await;
        if self.is_ready() {
            return self.len();
        }

        self.state.store(IndexState::Loading as u8, Ordering::Release);
        debug!(source = ?self.source, "Loading place dataset");

        match self.fetch().await {
            Ok(records) => {
                let count = records.len();
                *self.entries.write() = records
                    .into_iter()
                    .map(|record| Entry {
                        lower_name: record.name.to_lowercase(),
                        name_len: record.name.chars().count(),
                        record,
                    })
                    .collect();
                self.state.store(IndexState::Ready as u8, Ordering::Release);
                info!(count, "Place dataset loaded");
                count
            }
            Err(e) => {
                warn!("Failed to load place dataset: {e}");
                self.state.store(IndexState::Unloaded as u8, Ordering::Release);
                0
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<PlaceRecord>, DatasetLoadError> {
        let text = self.source.read().await?;
        parse_places(&text)
    }

    /// Case-insensitive substring search over place names.
    ///
    /// Names starting with the query come first, then shorter names first.
    /// Returns nothing while the index is not ready or the query is blank.
    pub fn search(&self, query: &str, limit: usize) -> Vec<PlaceRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || !self.is_ready() {
            return Vec::new();
        }

        let entries = self.entries.read();
        let mut hits: Vec<(bool, usize, &Entry)> = entries
            .iter()
            .filter(|e| e.lower_name.contains(&needle))
            .map(|e| (!e.lower_name.starts_with(&needle), e.name_len, e))
            .collect();

        hits.sort_by_key(|&(later_tier, len, _)| (later_tier, len));

        hits.into_iter()
            .take(limit)
            .map(|(_, _, e)| e.record.clone())
            .collect()
    }
}

/// Parses `code,name,longitude,latitude` rows, skipping short rows and rows
/// whose coordinates are not finite numbers.
pub fn parse_places(text: &str) -> Result<Vec<PlaceRecord>, DatasetLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut places = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let parsed = match (record.get(0), record.get(1), record.get(2), record.get(3)) {
            (Some(code), Some(name), Some(lon), Some(lat)) => {
                match (parse_coordinate(lon), parse_coordinate(lat)) {
                    (Some(longitude), Some(latitude)) => Some(PlaceRecord {
                        code: code.to_string(),
                        name: name.to_string(),
                        longitude,
                        latitude,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        match parsed {
            Some(place) => places.push(place),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped place rows without valid coordinates");
    }

    Ok(places)
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    const DATASET: &str = "\
BJ,北京,116.4074,39.9042
BJHD,北京市海淀区,116.2982,39.9593
HB,河北,114.5025,38.0455
DBJ,东北京城,123.4,41.8

SH,上海,121.4737,31.2304
BAD,坏数据,not-a-number,30.0
NAN,无效,NaN,30.0
SHORT,只有名字
sp,Springfield,-89.65,39.78
SPV,Spring Valley,-117.0,32.7
";

    async fn loaded_index() -> PlaceIndex {
        let index = PlaceIndex::new(PlaceSource::Text(DATASET.to_string()));
        index.load().await;
        index
    }

    #[test]
    fn parse_skips_blank_and_invalid_rows() {
        let places = parse_places(DATASET).unwrap();
        let codes: Vec<_> = places.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["BJ", "BJHD", "HB", "DBJ", "SH", "sp", "SPV"]);
        assert_eq!(places[0].longitude, 116.4074);
        assert_eq!(places[0].latitude, 39.9042);
    }

    #[test]
    fn stray_quote_only_affects_its_own_row() {
        let text = "Q,\"Quoted place,1.0,2.0\nBJ,北京,116.4074,39.9042\nSH,上海,121.4737,31.2304\n";
        let places = parse_places(text).unwrap();
        let codes: Vec<_> = places.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["Q", "BJ", "SH"]);
        assert_eq!(places[0].name, "\"Quoted place");
    }

    #[tokio::test]
    async fn search_is_empty_before_load() {
        let index = PlaceIndex::new(PlaceSource::Text(DATASET.to_string()));
        assert_eq!(index.state(), IndexState::Unloaded);
        assert!(index.search("北", DEFAULT_SEARCH_LIMIT).is_empty());
    }

    #[tokio::test]
    async fn blank_queries_return_nothing() {
        let index = loaded_index().await;
        assert!(index.search("", DEFAULT_SEARCH_LIMIT).is_empty());
        assert!(index.search("   \t", DEFAULT_SEARCH_LIMIT).is_empty());
    }

    #[tokio::test]
    async fn prefix_matches_rank_before_substring_matches() {
        let index = loaded_index().await;
        let names: Vec<_> = index
            .search("北", DEFAULT_SEARCH_LIMIT)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["北京", "北京市海淀区", "河北", "东北京城"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_trims_the_query() {
        let index = loaded_index().await;
        let names: Vec<_> = index
            .search("  SPRING ", DEFAULT_SEARCH_LIMIT)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Springfield", "Spring Valley"]);
    }

    #[tokio::test]
    async fn results_are_truncated_to_limit() {
        let index = loaded_index().await;
        let results = index.search("北", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code, "BJ");
    }

    #[tokio::test]
    async fn every_result_contains_the_query() {
        let index = loaded_index().await;
        for query in ["京", "s", "a", "北京"] {
            let lower = query.to_lowercase();
            for place in index.search(query, DEFAULT_SEARCH_LIMIT) {
                assert!(place.name.to_lowercase().contains(&lower), "{}", place.name);
            }
        }
    }

    #[tokio::test]
    async fn missing_file_leaves_index_empty_and_unloaded() {
        let index = PlaceIndex::new(PlaceSource::File("/definitely/not/here.csv".into()));
        assert_eq!(index.load().await, 0);
        assert_eq!(index.state(), IndexState::Unloaded);
        assert!(index.search("北", DEFAULT_SEARCH_LIMIT).is_empty());
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let index = PlaceIndex::new(PlaceSource::File(file.path().to_path_buf()));
        assert_eq!(index.load().await, 7);
        assert!(index.is_ready());
    }

    #[tokio::test]
    async fn repeated_and_concurrent_loads_do_not_duplicate_records() {
        let index = Arc::new(PlaceIndex::new(PlaceSource::Text(DATASET.to_string())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                tokio::spawn(async move { index.load().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 7);
        }

        assert_eq!(index.load().await, 7);
        assert_eq!(index.len(), 7);
    }

    #[test]
    fn location_strings_pick_a_source() {
        assert!(matches!(
            PlaceSource::from_location("https://example.com/geo_data.csv"),
            PlaceSource::Url(_)
        ));
        assert!(matches!(
            PlaceSource::from_location("data/geo_data.csv"),
            PlaceSource::File(_)
        ));
    }
}

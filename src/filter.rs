use rayon::prelude::*;
use std::time::Instant;
use tracing::trace;

use crate::record::{Dataset, Record};

/// Returns the records whose name, size or quality contains `query`,
/// ignoring case. The relative order of matches is preserved and an empty
/// query matches everything.
pub fn filter(dataset: &Dataset, query: &str) -> Dataset {
    let start_time = Instant::now();
    let needle = query.to_lowercase();

    let matches: Vec<Record> = dataset
        .records()
        .par_iter()
        .filter(|record| matches(record, &needle))
        .cloned()
        .collect();

    trace!(
        "Filter '{}' matched {}/{} records in {}ms",
        query,
        matches.len(),
        dataset.len(),
        start_time.elapsed().as_millis()
    );
    Dataset::new(matches)
}

// `needle` must already be lower case.
fn matches(record: &Record, needle: &str) -> bool {
    record
        .searchable_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Dataset {
        Dataset::new(vec![
            Record::new("1", "Violin", "4/4", "Excellent"),
            Record::new("2", "Viola", "16", "Good"),
            Record::new("3", "Cello", "3/4", "Fair"),
            Record::new("4", "Double Bass", "3/4", "Good"),
            Record::new("55", "Flute", "C", "Poor"),
        ])
    }

    fn names(ds: &Dataset) -> Vec<&str> {
        ds.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn matches_any_searchable_field_case_insensitive() {
        let ds = inventory();
        assert_eq!(names(&filter(&ds, "VIOL")), ["Violin", "Viola"]);
        assert_eq!(names(&filter(&ds, "3/4")), ["Cello", "Double Bass"]);
        assert_eq!(names(&filter(&ds, "good")), ["Viola", "Double Bass"]);
    }

    #[test]
    fn id_is_not_searched() {
        assert!(filter(&inventory(), "55").is_empty());
    }

    #[test]
    fn empty_query_is_identity() {
        let ds = inventory();
        assert_eq!(filter(&ds, ""), ds);
    }

    #[test]
    fn every_record_is_either_matched_or_excluded() {
        let ds = inventory();
        let query = "o";
        let result = filter(&ds, query);
        for record in ds.iter() {
            let hit = record
                .searchable_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(query));
            assert_eq!(result.records().contains(record), hit, "{record:?}");
        }
    }

    #[test]
    fn source_dataset_is_untouched() {
        let ds = inventory();
        let _ = filter(&ds, "cello");
        assert_eq!(ds.len(), 5);
    }
}

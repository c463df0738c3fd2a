use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::{FieldValue, Record};
use crate::utils::error::{EngineError, EngineResult};

const BOM: char = '\u{feff}';

/// Listings read from one file or a directory of region files
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadedListings {
    pub records: Vec<Record>,
    /// File stems in load order
    pub regions: Vec<String>,
}

impl LoadedListings {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Reads listing CSV files. Each record is tagged with its region (the
/// file stem) under `region_field`.
pub struct PropertyCsvLoader {
    region_field: String,
}

impl PropertyCsvLoader {
    pub fn new(region_field: impl Into<String>) -> Self {
        Self {
            region_field: region_field.into(),
        }
    }

    /// Load a CSV file, or every `*.csv` in a directory whose name starts with
    /// `region` (all files when `region` is `None`), in file-name order.
    pub fn load(
        &self,
        path: &Path,
        region: Option<&str>,
        row_limit: Option<usize>,
    ) -> EngineResult<LoadedListings> {
        if !path.exists() {
            return Err(EngineError::Ingestion(format!("Path not found: {:?}", path)));
        }

        let mut loaded = LoadedListings::default();

        if path.is_dir() {
            let mut files: Vec<_> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|file| file.is_file() && has_csv_extension(file))
                .filter(|file| match region {
                    Some(prefix) => file_name(file).starts_with(prefix),
                    None => true,
                })
                .collect();
            files.sort();

            if files.is_empty() {
                warn!("No CSV files matched in {:?} (region: {:?})", path, region);
            }

            for file in files {
                self.load_into(&file, row_limit, &mut loaded)?;
            }
        } else {
            self.load_into(path, row_limit, &mut loaded)?;
        }

        info!(
            "Loaded {} listings from {} region file(s)",
            loaded.records.len(),
            loaded.regions.len()
        );
        Ok(loaded)
    }

    fn load_into(
        &self,
        file: &Path,
        row_limit: Option<usize>,
        loaded: &mut LoadedListings,
    ) -> EngineResult<()> {
        let region = file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        let content = fs::read_to_string(file)?;
        let mut records = parse_csv(&content, row_limit)?;
        for record in &mut records {
            record.insert(self.region_field.as_str(), region.as_str());
        }

        debug!("Parsed {} rows from {:?}", records.len(), file);
        loaded.records.extend(records);
        loaded.regions.push(region);
        Ok(())
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
}

/// Header line gives the field names; blank lines are skipped and missing
/// trailing cells become "".
pub fn parse_csv(content: &str, row_limit: Option<usize>) -> EngineResult<Vec<Record>> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .map(|line| line.trim_start_matches(BOM))
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| EngineError::Ingestion("CSV has no header line".to_string()))?;
    let headers = split_line(header);

    let limit = row_limit.unwrap_or(usize::MAX);
    let records = lines
        .filter(|line| !line.trim().is_empty())
        .take(limit)
        .map(|line| {
            let mut cells = split_line(line).into_iter();
            headers
                .iter()
                .map(|name| {
                    let value = cells.next().unwrap_or_default();
                    (name.clone(), FieldValue::Text(value))
                })
                .collect::<Record>()
        })
        .collect();

    Ok(records)
}

/// `"` toggles quoted mode; commas inside quotes are kept.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in line.trim_end_matches('\r').chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "\u{feff}物件ID,物件名称,所在地名称,賃料・価格\r\n\
A1,\"メゾン,新宿\",東京都新宿区,85000\r\n\
\r\n\
A2,渋谷レジデンス,東京都渋谷区\r\n\
A3,梅田ハイツ,大阪府大阪市北区,70000\r\n";

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(split_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_line(""), vec![""]);
        assert_eq!(split_line("x,\r"), vec!["x", ""]);
    }

    #[test]
    fn test_parse_csv_header_bom_and_blank_lines() {
        let records = parse_csv(SAMPLE, None).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].text("物件ID").as_deref(), Some("A1"));
        assert_eq!(records[0].text("物件名称").as_deref(), Some("メゾン,新宿"));
        assert_eq!(records[1].text("賃料・価格").as_deref(), Some(""));
    }

    #[test]
    fn test_parse_csv_row_limit() {
        let records = parse_csv(SAMPLE, Some(2)).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_csv_without_header_fails() {
        assert!(matches!(parse_csv("", None), Err(EngineError::Ingestion(_))));
    }

    #[test]
    fn test_missing_path_is_ingestion_error() {
        let loader = PropertyCsvLoader::new("地域");
        let err = loader
            .load(Path::new("/definitely/not/here.csv"), None, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::Ingestion(_)));
    }

    #[test]
    fn test_directory_load_filters_by_region_prefix() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tokyo_2024.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("tokyo_2023.csv"), "物件ID\nT0\n").unwrap();
        fs::write(dir.path().join("osaka.csv"), "物件ID\nO1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loader = PropertyCsvLoader::new("地域");
        let loaded = loader.load(dir.path(), Some("tokyo"), None).unwrap();
        assert_eq!(loaded.regions, vec!["tokyo_2023", "tokyo_2024"]);
        assert_eq!(loaded.count(), 4);
        assert_eq!(loaded.records[0].text("地域").as_deref(), Some("tokyo_2023"));

        let all = loader.load(dir.path(), None, Some(1)).unwrap();
        assert_eq!(all.regions.len(), 3);
        assert_eq!(all.count(), 3);
    }

    #[test]
    fn test_single_file_region_is_file_stem() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("fukuoka.csv");
        fs::write(&file, "物件ID,賃料・価格\nF1,60000\n").unwrap();

        let loaded = PropertyCsvLoader::new("地域").load(&file, None, None).unwrap();
        assert_eq!(loaded.regions, vec!["fukuoka"]);
        assert_eq!(loaded.records[0].text("地域").as_deref(), Some("fukuoka"));
    }
}

//! Filesystem adapter for loading feature samples.
//!
//! Recognised inputs:
//! - `.jsonl` / `.ndjson`: one record per line
//! - `.json`: an array of records
//! - `.csv`: recorded datasets with one column per blend shape and frame
//! - `-`: JSON Lines on stdin
//!
//! A record is a plain array of 51 scores, a list of MediaPipe categories, a
//! `{ name: score }` map, or an object `{ "features": ..., "label": ... }`
//! wrapping any of those.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blem_core::{
    extract_features, BlendShape, Expression, FeatureSample, FeatureSource, BLENDSHAPE_NAMES,
};
use serde::Deserialize;
use tracing::{debug, warn};

const JSON_LINES_EXTENSIONS: &[&str] = &["jsonl", "ndjson"];
const JSON_EXTENSIONS: &[&str] = &["json"];
const CSV_EXTENSIONS: &[&str] = &["csv"];

/// Path that selects standard input.
const STDIN_PATH: &str = "-";

/// Filesystem feature source adapter.
pub struct FsFeatureSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsFeatureSource {
    /// Creates a new filesystem feature source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan; `-` reads stdin
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all supported files from the configured paths.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.as_os_str() == STDIN_PATH {
                files.push(path.clone());
            } else if path.is_file() {
                if Format::of(path).is_some() {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && Format::of(&path).is_some() {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl FeatureSource for FsFeatureSource {
    fn samples(&self) -> Box<dyn Iterator<Item = Result<FeatureSample>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} feature files", files.len());

        Box::new(files.into_iter().flat_map(|path| load_file(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    JsonLines,
    Json,
    Csv,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if JSON_LINES_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::JsonLines)
        } else if JSON_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Json)
        } else if CSV_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Csv)
        } else {
            None
        }
    }
}

/// Feature values in any of the accepted layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Features {
    Vector(Vec<f32>),
    Categories(Vec<BlendShape>),
    Named(HashMap<String, f32>),
}

impl Features {
    fn into_vec(self) -> Vec<f32> {
        match self {
            Self::Vector(v) => v,
            Self::Categories(c) => extract_features(c.iter().map(|b| (b.name.as_str(), b.score))),
            Self::Named(m) => extract_features(m.iter().map(|(k, v)| (k.as_str(), *v))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Record {
    Labeled {
        features: Features,
        label: Option<String>,
    },
    Bare(Features),
}

impl Record {
    fn into_sample(self, source: &str, index: usize) -> Result<FeatureSample> {
        let (features, label) = match self {
            Self::Labeled { features, label } => (features, label),
            Self::Bare(features) => (features, None),
        };
        let label = label
            .map(|l| l.parse::<Expression>())
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(FeatureSample::new(source, index, features.into_vec()).with_label(label))
    }
}

/// Loads every sample in a file. Failures are returned per sample.
fn load_file(path: &Path) -> Vec<Result<FeatureSample>> {
    let source = path.to_string_lossy().into_owned();

    if path.as_os_str() == STDIN_PATH {
        let mut content = String::new();
        return match std::io::stdin().read_to_string(&mut content) {
            Ok(_) => parse_json_lines(&content, "stdin"),
            Err(e) => vec![Err(anyhow::Error::new(e).context("Failed to read stdin"))],
        };
    }

    let result = match Format::of(path) {
        Some(Format::Csv) => return load_csv(path),
        Some(Format::Json) => std::fs::read_to_string(path).map(|c| parse_json_array(&c, &source)),
        Some(Format::JsonLines) => {
            std::fs::read_to_string(path).map(|c| parse_json_lines(&c, &source))
        }
        None => return vec![Err(anyhow::anyhow!("Unsupported file type: {source}"))],
    };

    result.unwrap_or_else(|e| {
        vec![Err(anyhow::Error::new(e).context(format!("Failed to read {source}")))]
    })
}

/// Parses one record per non-empty line.
fn parse_json_lines(content: &str, source: &str) -> Vec<Result<FeatureSample>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .enumerate()
        .map(|(index, (line_no, line))| {
            serde_json::from_str::<Record>(line)
                .with_context(|| format!("{source}:{}: invalid feature record", line_no + 1))
                .and_then(|r| r.into_sample(source, index))
        })
        .collect()
}

/// Parses a top-level JSON array of records.
fn parse_json_array(content: &str, source: &str) -> Vec<Result<FeatureSample>> {
    match serde_json::from_str::<Vec<serde_json::Value>>(content) {
        Ok(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<Record>(value)
                    .with_context(|| format!("{source}[{index}]: invalid feature record"))
                    .and_then(|r| r.into_sample(source, index))
            })
            .collect(),
        Err(e) => vec![Err(
            anyhow::Error::new(e).context(format!("{source}: expected a JSON array of records"))
        )],
    }
}

/// Column positions of a recorded CSV dataset.
///
/// Recordings repeat the full set of blend-shape columns once per frame, so
/// one row can hold several samples.
#[derive(Debug)]
struct CsvLayout {
    /// `frames[f][i]` is the column of blend shape `i` in frame `f`.
    frames: Vec<Vec<usize>>,
    label: Option<usize>,
}

impl CsvLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut per_name: Vec<Vec<usize>> = Vec::with_capacity(BLENDSHAPE_NAMES.len());
        for name in BLENDSHAPE_NAMES {
            let columns: Vec<usize> = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim() == name)
                .map(|(i, _)| i)
                .collect();
            if columns.is_empty() {
                anyhow::bail!("missing column '{name}'");
            }
            per_name.push(columns);
        }

        let frame_count = per_name.iter().map(Vec::len).min().unwrap_or(0);
        let frames = (0..frame_count)
            .map(|f| per_name.iter().map(|cols| cols[f]).collect())
            .collect();
        let label = headers.iter().position(|h| h.trim() == "label");

        Ok(Self { frames, label })
    }
}

fn load_csv(path: &Path) -> Vec<Result<FeatureSample>> {
    let source = path.to_string_lossy().into_owned();

    let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(r) => r,
        Err(e) => {
            return vec![Err(
                anyhow::Error::new(e).context(format!("Failed to read {source}"))
            )]
        }
    };

    let layout = match reader
        .headers()
        .map_err(anyhow::Error::new)
        .and_then(CsvLayout::from_headers)
    {
        Ok(l) => l,
        Err(e) => return vec![Err(e.context(format!("{source}: unrecognised CSV header")))],
    };
    debug!("{source}: {} frame(s) per row", layout.frames.len());

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                let context = format!("{source}: row {}", row + 1);
                samples.push(Err(anyhow::Error::new(e).context(context)));
                continue;
            }
        };

        let label = match layout.label.and_then(|i| record.get(i)) {
            Some(l) if !l.trim().is_empty() => match l.parse::<Expression>() {
                Ok(e) => Some(e),
                Err(e) => {
                    samples.push(Err(anyhow::anyhow!("{source}: row {}: {e}", row + 1)));
                    continue;
                }
            },
            _ => None,
        };

        for (frame, columns) in layout.frames.iter().enumerate() {
            let index = row * layout.frames.len() + frame;
            // Recordings end with a partial row; absent frames are not samples.
            if columns
                .iter()
                .all(|&c| record.get(c).map_or(true, |cell| cell.trim().is_empty()))
            {
                debug!("{source}: row {}, frame {frame}: empty, skipped", row + 1);
                continue;
            }
            let values: Result<Vec<f32>> = columns
                .iter()
                .map(|&c| {
                    let cell = record.get(c).unwrap_or("").trim();
                    cell.parse::<f32>().with_context(|| {
                        format!(
                            "{source}: row {}, column {}: invalid score '{cell}'",
                            row + 1,
                            c + 1
                        )
                    })
                })
                .collect();
            samples.push(
                values.map(|v| FeatureSample::new(source.clone(), index, v).with_label(label)),
            );
        }
    }

    samples
}

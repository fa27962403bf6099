use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub search: SearchTelemetrySummary,
    pub hands: HandTelemetrySummary,
}

#[derive(Debug, Default, Serialize)]
pub struct SearchTelemetrySummary {
    pub decisions: usize,
    pub avg_iterations: Option<f64>,
    pub avg_elapsed_ms: Option<f64>,
    pub avg_candidates: Option<f64>,
    /// Decisions where void constraints had to be dropped for some worlds.
    pub void_fallbacks: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct HandTelemetrySummary {
    pub count: usize,
    pub contracts: BTreeMap<String, usize>,
    pub kaboots: usize,
    pub khasaras: usize,
}

#[derive(Debug)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregate search and per-hand events from a JSON tracing log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut search = SearchTelemetrySummary::default();
    let mut iterations = Average::new();
    let mut elapsed = Average::new();
    let mut candidates = Average::new();
    let mut hands = HandTelemetrySummary::default();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let level = payload
            .get("level")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match target {
            "baloot_bot::search" if level == "WARN" => {
                search.void_fallbacks += 1;
            }
            "baloot_bot::search" => {
                search.decisions += 1;
                if let Some(value) = fields.get("iterations").and_then(Value::as_f64) {
                    iterations.add(value);
                }
                if let Some(value) = fields.get("elapsed_ms").and_then(Value::as_f64) {
                    elapsed.add(value);
                }
                if let Some(value) = fields.get("candidates").and_then(Value::as_f64) {
                    candidates.add(value);
                }
            }
            "baloot_bench::hand" => {
                hands.count += 1;
                let contract = fields
                    .get("contract")
                    .and_then(Value::as_str)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .unwrap_or("<unset>");
                *hands.contracts.entry(contract.to_string()).or_insert(0) += 1;
                if fields.get("kaboot").and_then(Value::as_bool) == Some(true) {
                    hands.kaboots += 1;
                }
                if fields.get("khasara").and_then(Value::as_bool) == Some(true) {
                    hands.khasaras += 1;
                }
            }
            _ => {}
        }
    }

    search.avg_iterations = iterations.mean();
    search.avg_elapsed_ms = elapsed.mean();
    search.avg_candidates = candidates.mean();

    Ok(TelemetrySummary { search, hands })
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(
        &json_path,
        serde_json::to_vec_pretty(&summary).map_err(TelemetryError::from)?,
    )
    .map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary json",
        source,
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    push_search_lines(&mut section, &outputs.summary.search);
    section.push_str(&format!(
        "- Hands logged: {} ({} kaboot, {} khasara)\n",
        outputs.summary.hands.count, outputs.summary.hands.kaboots, outputs.summary.hands.khasaras
    ));

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn push_search_lines(output: &mut String, search: &SearchTelemetrySummary) {
    output.push_str(&format!("- Search decisions: {}\n", search.decisions));
    if let Some(value) = search.avg_iterations {
        output.push_str(&format!("- Avg iterations: {:.1}\n", value));
    }
    if let Some(value) = search.avg_candidates {
        output.push_str(&format!("- Avg candidates: {:.2}\n", value));
    }
    if let Some(value) = search.avg_elapsed_ms {
        output.push_str(&format!("- Avg search time: {:.2} ms\n", value));
    }
    if search.void_fallbacks > 0 {
        output.push_str(&format!(
            "- Void-constraint fallbacks: {}\n",
            search.void_fallbacks
        ));
    }
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push('\n');

    output.push_str("## Search Decisions\n");
    push_search_lines(&mut output, &summary.search);
    output.push('\n');

    output.push_str("## Hands\n");
    output.push_str(&format!("- Hands: {}\n", summary.hands.count));
    output.push_str(&format!("- Kaboots: {}\n", summary.hands.kaboots));
    output.push_str(&format!("- Khasaras: {}\n", summary.hands.khasaras));
    if summary.hands.contracts.is_empty() {
        output.push_str("- Contracts: <none>\n");
    } else {
        output.push_str("- Contracts:\n");
        for (label, count) in &summary.hands.contracts {
            output.push_str(&format!("  - {}: {}\n", label, count));
        }
    }
    output
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    #[test]
    fn summarises_search_and_hand_events() {
        let lines = vec![
            r#"{"level":"DEBUG","target":"baloot_bot::search","fields":{"iterations":400,"elapsed_ms":12,"candidates":4}}"#,
            r#"{"level":"DEBUG","target":"baloot_bot::search","fields":{"iterations":200,"elapsed_ms":8,"candidates":2}}"#,
            r#"{"level":"WARN","target":"baloot_bot::search","fields":{"message":"void constraints unsatisfiable","fallbacks":3}}"#,
            r#"{"level":"INFO","target":"baloot_bench::hand","fields":{"contract":"hokum(H)","kaboot":true,"khasara":false}}"#,
            r#"{"level":"INFO","target":"baloot_bench::hand","fields":{"contract":"sun","kaboot":false,"khasara":true}}"#,
            r#"{"level":"INFO","target":"baloot_bench::play","fields":{"card":"AS"}}"#,
        ];
        let file = write_temp_file(&lines);
        let summary = summarise_telemetry(file.path()).expect("summarise");
        assert_eq!(summary.search.decisions, 2);
        assert_eq!(summary.search.void_fallbacks, 1);
        assert!((summary.search.avg_iterations.unwrap() - 300.0).abs() < 1e-9);
        assert!((summary.search.avg_elapsed_ms.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(summary.hands.count, 2);
        assert_eq!(summary.hands.kaboots, 1);
        assert_eq!(summary.hands.khasaras, 1);
        assert_eq!(summary.hands.contracts.get("hokum(H)"), Some(&1));
        assert_eq!(summary.hands.contracts.get("sun"), Some(&1));
    }

    #[test]
    fn handles_missing_file() {
        let path = Path::new("tests/does/not/exist.jsonl");
        let summary = summarise_telemetry(path).expect("summarise missing file");
        assert_eq!(summary.search.decisions, 0);
        assert!(summary.search.avg_iterations.is_none());
        assert!(summary.hands.contracts.is_empty());
    }

    #[test]
    fn appends_highlights_to_summary_markdown() {
        let mut summary_file = tempfile::NamedTempFile::new().expect("summary temp file");
        writeln!(summary_file, "# Tournament Summary").expect("seed summary content");
        let telemetry_json = tempfile::NamedTempFile::new().expect("telemetry json temp");
        let telemetry_md = tempfile::NamedTempFile::new().expect("telemetry md temp");

        let outputs = TelemetryOutputs {
            summary: TelemetrySummary {
                search: SearchTelemetrySummary {
                    decisions: 16,
                    avg_iterations: Some(400.0),
                    avg_elapsed_ms: Some(3.25),
                    avg_candidates: Some(3.5),
                    void_fallbacks: 2,
                },
                hands: HandTelemetrySummary {
                    count: 4,
                    contracts: BTreeMap::new(),
                    kaboots: 1,
                    khasaras: 0,
                },
            },
            json_path: telemetry_json.path().to_path_buf(),
            markdown_path: telemetry_md.path().to_path_buf(),
        };

        append_highlights_to_markdown(summary_file.path(), &outputs).expect("append highlights");

        let contents = std::fs::read_to_string(summary_file.path()).expect("read summary file");
        assert!(contents.contains("## Telemetry Highlights"));
        assert!(contents.contains("Search decisions: 16"));
        assert!(contents.contains("Avg search time: 3.25 ms"));
        assert!(contents.contains("Void-constraint fallbacks: 2"));
        assert!(contents.contains("Hands logged: 4 (1 kaboot, 0 khasara)"));
    }
}

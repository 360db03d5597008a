//! # attendance-viz
//!
//! Chart specifications for attendance reports.
//!
//! A [`ChartSpec`] serializes to JSON and renders as a self-contained HTML
//! page drawing the chart with Chart.js. [`ChartSpec::save`] writes both
//! next to each other.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from chart serialization and output.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Chart serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write chart file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset '{label}' has {actual} values for {expected} labels")]
    LengthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, VizError>;

/// Green used for visits that went through the technician.
pub const MATCHED_COLOR: &str = "#2ecc71";
/// Red used for visits that skipped the technician.
pub const BYPASSED_COLOR: &str = "#e74c3c";

/// Chart specification for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

impl ChartKind {
    fn chart_js_type(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
        }
    }
}

/// Chart data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// One color for the whole dataset, or one per bar.
    #[serde(rename = "backgroundColor", skip_serializing_if = "Vec::is_empty", default)]
    pub background_color: Vec<String>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: &str) -> Self {
        self.background_color = vec![color.to_string()];
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.background_color = colors.iter().map(|c| (*c).to_string()).collect();
        self
    }
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub show_legend: bool,
    pub stacked: bool,
    pub horizontal: bool,
}

/// Paths written by [`ChartSpec::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFiles {
    pub html: PathBuf,
    pub json: PathBuf,
}

/// Escape HTML special characters to prevent XSS.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Make a label safe to use as a file stem: `<>:"/\|?*` become `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: ChartData::default(),
            options: ChartOptions::default(),
        }
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Add a dataset. It must have one value per label.
    pub fn push_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if dataset.data.len() != self.data.labels.len() {
            return Err(VizError::LengthMismatch {
                label: dataset.label,
                expected: self.data.labels.len(),
                actual: dataset.data.len(),
            });
        }
        self.data.datasets.push(dataset);
        Ok(())
    }

    #[must_use]
    pub fn with_options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }

    /// Convert to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate HTML with embedded Chart.js.
    pub fn to_html(&self) -> Result<String> {
        let title = escape_html(&self.title);
        // Prevent script tag breakout
        let json = serde_json::to_string(self)?.replace("</", "<\\/");
        let chart_type = self.chart_type.chart_js_type();
        let index_axis = if self.options.horizontal { "y" } else { "x" };

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <canvas id="chart"></canvas>
    <script>
        const spec = {json};
        const axis = (label) => ({{
            stacked: spec.options.stacked,
            title: {{ display: !!label, text: label || '' }}
        }});
        const ctx = document.getElementById('chart').getContext('2d');
        new Chart(ctx, {{
            type: '{chart_type}',
            data: spec.data,
            options: {{
                responsive: true,
                indexAxis: '{index_axis}',
                scales: {{
                    x: axis(spec.options.x_axis_label),
                    y: axis(spec.options.y_axis_label)
                }},
                plugins: {{
                    title: {{
                        display: true,
                        text: spec.title
                    }},
                    subtitle: {{
                        display: !!spec.options.subtitle,
                        text: spec.options.subtitle || ''
                    }},
                    legend: {{
                        display: spec.options.show_legend
                    }}
                }}
            }}
        }});
    </script>
</body>
</html>"#
        ))
    }

    /// Write `<stem>.html` and `<stem>.json` into `dir`, creating it if needed.
    ///
    /// The stem is sanitized with [`sanitize_file_stem`].
    pub fn save(&self, dir: &Path, stem: &str) -> Result<ChartFiles> {
        std::fs::create_dir_all(dir)?;
        let stem = sanitize_file_stem(stem);

        let files = ChartFiles {
            html: dir.join(format!("{stem}.html")),
            json: dir.join(format!("{stem}.json")),
        };
        std::fs::write(&files.html, self.to_html()?)?;
        std::fs::write(&files.json, self.to_json()?)?;
        Ok(files)
    }
}

use chrono::NaiveDate;
use serde::Serialize;

// Plotly figure description. The page hands these straight to Plotly.newPlot,
// so field names follow plotly.js attribute names.

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

impl Trace {
    pub fn line(name: impl Into<String>, x: Vec<NaiveDate>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter",
            mode: "lines",
            name: name.into(),
            x,
            y,
            line: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.line.get_or_insert_with(LineStyle::default).width = Some(width);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

impl From<&str> for Title {
    fn from(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

impl From<String> for Title {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

impl Axis {
    pub fn titled(text: &str) -> Self {
        Self {
            title: text.into(),
            rangeslider: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

/// A layout shape. Only full-width horizontal guide lines are used.
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub yref: &'static str,
    pub y0: f64,
    pub y1: f64,
    pub line: LineStyle,
}

impl Shape {
    pub fn hline(y: f64, color: &'static str) -> Self {
        Self {
            kind: "line",
            xref: "paper",
            x0: 0.0,
            x1: 1.0,
            yref: "y",
            y0: y,
            y1: y,
            line: LineStyle {
                width: None,
                dash: Some("dash"),
                color: Some(color),
            },
        }
    }
}

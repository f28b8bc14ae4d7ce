//! Renderer export - data traces, layouts and plot config as JSON
//!
//! The document mirrors what a Plotly front end consumes: `data`/`data3d`
//! trace arrays with live marker styling, `layout`/`layout3d`, and `config`.

use serde::Serialize;
use std::path::Path;

use crate::layout::{Layout2D, Layout3D, PlotConfig};
use crate::marker::{HexColor, OPACITY, OUTLINE_WIDTH};
use crate::state::{PlotKind, Trace, ViewerState};

#[derive(Debug, Serialize)]
pub struct MarkerLine<'a> {
    pub color: &'a [HexColor],
    pub width: f32,
}

#[derive(Debug, Serialize)]
pub struct MarkerDoc<'a> {
    pub size: &'a [f32],
    pub color: &'a [HexColor],
    pub opacity: f32,
    pub line: MarkerLine<'a>,
}

#[derive(Debug, Serialize)]
pub struct TraceDoc<'a> {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    #[serde(rename = "imgURLs")]
    pub img_urls: Vec<&'a str>,
    pub name: &'a str,
    pub marker: MarkerDoc<'a>,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    #[serde(rename = "hoverinfo")]
    pub hover_info: &'static str,
}

impl<'a> From<Trace<'a>> for TraceDoc<'a> {
    fn from(t: Trace<'a>) -> Self {
        let points = &t.series.points;
        let (trace_type, hover_info) = match t.kind {
            PlotKind::Scatter2D => ("scatter", "x+y"),
            PlotKind::Scatter3D => ("scatter3d", "x+y+z"),
        };
        Self {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            z: points.iter().map(|p| p.z).collect(),
            img_urls: points.iter().map(|p| p.image_file.as_str()).collect(),
            name: &t.series.name,
            marker: MarkerDoc {
                size: t.marker.sizes(),
                color: t.marker.base_colors(),
                opacity: OPACITY,
                line: MarkerLine {
                    color: t.marker.highlight_colors(),
                    width: OUTLINE_WIDTH,
                },
            },
            mode: "markers",
            trace_type,
            hover_info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenderDoc<'a> {
    pub generated: String,
    pub data: Vec<TraceDoc<'a>>,
    pub data3d: Vec<TraceDoc<'a>>,
    pub layout: &'a Layout2D,
    pub layout3d: &'a Layout3D,
    pub config: &'a PlotConfig,
}

/// Snapshot the renderer outputs of `state`
pub fn render_doc(state: &ViewerState) -> RenderDoc<'_> {
    let traces = |kind| -> Vec<TraceDoc<'_>> {
        state.traces(kind).into_iter().map(TraceDoc::from).collect()
    };
    RenderDoc {
        generated: chrono::Local::now().to_rfc3339(),
        data: traces(PlotKind::Scatter2D),
        data3d: traces(PlotKind::Scatter3D),
        layout: state.layout_2d(),
        layout3d: state.layout_3d(),
        config: state.plot_config(),
    }
}

/// Write the renderer outputs as pretty JSON
pub fn write(state: &ViewerState, path: &Path) -> anyhow::Result<()> {
    let doc = render_doc(state);
    std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    tracing::info!("Wrote {} traces to {}", doc.data.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::Dataset;
    use crate::selection::{PointRef, LEFT_HIGHLIGHT};
    use crate::state::Action;

    #[test]
    fn test_export_carries_live_marker_styling() {
        let config = Config::default();
        let mut state = ViewerState::new(Dataset::builtin(&config), &config);
        state.apply(Action::PointClicked(PointRef::new(1, 4))).unwrap();

        let json = serde_json::to_value(render_doc(&state)).unwrap();
        for key in ["data", "data3d"] {
            let trace = &json[key][1];
            assert_eq!(trace["marker"]["size"][4], 18.0);
            assert_eq!(trace["marker"]["line"]["color"][4], LEFT_HIGHLIGHT.to_string());
            assert_eq!(trace["marker"]["line"]["color"][3], trace["marker"]["color"][3]);
            assert_eq!(trace["marker"]["line"]["width"], 4.0);
            assert_eq!(trace["imgURLs"][4], "10.png");
        }
        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data3d"][0]["type"], "scatter3d");
        assert_eq!(json["data3d"][0]["hoverinfo"], "x+y+z");
        assert_eq!(json["layout"]["datarevision"], 1);
        assert_eq!(json["layout3d"]["datarevision"], 1);
        assert_eq!(json["config"]["displayModeBar"], false);
    }
}

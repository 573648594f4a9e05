//! Console and JSON output for scenario runs and selections.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use markers::MarkerSnapshot;

use crate::scenario::StepSummary;

/// Formats run output.
pub struct RunReport;

impl RunReport {
    /// One row per scenario step.
    pub fn format_steps(name: &str, steps: &[StepSummary]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                format!("Scenario: {}", name),
                "Zoom".to_string(),
                "Date".to_string(),
                "Selected".to_string(),
                "Created".to_string(),
                "Hidden".to_string(),
                "Fetched".to_string(),
                "Cache hits".to_string(),
                "Failed".to_string(),
                "Wind".to_string(),
                "Frames".to_string(),
                "Painted px".to_string(),
            ]);

        for s in steps {
            let wind = if s.rate_limited {
                format!("{} (limited)", s.wind_samples)
            } else {
                s.wind_samples.to_string()
            };
            table.add_row(vec![
                format!("#{}", s.step),
                s.zoom.to_string(),
                s.active_date.map(|d| d.to_string()).unwrap_or_default(),
                s.selected.to_string(),
                s.created.to_string(),
                s.hidden.to_string(),
                s.fetched.to_string(),
                s.cache_hits.to_string(),
                s.failed.to_string(),
                wind,
                s.frames.to_string(),
                s.painted_pixels.to_string(),
            ]);
        }

        table.to_string()
    }

    /// Selected markers, nearest the center first.
    pub fn format_markers(markers: &[MarkerSnapshot]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Id", "Code", "Name", "Lat", "Lng", "Value", "Color"]);

        for m in markers {
            table.add_row(vec![
                m.id.to_string(),
                m.code.clone(),
                m.name.clone(),
                format!("{:.4}", m.position.lat),
                format!("{:.4}", m.position.lng),
                m.value.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".to_string()),
                m.color.to_string(),
            ]);
        }

        table.to_string()
    }

    pub fn format_json(steps: &[StepSummary]) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(steps)?)
    }
}

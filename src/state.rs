use std::path::Path;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::loader::load_file;
use crate::data::model::{Dataset, RangeOption, ViewInput, AGGREGATE_REGIONS};
use crate::data::prepare::prepare;
use crate::data::query::{query, ViewOutput};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Prepared dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current control values. Widgets write here.
    pub input: ViewInput,

    /// Output of the last query and the input it was computed for.
    output: ViewOutput,
    computed_for: Option<ViewInput>,

    /// Colour per aggregate region, shared by all charts.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            input: ViewInput::default(),
            output: ViewOutput::default(),
            computed_for: None,
            color_map: ColorMap::new(AGGREGATE_REGIONS),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load and prepare `path`, replacing the current dataset on success.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let raw = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        let dataset = prepare(raw);
        if dataset.is_empty() {
            log::warn!("{} contains no rows", path.display());
        }
        log::info!(
            "Loaded {} rows from {} (years {:?})",
            dataset.len(),
            path.display(),
            dataset.year_range()
        );
        self.set_dataset(dataset);
        Ok(())
    }

    /// Install a prepared dataset and drop the cached view.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.computed_for = None;
        self.status_message = None;
        self.refresh();
    }

    /// Re-run the query if the controls changed since the last run.
    /// Returns whether a query actually ran.
    pub fn refresh(&mut self) -> bool {
        let Some(ds) = &self.dataset else {
            return false;
        };
        if self.computed_for.as_ref() == Some(&self.input) {
            return false;
        }
        log::debug!("Recomputing view for {:?}", self.input);
        self.output = query(ds, &self.input);
        self.computed_for = Some(self.input.clone());
        true
    }

    /// Flip a checklist option and recompute, so the readout drawn right
    /// after the checkbox already reflects it.
    pub fn toggle_range_option(&mut self, option: RangeOption) {
        self.input.toggle(option);
        self.refresh();
    }

    /// Output for the current controls.
    pub fn output(&self) -> &ViewOutput {
        &self.output
    }

    /// Serialize the current view as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        #[derive(serde::Serialize)]
        struct Export<'a> {
            input: &'a ViewInput,
            output: &'a ViewOutput,
        }
        serde_json::to_string_pretty(&Export {
            input: &self.input,
            output: &self.output,
        })
        .context("serializing view")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawRecord;

    fn dataset() -> Dataset {
        prepare(vec![
            RawRecord {
                country: Some("World".to_string()),
                year: Some(1850),
                co2: Some(12.0),
                ..Default::default()
            },
            RawRecord {
                country: Some("Asia".to_string()),
                year: Some(1850),
                co2: Some(4.0),
                co2_per_capita: Some(0.1),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn test_refresh_only_on_input_change() {
        let mut state = AppState::default();
        assert!(!state.refresh());

        state.set_dataset(dataset());
        assert_eq!(state.output().timeline.len(), 2);
        assert!(!state.refresh());

        state.input.toggle(RangeOption::Max);
        assert!(state.refresh());
        assert_eq!(state.output().range_text, "The Max CO2 is: 12. ");
        assert!(!state.refresh());
    }

    #[test]
    fn test_toggle_range_option_updates_text_immediately() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert_eq!(state.output().range_text, "");

        state.toggle_range_option(RangeOption::Min);
        assert_eq!(state.output().range_text, "The Min CO2 is: 4. ");
        assert!(!state.refresh());

        state.toggle_range_option(RangeOption::Min);
        assert_eq!(state.output().range_text, "");
    }

    #[test]
    fn test_set_dataset_invalidates_cache() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.set_dataset(Dataset::default());
        assert!(state.output().timeline.is_empty());
    }

    #[test]
    fn test_load_path_failure_keeps_dataset() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert!(state.load_path(Path::new("/nonexistent/data.csv")).is_err());
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(2));
    }

    #[test]
    fn test_export_json_contains_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        let json = state.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["input"]["year"], 1850);
        assert_eq!(value["input"]["source"], "coal_co2");
        assert_eq!(value["output"]["per_capita_pie"][0]["region"], "Asia");
    }
}

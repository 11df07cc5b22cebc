//! List Command

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use parabank_e2e::suite::SuiteContext;
use parabank_e2e::{OfflineDriver, RunContext, RunnerConfig, SuiteEntry, CATALOG};

use crate::output::{print_list, OutputFormat, TableDisplay};

/// Catalog entry display wrapper
#[derive(Serialize)]
pub struct EntryDisplay {
    pub position: usize,
    pub name: String,
    pub module_id: String,
    pub cases: Option<usize>,
}

impl EntryDisplay {
    /// Build the entry's suite offline to count its cases
    fn describe(position: usize, entry: &SuiteEntry, run: &RunContext) -> Self {
        let ctx = SuiteContext {
            name: entry.name,
            module_id: entry.module_id,
            run,
        };

        Self {
            position,
            name: entry.name.to_string(),
            module_id: entry.module_id.to_string(),
            cases: (entry.factory)(&ctx).ok().map(|suite| suite.len()),
        }
    }
}

impl TableDisplay for EntryDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Suite", "Module", "Cases"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.position.to_string(),
            self.name.clone(),
            self.module_id.clone(),
            self.cases
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unavailable".to_string()),
        ]
    }
}

pub fn execute(config: &RunnerConfig, format: OutputFormat) -> Result<()> {
    let run = RunContext::new(Arc::new(OfflineDriver::new()), config);
    let entries: Vec<EntryDisplay> = CATALOG
        .iter()
        .enumerate()
        .map(|(i, entry)| EntryDisplay::describe(i + 1, entry, &run))
        .collect();

    print_list(&entries, format);
    Ok(())
}

use super::{PersistenceError, PersistenceResult};
use crate::config::EstimationConfig;
use crate::estimate::AggregateEstimate;
use crate::simulation::TrialBatch;
use crate::work_item_validation::{NormalizedItems, normalize_json_items};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Reads and normalizes a JSON array of work items. Elements that are not
/// valid work items are skipped and reported; only a document that is not a
/// JSON array fails.
pub fn load_work_items_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<NormalizedItems> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let raw: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))?;
    let normalized = normalize_json_items(raw);
    debug!(
        path = %path.display(),
        items = normalized.items.len(),
        skipped = normalized.skipped.len(),
        "loaded work items"
    );
    Ok(normalized)
}

/// Reads and validates an estimation config. Absent fields take defaults.
pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<EstimationConfig> {
    let file = File::open(path)?;
    let config: EstimationConfig = serde_json::from_reader(BufReader::new(file))?;
    config.validate()?;
    Ok(config)
}

pub fn save_estimate_to_json<P: AsRef<Path>>(
    estimate: &AggregateEstimate,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, estimate)?;
    Ok(())
}

/// One row per trial: index, total workdays, horizon flag, then one column
/// per group in `groups` order.
pub fn save_trials_to_csv<P: AsRef<Path>>(
    batch: &TrialBatch,
    groups: &[String],
    path: P,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "trial".to_string(),
        "workdays".to_string(),
        "hit_horizon".to_string(),
    ];
    header.extend(groups.iter().cloned());
    writer.write_record(&header)?;

    for (index, trial) in batch.trials.iter().enumerate() {
        if trial.group_workdays.len() != groups.len() {
            return Err(PersistenceError::InvalidData(format!(
                "trial {index} has {} group columns, expected {}",
                trial.group_workdays.len(),
                groups.len()
            )));
        }
        let mut record = vec![
            index.to_string(),
            trial.workdays.to_string(),
            trial.hit_horizon.to_string(),
        ];
        record.extend(trial.group_workdays.iter().map(|d| d.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

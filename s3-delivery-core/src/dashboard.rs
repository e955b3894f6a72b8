//! Predefined dashboard workbooks and the datasets they are delivered into.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{error, info};

use crate::contract::ObjectStore;
use crate::dataset::Dataset;
use crate::delivery::{deliver_file, DeliveryOptions, DeliveryReport};
use crate::prefix::KeyPrefix;

const DASHBOARD_DIR: &str = r"C:\Users\research\OneDrive - Atlanta Convention & Visitors Bureau\Marketing Dashboard Data\Documents - ACVB Research";

/// A local source file with a fixed destination dataset.
#[derive(Debug, Clone)]
pub struct DashboardFile {
    pub path: PathBuf,
    pub dataset: Dataset,
    pub description: String,
}

/// The two dashboard mappings delivered by `upload-dashboard`.
pub fn dashboard_files() -> Vec<DashboardFile> {
    vec![
        DashboardFile {
            path: PathBuf::from(format!(r"{DASHBOARD_DIR}\Discover Atlanta KPI Dashboard.xlsx")),
            dataset: Dataset::Winistry,
            description: "Discover Atlanta KPI Dashboard".to_string(),
        },
        DashboardFile {
            path: PathBuf::from(format!(
                r"{DASHBOARD_DIR}\Discover Atlanta - Monthly Data Report.xlsx"
            )),
            dataset: Dataset::Sparkloft,
            description: "Discover Atlanta Monthly Data Report".to_string(),
        },
    ]
}

/// Delivers each mapping under its dataset's prefix for `delivery_date`.
/// A missing source file is logged and skipped; the other mappings still run.
/// Uploads here are sequential, so `options.processes` is unused.
pub async fn deliver_dashboard<S>(
    store: &S,
    files: &[DashboardFile],
    delivery_date: NaiveDate,
    options: &DeliveryOptions,
) -> DeliveryReport
where
    S: ObjectStore + ?Sized,
{
    info!(mappings = files.len(), "Starting predefined dashboard file uploads");
    let mut report = DeliveryReport::default();

    for mapping in files {
        info!(
            description = %mapping.description,
            dataset = %mapping.dataset,
            "Processing dashboard file"
        );
        if !mapping.path.is_file() {
            error!(path = %mapping.path.display(), "File not found");
            report.missing_sources += 1;
            continue;
        }

        let prefix = KeyPrefix::new(mapping.dataset, delivery_date);
        report.merge(deliver_file(store, &prefix, &mapping.path, options.dry_run).await);
    }

    info!("Dashboard file uploads completed");
    report.trace();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_maps_one_workbook_per_dataset() {
        let files = dashboard_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].dataset, Dataset::Winistry);
        assert_eq!(files[1].dataset, Dataset::Sparkloft);
        assert!(files
            .iter()
            .all(|f| crate::discover::is_spreadsheet(&f.path)));
    }
}

use crate::error::ApimResult;
use crate::models::Platform;
use crate::report::Report;
use crate::store::Store;

/// Remove the local subtree of one platform.
pub fn clean_local(store: &Store, platform: Platform) -> ApimResult<Report> {
    let mut report = Report::new();
    if store.clean_platform(platform)? {
        report.line(format!("Removed local {} data.", platform));
    } else {
        report.line(format!("No local {} data to remove.", platform));
    }
    Ok(report)
}

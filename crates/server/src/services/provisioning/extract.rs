//! Worksheet rows to user records.

use thiserror::Error;

use tableau_provisioner_core::{DataTable, UserRecord};

/// Columns every provisioning worksheet must carry, matched exactly.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "fullName", "siteRole", "authSetting"];

/// The worksheet lacks one or more required columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Worksheet {sheet} is missing the following data fields: {}", .fields.join(", "))]
pub struct MissingFields {
    pub sheet: String,
    pub fields: Vec<String>,
}

/// Map every row of a worksheet to a record, in row order.
///
/// A row too short for a column yields an empty string for that field.
///
/// # Errors
///
/// Returns [`MissingFields`] naming every required column that is absent.
pub fn extract_users(sheet: &str, table: &DataTable) -> Result<Vec<UserRecord>, MissingFields> {
    let indexes = REQUIRED_FIELDS.map(|field| table.column_index(field));

    let [Some(name), Some(full_name), Some(site_role), Some(auth_setting)] = indexes else {
        return Err(MissingFields {
            sheet: sheet.to_string(),
            fields: REQUIRED_FIELDS
                .iter()
                .zip(indexes)
                .filter(|(_, index)| index.is_none())
                .map(|(field, _)| (*field).to_string())
                .collect(),
        });
    };

    Ok(table
        .data
        .iter()
        .map(|row| UserRecord {
            name: DataTable::cell_text(row, name),
            full_name: DataTable::cell_text(row, full_name),
            site_role: DataTable::cell_text(row, site_role),
            auth_setting: DataTable::cell_text(row, auth_setting),
        })
        .collect())
}

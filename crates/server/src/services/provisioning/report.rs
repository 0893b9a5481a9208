//! The single aggregate notification ending a run.

use tableau_provisioner_core::{FailedUser, Notification, ProvisionedUser};

/// Summarize final outcomes.
///
/// Every user lands in exactly one of the success count or the itemized
/// failures. No users at all reports a success with a count of zero.
#[must_use]
pub fn summarize(users: &[ProvisionedUser]) -> Notification {
    let failures: Vec<FailedUser> = users
        .iter()
        .filter_map(|user| {
            user.outcome.error().map(|error| FailedUser {
                name: user.record.name.clone(),
                error: error.to_string(),
            })
        })
        .collect();
    let added = users.iter().filter(|user| !user.outcome.is_failed()).count();

    if failures.is_empty() {
        Notification::success(format!("{added} users added to Tableau successfully"))
    } else if added > 0 {
        Notification::warning(
            format!(
                "{added} users added to Tableau successfully, but the following users were unable to be added:"
            ),
            failures,
        )
    } else {
        Notification::error("No users were added to Tableau successfully:").with_failures(failures)
    }
}

#[cfg(test)]
mod tests {
    use tableau_provisioner_core::{NotificationLevel, UserOutcome, UserRecord};

    use super::*;

    fn user(name: &str, outcome: UserOutcome) -> ProvisionedUser {
        ProvisionedUser {
            record: UserRecord {
                name: name.to_string(),
                full_name: String::new(),
                site_role: "Viewer".to_string(),
                auth_setting: "ServerDefault".to_string(),
            },
            outcome,
        }
    }

    fn ok(name: &str) -> ProvisionedUser {
        user(
            name,
            UserOutcome::Provisioned {
                id: format!("id-{name}"),
            },
        )
    }

    #[test]
    fn test_all_success() {
        let report = summarize(&[ok("a"), ok("b"), ok("c")]);
        assert_eq!(report.level, NotificationLevel::Success);
        assert_eq!(report.message, "3 users added to Tableau successfully");
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_partial_success() {
        let report = summarize(&[
            ok("a"),
            user("b", UserOutcome::failed("already exists")),
            ok("c"),
        ]);
        assert_eq!(report.level, NotificationLevel::Warning);
        assert_eq!(
            report.message,
            "2 users added to Tableau successfully, but the following users were unable to be added:"
        );
        assert_eq!(
            report.failures,
            vec![FailedUser {
                name: "b".to_string(),
                error: "already exists".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_success() {
        let report = summarize(&[
            user("a", UserOutcome::failed("x")),
            user("b", UserOutcome::failed("y")),
        ]);
        assert_eq!(report.level, NotificationLevel::Error);
        assert_eq!(report.message, "No users were added to Tableau successfully:");
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn test_empty_batch_is_success() {
        let report = summarize(&[]);
        assert_eq!(report.level, NotificationLevel::Success);
        assert_eq!(report.message, "0 users added to Tableau successfully");
    }
}

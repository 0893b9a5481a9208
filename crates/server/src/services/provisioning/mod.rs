//! Bulk user provisioning workflow.
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! Idle -> Authenticating -> Extracting -> Creating -> [Updating] -> Reporting -> Complete -> Idle
//! ```
//!
//! `Updating` only happens on Tableau Server; Tableau Cloud's add-user call
//! is sufficient on its own. Sign-in failures and worksheet problems end the
//! run early with one error notification and no user calls. Per-user
//! failures never stop a run; they are itemized in the final report.
//!
//! There are no retries. Per-user calls within a state run concurrently and
//! outcomes are matched back to records by position.

pub mod extract;
pub mod report;

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use tableau_provisioner_core::{
    DeploymentMode, ExtensionSettings, Notification, ProvisionedUser, UserOutcome, UserRecord,
};

pub use extract::{MissingFields, REQUIRED_FIELDS, extract_users};
pub use report::summarize;

use super::directory::DirectoryClient;
use super::notifier::Notifier;
use super::row_source::{RowSource, RowSourceError};
use super::settings_store::{SettingsError, SettingsStore, load_settings};
use crate::tableau::{AuthSession, SignInCredentials, SiteTarget};

/// Failures outside the workflow itself.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("A provisioning run is already in progress")]
    AlreadyRunning,
    #[error("Unable to load settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Unable to read worksheet data: {0}")]
    RowSource(#[from] RowSourceError),
}

/// Why a run stopped before creating any users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("Tableau settings are incomplete. Open the extension settings and fill in every field.")]
    IncompleteSettings,
    #[error("Unable to sign in to Tableau: {0}")]
    SignIn(String),
    #[error("Worksheet {0} could not be found")]
    UnknownWorksheet(String),
    #[error(transparent)]
    MissingFields(#[from] MissingFields),
}

/// Final outcome of every record, in worksheet order, plus the notification
/// that summarized them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub users: Vec<ProvisionedUser>,
    pub notification: Notification,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(ProvisioningReport),
    Aborted(AbortReason),
}

/// Workflow state. Each variant carries what the next step needs.
#[derive(Debug)]
pub enum ProvisioningState {
    Idle,
    Authenticating {
        settings: ExtensionSettings,
    },
    Extracting {
        settings: ExtensionSettings,
        target: SiteTarget,
        session: AuthSession,
    },
    Creating {
        mode: DeploymentMode,
        target: SiteTarget,
        session: AuthSession,
        records: Vec<UserRecord>,
    },
    Updating {
        target: SiteTarget,
        session: AuthSession,
        records: Vec<UserRecord>,
        outcomes: Vec<UserOutcome>,
    },
    Reporting {
        users: Vec<ProvisionedUser>,
    },
    Complete(RunOutcome),
}

/// Runs the workflow against injected collaborators.
pub struct Provisioner {
    settings: Arc<dyn SettingsStore>,
    rows: Arc<dyn RowSource>,
    directory: Arc<dyn DirectoryClient>,
    notifier: Arc<dyn Notifier>,
    run_lock: Arc<Mutex<()>>,
}

impl Provisioner {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        rows: Arc<dyn RowSource>,
        directory: Arc<dyn DirectoryClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            rows,
            directory,
            notifier,
            run_lock: Arc::default(),
        }
    }

    /// Share the in-flight guard with other provisioners, so at most one of
    /// them runs at a time.
    #[must_use]
    pub fn with_run_lock(mut self, run_lock: Arc<Mutex<()>>) -> Self {
        self.run_lock = run_lock;
        self
    }

    /// Drive one run from `Idle` to completion.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::AlreadyRunning` without doing anything if a
    /// run holding the same guard is in flight. Settings and worksheet read
    /// failures are notified and returned.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunOutcome, ProvisionError> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            return Err(ProvisionError::AlreadyRunning);
        };

        let mut state = ProvisioningState::Idle;
        loop {
            state = match self
                .step(state)
                .await
                .inspect_err(|e| self.notifier.error(&e.to_string()))?
            {
                ProvisioningState::Complete(outcome) => return Ok(outcome),
                next => next,
            };
        }
    }

    /// Perform one transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings store or row source fails.
    pub async fn step(
        &self,
        state: ProvisioningState,
    ) -> Result<ProvisioningState, ProvisionError> {
        let next = match state {
            ProvisioningState::Idle => ProvisioningState::Authenticating {
                settings: load_settings(self.settings.as_ref()).await?,
            },
            ProvisioningState::Authenticating { settings } => self.authenticate(settings).await,
            ProvisioningState::Extracting {
                settings,
                target,
                session,
            } => self.extract(&settings, target, session).await?,
            ProvisioningState::Creating {
                mode,
                target,
                session,
                records,
            } => self.create(mode, target, session, records).await,
            ProvisioningState::Updating {
                target,
                session,
                records,
                outcomes,
            } => self.update(&target, &session, records, outcomes).await,
            ProvisioningState::Reporting { users } => self.report(users),
            ProvisioningState::Complete(_) => ProvisioningState::Idle,
        };
        Ok(next)
    }

    fn abort(&self, reason: AbortReason) -> ProvisioningState {
        self.notifier.error(&reason.to_string());
        ProvisioningState::Complete(RunOutcome::Aborted(reason))
    }

    async fn authenticate(&self, settings: ExtensionSettings) -> ProvisioningState {
        if !settings.is_complete() {
            return self.abort(AbortReason::IncompleteSettings);
        }
        let target = match SiteTarget::new(&settings.server_url, &settings.api_version) {
            Ok(target) => target,
            Err(e) => return self.abort(AbortReason::SignIn(e.to_string())),
        };
        let credentials = SignInCredentials::from_settings(&settings);

        match self.directory.authenticate(&target, &credentials).await {
            Ok(session) => ProvisioningState::Extracting {
                settings,
                target,
                session,
            },
            Err(e) => self.abort(AbortReason::SignIn(e.to_string())),
        }
    }

    async fn extract(
        &self,
        settings: &ExtensionSettings,
        target: SiteTarget,
        session: AuthSession,
    ) -> Result<ProvisioningState, ProvisionError> {
        let sheet = &settings.data_source_name;
        let Some(table) = self.rows.summary_data(sheet).await? else {
            return Ok(self.abort(AbortReason::UnknownWorksheet(sheet.clone())));
        };

        Ok(match extract_users(sheet, &table) {
            Ok(records) => {
                let unknown_roles = records
                    .iter()
                    .filter(|record| record.parsed_site_role().is_none())
                    .count();
                if unknown_roles > 0 {
                    warn!(sheet = %sheet, unknown_roles, "Rows with unrecognized site roles");
                }
                info!(sheet = %sheet, users = records.len(), "Provisioning users");
                ProvisioningState::Creating {
                    mode: settings.deployment_mode(),
                    target,
                    session,
                    records,
                }
            }
            Err(missing) => self.abort(missing.into()),
        })
    }

    async fn create(
        &self,
        mode: DeploymentMode,
        target: SiteTarget,
        session: AuthSession,
        records: Vec<UserRecord>,
    ) -> ProvisioningState {
        let directory = self.directory.as_ref();
        let outcomes = join_all(
            records
                .iter()
                .map(|record| directory.create_user(&target, &session, record)),
        )
        .await;

        if mode.requires_update() {
            ProvisioningState::Updating {
                target,
                session,
                records,
                outcomes,
            }
        } else {
            ProvisioningState::Reporting {
                users: pair(records, outcomes),
            }
        }
    }

    async fn update(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        records: Vec<UserRecord>,
        outcomes: Vec<UserOutcome>,
    ) -> ProvisioningState {
        let directory = self.directory.as_ref();
        let updated = join_all(records.iter().zip(outcomes).map(|(record, outcome)| async move {
            match outcome {
                UserOutcome::Provisioned { id } => {
                    directory.update_user(target, session, record, &id).await
                }
                failed @ UserOutcome::Failed { .. } => failed,
            }
        }))
        .await;

        ProvisioningState::Reporting {
            users: pair(records, updated),
        }
    }

    fn report(&self, users: Vec<ProvisionedUser>) -> ProvisioningState {
        let notification = summarize(&users);
        self.notifier.notify(notification.clone());
        ProvisioningState::Complete(RunOutcome::Completed(ProvisioningReport {
            users,
            notification,
        }))
    }
}

fn pair(records: Vec<UserRecord>, outcomes: Vec<UserOutcome>) -> Vec<ProvisionedUser> {
    records
        .into_iter()
        .zip(outcomes)
        .map(|(record, outcome)| ProvisionedUser { record, outcome })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use secrecy::SecretString;
    use tableau_provisioner_core::{DataTable, NotificationLevel};

    use super::*;
    use crate::services::notifier::CollectingNotifier;
    use crate::services::row_source::InlineRowSource;
    use crate::services::settings_store::MemorySettingsStore;
    use crate::tableau::TableauError;

    const SHEET: &str = "New Hires";

    #[derive(Default)]
    struct FakeDirectory {
        reject_sign_in: bool,
        create_failures: HashMap<String, String>,
        update_failures: HashMap<String, String>,
        delays: HashMap<String, Duration>,
        auth_delay: Option<Duration>,
        authenticated: AtomicUsize,
        created: StdMutex<Vec<String>>,
        updated: StdMutex<Vec<String>>,
    }

    impl FakeDirectory {
        fn created(&self) -> Vec<String> {
            self.created.lock().unwrap().clone()
        }

        fn updated(&self) -> Vec<String> {
            self.updated.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DirectoryClient for FakeDirectory {
        async fn authenticate(
            &self,
            _target: &SiteTarget,
            credentials: &SignInCredentials,
        ) -> Result<AuthSession, TableauError> {
            self.authenticated.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.auth_delay {
                tokio::time::sleep(delay).await;
            }
            if self.reject_sign_in {
                return Err(TableauError::SignIn(format!(
                    "bad password for {}",
                    credentials.username
                )));
            }
            Ok(AuthSession {
                site_id: "site-1".to_string(),
                token: SecretString::from("tok"),
            })
        }

        async fn create_user(
            &self,
            _target: &SiteTarget,
            _session: &AuthSession,
            record: &UserRecord,
        ) -> UserOutcome {
            if let Some(delay) = self.delays.get(&record.name) {
                tokio::time::sleep(*delay).await;
            }
            self.created.lock().unwrap().push(record.name.clone());
            match self.create_failures.get(&record.name) {
                Some(error) => UserOutcome::failed(error.clone()),
                None => UserOutcome::Provisioned {
                    id: format!("id-{}", record.name),
                },
            }
        }

        async fn update_user(
            &self,
            _target: &SiteTarget,
            _session: &AuthSession,
            record: &UserRecord,
            user_id: &str,
        ) -> UserOutcome {
            assert_eq!(user_id, format!("id-{}", record.name));
            self.updated.lock().unwrap().push(record.name.clone());
            match self.update_failures.get(&record.name) {
                Some(error) => UserOutcome::failed(error.clone()),
                None => UserOutcome::Provisioned {
                    id: user_id.to_string(),
                },
            }
        }
    }

    fn settings(server_url: &str) -> ExtensionSettings {
        ExtensionSettings {
            server_url: server_url.to_string(),
            api_version: "3.17".to_string(),
            site_name: "finance".to_string(),
            username: "svc".to_string(),
            password: "pw".to_string(),
            data_source_name: SHEET.to_string(),
        }
    }

    fn server_settings() -> ExtensionSettings {
        settings("https://tableau.example.com")
    }

    fn cloud_settings() -> ExtensionSettings {
        settings("https://10ay.online.tableau.com")
    }

    fn sheet(names: &[&str]) -> DataTable {
        let rows: Vec<[&str; 4]> = names
            .iter()
            .map(|name| [*name, "Full Name", "Viewer", "ServerDefault"])
            .collect();
        let rows: Vec<&[&str]> = rows.iter().map(<[&str; 4]>::as_slice).collect();
        DataTable::from_rows(SHEET, &REQUIRED_FIELDS, &rows)
    }

    fn provisioner(
        settings: &ExtensionSettings,
        table: DataTable,
        directory: &Arc<FakeDirectory>,
    ) -> (Provisioner, Arc<CollectingNotifier>) {
        let notifier = Arc::new(CollectingNotifier::new());
        let provisioner = Provisioner::new(
            Arc::new(MemorySettingsStore::with_settings(settings).unwrap()),
            Arc::new(InlineRowSource::new(vec![table])),
            directory.clone(),
            notifier.clone(),
        );
        (provisioner, notifier)
    }

    fn completed(outcome: RunOutcome) -> ProvisioningReport {
        match outcome {
            RunOutcome::Completed(report) => report,
            RunOutcome::Aborted(reason) => panic!("run aborted: {reason}"),
        }
    }

    #[tokio::test]
    async fn test_idle_loads_defaults_when_unconfigured() {
        let directory = Arc::new(FakeDirectory::default());
        let provisioner = Provisioner::new(
            Arc::new(MemorySettingsStore::new()),
            Arc::new(InlineRowSource::default()),
            directory,
            Arc::new(CollectingNotifier::new()),
        );

        let next = provisioner.step(ProvisioningState::Idle).await.unwrap();

        let ProvisioningState::Authenticating { settings } = next else {
            panic!("expected Authenticating, got {next:?}");
        };
        assert_eq!(settings, ExtensionSettings::default());
    }

    #[tokio::test]
    async fn test_server_mode_creates_then_updates_successes_only() {
        let directory = Arc::new(FakeDirectory {
            create_failures: HashMap::from([(
                "bo@example.com".to_string(),
                "The specified user already exists on the site".to_string(),
            )]),
            ..FakeDirectory::default()
        });
        let (provisioner, notifier) = provisioner(
            &server_settings(),
            sheet(&["ana@example.com", "bo@example.com", "cy@example.com"]),
            &directory,
        );

        let report = completed(provisioner.run().await.unwrap());

        assert_eq!(directory.created().len(), 3);
        let mut updated = directory.updated();
        updated.sort();
        assert_eq!(updated, vec!["ana@example.com", "cy@example.com"]);

        assert_eq!(report.notification.level, NotificationLevel::Warning);
        assert_eq!(report.notification.failures.len(), 1);
        assert_eq!(report.notification.failures[0].name, "bo@example.com");
        assert_eq!(notifier.take(), vec![report.notification.clone()]);
    }

    #[tokio::test]
    async fn test_cloud_mode_never_updates() {
        let directory = Arc::new(FakeDirectory::default());
        let (provisioner, _notifier) = provisioner(
            &cloud_settings(),
            sheet(&["ana@example.com", "bo@example.com"]),
            &directory,
        );

        let report = completed(provisioner.run().await.unwrap());

        assert_eq!(directory.created().len(), 2);
        assert!(directory.updated().is_empty());
        assert_eq!(
            report.notification.message,
            "2 users added to Tableau successfully"
        );
    }

    #[tokio::test]
    async fn test_update_failure_marks_user_failed() {
        let directory = Arc::new(FakeDirectory {
            update_failures: HashMap::from([(
                "ana@example.com".to_string(),
                "A user cannot update their own licensing role.".to_string(),
            )]),
            ..FakeDirectory::default()
        });
        let (provisioner, _notifier) =
            provisioner(&server_settings(), sheet(&["ana@example.com"]), &directory);

        let report = completed(provisioner.run().await.unwrap());

        assert_eq!(
            report.users[0].outcome,
            UserOutcome::failed("A user cannot update their own licensing role.")
        );
        assert_eq!(report.notification.level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_outcomes_follow_input_order() {
        let directory = Arc::new(FakeDirectory {
            delays: HashMap::from([
                ("a".to_string(), Duration::from_millis(30)),
                ("b".to_string(), Duration::from_millis(10)),
            ]),
            ..FakeDirectory::default()
        });
        let (provisioner, _notifier) =
            provisioner(&cloud_settings(), sheet(&["a", "b", "c"]), &directory);

        let report = completed(provisioner.run().await.unwrap());

        assert_eq!(directory.created(), vec!["c", "b", "a"]);
        let names: Vec<&str> = report.users.iter().map(|u| u.record.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(report.users[0].outcome.id(), Some("id-a"));
    }

    #[tokio::test]
    async fn test_sign_in_failure_makes_no_user_calls() {
        let directory = Arc::new(FakeDirectory {
            reject_sign_in: true,
            ..FakeDirectory::default()
        });
        let (provisioner, notifier) =
            provisioner(&server_settings(), sheet(&["ana@example.com"]), &directory);

        let outcome = provisioner.run().await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Aborted(AbortReason::SignIn(
                "Sign-in failed: bad password for svc".to_string()
            ))
        );
        assert!(directory.created().is_empty());
        assert!(directory.updated().is_empty());

        let notifications = notifier.take();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].level, NotificationLevel::Error);
        assert_eq!(
            notifications[0].message,
            "Unable to sign in to Tableau: Sign-in failed: bad password for svc"
        );
    }

    #[tokio::test]
    async fn test_invalid_url_aborts_before_sign_in() {
        let directory = Arc::new(FakeDirectory::default());
        let (provisioner, _notifier) =
            provisioner(&settings("not a url"), sheet(&["a"]), &directory);

        let outcome = provisioner.run().await.unwrap();

        assert!(matches!(outcome, RunOutcome::Aborted(AbortReason::SignIn(_))));
        assert_eq!(directory.authenticated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_incomplete_settings_abort_before_sign_in() {
        let directory = Arc::new(FakeDirectory::default());
        let mut unconfigured = server_settings();
        unconfigured.password = String::new();
        let (provisioner, notifier) = provisioner(&unconfigured, sheet(&["a"]), &directory);

        let outcome = provisioner.run().await.unwrap();

        assert_eq!(outcome, RunOutcome::Aborted(AbortReason::IncompleteSettings));
        assert_eq!(directory.authenticated.load(Ordering::SeqCst), 0);
        assert!(directory.created().is_empty());

        let notifications = notifier.take();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_missing_columns_abort_with_all_names() {
        let directory = Arc::new(FakeDirectory::default());
        let table = DataTable::from_rows(SHEET, &["name", "siteRole"], &[&["a", "Viewer"]]);
        let (provisioner, notifier) = provisioner(&server_settings(), table, &directory);

        let outcome = provisioner.run().await.unwrap();

        let RunOutcome::Aborted(AbortReason::MissingFields(missing)) = outcome else {
            panic!("expected missing fields, got {outcome:?}");
        };
        assert_eq!(missing.fields, vec!["fullName", "authSetting"]);
        assert!(directory.created().is_empty());
        assert_eq!(
            notifier.take()[0].message,
            "Worksheet New Hires is missing the following data fields: fullName, authSetting"
        );
    }

    #[tokio::test]
    async fn test_unknown_worksheet_aborts() {
        let directory = Arc::new(FakeDirectory::default());
        let mut table = sheet(&["a"]);
        table.name = "Other".to_string();
        let (provisioner, _notifier) = provisioner(&server_settings(), table, &directory);

        let outcome = provisioner.run().await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Aborted(AbortReason::UnknownWorksheet(SHEET.to_string()))
        );
        assert!(directory.created().is_empty());
    }

    #[tokio::test]
    async fn test_empty_worksheet_reports_zero() {
        let directory = Arc::new(FakeDirectory::default());
        let (provisioner, _notifier) = provisioner(&server_settings(), sheet(&[]), &directory);

        let report = completed(provisioner.run().await.unwrap());

        assert!(report.users.is_empty());
        assert_eq!(
            report.notification.message,
            "0 users added to Tableau successfully"
        );
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let directory = Arc::new(FakeDirectory {
            auth_delay: Some(Duration::from_millis(20)),
            ..FakeDirectory::default()
        });
        let (provisioner, _notifier) =
            provisioner(&cloud_settings(), sheet(&["a"]), &directory);

        let (first, second) = tokio::join!(provisioner.run(), provisioner.run());

        assert!(matches!(first, Ok(RunOutcome::Completed(_))));
        assert!(matches!(second, Err(ProvisionError::AlreadyRunning)));
        assert_eq!(directory.authenticated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_run_lock_spans_provisioners() {
        let lock = Arc::new(Mutex::new(()));
        let directory = Arc::new(FakeDirectory::default());
        let (provisioner, _notifier) =
            provisioner(&cloud_settings(), sheet(&["a"]), &directory);
        let provisioner = provisioner.with_run_lock(lock.clone());

        let held = lock.lock().await;
        assert!(matches!(
            provisioner.run().await,
            Err(ProvisionError::AlreadyRunning)
        ));
        drop(held);

        assert!(provisioner.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_complete_returns_to_idle() {
        let directory = Arc::new(FakeDirectory::default());
        let (provisioner, _notifier) = provisioner(&cloud_settings(), sheet(&[]), &directory);

        let next = provisioner
            .step(ProvisioningState::Complete(RunOutcome::Aborted(
                AbortReason::UnknownWorksheet("x".to_string()),
            )))
            .await
            .unwrap();

        assert!(matches!(next, ProvisioningState::Idle));
    }
}

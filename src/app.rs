use crate::api::{LibraryApi, CREATE_LIBRARY_FAILED, SIGN_IN_FAILED, SIGN_UP_FAILED};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::session::FileSessionStore;
use crate::state::{BootstrapOutcome, Controller, Event, Flow, Phase, StateError, Transition};
use crate::utils::validation;
use log::*;
use std::sync::Arc;

/// Specify the commands the application can run.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    SignIn {
        identifier: String,
        password: String,
        accepted_terms: bool,
    },
    SignUp {
        name: String,
        identifier: String,
        password: String,
        accepted_terms: bool,
    },
    SetupLibrary {
        name: String,
        seats: String,
        address: String,
    },
    Logout,
}

/// What a command left behind: the mounted flow plus anything to tell the
/// user.
///
#[derive(Debug)]
pub struct Report {
    pub phase: Phase,
    pub flow: Flow,
    pub notices: Vec<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

/// Oversees session bootstrap, command execution and the requests each
/// command makes.
///
pub struct App {
    config: Config,
    controller: Controller,
    api: LibraryApi,
    notices: Vec<String>,
    warnings: Vec<String>,
}

impl App {
    /// Return a new application for the given configuration, still in the
    /// loading phase.
    ///
    pub fn new(config: Config) -> AppResult<App> {
        let store = FileSessionStore::new(&config.session_dir, &config.service_name);
        debug!("Session entry kept at {}", store.session_path().display());
        let api = LibraryApi::new(&config.base_url, config.request_timeout)?;
        Ok(App {
            config,
            controller: Controller::new(Arc::new(store)),
            api,
            notices: vec![],
            warnings: vec![],
        })
    }

    /// Start a new application according to the given configuration, run
    /// `command` once the stored session has been read, and return what it
    /// left behind.
    ///
    pub async fn start(config: Config, command: Command) -> AppResult<Report> {
        info!("Starting application...");
        let mut app = App::new(config)?;
        app.bootstrap().await;
        let report = app.run(command).await;
        info!("Exiting application...");
        Ok(report)
    }

    async fn bootstrap(&mut self) {
        self.controller
            .bootstrap(self.config.bootstrap_timeout, self.config.splash)
            .await;
        if let Some(BootstrapOutcome::Recovered(e)) = self.controller.bootstrap_outcome() {
            self.warnings.push(format!(
                "Stored session could not be read ({}); sign in again.",
                e
            ));
        }
    }

    /// Run one command against the bootstrapped session.
    ///
    pub async fn run(&mut self, command: Command) -> Report {
        debug!("Running command {:?}...", command_name(&command));
        let (result, fallback) = match command {
            Command::Status => (self.status().await, ""),
            Command::SignIn {
                identifier,
                password,
                accepted_terms,
            } => (
                self.sign_in(&identifier, &password, accepted_terms).await,
                SIGN_IN_FAILED,
            ),
            Command::SignUp {
                name,
                identifier,
                password,
                accepted_terms,
            } => (
                self.sign_up(&name, &identifier, &password, accepted_terms)
                    .await,
                SIGN_UP_FAILED,
            ),
            Command::SetupLibrary {
                name,
                seats,
                address,
            } => (
                self.setup_library(&name, &seats, &address).await,
                CREATE_LIBRARY_FAILED,
            ),
            Command::Logout => (self.logout().await, ""),
        };

        let error = result.err().map(|e| match e {
            AppError::Api(e) => e.user_message(fallback),
            e => e.to_string(),
        });
        let phase = self.controller.phase();
        Report {
            phase,
            flow: phase.flow(),
            notices: std::mem::take(&mut self.notices),
            warnings: std::mem::take(&mut self.warnings),
            error,
        }
    }

    async fn status(&mut self) -> AppResult<()> {
        let session = self.controller.session();
        self.notices.push(format!("Status: {}", session.get_phase().label()));
        if let Some(owner) = session.get_owner() {
            self.notices.push(format!("Owner: {}", owner.name));
        }
        if self.controller.phase() == Phase::AuthenticatedReady {
            if let Some(library) = self.controller.stored_library().await {
                self.notices
                    .push(format!("Library: {} ({} seats)", library.name, library.seats));
            }
        }
        Ok(())
    }

    async fn sign_in(&mut self, identifier: &str, password: &str, accepted_terms: bool) -> AppResult<()> {
        let started = self.controller.dispatch(Event::SignInStarted).await;
        self.settle(started).await?;

        let form = match validation::sign_in(identifier, password, accepted_terms) {
            Ok(form) => form,
            Err(e) => {
                self.controller
                    .dispatch(Event::SignInFailed(e.to_string()))
                    .await;
                return Err(e.into());
            }
        };

        match self.api.sign_in(&form.identifier, &form.password).await {
            Ok(response) => {
                let name = response.owner.name.clone();
                let transition = self
                    .controller
                    .dispatch(Event::SignInSucceeded(response))
                    .await;
                self.settle(transition).await?;
                if name.is_empty() {
                    self.notices.push("Sign in successful.".to_string());
                } else {
                    self.notices.push(format!("Welcome back, {}!", name));
                }
                self.prompt_setup();
                Ok(())
            }
            Err(e) => {
                self.controller
                    .dispatch(Event::SignInFailed(e.user_message(SIGN_IN_FAILED)))
                    .await;
                Err(e.into())
            }
        }
    }

    async fn sign_up(
        &mut self,
        name: &str,
        identifier: &str,
        password: &str,
        accepted_terms: bool,
    ) -> AppResult<()> {
        let started = self.controller.dispatch(Event::SignUpStarted).await;
        self.settle(started).await?;

        let form = match validation::sign_up(name, identifier, password, accepted_terms) {
            Ok(form) => form,
            Err(e) => {
                self.controller
                    .dispatch(Event::SignUpFailed(e.to_string()))
                    .await;
                return Err(e.into());
            }
        };

        match self
            .api
            .sign_up(&form.name, &form.identifier, &form.password)
            .await
        {
            Ok(response) => {
                let transition = self
                    .controller
                    .dispatch(Event::SignUpSucceeded(response))
                    .await;
                self.settle(transition).await?;
                let message = self
                    .controller
                    .session()
                    .get_sign_up_message()
                    .unwrap_or("Account created.")
                    .to_string();
                self.notices.push(message);
                self.prompt_setup();
                Ok(())
            }
            Err(e) => {
                self.controller
                    .dispatch(Event::SignUpFailed(e.user_message(SIGN_UP_FAILED)))
                    .await;
                Err(e.into())
            }
        }
    }

    async fn setup_library(&mut self, name: &str, seats: &str, address: &str) -> AppResult<()> {
        let phase = self.controller.phase();
        if phase != Phase::AuthenticatedNoLibrary {
            return Err(StateError::InvalidTransition {
                event: "LibraryCreated",
                phase,
            }
            .into());
        }
        let form = validation::library(name, seats, address)?;
        let token = self
            .controller
            .session()
            .get_token()
            .ok_or(StateError::NotAuthenticated)?
            .to_owned();

        let library = self
            .api
            .create_library(&token, &form.name, form.seats, &form.address)
            .await?;
        let notice = format!(
            "Library '{}' is set up with {} seats.",
            library.name, library.seats
        );
        let transition = self
            .controller
            .dispatch(Event::LibraryCreated(Some(library)))
            .await;
        self.settle(transition).await?;
        self.notices.push(notice);
        Ok(())
    }

    async fn logout(&mut self) -> AppResult<()> {
        let transition = self.controller.dispatch(Event::Logout).await;
        let was_signed_in = transition.from.is_authenticated();
        self.settle(transition).await?;
        if was_signed_in {
            self.notices.push("Signed out.".to_string());
        } else {
            self.notices.push("Already signed out.".to_string());
        }
        Ok(())
    }

    /// Turn a refused transition into an error. A failed store write is
    /// retried once and becomes a warning if it fails again.
    ///
    async fn settle(&mut self, transition: Transition) -> AppResult<()> {
        if let Some(e) = transition.rejected {
            return Err(e.into());
        }
        if let Some(e) = transition.persistence {
            let e = match self.controller.persist().await {
                Ok(()) => {
                    info!("Session persisted on retry after '{}'.", transition.event);
                    return Ok(());
                }
                Err(retry) => {
                    debug!("First write after '{}' failed with: {}", transition.event, e);
                    retry
                }
            };
            let warning = match transition.to {
                Phase::Unauthenticated => format!(
                    "Signed out here, but the stored session could not be removed ({}).",
                    e
                ),
                _ => format!(
                    "The session could not be saved ({}); it may not be restored next time.",
                    e
                ),
            };
            self.warnings.push(warning);
        }
        Ok(())
    }

    fn prompt_setup(&mut self) {
        if self.controller.phase() == Phase::AuthenticatedNoLibrary {
            self.notices
                .push("Set up your library to continue: library-desk setup-library".to_string());
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Status => "status",
        Command::SignIn { .. } => "sign-in",
        Command::SignUp { .. } => "sign-up",
        Command::SetupLibrary { .. } => "setup-library",
        Command::Logout => "logout",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CREATE_LIBRARY_PATH, SIGN_IN_PATH, SIGN_UP_PATH};
    use httpmock::MockServer;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(dir: &TempDir, server: &MockServer) -> Config {
        let mut config = Config::new(dir.path());
        config.base_url = server.base_url();
        config.splash = Duration::ZERO;
        config.bootstrap_timeout = Duration::from_secs(2);
        config.request_timeout = Duration::from_secs(5);
        config
    }

    fn session_file(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("LibraryApp").join("session.json")
    }

    fn sign_up() -> Command {
        Command::SignUp {
            name: "Asha".to_string(),
            identifier: "asha@example.com".to_string(),
            password: "secret1".to_string(),
            accepted_terms: true,
        }
    }

    #[tokio::test]
    async fn fresh_install_status_is_signed_out() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        let report = App::start(config(&dir, &server), Command::Status).await?;
        assert_eq!(report.phase, Phase::Unauthenticated);
        assert_eq!(report.flow, Flow::Auth);
        assert!(report.error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_setup_and_restart() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("POST").path(SIGN_UP_PATH);
                then.status(201).json_body(json!({
                    "token": "t1",
                    "owner": { "id": 1, "name": "Asha", "email": "asha@example.com" },
                    "message": "Owner registered successfully",
                    "isLibraryCreated": false,
                }));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path(CREATE_LIBRARY_PATH)
                    .header("Authorization", "Bearer t1");
                then.status(201).json_body(json!({
                    "library": { "id": 3, "name": "City Reading Room", "seats": 40, "address": "12 Station Road, Pune" }
                }));
            })
            .await;

        let report = App::start(config(&dir, &server), sign_up()).await?;
        assert_eq!(report.flow, Flow::Setup);
        assert!(report.notices.contains(&"Owner registered successfully".to_string()));
        let stored = std::fs::read_to_string(session_file(&dir))?;
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&stored)?,
            json!({ "token": "t1", "isLibraryCreated": false })
        );

        let report = App::start(
            config(&dir, &server),
            Command::SetupLibrary {
                name: "City Reading Room".to_string(),
                seats: "40".to_string(),
                address: "12 Station Road, Pune".to_string(),
            },
        )
        .await?;
        create.assert_async().await;
        assert_eq!(report.flow, Flow::Main);
        assert!(report.error.is_none());

        let report = App::start(config(&dir, &server), Command::Status).await?;
        assert_eq!(report.phase, Phase::AuthenticatedReady);
        assert!(report
            .notices
            .contains(&"Library: City Reading Room (40 seats)".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn library_cache_failure_is_a_warning() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        std::fs::create_dir_all(dir.path().join("LibraryApp").join("library.json"))?;
        std::fs::write(session_file(&dir), r#"{"token":"t1","isLibraryCreated":false}"#)?;
        server
            .mock_async(|when, then| {
                when.method("POST").path(CREATE_LIBRARY_PATH);
                then.status(201).json_body(json!({
                    "library": { "id": 3, "name": "City Reading Room", "seats": 40, "address": "12 Station Road, Pune" }
                }));
            })
            .await;

        let report = App::start(
            config(&dir, &server),
            Command::SetupLibrary {
                name: "City Reading Room".to_string(),
                seats: "40".to_string(),
                address: "12 Station Road, Pune".to_string(),
            },
        )
        .await?;
        assert_eq!(report.flow, Flow::Main);
        assert!(report.error.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("could not be saved"));
        let stored = std::fs::read_to_string(session_file(&dir))?;
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&stored)?,
            json!({ "token": "t1", "isLibraryCreated": true })
        );
        Ok(())
    }

    #[tokio::test]
    async fn rejected_sign_in_reports_service_message() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("POST").path(SIGN_IN_PATH);
                then.status(401).json_body(json!({ "error": "Invalid credentials" }));
            })
            .await;

        let report = App::start(
            config(&dir, &server),
            Command::SignIn {
                identifier: "asha@example.com".to_string(),
                password: "wrong-password".to_string(),
                accepted_terms: true,
            },
        )
        .await?;
        assert_eq!(report.phase, Phase::Unauthenticated);
        assert_eq!(report.error.as_deref(), Some("Invalid credentials"));
        assert!(!session_file(&dir).exists());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_service() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("POST").path(SIGN_IN_PATH);
                then.status(200);
            })
            .await;

        let report = App::start(
            config(&dir, &server),
            Command::SignIn {
                identifier: "asha".to_string(),
                password: "secret1".to_string(),
                accepted_terms: true,
            },
        )
        .await?;
        assert_eq!(report.error.as_deref(), Some("Enter valid email or phone"));
        assert_eq!(mock.hits_async().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn setup_library_while_signed_out_is_refused() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        let report = App::start(
            config(&dir, &server),
            Command::SetupLibrary {
                name: "City Reading Room".to_string(),
                seats: "40".to_string(),
                address: "12 Station Road, Pune".to_string(),
            },
        )
        .await?;
        assert_eq!(report.phase, Phase::Unauthenticated);
        assert!(report.error.unwrap().contains("Invalid transition"));
        Ok(())
    }

    #[tokio::test]
    async fn logout_removes_session_and_repeats_safely() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        std::fs::create_dir_all(dir.path().join("LibraryApp"))?;
        std::fs::write(session_file(&dir), r#"{"token":"abc","isLibraryCreated":true}"#)?;

        let report = App::start(config(&dir, &server), Command::Logout).await?;
        assert_eq!(report.phase, Phase::Unauthenticated);
        assert_eq!(report.notices, vec!["Signed out.".to_string()]);
        assert!(!session_file(&dir).exists());

        let report = App::start(config(&dir, &server), Command::Logout).await?;
        assert_eq!(report.notices, vec!["Already signed out.".to_string()]);
        assert!(report.error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_session_warns_and_signs_out() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let server = MockServer::start();
        std::fs::create_dir_all(dir.path().join("LibraryApp"))?;
        std::fs::write(session_file(&dir), "{ not json")?;

        let report = App::start(config(&dir, &server), Command::Status).await?;
        assert_eq!(report.phase, Phase::Unauthenticated);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("could not be read"));
        Ok(())
    }
}

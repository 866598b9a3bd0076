use anyhow::{Context, bail};
use dotenv::dotenv;
use taskboard_client::app_env::{self, ClientConfig};
use taskboard_client::domain::routing::Route;
use taskboard_client::domain::session::{LoginService, SessionStore};
use taskboard_client::domain::stats::StatsService;
use taskboard_client::domain::task::{TaskScope, TaskService};
use taskboard_client::logging;
use taskboard_client::remote::RemoteConnectivity;
use taskboard_client::remote::remote_auth_driven_ports::RemoteAuthenticator;
use taskboard_client::remote::remote_stats_driven_ports::RemoteStatsReader;
use taskboard_client::remote::remote_task_driven_ports::RemoteTaskReader;
use taskboard_client::storage::FileKeyValueStore;
use taskboard_client::view::auth::LoginView;
use taskboard_client::view::home::HomeView;
use taskboard_client::view::shell::AppShell;
use taskboard_client::view::task_board::TaskBoardView;
use taskboard_client::view::{Confirmation, Notification, NotificationKind, Prompt, ViewState};
use tracing::{error, info, warn};

/// Prompt for a run without a screen: notifications go to the log and nothing destructive is
/// ever confirmed
struct LoggingPrompt;

impl Prompt for LoggingPrompt {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => info!(title = %notification.title, "{}", notification.message),
            NotificationKind::Error => error!(title = %notification.title, "{}", notification.message),
        }
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        warn!(title = %confirmation.title, "Declining: {}", confirmation.text);
        false
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let env_filter = logging::init_env_filter()?;
    logging::setup_logging_and_tracing(env_filter, logging::exporters_from_env()?)?;

    let config = ClientConfig::from_env();
    info!(api_url = %config.api_url, session_file = %config.session_file.display(), "Starting");

    let sessions = SessionStore::new(FileKeyValueStore::new(config.session_file));
    let ext_cxn = RemoteConnectivity::new(config.api_url)?;
    let mut shell = AppShell::new(sessions, ext_cxn);

    if shell.route() == Route::Login {
        let mut login = LoginView::new();
        login.form.username = std::env::var(app_env::USERNAME)
            .with_context(|| format!("no stored session and {} is not set", app_env::USERNAME))?;
        login.form.password = std::env::var(app_env::PASSWORD)
            .with_context(|| format!("no stored session and {} is not set", app_env::PASSWORD))?;

        if !shell
            .log_in(&mut login, &LoginService {}, &RemoteAuthenticator)
            .await
        {
            let reason = login
                .failure()
                .map(str::to_owned)
                .unwrap_or_else(|| login.errors().to_string());
            bail!("could not log in: {reason}");
        }
    }
    let links: Vec<String> = shell.sidebar().iter().map(|link| link.label.clone()).collect();
    info!(route = %shell.route(), ?links, "Signed in");

    let mut home = HomeView::new();
    let mut board = TaskBoardView::new(TaskScope::default());
    futures::join!(
        home.load(shell.ext_cxn(), &StatsService {}, &RemoteStatsReader),
        board.load(shell.ext_cxn(), &TaskService {}, &RemoteTaskReader),
    );

    match home.stats() {
        ViewState::Ready(stats) => {
            info!(
                completed = stats.completed,
                incomplete = stats.incomplete,
                "Task statistics"
            );
            for task in home.top_tasks() {
                info!(priority = %task.priority, project = %task.project.name, "Top task: {}", task.name);
            }
        }
        ViewState::Failed(message) => error!("Could not load statistics: {message}"),
        ViewState::Loading => warn!("Statistics never arrived"),
    }

    match board.board() {
        ViewState::Ready(tasks) => {
            for (status, lane) in tasks.lanes() {
                let names: Vec<&str> = lane.iter().map(|task| task.name.as_str()).collect();
                info!(%status, count = lane.len(), ?names, "Lane");
            }
        }
        ViewState::Failed(message) => {
            LoggingPrompt.notify(&Notification::error(format!("Could not load tasks: {message}")))
        }
        ViewState::Loading => warn!("Task board never arrived"),
    }

    Ok(())
}

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use secrecy::SecretString;
use shipkit::actions::fsm::ActionKind;
use shipkit::app::guard::{route_for, Route};
use shipkit::app::options::AppOptions;
use shipkit::app::run::{run_relay, run_watch};
use shipkit::app::state::AppState;
use shipkit::authn::session_mngr::SessionManagerExt;
use shipkit::authn::token::SessionToken;
use shipkit::domain::wizard::{DomainWizard, SubmitOutcome, A_RECORD_STEPS};
use shipkit::forms;
use shipkit::notify::{MemoryNotifier, Notifier, TerminalNotifier};
use shipkit::storage::settings::ApiSettings;
use shipkit::utils::version_info;
use shipkit::view::confirm::DeleteConfirmation;
use shipkit::view::list::{render, BadgeColor};
use shipkit_api::{CreateDeploymentInput, DeploymentState, UpdateDeploymentInput};

use crate::cli::{Commands, DomainCommands};

/// A failure the operator was already told about
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failure already reported")
    }
}

impl std::error::Error for Reported {}

/// Everything a command needs to talk to the gateway
pub struct Context {
    pub options: AppOptions,
    pub api: ApiSettings,
}

impl Context {
    async fn state(&self, notifier: Arc<dyn Notifier>) -> Result<Arc<AppState>> {
        Ok(Arc::new(AppState::init(&self.options, &self.api, notifier).await?))
    }

    async fn terminal_state(&self) -> Result<Arc<AppState>> {
        self.state(Arc::new(TerminalNotifier)).await
    }
}

pub async fn dispatch(ctx: Context, command: Commands) -> Result<()> {
    match command {
        Commands::Version => {
            println!("{}", serde_json::to_string_pretty(&version_info())?);
            Ok(())
        }
        Commands::Serve { host, port } => {
            let mut options = ctx.options;
            if let Some(host) = host {
                options.relay.host = host;
            }
            if let Some(port) = port {
                options.relay.port = port;
            }
            run_relay(options, crate::await_shutdown_signal()).await?;
            Ok(())
        }
        Commands::Login { email, password } => login(&ctx, email, password).await,
        Commands::Register {
            email,
            password,
            confirm_password,
        } => register(&ctx, email, password, confirm_password).await,
        Commands::Logout => {
            let state = ctx.terminal_state().await?;
            state.client.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => whoami(&ctx).await,
        Commands::ChangePassword {
            old_password,
            new_password,
            confirm_password,
        } => change_password(&ctx, old_password, new_password, confirm_password).await,
        Commands::Status => status(&ctx).await,
        Commands::List => list(&ctx).await,
        Commands::Show { id } => show(&ctx, &id).await,
        Commands::Create { name, file } => create(&ctx, name, &file).await,
        Commands::Edit { id, name, file } => edit(&ctx, &id, name, file.as_deref()).await,
        Commands::Start { id } => act(&ctx, ActionKind::Start, &id, None).await,
        Commands::Stop { id } => act(&ctx, ActionKind::Stop, &id, None).await,
        Commands::Delete { id, confirm } => act(&ctx, ActionKind::Delete, &id, Some(confirm)).await,
        Commands::Domain { command } => domain(&ctx, command).await,
        Commands::Watch { relay } => watch(ctx, relay).await,
    }
}

// ================================= ACCOUNTS ===================================== //

async fn login(ctx: &Context, email: String, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password, "Password")?;
    forms::validate_login(&email, &password)?;

    let state = ctx.terminal_state().await?;
    let profile = state
        .client
        .login(&email, &SecretString::from(password))
        .await?;
    println!("Logged in as {}", profile.email.bold());
    Ok(())
}

async fn register(
    ctx: &Context,
    email: String,
    password: Option<String>,
    confirm: Option<String>,
) -> Result<()> {
    let (password, confirm) = match (password, confirm) {
        (Some(password), Some(confirm)) => (password, confirm),
        (Some(password), None) => (password.clone(), password),
        (None, _) => (prompt("Password")?, prompt("Confirm password")?),
    };
    forms::validate_register(&email, &password, &confirm)?;

    let state = ctx.terminal_state().await?;
    let platform = state.client.platform_status().await?;
    if route_for(&platform, false) != Route::Register {
        bail!("An admin account already exists. Run `shipkit login`.");
    }

    let profile = state
        .client
        .register(&email, &SecretString::from(password))
        .await?;
    println!("Registered and logged in as {}", profile.email.bold());
    Ok(())
}

async fn whoami(ctx: &Context) -> Result<()> {
    let state = ctx.terminal_state().await?;
    let token = state.session.bearer_token().await?;
    let user = state.session.current_user().await?;
    match (token, user) {
        (Some(token), Some(user)) => {
            println!("{}", user.email.bold());
            if let Ok(token) = SessionToken::from_raw(&token) {
                if let Some(expires_at) = token.expires_at() {
                    println!("session expires {}", expires_at.to_rfc3339());
                }
            }
            Ok(())
        }
        _ => bail!(Route::Login.hint()),
    }
}

async fn change_password(
    ctx: &Context,
    old: Option<String>,
    new: Option<String>,
    confirm: Option<String>,
) -> Result<()> {
    let old = password_or_prompt(old, "Current password")?;
    let new = password_or_prompt(new, "New password")?;
    let confirm = match confirm {
        Some(confirm) => confirm,
        None => prompt("Confirm new password")?,
    };
    forms::validate_change_password(&old, &new, &confirm)?;

    let state = ctx.terminal_state().await?;
    require_login(&state).await?;
    state
        .client
        .change_password(&SecretString::from(old), &SecretString::from(new))
        .await?;
    TerminalNotifier.success("Password changed successfully!");
    Ok(())
}

async fn status(ctx: &Context) -> Result<()> {
    let state = ctx.terminal_state().await?;
    let platform = state.client.platform_status().await?;
    let authenticated = state.session.is_authenticated().await?;
    let route = route_for(&platform, authenticated);

    println!("endpoint:           {}", state.client.endpoint());
    println!("platform:           {}", platform.status);
    println!("admin initialized:  {}", platform.admin_initialized);
    println!("domain initialized: {}", platform.domain_initialized);
    println!("logged in:          {}", authenticated);
    println!("\n{}", route.hint());
    Ok(())
}

// ================================ DEPLOYMENTS =================================== //

async fn list(ctx: &Context) -> Result<()> {
    let state = ctx.terminal_state().await?;
    require_login(&state).await?;

    let dashboard = &state.dashboard;
    dashboard.refresh().await?;
    dashboard.fetch_all().await;
    print!("{}", render(&dashboard.view()));
    Ok(())
}

async fn show(ctx: &Context, id: &str) -> Result<()> {
    let state = ctx.terminal_state().await?;
    require_login(&state).await?;

    let deployment = state.client.find_deployment(id).await?;
    let fetcher = state.dashboard.fetcher();
    fetcher.fetch_status(id).await;
    let status = fetcher.cache().get(id);
    let deployment_state = status.as_ref().map(|s| s.state).unwrap_or_default();

    println!("{} ({})", deployment.name.bold(), deployment.id);
    println!("state:   {}", badge(deployment_state));
    if let Some(created_at) = &deployment.created_at {
        println!("created: {}", created_at);
    }
    if let Some(status) = &status {
        if let Some(message) = &status.message {
            println!("message: {}", message);
        }
        for container in &status.containers {
            println!(
                "  - {} {} {} {}",
                container.name,
                container.state,
                container.health.as_deref().unwrap_or(""),
                container.ports.join(", ")
            );
        }
    }
    println!("\n{}", deployment.compose_yaml);
    Ok(())
}

async fn create(ctx: &Context, name: String, file: &Path) -> Result<()> {
    let compose_yaml = read_compose(file).await?;
    forms::validate_deployment(&name, &compose_yaml)?;

    let state = ctx.terminal_state().await?;
    require_login(&state).await?;
    let deployment = state
        .client
        .create_deployment(CreateDeploymentInput { name, compose_yaml })
        .await
        .inspect_err(|_| TerminalNotifier.error("Failed to create deployment"))?;
    TerminalNotifier.success("Deployment created successfully!");
    println!("{} ({})", deployment.name.bold(), deployment.id);
    list_after_change(&state).await
}

async fn edit(ctx: &Context, id: &str, name: Option<String>, file: Option<&Path>) -> Result<()> {
    let compose_yaml = match file {
        Some(file) => Some(read_compose(file).await?),
        None => None,
    };

    let state = ctx.terminal_state().await?;
    require_login(&state).await?;
    let current = state.client.find_deployment(id).await?;
    forms::validate_deployment(
        name.as_deref().unwrap_or(&current.name),
        compose_yaml.as_deref().unwrap_or(&current.compose_yaml),
    )?;

    state
        .client
        .update_deployment(id, UpdateDeploymentInput { name, compose_yaml })
        .await
        .inspect_err(|_| TerminalNotifier.error("Failed to update deployment"))?;
    TerminalNotifier.success("Deployment updated successfully!");
    list_after_change(&state).await
}

async fn act(ctx: &Context, kind: ActionKind, id: &str, confirm: Option<String>) -> Result<()> {
    let state = ctx.terminal_state().await?;
    require_login(&state).await?;

    let dashboard = &state.dashboard;
    dashboard.refresh().await?;
    let Some(deployment) = dashboard.deployment(id) else {
        bail!("No deployment with id {}", id);
    };

    if let Some(typed) = confirm {
        let mut confirmation = DeleteConfirmation::new(deployment.name.clone());
        confirmation.set_input(typed);
        if !confirmation.can_confirm() {
            bail!(confirmation.prompt());
        }
    }

    if let Err(e) = dashboard.act(kind, id).await {
        if e.is_auth_failure() {
            return Err(e.into());
        }
        return Err(Reported.into());
    }

    if kind != ActionKind::Delete {
        println!("{} is {}", deployment.name.bold(), badge(dashboard.cache().state(id)));
        dashboard.coordinator().settle().await;
        println!("{} is {}", deployment.name.bold(), badge(dashboard.cache().state(id)));
    }
    Ok(())
}

async fn list_after_change(state: &AppState) -> Result<()> {
    state.dashboard.refresh().await?;
    state.dashboard.fetch_all().await;
    print!("\n{}", render(&state.dashboard.view()));
    Ok(())
}

async fn read_compose(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading compose file {}", file.display()))
}

// =================================== DOMAIN ===================================== //

async fn domain(ctx: &Context, command: DomainCommands) -> Result<()> {
    let state = ctx.terminal_state().await?;
    require_login(&state).await?;

    let mut wizard = DomainWizard::new(state.client.clone(), Arc::new(TerminalNotifier));
    wizard.prefill().await?;

    let (domain, no_ssl, no_force_ssl, skip_validation) = match command {
        DomainCommands::Show => {
            let form = wizard.form();
            if form.domain.is_empty() {
                println!("{}", Route::DomainSetup.hint());
            } else {
                println!("domain:    {}", form.domain.bold());
                println!("ssl:       {}", form.ssl_enabled);
                println!("force ssl: {}", form.force_ssl);
            }
            return Ok(());
        }
        DomainCommands::Setup {
            domain,
            no_ssl,
            no_force_ssl,
            skip_validation,
        } => (domain, no_ssl, no_force_ssl, skip_validation),
    };

    let form = wizard.form_mut();
    form.domain = domain;
    form.set_ssl_enabled(!no_ssl);
    form.set_force_ssl(!no_force_ssl);

    let mut outcome = wizard.submit().await?;
    if let SubmitOutcome::Recoverable(error) = &outcome {
        if error.show_continue_anyway && skip_validation {
            println!("{} {}", "!".yellow(), error.message);
            println!("Continuing without domain validation...");
            outcome = wizard.continue_anyway().await?;
        }
    }

    match outcome {
        SubmitOutcome::Configured => Ok(()),
        SubmitOutcome::Recoverable(error) => {
            eprintln!("{} {}", "Domain Error:".red().bold(), error.message);
            if error.show_continue_anyway {
                eprintln!("\nTo fix this:");
                for (i, step) in A_RECORD_STEPS.iter().enumerate() {
                    eprintln!("  {}. {}", i + 1, step);
                }
                eprintln!("\nOr re-run with --skip-validation to continue anyway.");
            }
            wizard.try_again();
            Err(Reported.into())
        }
        SubmitOutcome::Failed(_) => Err(Reported.into()),
    }
}

// =================================== WATCH ====================================== //

async fn watch(ctx: Context, relay: bool) -> Result<()> {
    let notifier = Arc::new(MemoryNotifier::new());
    let state = ctx.state(notifier.clone()).await?;
    require_login(&state).await?;

    let mut options = ctx.options;
    options.watch.enable_relay = relay;
    run_watch(options, state, notifier, crate::await_shutdown_signal()).await?;
    Ok(())
}

// ================================== HELPERS ===================================== //

async fn require_login(state: &AppState) -> Result<()> {
    if !state.session.is_authenticated().await? {
        bail!(Route::Login.hint());
    }
    Ok(())
}

fn badge(state: DeploymentState) -> colored::ColoredString {
    BadgeColor::for_state(state).paint(state.as_str())
}

fn password_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(label),
    }
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

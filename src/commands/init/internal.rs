//! Internal implementation for init command

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use kiln::bootstrap::{
    Bootstrap, BootstrapRequest, Collaborators, DeployIntent, EnvironmentOutcome,
    EnvironmentSettings, Summary,
};
use kiln::config::Config;
use kiln::deploy::LocalStackDeployer;
use kiln::store::FileStore;
use kiln::term::{Spinner, TermPrompter};
use kiln::workspace::LocalWorkspace;

pub fn execute_impl(
    project: String,
    app: String,
    app_type: String,
    deploy: bool,
    skip_deploy: bool,
) -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let workspace = LocalWorkspace::current().context("failed to locate the workspace")?;
    let store = FileStore::open_default();
    let deployer = LocalStackDeployer::open_default(config.deploy.poll_interval());
    let prompter = TermPrompter::new();
    let mut spinner = Spinner::new();
    let cancel = CancellationToken::new();

    tracing::debug!(
        registry = %store.path().display(),
        workspace = %workspace.root().display(),
        "starting init"
    );

    let request = BootstrapRequest::new(project, app, app_type)
        .with_deploy(DeployIntent::from_flags(deploy, skip_deploy));
    let deps = Collaborators {
        projects: &store,
        environments: &store,
        deployer: &deployer,
        workspace: &workspace,
        prompter: &prompter,
        progress: &mut spinner,
    };
    let mut init = Bootstrap::new(request, EnvironmentSettings::from(&config.deploy), deps)
        .with_cancellation(cancel.clone())
        .cancel_on_interrupt();

    init.prepare();
    if let Some(project) = init.request.workspace_project() {
        println!("🔗 Using project {} from this workspace", project.bold());
    }
    init.ask()?;
    init.validate()?;
    let summary = match init.execute() {
        Ok(summary) => summary,
        Err(e) => {
            if cancel.is_cancelled() {
                println!(
                    "{} Interrupted; the environment's stack may still be provisioning.",
                    "⚠".yellow()
                );
            }
            return Err(e);
        }
    };

    print_summary(&init.request, &summary, workspace.root());
    Ok(())
}

fn print_summary(request: &BootstrapRequest, summary: &Summary, root: &Path) {
    let manifest = summary
        .manifest
        .strip_prefix(root)
        .unwrap_or(summary.manifest.as_path())
        .display();

    println!();
    if summary.project.was_created() {
        println!("{} Created project {}", "✓".green(), request.project);
    } else {
        println!("{} Using existing project {}", "✓".green(), request.project);
    }
    println!(
        "{} Wrote manifest for {} at {}",
        "✓".green(),
        request.app_name,
        manifest
    );

    match &summary.environment {
        EnvironmentOutcome::Deployed(env) => {
            println!("{} Deployed environment {}", "✓".green(), env)
        }
        EnvironmentOutcome::AlreadyProvisioned(env) => {
            println!("{} Environment {} was already deployed", "✓".green(), env)
        }
        EnvironmentOutcome::AlreadyPresent => println!(
            "{} Project {} already has an environment",
            "✓".green(),
            request.project
        ),
        EnvironmentOutcome::Declined | EnvironmentOutcome::Skipped => {
            println!("{} No environment deployed", "•".dimmed())
        }
    }

    println!("\n📝 Next steps:");
    println!("  • Edit {manifest} to match your application");
    if matches!(
        summary.environment,
        EnvironmentOutcome::Declined | EnvironmentOutcome::Skipped
    ) {
        println!(
            "  • Run `kiln init --app {} --deploy` to deploy a test environment",
            request.app_name
        );
    }
}

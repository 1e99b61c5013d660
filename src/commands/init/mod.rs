//! Create an application in a project and optionally deploy a test environment
//!
//! # Example
//!
//! ```no_run
//! // kiln init --project acme --app api --app-type "Load Balanced Web App" --skip-deploy
//! ```

mod internal;

use anyhow::Result;

/// Execute the init command
///
/// # Arguments
///
/// * `project` - Project name, empty to resolve from the workspace or ask
/// * `app` - Application name, empty to ask
/// * `app_type` - Application type, empty to ask
/// * `deploy` - Deploy a test environment without asking
/// * `skip_deploy` - Never deploy; wins over `deploy`
///
/// # Process
///
/// 1. **Prepare**: adopt the workspace's project or list existing projects
/// 2. **Ask**: prompt for anything still missing
/// 3. **Validate**: reject malformed names given as flags
/// 4. **Execute**: create project, bind workspace, write manifest, deploy
///
/// Ctrl+C while the environment deploys stops waiting and fails the command.
pub fn execute(
    project: String,
    app: String,
    app_type: String,
    deploy: bool,
    skip_deploy: bool,
) -> Result<()> {
    internal::execute_impl(project, app, app_type, deploy, skip_deploy)
}

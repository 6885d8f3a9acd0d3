//! Session command: log in and report what the controller answered.

use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::config::site_label;
use crate::error::CliError;
use crate::output;

use super::Controller;

#[derive(Serialize)]
struct SessionReport {
    profile: String,
    controller: String,
    controller_id: String,
    username: String,
    site: String,
    site_id: String,
    authenticated: bool,
}

fn detail(r: &SessionReport) -> String {
    [
        format!("Profile:       {}", r.profile),
        format!("Controller:    {}", r.controller),
        format!("Controller ID: {}", r.controller_id),
        format!("User:          {}", r.username),
        format!("Site:          {} ({})", r.site, r.site_id),
        format!("Authenticated: {}", if r.authenticated { "yes" } else { "no" }),
    ]
    .join("\n")
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let client = &controller.client;
    client
        .ensure_session()
        .await
        .map_err(|e| controller.error(e))?;

    let controller_id = client
        .controller_id()
        .await
        .map_err(|e| controller.error(e))?
        .to_owned();
    let site_id = client
        .site_id()
        .await
        .map_err(|e| controller.error(e))?
        .to_owned();

    let report = SessionReport {
        profile: controller.profile.clone(),
        controller: client.base_url().to_string(),
        controller_id,
        username: client.credentials().username.clone(),
        site: site_label(client.site()).to_owned(),
        site_id,
        authenticated: client.session().is_authenticated(),
    };

    let out = output::render_single(&global.output, &report, detail, |r| r.site_id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

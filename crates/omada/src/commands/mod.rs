//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod session;

use omada_api::{Error as ApiError, OmadaClient};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// A connected client plus what error messages need to know about it.
pub struct Controller {
    pub client: OmadaClient,
    pub profile: String,
}

impl Controller {
    pub fn new(client: OmadaClient, profile: String) -> Self {
        Self { client, profile }
    }

    /// Map a library error into a CLI error naming this profile and URL.
    pub fn error(&self, err: ApiError) -> CliError {
        CliError::from_api(err, &self.profile, self.client.base_url().as_str())
    }
}

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Session => session::handle(controller, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

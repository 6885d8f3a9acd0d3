//! CLI configuration — thin wrapper around `omada_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--controller, --site, --username, ...).

use omada_api::{ClientConfig, SiteSelector, TlsMode};
use std::time::Duration;

use omada_config::{Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use omada_config::{config_path, load_config_or_default, to_redacted_toml};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the client config from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--controller` alone is enough; the rest
/// comes from flags and environment.
pub fn build_client_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(String, ClientConfig), CliError> {
    let profile_name = active_profile_name(global, cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
            names.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        None => {
            let controller = global.controller.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(controller)
        }
    };

    let profile = apply_overrides(profile, global);
    let mut client = omada_config::profile_to_client_config(&profile, &profile_name, &cfg.defaults)?;
    apply_transport_flags(&mut client, global);

    Ok((profile_name, client))
}

/// Flag values take priority over profile values.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(ref site) = global.site {
        profile.site.clone_from(site);
        profile.site_id = None;
    }
    if let Some(ref site_id) = global.site_id {
        profile.site_id = Some(site_id.clone());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    profile
}

fn apply_transport_flags(client: &mut ClientConfig, global: &GlobalOpts) {
    if global.insecure {
        client.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.transport.timeout = Duration::from_secs(secs);
    }
}

/// Short label for the configured site, for messages.
pub fn site_label(site: &SiteSelector) -> &str {
    match site {
        SiteSelector::Id(id) => id,
        SiteSelector::Name(name) => name,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["omada"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "path"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_home() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                username: Some("admin".into()),
                password: Some("hunter2".into()),
                site: "Home".into(),
                ..Profile::new("https://omada.local:8043")
            },
        );
        cfg
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let err = build_client_config(&global(&["--profile", "work"]), &config_with_home())
            .unwrap_err();
        assert!(
            matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "home")
        );
    }

    #[test]
    fn missing_controller_without_profile() {
        let err = build_client_config(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn flags_override_profile() {
        let (name, client) = build_client_config(
            &global(&["-p", "home", "--site-id", "abc", "-c", "https://10.0.0.5:8043", "-k"]),
            &config_with_home(),
        )
        .unwrap();

        assert_eq!(name, "home");
        assert_eq!(client.url.as_str(), "https://10.0.0.5:8043/");
        assert_eq!(client.site, SiteSelector::Id("abc".into()));
        assert!(matches!(client.transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn configured_timeouts_apply_without_flag() {
        let mut cfg = config_with_home();
        cfg.defaults.timeout = 60;

        let (_, client) = build_client_config(&global(&["-p", "home"]), &cfg).unwrap();
        assert_eq!(client.transport.timeout, Duration::from_secs(60));

        if let Some(home) = cfg.profiles.get_mut("home") {
            home.timeout = Some(5);
        }
        let (_, client) = build_client_config(&global(&["-p", "home"]), &cfg).unwrap();
        assert_eq!(client.transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn timeout_flag_overrides_config() {
        let mut cfg = config_with_home();
        cfg.defaults.timeout = 60;

        let (_, client) =
            build_client_config(&global(&["-p", "home", "--timeout", "30"]), &cfg).unwrap();
        assert_eq!(client.transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn site_label_prefers_whatever_is_set() {
        assert_eq!(site_label(&SiteSelector::Name("Home".into())), "Home");
        assert_eq!(site_label(&SiteSelector::Id("abc".into())), "abc");
    }
}

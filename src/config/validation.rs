//! Configuration validation functions.

use super::Config;

/// Validate configuration security and warn about likely misconfiguration.
///
/// Loading itself never hard-fails (see [`super::loader::load`]); callers who
/// need a hard failure call this separately and propagate the error.
pub fn validate_config_security(config: &Config) -> anyhow::Result<()> {
    let is_prod = is_production_mode();

    if config.security.admin_passwords.is_empty() {
        if is_prod {
            anyhow::bail!(
                "\nCRITICAL: No admin password configured in production!\n\
                 ===================================================================\n\
                 The AdminAPI (create-lobby, catalog management) would be unreachable.\n\
                 Configure at least one password:\n\
                 export SPEKTRUM__SECURITY__ADMIN_PASSWORDS=\"$(openssl rand -hex 16)\"\n\
                 ===================================================================\n"
            );
        }
        eprintln!(
            "WARNING: No admin password configured; AdminAPI requests will all be rejected."
        );
    } else {
        for password in &config.security.admin_passwords {
            if password.len() < 8 {
                eprintln!(
                    "WARNING: an admin password is very short ({} chars). \
                     Recommended: at least 16 characters.",
                    password.len()
                );
            }
        }
    }

    if config.server.join_code_length < 6 || config.server.join_code_length > 16 {
        anyhow::bail!(
            "server.join_code_length must be within 6-16 digits, got {}",
            config.server.join_code_length
        );
    }
    if config.server.join_code_max_length < config.server.join_code_length {
        anyhow::bail!("server.join_code_max_length must be >= server.join_code_length");
    }

    Ok(())
}

/// Detect if we're running in production mode.
///
/// Checks for `SPEKTRUM_PRODUCTION` or generic `PRODUCTION` / `PROD` environment variables.
pub fn is_production_mode() -> bool {
    use std::env;

    if let Ok(mode) = env::var("SPEKTRUM__ENVIRONMENT") {
        return mode.eq_ignore_ascii_case("production") || mode.eq_ignore_ascii_case("prod");
    }

    env::var("SPEKTRUM_PRODUCTION").is_ok()
        || env::var("PRODUCTION").is_ok()
        || env::var("PROD").is_ok()
}

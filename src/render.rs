//! AWS CLI config rendering
//!
//! Pure text generation, no I/O and no browser: given the scraped accounts
//! and the configuration, produce the complete contents of the generated
//! file.

use crate::browser::Account;
use crate::config::GenConfig;

/// Normalize a display name into a config-safe slug.
/// Lowercases, collapses every whitespace run into a single hyphen, then
/// strips everything outside [a-z0-9-]. Idempotent.
pub fn normalize_account_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                slug.push(c);
            }
        }
    }

    slug
}

/// Pick the region for an account from its slug
pub fn resolve_region<'a>(slug: &str, config: &'a GenConfig) -> &'a str {
    if slug.contains("canada") || slug.contains("prod-ca") {
        &config.ca_region
    } else {
        &config.default_region
    }
}

/// Profile identifier for one account/role pair.
/// Only the identifier hyphenates the role; `sso_role_name` keeps its
/// underscores.
pub fn profile_name(slug: &str, account_id: &str, role: &str) -> String {
    format!("{}-{}-{}", slug, account_id, role.replace('_', "-"))
}

/// Render the complete generated config: one sso-session header stanza, then
/// one profile stanza per account/role pair in scrape order. Every stanza
/// ends with a blank line.
pub fn render_config(accounts: &[Account], config: &GenConfig) -> String {
    let mut body = format!(
        "[sso-session {session}]\n\
         sso_start_url={url}\n\
         sso_region={sso_region}\n\
         sso_registration_scopes=sso:account:access\n\n",
        session = config.sso_session,
        url = config.start_url,
        sso_region = config.sso_region,
    );

    for account in accounts {
        let slug = normalize_account_name(&account.name);
        let region = resolve_region(&slug, config);

        for role in &config.roles {
            body.push_str(&format!(
                "[profile {profile}]\n\
                 sso_account_id={id}\n\
                 region={region}\n\
                 sso_session={session}\n\
                 sso_region={sso_region}\n\
                 sso_role_name={role}\n\
                 sso_start_url={url}\n\n",
                profile = profile_name(&slug, &account.account_id, role),
                id = account.account_id,
                region = region,
                session = config.sso_session,
                sso_region = config.sso_region,
                role = role,
                url = config.start_url,
            ));
        }
    }

    body
}

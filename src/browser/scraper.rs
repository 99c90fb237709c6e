//! Account list extraction from the SSO portal
//!
//! The portal is a client-rendered app; the account list shows up only after
//! the user's SSO session exists. All knowledge of the portal's DOM lives in
//! this module.

use serde::Deserialize;
use tracing::info;

use super::{BrowserSession, BrowserError};

/// SSO portal selectors
mod selectors {
    /// One button per account in the portal's account list
    pub const ACCOUNT_LIST_CELL: &str = r#"button[data-testid="account-list-cell"]"#;
    /// Display name inside a cell
    pub const ACCOUNT_NAME: &str = "strong";
    /// Secondary text inside a cell; its first token is the account ID
    pub const ACCOUNT_ID_TEXT: &str = "div > div:nth-child(2)";
}

/// One account as listed in the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Display name as rendered in the UI
    pub name: String,
    /// Numeric account ID (empty when the portal omitted it)
    pub account_id: String,
}

/// Raw cell payload returned by the extraction script
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCell {
    name: Option<String>,
    id_text: Option<String>,
}

/// JavaScript run against the page, one result object per account cell.
/// Missing child nodes come back as null and are defaulted on the Rust side.
fn extraction_script() -> String {
    format!(
        r#"
        (function() {{
            const cells = document.querySelectorAll('{cell}');
            return Array.from(cells).map((cell) => {{
                const nameEl = cell.querySelector('{name}');
                const idEl = cell.querySelector('{id_text}');
                return {{
                    name: nameEl ? nameEl.textContent : null,
                    idText: idEl ? idEl.textContent : null
                }};
            }});
        }})()
        "#,
        cell = selectors::ACCOUNT_LIST_CELL,
        name = selectors::ACCOUNT_NAME,
        id_text = selectors::ACCOUNT_ID_TEXT,
    )
}

/// Build an Account from a raw cell. A missing name node falls back to
/// "unknown"; the account ID is the first whitespace-delimited token of the
/// secondary text, or empty when that node is missing.
fn account_from_cell(cell: RawCell) -> Account {
    let name = cell.name.unwrap_or_else(|| "unknown".to_string());
    let account_id = cell.id_text
        .as_deref()
        .and_then(|text| text.split_whitespace().next())
        .unwrap_or_default()
        .to_string();

    Account { name, account_id }
}

/// Scrape the account list from the portal.
///
/// Navigates to the start URL, waits (bounded) for the account list to
/// render, then extracts every cell in DOM order. Individual missing fields
/// degrade per cell; they never abort the scrape.
pub async fn scrape_accounts(
    session: &BrowserSession,
    start_url: &str,
) -> Result<Vec<Account>, BrowserError> {
    session.navigate(start_url).await?;

    info!("Waiting for the account list (complete the SSO login if prompted)");
    session.wait_for_selector(selectors::ACCOUNT_LIST_CELL).await?;

    let payload = session.evaluate(&extraction_script()).await?;
    let cells: Vec<RawCell> = serde_json::from_value(payload)
        .map_err(|e| BrowserError::JavaScriptError(format!("Unexpected account list payload: {}", e)))?;

    let accounts: Vec<Account> = cells.into_iter().map(account_from_cell).collect();
    info!("Extracted {} accounts from the portal", accounts.len());

    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_with_both_fields() {
        let account = account_from_cell(RawCell {
            name: Some("My Account".to_string()),
            id_text: Some("123456789012 | admin@example.com".to_string()),
        });

        assert_eq!(account.name, "My Account");
        assert_eq!(account.account_id, "123456789012");
    }

    #[test]
    fn test_cell_missing_name_falls_back_to_unknown() {
        let account = account_from_cell(RawCell {
            name: None,
            id_text: Some("123456789012".to_string()),
        });

        assert_eq!(account.name, "unknown");
        assert_eq!(account.account_id, "123456789012");
    }

    #[test]
    fn test_cell_missing_id_text_gives_empty_id() {
        let account = account_from_cell(RawCell {
            name: Some("Sandbox".to_string()),
            id_text: None,
        });

        assert_eq!(account.name, "Sandbox");
        assert_eq!(account.account_id, "");
    }

    #[test]
    fn test_cell_whitespace_only_id_text_gives_empty_id() {
        let account = account_from_cell(RawCell {
            name: Some("Sandbox".to_string()),
            id_text: Some("   ".to_string()),
        });

        assert_eq!(account.account_id, "");
    }

    #[test]
    fn test_cell_id_text_with_padding_and_tabs() {
        let account = account_from_cell(RawCell {
            name: Some("Sandbox".to_string()),
            id_text: Some("  123456789012\tadmin@example.com".to_string()),
        });

        assert_eq!(account.account_id, "123456789012");
    }

    #[test]
    fn test_page_payload_deserializes_with_nulls() {
        let payload = serde_json::json!([
            { "name": "Prod", "idText": "111122223333 | a@b.com" },
            { "name": null, "idText": null }
        ]);

        let cells: Vec<RawCell> = serde_json::from_value(payload).unwrap();
        let accounts: Vec<Account> = cells.into_iter().map(account_from_cell).collect();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_id, "111122223333");
        assert_eq!(accounts[1].name, "unknown");
        assert_eq!(accounts[1].account_id, "");
    }

    #[test]
    fn test_extraction_script_embeds_selectors() {
        let script = extraction_script();
        assert!(script.contains(selectors::ACCOUNT_LIST_CELL));
        assert!(script.contains("querySelectorAll"));
    }
}

//! Browser automation module
//!
//! Launches and controls a Chromium instance over CDP to scrape the account
//! list from the SSO portal.

mod session;
mod scraper;
mod errors;

pub use session::{BrowserSession, BrowserSessionConfig};
pub use scraper::{scrape_accounts, Account};
pub use errors::BrowserError;

//! Client for the ChurchSuite admin site.
//!
//! Logs in with a username and password, optionally switches to another site
//! of a multi-site account, and downloads report pages as HTML.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use reqwest::{header, Client};
use tracing::{debug, info};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint shared by all ChurchSuite accounts
const LOGIN_URL: &str = "https://login.churchsuite.com/";

/// Cookie naming the account a login is for
const ACCOUNT_COOKIE: &str = "churchapp_login_account";

/// Date format used in report query strings
const REPORT_DATE_FORMAT: &str = "%d-%m-%Y";

/// How far ahead the default rota report looks.
const REPORT_WINDOW_DAYS: i64 = 365;

/// HTTP request timeout in seconds.
/// A hung request fails the run instead of blocking it forever.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Date range of a rota overview report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// From the given day to a year later
    Upcoming(NaiveDate),
    /// 1 January of the year to 1 January of the next
    Year(i32),
}

impl ReportWindow {
    /// Upcoming rotas starting today
    pub fn from_today() -> Self {
        ReportWindow::Upcoming(Local::now().date_naive())
    }

    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            ReportWindow::Upcoming(from) => {
                Some((from, from + chrono::Duration::days(REPORT_WINDOW_DAYS)))
            }
            ReportWindow::Year(year) => Some((
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            )),
        }
    }
}

/// ChurchSuite client for one account.
/// Clone shares the cookie store and connection pool.
#[derive(Clone)]
pub struct ChurchSuiteClient {
    client: Client,
    account: String,
}

impl ChurchSuiteClient {
    /// Create a client for `account` (the `<account>.churchsuite.co.uk` subdomain)
    pub fn new(account: &str, timeout: Duration) -> Result<Self> {
        if !Self::is_valid_account(account) {
            bail!("Invalid ChurchSuite account name: {:?}", account);
        }

        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("Failed to build ChurchSuite HTTP client")?;

        Ok(Self {
            client,
            account: account.to_string(),
        })
    }

    /// Account names are used as a subdomain: letters, digits and hyphens only.
    fn is_valid_account(account: &str) -> bool {
        !account.is_empty()
            && !account.starts_with('-')
            && !account.ends_with('-')
            && account.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }

    fn base_url(&self) -> String {
        format!("https://{}.churchsuite.co.uk", self.account)
    }

    /// Log in. The session cookie is kept for later requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        info!(account = %self.account, username = username, "Logging in to ChurchSuite");

        let response = self
            .client
            .post(LOGIN_URL)
            .header(header::COOKIE, format!("{}={}", ACCOUNT_COOKIE, self.account))
            .form(&[
                ("username", username),
                ("password", password),
                ("system", "admin"),
            ])
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        // A successful login redirects away from the login page
        if response.url().as_str() == LOGIN_URL {
            return Err(ApiError::LoginFailed(username.to_string()).into());
        }
        debug!(landing = %response.url(), "Logged in");
        Ok(())
    }

    /// Switch the session to another site of a multi-site account.
    pub async fn switch_site(&self, site_id: &str) -> Result<()> {
        info!(site_id = site_id, "Switching site");
        let url = format!("{}/ajax/site", self.base_url());

        let response = self
            .client
            .put(&url)
            .form(&[("site_id", site_id)])
            .send()
            .await
            .context("Failed to send site switch request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Download the rota overview report for a date window.
    pub async fn fetch_rota_overview(&self, window: ReportWindow) -> Result<String> {
        let (from, to) = window
            .bounds()
            .with_context(|| format!("Report window out of range: {:?}", window))?;
        info!(from = %from, to = %to, "Fetching rotas");
        self.get_html(&self.rota_report_url(from, to)).await
    }

    /// Download the attendance figures recorded for a date.
    pub async fn fetch_attendance(&self, date: NaiveDate) -> Result<String> {
        info!(date = %date, "Fetching attendance");
        self.get_html(&self.attendance_url(date)).await
    }

    fn rota_report_url(&self, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}/modules/rotas/reports/rotas_overview.php?date_start={}&date_end={}&order_by=default&submit_btn=Generate",
            self.base_url(),
            from.format(REPORT_DATE_FORMAT),
            to.format(REPORT_DATE_FORMAT),
        )
    }

    fn attendance_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/modules/attendance/date_view.php?date={:04}-{:02}-{:02}",
            self.base_url(),
            date.year(),
            date.month(),
            date.day(),
        )
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        debug!(url = url, "Running report");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read report body from {}", url))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client() -> ChurchSuiteClient {
        ChurchSuiteClient::new("stmarks", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_is_valid_account() {
        assert!(ChurchSuiteClient::is_valid_account("stmarks"));
        assert!(ChurchSuiteClient::is_valid_account("st-marks-2"));

        assert!(!ChurchSuiteClient::is_valid_account(""));
        assert!(!ChurchSuiteClient::is_valid_account("-stmarks"));
        assert!(!ChurchSuiteClient::is_valid_account("st.marks"));
        assert!(!ChurchSuiteClient::is_valid_account("evil.com/x"));
    }

    #[test]
    fn test_new_rejects_bad_account() {
        assert!(ChurchSuiteClient::new("a b", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_rota_report_url() {
        let url = client().rota_report_url(date(2018, 4, 22), date(2019, 4, 22));
        assert_eq!(
            url,
            "https://stmarks.churchsuite.co.uk/modules/rotas/reports/rotas_overview.php?date_start=22-04-2018&date_end=22-04-2019&order_by=default&submit_btn=Generate"
        );
    }

    #[test]
    fn test_attendance_url() {
        assert_eq!(
            client().attendance_url(date(2018, 4, 22)),
            "https://stmarks.churchsuite.co.uk/modules/attendance/date_view.php?date=2018-04-22"
        );
    }

    #[test]
    fn test_report_window_bounds() {
        assert_eq!(
            ReportWindow::Upcoming(date(2018, 4, 22)).bounds(),
            Some((date(2018, 4, 22), date(2019, 4, 22)))
        );
        assert_eq!(
            ReportWindow::Year(2018).bounds(),
            Some((date(2018, 1, 1), date(2019, 1, 1)))
        );
    }
}

use anyhow::{bail, Context, Result};
use tracing::info;

const GITHUB_API_URL: &str = "https://api.github.com";

/// Files notices as issues on the repository running the notifier.
pub struct GithubIssues {
    client: reqwest::Client,
    repo: String,
    token: String,
}

impl GithubIssues {
    /// `None` unless both `GITHUB_REPOSITORY` and `GITHUB_TOKEN` are set.
    pub fn from_env() -> Result<Option<Self>> {
        let repo = dotenv::var("GITHUB_REPOSITORY").ok().filter(|v| !v.trim().is_empty());
        let token = dotenv::var("GITHUB_TOKEN").ok().filter(|v| !v.trim().is_empty());
        let (Some(repo), Some(token)) = (repo, token) else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Some(Self {
            client,
            repo: repo.trim().to_string(),
            token: token.trim().to_string(),
        }))
    }

    fn endpoint(&self) -> String {
        format!("{}/repos/{}/issues", GITHUB_API_URL, self.repo)
    }

    pub async fn create(&self, title: &str, body: &str) -> Result<()> {
        let payload = serde_json::json!({
            "title": title,
            "body": body,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .json(&payload)
            .send()
            .await
            .context("GitHub issue request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("GitHub issue creation failed: status={}, body={}", status, text);
        }

        info!(repo = %self.repo, "GitHub issue created");
        Ok(())
    }
}

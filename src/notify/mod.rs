pub mod github;
pub mod mail;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::fetch::FetchOutcome;
use crate::scan::types::SelectionResult;

use github::GithubIssues;
use mail::{MailSettings, Mailer};

const HEADLINE: &str = "[Hibrain 임용 알리미] 지정 키워드 신규 감지 결과";
const REPO_ADDRESS: &str = "https://github.com/leemgs/hibrain-prof-notifier/";

pub fn matches_subject(prefix: &str) -> String {
    format!("{}임용 공지 신규 매칭 결과", prefix)
}

pub fn failure_subject(prefix: &str, ip_blocked: bool) -> String {
    if ip_blocked {
        format!("{}임용 공지 알리미 (서버측 IP차단으로 정보수집 실패)", prefix)
    } else {
        format!("{}임용 공지 알리미 (Hibrain 페이지 접근 오류)", prefix)
    }
}

/// A 403 after every retry means the runner's IP is being refused.
pub fn is_ip_blocked(failures: &[(String, FetchOutcome)]) -> bool {
    failures
        .iter()
        .any(|(_, outcome)| matches!(outcome, FetchOutcome::Blocked { status: 403 }))
}

/// Render the summary mail for a non-empty selection.
pub fn render_matches(results: &SelectionResult, ip: Option<&str>, checked_at: DateTime<Utc>) -> String {
    let mut lines = vec![HEADLINE.to_string(), String::new()];

    for entry in results.iter() {
        match &entry.period {
            Some(period) => lines.push(format!("■ 키워드: {} (모집기간: {})", entry.keyword, period)),
            None => lines.push(format!("■ 키워드: {}", entry.keyword)),
        }
        for (i, link) in entry.links.iter().enumerate() {
            lines.push(format!("  - 관련 링크 {}: {}", i + 1, link));
        }
        lines.push(String::new());
    }

    push_footer(&mut lines, ip, checked_at);
    lines.join("\n")
}

/// Render the notice sent when no configured page could be fetched.
pub fn render_failure(
    failures: &[(String, FetchOutcome)],
    ip: Option<&str>,
    checked_at: DateTime<Utc>,
) -> String {
    let headline = if is_ip_blocked(failures) {
        "Hibrain 서버측의 특정 IP 차단(403 에러)으로 인한 정보 수집 불가"
    } else {
        "Hibrain 페이지 접근 오류로 정보를 수집하지 못했습니다."
    };
    let mut lines = vec![headline.to_string(), String::new()];
    for (url, outcome) in failures {
        lines.push(format!("- {}: {}", url, outcome));
    }
    lines.push(String::new());

    push_footer(&mut lines, ip, checked_at);
    lines.join("\n")
}

fn push_footer(lines: &mut Vec<String>, ip: Option<&str>, checked_at: DateTime<Utc>) {
    lines.push("※ 이 메일은 자동으로 발송되었습니다.".to_string());
    lines.push(format!(
        "- 확인 시각: {}",
        checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("- 실행 환경 IP주소: {}", ip.unwrap_or("Unknown")));
    lines.push("-----".to_string());
    lines.push("GitHub Repo Address:".to_string());
    lines.push(REPO_ADDRESS.to_string());
}

/// Delivers notices by mail and, when configured, as GitHub issues.
pub struct Notifier {
    /// `None` in dry-run mode: mails are logged instead of sent.
    mailer: Option<Mailer>,
    github: Option<GithubIssues>,
    subject_prefix: String,
}

impl Notifier {
    pub fn from_env(subject_prefix: &str, dry_run: bool) -> Result<Self> {
        let mailer = if dry_run {
            None
        } else {
            Some(Mailer::new(MailSettings::from_env()?))
        };
        let github = GithubIssues::from_env()?;
        if github.is_none() {
            info!("GITHUB_REPOSITORY/GITHUB_TOKEN not set, issue creation disabled");
        }
        Ok(Self {
            mailer,
            github,
            subject_prefix: subject_prefix.to_string(),
        })
    }

    /// Send the summary. Does nothing for an empty selection.
    pub async fn send_matches(&self, results: &SelectionResult, ip: Option<&str>) {
        if results.is_empty() {
            return;
        }
        let subject = matches_subject(&self.subject_prefix);
        let body = render_matches(results, ip, Utc::now());
        self.deliver(&subject, &body).await;
    }

    pub async fn send_failure_notice(&self, failures: &[(String, FetchOutcome)], ip: Option<&str>) {
        let subject = failure_subject(&self.subject_prefix, is_ip_blocked(failures));
        let body = render_failure(failures, ip, Utc::now());
        self.deliver(&subject, &body).await;
    }

    /// Delivery problems are logged; the run itself has already succeeded.
    async fn deliver(&self, subject: &str, body: &str) {
        info!(subject, "─── Notice preview ───");
        for line in body.lines() {
            info!("  │ {}", line);
        }

        match &self.mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send(subject, body).await {
                    error!("Mail delivery failed: {:#}", e);
                }
            }
            None => warn!("Dry run, mail not sent"),
        }

        if let Some(github) = &self.github {
            if let Err(e) = github.create(subject, body).await {
                error!("GitHub issue creation failed: {:#}", e);
            }
        }
    }
}

use shared::{
    activity::ActivityReport,
    carousel::Carousel,
    github::{Commit, FetchError, Repository},
    text::escape_html,
    writing::Article,
    Theme,
};

use crate::{config::Site, consts};

const PAGE: &str = include_str!("../templates/page.html");
const GITHUB_WIDGET: &str = include_str!("../templates/github_widget.html");
const GITHUB_ERROR: &str = include_str!("../templates/github_error.html");
const REPOSITORY_CARD: &str = include_str!("../templates/repository_card.html");
const COMMIT_ROW: &str = include_str!("../templates/commit_row.html");
const WRITING_WIDGET: &str = include_str!("../templates/writing_widget.html");
const ARTICLE_CARD: &str = include_str!("../templates/article_card.html");

/// Replaces `{key}` placeholders in a single pass.
///
/// Braces that don't name a known key (inline CSS) are kept as is, and
/// substituted values are never scanned for placeholders themselves.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replacement = after.find('}').and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, end))
        });

        match replacement {
            Some((value, end)) => {
                result.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

pub fn page(site: &Site, theme: Theme, github_widget: &str, writing_widget: &str) -> String {
    fill(
        PAGE,
        &[
            ("theme", theme.as_ref()),
            ("next-theme", theme.toggle().as_ref()),
            ("title", consts::SITE_TITLE),
            ("username", &escape_html(&site.github_username)),
            ("github-widget", github_widget),
            ("writing-widget", writing_widget),
        ],
    )
}

pub fn github_widget(username: &str, report: &ActivityReport, carousel: &Carousel) -> String {
    let cards = if report.repositories.is_empty() {
        consts::NO_ACTIVITY.to_string()
    } else {
        report
            .repositories
            .iter()
            .enumerate()
            .map(|(index, repo)| repository_card(repo, index, index == carousel.active_index))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let hint = if carousel.hint_visible && report.repositories.len() > 1 {
        consts::SCROLL_HINT
    } else {
        ""
    };

    fill(
        GITHUB_WIDGET,
        &[
            ("username", &escape_html(username)),
            ("commit-count", &report.commit_count().to_string()),
            ("repo-count", &report.repositories.len().to_string()),
            ("active-index", &carousel.active_index.to_string()),
            ("hint-visible", &carousel.hint_visible.to_string()),
            ("cards", &cards),
            ("hint", hint),
        ],
    )
}

pub fn github_error(username: &str, error: &FetchError) -> String {
    let retry = error
        .retry_after()
        .map(|retry_after| {
            format!(
                r#"  <p class="github-error__retry">Try again in {}s.</p>"#,
                retry_after.as_secs()
            )
        })
        .unwrap_or_default();

    fill(
        GITHUB_ERROR,
        &[
            ("username", &escape_html(username)),
            ("title", consts::GITHUB_ERROR_TITLE),
            ("message", &escape_html(&error.to_string())),
            ("retry", &retry),
        ],
    )
}

fn repository_card(repo: &Repository, index: usize, active: bool) -> String {
    let commits = repo
        .commits
        .iter()
        .map(commit_row)
        .collect::<Vec<_>>()
        .join("\n");

    fill(
        REPOSITORY_CARD,
        &[
            ("active-class", if active { " is-active" } else { "" }),
            ("index", &index.to_string()),
            ("url", &escape_html(&repo.url)),
            ("name", &escape_html(&repo.name)),
            ("stars", &repo.stars.to_string()),
            (
                "description",
                &escape_html(repo.description.as_deref().unwrap_or_default()),
            ),
            (
                "language",
                &escape_html(repo.language.as_deref().unwrap_or_default()),
            ),
            ("commits", &commits),
        ],
    )
}

fn commit_row(commit: &Commit) -> String {
    fill(
        COMMIT_ROW,
        &[
            ("url", &escape_html(&commit.url)),
            ("sha", &escape_html(&commit.sha)),
            ("message", &escape_html(&commit.message)),
            ("date", &escape_html(&commit.relative_date)),
        ],
    )
}

pub fn writing_widget(articles: &[Article]) -> String {
    let cards = if articles.is_empty() {
        consts::NO_ARTICLES.to_string()
    } else {
        articles
            .iter()
            .map(article_card)
            .collect::<Vec<_>>()
            .join("\n")
    };

    fill(WRITING_WIDGET, &[("cards", &cards)])
}

fn article_card(article: &Article) -> String {
    fill(
        ARTICLE_CARD,
        &[
            ("url", &escape_html(&article.url)),
            ("category", &escape_html(&article.category)),
            ("badge", if article.is_new { consts::NEW_BADGE } else { "" }),
            ("title", &escape_html(&article.title)),
            ("excerpt", &escape_html(&article.excerpt)),
            ("date", &escape_html(&article.date)),
            ("read-time", &escape_html(&article.read_time)),
        ],
    )
}

use chrono::Utc;
use rocket::{
    fairing::AdHoc,
    http::{Cookie, CookieJar},
    response::{content::RawHtml, Redirect},
    State,
};
use shared::{
    activity::ActivityFetcher, carousel::Carousel, sanity::SanityClient,
    writing::transform_posts, Theme, THEME_KEY,
};

use bentolink_server::{config::Site, render};
use tracing::error;

use super::types::CookieHintStore;

#[get("/?<theme>")]
async fn index(
    theme: Option<&str>,
    cookies: &CookieJar<'_>,
    site: &State<Site>,
    fetcher: &State<ActivityFetcher>,
    sanity: &State<SanityClient>,
) -> RawHtml<String> {
    let theme = match theme {
        Some(requested) => {
            let theme = Theme::from_preference(Some(requested));
            remember_theme(cookies, theme);
            theme
        }
        None => Theme::from_preference(cookies.get(THEME_KEY).map(|c| c.value())),
    };

    let (activity, posts) = rocket::tokio::join!(
        fetcher.fetch(&site.github_username),
        sanity.latest_posts(site.posts_limit)
    );

    let github = match &activity {
        Ok(report) => {
            let carousel =
                Carousel::attach(report.repositories.len(), &CookieHintStore(cookies));
            render::github_widget(&site.github_username, report, &carousel)
        }
        Err(e) => {
            error!(
                "Failed to fetch GitHub activity for {}: {e}",
                site.github_username
            );
            render::github_error(&site.github_username, e)
        }
    };
    let writing = render::writing_widget(&transform_posts(posts, Utc::now()));

    RawHtml(render::page(site, theme, &github, &writing))
}

#[post("/theme")]
fn toggle_theme(cookies: &CookieJar<'_>) -> Redirect {
    let current = Theme::from_preference(cookies.get(THEME_KEY).map(|c| c.value()));
    remember_theme(cookies, current.toggle());
    Redirect::to("/")
}

fn remember_theme(cookies: &CookieJar<'_>, theme: Theme) {
    cookies.add(Cookie::build((THEME_KEY, theme.to_string())).path("/").permanent());
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing page entrypoints", |rocket| async {
        rocket.mount("/", rocket::routes![index, toggle_theme])
    })
}

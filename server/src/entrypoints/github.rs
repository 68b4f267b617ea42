use bentolink_server::config::Site;
use rocket::{
    fairing::AdHoc,
    http::{CookieJar, Status},
    serde::json::Json,
    State,
};
use shared::{
    activity::{ActivityFetcher, ActivityReport},
    carousel::HintStore,
    github::is_valid_handle,
};
use tracing::{error, instrument, warn};

use super::types::{ApiError, CarouselRequest, CarouselResponse, CookieHintStore};

/// Only the site owner's activity is served, so the cache holds one entry and
/// the owner's GitHub quota isn't spent on other handles.
#[get("/<username>")]
#[instrument(skip(site, fetcher))]
async fn get_activity(
    username: &str,
    site: &State<Site>,
    fetcher: &State<ActivityFetcher>,
) -> Result<Json<ActivityReport>, ApiError> {
    if !is_valid_handle(username) {
        return Err(ApiError::new(Status::BadRequest, "Invalid GitHub handle"));
    }
    if !username.eq_ignore_ascii_case(&site.github_username) {
        return Err(ApiError::new(
            Status::NotFound,
            format!("No activity is published for {username}"),
        ));
    }

    match fetcher.fetch(&site.github_username).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!("Failed to fetch GitHub activity for {username}: {e}");
            Err(e.into())
        }
    }
}

#[post("/carousel", data = "<request>")]
fn update_carousel(
    request: Json<CarouselRequest>,
    cookies: &CookieJar<'_>,
) -> Json<CarouselResponse> {
    let CarouselRequest {
        mut carousel,
        event,
    } = request.into_inner();
    let effects = carousel.update(event, &mut CookieHintStore(cookies));

    Json(CarouselResponse { carousel, effects })
}

#[post("/scroll-hint")]
fn dismiss_scroll_hint(cookies: &CookieJar<'_>) -> Status {
    if let Err(e) = CookieHintStore(cookies).mark_hint_seen() {
        warn!("Failed to persist scroll hint flag: {e}");
    }
    Status::NoContent
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing GitHub entrypoints", |rocket| async {
        rocket.mount(
            "/api/github/",
            rocket::routes![get_activity, update_carousel, dismiss_scroll_hint],
        )
    })
}

use chrono::Utc;
use rocket::{fairing::AdHoc, serde::json::Json, State};
use shared::{
    sanity::SanityClient,
    writing::{transform_posts, Article},
};

use bentolink_server::config::Site;

#[get("/posts?<limit>")]
async fn get_posts(
    limit: Option<usize>,
    site: &State<Site>,
    sanity: &State<SanityClient>,
) -> Json<Vec<Article>> {
    let posts = sanity
        .latest_posts(limit.unwrap_or(site.posts_limit))
        .await;
    Json(transform_posts(posts, Utc::now()))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing writing entrypoints", |rocket| async {
        rocket.mount("/api/", rocket::routes![get_posts])
    })
}

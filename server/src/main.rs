#[macro_use]
extern crate rocket;

mod entrypoints;

use bentolink_server::{
    activity_fetcher,
    config::{Env, Site},
    refresh,
};
use rocket::{Build, Rocket};
use shared::{activity::ActivityFetcher, sanity::SanityClient};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Everything but the background refresh, so tests can drive the routes with fakes.
fn assemble(site: Site, fetcher: ActivityFetcher, sanity: SanityClient) -> Rocket<Build> {
    rocket::build()
        .manage(site)
        .manage(fetcher)
        .manage(sanity)
        .attach(entrypoints::stage())
}

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = Env::from_env().expect("Failed to load environment variables");
    let fetcher = activity_fetcher(&env).expect("Failed to create GitHub client");
    let sanity = env.sanity_client().expect("Failed to create Sanity client");
    let site = env.site();

    let span = tracing::info_span!("Starting Rocket");
    let _enter = span.enter();

    assemble(site.clone(), fetcher, sanity).attach(refresh::stage(
        site.github_username,
        env.refresh_interval(),
    ))
}

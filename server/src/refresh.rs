use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use rocket::fairing::AdHoc;
use shared::{activity::ActivityFetcher, GithubHandle};
use tracing::{error, info, instrument};

/// Keeps the activity cache warm: refreshes once on liftoff, then every `period`.
///
/// Expects an [`ActivityFetcher`] in rocket's managed state.
pub fn stage(username: GithubHandle, period: Duration) -> AdHoc {
    AdHoc::on_ignite("GitHub activity refresh", move |rocket| async move {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        rocket
            .attach(AdHoc::on_liftoff(
                "Refreshes GitHub activity every X minutes",
                move |rocket| {
                    Box::pin(async move {
                        let Some(fetcher) = rocket.state::<ActivityFetcher>().cloned() else {
                            error!("No activity fetcher managed, background refresh disabled");
                            return;
                        };

                        rocket::tokio::spawn(refresh_loop(fetcher, username, period, running));
                    })
                },
            ))
            .attach(AdHoc::on_shutdown(
                "Stop refreshing GitHub activity",
                move |_| {
                    Box::pin(async move {
                        running_clone.store(false, Ordering::Relaxed);
                    })
                },
            ))
    })
}

/// Ticks every `period`; the flag is read after each tick so nothing runs once
/// shutdown has cleared it.
async fn refresh_loop(
    fetcher: ActivityFetcher,
    username: GithubHandle,
    period: Duration,
    running: Arc<AtomicBool>,
) {
    let mut interval = rocket::tokio::time::interval(period);
    loop {
        interval.tick().await;
        if !running.load(Ordering::Relaxed) {
            info!("Stopped refreshing GitHub activity for {username}");
            break;
        }
        refresh(&fetcher, &username).await;
    }
}

#[instrument(skip(fetcher))]
async fn refresh(fetcher: &ActivityFetcher, username: &str) {
    match fetcher.refresh(username).await {
        Ok(report) => info!(
            "Refreshed activity for {username}: {} repositories, {} commits",
            report.repositories.len(),
            report.commit_count()
        ),
        Err(e) => error!("Failed to refresh GitHub activity for {username}: {e}"),
    }
}

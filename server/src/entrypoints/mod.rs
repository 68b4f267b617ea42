use rocket::fairing::AdHoc;

pub mod github;
pub mod pages;
pub mod posts;
pub mod types;

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .attach(pages::stage())
            .attach(github::stage())
            .attach(posts::stage())
    })
}

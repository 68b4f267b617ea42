pub const SITE_TITLE: &str = "Bentolink Bio";

// Writing widget
pub const NO_ARTICLES: &str = r#"    <div class="article-card">
      <p class="article-card__excerpt">No articles available yet.</p>
    </div>"#;
pub const NEW_BADGE: &str = r#"        <span class="article-card__badge">NEW</span>"#;

// GitHub widget
pub const NO_ACTIVITY: &str = r#"    <p class="github-empty">No recent activity.</p>"#;
pub const SCROLL_HINT: &str =
    r#"  <p class="scroll-hint" aria-hidden="true">Scroll for more repositories →</p>"#;
pub const GITHUB_ERROR_TITLE: &str = "Couldn't load GitHub activity";

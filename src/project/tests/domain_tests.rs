//! Unit tests for project domain values and update semantics.

use crate::clock::FixedClock;
use crate::identity::SubjectId;
use crate::patch::FieldPatch;
use crate::project::domain::{
    GithubRepo, Project, ProjectDomainError, ProjectId, ProjectSeed, ProjectSlug, ProjectStatus,
    ProjectUpdate,
};
use chrono::{DateTime, TimeZone, Utc};
use eyre::ensure;
use rstest::{fixture, rstest};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn clock() -> FixedClock {
    FixedClock::at(base_time())
}

fn owner() -> SubjectId {
    SubjectId::new("subject-owner").expect("valid subject")
}

#[rstest]
#[case("https://github.com/rust-lang/cargo", Some("rust-lang/cargo"))]
#[case("https://github.com/rust-lang/cargo.git", Some("rust-lang/cargo"))]
#[case("https://www.github.com/leptos-rs/leptos", Some("leptos-rs/leptos"))]
#[case("git@github.com:owner/repo", None)]
#[case("https://github.com/owner", None)]
#[case("https://gitlab.com/owner/repo", None)]
#[case("https://github.com/owner/repo?tab=readme", Some("owner/repo"))]
fn github_repo_derivation_from_urls(#[case] url: &str, #[case] expected: Option<&str>) {
    let derived = GithubRepo::from_url(url);
    assert_eq!(derived.as_ref().map(GithubRepo::as_str), expected);
}

#[rstest]
#[case("owner/repo", true)]
#[case("owner/repo/extra", false)]
#[case("owner", false)]
#[case("owner repo/x", false)]
#[case("/repo", false)]
fn github_repo_validation(#[case] value: &str, #[case] is_valid: bool) {
    assert_eq!(GithubRepo::new(value).is_ok(), is_valid);
}

#[rstest]
fn slug_derivation_normalizes_name() {
    let id = ProjectId::new();
    let slug = ProjectSlug::derive("My Fancy  SaaS!", id);
    assert!(slug.as_str().starts_with("my-fancy-saas-"));
}

#[rstest]
fn slug_derivation_falls_back_for_symbol_only_names() {
    let id = ProjectId::new();
    let slug = ProjectSlug::derive("!!!", id);
    assert!(slug.as_str().starts_with("project-"));
}

#[rstest]
fn seed_rejects_empty_name() {
    assert_eq!(
        ProjectSeed::new("   ").map(|_| ()),
        Err(ProjectDomainError::EmptyProjectName)
    );
}

#[rstest]
fn new_project_applies_defaults_and_derives_repo(clock: FixedClock) -> eyre::Result<()> {
    let seed = ProjectSeed::new("Tracker")?.with_github_url("https://github.com/acme/tracker.git");
    let project = Project::new(owner(), seed, &clock);

    ensure!(project.kind() == "saas");
    ensure!(project.category() == "commercial");
    ensure!(project.status() == ProjectStatus::Planning);
    ensure!(project.github_stars() == 0);
    ensure!(project.github_forks() == 0);
    ensure!(project.npm_downloads() == 0);
    ensure!(project.github_repo().map(GithubRepo::as_str) == Some("acme/tracker"));
    ensure!(project.created_at() == base_time());
    Ok(())
}

#[rstest]
fn explicit_repo_overrides_url_derivation(clock: FixedClock) -> eyre::Result<()> {
    let seed = ProjectSeed::new("Tracker")?
        .with_github_url("https://github.com/acme/tracker")
        .with_github_repo(GithubRepo::new("acme/other")?);
    let project = Project::new(owner(), seed, &clock);

    ensure!(project.github_repo().map(GithubRepo::as_str) == Some("acme/other"));
    Ok(())
}

#[rstest]
fn clearing_github_url_keeps_derived_repo(clock: FixedClock) -> eyre::Result<()> {
    let seed = ProjectSeed::new("Tracker")?.with_github_url("https://github.com/acme/tracker");
    let mut project = Project::new(owner(), seed, &clock);

    project.apply_update(
        ProjectUpdate::new().github_url(FieldPatch::Clear),
        &clock,
    );

    ensure!(project.github_url().is_none());
    ensure!(project.github_repo().map(GithubRepo::as_str) == Some("acme/tracker"));
    Ok(())
}

#[rstest]
fn new_url_re_derives_repo(clock: FixedClock) -> eyre::Result<()> {
    let seed = ProjectSeed::new("Tracker")?.with_github_url("https://github.com/acme/tracker");
    let mut project = Project::new(owner(), seed, &clock);

    project.apply_update(
        ProjectUpdate::new().github_url(FieldPatch::Set("https://github.com/acme/rewrite".to_owned())),
        &clock,
    );

    ensure!(project.github_url() == Some("https://github.com/acme/rewrite"));
    ensure!(project.github_repo().map(GithubRepo::as_str) == Some("acme/rewrite"));
    Ok(())
}

#[rstest]
fn unparseable_new_url_keeps_previous_repo(clock: FixedClock) -> eyre::Result<()> {
    let seed = ProjectSeed::new("Tracker")?.with_github_url("https://github.com/acme/tracker");
    let mut project = Project::new(owner(), seed, &clock);

    project.apply_update(
        ProjectUpdate::new().github_url(FieldPatch::Set("https://example.com/acme".to_owned())),
        &clock,
    );

    ensure!(project.github_url() == Some("https://example.com/acme"));
    ensure!(project.github_repo().map(GithubRepo::as_str) == Some("acme/tracker"));
    Ok(())
}

#[rstest]
fn explicit_repo_patch_wins_over_url_derivation(clock: FixedClock) -> eyre::Result<()> {
    let mut project = Project::new(owner(), ProjectSeed::new("Tracker")?, &clock);

    project.apply_update(
        ProjectUpdate::new()
            .github_url(FieldPatch::Set("https://github.com/acme/derived".to_owned()))
            .github_repo(FieldPatch::Set(GithubRepo::new("acme/explicit")?)),
        &clock,
    );

    ensure!(project.github_repo().map(GithubRepo::as_str) == Some("acme/explicit"));
    Ok(())
}

#[rstest]
fn update_refreshes_updated_at(clock: FixedClock) -> eyre::Result<()> {
    let mut project = Project::new(owner(), ProjectSeed::new("Tracker")?, &clock);
    clock.advance(chrono::Duration::minutes(5));

    project.apply_update(ProjectUpdate::new().name("Renamed"), &clock);

    ensure!(project.name() == "Renamed");
    ensure!(project.updated_at() == base_time() + chrono::Duration::minutes(5));
    ensure!(project.created_at() == base_time());
    Ok(())
}

#[rstest]
#[case(ProjectStatus::Planning, "planning")]
#[case(ProjectStatus::Development, "development")]
#[case(ProjectStatus::Alpha, "alpha")]
#[case(ProjectStatus::Beta, "beta")]
#[case(ProjectStatus::OfficialRelease, "official-release")]
fn status_round_trips_through_storage_form(
    #[case] status: ProjectStatus,
    #[case] stored: &str,
) -> eyre::Result<()> {
    ensure!(status.as_str() == stored);
    ensure!(ProjectStatus::try_from(stored)? == status);
    Ok(())
}

use chrono::{DateTime, Utc};
use common::{
    entities::issue::Issue,
    error,
    repository::RepositoryObject,
};

pub const SAMPLE_PROJECT: &str = "apitest";

/// Demo issues for [`SAMPLE_PROJECT`]. They carry `now` as expiry origin, so
/// they age out like everything else.
pub fn sample_issues(now: DateTime<Utc>) -> Vec<Issue> {
    let sample = |title: &str,
                  text: &str,
                  created_by: &str,
                  assigned_to: &str,
                  status_text: &str,
                  open: bool| Issue {
        id: None,
        project_name: SAMPLE_PROJECT.to_string(),
        issue_title: title.to_string(),
        issue_text: text.to_string(),
        created_by: created_by.to_string(),
        assigned_to: assigned_to.to_string(),
        status_text: status_text.to_string(),
        open,
        created_on: now,
        updated_on: now,
        expire_from: now,
    };

    vec![
        sample(
            "Fix error in posting data",
            "When we post data it has an error.",
            "Joe",
            "Joe",
            "In QA",
            true,
        ),
        sample(
            "Add dark mode",
            "The issue page is hard to read at night.",
            "Alice",
            "",
            "",
            true,
        ),
        sample(
            "Typo on landing page",
            "\"Isues\" should read \"Issues\".",
            "Bob",
            "Alice",
            "Deployed",
            false,
        ),
    ]
}

pub async fn insert_sample_issues(issues: &RepositoryObject<Issue>) -> error::Result<usize> {
    let inserted = issues.insert_many(&sample_issues(Utc::now())).await?;
    log::info!("Inserted {} sample issues into project {}", inserted, SAMPLE_PROJECT);
    Ok(inserted)
}

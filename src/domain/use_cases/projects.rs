use tracing::info;

use crate::{
    codec::ArrayCodec,
    entities::project::{NewProjectRequest, Project, ProjectDeletedResponse, UpdateProjectRequest},
    errors::AppError,
    query::ProjectListParams,
    repositories::project::ProjectRepository,
    utils::valid_uuid::valid_uuid,
};

const NOT_FOUND: &str = "Project not found";

pub struct ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
    codec: ArrayCodec,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R, codec: ArrayCodec) -> Self {
        ProjectHandler { project_repo, codec }
    }

    /// Lists projects matching the publish/feature flags, in display order.
    pub async fn list_projects(&self, params: ProjectListParams) -> Result<Vec<Project>, AppError> {
        let query = params.into_query();

        let records = self
            .project_repo
            .find_many(&query)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to fetch projects"))?;

        records
            .into_iter()
            .map(|record| Project::from_record(record, &self.codec))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::from(e).in_context(NOT_FOUND, "Failed to fetch projects"))
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;

        let record = self
            .project_repo
            .find_by_id(&id)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to fetch project"))?;

        Ok(Project::from_record(record, &self.codec)?)
    }

    /// Validates, encodes array fields and stores the project in a single
    /// write. Nothing is written when validation fails.
    pub async fn create_project(&self, request: NewProjectRequest) -> Result<Project, AppError> {
        let insert = request.prepare_for_insert(&self.codec)?;

        let record = self
            .project_repo
            .create(insert)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to create project"))?;

        info!(project_id = %record.id, "Project created");
        Ok(Project::from_record(record, &self.codec)?)
    }

    /// Applies only the fields present in the request.
    pub async fn update_project(&self, id: &str, request: UpdateProjectRequest) -> Result<Project, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let changes = request.prepare_for_update(&self.codec)?;

        let record = self
            .project_repo
            .update(&id, changes)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to update project"))?;

        info!(project_id = %record.id, "Project updated");
        Ok(Project::from_record(record, &self.codec)?)
    }

    pub async fn delete_project(&self, id: &str) -> Result<ProjectDeletedResponse, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;

        self.project_repo
            .delete(&id)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to delete project"))?;

        info!(project_id = %id, "Project deleted");
        Ok(ProjectDeletedResponse { success: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::DecodePolicy,
        entities::{
            option_fields::OptionField,
            project::{ProjectChanges, ProjectInsert, ProjectRecord},
        },
        query::ProjectQuery,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::{mock, predicate::always};
    use serde_json::json;
    use uuid::Uuid;

    mock! {
        pub ProjectRepo {}

        #[async_trait]
        impl ProjectRepository for ProjectRepo {
            async fn create(&self, project: ProjectInsert) -> Result<ProjectRecord, AppError>;
            async fn find_many(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, AppError>;
            async fn find_by_id(&self, id: &Uuid) -> Result<ProjectRecord, AppError>;
            async fn update(&self, id: &Uuid, changes: ProjectChanges) -> Result<ProjectRecord, AppError>;
            async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
        }
    }

    fn record(technologies: Option<&str>) -> ProjectRecord {
        let now = Utc::now();
        ProjectRecord {
            id: Uuid::new_v4(),
            title: "Portfolio".into(),
            description: "Personal site".into(),
            long_description: None,
            category: "Website".into(),
            technologies: technologies.map(String::from),
            features: None,
            image_url: None,
            live_url: None,
            github_url: None,
            published: true,
            featured: false,
            display_order: 0,
            difficulty: "Intermediate".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn invalid_create_issues_no_writes() {
        let mut repo = MockProjectRepo::new();
        repo.expect_create().never();

        let handler = ProjectHandler::new(repo, ArrayCodec::default());
        let request: NewProjectRequest = serde_json::from_value(json!({
            "title": "",
            "description": "x",
            "category": "Spaceship"
        }))
        .unwrap();

        let err = handler.create_project(request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn create_encodes_arrays_and_writes_once() {
        let mut repo = MockProjectRepo::new();
        repo.expect_create()
            .times(1)
            .withf(|insert| insert.technologies == r#"["React","Next.js"]"# && insert.features == "[]")
            .returning(|insert| Ok(insert.into_record(Uuid::new_v4())));

        let handler = ProjectHandler::new(repo, ArrayCodec::default());
        let request: NewProjectRequest = serde_json::from_value(json!({
            "title": "Portfolio",
            "description": "Personal site",
            "category": "Website",
            "technologies": ["React", "Next.js"],
            "techInput": "Tail"
        }))
        .unwrap();

        let project = handler.create_project(request).await.unwrap();
        assert_eq!(project.technologies, vec!["React", "Next.js"]);
        assert!(project.features.is_empty());
    }

    #[tokio::test]
    async fn partial_update_never_carries_absent_arrays() {
        let mut repo = MockProjectRepo::new();
        repo.expect_update()
            .times(1)
            .withf(|_, changes| {
                changes.technologies.is_unchanged()
                    && changes.features.is_unchanged()
                    && changes.featured == Some(true)
                    && changes.title.is_none()
            })
            .returning(|_, _| Ok(record(Some(r#"["Rust"]"#))));

        let handler = ProjectHandler::new(repo, ArrayCodec::default());
        let request: UpdateProjectRequest = serde_json::from_value(json!({ "featured": true })).unwrap();

        let project = handler
            .update_project(&Uuid::new_v4().to_string(), request)
            .await
            .unwrap();
        assert_eq!(project.technologies, vec!["Rust"]);
    }

    #[tokio::test]
    async fn update_with_null_array_clears_column() {
        let mut repo = MockProjectRepo::new();
        repo.expect_update()
            .times(1)
            .withf(|_, changes| changes.features == OptionField::SetToNull)
            .returning(|_, _| Ok(record(None)));

        let handler = ProjectHandler::new(repo, ArrayCodec::default());
        let request: UpdateProjectRequest = serde_json::from_value(json!({ "features": null })).unwrap();

        let project = handler
            .update_project(&Uuid::new_v4().to_string(), request)
            .await
            .unwrap();
        assert!(project.features.is_empty());
    }

    #[tokio::test]
    async fn malformed_id_is_not_found_without_storage_access() {
        let mut repo = MockProjectRepo::new();
        repo.expect_find_by_id().never();
        repo.expect_delete().never();

        let handler = ProjectHandler::new(repo, ArrayCodec::default());
        for result in [
            handler.get_project("nope").await.map(|_| ()),
            handler.delete_project("nope").await.map(|_| ()),
        ] {
            match result {
                Err(AppError::NotFound(msg)) => assert_eq!(msg, NOT_FOUND),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn storage_failures_are_relabelled() {
        let mut repo = MockProjectRepo::new();
        repo.expect_find_many()
            .with(always())
            .returning(|_| Err(AppError::StorageFailure("Database operation failed".into())));

        let handler = ProjectHandler::new(repo, ArrayCodec::default());
        let err = handler.list_projects(ProjectListParams::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch projects");
    }

    #[tokio::test]
    async fn strict_policy_surfaces_corrupt_rows() {
        let mut repo = MockProjectRepo::new();
        repo.expect_find_many()
            .returning(|_| Ok(vec![record(Some("React, Next.js"))]));

        let lenient = ProjectHandler::new(repo, ArrayCodec::new(DecodePolicy::Lenient));
        let projects = lenient.list_projects(ProjectListParams::default()).await.unwrap();
        assert!(projects[0].technologies.is_empty());

        let mut repo = MockProjectRepo::new();
        repo.expect_find_many()
            .returning(|_| Ok(vec![record(Some("React, Next.js"))]));

        let strict = ProjectHandler::new(repo, ArrayCodec::new(DecodePolicy::Strict));
        let err = strict.list_projects(ProjectListParams::default()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }
}

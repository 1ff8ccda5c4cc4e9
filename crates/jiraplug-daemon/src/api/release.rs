use super::{ApiError, Result};
use crate::ipc::protocol::{CreateReleaseParams, GetReleaseTasksParams};
use crate::ipc::Outcome;

pub fn create_release(params: CreateReleaseParams) -> Result<Outcome> {
    tracing::debug!(
        "createRelease requested for release {:?} with {} task(s)",
        params.release_name,
        params.task_numbers.len()
    );
    Err(ApiError::NotImplemented("createRelease"))
}

pub fn get_release_tasks(params: GetReleaseTasksParams) -> Result<Outcome> {
    tracing::debug!(
        "getReleaseTasks requested for release {:?} of project {:?}",
        params.release_name,
        params.project_key
    );
    Err(ApiError::NotImplemented("getReleaseTasks"))
}

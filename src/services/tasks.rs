use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::Role;
use crate::entities::task::{self, Entity as Task};
use crate::entities::task_log::{self, Entity as TaskLog};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Operator task modes. Starting a task closes any task the operator still
/// has open, so the open log row (end_time null) is always the operator's
/// current mode and doubles as the resume record after a client restart.
#[derive(Clone)]
pub struct TaskService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

/// An operator's current mode: the task plus its open log row.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ActiveTask {
    pub task: task::Model,
    pub log: task_log::Model,
}

impl TaskService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<task::Model>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = Task::find().order_by_asc(task::Column::Name).all(db).await?;
        Ok(tasks)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        allowed_roles: &[Role],
        is_timed: bool,
    ) -> Result<task::Model, ServiceError> {
        let db = &*self.db_pool;
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("task name must not be empty".into()));
        }
        if allowed_roles.is_empty() {
            return Err(ServiceError::Validation(
                "task must allow at least one role".into(),
            ));
        }
        let roles = allowed_roles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let task = task::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            allowed_roles: Set(roles),
            is_timed: Set(is_timed),
        }
        .insert(db)
        .await?;
        Ok(task)
    }

    /// Switches the operator into a task. The operator's role must appear in
    /// the task's allowed list; any currently open task log is closed first.
    #[instrument(skip(self))]
    pub async fn start(
        &self,
        task_name: &str,
        operator_email: &str,
        operator_role: Role,
    ) -> Result<ActiveTask, ServiceError> {
        let db = &*self.db_pool;
        let task = Task::find()
            .filter(task::Column::Name.eq(task_name))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("task {task_name} not found")))?;

        let allowed = task
            .allowed_roles
            .split(',')
            .any(|r| r.trim().eq_ignore_ascii_case(&operator_role.to_string()));
        if !allowed {
            return Err(ServiceError::Forbidden(format!(
                "role {operator_role} may not start task {task_name}"
            )));
        }

        self.close_open_logs(operator_email).await?;

        let log = task_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_id: Set(task.id),
            operator_email: Set(operator_email.to_string()),
            start_time: Set(Utc::now()),
            end_time: Set(None),
        }
        .insert(db)
        .await?;

        let _ = self
            .event_sender
            .send(Event::TaskStarted {
                log_id: log.id,
                task_name: task.name.clone(),
                operator_email: operator_email.to_string(),
            })
            .await;
        Ok(ActiveTask { task, log })
    }

    /// Ends the operator's current task, if any.
    #[instrument(skip(self))]
    pub async fn finish(&self, operator_email: &str) -> Result<Option<ActiveTask>, ServiceError> {
        let db = &*self.db_pool;
        let Some(open) = self.open_log(operator_email).await? else {
            return Ok(None);
        };
        let task = Task::find_by_id(open.task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::Internal("task log without task".into()))?;

        let mut active: task_log::ActiveModel = open.into();
        active.end_time = Set(Some(Utc::now()));
        let log = active.update(db).await?;

        let _ = self
            .event_sender
            .send(Event::TaskFinished {
                log_id: log.id,
                task_name: task.name.clone(),
                operator_email: operator_email.to_string(),
            })
            .await;
        Ok(Some(ActiveTask { task, log }))
    }

    /// The operator's current mode, used by clients to resume a timed task
    /// after a reload.
    #[instrument(skip(self))]
    pub async fn active(&self, operator_email: &str) -> Result<Option<ActiveTask>, ServiceError> {
        let db = &*self.db_pool;
        let Some(log) = self.open_log(operator_email).await? else {
            return Ok(None);
        };
        let task = Task::find_by_id(log.task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::Internal("task log without task".into()))?;
        Ok(Some(ActiveTask { task, log }))
    }

    async fn open_log(
        &self,
        operator_email: &str,
    ) -> Result<Option<task_log::Model>, ServiceError> {
        let db = &*self.db_pool;
        let log = TaskLog::find()
            .filter(task_log::Column::OperatorEmail.eq(operator_email))
            .filter(task_log::Column::EndTime.is_null())
            .order_by_desc(task_log::Column::StartTime)
            .one(db)
            .await?;
        Ok(log)
    }

    async fn close_open_logs(&self, operator_email: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let open = TaskLog::find()
            .filter(task_log::Column::OperatorEmail.eq(operator_email))
            .filter(task_log::Column::EndTime.is_null())
            .all(db)
            .await?;
        for log in open {
            let mut active: task_log::ActiveModel = log.into();
            active.end_time = Set(Some(Utc::now()));
            active.update(db).await?;
        }
        Ok(())
    }
}

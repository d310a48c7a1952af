//! Task tracker: an ordered task list persisted as a full snapshot after
//! every mutation, plus the read-only board rendering and countdown ticker.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    error::AppError,
    model::Task,
    storage::{Storage, TASKS_KEY},
};

const TASK_NOT_FOUND: &str = "Task not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

impl TaskFilter {
    pub fn matches(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
            TaskFilter::Overdue => task.is_overdue(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
}

/// Transient notification shown after a task operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: &'static str,
    pub kind: NoticeKind,
}

impl Notice {
    fn success(message: &'static str) -> Self {
        Self {
            message,
            kind: NoticeKind::Success,
        }
    }

    fn info(message: &'static str) -> Self {
        Self {
            message,
            kind: NoticeKind::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub overdue: bool,
    pub removing: bool,
    pub due_label: Option<String>,
    pub countdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub filter: TaskFilter,
    pub tasks: Vec<TaskView>,
    /// Percent of all tasks completed, rounded.
    pub progress: u8,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug)]
pub struct TaskTracker {
    tasks: Vec<Task>,
    removing: HashSet<i64>,
    last_id: i64,
    storage: Storage,
}

impl TaskTracker {
    /// Restores the last snapshot, or starts empty when none was written.
    pub async fn load(storage: Storage) -> Result<Self, AppError> {
        let tasks: Vec<Task> = match storage.get(TASKS_KEY).await? {
            Some(snapshot) => serde_json::from_str(&snapshot)?,
            None => Vec::new(),
        };

        info!("Loaded {} tasks", tasks.len());

        Ok(Self {
            last_id: tasks.iter().map(|t| t.id).max().unwrap_or(0),
            tasks,
            removing: HashSet::new(),
            storage,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    async fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        let snapshot = serde_json::to_string(tasks)?;
        self.storage.set(TASKS_KEY, &snapshot).await?;
        debug!("Saved snapshot of {} tasks", tasks.len());
        Ok(())
    }

    // the in-memory list only changes once its snapshot is stored
    async fn persist(&mut self, tasks: Vec<Task>) -> Result<(), AppError> {
        self.save(&tasks).await?;
        self.tasks = tasks;
        Ok(())
    }

    // creation time in ms, bumped past the previous id when adds land in the same ms
    fn next_id(&self) -> i64 {
        Utc::now().timestamp_millis().max(self.last_id + 1)
    }

    fn position(&self, id: i64) -> Result<usize, AppError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.to_string()))
    }

    pub async fn add(
        &mut self,
        title: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<(Task, Notice), AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Task title cannot be empty!".to_string()));
        }

        let task = Task {
            id: self.next_id(),
            title: title.to_string(),
            completed: false,
            due_date,
        };

        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.push(task.clone());
        tasks.extend(self.tasks.iter().cloned());
        self.persist(tasks).await?;
        self.last_id = task.id;

        Ok((task, Notice::success("Task added successfully!")))
    }

    pub async fn toggle(&mut self, id: i64) -> Result<(Task, Notice), AppError> {
        let index = self.position(id)?;
        let mut tasks = self.tasks.clone();
        tasks[index].completed = !tasks[index].completed;
        let task = tasks[index].clone();

        self.persist(tasks).await?;

        let notice = if task.completed {
            Notice::info("Task completed!")
        } else {
            Notice::info("Task marked active.")
        };
        Ok((task, notice))
    }

    /// Flags a task for removal so renders can show it fading out.
    pub fn mark_removing(&mut self, id: i64) -> Result<(), AppError> {
        self.position(id)?;
        self.removing.insert(id);
        Ok(())
    }

    /// Removes the task. The removing flag clears even when the save fails.
    pub async fn delete(&mut self, id: i64) -> Result<(Task, Notice), AppError> {
        self.removing.remove(&id);
        let index = self.position(id)?;
        let mut tasks = self.tasks.clone();
        let task = tasks.remove(index);

        self.persist(tasks).await?;

        Ok((task, Notice::success("Task deleted successfully.")))
    }

    /// Moves `dragged` into the slot `target` occupied before the move.
    pub async fn reorder(&mut self, dragged: i64, target: i64) -> Result<&[Task], AppError> {
        let from = self.position(dragged)?;
        let to = self.position(target)?;

        if from != to {
            let mut tasks = self.tasks.clone();
            let task = tasks.remove(from);
            tasks.insert(to, task);
            self.persist(tasks).await?;
        }

        Ok(&self.tasks)
    }

    pub fn progress(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        (completed as f64 / self.tasks.len() as f64 * 100.0).round() as u8
    }

    pub fn view(&self, task: &Task, now: DateTime<Utc>) -> TaskView {
        TaskView {
            overdue: task.is_overdue(now),
            removing: self.removing.contains(&task.id),
            due_label: task.due_date.map(due_label),
            countdown: task
                .due_date
                .filter(|_| !task.completed)
                .map(|due| countdown(due, now))
                .unwrap_or_default(),
            task: task.clone(),
        }
    }

    pub fn render(&self, filter: TaskFilter, now: DateTime<Utc>) -> Board {
        let tasks: Vec<TaskView> = self
            .tasks
            .iter()
            .filter(|t| filter.matches(t, now))
            .map(|t| self.view(t, now))
            .collect();

        let empty_message = match (self.tasks.is_empty(), tasks.is_empty()) {
            (true, _) => Some("No tasks yet."),
            (false, true) => Some("No tasks match the current filter."),
            _ => None,
        };

        Board {
            filter,
            tasks,
            progress: self.progress(),
            empty_message,
        }
    }
}

/// e.g. `Oct 19, 2026, 09:30 AM`
pub fn due_label(due: DateTime<Utc>) -> String {
    due.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Remaining time until `due`, like `(2d 3h 15m)`. Seconds only show inside
/// the last five minutes. Empty once the due time has passed.
pub fn countdown(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = (due - now).num_milliseconds();
    if remaining < 0 {
        return String::new();
    }

    let total = remaining / 1000;
    let seconds = total % 60;
    let minutes = (total / 60) % 60;
    let hours = (total / 3600) % 24;
    let days = total / 86_400;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 && days == 0 && hours == 0 && minutes < 5 {
        parts.push(format!("{seconds}s"));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("({})", parts.join(" "))
    }
}

/// Recomputes every task view once per `period` and publishes it. Stops
/// when the last receiver is dropped.
pub fn spawn_countdown_ticker(
    tracker: Arc<Mutex<TaskTracker>>,
    tick: watch::Sender<Vec<TaskView>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;

            let views = {
                let tracker = tracker.lock().await;
                tracker.render(TaskFilter::All, Utc::now()).tasks
            };

            if tick.send(views).is_err() {
                debug!("Countdown ticker has no listeners, stopping");
                break;
            }
        }
    })
}

//! Aggregated load progress.
//!
//! Every load task owns one slot on a [`LoadStatusBoard`]. Whenever a slot changes the board
//! renders all slots into one multi-line status text, publishes it to subscribers and calls the
//! optional listener (the loading overlay).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Pending,
    Running,
    Done,
    Failed,
}

/// Identity and progress of one unit of load work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTask {
    pub name: String,
    pub ordinal: usize,
    pub loaded: u64,
    pub total: u64,
    pub state: TaskState,
}

impl LoadTask {
    /// Progress in `[0, 1]`. Unknown totals count as 0 until the task is done.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.state == TaskState::Done {
            return 1.0;
        }
        if self.total == 0 {
            return 0.0;
        }
        (self.loaded as f64 / self.total as f64).clamp(0.0, 1.0) as f32
    }

    fn percent(&self) -> u64 {
        match (self.state, self.total) {
            (TaskState::Done, 0) => 100,
            (_, 0) => 0,
            (_, total) => self.loaded.min(total) * 100 / total,
        }
    }
}

impl fmt::Display for LoadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            TaskState::Pending => write!(f, "Loading {}...", self.name),
            TaskState::Failed => write!(f, "Loading {}... failed", self.name),
            TaskState::Running | TaskState::Done => write!(
                f,
                "Loading {}... {}/{} ({}%)",
                self.name,
                self.loaded,
                self.total,
                self.percent()
            ),
        }
    }
}

type Listener = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct BoardInner {
    tasks: Vec<LoadTask>,
    subscribers: Vec<flume::Sender<String>>,
    listener: Option<Listener>,
}

impl BoardInner {
    fn render(&self) -> String {
        self.tasks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn publish(&mut self) {
        let text = self.render();
        self.subscribers.retain(|tx| tx.send(text.clone()).is_ok());
        if let Some(listener) = &self.listener {
            listener(&text);
        }
    }
}

/// Shared progress board. Cloning yields another handle to the same board.
#[derive(Clone, Default)]
pub struct LoadStatusBoard {
    inner: Arc<Mutex<BoardInner>>,
}

impl fmt::Debug for LoadStatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadStatusBoard")
            .field("tasks", &self.inner.lock().tasks)
            .finish_non_exhaustive()
    }
}

impl LoadStatusBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives the full status text after every change.
    #[must_use]
    pub fn subscribe(&self) -> flume::Receiver<String> {
        let (tx, rx) = flume::unbounded();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    /// Installs the listener called synchronously with the status text after every change.
    ///
    /// The listener runs while the board is locked and must not call back into the board.
    pub fn set_listener(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        self.inner.lock().listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&self) {
        self.inner.lock().listener = None;
    }

    /// Adds a task slot; slots render in registration order. Returns the ordinal.
    pub fn register(&self, name: &str) -> usize {
        let mut inner = self.inner.lock();
        let ordinal = inner.tasks.len();
        inner.tasks.push(LoadTask {
            name: name.to_string(),
            ordinal,
            loaded: 0,
            total: 0,
            state: TaskState::Pending,
        });
        ordinal
    }

    pub fn update(&self, ordinal: usize, loaded: u64, total: u64) {
        let mut inner = self.inner.lock();
        let Some(task) = inner.tasks.get_mut(ordinal) else {
            return;
        };
        task.loaded = loaded;
        task.total = total;
        task.state = TaskState::Running;
        inner.publish();
    }

    pub fn finish(&self, ordinal: usize) {
        self.set_state(ordinal, TaskState::Done);
    }

    pub fn fail(&self, ordinal: usize) {
        self.set_state(ordinal, TaskState::Failed);
    }

    fn set_state(&self, ordinal: usize, state: TaskState) {
        let mut inner = self.inner.lock();
        let Some(task) = inner.tasks.get_mut(ordinal) else {
            return;
        };
        task.state = state;
        inner.publish();
    }

    #[must_use]
    pub fn tasks(&self) -> Vec<LoadTask> {
        self.inner.lock().tasks.clone()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.inner.lock().render()
    }

    /// Mean fraction over all tasks.
    #[must_use]
    pub fn overall_fraction(&self) -> f32 {
        let inner = self.inner.lock();
        if inner.tasks.is_empty() {
            return 0.0;
        }
        inner.tasks.iter().map(LoadTask::fraction).sum::<f32>() / inner.tasks.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_registration_order() {
        let board = LoadStatusBoard::new();
        let rx = board.subscribe();
        let idle = board.register("idle");
        let model = board.register("model");

        board.update(model, 50, 200);
        board.update(idle, 10, 10);
        board.finish(idle);

        assert_eq!(
            board.text(),
            "Loading idle... 10/10 (100%)\nLoading model... 50/200 (25%)"
        );
        assert_eq!(rx.try_iter().count(), 3);
        assert!((board.overall_fraction() - 0.625).abs() < 1e-6);
    }

    #[test]
    fn percent_is_floored() {
        let board = LoadStatusBoard::new();
        let t = board.register("walk");
        board.update(t, 2, 3);
        assert_eq!(board.text(), "Loading walk... 2/3 (66%)");
    }
}

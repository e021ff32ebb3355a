//! Cooperative single-shot task scheduler driven by explicit time steps.

/// Handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Task<T> {
    id: TaskId,
    due: f64,
    payload: T,
}

/// Deferred payloads that fire once their delay elapses.
///
/// Nothing fires outside [`Scheduler::advance`], and a cancelled task never fires.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Scheduler<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Queue `payload` to fire `delay` seconds from now. Negative delays fire
    /// on the next advance.
    pub fn schedule(&mut self, delay: f32, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let delay = if delay.is_finite() { f64::from(delay.max(0.0)) } else { 0.0 };
        self.tasks.push(Task {
            id,
            due: self.now + delay,
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Move time forward and return due payloads ordered by due time, then
    /// by scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        if dt.is_finite() && dt > 0.0 {
            self.now += f64::from(dt);
        }
        let now = self.now;
        let (mut due, pending): (Vec<Task<T>>, Vec<Task<T>>) =
            std::mem::take(&mut self.tasks)
                .into_iter()
                .partition(|task| task.due <= now);
        self.tasks = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due.into_iter().map(|task| task.payload).collect()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    /// Drop every task and rewind the clock.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.now = 0.0;
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

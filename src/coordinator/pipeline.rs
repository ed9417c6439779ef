// ABOUTME: Ordered, titled task sequences over an owned context value.
// ABOUTME: Tasks run strictly one after another; the first failure aborts the sequence.

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::output::Output;

type StepFuture<'a, C> = Pin<Box<dyn Future<Output = Result<C>> + 'a>>;
type StepFn<'a, C> = Box<dyn FnOnce(C) -> StepFuture<'a, C> + 'a>;

struct Task<'a, C> {
    title: String,
    enabled: bool,
    run: StepFn<'a, C>,
}

/// A named sequence of tasks. Each task takes the context by value and hands
/// back the (possibly updated) context for the next task.
pub struct Pipeline<'a, C> {
    name: &'static str,
    tasks: Vec<Task<'a, C>>,
}

impl<'a, C: 'a> Pipeline<'a, C> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tasks: Vec::new(),
        }
    }

    pub fn task<F, Fut>(self, title: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(C) -> Fut + 'a,
        Fut: Future<Output = Result<C>> + 'a,
    {
        self.task_when(true, title, run)
    }

    /// Add a task that only runs when `enabled`; otherwise it is reported as skipped.
    pub fn task_when<F, Fut>(mut self, enabled: bool, title: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(C) -> Fut + 'a,
        Fut: Future<Output = Result<C>> + 'a,
    {
        self.tasks.push(Task {
            title: title.into(),
            enabled,
            run: Box::new(move |ctx| -> StepFuture<'a, C> { Box::pin(run(ctx)) }),
        });
        self
    }

    pub fn titles(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.title.as_str()).collect()
    }

    pub async fn run(self, mut context: C, output: &Output) -> Result<C> {
        let total = self.tasks.len();
        tracing::debug!(pipeline = self.name, steps = ?self.titles(), "starting");
        for (index, task) in self.tasks.into_iter().enumerate() {
            output.step(index + 1, total, &task.title, !task.enabled);
            if !task.enabled {
                tracing::debug!(pipeline = self.name, task = %task.title, "skipped");
                continue;
            }

            tracing::debug!(pipeline = self.name, task = %task.title, "running");
            context = (task.run)(context).await.inspect_err(|e| {
                tracing::error!(pipeline = self.name, task = %task.title, error = %e, "task failed");
            })?;
        }
        Ok(context)
    }
}

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use slidedeck_commands::{Command, CommandHistory, CommandMeta};
use slidedeck_core::{DomainError, DomainResult};

/// Minimal in-memory command: sets a shared counter.
#[derive(Debug)]
struct SetCounter {
    meta: CommandMeta,
    value: i64,
    prior: Option<i64>,
    counter: Arc<AtomicI64>,
}

impl SetCounter {
    fn boxed(counter: &Arc<AtomicI64>, value: i64) -> Box<dyn Command> {
        Box::new(Self {
            meta: CommandMeta::new("bench.set", Uuid::nil(), "counter"),
            value,
            prior: None,
            counter: counter.clone(),
        })
    }
}

#[async_trait]
impl Command for SetCounter {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn description(&self) -> String {
        format!("Set counter to {}", self.value)
    }

    fn payload(&self) -> JsonValue {
        serde_json::json!({ "value": self.value })
    }

    async fn apply(&mut self) -> DomainResult<()> {
        self.prior = Some(self.counter.swap(self.value, Ordering::SeqCst));
        Ok(())
    }

    async fn revert(&mut self) -> DomainResult<()> {
        let prior = self
            .prior
            .ok_or_else(|| DomainError::invariant("not executed"))?;
        self.counter.store(prior, Ordering::SeqCst);
        Ok(())
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

/// Execute at a full history: push + evict + redo clear on every iteration.
fn bench_execute_at_capacity(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("history_execute_at_capacity");

    for depth in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let counter = Arc::new(AtomicI64::new(0));
            let mut history = CommandHistory::with_capacity(depth);
            rt.block_on(async {
                for i in 0..depth as i64 {
                    history.execute(SetCounter::boxed(&counter, i)).await.unwrap();
                }
            });

            let mut i = 0i64;
            b.iter(|| {
                i += 1;
                rt.block_on(history.execute(SetCounter::boxed(&counter, black_box(i))))
                    .unwrap();
            });
        });
    }

    group.finish();
}

/// Undo immediately followed by redo of the top command.
fn bench_undo_redo_cycle(c: &mut Criterion) {
    let rt = runtime();
    let counter = Arc::new(AtomicI64::new(0));
    let mut history = CommandHistory::new();
    rt.block_on(async {
        for i in 0..50 {
            history.execute(SetCounter::boxed(&counter, i)).await.unwrap();
        }
    });

    c.bench_function("history_undo_redo_cycle", |b| {
        b.iter(|| {
            rt.block_on(async {
                history.undo().await.unwrap();
                history.redo().await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_execute_at_capacity, bench_undo_redo_cycle);
criterion_main!(benches);

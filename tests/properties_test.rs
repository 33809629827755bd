//! Property tests for projection purity and destroy-wins ordering

use proptest::prelude::*;
use search_index_sync::search::dispatch::DispatchWorkers;
use search_index_sync::{
    CommandKind, EntityId, IndexCommand, Indexable, LifecycleCoordinator, SearchEntry, SyncSwitch,
};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::RecordingTransport;

#[derive(Debug, Clone)]
struct Answer {
    id: String,
    body: String,
    votes: i64,
    tags: Vec<String>,
}

impl Indexable for Answer {
    fn identity(&self) -> EntityId {
        EntityId::from(self.id.as_str())
    }

    fn entry_type(&self) -> &str {
        "Answer"
    }

    fn search_entry(&self) -> SearchEntry {
        SearchEntry::for_entity(self)
            .field("body", &self.body)
            .field("votes", self.votes)
            .field("tags", self.tags.clone())
    }
}

fn answer_strategy() -> impl Strategy<Value = Answer> {
    (
        "[a-z0-9:]{1,12}",
        ".{0,40}",
        any::<i64>(),
        prop::collection::vec("[a-z]{1,8}", 0..4),
    )
        .prop_map(|(id, body, votes, tags)| Answer {
            id,
            body,
            votes,
            tags,
        })
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    MarkDirty,
    AfterSave(bool),
    ForceSync,
    BeforeDestroy,
    AfterDestroy,
}

fn hook_strategy() -> impl Strategy<Value = Hook> {
    prop_oneof![
        Just(Hook::MarkDirty),
        any::<bool>().prop_map(Hook::AfterSave),
        Just(Hook::ForceSync),
        Just(Hook::BeforeDestroy),
        Just(Hook::AfterDestroy),
    ]
}

proptest! {
    #[test]
    fn projection_is_idempotent(answer in answer_strategy()) {
        prop_assert_eq!(answer.search_entry(), answer.search_entry());

        let first = IndexCommand::upsert_for(&answer).unwrap().to_xml();
        let second = IndexCommand::upsert_for(&answer).unwrap().to_xml();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn no_upsert_after_removal(hooks in prop::collection::vec(hook_strategy(), 1..24)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let transport = RecordingTransport::new();
            let config = search_index_sync::SearchConfig::builder()
                .host("127.0.0.1")
                .worker_count(1)
                .build()
                .unwrap();
            let (workers, channel) =
                DispatchWorkers::start(&config, transport.clone(), SyncSwitch::default());
            let coordinator = Arc::new(LifecycleCoordinator::new(channel.clone()));
            let answer = Answer {
                id: "a1".into(),
                body: "Use Arc".into(),
                votes: 3,
                tags: vec!["rust".into()],
            };

            let mut produced = Vec::new();
            for (position, hook) in hooks.iter().enumerate() {
                let outcome = match hook {
                    Hook::MarkDirty => {
                        coordinator.mark_dirty(&answer);
                        continue;
                    }
                    Hook::AfterSave(changed) => coordinator.after_save(&answer, *changed),
                    Hook::ForceSync => coordinator.force_sync(&answer),
                    Hook::BeforeDestroy => coordinator.before_destroy(&answer),
                    Hook::AfterDestroy => coordinator.after_destroy(&answer),
                };
                if let Some(kind) = outcome.dispatched() {
                    produced.push((position, kind));
                }
            }

            let removal = hooks
                .iter()
                .position(|h| matches!(h, Hook::BeforeDestroy | Hook::AfterDestroy))
                .unwrap_or(hooks.len());
            let destroyed = hooks.iter().any(|h| matches!(h, Hook::AfterDestroy));

            assert!(
                produced
                    .iter()
                    .all(|(position, kind)| *kind == CommandKind::Delete || *position < removal),
                "upsert produced after removal began: {produced:?}"
            );
            let deletes = produced
                .iter()
                .filter(|(_, kind)| *kind == CommandKind::Delete)
                .count();
            assert_eq!(deletes, usize::from(destroyed));

            tokio::time::timeout(Duration::from_secs(5), channel.wait_idle())
                .await
                .unwrap();
            workers.shutdown(Duration::from_secs(1)).await;

            let deletes = transport
                .updates()
                .iter()
                .filter(|b| b.starts_with("<delete>"))
                .count();
            assert!(deletes <= 1);
        });
    }
}

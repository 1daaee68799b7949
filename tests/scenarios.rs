//! End-to-end discovery, publish and dispatch scenarios.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use relaybot::commands::{
    builtin_commands, CommandRegistry, DispatchOutcome, MemoryPublisher,
    UNKNOWN_COMMAND_REPLY,
};
use relaybot::config::PublishTarget;
use relaybot::descriptors::{EventName, FileLoader, HandlerCatalog};
use relaybot::events::{
    builtin_events, EventArg, EventArgs, EventEmitter, EventHandler, EventRegistry,
};
use relaybot::interaction::{Interaction, InteractionReply, MemoryResponder, User};
use relaybot::{Bot, Config, Result};

fn write(root: &Path, dir: &str, file: &str, body: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), body).unwrap();
}

fn invoke(name: &str, responder: &Arc<MemoryResponder>) -> Arc<Interaction> {
    Arc::new(Interaction::command(
        "100",
        name,
        User::new("7", "frank"),
        responder.clone(),
    ))
}

fn guild() -> PublishTarget {
    PublishTarget::Guild {
        application_id: "1".into(),
        guild_id: "2".into(),
    }
}

#[tokio::test]
async fn test_command_discovered_from_disk_replies_privately() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "commands",
        "test.json",
        r#"{"kind": "command", "name": "test", "description": "Run the test function."}"#,
    );

    let registry = Arc::new(
        CommandRegistry::discover(
            &FileLoader::new(root.path()),
            "commands",
            &builtin_commands(),
            false,
        )
        .unwrap(),
    );
    assert!(registry.lookup("test").is_some());

    let responder = Arc::new(MemoryResponder::new());
    let outcome = registry
        .dispatch(invoke("test", &responder))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Completed);
    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].reply, InteractionReply::ephemeral("Booyah!"));
}

#[tokio::test]
async fn test_duplicate_command_files_last_loaded_wins() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "commands",
        "a_dup.json",
        r#"{"kind": "command", "name": "dup", "description": "First copy"}"#,
    );
    write(
        root.path(),
        "commands",
        "b_dup.json",
        r#"{"kind": "command", "name": "dup", "description": "Second copy", "handler": "test"}"#,
    );

    let registry = CommandRegistry::discover(
        &FileLoader::new(root.path()),
        "commands",
        &builtin_commands(),
        false,
    )
    .unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.metadata().len(), 1);
    assert_eq!(registry.metadata()[0].description, "Second copy");

    let responder = Arc::new(MemoryResponder::new());
    Arc::new(registry)
        .dispatch(invoke("dup", &responder))
        .await
        .unwrap();
    assert_eq!(responder.replies()[0].reply.content, "Booyah!");
}

#[tokio::test]
async fn test_duplicate_command_files_rejected_when_configured() {
    let root = TempDir::new().unwrap();
    for file in ["a.json", "b.json"] {
        write(
            root.path(),
            "commands",
            file,
            r#"{"kind": "command", "name": "dup", "description": "Copy"}"#,
        );
    }

    let result = CommandRegistry::discover(
        &FileLoader::new(root.path()),
        "commands",
        &builtin_commands(),
        true,
    );
    assert!(result.is_err());
}

struct CountingReady(Arc<AtomicUsize>);

#[async_trait]
impl EventHandler for CountingReady {
    async fn handle(&self, _args: EventArgs) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_once_event_runs_a_single_time() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "events",
        "ready.json",
        r#"{"kind": "event", "name": "ready", "once": true}"#,
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = HandlerCatalog::<dyn EventHandler>::new()
        .with("ready", Arc::new(CountingReady(Arc::clone(&calls))));
    let emitter = EventEmitter::new();
    EventRegistry::discover_and_subscribe(
        &FileLoader::new(root.path()),
        "events",
        &catalog,
        &emitter,
    );

    for _ in 0..3 {
        emitter.emit(
            EventName::Ready,
            vec![EventArg::User(User::new("1", "relaybot"))],
        );
    }
    emitter.drain().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_only_conforming_files_become_descriptors() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "commands",
        "one.json",
        r#"{"kind": "command", "name": "one", "description": "One"}"#,
    );
    write(
        root.path(),
        "commands",
        "two.json",
        r#"{"kind": "command", "name": "two", "description": "Two"}"#,
    );
    write(
        root.path(),
        "commands",
        "event.json",
        r#"{"kind": "event", "name": "ready"}"#,
    );
    write(root.path(), "commands", "junk.json", r#"{"hello": "world"}"#);
    write(root.path(), "commands", "broken.json", "{ not json");
    write(root.path(), "commands", "README.md", "# not a manifest");

    let registry = CommandRegistry::discover(
        &FileLoader::new(root.path()),
        "commands",
        &builtin_commands(),
        false,
    )
    .unwrap();
    assert_eq!(registry.names(), vec!["one", "two"]);
}

#[tokio::test]
async fn test_unknown_command_through_router() {
    let root = TempDir::new().unwrap();
    let registry = Arc::new(
        CommandRegistry::discover(
            &FileLoader::new(root.path()),
            "commands",
            &builtin_commands(),
            false,
        )
        .unwrap(),
    );
    let router = builtin_events(registry).get("interactionCreate").unwrap();

    let responder = Arc::new(MemoryResponder::new());
    let args: EventArgs = vec![EventArg::Interaction(invoke("ghost", &responder))].into();
    router.handle(args).await.unwrap();

    for _ in 0..50 {
        if responder.count() > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].reply, InteractionReply::ephemeral(UNKNOWN_COMMAND_REPLY));
}

#[tokio::test]
async fn test_repeated_publish_leaves_remote_unchanged() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "commands",
        "test.json",
        r#"{"kind": "command", "name": "test", "description": "Run the test function."}"#,
    );
    let loader = FileLoader::new(root.path());
    let publisher = MemoryPublisher::new();

    let mut states = Vec::new();
    for _ in 0..2 {
        let registry =
            CommandRegistry::discover(&loader, "commands", &builtin_commands(), false).unwrap();
        registry.publish(&publisher, &guild()).await.unwrap();
        states.push(publisher.remote_state(&guild()));
    }

    assert_eq!(publisher.calls(), 2);
    assert_eq!(states[0].len(), 1);
    assert_eq!(states[0], states[1]);
}

#[tokio::test]
async fn test_bot_runs_shipped_manifests() {
    let mut config = Config::default();
    config.plugins.root = Path::new(env!("CARGO_MANIFEST_DIR")).to_path_buf();
    config.discord.bot = "1".to_string();

    let publisher = Arc::new(MemoryPublisher::new());
    let emitter = Arc::new(EventEmitter::new());
    let mut bot = Bot::start(&config, publisher.clone(), emitter.clone()).unwrap();
    bot.take_publish_task().unwrap().await.unwrap().unwrap();

    assert_eq!(bot.commands().names(), vec!["test"]);
    assert_eq!(emitter.listener_count(EventName::Ready), 1);
    assert_eq!(emitter.listener_count(EventName::InteractionCreate), 1);

    assert_eq!(bot.ready(User::new("1", "relaybot")), 1);
    assert_eq!(bot.ready(User::new("1", "relaybot")), 0);
    assert_eq!(publisher.calls(), 1);
}

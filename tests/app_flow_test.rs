//! App-level flows driven without a terminal or a worker: commands queued by
//! the app are inspected, worker events are fed back by hand.

use tokenwatch::app::{App, PromptKind, Screen, SellBlocker};
use tokenwatch::infrastructure::metadata::TokenMetadata;
use tokenwatch::infrastructure::{RuntimeCommand, RuntimeEvent};
use tokenwatch::state::{LookupPurpose, OwnerLookup, Secret, TokenKey, TxStatus};
use tokenwatch::store::{KeyValueStore, SqliteStore, StorageKey};

const ALICE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const BOB: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

fn open_app(path: &std::path::Path) -> App {
    let store = SqliteStore::open(path).unwrap();
    App::new(Box::new(store), "http://127.0.0.1:8545")
}

fn login(app: &mut App, reset: bool) -> Vec<RuntimeCommand> {
    app.login.secret = "pw".into();
    app.login.reset = reset;
    app.submit_login();
    app.take_commands()
}

fn lookups(commands: &[RuntimeCommand]) -> Vec<OwnerLookup> {
    commands
        .iter()
        .filter_map(|cmd| match cmd {
            RuntimeCommand::LookupOwner { lookup } => Some(lookup.clone()),
            _ => None,
        })
        .collect()
}

fn run_command(app: &mut App, input: &str) -> Vec<RuntimeCommand> {
    app.command.input = input.to_string();
    app.apply_command();
    app.take_commands()
}

#[test]
fn test_login_reconfigures_before_wallet_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    let mut app = open_app(&path);

    let commands = login(&mut app, true);
    assert_eq!(
        commands,
        vec![
            RuntimeCommand::Reconfigure {
                url: "http://127.0.0.1:8545".into()
            },
            RuntimeCommand::LoadWallet {
                secret: Secret::new("pw"),
                reset: true
            },
        ]
    );
    assert_eq!(app.screen, Screen::Watchlist);
    assert!(app.login.secret.is_empty());

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.get(StorageKey::NodeUrl).unwrap().as_deref(),
        Some("http://127.0.0.1:8545")
    );

    // second login is refused; nothing else is issued
    app.login.secret = "other".into();
    app.submit_login();
    assert!(app.login.error.is_some());
    assert!(app.take_commands().is_empty());
}

#[test]
fn test_saved_watchlist_is_refreshed_on_login() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        store
            .set(
                StorageKey::Watchlist,
                r#"[{"contractAddress":"0xA","tokenID":"1","owner":""},
                    {"contractAddress":"0xA","tokenID":"2","owner":"0xB"}]"#,
            )
            .unwrap();
    }

    let mut app = open_app(&path);
    let commands = login(&mut app, false);
    assert!(matches!(commands[0], RuntimeCommand::Reconfigure { .. }));
    assert!(matches!(commands[1], RuntimeCommand::LoadWallet { reset: false, .. }));

    let lookups = lookups(&commands);
    assert_eq!(lookups.len(), 2);
    assert!(lookups.iter().all(|l| l.purpose == LookupPurpose::Refresh));
    assert_eq!(app.state.watchlist.len(), 2);
}

#[test]
fn test_add_token_looks_up_owner_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");
    let mut app = open_app(&path);
    login(&mut app, false);
    app.state.report_error("old failure");

    let commands = run_command(&mut app, "add 0xA 1");
    let lookup = lookups(&commands).remove(0);
    assert_eq!(lookup.purpose, LookupPurpose::Add);
    assert!(app.state.watchlist.is_empty());

    app.apply_runtime_event(RuntimeEvent::OwnerResolved {
        lookup,
        owner: BOB.into(),
    });
    assert_eq!(app.state.watchlist.tokens()[0].owner, BOB);
    assert!(app.state.error.is_empty());

    let store = SqliteStore::open(&path).unwrap();
    let raw = store.get(StorageKey::Watchlist).unwrap().unwrap();
    assert!(raw.contains(BOB));
}

#[test]
fn test_add_token_failure_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    let lookup = lookups(&run_command(&mut app, "add 0xA 404")).remove(0);
    app.apply_runtime_event(RuntimeEvent::OwnerFailed {
        lookup,
        message: "execution reverted".into(),
    });
    assert!(app.state.watchlist.is_empty());
    assert_eq!(app.state.error.current(), "execution reverted");
}

#[test]
fn test_add_prompt_rejects_empty_token_id_inline() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    app.enter_prompt(PromptKind::AddContract, String::new());
    app.command.input = "0xA".into();
    app.apply_prompt(PromptKind::AddContract);
    assert_eq!(app.prompt_context.as_deref(), Some("0xA"));

    app.command.input = "   ".into();
    app.apply_prompt(PromptKind::AddTokenId);
    assert!(app.take_commands().is_empty());
    assert!(app.state.error.is_empty());
    assert!(app.status_text().is_some());
}

#[test]
fn test_refresh_for_removed_token_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    let add = lookups(&run_command(&mut app, "add 0xA 1")).remove(0);
    app.apply_runtime_event(RuntimeEvent::OwnerResolved {
        lookup: add,
        owner: BOB.into(),
    });

    // a receipt triggers a refresh; the token is removed before it answers
    app.apply_runtime_event(RuntimeEvent::TransferMined {
        hash: "0x1".into(),
        success: true,
    });
    let refresh = lookups(&app.take_commands()).remove(0);
    run_command(&mut app, "remove 0xA 1");
    app.apply_runtime_event(RuntimeEvent::OwnerResolved {
        lookup: refresh,
        owner: ALICE.into(),
    });
    assert!(app.state.watchlist.is_empty());
}

#[test]
fn test_older_refresh_loses_to_newer() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    let add = lookups(&run_command(&mut app, "add 0xA 1")).remove(0);
    app.apply_runtime_event(RuntimeEvent::OwnerResolved {
        lookup: add,
        owner: ALICE.into(),
    });

    app.apply_runtime_event(RuntimeEvent::TransferMined {
        hash: "0x1".into(),
        success: true,
    });
    let first = lookups(&app.take_commands()).remove(0);
    app.apply_runtime_event(RuntimeEvent::TransferMined {
        hash: "0x2".into(),
        success: true,
    });
    let second = lookups(&app.take_commands()).remove(0);

    app.apply_runtime_event(RuntimeEvent::OwnerResolved {
        lookup: second,
        owner: BOB.into(),
    });
    app.apply_runtime_event(RuntimeEvent::OwnerResolved {
        lookup: first,
        owner: ALICE.into(),
    });
    assert_eq!(app.state.watchlist.tokens()[0].owner, BOB);
}

#[test]
fn test_transfer_lifecycle_updates_details() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    let key = TokenKey::new("0xA", "1");
    run_command(&mut app, "details 0xA 1");
    assert_eq!(app.screen, Screen::Details);

    app.apply_runtime_event(RuntimeEvent::TransferSubmitted {
        key: key.clone(),
        to: BOB.into(),
        hash: "0xfeed".into(),
    });
    let tx = app.state.transactions.get("0xfeed").unwrap();
    assert_eq!(tx.status, TxStatus::Pending);
    assert!(tx.label.contains(BOB));

    app.apply_runtime_event(RuntimeEvent::TransferMined {
        hash: "0xfeed".into(),
        success: false,
    });
    assert_eq!(app.state.transactions.get("0xfeed").unwrap().status, TxStatus::Error);
    assert_eq!(app.state.chain_events.value(), 1);
    assert!(app
        .take_commands()
        .contains(&RuntimeCommand::FetchDetails { key: key.clone() }));

    if let Some(details) = app.details.as_mut() {
        details.to_address = BOB.into();
    }
    app.apply_runtime_event(RuntimeEvent::TransferFinished { key });
    assert!(app.details.as_ref().unwrap().to_address.is_empty());
}

#[test]
fn test_details_ignore_responses_for_other_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    let shown = TokenKey::new("0xA", "1");
    app.open_details(shown.clone());
    assert_eq!(
        app.take_commands(),
        vec![RuntimeCommand::FetchDetails { key: shown.clone() }]
    );

    app.apply_runtime_event(RuntimeEvent::DetailsOwner {
        key: TokenKey::new("0xA", "2"),
        owner: BOB.into(),
    });
    app.apply_runtime_event(RuntimeEvent::MetadataReady {
        key: TokenKey::new("0xA", "2"),
        metadata: TokenMetadata {
            name: "Other".into(),
            ..TokenMetadata::default()
        },
    });
    let details = app.details.as_ref().unwrap();
    assert!(details.owner.is_empty());
    assert!(details.name.is_empty());

    app.apply_runtime_event(RuntimeEvent::MetadataReady {
        key: shown,
        metadata: TokenMetadata {
            name: "Kitty".into(),
            description: "A cat".into(),
            image: "http://img/1.png".into(),
        },
    });
    assert_eq!(app.details.as_ref().unwrap().name, "Kitty");
}

#[test]
fn test_sell_blockers_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);
    app.open_details(TokenKey::new("0xA", "1"));
    app.take_commands();

    assert_eq!(app.sell_blocker(), Some(SellBlocker::NoPrimaryAccount));

    app.apply_runtime_event(RuntimeEvent::WalletLoaded {
        accounts: vec![ALICE.into()],
    });
    app.set_primary_account(&ALICE.to_lowercase());
    assert_eq!(app.primary_account.as_deref(), Some(ALICE));
    assert_eq!(app.sell_blocker(), Some(SellBlocker::EmptyDestination));

    app.apply_runtime_event(RuntimeEvent::DetailsOwner {
        key: TokenKey::new("0xA", "1"),
        owner: BOB.into(),
    });
    app.details.as_mut().unwrap().to_address = BOB.into();
    assert_eq!(app.sell_blocker(), Some(SellBlocker::NotOwner));

    app.sell();
    assert!(app.take_commands().is_empty());
    assert!(app.state.error.is_empty());

    app.apply_runtime_event(RuntimeEvent::DetailsOwner {
        key: TokenKey::new("0xA", "1"),
        owner: ALICE.to_lowercase(),
    });
    assert_eq!(app.sell_blocker(), None);

    let commands = run_command(&mut app, &format!("send {BOB}"));
    assert_eq!(
        commands,
        vec![RuntimeCommand::Transfer {
            key: TokenKey::new("0xA", "1"),
            from: ALICE.into(),
            to: BOB.into(),
        }]
    );
}

#[test]
fn test_removing_primary_account_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);
    run_command(&mut app, "wallet");
    assert_eq!(app.screen, Screen::Wallet);

    app.apply_runtime_event(RuntimeEvent::WalletLoaded {
        accounts: vec![ALICE.into(), BOB.into()],
    });
    app.set_selected_primary();
    assert_eq!(app.primary_account.as_deref(), Some(ALICE));

    app.confirm_remove_selected_account();
    app.command.input = "n".into();
    app.apply_prompt(PromptKind::ConfirmRemoveAccount);
    assert!(app.take_commands().is_empty());

    app.confirm_remove_selected_account();
    app.command.input = "y".into();
    app.apply_prompt(PromptKind::ConfirmRemoveAccount);
    assert_eq!(
        app.take_commands(),
        vec![RuntimeCommand::RemoveAccount {
            address: ALICE.into()
        }]
    );

    app.apply_runtime_event(RuntimeEvent::AccountRemoved {
        address: ALICE.into(),
        accounts: vec![BOB.into()],
    });
    assert_eq!(app.primary_account, None);
    assert_eq!(app.accounts, vec![BOB.to_string()]);
}

#[test]
fn test_worker_errors_go_to_error_channel() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir.path().join("store.sqlite3"));
    login(&mut app, false);

    app.apply_runtime_event(RuntimeEvent::Error {
        message: "cannot unlock: wrong password".into(),
    });
    assert_eq!(app.state.error.current(), "cannot unlock: wrong password");
    assert!(app.accounts.is_empty());

    run_command(&mut app, "clear");
    assert!(app.state.error.is_empty());
}

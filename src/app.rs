use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::infrastructure::ethereum::same_address;
use crate::infrastructure::{RuntimeCommand, RuntimeEvent};
use crate::state::{AppState, ChainEventCursor, Effect, LookupPurpose, Secret, TokenKey};
use crate::store::{KeyValueStore, StorageKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Wallet,
    Watchlist,
    Details,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Wallet => "Wallet",
            Screen::Watchlist => "Watchlist",
            Screen::Details => "Token",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Transactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Prompt(PromptKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    ImportKey,
    AddContract,
    AddTokenId,
    SellTo,
    ConfirmRemoveAccount,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::ImportKey => "private key",
            PromptKind::AddContract => "contract address",
            PromptKind::AddTokenId => "token ID",
            PromptKind::SellTo => "send to",
            PromptKind::ConfirmRemoveAccount => "remove account? (y/n)",
        }
    }

    /// Input is echoed as `*`
    pub fn is_masked(&self) -> bool {
        matches!(self, PromptKind::ImportKey)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    NodeUrl,
    Secret,
    Reset,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub node_url: String,
    pub secret: String,
    pub reset: bool,
    pub focus: LoginField,
    /// Inline validation message
    pub error: Option<String>,
}

impl LoginForm {
    fn new(node_url: String) -> Self {
        Self {
            node_url,
            secret: String::new(),
            reset: false,
            focus: LoginField::Secret,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            LoginField::NodeUrl => LoginField::Secret,
            LoginField::Secret => LoginField::Reset,
            LoginField::Reset => LoginField::NodeUrl,
        };
    }

    pub fn push(&mut self, ch: char) {
        match self.focus {
            LoginField::NodeUrl => self.node_url.push(ch),
            LoginField::Secret => self.secret.push(ch),
            LoginField::Reset => {
                if ch == ' ' {
                    self.reset = !self.reset;
                }
            }
        }
    }

    pub fn pop(&mut self) {
        match self.focus {
            LoginField::NodeUrl => {
                self.node_url.pop();
            }
            LoginField::Secret => {
                self.secret.pop();
            }
            LoginField::Reset => {}
        }
    }
}

/// View state of the token details screen
#[derive(Debug, Clone)]
pub struct TokenDetails {
    pub key: TokenKey,
    pub name: String,
    pub description: String,
    pub image: String,
    pub owner: String,
    pub to_address: String,
    cursor: ChainEventCursor,
}

/// Why the sell action is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellBlocker {
    NoPrimaryAccount,
    NotOwner,
    EmptyDestination,
}

impl SellBlocker {
    pub fn reason(&self) -> &'static str {
        match self {
            SellBlocker::NoPrimaryAccount => {
                "No primary account selected. Pick one in the wallet to sell."
            }
            SellBlocker::NotOwner => "The primary account does not own this token.",
            SellBlocker::EmptyDestination => "Enter the address to send the token to.",
        }
    }
}

pub struct App {
    pub state: AppState,
    store: Box<dyn KeyValueStore>,

    pub screen: Screen,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub prompt_context: Option<String>,
    pub help_open: bool,
    pub should_quit: bool,
    status: Option<StatusMessage>,

    pub login: LoginForm,
    pub accounts: Vec<String>,
    pub primary_account: Option<String>,
    pub selected_account: usize,
    pub selected_token: usize,
    pub selected_tx: usize,
    pub details: Option<TokenDetails>,

    outbox: Vec<RuntimeCommand>,
}

impl App {
    /// Login form is pre-filled with the saved node URL, else `fallback_rpc`.
    pub fn new(store: Box<dyn KeyValueStore>, fallback_rpc: &str) -> Self {
        let saved = match store.get(StorageKey::NodeUrl) {
            Ok(url) => url.filter(|url| !url.trim().is_empty()),
            Err(err) => {
                tracing::warn!("cannot read saved node URL: {err}");
                None
            }
        };

        Self {
            state: AppState::new(),
            store,
            screen: Screen::Login,
            focus: Focus::List,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            prompt_context: None,
            help_open: false,
            should_quit: false,
            status: None,
            login: LoginForm::new(saved.unwrap_or_else(|| fallback_rpc.to_string())),
            accounts: Vec::new(),
            primary_account: None,
            selected_account: 0,
            selected_token: 0,
            selected_tx: 0,
            details: None,
            outbox: Vec::new(),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    /// Commands queued for the async worker since the last call
    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    fn request(&mut self, cmd: RuntimeCommand) {
        self.outbox.push(cmd);
    }

    // ---------------------------------------------------------------------
    // Session

    pub fn submit_login(&mut self) {
        let secret = self.login.secret.clone();
        let node_url = self.login.node_url.clone();
        match self.state.login(&secret, &node_url, self.login.reset) {
            Ok(effects) => {
                self.login.secret.clear();
                self.login.error = None;
                self.screen = Screen::Watchlist;
                self.run_effects(effects);
                self.set_status("Unlocking wallet…", StatusLevel::Info);
            }
            Err(err) => self.login.error = Some(err.to_string()),
        }
    }

    /// Execute state effects in order. Effects produced while executing are
    /// queued behind the current batch.
    fn run_effects(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::SaveNodeUrl(url) => {
                    if let Err(err) = self.store.set(StorageKey::NodeUrl, &url) {
                        tracing::warn!("cannot save node URL: {err}");
                        self.state.report_error(err.to_string());
                    }
                }
                Effect::Reconfigure(url) => self.request(RuntimeCommand::Reconfigure { url }),
                Effect::LoadWallet { secret, reset } => {
                    self.request(RuntimeCommand::LoadWallet { secret, reset })
                }
                Effect::LoadWatchlist => {
                    if self
                        .state
                        .watchlist
                        .load_initial(self.store.as_ref())
                        .is_some()
                    {
                        queue.extend(self.state.watchlist_loaded());
                    }
                }
                Effect::PersistWatchlist => {
                    if let Err(err) = self.state.watchlist.persist(self.store.as_mut()) {
                        tracing::warn!("cannot persist watchlist: {err}");
                        self.state.report_error(err.to_string());
                    }
                }
                Effect::LookupOwners(lookups) => {
                    for lookup in lookups {
                        self.request(RuntimeCommand::LookupOwner { lookup });
                    }
                }
            }
        }
        self.clamp_selections();
    }

    // ---------------------------------------------------------------------
    // Runtime events

    pub fn apply_runtime_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Reconfigured { endpoint } => {
                self.set_status(format!("Connected to {endpoint}"), StatusLevel::Info);
            }
            RuntimeEvent::WalletLoaded { accounts } => {
                self.set_status(
                    format!("Wallet unlocked: {} account(s)", accounts.len()),
                    StatusLevel::Info,
                );
                self.set_accounts(accounts);
            }
            RuntimeEvent::AccountAdded { address, accounts } => {
                self.set_status(format!("Added {address}"), StatusLevel::Info);
                self.set_accounts(accounts);
            }
            RuntimeEvent::AccountRemoved { address, accounts } => {
                if self
                    .primary_account
                    .as_deref()
                    .is_some_and(|primary| same_address(primary, &address))
                {
                    self.primary_account = None;
                }
                self.set_status(format!("Removed {address}"), StatusLevel::Info);
                self.set_accounts(accounts);
            }
            RuntimeEvent::OwnerResolved { lookup, owner } => {
                let effects = self.state.owner_resolved(&lookup, owner);
                if lookup.purpose == LookupPurpose::Add && !effects.is_empty() {
                    self.set_status(format!("Watching {}", lookup.key), StatusLevel::Info);
                }
                self.run_effects(effects);
            }
            RuntimeEvent::OwnerFailed { lookup, message } => {
                self.state.owner_failed(&lookup, &message);
            }
            RuntimeEvent::DetailsOwner { key, owner } => {
                if let Some(details) = self.details_for(&key) {
                    details.owner = owner;
                }
            }
            RuntimeEvent::MetadataReady { key, metadata } => {
                if let Some(details) = self.details_for(&key) {
                    details.name = metadata.name;
                    details.description = metadata.description;
                    details.image = metadata.image;
                }
            }
            RuntimeEvent::TransferSubmitted { key, to, hash } => {
                let label = format!("transfer {key} to {to}");
                self.state.transaction_submitted(&hash, &label);
                self.set_status(format!("Submitted {hash}"), StatusLevel::Info);
            }
            RuntimeEvent::TransferMined { hash, success } => {
                let effects = self.state.transaction_receipt(&hash, success);
                self.run_effects(effects);
                self.sync_details();
            }
            RuntimeEvent::TransferFinished { key } => {
                if let Some(details) = self.details_for(&key) {
                    details.to_address.clear();
                }
                self.state.dismiss_error();
            }
            RuntimeEvent::Error { message } => self.state.report_error(message),
        }
    }

    fn set_accounts(&mut self, accounts: Vec<String>) {
        self.accounts = accounts;
        if let Some(primary) = self.primary_account.as_deref() {
            if !self.accounts.iter().any(|a| same_address(a, primary)) {
                self.primary_account = None;
            }
        }
        self.clamp_selections();
    }

    fn details_for(&mut self, key: &TokenKey) -> Option<&mut TokenDetails> {
        self.details.as_mut().filter(|details| &details.key == key)
    }

    /// Re-fetch the shown token when a chain event happened since last fetch
    fn sync_details(&mut self) {
        let Some(details) = self.details.as_mut() else {
            return;
        };
        if details.cursor.observe(&self.state.chain_events) {
            let key = details.key.clone();
            self.request(RuntimeCommand::FetchDetails { key });
        }
    }

    // ---------------------------------------------------------------------
    // Watchlist

    pub fn request_add_token(&mut self, contract: &str, token_id: &str) {
        match self.state.request_add_token(contract, token_id) {
            Ok(effects) => {
                self.set_status("Looking up owner…", StatusLevel::Info);
                self.run_effects(effects);
            }
            Err(err) => self.set_status(err.to_string(), StatusLevel::Warn),
        }
    }

    pub fn remove_token(&mut self, key: &TokenKey) {
        let effects = self.state.remove_token(key);
        if effects.is_empty() {
            self.set_status(format!("{key} is not watched"), StatusLevel::Warn);
        } else {
            self.set_status(format!("Removed {key}"), StatusLevel::Info);
        }
        self.run_effects(effects);
    }

    pub fn remove_selected_token(&mut self) {
        if let Some(key) = self.selected_token_key() {
            self.remove_token(&key);
        }
    }

    pub fn selected_token_key(&self) -> Option<TokenKey> {
        self.state
            .watchlist
            .tokens()
            .get(self.selected_token)
            .map(|token| token.key())
    }

    pub fn open_details(&mut self, key: TokenKey) {
        self.details = Some(TokenDetails {
            key: key.clone(),
            name: String::new(),
            description: String::new(),
            image: String::new(),
            owner: String::new(),
            to_address: String::new(),
            cursor: ChainEventCursor::at(&self.state.chain_events),
        });
        self.screen = Screen::Details;
        self.focus = Focus::List;
        self.request(RuntimeCommand::FetchDetails { key });
    }

    // ---------------------------------------------------------------------
    // Wallet

    pub fn import_account(&mut self, private_key: &str) {
        let private_key = private_key.trim();
        if private_key.is_empty() {
            self.set_status("Private key is empty", StatusLevel::Warn);
            return;
        }
        self.request(RuntimeCommand::AddAccount {
            private_key: Secret::new(private_key),
        });
    }

    /// Asks for confirmation before removing the selected account
    pub fn confirm_remove_selected_account(&mut self) {
        match self.accounts.get(self.selected_account).cloned() {
            Some(address) => self.enter_prompt(PromptKind::ConfirmRemoveAccount, address),
            None => self.set_status("No account selected", StatusLevel::Warn),
        }
    }

    pub fn set_primary_account(&mut self, address: &str) {
        match self
            .accounts
            .iter()
            .find(|account| same_address(account, address))
            .cloned()
        {
            Some(account) => {
                self.set_status(format!("Primary account {account}"), StatusLevel::Info);
                self.primary_account = Some(account);
            }
            None => self.set_status(format!("{address} is not in the wallet"), StatusLevel::Warn),
        }
    }

    pub fn set_selected_primary(&mut self) {
        if let Some(address) = self.accounts.get(self.selected_account).cloned() {
            self.set_primary_account(&address);
        }
    }

    // ---------------------------------------------------------------------
    // Sell

    /// First unmet precondition of the sell action, if any
    pub fn sell_blocker(&self) -> Option<SellBlocker> {
        let Some(primary) = self.primary_account.as_deref() else {
            return Some(SellBlocker::NoPrimaryAccount);
        };
        let details = self.details.as_ref()?;
        let to = details.to_address.trim();
        if !to.is_empty() && !same_address(primary, &details.owner) {
            return Some(SellBlocker::NotOwner);
        }
        if to.is_empty() {
            return Some(SellBlocker::EmptyDestination);
        }
        None
    }

    pub fn sell(&mut self) {
        if let Some(blocker) = self.sell_blocker() {
            self.set_status(blocker.reason(), StatusLevel::Warn);
            return;
        }
        let (Some(from), Some(details)) = (self.primary_account.clone(), self.details.as_ref())
        else {
            return;
        };
        let key = details.key.clone();
        let to = details.to_address.trim().to_string();
        self.set_status(format!("Sending {key} to {to}…"), StatusLevel::Info);
        self.request(RuntimeCommand::Transfer { key, from, to });
    }

    // ---------------------------------------------------------------------
    // Transactions

    pub fn remove_selected_transaction(&mut self) {
        let hash = self
            .state
            .transactions
            .items()
            .get(self.selected_tx)
            .map(|tx| tx.hash.clone());
        if let Some(hash) = hash {
            self.state.remove_transaction(&hash);
            self.clamp_selections();
        }
    }

    // ---------------------------------------------------------------------
    // Navigation

    pub fn navigate(&mut self, screen: Screen) {
        if !self.state.session.is_logged_in() {
            self.set_status("Log in first", StatusLevel::Warn);
            return;
        }
        match screen {
            Screen::Login => {}
            Screen::Details if self.details.is_none() => {
                self.set_status("Pick a token from the watchlist first", StatusLevel::Warn);
            }
            screen => {
                self.screen = screen;
                self.focus = Focus::List;
            }
        }
    }

    pub fn cycle_focus(&mut self) {
        if matches!(self.screen, Screen::Watchlist | Screen::Details) {
            self.focus = match self.focus {
                Focus::List => Focus::Transactions,
                Focus::Transactions => Focus::List,
            };
        }
    }

    pub fn list_len(&self) -> usize {
        match (self.screen, self.focus) {
            (Screen::Login, _) => 0,
            (_, Focus::Transactions) => self.state.transactions.len(),
            (Screen::Wallet, Focus::List) => self.accounts.len(),
            (Screen::Watchlist, Focus::List) => self.state.watchlist.len(),
            (Screen::Details, Focus::List) => 0,
        }
    }

    pub fn move_selection(&mut self, down: bool) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let selection = match (self.screen, self.focus) {
            (_, Focus::Transactions) => &mut self.selected_tx,
            (Screen::Wallet, _) => &mut self.selected_account,
            _ => &mut self.selected_token,
        };
        *selection = if down {
            (*selection + 1).min(len - 1)
        } else {
            selection.saturating_sub(1)
        };
    }

    fn clamp_selections(&mut self) {
        clamp_selection(&mut self.selected_account, self.accounts.len());
        clamp_selection(&mut self.selected_token, self.state.watchlist.len());
        clamp_selection(&mut self.selected_tx, self.state.transactions.len());
    }

    // ---------------------------------------------------------------------
    // Command line and prompts

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn enter_prompt(&mut self, kind: PromptKind, context: String) {
        self.input_mode = InputMode::Prompt(kind);
        self.prompt_context = Some(context);
        self.command.input.clear();
        if kind == PromptKind::SellTo {
            if let Some(details) = self.details.as_ref() {
                self.command.input = details.to_address.clone();
            }
        }
    }

    pub fn exit_prompt(&mut self) {
        self.input_mode = InputMode::Normal;
        self.prompt_context = None;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }

        let cmd = crate::core::parse_command(&input);
        self.exit_command();
        let action = self.execute_command(&cmd);
        self.apply_action(action);
        self.command.last = Some(input);
    }

    pub fn apply_prompt(&mut self, kind: PromptKind) {
        let input = self.command.input.trim().to_string();
        let context = self.prompt_context.clone();
        self.exit_prompt();

        match kind {
            PromptKind::ImportKey => self.import_account(&input),
            PromptKind::AddContract => {
                if input.is_empty() {
                    self.set_status("Contract address is empty", StatusLevel::Warn);
                    return;
                }
                self.enter_prompt(PromptKind::AddTokenId, input);
            }
            PromptKind::AddTokenId => {
                let Some(contract) = context else {
                    self.set_status("Missing contract", StatusLevel::Error);
                    return;
                };
                self.request_add_token(&contract, &input);
            }
            PromptKind::SellTo => {
                if let Some(details) = self.details.as_mut() {
                    details.to_address = input;
                }
                self.sell();
            }
            PromptKind::ConfirmRemoveAccount => {
                let Some(address) = context else {
                    self.set_status("Missing account", StatusLevel::Error);
                    return;
                };
                if matches!(input.to_lowercase().as_str(), "y" | "yes") {
                    self.request(RuntimeCommand::RemoveAccount { address });
                } else {
                    self.set_status("Removal cancelled", StatusLevel::Info);
                }
            }
        }
    }
}

impl App {
    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &crate::core::Command) -> crate::core::Action {
        use crate::core::{Action, Command, NavigateTarget, NotifyLevel};

        let logged_in = self.state.session.is_logged_in();
        let needs_login = !matches!(
            cmd,
            Command::Help | Command::Quit | Command::Clear | Command::Unknown(_)
        );
        if needs_login && !logged_in {
            return Action::Notify("Log in first".to_string(), NotifyLevel::Warn);
        }

        match cmd {
            Command::Wallet => Action::Navigate(NavigateTarget::Wallet),
            Command::Watchlist => Action::Navigate(NavigateTarget::Watchlist),
            Command::Details { contract, token_id } => {
                Action::Navigate(NavigateTarget::Details(TokenKey::new(
                    contract.as_str(),
                    token_id.as_str(),
                )))
            }

            Command::Add(None) => {
                self.enter_prompt(PromptKind::AddContract, String::new());
                Action::None
            }
            Command::Add(Some((contract, token_id))) => {
                self.request_add_token(contract, token_id);
                Action::None
            }
            Command::Remove { contract, token_id } => {
                self.remove_token(&TokenKey::new(contract.as_str(), token_id.as_str()));
                Action::None
            }

            Command::Import(None) => {
                self.enter_prompt(PromptKind::ImportKey, String::new());
                Action::None
            }
            Command::Import(Some(key)) => {
                self.import_account(key);
                Action::None
            }
            Command::Primary(address) => {
                self.set_primary_account(address);
                Action::None
            }

            Command::Send(to) => {
                let Some(details) = self.details.as_mut().filter(|_| self.screen == Screen::Details)
                else {
                    return Action::Notify(
                        "Open a token's details to send it".to_string(),
                        NotifyLevel::Warn,
                    );
                };
                details.to_address = to.clone();
                self.sell();
                Action::None
            }

            Command::Clear => {
                self.state.dismiss_error();
                Action::Notify("Error cleared".to_string(), NotifyLevel::Info)
            }
            Command::Help => Action::Help,
            Command::Quit => Action::Quit,

            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    /// Apply an action returned by a command
    pub fn apply_action(&mut self, action: crate::core::Action) {
        use crate::core::{Action, NavigateTarget, NotifyLevel};

        match action {
            Action::None => {}
            Action::Navigate(target) => match target {
                NavigateTarget::Wallet => self.navigate(Screen::Wallet),
                NavigateTarget::Watchlist => self.navigate(Screen::Watchlist),
                NavigateTarget::Details(key) => self.open_details(key),
            },
            Action::Notify(msg, level) => {
                let level = match level {
                    NotifyLevel::Info => StatusLevel::Info,
                    NotifyLevel::Warn => StatusLevel::Warn,
                    NotifyLevel::Error => StatusLevel::Error,
                };
                self.set_status(msg, level);
            }
            Action::Help => self.help_open = true,
            Action::Quit => self.should_quit = true,
        }
    }
}

fn clamp_selection(selection: &mut usize, len: usize) {
    if len == 0 {
        *selection = 0;
    } else if *selection >= len {
        *selection = len - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn app() -> App {
        App::new(Box::new(SqliteStore::open_in_memory().unwrap()), "http://127.0.0.1:8545")
    }

    #[test]
    fn test_login_form_uses_fallback() {
        let app = app();
        assert_eq!(app.login.node_url, "http://127.0.0.1:8545");
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_login_form_prefers_saved_url() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set(StorageKey::NodeUrl, "http://saved:8545").unwrap();
        let app = App::new(Box::new(store), "http://127.0.0.1:8545");
        assert_eq!(app.login.node_url, "http://saved:8545");
    }

    #[test]
    fn test_empty_url_rejected_inline() {
        let mut app = app();
        app.login.node_url = "  ".into();
        app.submit_login();
        assert_eq!(app.screen, Screen::Login);
        assert!(app.login.error.is_some());
        assert!(app.state.error.is_empty());
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_commands_need_login() {
        let mut app = app();
        app.command.input = "wallet".into();
        app.apply_command();
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));
    }

    #[test]
    fn test_clamp_selection() {
        let mut selection = 5;
        clamp_selection(&mut selection, 2);
        assert_eq!(selection, 1);
        clamp_selection(&mut selection, 0);
        assert_eq!(selection, 0);
    }
}

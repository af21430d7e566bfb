//! Session-scoped list of submitted transactions

use std::fmt;

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted by the node, hash known, no receipt yet
    Pending,
    /// Receipt with success status
    Mined,
    /// Receipt with failure status
    Error,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Mined | TxStatus::Error)
    }

    pub fn from_receipt(success: bool) -> Self {
        if success {
            TxStatus::Mined
        } else {
            TxStatus::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Mined => "mined",
            TxStatus::Error => "error",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    pub hash: String,
    pub status: TxStatus,
    pub label: String,
    pub submitted_at: DateTime<Local>,
}

/// Outcome of [`TransactionList::update_status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Applied,
    /// No record with this hash (removed by the user, or never appended)
    UnknownHash,
    /// Record is terminal and the update would move it back to pending
    TerminalKept,
}

#[derive(Debug, Default)]
pub struct TransactionList {
    txs: Vec<PendingTransaction>,
}

impl TransactionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PendingTransaction] {
        &self.txs
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn get(&self, hash: &str) -> Option<&PendingTransaction> {
        self.txs.iter().find(|tx| tx.hash == hash)
    }

    /// Record a freshly acknowledged hash as pending.
    ///
    /// A hash that is already listed keeps its existing record.
    pub fn append(&mut self, hash: impl Into<String>, label: impl Into<String>) -> &[PendingTransaction] {
        let hash = hash.into();
        if self.get(&hash).is_some() {
            tracing::warn!(%hash, "duplicate transaction hash ignored");
            return &self.txs;
        }
        self.txs.push(PendingTransaction {
            hash,
            status: TxStatus::Pending,
            label: label.into(),
            submitted_at: Local::now(),
        });
        &self.txs
    }

    pub fn update_status(&mut self, hash: &str, status: TxStatus) -> StatusUpdate {
        let Some(tx) = self.txs.iter_mut().find(|tx| tx.hash == hash) else {
            return StatusUpdate::UnknownHash;
        };
        if tx.status.is_terminal() && !status.is_terminal() {
            return StatusUpdate::TerminalKept;
        }
        tx.status = status;
        StatusUpdate::Applied
    }

    pub fn remove(&mut self, hash: &str) -> &[PendingTransaction] {
        self.txs.retain(|tx| tx.hash != hash);
        &self.txs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_then_mine() {
        let mut txs = TransactionList::new();
        txs.append("0xhash1", "transfer");
        assert_eq!(txs.items()[0].status, TxStatus::Pending);

        assert_eq!(txs.update_status("0xhash1", TxStatus::Mined), StatusUpdate::Applied);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs.get("0xhash1").unwrap().status, TxStatus::Mined);
    }

    #[test]
    fn test_update_unknown_hash_is_noop() {
        let mut txs = TransactionList::new();
        txs.append("0x1", "");
        assert_eq!(txs.update_status("0x2", TxStatus::Error), StatusUpdate::UnknownHash);
        assert_eq!(txs.items().len(), 1);
        assert_eq!(txs.items()[0].status, TxStatus::Pending);
    }

    #[test]
    fn test_terminal_status_never_regresses() {
        let mut txs = TransactionList::new();
        txs.append("0x1", "");
        txs.update_status("0x1", TxStatus::Error);
        assert_eq!(txs.update_status("0x1", TxStatus::Pending), StatusUpdate::TerminalKept);
        assert_eq!(txs.get("0x1").unwrap().status, TxStatus::Error);
    }

    #[test]
    fn test_duplicate_append_keeps_first_record() {
        let mut txs = TransactionList::new();
        txs.append("0x1", "first");
        txs.update_status("0x1", TxStatus::Mined);
        let items = txs.append("0x1", "second");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "first");
        assert_eq!(items[0].status, TxStatus::Mined);
    }

    #[test]
    fn test_remove() {
        let mut txs = TransactionList::new();
        txs.append("0x1", "");
        txs.append("0x2", "");
        assert_eq!(txs.remove("0x3").len(), 2);
        let left = txs.remove("0x1");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].hash, "0x2");
    }
}

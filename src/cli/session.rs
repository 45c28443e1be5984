use crate::ledger::Ledger;

/// Owns the ledger for one shell session. The ledger is created on first
/// mutable access and dropped with the session.
#[derive(Debug, Default)]
pub struct Session {
    ledger: Option<Ledger>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view. `None` until something has been recorded.
    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    /// The ledger only when it holds at least one entry.
    pub fn view(&self) -> Option<&Ledger> {
        self.ledger.as_ref().filter(|ledger| !ledger.is_empty())
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        self.ledger.get_or_insert_with(|| {
            tracing::debug!("session ledger created");
            Ledger::new()
        })
    }

    pub fn end(&mut self) {
        if let Some(ledger) = self.ledger.take() {
            tracing::info!(entries = ledger.len(), "session ended; ledger discarded");
        }
    }
}

/// Optimistic-update reconciliation.
///
/// A card move is shown immediately by overlaying the display model, while
/// the write-back round-trips through the host. The overlay lives in a
/// single slot with two states: idle (display = authoritative) and pending
/// (display = overlay). It is discarded once the authoritative data agrees
/// with every pending move, rolled back on write failure, and its updating
/// marks expire after a confirmation window so a stalled host never leaves
/// spinners behind.
///
/// Board ids are scoped to one build, so pending moves remember the target
/// board *name* and confirmation compares names, never ids.
use std::time::{Duration, Instant};

use crate::types::KanbanModel;

/// How long a pending move may wait for the host to republish matching data
/// before its updating marks are cleared.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct PendingMove {
    card_id: usize,
    target_board: String,
}

#[derive(Debug, Clone)]
struct Overlay {
    model: KanbanModel,
    pending: Vec<PendingMove>,
    applied_at: Instant,
}

#[derive(Debug)]
pub struct Reconciler {
    overlay: Option<Overlay>,
    timeout: Duration,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::with_timeout(CONFIRM_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            overlay: None,
            timeout,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.overlay.is_some()
    }

    /// The model to render: the overlay while a mutation is in flight, the
    /// authoritative model otherwise.
    pub fn display<'a>(&'a self, authoritative: &'a KanbanModel) -> &'a KanbanModel {
        match &self.overlay {
            Some(overlay) => &overlay.model,
            None => authoritative,
        }
    }

    /// Apply a user-initiated move optimistically. The overlay is cloned
    /// from the *current display*, so moves issued while another is still
    /// in flight compose; each application resets the confirmation clock.
    /// Returns false (and changes nothing) when the card is unknown.
    pub fn apply_move(
        &mut self,
        authoritative: &KanbanModel,
        card_id: usize,
        target_board_name: &str,
    ) -> bool {
        let mut model = self.display(authoritative).clone();
        if model.card_by_id(card_id).is_none() {
            log::warn!("[kanview.reconcile.move] Card not found: {}", card_id);
            return false;
        }

        // The target comes from a drop on an existing lane; if it is somehow
        // gone the card keeps its board but is still marked updating.
        if let Some(board_id) = model.board_by_name(target_board_name).map(|b| b.id.clone()) {
            if let Some(card) = model.cards.iter_mut().find(|c| c.id == card_id) {
                card.board_id = board_id;
            }
        }
        if !model.updating_card_ids.contains(&card_id) {
            model.updating_card_ids.push(card_id);
        }

        let mut pending: Vec<PendingMove> = match self.overlay.take() {
            Some(overlay) => overlay
                .pending
                .into_iter()
                .filter(|mv| mv.card_id != card_id)
                .collect(),
            None => Vec::new(),
        };
        pending.push(PendingMove {
            card_id,
            target_board: target_board_name.to_string(),
        });

        self.overlay = Some(Overlay {
            model,
            pending,
            applied_at: Instant::now(),
        });
        true
    }

    /// Mark a card as updating without moving it (date edits: the field data
    /// is host-managed, only the spinner state is local). Confirmation is
    /// the next authoritative refresh that still shows the card on its
    /// current board.
    pub fn mark_updating(&mut self, authoritative: &KanbanModel, card_id: usize) -> bool {
        let target = {
            let display = self.display(authoritative);
            display
                .card_by_id(card_id)
                .and_then(|card| display.board_name_of(card))
                .map(str::to_string)
        };
        match target {
            Some(board_name) => self.apply_move(authoritative, card_id, &board_name),
            None => {
                log::warn!("[kanview.reconcile.mark] Card not found: {}", card_id);
                false
            }
        }
    }

    /// Fold in a freshly built authoritative model. The overlay is discarded
    /// only when every pending move is reflected: partial agreement keeps
    /// the overlay so the view never flickers back to stale state while the
    /// host is catching up row by row. Once the updating marks have expired
    /// (see [`Reconciler::tick`]) any refresh replaces the overlay.
    pub fn reconcile(&mut self, authoritative: &KanbanModel) {
        let Some(overlay) = &self.overlay else {
            return;
        };
        let confirmed = overlay.pending.iter().all(|mv| {
            authoritative
                .card_by_id(mv.card_id)
                .and_then(|card| authoritative.board_name_of(card))
                .map(|name| name == mv.target_board)
                .unwrap_or(false)
        });
        if confirmed {
            log::info!(
                "[kanview.reconcile.confirm] Authoritative data caught up, dropping overlay"
            );
            self.overlay = None;
        } else {
            log::debug!("[kanview.reconcile.hold] Overlay retained, host still catching up");
        }
    }

    /// Expire the confirmation window. Clears the updating marks (the
    /// spinner) but keeps showing the overlay's card data. This is a visual
    /// escape hatch, not a correctness mechanism; the next refresh
    /// reconciles the data itself.
    pub fn tick(&mut self) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };
        if overlay.pending.is_empty() {
            return;
        }
        if overlay.applied_at.elapsed() >= self.timeout {
            log::info!(
                "[kanview.reconcile.timeout] No confirmation within {:?}, clearing updating marks",
                self.timeout
            );
            overlay.pending.clear();
            overlay.model.updating_card_ids.clear();
        }
    }

    /// Drop the overlay outright (write-back failed, or the caller is
    /// resetting). Display falls back to the authoritative model.
    pub fn clear(&mut self) {
        if self.overlay.take().is_some() {
            log::info!("[kanview.reconcile.clear] Overlay discarded");
        }
    }
}

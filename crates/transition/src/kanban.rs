//! Kanban board controller.
//!
//! Three columns keyed by [`WorkflowStatus`]. Orders move between columns by
//! dragging a card or through the card menu; both paths end in
//! [`KanbanController::request_transition`], so they share the optimistic
//! update and the failure handling.
//!
//! A failed commit raises a board-level banner. Whether the optimistic
//! column survives the failure is the engine's [`FailurePolicy`]; the board
//! is normally configured with [`FailurePolicy::KeepOptimistic`] and relies
//! on a refresh to resync.

use protolab_protocol::{
    BoardFilter, Order, OrderBoard, OrderId, OrderRecord, Status, StatusChangeRequest, WorkflowStatus,
};
use tracing::{debug, info};

use crate::commit::CommitOutcome;
use crate::engine::{FailurePolicy, Rejection, Settlement, TransitionEngine, TransitionObserver};

/// A drag gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    /// The card being dragged.
    pub order: OrderId,
    /// The column currently under the pointer, if any.
    pub over: Option<WorkflowStatus>,
}

/// Board state plus the transition engine driving it.
#[derive(Debug)]
pub struct KanbanController {
    board: OrderBoard,
    engine: TransitionEngine<WorkflowStatus>,
    filter: BoardFilter,
    drag: Option<DragState>,
    banner: Option<String>,
}

impl KanbanController {
    #[must_use]
    pub fn new(board: OrderBoard, policy: FailurePolicy) -> Self {
        Self {
            board,
            engine: TransitionEngine::new(policy),
            filter: BoardFilter::default(),
            drag: None,
            banner: None,
        }
    }

    #[must_use]
    pub fn board(&self) -> &OrderBoard {
        &self.board
    }

    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.board.get(id)
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.engine.policy()
    }

    pub fn subscribe(&mut self, observer: impl TransitionObserver<WorkflowStatus> + 'static) {
        self.engine.subscribe(observer);
    }

    #[must_use]
    pub fn filter(&self) -> &BoardFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut BoardFilter {
        &mut self.filter
    }

    /// The filtered columns, in workflow order.
    #[must_use]
    pub fn columns(&self) -> [Vec<&Order>; 3] {
        self.board.columns(&self.filter)
    }

    /// Card counts of the filtered columns.
    #[must_use]
    pub fn counts(&self) -> [usize; 3] {
        self.board.counts(&self.filter)
    }

    /// Returns `true` while a commit for the order is unsettled.
    #[must_use]
    pub fn is_pending(&self, id: OrderId) -> bool {
        self.engine.is_in_flight(id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.engine.in_flight_count()
    }

    /// The single transition entry point for the board.
    ///
    /// # Errors
    ///
    /// [`Rejection::Missing`] for an unknown order, otherwise see
    /// [`TransitionEngine::request_transition`].
    pub fn request_transition(
        &mut self,
        id: OrderId,
        to: WorkflowStatus,
    ) -> Result<StatusChangeRequest<WorkflowStatus>, Rejection> {
        let order = self.board.get_mut(id).ok_or(Rejection::Missing)?;
        let request = self.engine.request_transition(id, &mut order.status, to)?;
        info!(order = %order.details.code, from = ?request.from, to = ?to, "order moved");
        Ok(request)
    }

    /// Moves an order from its card menu.
    ///
    /// # Errors
    ///
    /// See [`Self::request_transition`].
    pub fn move_via_menu(
        &mut self,
        id: OrderId,
        to: WorkflowStatus,
    ) -> Result<StatusChangeRequest<WorkflowStatus>, Rejection> {
        self.request_transition(id, to)
    }

    /// Starts dragging a card. Returns `false` for an unknown order.
    pub fn drag_start(&mut self, id: OrderId) -> bool {
        if self.board.get(id).is_none() {
            return false;
        }
        self.drag = Some(DragState { order: id, over: None });
        debug!(order = %id, "drag started");
        true
    }

    /// Marks the column under the pointer. Only a repaint hint.
    pub fn drag_over(&mut self, column: Option<WorkflowStatus>) {
        if let Some(drag) = self.drag.as_mut() {
            drag.over = column;
        }
    }

    #[must_use]
    pub fn drag(&self) -> Option<DragState> {
        self.drag
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Drops the dragged card onto a column.
    ///
    /// Returns `None` when no drag is in progress. The drag state is cleared
    /// whatever the outcome; dropping onto the card's own column is rejected
    /// as [`Rejection::SameStatus`].
    pub fn drop_on(&mut self, column: WorkflowStatus) -> Option<Result<StatusChangeRequest<WorkflowStatus>, Rejection>> {
        let drag = self.drag.take()?;
        debug!(order = %drag.order, ?column, "card dropped");
        Some(self.request_transition(drag.order, column))
    }

    /// Applies a commit outcome. A failure raises the board banner.
    pub fn settle(&mut self, outcome: CommitOutcome<WorkflowStatus>) -> Settlement<WorkflowStatus> {
        let id = outcome.request.entity_id;
        let attempted = outcome.request.to;
        let order = self.board.get_mut(id);
        let code = order.as_ref().map(|o| o.details.code.clone());
        let settlement = self.engine.settle(outcome, order.map(|o| &mut o.status));

        if let (Some(error), Some(code)) = (settlement.error(), code) {
            self.banner = Some(format!(
                "Falha ao mover {code} para {}: {error}",
                attempted.label()
            ));
        }
        settlement
    }

    /// The board-level error message, if any.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Removes an order from the board. Its in-flight commit, if any, will
    /// settle as stale.
    pub fn delete_order(&mut self, id: OrderId) -> Option<Order> {
        if self.drag.is_some_and(|d| d.order == id) {
            self.drag = None;
        }
        self.board.remove_order(id)
    }

    /// Replaces the board with a fresh server snapshot.
    ///
    /// Orders with an unsettled commit keep their optimistic status, and the
    /// error banner is cleared.
    pub fn replace_from_records(&mut self, records: impl IntoIterator<Item = OrderRecord>) {
        let mut board = OrderBoard::from_records(records);
        for order in board.orders().iter().map(|o| o.id).collect::<Vec<_>>() {
            if let (Some(pending), Some(slot)) = (self.engine.pending(order), board.get_mut(order)) {
                slot.status = pending.to;
            }
        }
        if self.drag.is_some_and(|d| board.get(d.order).is_none()) {
            self.drag = None;
        }
        self.board = board;
        self.banner = None;
        debug!(orders = self.board.len(), "board refreshed");
    }
}

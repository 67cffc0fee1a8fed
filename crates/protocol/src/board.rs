//! Kanban board of orders.
//!
//! The board stores every in-scope order in a single ordered list. Columns
//! are a projection of that list keyed by [`WorkflowStatus`] and narrowed by a
//! [`BoardFilter`]; projecting never mutates the underlying list.

use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderId, OrderRecord, Priority};
use crate::status::WorkflowStatus;

/// Filter applied to the board projection.
///
/// # Examples
///
/// ```
/// use protolab_protocol::{BoardFilter, Priority};
///
/// let mut filter = BoardFilter::default();
/// filter.cycle_priority();
/// assert_eq!(filter.priority, Some(Priority::Baixa));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFilter {
    /// Only show orders with this priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Only show orders matching this term.
    #[serde(default)]
    pub search: String,
}

impl BoardFilter {
    /// Returns `true` if the order passes both filters.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        order.matches_priority(self.priority) && order.matches_search(&self.search)
    }

    /// Advances the priority filter: all, then each priority from lowest to
    /// highest, then back to all.
    pub fn cycle_priority(&mut self) {
        let all = Priority::all();
        self.priority = match self.priority {
            None => Some(all[0]),
            Some(p) => all.iter().position(|x| *x == p).and_then(|i| all.get(i + 1)).copied(),
        };
    }

    /// Returns `true` if no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.search.trim().is_empty()
    }
}

/// The ordered list of orders on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBoard {
    orders: Vec<Order>,
}

impl OrderBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from server records, dropping any record whose status
    /// is outside the workflow (cancelled orders).
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_protocol::{Order, OrderBoard, OrderDetails, OrderStatus};
    ///
    /// let kept = Order::new(OrderDetails::new("OS-1", "Ana", "Dr. Reis", "Coroa")).to_record();
    /// let mut cancelled = Order::new(OrderDetails::new("OS-2", "Rui", "Dr. Reis", "Ponte")).to_record();
    /// cancelled.status = OrderStatus::Cancelado;
    ///
    /// let board = OrderBoard::from_records(vec![kept, cancelled]);
    /// assert_eq!(board.len(), 1);
    /// ```
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = OrderRecord>) -> Self {
        Self {
            orders: records
                .into_iter()
                .filter_map(|record| Order::try_from(record).ok())
                .collect(),
        }
    }

    /// Appends an order.
    pub fn add_order(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Removes and returns the order with the given ID.
    pub fn remove_order(&mut self, id: OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id == id)?;
        Some(self.orders.remove(pos))
    }

    /// Returns the order with the given ID.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Returns the order with the given ID mutably.
    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// All orders in board order.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Total number of orders regardless of filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns `true` if the board has no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders in the given column that pass the filter, in board order.
    #[must_use]
    pub fn column(&self, status: WorkflowStatus, filter: &BoardFilter) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| o.status == status)
            .filter(|o| filter.matches(o))
            .collect()
    }

    /// All three columns of the filtered projection.
    #[must_use]
    pub fn columns(&self, filter: &BoardFilter) -> [Vec<&Order>; 3] {
        WorkflowStatus::all().map(|status| self.column(status, filter))
    }

    /// Per-column counts of the filtered projection.
    #[must_use]
    pub fn counts(&self, filter: &BoardFilter) -> [usize; 3] {
        let mut counts = [0; 3];
        for order in self.orders.iter().filter(|o| filter.matches(o)) {
            counts[order.status.index()] += 1;
        }
        counts
    }
}

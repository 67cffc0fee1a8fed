//! Prosthetics orders tracked on the board.
//!
//! An [`OrderRecord`] is what the server stores, including cancelled orders.
//! An [`Order`] is the board-side view, restricted to the three workflow
//! states.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::status::{OrderStatus, WorkflowStatus};

/// Unique identifier for an order.
pub type OrderId = uuid::Uuid;

/// Urgency of an order, used to filter the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Baixa,
    #[default]
    Media,
    Alta,
    Urgente,
}

impl Priority {
    /// Returns all priorities from lowest to highest.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Baixa, Self::Media, Self::Alta, Self::Urgente]
    }

    /// Returns a short display label.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_protocol::Priority;
    ///
    /// assert_eq!(Priority::Urgente.label(), "Urgente");
    /// ```
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Baixa => "Baixa",
            Self::Media => "Média",
            Self::Alta => "Alta",
            Self::Urgente => "Urgente",
        }
    }
}

/// Descriptive fields shared by the server record and the board card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Human-facing order code (`"OS-0042"`).
    pub code: String,
    /// Patient the prosthesis is for.
    pub patient: String,
    /// Requesting dentist.
    pub dentist: String,
    /// Service being performed (crown, bridge, ...).
    pub service: String,
    /// Urgency.
    #[serde(default)]
    pub priority: Priority,
    /// Promised delivery date, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl OrderDetails {
    /// Creates details with default priority and no due date.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        patient: impl Into<String>,
        dentist: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            patient: patient.into(),
            dentist: dentist.into(),
            service: service.into(),
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// An order as persisted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(flatten)]
    pub details: OrderDetails,
    pub status: OrderStatus,
}

/// An order as shown on the board.
///
/// # Examples
///
/// ```
/// use protolab_protocol::{Order, OrderDetails, WorkflowStatus};
///
/// let order = Order::new(OrderDetails::new("OS-1", "Ana", "Dr. Reis", "Coroa"));
/// assert_eq!(order.status, WorkflowStatus::Pendente);
/// assert!(order.matches_search("reis"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Descriptive fields.
    #[serde(flatten)]
    pub details: OrderDetails,
    /// Current workflow status.
    pub status: WorkflowStatus,
}

impl Order {
    /// Creates a new pending order with a fresh ID.
    #[must_use]
    pub fn new(details: OrderDetails) -> Self {
        Self {
            id: OrderId::new_v4(),
            details,
            status: WorkflowStatus::Pendente,
        }
    }

    /// Sets the status, builder-style.
    #[must_use]
    pub fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns `true` if the order matches the given priority filter.
    ///
    /// `None` matches every order.
    #[must_use]
    pub fn matches_priority(&self, priority: Option<Priority>) -> bool {
        priority.is_none_or(|p| self.details.priority == p)
    }

    /// Returns `true` if the search term occurs (case-insensitively) in the
    /// code, patient, dentist or service.
    ///
    /// An empty or blank term matches every order.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            &self.details.code,
            &self.details.patient,
            &self.details.dentist,
            &self.details.service,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }

    /// Converts the board order back into a server record.
    #[must_use]
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            details: self.details.clone(),
            status: self.status.into(),
        }
    }
}

impl TryFrom<OrderRecord> for Order {
    type Error = crate::error::ProtocolError;

    fn try_from(record: OrderRecord) -> Result<Self> {
        Ok(Self {
            id: record.id,
            details: record.details,
            status: WorkflowStatus::try_from(record.status)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Order {
        Order::new(
            OrderDetails::new("OS-0042", "Maria Souza", "Dr. Carlos Reis", "Coroa de zircônia")
                .with_priority(Priority::Alta),
        )
    }

    #[test]
    fn new_order_is_pending() {
        assert_eq!(sample().status, WorkflowStatus::Pendente);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let order = sample();
        assert!(order.matches_search("os-0042"));
        assert!(order.matches_search("MARIA"));
        assert!(order.matches_search("reis"));
        assert!(order.matches_search("zircônia"));
        assert!(!order.matches_search("ponte"));
    }

    #[test]
    fn blank_search_matches_everything() {
        assert!(sample().matches_search(""));
        assert!(sample().matches_search("   "));
    }

    #[test]
    fn priority_filter() {
        let order = sample();
        assert!(order.matches_priority(None));
        assert!(order.matches_priority(Some(Priority::Alta)));
        assert!(!order.matches_priority(Some(Priority::Baixa)));
    }

    #[test]
    fn cancelled_record_is_rejected() {
        let mut record = sample().to_record();
        record.status = OrderStatus::Cancelado;
        assert!(Order::try_from(record).is_err());
    }

    #[test]
    fn record_json_is_flat() {
        let order = sample().with_status(WorkflowStatus::Concluido);
        let json = serde_json::to_value(order.to_record()).expect("serialize");
        assert_eq!(json["code"], "OS-0042");
        assert_eq!(json["status"], "CONCLUIDO");
        assert_eq!(json["priority"], "ALTA");

        let parsed: OrderRecord = serde_json::from_value(json).expect("deserialize");
        let back = Order::try_from(parsed).expect("in scope");
        assert_eq!(back, order);
    }
}

//! Sample data for demonstration and testing.
//!
//! Seeds the simulated backend with a realistic lab: a dozen orders spread
//! across the workflow (plus one cancelled order the board must hide) and a
//! registry of dentists, prosthetists, patients, clinics, services and
//! materials.
//!
//! # Examples
//!
//! ```
//! use protolab_protocol::OrderBoard;
//! use protolab_protocol::dummy::sample_orders;
//!
//! let records = sample_orders();
//! assert_eq!(records.len(), 12);
//! assert_eq!(OrderBoard::from_records(records).len(), 11);
//! ```

use chrono::NaiveDate;

use crate::order::{OrderDetails, OrderId, OrderRecord, Priority};
use crate::registry::{EntityKind, RegistryEntry};
use crate::status::{BinaryStatus, OrderStatus};

/// A builder for sample order records.
///
/// Internal helper to keep the sample list readable.
struct RecordBuilder {
    details: OrderDetails,
    status: OrderStatus,
}

impl RecordBuilder {
    fn new(code: &str, patient: &str, dentist: &str, service: &str) -> Self {
        Self {
            details: OrderDetails::new(code, patient, dentist, service),
            status: OrderStatus::Pendente,
        }
    }

    fn priority(mut self, priority: Priority) -> Self {
        self.details.priority = priority;
        self
    }

    fn due(mut self, year: i32, month: u32, day: u32) -> Self {
        self.details.due_date = NaiveDate::from_ymd_opt(year, month, day);
        self
    }

    fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    fn build(self) -> OrderRecord {
        OrderRecord {
            id: OrderId::new_v4(),
            details: self.details,
            status: self.status,
        }
    }
}

/// Generates the sample order records.
///
/// - 5 `Pendente`, 4 `EmAndamento`, 2 `Concluido`
/// - 1 `Cancelado`, which never appears on the board
#[must_use]
pub fn sample_orders() -> Vec<OrderRecord> {
    use OrderStatus::{Cancelado, Concluido, EmAndamento, Pendente};

    vec![
        RecordBuilder::new("OS-0101", "Maria Souza", "Dr. Carlos Reis", "Coroa de zircônia")
            .priority(Priority::Alta)
            .due(2026, 11, 3)
            .status(Pendente)
            .build(),
        RecordBuilder::new("OS-0102", "João Lima", "Dra. Helena Prado", "Prótese total superior")
            .priority(Priority::Media)
            .due(2026, 11, 10)
            .status(Pendente)
            .build(),
        RecordBuilder::new("OS-0103", "Ana Costa", "Dr. Carlos Reis", "Faceta de porcelana")
            .priority(Priority::Urgente)
            .due(2026, 10, 22)
            .status(Pendente)
            .build(),
        RecordBuilder::new("OS-0104", "Pedro Alves", "Dr. Marcos Tavares", "Placa miorrelaxante")
            .priority(Priority::Baixa)
            .status(Pendente)
            .build(),
        RecordBuilder::new("OS-0105", "Luiza Martins", "Dra. Helena Prado", "Provisório em resina")
            .priority(Priority::Media)
            .due(2026, 10, 30)
            .status(Pendente)
            .build(),
        RecordBuilder::new("OS-0096", "Rafael Gomes", "Dr. Marcos Tavares", "Ponte fixa 3 elementos")
            .priority(Priority::Alta)
            .due(2026, 10, 25)
            .status(EmAndamento)
            .build(),
        RecordBuilder::new("OS-0097", "Beatriz Rocha", "Dr. Carlos Reis", "Coroa metalocerâmica")
            .priority(Priority::Media)
            .due(2026, 10, 28)
            .status(EmAndamento)
            .build(),
        RecordBuilder::new("OS-0098", "Carla Dias", "Dra. Helena Prado", "Protocolo sobre implante")
            .priority(Priority::Urgente)
            .due(2026, 10, 21)
            .status(EmAndamento)
            .build(),
        RecordBuilder::new("OS-0099", "Tiago Nunes", "Dr. Marcos Tavares", "Prótese parcial removível")
            .priority(Priority::Baixa)
            .status(EmAndamento)
            .build(),
        RecordBuilder::new("OS-0090", "Fernanda Ribeiro", "Dr. Carlos Reis", "Onlay cerâmico")
            .priority(Priority::Media)
            .due(2026, 10, 15)
            .status(Concluido)
            .build(),
        RecordBuilder::new("OS-0091", "Gustavo Pires", "Dra. Helena Prado", "Coroa de zircônia")
            .priority(Priority::Alta)
            .due(2026, 10, 12)
            .status(Concluido)
            .build(),
        RecordBuilder::new("OS-0092", "Helena Moura", "Dr. Marcos Tavares", "Clareamento - moldeira")
            .priority(Priority::Baixa)
            .status(Cancelado)
            .build(),
    ]
}

/// Generates the sample registry, grouped by kind.
#[must_use]
pub fn sample_registry() -> Vec<RegistryEntry> {
    use EntityKind::{Clinic, Dentist, Material, Patient, Prosthetist, Service};

    let entries = [
        (Dentist, "Dr. Carlos Reis", BinaryStatus::Ativo),
        (Dentist, "Dra. Helena Prado", BinaryStatus::Ativo),
        (Dentist, "Dr. Marcos Tavares", BinaryStatus::Inativo),
        (Prosthetist, "Renata Farias", BinaryStatus::Ativo),
        (Prosthetist, "Sérgio Batista", BinaryStatus::Ativo),
        (Patient, "Maria Souza", BinaryStatus::Ativo),
        (Patient, "João Lima", BinaryStatus::Inativo),
        (Clinic, "Clínica Sorriso Centro", BinaryStatus::Ativo),
        (Service, "Coroa de zircônia", BinaryStatus::Ativo),
        (Service, "Clareamento - moldeira", BinaryStatus::Inativo),
        (Material, "Dissilicato de lítio", BinaryStatus::Ativo),
        (Material, "Resina acrílica", BinaryStatus::Ativo),
    ];

    entries
        .into_iter()
        .map(|(kind, name, status)| RegistryEntry::new(kind, name).with_status(status))
        .collect()
}

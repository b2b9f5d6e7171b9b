// libs/appointment-cell/src/specification.rs
//! Composable appointment query criteria.
//!
//! A specification is a value: building one has no side effects and the same
//! instance can be handed to any number of repository calls. Storage adapters
//! consume the flattened [`AppointmentParams`] rather than the tree.

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, ServiceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    LimitOffset { limit: u32, offset: u32 },
    Page { page: u32, size: u32 },
}

impl Pagination {
    pub fn limit_offset(limit: u32, offset: u32) -> Self {
        Pagination::LimitOffset { limit, offset }
    }

    /// Page numbers start at 1; anything lower is clamped.
    pub fn page(page: u32, size: u32) -> Self {
        Pagination::Page { page: page.max(1), size }
    }

    pub fn limit(&self) -> u32 {
        match self {
            Pagination::LimitOffset { limit, .. } => *limit,
            Pagination::Page { size, .. } => *size,
        }
    }

    pub fn offset(&self) -> u32 {
        match self {
            Pagination::LimitOffset { offset, .. } => *offset,
            Pagination::Page { page, size } => (*page).max(1).saturating_sub(1).saturating_mul(*size),
        }
    }

    pub fn page_number(&self) -> u32 {
        match self {
            Pagination::LimitOffset { limit: 0, .. } => 1,
            Pagination::LimitOffset { limit, offset } => offset / limit + 1,
            Pagination::Page { page, .. } => (*page).max(1),
        }
    }
}

/// Flat filter set handed to storage. Unset fields do not constrain the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentParams {
    pub id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub service: Option<ServiceType>,
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound on `scheduled_date`.
    pub start_date: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `scheduled_date`.
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AppointmentParams {
    /// Copies every field of `other` that is still unset here. Fields already
    /// set keep their value, so the earliest writer wins.
    pub fn merge_from(&mut self, other: &AppointmentParams) {
        fill(&mut self.id, other.id);
        fill(&mut self.customer_id, other.customer_id);
        fill(&mut self.employee_id, other.employee_id);
        fill(&mut self.pet_id, other.pet_id);
        fill(&mut self.service, other.service);
        fill(&mut self.status, other.status);
        fill(&mut self.start_date, other.start_date);
        fill(&mut self.end_date, other.end_date);
        fill(&mut self.limit, other.limit);
        fill(&mut self.offset, other.offset);
    }

    pub fn apply_pagination(&mut self, pagination: Pagination) {
        fill(&mut self.limit, Some(pagination.limit()));
        fill(&mut self.offset, Some(pagination.offset()));
    }

    pub fn without_pagination(&self) -> Self {
        Self { limit: None, offset: None, ..self.clone() }
    }

    /// In-process evaluation of the filter fields. Soft-deleted rows never match.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        appointment.deleted_at.is_none()
            && (self.id.is_none() || self.id == appointment.id)
            && self.customer_id.map_or(true, |id| id == appointment.customer_id)
            && (self.employee_id.is_none() || self.employee_id == appointment.employee_id)
            && self.pet_id.map_or(true, |id| id == appointment.pet_id)
            && self.service.map_or(true, |service| service == appointment.service)
            && self.status.map_or(true, |status| status == appointment.status)
            && self.start_date.map_or(true, |start| appointment.scheduled_date >= start)
            && self.end_date.map_or(true, |end| appointment.scheduled_date < end)
    }

    /// PostgREST filters, in a fixed order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut eq = |column: &str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((column.to_string(), format!("eq.{}", value)));
            }
        };

        eq("id", self.id.map(|v| v.to_string()));
        eq("customer_id", self.customer_id.map(|v| v.to_string()));
        eq("employee_id", self.employee_id.map(|v| v.to_string()));
        eq("pet_id", self.pet_id.map(|v| v.to_string()));
        eq("service", self.service.map(|v| v.as_str().to_string()));
        eq("status", self.status.map(|v| v.as_str().to_string()));

        if let Some(start) = self.start_date {
            pairs.push(("scheduled_date".to_string(), format!("gte.{}", timestamp(start))));
        }
        if let Some(end) = self.end_date {
            pairs.push(("scheduled_date".to_string(), format!("lt.{}", timestamp(end))));
        }

        pairs.push(("deleted_at".to_string(), "is.null".to_string()));
        pairs.push(("order".to_string(), "scheduled_date.asc".to_string()));

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        pairs
    }
}

fn fill<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The UTC calendar day containing `at`, as `[start_of_day, next_start_of_day)`.
/// `None` on the last representable day, which has no following midnight.
pub fn day_window(at: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start.checked_add_signed(Duration::days(1))?;
    Some((start, end))
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentSpecification {
    ById(Uuid),
    ByCustomer(Uuid),
    ByEmployee(Uuid),
    ByPet(Uuid),
    ByService(ServiceType),
    ByStatus(AppointmentStatus),
    ByDateRange { start: DateTime<Utc>, end: DateTime<Utc> },
    Composite {
        operator: LogicalOperator,
        children: Vec<AppointmentSpecification>,
        pagination: Option<Pagination>,
    },
}

impl AppointmentSpecification {
    pub fn by_id(id: Uuid) -> Self {
        Self::ById(id)
    }

    pub fn by_customer(customer_id: Uuid) -> Self {
        Self::ByCustomer(customer_id)
    }

    pub fn by_employee(employee_id: Uuid) -> Self {
        Self::ByEmployee(employee_id)
    }

    pub fn by_pet(pet_id: Uuid) -> Self {
        Self::ByPet(pet_id)
    }

    pub fn by_service(service: ServiceType) -> Self {
        Self::ByService(service)
    }

    pub fn by_status(status: AppointmentStatus) -> Self {
        Self::ByStatus(status)
    }

    /// `[start, end)`
    pub fn by_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::ByDateRange { start, end }
    }

    /// Every appointment on the UTC calendar day of `at`.
    pub fn by_day(at: DateTime<Utc>) -> Option<Self> {
        day_window(at).map(|(start, end)| Self::by_date_range(start, end))
    }

    pub fn all(children: Vec<AppointmentSpecification>) -> Self {
        Self::Composite { operator: LogicalOperator::And, children, pagination: None }
    }

    pub fn any(children: Vec<AppointmentSpecification>) -> Self {
        Self::Composite { operator: LogicalOperator::Or, children, pagination: None }
    }

    pub fn and(self, other: AppointmentSpecification) -> Self {
        self.combine(LogicalOperator::And, other)
    }

    pub fn or(self, other: AppointmentSpecification) -> Self {
        self.combine(LogicalOperator::Or, other)
    }

    fn combine(self, operator: LogicalOperator, other: AppointmentSpecification) -> Self {
        match self {
            Self::Composite { operator: current, mut children, pagination: None } if current == operator => {
                children.push(other);
                Self::Composite { operator, children, pagination: None }
            }
            spec => Self::Composite { operator, children: vec![spec, other], pagination: None },
        }
    }

    pub fn paginate(self, pagination: Pagination) -> Self {
        match self {
            Self::Composite { operator, children, .. } => {
                Self::Composite { operator, children, pagination: Some(pagination) }
            }
            spec => Self::Composite {
                operator: LogicalOperator::And,
                children: vec![spec],
                pagination: Some(pagination),
            },
        }
    }

    /// The effective pagination: the outermost modifier, then depth-first.
    pub fn pagination(&self) -> Option<Pagination> {
        match self {
            Self::Composite { pagination: Some(pagination), .. } => Some(*pagination),
            Self::Composite { children, .. } => children.iter().find_map(|child| child.pagination()),
            _ => None,
        }
    }

    /// Depth-first merge of every criterion into one parameter set,
    /// first-write-wins. OR branches are flattened too; callers that need
    /// real disjunction use [`Self::param_sets`].
    pub fn to_params(&self) -> AppointmentParams {
        let mut params = AppointmentParams::default();
        self.collect_into(&mut params);
        params
    }

    fn collect_into(&self, params: &mut AppointmentParams) {
        match self {
            Self::Composite { children, pagination, .. } => {
                if let Some(pagination) = pagination {
                    params.apply_pagination(*pagination);
                }
                for child in children {
                    child.collect_into(params);
                }
            }
            atomic => params.merge_from(&atomic.own_params()),
        }
    }

    fn own_params(&self) -> AppointmentParams {
        let mut params = AppointmentParams::default();
        match self {
            Self::ById(id) => params.id = Some(*id),
            Self::ByCustomer(id) => params.customer_id = Some(*id),
            Self::ByEmployee(id) => params.employee_id = Some(*id),
            Self::ByPet(id) => params.pet_id = Some(*id),
            Self::ByService(service) => params.service = Some(*service),
            Self::ByStatus(status) => params.status = Some(*status),
            Self::ByDateRange { start, end } => {
                params.start_date = Some(*start);
                params.end_date = Some(*end);
            }
            Self::Composite { .. } => {}
        }
        params
    }

    /// Disjunctive normal form of the filter: any row matching one of the
    /// returned sets satisfies the specification. Pagination is left out;
    /// it applies to the union as a whole.
    pub fn param_sets(&self) -> Vec<AppointmentParams> {
        match self {
            Self::Composite { operator: LogicalOperator::And, children, .. } => {
                children.iter().fold(vec![AppointmentParams::default()], |acc, child| {
                    let alternatives = child.param_sets();
                    acc.iter()
                        .flat_map(|left| {
                            alternatives.iter().map(move |right| {
                                let mut merged = left.clone();
                                merged.merge_from(right);
                                merged
                            })
                        })
                        .collect()
                })
            }
            Self::Composite { operator: LogicalOperator::Or, children, .. } => {
                children.iter().flat_map(|child| child.param_sets()).collect()
            }
            atomic => vec![atomic.own_params()],
        }
    }

    pub fn is_satisfied_by(&self, appointment: &Appointment) -> bool {
        self.param_sets().iter().any(|params| params.matches(appointment))
    }
}

//! # Report Routes
//!
//! Admin-only occupancy, booking activity and payment collection reports.
//! Reports read a snapshot and never block writes.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use leasehold_core::ReportPeriod;
use leasehold_engine::{BookingActivityReport, PaymentReport, Role, TowerOccupancy};

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

/// `?period=` for the booking report; defaults to `month`.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
}

impl PeriodQuery {
    fn parse(&self) -> Result<ReportPeriod, AppError> {
        match self.period.as_deref() {
            None => Ok(ReportPeriod::Month),
            Some(p) => Ok(p.parse()?),
        }
    }
}

/// `?months=` for the payment report; defaults to the configured window.
#[derive(Debug, Default, Deserialize)]
pub struct MonthsQuery {
    #[serde(default)]
    pub months: Option<usize>,
}

/// Build the report router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/reports/occupancy", get(occupancy))
        .route("/api/admin/reports/bookings", get(bookings))
        .route("/api/admin/reports/payments", get(payments))
}

/// GET /api/admin/reports/occupancy: Per-tower occupancy, in tower order.
async fn occupancy(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<TowerOccupancy>>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.occupancy_report()))
}

/// GET /api/admin/reports/bookings?period=week|month|year
async fn bookings(
    caller: CallerIdentity,
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<BookingActivityReport>, AppError> {
    require_role(&caller, Role::Admin)?;
    let period = extract_query(query)?.parse()?;
    Ok(Json(state.engine.booking_report(period)))
}

/// GET /api/admin/reports/payments?months=N
async fn payments(
    caller: CallerIdentity,
    State(state): State<AppState>,
    query: Result<Query<MonthsQuery>, QueryRejection>,
) -> Result<Json<PaymentReport>, AppError> {
    require_role(&caller, Role::Admin)?;
    let months = extract_query(query)?
        .months
        .unwrap_or(state.config.payment_report_months);
    Ok(Json(state.engine.payment_report(months)?))
}

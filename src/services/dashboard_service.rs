// src/services/dashboard_service.rs

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, SalesRepository},
    models::{
        dashboard::{DashboardData, PeriodBounds, PeriodQuery, PeriodReport},
        products::LOW_STOCK_THRESHOLD,
        sales::{SaleStatus, SaleWithClient},
    },
};

const MONTHLY_WINDOW: u32 = 6;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Início da janela do gráfico mensal: `now` menos seis meses de calendário.
pub fn monthly_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(MONTHLY_WINDOW))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), DATE_FORMAT).map_err(|_| {
                AppError::InvalidInput(format!("'{}' deve estar no formato YYYY-MM-DD", field))
            })
        })
        .transpose()
}

/// Lê `inicio`/`fim` da query string. Datas ausentes ficam em aberto.
pub fn parse_period(query: &PeriodQuery) -> Result<PeriodBounds, AppError> {
    let start = parse_date("inicio", query.inicio.as_deref())?;
    let end = parse_date("fim", query.fim.as_deref())?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(AppError::InvalidInput(
                "'inicio' não pode ser posterior a 'fim'".to_string(),
            ));
        }
    }

    Ok(PeriodBounds { start, end })
}

/// Intervalo semiaberto [inicio 00:00, fim+1 00:00) em UTC.
/// Só filtra quando as duas datas foram informadas.
pub fn period_range(bounds: &PeriodBounds) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = (bounds.start?, bounds.end?);
    let end_exclusive = end.succ_opt()?;
    Some((
        start.and_time(NaiveTime::MIN).and_utc(),
        end_exclusive.and_time(NaiveTime::MIN).and_utc(),
    ))
}

#[derive(Clone)]
pub struct DashboardService {
    dashboard_repo: DashboardRepository,
    sales_repo: SalesRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(
        dashboard_repo: DashboardRepository,
        sales_repo: SalesRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            dashboard_repo,
            sales_repo,
            pool,
        }
    }

    pub async fn get_dashboard(&self) -> Result<DashboardData, AppError> {
        // Snapshot consistente: todas as leituras veem o mesmo estado
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let summary = self.dashboard_repo.get_summary(&mut *tx).await?;

        let sales_to_pay = self
            .sales_repo
            .list_by_status(&mut *tx, SaleStatus::ToPay)
            .await?
            .into_iter()
            .map(SaleWithClient::from)
            .collect();

        let sales_paid = self
            .sales_repo
            .list_by_status(&mut *tx, SaleStatus::Paid)
            .await?
            .into_iter()
            .map(SaleWithClient::from)
            .collect();

        let low_stock_products = self
            .dashboard_repo
            .get_low_stock(&mut *tx, LOW_STOCK_THRESHOLD)
            .await?;

        let monthly_sales = self
            .dashboard_repo
            .get_monthly_sales(&mut *tx, monthly_cutoff(Utc::now()))
            .await?;

        tx.commit().await?;

        Ok(DashboardData {
            summary,
            sales_to_pay,
            sales_paid,
            low_stock_products,
            monthly_sales,
        })
    }

    pub async fn get_period_report(&self, query: &PeriodQuery) -> Result<PeriodReport, AppError> {
        let period = parse_period(query)?;
        let range = period_range(&period);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let paid = self
            .dashboard_repo
            .get_status_totals(&mut *tx, SaleStatus::Paid, range)
            .await?;
        let to_pay = self
            .dashboard_repo
            .get_status_totals(&mut *tx, SaleStatus::ToPay, range)
            .await?;

        tx.commit().await?;

        Ok(PeriodReport {
            period,
            total_sales: paid.count + to_pay.count,
            total_revenue: paid.total + to_pay.total,
            paid,
            to_pay,
        })
    }
}

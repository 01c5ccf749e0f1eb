// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, LowStockProduct, MonthlySales, StatusTotals},
        sales::SaleStatus,
    },
};

// Consultas agregadas; o service chama tudo dentro da mesma transação
#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Resumo geral
    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summary = sqlx::query_as::<_, DashboardSummary>(
            r#"
            SELECT
                COALESCE((SELECT SUM(total) FROM sales WHERE status = 'A_PAGAR'), 0) AS total_to_pay,
                COALESCE((SELECT SUM(total) FROM sales WHERE status = 'PAGO'), 0)    AS total_paid,
                (SELECT COUNT(*) FROM clients)   AS total_clients,
                (SELECT COUNT(*) FROM suppliers) AS total_suppliers,
                (SELECT COUNT(*) FROM products)  AS total_products,
                (SELECT COUNT(*) FROM sales)     AS total_sales
            "#,
        )
        .fetch_one(executor)
        .await?;

        Ok(summary)
    }

    // 2. Produtos abaixo do limite, menor estoque primeiro
    pub async fn get_low_stock<'e, E>(
        &self,
        executor: E,
        threshold: i32,
    ) -> Result<Vec<LowStockProduct>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT p.*, s.name AS supplier_name
            FROM products p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.stock < $1
            ORDER BY p.stock ASC, p.name ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(executor)
        .await?;

        Ok(data)
    }

    // 3. Gráfico mensal: meses sem venda simplesmente não aparecem
    pub async fn get_monthly_sales<'e, E>(
        &self,
        executor: E,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthlySales>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data = sqlx::query_as::<_, MonthlySales>(
            r#"
            SELECT
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM') AS month,
                SUM(total) AS total,
                COUNT(*)   AS count
            FROM sales
            WHERE created_at >= $1
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(since)
        .fetch_all(executor)
        .await?;

        Ok(data)
    }

    // 4. Totais de um status, opcionalmente dentro de [start, end)
    pub async fn get_status_totals<'e, E>(
        &self,
        executor: E,
        status: SaleStatus,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<StatusTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (start, end) = match range {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };

        let totals = sqlx::query_as::<_, StatusTotals>(
            r#"
            SELECT COUNT(*) AS count, COALESCE(SUM(total), 0) AS total
            FROM sales
            WHERE status = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            "#,
        )
        .bind(status)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await?;

        Ok(totals)
    }
}

// src/services/sales_service.rs

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, EntityKind},
    db::{ClientRepository, ProductRepository, SalesRepository},
    models::{
        products::Product,
        sales::{
            CreateSalePayload, SaleDetail, SaleItemDetail, SaleLinePayload, SaleStatus,
            SaleWithClient, SaleWithClientRow,
        },
    },
};

// ---
// Planejamento (puro, sem banco)
// ---

/// Uma linha da venda já precificada, na posição em que foi enviada.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Baixa de estoque de um produto, somando todas as linhas dele.
#[derive(Debug, Clone, PartialEq)]
pub struct StockMove {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub available: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalePlan {
    pub lines: Vec<PlannedLine>,
    /// Ordenadas por id do produto, mesma ordem dos locks.
    pub stock_moves: Vec<StockMove>,
    pub total: Decimal,
}

/// Maior valor que cabe em `sales.total` e `sale_items.subtotal` (NUMERIC(14,2)).
pub fn max_sale_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Valida as linhas contra os produtos carregados e calcula subtotais e total.
///
/// Linhas repetidas do mesmo produto somam a quantidade antes da checagem de
/// estoque. O preço unitário é o preço atual do produto.
pub fn plan_sale(lines: &[SaleLinePayload], products: &[Product]) -> Result<SalePlan, AppError> {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut requested: BTreeMap<Uuid, i64> = BTreeMap::new();
    for line in lines {
        if !by_id.contains_key(&line.product_id) {
            return Err(AppError::NotFound(EntityKind::Product));
        }
        *requested.entry(line.product_id).or_default() += i64::from(line.quantity);
    }

    let mut stock_moves = Vec::with_capacity(requested.len());
    for (product_id, quantity) in &requested {
        let product = by_id[product_id];
        let insufficient = || AppError::InsufficientStock {
            product: product.name.clone(),
            requested: *quantity,
            available: i64::from(product.stock),
        };

        if *quantity > i64::from(product.stock) {
            return Err(insufficient());
        }

        stock_moves.push(StockMove {
            product_id: *product_id,
            product_name: product.name.clone(),
            quantity: i32::try_from(*quantity).map_err(|_| insufficient())?,
            available: product.stock,
        });
    }

    let too_large = || AppError::InvalidInput("valor da venda excede o máximo permitido".to_string());

    let mut total = Decimal::ZERO;
    let mut planned = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let product = by_id[&line.product_id];
        let subtotal = product
            .price
            .checked_mul(Decimal::from(line.quantity))
            .filter(|v| *v <= max_sale_amount())
            .ok_or_else(too_large)?;
        total = total
            .checked_add(subtotal)
            .filter(|v| *v <= max_sale_amount())
            .ok_or_else(too_large)?;

        planned.push(PlannedLine {
            product_id: line.product_id,
            position: index as i32,
            quantity: line.quantity,
            unit_price: product.price,
            subtotal,
        });
    }

    Ok(SalePlan {
        lines: planned,
        stock_moves,
        total,
    })
}

// ---
// Service
// ---

#[derive(Clone)]
pub struct SalesService {
    sales_repo: SalesRepository,
    client_repo: ClientRepository,
    product_repo: ProductRepository,
    pool: PgPool,
}

impl SalesService {
    pub fn new(
        sales_repo: SalesRepository,
        client_repo: ClientRepository,
        product_repo: ProductRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            sales_repo,
            client_repo,
            product_repo,
            pool,
        }
    }

    pub async fn create_sale(&self, payload: &CreateSalePayload) -> Result<SaleDetail, AppError> {
        // Qualquer `?` abaixo derruba a transação sem commit (rollback no drop)
        let mut tx = self.pool.begin().await?;

        let client = self
            .client_repo
            .find_summary(&mut *tx, payload.client_id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Client))?;

        let mut product_ids: Vec<Uuid> = payload.items.iter().map(|l| l.product_id).collect();
        product_ids.sort();
        product_ids.dedup();

        let products = self
            .product_repo
            .lock_for_sale(&mut *tx, &product_ids)
            .await?;

        let plan = plan_sale(&payload.items, &products).inspect_err(|e| {
            tracing::warn!("Venda recusada para o cliente {}: {}", client.id, e);
        })?;

        let sale = self
            .sales_repo
            .insert_sale(&mut *tx, client.id, plan.total)
            .await?;

        for line in &plan.lines {
            self.sales_repo
                .insert_item(
                    &mut *tx,
                    sale.id,
                    line.product_id,
                    line.position,
                    line.quantity,
                    line.unit_price,
                    line.subtotal,
                )
                .await?;
        }

        for stock_move in &plan.stock_moves {
            let debited = self
                .product_repo
                .decrement_stock(&mut *tx, stock_move.product_id, stock_move.quantity)
                .await?;

            if !debited {
                return Err(AppError::InsufficientStock {
                    product: stock_move.product_name.clone(),
                    requested: i64::from(stock_move.quantity),
                    available: i64::from(stock_move.available),
                });
            }
        }

        let items = self
            .sales_repo
            .list_items(&mut *tx, sale.id)
            .await?
            .into_iter()
            .map(SaleItemDetail::from)
            .collect();

        tx.commit().await?;

        tracing::info!(
            "Venda {} registrada: cliente {}, total {}",
            sale.id,
            client.id,
            sale.total
        );

        Ok(SaleDetail {
            sale,
            client,
            items,
        })
    }

    pub async fn list_sales(&self) -> Result<Vec<SaleDetail>, AppError> {
        let rows = self.sales_repo.list_with_client().await?;
        let sale_ids: Vec<Uuid> = rows.iter().map(|r| r.sale.id).collect();

        let mut items_by_sale: HashMap<Uuid, Vec<SaleItemDetail>> = HashMap::new();
        for row in self
            .sales_repo
            .list_items_for_sales(&self.pool, &sale_ids)
            .await?
        {
            items_by_sale
                .entry(row.item.sale_id)
                .or_default()
                .push(SaleItemDetail::from(row));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.sale.id).unwrap_or_default();
                into_detail(row, items)
            })
            .collect())
    }

    pub async fn get_sale(&self, id: Uuid) -> Result<SaleDetail, AppError> {
        let row = self
            .sales_repo
            .find_with_client(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Sale))?;

        let items = self
            .sales_repo
            .list_items(&self.pool, id)
            .await?
            .into_iter()
            .map(SaleItemDetail::from)
            .collect();

        Ok(into_detail(row, items))
    }

    /// Alterna o status. Não mexe no estoque.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<SaleDetail, AppError> {
        let status: SaleStatus = status.parse()?;

        self.sales_repo
            .update_status(&self.pool, id, status)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Sale))?;

        self.get_sale(id).await
    }

    /// Exclui a venda devolvendo ao estoque as quantidades dos itens.
    pub async fn delete_sale(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.sales_repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound(EntityKind::Sale))?;

        let restored = self
            .product_repo
            .restore_stock_for_sale(&mut *tx, id)
            .await?;
        self.sales_repo.delete_items(&mut *tx, id).await?;
        self.sales_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!("Venda {} excluída, estoque devolvido a {} produto(s)", id, restored);
        Ok(())
    }

    /// Exclui todas as vendas, devolvendo o estoque. Retorna quantas foram removidas.
    ///
    /// O lote é fixado pelos ids travados no início: estorno e exclusões
    /// atingem exatamente as mesmas vendas.
    pub async fn delete_all_sales(&self) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale_ids = self.sales_repo.lock_all_ids(&mut *tx).await?;
        if sale_ids.is_empty() {
            return Ok(0);
        }

        self.product_repo
            .restore_stock_for_sales(&mut *tx, &sale_ids)
            .await?;
        self.sales_repo
            .delete_items_for_sales(&mut *tx, &sale_ids)
            .await?;
        let deleted = self.sales_repo.delete_many(&mut *tx, &sale_ids).await?;

        tx.commit().await?;

        tracing::info!("{} venda(s) excluída(s) em lote", deleted);
        Ok(deleted)
    }
}

fn into_detail(row: SaleWithClientRow, items: Vec<SaleItemDetail>) -> SaleDetail {
    let SaleWithClient { sale, client } = SaleWithClient::from(row);
    SaleDetail {
        sale,
        client,
        items,
    }
}

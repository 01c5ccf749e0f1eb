// Regras transacionais contra um Postgres real.
// Rodar com: DATABASE_URL=postgres://... cargo test -- --ignored

use std::{str::FromStr, time::Duration};

use gestao_api::{
    common::error::{AppError, Dependents, EntityKind},
    config::{AppState, Config},
    models::{
        clients::{Client, ClientPayload},
        products::{Product, ProductPayload},
        sales::{CreateSalePayload, SaleLinePayload, SaleStatus},
        suppliers::{Supplier, SupplierPayload},
    },
};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn state(pool: PgPool) -> AppState {
    let config = Config {
        database_url: String::new(),
        database_max_connections: 1,
        jwt_secret: "segredo".into(),
        jwt_expiration_hours: 1,
        host: "127.0.0.1".into(),
        port: 0,
    };
    AppState::from_pool(pool, &config)
}

fn client_payload(name: &str, tax_id: &str) -> ClientPayload {
    ClientPayload {
        name: name.into(),
        email: None,
        phone: None,
        address: None,
        tax_id: tax_id.into(),
    }
}

fn supplier_payload(name: &str, tax_id: &str) -> SupplierPayload {
    SupplierPayload {
        name: name.into(),
        email: None,
        phone: None,
        address: None,
        tax_id: tax_id.into(),
    }
}

async fn supplier(state: &AppState, tax_id: &str) -> Supplier {
    state
        .supplier_service
        .create_supplier(&supplier_payload("Distribuidora", tax_id))
        .await
        .unwrap()
}

async fn client(state: &AppState, tax_id: &str) -> Client {
    state
        .client_service
        .create_client(&client_payload("Maria", tax_id))
        .await
        .unwrap()
}

async fn product(state: &AppState, supplier_id: Uuid, name: &str, price: &str, stock: i32) -> Product {
    state
        .product_service
        .create_product(&ProductPayload {
            name: name.into(),
            description: None,
            price: dec(price),
            category: None,
            stock,
            supplier_id,
        })
        .await
        .unwrap()
}

async fn stock_of(pool: &PgPool, id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

// Espera até alguma transação do banco de teste ficar bloqueada em lock
async fn wait_for_lock_waiter(pool: &PgPool) {
    for _ in 0..250 {
        let waiting: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pg_stat_activity \
             WHERE datname = current_database() AND wait_event_type = 'Lock'",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        if waiting > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("nenhuma transação ficou aguardando lock");
}

fn sale(client_id: Uuid, lines: &[(Uuid, i32)]) -> CreateSalePayload {
    CreateSalePayload {
        client_id,
        items: lines
            .iter()
            .map(|(product_id, quantity)| SaleLinePayload {
                product_id: *product_id,
                quantity: *quantity,
            })
            .collect(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn sale_prices_lines_and_decrements_stock(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;
    let b = product(&state, s.id, "Lápis", "2.50", 3).await;

    let detail = state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 2), (b.id, 1)]))
        .await
        .unwrap();

    assert_eq!(detail.sale.total, dec("22.50"));
    assert_eq!(detail.sale.status, SaleStatus::ToPay);
    assert_eq!(detail.client.id, c.id);
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].item.product_id, a.id);
    assert_eq!(detail.items[0].item.unit_price, dec("10.00"));
    assert_eq!(detail.items[0].item.subtotal, dec("20.00"));
    assert_eq!(detail.items[1].product.name, "Lápis");

    assert_eq!(stock_of(&pool, a.id).await, 3);
    assert_eq!(stock_of(&pool, b.id).await, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn oversized_sale_changes_nothing(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;
    let b = product(&state, s.id, "Lápis", "2.50", 1).await;

    let err = state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 2), (b.id, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { ref product, .. } if product == "Lápis"));
    assert_eq!(stock_of(&pool, a.id).await, 5);
    assert_eq!(stock_of(&pool, b.id).await, 1);
    assert_eq!(count(&pool, "sales").await, 0);
    assert_eq!(count(&pool, "sale_items").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn sale_for_missing_client_or_product_is_not_found(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;

    let err = state
        .sales_service
        .create_sale(&sale(Uuid::new_v4(), &[(a.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(EntityKind::Client)));

    let err = state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 1), (Uuid::new_v4(), 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(EntityKind::Product)));
    assert_eq!(stock_of(&pool, a.id).await, 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn deleting_a_sale_restores_stock(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;

    // Mesmo produto em duas linhas
    let detail = state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 2), (a.id, 1)]))
        .await
        .unwrap();
    assert_eq!(stock_of(&pool, a.id).await, 2);

    state.sales_service.delete_sale(detail.sale.id).await.unwrap();

    assert_eq!(stock_of(&pool, a.id).await, 5);
    assert_eq!(count(&pool, "sales").await, 0);
    assert_eq!(count(&pool, "sale_items").await, 0);

    let err = state
        .sales_service
        .delete_sale(detail.sale.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(EntityKind::Sale)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn bulk_delete_restores_every_product(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;
    let b = product(&state, s.id, "Lápis", "2.50", 3).await;

    for lines in [vec![(a.id, 1), (b.id, 1)], vec![(a.id, 3)], vec![(b.id, 2)]] {
        state.sales_service.create_sale(&sale(c.id, &lines)).await.unwrap();
    }
    assert_eq!(stock_of(&pool, a.id).await, 1);
    assert_eq!(stock_of(&pool, b.id).await, 0);

    let deleted = state.sales_service.delete_all_sales().await.unwrap();

    assert_eq!(deleted, 3);
    assert_eq!(stock_of(&pool, a.id).await, 5);
    assert_eq!(stock_of(&pool, b.id).await, 3);
    assert_eq!(count(&pool, "sale_items").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn bulk_delete_leaves_sales_committed_meanwhile_intact(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 10).await;
    let b = product(&state, s.id, "Lápis", "2.50", 10).await;
    state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 3)]))
        .await
        .unwrap();

    // Segura o produto A: o lote trava as vendas e para no estorno
    let mut holder = pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
        .bind(a.id)
        .execute(&mut *holder)
        .await
        .unwrap();

    let service = state.sales_service.clone();
    let bulk = tokio::spawn(async move { service.delete_all_sales().await });
    wait_for_lock_waiter(&pool).await;

    // Venda confirmada enquanto o lote está parado
    let late = state
        .sales_service
        .create_sale(&sale(c.id, &[(b.id, 4)]))
        .await
        .unwrap();

    holder.rollback().await.unwrap();
    let deleted = bulk.await.unwrap().unwrap();

    assert_eq!(deleted, 1);
    assert_eq!(stock_of(&pool, a.id).await, 10);
    // A venda nova continua registrada e responde pela baixa de B
    assert_eq!(stock_of(&pool, b.id).await, 6);
    assert_eq!(count(&pool, "sales").await, 1);
    assert_eq!(count(&pool, "sale_items").await, 1);
    let kept = state.sales_service.get_sale(late.sale.id).await.unwrap();
    assert_eq!(kept.items[0].item.quantity, 4);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn bulk_delete_without_sales_is_a_no_op(pool: PgPool) {
    let state = state(pool.clone());
    assert_eq!(state.sales_service.delete_all_sales().await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn concurrent_sales_cannot_oversell(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 10).await;
    let payload = sale(c.id, &[(a.id, 6)]);

    let (first, second) = tokio::join!(
        state.sales_service.create_sale(&payload),
        state.sales_service.create_sale(&payload),
    );
    let outcomes = [first, second];

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AppError::InsufficientStock { requested: 6, available: 4, .. }))));
    assert_eq!(stock_of(&pool, a.id).await, 4);
    assert_eq!(count(&pool, "sales").await, 1);
    assert_eq!(count(&pool, "sale_items").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn product_writes_check_supplier_and_price_range(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;

    let ghost = ProductPayload {
        name: "Caderno".into(),
        description: None,
        price: dec("10.00"),
        category: None,
        stock: 5,
        supplier_id: Uuid::new_v4(),
    };
    let err = state.product_service.create_product(&ghost).await.unwrap_err();
    assert!(matches!(err, AppError::UnknownReference(EntityKind::Supplier)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let err = state
        .product_service
        .update_product(a.id, &ghost)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnknownReference(EntityKind::Supplier)));

    // Sem passar pela validação do handler, o estouro da coluna ainda vira 400
    let huge = ProductPayload {
        price: dec("100000000000"),
        supplier_id: s.id,
        ..ghost
    };
    let err = state.product_service.create_product(&huge).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "{err:?}");
    assert_eq!(count(&pool, "products").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn referenced_records_cannot_be_deleted(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 5).await;
    state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 1)]))
        .await
        .unwrap();

    let err = state.client_service.delete_client(c.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::HasDependents { entity: EntityKind::Client, dependents: Dependents::Sales }
    ));

    let err = state.supplier_service.delete_supplier(s.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::HasDependents { entity: EntityKind::Supplier, dependents: Dependents::Products }
    ));

    let err = state.product_service.delete_product(a.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::HasDependents { entity: EntityKind::Product, dependents: Dependents::SaleItems }
    ));

    assert_eq!(count(&pool, "clients").await, 1);
    assert_eq!(count(&pool, "suppliers").await, 1);
    assert_eq!(count(&pool, "products").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn duplicated_tax_id_is_rejected(pool: PgPool) {
    let state = state(pool.clone());
    let first = client(&state, "111").await;
    let second = client(&state, "222").await;

    let err = state
        .client_service
        .create_client(&client_payload("Outra", "111"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateTaxId(EntityKind::Client)));

    let err = state
        .client_service
        .update_client(second.id, &client_payload("Outra", "111"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateTaxId(EntityKind::Client)));

    // Manter o próprio documento é permitido
    let updated = state
        .client_service
        .update_client(first.id, &client_payload("Maria Atualizada", "111"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Maria Atualizada");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn duplicated_supplier_tax_id_is_rejected(pool: PgPool) {
    let state = state(pool.clone());
    let first = supplier(&state, "00.000.000/0001-00").await;
    let second = supplier(&state, "11.111.111/0001-11").await;

    let err = state
        .supplier_service
        .create_supplier(&supplier_payload("Atacadista", "00.000.000/0001-00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateTaxId(EntityKind::Supplier)));

    let err = state
        .supplier_service
        .update_supplier(second.id, &supplier_payload("Atacadista", "00.000.000/0001-00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateTaxId(EntityKind::Supplier)));

    let updated = state
        .supplier_service
        .update_supplier(first.id, &supplier_payload("Distribuidora Central", "00.000.000/0001-00"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Distribuidora Central");
    assert_eq!(count(&pool, "suppliers").await, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer Postgres (DATABASE_URL)"]
async fn dashboard_totals_match_status_sums(pool: PgPool) {
    let state = state(pool.clone());
    let s = supplier(&state, "00.000.000/0001-00").await;
    let c = client(&state, "111").await;
    let a = product(&state, s.id, "Caderno", "10.00", 20).await;
    let low = product(&state, s.id, "Clips", "0.10", 3).await;

    let paid = state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 3)]))
        .await
        .unwrap();
    state
        .sales_service
        .create_sale(&sale(c.id, &[(a.id, 1)]))
        .await
        .unwrap();

    let updated = state
        .sales_service
        .update_status(paid.sale.id, "PAGO")
        .await
        .unwrap();
    assert_eq!(updated.sale.status, SaleStatus::Paid);
    // Status não mexe no estoque
    assert_eq!(stock_of(&pool, a.id).await, 16);

    let data = state.dashboard_service.get_dashboard().await.unwrap();

    assert_eq!(data.summary.total_paid, dec("30.00"));
    assert_eq!(data.summary.total_to_pay, dec("10.00"));
    assert_eq!(data.summary.total_sales, 2);
    assert_eq!(data.summary.total_clients, 1);
    assert_eq!(data.summary.total_products, 2);
    assert_eq!(data.sales_paid.len(), 1);
    assert_eq!(data.sales_to_pay.len(), 1);
    assert_eq!(data.low_stock_products.len(), 1);
    assert_eq!(data.low_stock_products[0].product.id, low.id);
    assert_eq!(data.monthly_sales.len(), 1);
    assert_eq!(data.monthly_sales[0].count, 2);
    assert_eq!(data.monthly_sales[0].total, dec("40.00"));

    let err = state
        .sales_service
        .update_status(paid.sale.id, "CANCELADO")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidSaleStatus(_)));
}

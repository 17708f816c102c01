use anyhow::{anyhow, Result};
use log::info;

use venc_domain::{datetime, NewDueItem};

use crate::{due_items::insert_row, Connection};

/// Example obligations: (year, month, description, debt, responsible).
/// Each one falls due on the last day of its month.
const EXAMPLES: [(i32, u32, &str, f64, &str); 12] = [
    (2025, 2, "Pago servicios Q1 2025", 1500.0, "silvia"),
    (2025, 2, "Cuota mantenimiento Q1 2025", 2000.0, "carlos"),
    (2025, 2, "Seguro anual 2025", 3500.0, "marcelo"),
    (2025, 2, "Impuestos municipales Q1", 1200.0, "silvia"),
    (2025, 3, "Servicios marzo 2025", 1600.0, "carlos"),
    (2025, 3, "Mantenimiento edificio", 2200.0, "marcelo"),
    (2025, 3, "Cuota leasing 2025", 3000.0, "silvia"),
    (2025, 3, "Servicios limpieza", 1800.0, "carlos"),
    (2025, 4, "Servicios Q2 2025", 1700.0, "marcelo"),
    (2025, 4, "Cuota mantenimiento Q2 2025", 2100.0, "silvia"),
    (2025, 4, "Impuestos municipales Q2", 1300.0, "carlos"),
    (2025, 4, "Seguro trimestral", 2500.0, "marcelo"),
];

/// The example items, all unpaid.
pub fn examples() -> Result<Vec<NewDueItem>> {
    EXAMPLES
        .iter()
        .map(|&(year, month, description, debt_amount, responsible)| -> Result<NewDueItem> {
            let due_date = datetime::end_of_month(year, month)
                .ok_or_else(|| anyhow!("invalid month {}-{}", year, month))?;
            Ok(NewDueItem {
                due_date,
                description: description.to_string(),
                debt_amount,
                responsible: Some(responsible.to_string()),
                ..Default::default()
            })
        })
        .collect()
}

/// Insert the example items if there are no items at all.
/// Returns the number of inserted items.
pub async fn seed_examples(db: &Connection) -> Result<usize> {
    seed_items(db, examples()?).await
}

/// Insert all items in one transaction, but only into an
/// empty table. Either all items are stored or none.
async fn seed_items(db: &Connection, items: Vec<NewDueItem>) -> Result<usize> {
    let mut tx = db.pool().begin().await?;

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM due_items LIMIT 1")
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        info!("due items exist, not seeding");
        return Ok(0);
    }

    info!("no due items, creating examples");
    for item in &items {
        insert_row(&mut *tx, item).await?;
    }
    tx.commit().await?;
    info!("created {} example due items", items.len());

    Ok(items.len())
}

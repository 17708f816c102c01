use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use sqlx::{Executor, QueryBuilder, Sqlite};

use venc_domain::{
    datetime,
    DueItem,
    DueItemChange,
    DueItemFilter,
    Insert,
    NewDueItem,
    Query,
    Retrieve,
    Update,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<DueItem> for Connection {
    type Filter = DueItemFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<DueItem>> {
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                due_date,
                description,
                debt_amount,
                payment_date,
                paid_amount,
                responsible
            FROM due_items
            WHERE 1
            "#,
        );

        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(from) = filter.due_from {
            qry.push(" AND due_date >= ").push_bind(from);
        }
        if let Some(to) = filter.due_to {
            qry.push(" AND due_date <= ").push_bind(to);
        }
        match filter.paid {
            Some(true) => {
                qry.push(" AND paid_amount > 0");
            }
            Some(false) => {
                qry.push(" AND COALESCE(paid_amount, 0) = 0");
            }
            None => {}
        }
        if let Some(responsible) = filter.responsible() {
            qry.push(" AND responsible = ").push_bind(responsible.to_string());
        }
        qry.push(" ORDER BY id");

        let items: Vec<DueItem> = qry.build_query_as().fetch_all(self.pool()).await?;
        Ok(items)
    }
}

#[async_trait]
impl Retrieve<DueItem> for Connection {
    type Key = u32;
    async fn retrieve(&self, id: Self::Key) -> Result<DueItem> {
        let filter = DueItemFilter {
            id: Some(id),
            ..Default::default()
        };
        let mut items: Vec<DueItem> = self.query(&filter).await?;
        if items.len() > 1 {
            return Err(QueryError::Ambiguous(items.len()).into());
        }
        let item = items.pop().ok_or(QueryError::NotFound)?;
        Ok(item)
    }
}

/// Insert a row and return its generated id.
///
/// The `RETURNING` rows must be read to the end: a statement left
/// unfinished keeps its write uncommitted for other pool connections.
pub(crate) async fn insert_row<'c, E>(executor: E, item: &NewDueItem) -> Result<u32>
where
    E: Executor<'c, Database = Sqlite>,
{
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"INSERT INTO due_items (
            due_date,
            description,
            debt_amount,
            payment_date,
            paid_amount,
            responsible
        ) VALUES (
        "#,
    );
    qry.separated(", ")
        .push_bind(item.due_date)
        .push_bind(item.description.clone())
        .push_bind(item.debt_amount)
        .push_bind(item.payment_date)
        .push_bind(item.paid_amount)
        .push_bind(item.responsible.clone());

    let mut inserted: Vec<Id<u32>> = qry.push(") RETURNING id ")
        .build_query_as()
        .fetch_all(executor)
        .await?;
    let insert = inserted.pop().ok_or(QueryError::NotFound)?;
    debug!("inserted due item {}", insert.id);
    Ok(insert.id)
}

#[async_trait]
impl Insert<DueItem> for Connection {
    type New = NewDueItem;
    async fn insert(&self, item: NewDueItem) -> Result<DueItem> {
        let id = insert_row(self.pool(), &item).await?;
        self.retrieve(id).await
    }
}

#[async_trait]
impl Update<DueItem> for Connection {
    type Key = u32;
    type Change = DueItemChange;

    /// Apply a change and return the updated item.
    /// Fails with `QueryError::NotFound` if there is no such item.
    async fn update(&self, id: Self::Key, change: Self::Change) -> Result<DueItem> {
        let mut qry = QueryBuilder::<Sqlite>::new("UPDATE due_items SET");
        match change {
            DueItemChange::DueDate(due_date) => {
                qry.push(" due_date = ").push_bind(due_date);
            }
            DueItemChange::Responsible(responsible) => {
                qry.push(" responsible = ").push_bind(responsible);
            }
            DueItemChange::Payment(Some(amount)) => {
                qry.push(" paid_amount = ")
                    .push_bind(amount)
                    .push(", payment_date = ")
                    .push_bind(datetime::today());
            }
            // Nothing to record
            DueItemChange::Payment(None) => return self.retrieve(id).await,
        }
        qry.push(" WHERE id = ").push_bind(id);

        let result = qry.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(QueryError::NotFound.into());
        }
        debug!("updated due item {}", id);

        self.retrieve(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn is_not_found(err: &anyhow::Error) -> bool {
        err.downcast_ref::<QueryError>() == Some(&QueryError::NotFound)
    }

    async fn insert_fixtures(db: &Connection) -> Vec<DueItem> {
        let fixtures = vec![
            (date(2025, 2, 28), 1500.0, Some(0.0), "silvia"),
            (date(2025, 3, 1), 2000.0, None, "carlos"),
            (date(2025, 3, 15), 3500.0, Some(3500.0), "carlos"),
            (date(2025, 3, 31), 1200.0, Some(200.0), "marcelo"),
            (date(2025, 4, 1), 1600.0, None, "silvia"),
        ];
        let mut items = vec![];
        for (due_date, debt_amount, paid_amount, responsible) in fixtures {
            let item = db.insert(NewDueItem {
                due_date,
                description: format!("Vencimiento {}", due_date),
                debt_amount,
                paid_amount,
                responsible: Some(responsible.to_string()),
                ..Default::default()
            }).await.unwrap();
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_due_item_insert() {
        let (_handle, db) = Connection::open_test().await;
        let new = NewDueItem {
            due_date: date(2025, 3, 15),
            description: "Servicios marzo 2025".to_string(),
            debt_amount: 1600.0,
            responsible: Some("carlos".to_string()),
            ..Default::default()
        };
        let item = db.insert(new.clone()).await.unwrap();

        assert!(item.id > 0);
        assert_eq!(item, new.with_id(item.id));
        assert!(!item.is_paid());

        let fetched: DueItem = db.retrieve(item.id).await.unwrap();
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn test_due_item_insert_visible_to_pool() {
        let (_handle, db) = Connection::open_test().await;
        for n in 1..=10 {
            let item: DueItem = db.insert(NewDueItem {
                due_date: date(2025, 3, n),
                description: format!("Cuota {}", n),
                debt_amount: 10.0 * n as f64,
                ..Default::default()
            }).await.unwrap();

            // Read back right away, possibly on another pooled connection
            let fetched: DueItem = db.retrieve(item.id).await.unwrap();
            assert_eq!(fetched, item);
            let all: Vec<DueItem> = db.query(&DueItemFilter::default()).await.unwrap();
            assert_eq!(all.len(), n as usize);
        }
    }

    #[tokio::test]
    async fn test_due_item_amounts_keep_precision() {
        let (_handle, db) = Connection::open_test().await;
        let new = NewDueItem {
            due_date: date(2025, 3, 15),
            description: "Intereses".to_string(),
            debt_amount: 0.123456789012345,
            paid_amount: Some(1e-12),
            ..Default::default()
        };
        let item: DueItem = db.insert(new.clone()).await.unwrap();
        assert_eq!(item, new.with_id(item.id));
        assert!(item.is_paid());

        let paid: Vec<DueItem> = db.query(&DueItemFilter {
            paid: Some(true),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(paid, vec![item.clone()]);
        assert!(paid.iter().all(|i| i.is_paid()));

        let unpaid: Vec<DueItem> = db.query(&DueItemFilter {
            paid: Some(false),
            ..Default::default()
        }).await.unwrap();
        assert!(unpaid.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_due_item_concurrent_access() {
        let (_handle, db) = Connection::open_test().await;

        let mut tasks = vec![];
        for n in 0..16u32 {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                let item: DueItem = db.insert(NewDueItem {
                    due_date: date(2025, 3, 1 + n),
                    description: format!("Concurrente {}", n),
                    debt_amount: 100.0 + n as f64,
                    responsible: Some("carlos".to_string()),
                    ..Default::default()
                }).await?;
                let item: DueItem = db
                    .update(item.id, DueItemChange::Payment(Some(n as f64 + 1.0)))
                    .await?;
                let _: Vec<DueItem> = db.query(&DueItemFilter {
                    responsible: Some("carlos".to_string()),
                    ..Default::default()
                }).await?;
                Ok::<DueItem, anyhow::Error>(item)
            }));
        }

        let mut items = vec![];
        for task in tasks {
            items.push(task.await.unwrap().unwrap());
        }

        let mut ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);

        for item in items {
            let fetched: DueItem = db.retrieve(item.id).await.unwrap();
            assert_eq!(fetched, item);
            assert!(fetched.is_paid());
        }
        let all: Vec<DueItem> = db.query(&DueItemFilter::default()).await.unwrap();
        assert_eq!(all.len(), 16);
    }

    #[tokio::test]
    async fn test_due_item_ids_are_not_reused() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;
        let mut ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), items.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_due_item_retrieve_not_found() {
        let (_handle, db) = Connection::open_test().await;
        let result: Result<DueItem> = db.retrieve(4242).await;
        assert!(is_not_found(&result.unwrap_err()));
    }

    #[tokio::test]
    async fn test_due_item_query_without_filter() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;
        let all: Vec<DueItem> = db.query(&DueItemFilter::default()).await.unwrap();
        assert_eq!(all, items);
    }

    #[tokio::test]
    async fn test_due_item_query_empty_result() {
        let (_handle, db) = Connection::open_test().await;
        insert_fixtures(&db).await;
        let filter = DueItemFilter {
            responsible: Some("nobody".to_string()),
            ..Default::default()
        };
        let items: Vec<DueItem> = db.query(&filter).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_due_item_query_filters_sound_and_complete() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;

        let froms = [None, Some(date(2025, 3, 1))];
        let tos = [None, Some(date(2025, 3, 31))];
        let paids = [None, Some(true), Some(false)];
        let responsibles = [None, Some(""), Some("carlos"), Some("silvia")];

        for from in froms {
            for to in tos {
                for paid in paids {
                    for responsible in responsibles {
                        let filter = DueItemFilter {
                            due_from: from,
                            due_to: to,
                            paid,
                            responsible: responsible.map(str::to_string),
                            ..Default::default()
                        };
                        let expected: Vec<DueItem> = items.iter()
                            .filter(|i| filter.matches(i))
                            .cloned()
                            .collect();
                        let found: Vec<DueItem> = db.query(&filter).await.unwrap();
                        assert_eq!(found, expected, "filter: {:?}", filter);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_due_item_query_paid() {
        let (_handle, db) = Connection::open_test().await;
        insert_fixtures(&db).await;

        let paid: Vec<DueItem> = db.query(&DueItemFilter {
            paid: Some(true),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(paid.len(), 2);
        assert!(paid.iter().all(|i| i.is_paid()));

        // Zero and missing amounts both count as unpaid
        let unpaid: Vec<DueItem> = db.query(&DueItemFilter {
            paid: Some(false),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(unpaid.len(), 3);
        assert!(unpaid.iter().all(|i| !i.is_paid()));
    }

    #[tokio::test]
    async fn test_due_item_set_due_date() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;

        let item = db.update(items[1].id, DueItemChange::DueDate(date(2025, 5, 10)))
            .await
            .unwrap();
        assert_eq!(item.due_date, date(2025, 5, 10));
        assert_eq!(item.description, items[1].description);
        assert_eq!(item.responsible, items[1].responsible);
    }

    #[tokio::test]
    async fn test_due_item_set_responsible() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;

        let item = db.update(items[0].id, DueItemChange::Responsible("marcelo".to_string()))
            .await
            .unwrap();
        assert_eq!(item.responsible.as_deref(), Some("marcelo"));

        // Empty names are stored as given
        let item = db.update(items[0].id, DueItemChange::Responsible("".to_string()))
            .await
            .unwrap();
        assert_eq!(item.responsible.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_due_item_update_not_found() {
        let (_handle, db) = Connection::open_test().await;
        insert_fixtures(&db).await;

        let changes = vec![
            DueItemChange::DueDate(date(2025, 5, 10)),
            DueItemChange::Responsible("carlos".to_string()),
            DueItemChange::Payment(Some(10.0)),
            DueItemChange::Payment(None),
        ];
        for change in changes {
            let result: Result<DueItem> = db.update(4242, change).await;
            assert!(is_not_found(&result.unwrap_err()));
        }

        // No rows were created
        let all: Vec<DueItem> = db.query(&DueItemFilter::default()).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_due_item_record_payment() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;
        let id = items[1].id;

        let item = db.update(id, DueItemChange::Payment(Some(2000.0))).await.unwrap();
        assert_eq!(item.paid_amount, Some(2000.0));
        assert_eq!(item.payment_date, Some(datetime::today()));
        assert!(item.is_paid());

        let paid: Vec<DueItem> = db.query(&DueItemFilter {
            paid: Some(true),
            ..Default::default()
        }).await.unwrap();
        assert!(paid.iter().any(|i| i.id == id));

        let unpaid: Vec<DueItem> = db.query(&DueItemFilter {
            paid: Some(false),
            ..Default::default()
        }).await.unwrap();
        assert!(unpaid.iter().all(|i| i.id != id));
    }

    // Earlier revisions marked the item as paid even without an
    // amount. Now a payment without an amount changes nothing.
    #[tokio::test]
    async fn test_due_item_record_payment_without_amount() {
        let (_handle, db) = Connection::open_test().await;
        let items = insert_fixtures(&db).await;

        let item = db.update(items[1].id, DueItemChange::Payment(None)).await.unwrap();
        assert_eq!(item, items[1]);
        assert_eq!(item.paid_amount, None);
        assert_eq!(item.payment_date, None);

        let item = db.update(items[2].id, DueItemChange::Payment(None)).await.unwrap();
        assert_eq!(item, items[2]);
    }

    #[tokio::test]
    async fn test_due_item_scenario() {
        let (_handle, db) = Connection::open_test().await;
        let a = db.insert(NewDueItem {
            due_date: date(2025, 3, 15),
            description: "Cuota mantenimiento".to_string(),
            debt_amount: 100.0,
            responsible: Some("carlos".to_string()),
            ..Default::default()
        }).await.unwrap();

        let found: Vec<DueItem> = db.query(&DueItemFilter {
            due_from: Some(date(2025, 3, 1)),
            due_to: Some(date(2025, 3, 31)),
            responsible: Some("carlos".to_string()),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(found, vec![a.clone()]);

        let found: Vec<DueItem> = db.query(&DueItemFilter {
            responsible: Some("silvia".to_string()),
            ..Default::default()
        }).await.unwrap();
        assert!(found.is_empty());

        db.update(a.id, DueItemChange::Payment(Some(100.0))).await.unwrap();
        let a: DueItem = db.retrieve(a.id).await.unwrap();
        assert_eq!(a.paid_amount, Some(100.0));
        assert!(a.payment_date.is_some());
    }
}

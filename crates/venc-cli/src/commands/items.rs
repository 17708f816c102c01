use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use venc_db::Connection;
use venc_domain::{
    DueItem,
    DueItemChange,
    DueItemFilter,
    Insert,
    NewDueItem,
    Query,
    Retrieve,
    Update,
};

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Items {
    /// Show a due item
    #[clap(name="show")]
    Show(ShowItem),
    /// List due items
    #[clap(name="list")]
    List(ListItems),
    /// Add a due item
    #[clap(name="add")]
    Add(AddItem),
    /// Move the due date of an item
    #[clap(name="reschedule")]
    Reschedule(RescheduleItem),
    /// Assign an item to someone
    #[clap(name="assign")]
    Assign(AssignItem),
    /// Record a payment
    #[clap(name="pay")]
    Pay(PayItem),
}

impl Items {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Items::Show(cmd) => cmd.run(db).await,
            Items::List(cmd) => cmd.run(db).await,
            Items::Add(cmd) => cmd.run(db).await,
            Items::Reschedule(cmd) => cmd.run(db).await,
            Items::Assign(cmd) => cmd.run(db).await,
            Items::Pay(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowItem {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowItem {
    /// Run the command and show an item
    pub async fn run(self, db: &Connection) -> Result<()> {
        let item: DueItem = db.retrieve(self.id).await?;
        println!();
        item.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListItems {
    #[clap(short, long)]
    pub from: Option<NaiveDate>,
    #[clap(short, long)]
    pub to: Option<NaiveDate>,
    /// Only paid items
    #[clap(long, conflicts_with = "unpaid")]
    pub paid: bool,
    /// Only unpaid items
    #[clap(long)]
    pub unpaid: bool,
    #[clap(short, long)]
    pub responsible: Option<String>,
}

impl ListItems {
    pub fn filter(&self) -> DueItemFilter {
        let paid = match (self.paid, self.unpaid) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        DueItemFilter {
            due_from: self.from,
            due_to: self.to,
            paid,
            responsible: self.responsible.clone(),
            ..Default::default()
        }
    }

    /// Run the command and list items
    pub async fn run(self, db: &Connection) -> Result<()> {
        let items: Vec<DueItem> = db.query(&self.filter()).await?;
        println!("{} items.", items.len());
        items.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddItem {
    #[clap(short, long)]
    pub due_date: NaiveDate,
    #[clap(short='m', long)]
    pub description: String,
    #[clap(short='a', long)]
    pub debt_amount: f64,
    #[clap(short, long)]
    pub responsible: Option<String>,
    /// Do not ask for confirmation
    #[clap(short, long)]
    pub yes: bool,
}

impl AddItem {
    /// Run the command and add an item to the database
    pub async fn run(self, db: &Connection) -> Result<()> {
        if self.debt_amount < 0.0 {
            return Err(anyhow!("debt amount must not be negative"));
        }
        let item = NewDueItem {
            due_date: self.due_date,
            description: self.description,
            debt_amount: self.debt_amount,
            responsible: self.responsible,
            ..Default::default()
        };

        if !self.yes {
            println!();
            item.clone().with_id(0).print_formatted();
            println!();
            let confirm = Confirm::new("Add item?").with_default(true);
            if !confirm.prompt()? {
                return Ok(());
            }
        }

        let item: DueItem = db.insert(item).await?;
        println!("Item added with id {}.", item.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RescheduleItem {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub due_date: NaiveDate,
}

impl RescheduleItem {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let old: DueItem = db.retrieve(self.id).await?;
        let new: DueItem = db.update(self.id, DueItemChange::DueDate(self.due_date)).await?;
        (old, new).print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AssignItem {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub responsible: String,
}

impl AssignItem {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let old: DueItem = db.retrieve(self.id).await?;
        let new: DueItem = db.update(self.id, DueItemChange::Responsible(self.responsible)).await?;
        (old, new).print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PayItem {
    #[clap(short, long)]
    pub id: u32,
    /// Paid amount. Without it nothing is recorded.
    #[clap(short, long)]
    pub amount: Option<f64>,
}

impl PayItem {
    pub async fn run(self, db: &Connection) -> Result<()> {
        if self.amount.is_some_and(|amount| amount < 0.0) {
            return Err(anyhow!("amount must not be negative"));
        }
        let old: DueItem = db.retrieve(self.id).await?;
        let new: DueItem = db.update(self.id, DueItemChange::Payment(self.amount)).await?;
        (old, new).print_formatted();
        Ok(())
    }
}

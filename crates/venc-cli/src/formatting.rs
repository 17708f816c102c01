use venc_domain::DueItem;

macro_rules! next_attr {
    ($old:ident, $new:ident, $attr:ident) => {
        if $old.$attr != $new.$attr {
            format!(" -> {}", display_opt(&$new.$attr))
        } else {
            "".to_string()
        }
    };
}

pub trait PrintFormatted {
    fn print_formatted(&self);
}

fn display_opt<T: ToString>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

impl PrintFormatted for DueItem {
    fn print_formatted(&self) {
        println!("Id:\t\t{}", self.id);
        println!("Due:\t\t{}", self.due_date);
        println!("Description:\t{}", self.description);
        println!("Debt:\t\t{:.2}", self.debt_amount);
        println!("Responsible:\t{}", display_opt(&self.responsible));
        println!("Paid:\t\t{}", display_opt(&self.paid_amount));
        println!("Paid at:\t{}", display_opt(&self.payment_date));
    }
}

/// Print the changes between two versions of an item
impl PrintFormatted for (DueItem, DueItem) {
    fn print_formatted(&self) {
        let (old, new) = self;
        let due_date = if old.due_date != new.due_date {
            format!(" -> {}", new.due_date)
        } else {
            "".to_string()
        };

        println!("Id:\t\t{}", old.id);
        println!("Due:\t\t{}{}", old.due_date, due_date);
        println!("Description:\t{}", old.description);
        println!(
            "Responsible:\t{}{}",
            display_opt(&old.responsible),
            next_attr!(old, new, responsible)
        );
        println!(
            "Paid:\t\t{}{}",
            display_opt(&old.paid_amount),
            next_attr!(old, new, paid_amount)
        );
        println!(
            "Paid at:\t{}{}",
            display_opt(&old.payment_date),
            next_attr!(old, new, payment_date)
        );
    }
}

impl PrintFormatted for Vec<DueItem> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<12}\t{:<35}\t{:>10}\t{:<12}\t{:>10}\t{}",
            "ID", "Due", "Description", "Debt", "Responsible", "Paid", "Paid at"
        );
        println!("{:-<130}", "-");
        for item in self {
            println!(
                "{:>4}\t{:<12}\t{:<35}\t{:>10.2}\t{:<12}\t{:>10}\t{}",
                item.id,
                item.due_date,
                item.description,
                item.debt_amount,
                display_opt(&item.responsible),
                display_opt(&item.paid_amount),
                display_opt(&item.payment_date),
            );
        }
    }
}

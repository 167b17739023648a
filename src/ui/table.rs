use tabled::{settings::Style, Table, Tabled};
use crate::inventory::{Fruit, Picture};
use crate::storage::DbStats;
use crate::ui::stock_label;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Field")]
    pub label: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One line of the catalog listing
#[derive(Tabled)]
pub struct FruitRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Stock")]
    pub stock: String,
}

impl From<&Fruit> for FruitRow {
    fn from(fruit: &Fruit) -> Self {
        Self {
            id: fruit.id,
            name: fruit.name.clone(),
            price: format!("{:.2}", fruit.price),
            stock: stock_label(fruit.quantity),
        }
    }
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Catalog listing; empty string when there are no fruits
pub fn fruits_table(fruits: &[Fruit]) -> String {
    if fruits.is_empty() {
        return String::new();
    }
    let rows: Vec<FruitRow> = fruits.iter().map(FruitRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Every field of one fruit
pub fn fruit_detail_table(fruit: &Fruit) -> String {
    let picture = match &fruit.picture {
        Picture::Reference(r) => r.clone(),
        Picture::Image(bytes) => format!("<{} byte image>", bytes.len()),
    };

    let mut builder = TableBuilder::new();
    builder.add_row("ID", &fruit.id.to_string());
    builder.add_row("Name", &fruit.name);
    builder.add_row("Price", &format!("{:.2}", fruit.price));
    builder.add_row("In stock", &fruit.quantity.to_string());
    builder.add_row("Supplier", fruit.supplier.as_deref().unwrap_or("-"));
    builder.add_row("Ordered", &fruit.quantity_ordered.to_string());
    builder.add_row("Total sales", &format!("{:.2}", fruit.total));
    builder.add_row("Picture", &picture);
    builder.build()
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Products", &stats.products.to_string());
    builder.add_row("Units in stock", &stats.units_in_stock.to_string());
    builder.add_row("Units ordered", &stats.units_ordered.to_string());
    builder.add_row("Total sales", &format!("{:.2}", stats.total_sales));
    builder.build()
}

pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    error, fruit_added, fruit_changed, fruit_removed, header, info, money, muted, section,
    stock_label, stock_level, success, warn,
};
pub use table::{fruit_detail_table, fruits_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};

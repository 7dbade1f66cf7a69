use super::ui;
use crate::core::catalog::Product;
use comfy_table::{Cell, CellAlignment};

pub fn display_products(products: &[Product]) -> String {
    if products.is_empty() {
        return ui::style_text("The catalog is empty.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Product"),
        ui::header_cell("Price (CZK)"),
    ]);

    for product in products {
        table.add_row(vec![
            Cell::new(product.id).set_alignment(CellAlignment::Right),
            Cell::new(&product.name),
            ui::money_cell(product.unit_price_czk),
        ]);
    }

    table.to_string()
}

pub fn run(products: &[Product]) {
    println!("{}", display_products(products));
}

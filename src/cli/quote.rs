use super::ui;
use crate::core::order::CartLine;
use crate::core::pricing::{PricingResult, VAT_RATE};
use crate::core::rates::BASE_CURRENCY;
use crate::service::QuoteService;
use anyhow::Result;
use comfy_table::Cell;
use rust_decimal::Decimal;

/// Parses a `PRODUCT_ID:QUANTITY` argument; the quantity defaults to 1.
pub fn parse_cart_line(arg: &str) -> Result<CartLine, String> {
    let (id, quantity) = match arg.split_once(':') {
        Some((id, quantity)) => (id, quantity),
        None => (arg, "1"),
    };
    let product_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid product id '{id}'"))?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity '{quantity}'"))?;
    Ok(CartLine {
        product_id,
        quantity,
    })
}

impl PricingResult {
    pub fn display_as_table(&self) -> String {
        let currency = &self.target_currency;
        let vat_percent = (VAT_RATE * Decimal::ONE_HUNDRED).normalize();

        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Amount")]);
        table.add_row(vec![
            Cell::new(format!("Subtotal ({BASE_CURRENCY})")),
            ui::money_cell(self.subtotal_czk),
        ]);
        table.add_row(vec![
            Cell::new(format!("VAT {vat_percent}% ({BASE_CURRENCY})")),
            ui::money_cell(self.vat_czk),
        ]);
        table.add_row(vec![
            Cell::new(format!("Total ({BASE_CURRENCY})")),
            ui::total_cell(self.total_czk),
        ]);
        if currency != BASE_CURRENCY {
            table.add_row(vec![
                Cell::new(format!("Rate ({BASE_CURRENCY} per 1 {currency})")),
                ui::money_cell(self.rate_czk_per_unit),
            ]);
        }

        let mut output = format!("{}\n\n", ui::style_text("Quote", ui::StyleType::Title));
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nTotal ({}): {}",
            ui::style_text(currency, ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_in_currency),
                ui::StyleType::TotalValue
            )
        ));
        output
    }
}

pub async fn run(service: &QuoteService, items: &[CartLine], currency: Option<&str>) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let result = service.quote(items, currency).await;
    pb.finish_and_clear();

    println!("{}", result?.display_as_table());
    Ok(())
}

use super::ui;
use crate::core::rates::RateTable;
use crate::service::QuoteService;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

impl RateTable {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Code"), ui::header_cell("CZK per unit")]);

        for (code, rate) in self.rates() {
            table.add_row(vec![
                Cell::new(code),
                Cell::new(rate.normalize().to_string()).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut output = format!(
            "Exchange rates as of {}\n\n",
            ui::style_text(&self.as_of.format("%d.%m.%Y").to_string(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output
    }
}

pub async fn run(service: &QuoteService, refresh: bool) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let table = if refresh {
        service.refresh_rates().await
    } else {
        service.current_rates().await
    };
    pb.finish_and_clear();

    println!("{}", table?.display_as_table());
    Ok(())
}

use super::ui;
use crate::ComponentsArgs;
use crate::core::component::{PriceComponent, SortColumn, SortDescriptor, SortDirection};
use crate::core::config::AppConfig;
use crate::core::price::ComponentProvider;
use crate::core::table::{ComponentTable, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, clamp_page};
use anyhow::{Result, bail};
use comfy_table::{Cell, Table};
use tracing::debug;

/// Which feed symbol to show components for. With a single configured feed
/// the argument may be omitted.
fn resolve_symbol(config: &AppConfig, requested: Option<&str>) -> Result<String> {
    if let Some(symbol) = requested {
        return Ok(symbol.to_string());
    }
    match config.feeds.as_slice() {
        [only] => Ok(only.symbol.clone()),
        [] => bail!("No feeds configured. Add feeds to the config file or pass a symbol."),
        _ => {
            let symbols: Vec<&str> = config
                .feeds
                .iter()
                .map(|feed| feed.symbol.as_str())
                .collect();
            bail!(
                "Multiple feeds configured, pass one symbol: {}",
                symbols.join(", ")
            )
        }
    }
}

fn resolve_page_size(config: &AppConfig, requested: Option<usize>) -> Result<usize> {
    let page_size = requested
        .or(config.table.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    if !PAGE_SIZE_OPTIONS.contains(&page_size) {
        bail!("Page size {page_size} is not offered; choose one of {PAGE_SIZE_OPTIONS:?}");
    }
    Ok(page_size)
}

/// Sort requested on the command line, else the configured default, else
/// score ascending.
fn resolve_sort(config: &AppConfig, args: &ComponentsArgs) -> SortDescriptor {
    let column = args
        .sort
        .as_deref()
        .or(config.table.default_sort.as_deref())
        .map(SortColumn::from_query)
        .unwrap_or(SortColumn::Score);
    let descending = args
        .descending
        .or(config.table.default_descending)
        .unwrap_or(false);
    SortDescriptor::new(column, descending)
}

fn components_table(rows: &[PriceComponent], sort: &SortDescriptor) -> Table {
    let marker = |column: SortColumn| (sort.column == column).then_some(sort.direction);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::sort_header_cell("Score", marker(SortColumn::Score)),
        ui::sort_header_cell("Name / Id", marker(SortColumn::Name)),
        ui::sort_header_cell("Uptime Score", marker(SortColumn::UptimeScore)),
        ui::sort_header_cell("Deviation Score", marker(SortColumn::DeviationScore)),
        ui::sort_header_cell("Deviation Penalty", marker(SortColumn::DeviationPenalty)),
        ui::sort_header_cell("Stalled Score", marker(SortColumn::StalledScore)),
        ui::sort_header_cell("Stalled Penalty", marker(SortColumn::StalledPenalty)),
    ]);

    for component in rows {
        table.add_row(vec![
            ui::score_cell(component.score),
            Cell::new(component.display_name()),
            ui::number_cell(component.uptime_score),
            ui::number_cell(component.deviation_score),
            ui::optional_number_cell(component.deviation_penalty),
            ui::number_cell(component.stalled_score),
            ui::number_cell(component.stalled_penalty),
        ]);
    }
    table
}

/// Builds the invocation that opens another page of the same view: all
/// query state is preserved, only the page number changes.
fn page_command(
    symbol: &str,
    search: &str,
    sort: &SortDescriptor,
    page: usize,
    page_size: usize,
) -> String {
    let mut command = format!("feedscope components '{symbol}' --page {page}");
    if !search.is_empty() {
        command.push_str(&format!(" --search '{search}'"));
    }
    command.push_str(&format!(" --sort {}", sort.column.as_query()));
    command.push_str(&format!(
        " --descending {}",
        matches!(sort.direction, SortDirection::Descending)
    ));
    command.push_str(&format!(" --page-size {page_size}"));
    command
}

pub async fn run(
    config: &AppConfig,
    provider: &dyn ComponentProvider,
    args: &ComponentsArgs,
) -> Result<()> {
    let symbol = resolve_symbol(config, args.symbol.as_deref())?;
    let page_size = resolve_page_size(config, args.page_size)?;
    let sort = resolve_sort(config, args);

    let spinner = ui::new_spinner(&format!("Fetching price components for {symbol}..."));
    let fetched = provider.fetch_components(&symbol).await;
    spinner.finish_and_clear();
    let components = fetched?;

    println!(
        "\n{}",
        ui::style_text(
            &format!("Price components for {symbol}"),
            ui::StyleType::Title
        )
    );

    let table = ComponentTable::new(&components, &args.search, &sort);
    if table.num_results() == 0 {
        if components.is_empty() {
            println!("No price components reported for {symbol}.");
        } else {
            println!("No price components match '{}'.", args.search);
        }
        return Ok(());
    }

    let num_pages = table.num_pages(page_size);
    let page = clamp_page(args.page, num_pages);
    if page != args.page {
        debug!(
            "Requested page {} is out of range, showing page {page}",
            args.page
        );
    }

    println!("{}", components_table(table.page(page, page_size), &sort));
    println!(
        "{}",
        ui::style_text(
            &format!(
                "{} publishers, page {page} of {num_pages} (page sizes: 10, 20, 30, 40, 50)",
                table.num_results()
            ),
            ui::StyleType::Subtle
        )
    );
    if page > 1 {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Previous: {}",
                    page_command(&symbol, &args.search, &sort, page - 1, page_size)
                ),
                ui::StyleType::Subtle
            )
        );
    }
    if page < num_pages {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Next: {}",
                    page_command(&symbol, &args.search, &sort, page + 1, page_size)
                ),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

// Entry point and interactive menu.
//
// - [1] loads the transaction CSV and resets filters to "everything".
// - [2]/[3] change the category / sales channel selection.
// - [5] recomputes KPIs and the four chart series and prints them.
// - [6] writes the same dashboard to CSV/JSON files.
//
// Every recompute goes through `pipeline::run`, which is pure; the session
// below is the only state and lives on `main`'s stack.
mod aggregate;
mod error;
mod filter;
mod kpi;
mod loader;
mod output;
mod pipeline;
mod settings;
mod types;
mod util;

use log::{error, info, warn};
use settings::Settings;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use types::{Column, FilterSelection, Table};

use error::DataLoadError;

struct Session {
    table: Option<Table>,
    selection: FilterSelection,
}

impl Session {
    /// Install the outcome of a load. A failed load clears the previous
    /// table so nothing stale can be shown or exported.
    fn install(&mut self, loaded: Result<Table, DataLoadError>) -> Result<&Table, DataLoadError> {
        match loaded {
            Ok(table) => {
                self.selection = filter::default_selection(&table);
                Ok(self.table.insert(table))
            }
            Err(e) => {
                self.table = None;
                self.selection = FilterSelection::default();
                Err(e)
            }
        }
    }
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Parse a multi-select answer against numbered `options`.
///
/// Accepts `all`, `none`, or a comma/space separated list of 1-based
/// indexes. Returns `None` for anything else.
fn parse_selection(input: &str, options: &[String]) -> Option<BTreeSet<String>> {
    match input.trim().to_lowercase().as_str() {
        "all" | "*" => return Some(options.iter().cloned().collect()),
        "none" => return Some(BTreeSet::new()),
        _ => {}
    }
    let mut picked = BTreeSet::new();
    let parts = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    for part in parts {
        let idx: usize = part.parse().ok()?;
        let value = options.get(idx.checked_sub(1)?)?;
        picked.insert(value.clone());
    }
    if picked.is_empty() {
        None
    } else {
        Some(picked)
    }
}

fn handle_load(session: &mut Session, settings: &Settings) {
    let path = Path::new(&settings.data_path);
    match session.install(loader::load_table(path)) {
        Ok(table) => {
            println!(
                "Loaded {} rows from {}.",
                util::format_int(table.len()),
                settings.data_path
            );
            if !table.has(Column::SalesChannel) {
                println!("Note: no 'Sales Channel' column; channel filter disabled.");
            }
            println!();
        }
        Err(e) => {
            error!("load failed: {}", e);
            println!("{}\n", output::load_failure_message(&e));
        }
    }
}

/// Show numbered options with their current state and read a new selection.
fn choose(title: &str, options: &[String], current: &BTreeSet<String>) -> Option<BTreeSet<String>> {
    println!("{}:", title);
    for (i, option) in options.iter().enumerate() {
        let mark = if current.contains(option) { "x" } else { " " };
        println!("  [{}] {:>2}. {}", mark, i + 1, option);
    }
    loop {
        let input = read_line("Select (e.g. 1,3 | all | none): ")?;
        if input.is_empty() {
            return None;
        }
        match parse_selection(&input, options) {
            Some(picked) => return Some(picked),
            None => println!("Invalid selection."),
        }
    }
}

fn handle_filter(session: &mut Session, column: Column) {
    let Some(table) = &session.table else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let options = match filter::distinct_values(table, column) {
        Ok(options) => options,
        Err(e) => {
            println!("{}\n", output::schema_failure_message(&e));
            return;
        }
    };
    let title = format!("Filter by {}", column.header());
    let picked = match column {
        Column::SalesChannel => {
            let current = session.selection.channels.clone().unwrap_or_default();
            choose(&title, &options, &current).map(|p| session.selection.channels = Some(p))
        }
        _ => {
            let current = session.selection.categories.clone();
            choose(&title, &options, &current).map(|p| session.selection.categories = p)
        }
    };
    if picked.is_some() {
        info!("selection changed: {:?}", session.selection);
    }
    println!();
}

fn handle_reset(session: &mut Session) {
    if let Some(table) = &session.table {
        session.selection = filter::default_selection(table);
        println!("Filters reset.\n");
    }
}

fn build_dashboard(session: &Session, settings: &Settings) -> Option<types::Dashboard> {
    let Some(table) = &session.table else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return None;
    };
    let charts = pipeline::standard_charts(&settings.chart_sources());
    match pipeline::run(table, &session.selection, &charts) {
        Ok(dashboard) => Some(dashboard),
        Err(e) => {
            error!("pipeline failed: {}", e);
            println!("{}\n", output::schema_failure_message(&e));
            None
        }
    }
}

fn handle_show(session: &Session, settings: &Settings) {
    if let Some(dashboard) = build_dashboard(session, settings) {
        println!();
        output::print_dashboard(&dashboard, settings.preview_rows);
    }
}

fn handle_export(session: &Session, settings: &Settings) {
    let Some(dashboard) = build_dashboard(session, settings) else {
        return;
    };
    match output::export_dashboard(&dashboard, Path::new(&settings.export_dir)) {
        Ok(paths) => {
            for p in paths {
                println!("Wrote {}", p.display());
            }
            println!();
        }
        Err(e) => {
            warn!("export failed: {}", e);
            eprintln!("Write error: {}\n", e);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = settings::load_settings()?;
    info!("settings: {:?}", settings);

    let mut session = Session {
        table: None,
        selection: FilterSelection::default(),
    };

    loop {
        let has_channel = session
            .table
            .as_ref()
            .is_some_and(|t| t.has(Column::SalesChannel));
        println!("Global Superstore Sales Dashboard");
        println!("[1] Load the file");
        println!("[2] Filter by Category");
        if has_channel {
            println!("[3] Filter by Sales Channel");
        }
        println!("[4] Reset filters");
        println!("[5] Show Dashboard");
        println!("[6] Export Dashboard");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut session, &settings),
            "2" => handle_filter(&mut session, Column::Category),
            "3" if has_channel => handle_filter(&mut session, Column::SalesChannel),
            "4" => handle_reset(&mut session),
            "5" => handle_show(&session, &settings),
            "6" => handle_export(&session, &settings),
            "0" => break,
            _ => println!("Invalid choice.\n"),
        }
    }
    println!("Exiting the program.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Technology".into(), "Furniture".into(), "Office Supplies".into()]
    }

    fn sample_table() -> Table {
        let csv = "Category,Region,Sub-Category,Country,Sales,Profit\n\
                   Tech,East,Phones,US,100,10\n";
        loader::load_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_install_sets_default_selection() {
        let mut session = Session {
            table: None,
            selection: FilterSelection::default(),
        };
        let table = sample_table();
        assert_eq!(session.install(Ok(table.clone())).unwrap(), &table);
        assert_eq!(session.table.as_ref(), Some(&table));
        assert_eq!(session.selection, filter::default_selection(&table));
    }

    #[test]
    fn test_failed_reload_drops_previous_table() {
        let mut session = Session {
            table: None,
            selection: FilterSelection::default(),
        };
        session.install(Ok(sample_table())).unwrap();
        let result = session.install(Err(DataLoadError::MissingColumn("Profit".into())));
        assert!(matches!(result, Err(DataLoadError::MissingColumn(_))));
        assert!(session.table.is_none());
        assert_eq!(session.selection, FilterSelection::default());
    }

    #[test]
    fn test_parse_selection_indexes() {
        let picked = parse_selection("1, 3", &options()).unwrap();
        assert_eq!(
            picked.into_iter().collect::<Vec<_>>(),
            vec!["Office Supplies", "Technology"]
        );
        assert_eq!(parse_selection("2 2", &options()).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_selection_keywords() {
        assert_eq!(parse_selection("ALL", &options()).unwrap().len(), 3);
        assert!(parse_selection("none", &options()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_selection_rejects_bad_input() {
        assert_eq!(parse_selection("0", &options()), None);
        assert_eq!(parse_selection("4", &options()), None);
        assert_eq!(parse_selection("tech", &options()), None);
        assert_eq!(parse_selection(",", &options()), None);
    }
}

//! Argument parsing and execution for the command-line binary.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::assist::{match_category, ExpenseParser, GeminiParser};
use crate::cli::output;
use crate::config::Config;
use crate::core::services::{
    CategoryBreakdown, CategoryLookup, CategoryService, SummaryService, TransactionFilter,
    TransactionService, RECENT_ACTIVITY_LIMIT,
};
use crate::core::DataStore;
use crate::domain::{
    common::calendar_date, Category, CategoryKind, CategoryPatch, NewCategory, NewTransaction,
    TransactionKind, TransactionPatch,
};
use crate::errors::{Result, StoreError};
use crate::utils::build_info;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Version,
    Summary,
    List {
        kind: TransactionKind,
        category: Option<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    AddTransaction {
        kind: TransactionKind,
        amount: f64,
        date: NaiveDate,
        category: String,
        description: String,
    },
    UpdateTransaction {
        kind: TransactionKind,
        id: Uuid,
        amount: Option<f64>,
        date: Option<NaiveDate>,
        category: Option<String>,
        description: Option<String>,
    },
    DeleteTransaction {
        kind: TransactionKind,
        id: Uuid,
    },
    Categories,
    AddCategory {
        name: String,
        icon: String,
        color: String,
        kind: CategoryKind,
    },
    UpdateCategory {
        id: Uuid,
        patch: CategoryPatch,
    },
    DeleteCategory {
        id: Uuid,
    },
    Parse {
        text: String,
        save: bool,
    },
}

pub const USAGE: &str = "Usage: expense_core_cli <command>\n\
Commands:\n  \
summary\n  \
list [expenses|incomes] [--category <name>] [--from <date>] [--to <date>]\n  \
add-expense <amount> <date> <category> <description...>\n  \
add-income <amount> <date> <category> <description...>\n  \
update-expense <id> [--amount <n>] [--date <date>] [--category <name>] [--description <text>]\n  \
update-income <id> [--amount <n>] [--date <date>] [--category <name>] [--description <text>]\n  \
delete-expense <id>\n  \
delete-income <id>\n  \
categories\n  \
add-category <name> <icon> <color> [expense|income]\n  \
update-category <id> [--name <name>] [--icon <icon>] [--color <color>] [--kind <kind>]\n  \
delete-category <id>\n  \
parse [--save] <text...>\n  \
version";

pub fn parse_command(args: &[String]) -> Result<Command> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    match name.as_str() {
        "help" | "--help" | "-h" => Ok(Command::Help),
        "version" | "--version" => Ok(Command::Version),
        "summary" => Ok(Command::Summary),
        "categories" => Ok(Command::Categories),
        "list" => parse_list(rest),
        "add-expense" => parse_add(TransactionKind::Expense, rest),
        "add-income" => parse_add(TransactionKind::Income, rest),
        "update-expense" => parse_update(TransactionKind::Expense, rest),
        "update-income" => parse_update(TransactionKind::Income, rest),
        "delete-expense" => Ok(Command::DeleteTransaction {
            kind: TransactionKind::Expense,
            id: parse_id(single(rest, "id")?)?,
        }),
        "delete-income" => Ok(Command::DeleteTransaction {
            kind: TransactionKind::Income,
            id: parse_id(single(rest, "id")?)?,
        }),
        "add-category" => parse_add_category(rest),
        "update-category" => parse_update_category(rest),
        "delete-category" => Ok(Command::DeleteCategory {
            id: parse_id(single(rest, "id")?)?,
        }),
        "parse" => parse_parse(rest),
        other => Err(StoreError::Validation(format!("unknown command `{other}`"))),
    }
}

fn single<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    match args {
        [value] => Ok(value.as_str()),
        _ => Err(StoreError::Validation(format!("expected exactly one {what}"))),
    }
}

fn parse_list(args: &[String]) -> Result<Command> {
    let mut kind = TransactionKind::Expense;
    let mut category = None;
    let mut from = None;
    let mut to = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "expenses" => kind = TransactionKind::Expense,
            "incomes" => kind = TransactionKind::Income,
            "--category" => category = Some(flag_value(iter.next(), "--category")?.to_string()),
            "--from" => from = Some(parse_date(flag_value(iter.next(), "--from")?)?),
            "--to" => to = Some(parse_date(flag_value(iter.next(), "--to")?)?),
            other => {
                return Err(StoreError::Validation(format!(
                    "unexpected list argument `{other}`"
                )))
            }
        }
    }
    Ok(Command::List {
        kind,
        category,
        from,
        to,
    })
}

fn flag_value<'a>(value: Option<&'a String>, flag: &str) -> Result<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| StoreError::Validation(format!("{flag} needs a value")))
}

fn parse_add(kind: TransactionKind, args: &[String]) -> Result<Command> {
    let [amount, date, category, description @ ..] = args else {
        return Err(StoreError::Validation(
            "expected <amount> <date> <category> <description...>".into(),
        ));
    };
    let description = description.join(" ");
    if description.trim().is_empty() {
        return Err(StoreError::Validation("description is required".into()));
    }
    Ok(Command::AddTransaction {
        kind,
        amount: parse_amount(amount)?,
        date: parse_date(date)?,
        category: category.clone(),
        description,
    })
}

fn parse_update(kind: TransactionKind, args: &[String]) -> Result<Command> {
    let Some((id, flags)) = args.split_first() else {
        return Err(StoreError::Validation("expected <id> and at least one field".into()));
    };
    let id = parse_id(id)?;
    let (mut amount, mut date, mut category, mut description) = (None, None, None, None);
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = flag_value(iter.next(), flag)?;
        match flag.as_str() {
            "--amount" => amount = Some(parse_amount(value)?),
            "--date" => date = Some(parse_date(value)?),
            "--category" => category = Some(value.to_string()),
            "--description" => {
                if value.trim().is_empty() {
                    return Err(StoreError::Validation("description is required".into()));
                }
                description = Some(value.to_string());
            }
            other => {
                return Err(StoreError::Validation(format!(
                    "unexpected update argument `{other}`"
                )))
            }
        }
    }
    if amount.is_none() && date.is_none() && category.is_none() && description.is_none() {
        return Err(StoreError::Validation("nothing to update".into()));
    }
    Ok(Command::UpdateTransaction {
        kind,
        id,
        amount,
        date,
        category,
        description,
    })
}

fn parse_update_category(args: &[String]) -> Result<Command> {
    let Some((id, flags)) = args.split_first() else {
        return Err(StoreError::Validation("expected <id> and at least one field".into()));
    };
    let id = parse_id(id)?;
    let mut patch = CategoryPatch::default();
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = flag_value(iter.next(), flag)?;
        match flag.as_str() {
            "--name" if value.trim().is_empty() => {
                return Err(StoreError::Validation("category name is required".into()))
            }
            "--name" => patch.name = Some(value.trim().to_string()),
            "--icon" => patch.icon = Some(value.to_string()),
            "--color" if !is_hex_color(value) => {
                return Err(StoreError::Validation(format!(
                    "`{value}` is not a hex color such as #4CAF50"
                )))
            }
            "--color" => patch.color = Some(value.to_string()),
            "--kind" => {
                patch.kind = Some(value.parse::<CategoryKind>().map_err(StoreError::Validation)?)
            }
            other => {
                return Err(StoreError::Validation(format!(
                    "unexpected update argument `{other}`"
                )))
            }
        }
    }
    if patch == CategoryPatch::default() {
        return Err(StoreError::Validation("nothing to update".into()));
    }
    Ok(Command::UpdateCategory { id, patch })
}

fn parse_add_category(args: &[String]) -> Result<Command> {
    let (name, icon, color, kind) = match args {
        [name, icon, color] => (name, icon, color, CategoryKind::Expense),
        [name, icon, color, kind] => (
            name,
            icon,
            color,
            kind.parse::<CategoryKind>().map_err(StoreError::Validation)?,
        ),
        _ => {
            return Err(StoreError::Validation(
                "expected <name> <icon> <color> [expense|income]".into(),
            ))
        }
    };
    if name.trim().is_empty() {
        return Err(StoreError::Validation("category name is required".into()));
    }
    if !is_hex_color(color) {
        return Err(StoreError::Validation(format!(
            "`{color}` is not a hex color such as #4CAF50"
        )));
    }
    Ok(Command::AddCategory {
        name: name.trim().to_string(),
        icon: icon.clone(),
        color: color.clone(),
        kind,
    })
}

fn parse_parse(args: &[String]) -> Result<Command> {
    let (save, words) = match args.split_first() {
        Some((flag, rest)) if flag == "--save" => (true, rest),
        _ => (false, args),
    };
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(StoreError::Validation("text to parse is required".into()));
    }
    Ok(Command::Parse { text, save })
}

pub fn parse_amount(raw: &str) -> Result<f64> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| StoreError::Validation(format!("`{raw}` is not a valid amount")))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(StoreError::Validation(format!(
            "amount must be a non-negative number, got `{raw}`"
        )));
    }
    Ok(amount)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    calendar_date::parse(raw)
        .ok_or_else(|| StoreError::Validation(format!("`{raw}` is not a date (YYYY-MM-DD)")))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| StoreError::Validation(format!("`{raw}` is not a valid id")))
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .map(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

fn category_kind(kind: TransactionKind) -> CategoryKind {
    match kind {
        TransactionKind::Expense => CategoryKind::Expense,
        TransactionKind::Income => CategoryKind::Income,
    }
}

/// Resolves a category name among the visible categories of `kind`.
fn resolve_category(store: &DataStore, kind: CategoryKind, name: &str) -> Result<Uuid> {
    let candidates = store.categories_of(kind);
    if let Some(category) = CategoryService::find_by_name(candidates.iter().copied(), name) {
        return Ok(category.id);
    }
    let hint = CategoryService::closest_name(candidates.iter().copied(), name)
        .map(|closest| format!(" (did you mean `{closest}`?)"))
        .unwrap_or_default();
    Err(StoreError::Validation(format!(
        "no {kind} category named `{name}`{hint}"
    )))
}

pub fn execute(command: Command, store: &mut DataStore, config: &Config) -> Result<()> {
    match command {
        Command::Help => println!("{USAGE}"),
        Command::Version => println!("{}", build_info::current().summary()),
        Command::Summary => print_summary(store, config),
        Command::List {
            kind,
            category,
            from,
            to,
        } => {
            let mut filter = TransactionFilter::all();
            if let Some(name) = category {
                let category_id = resolve_category(store, category_kind(kind), &name)?;
                filter = filter.with_category(category_id);
            }
            filter.start = from;
            filter.end = to;
            let records = store.transactions(kind);
            let matched = TransactionService::filter(records, &filter);
            let lookup = CategoryLookup::new(store.categories());
            output::section(format!("{kind}s"));
            if matched.is_empty() {
                output::info("No transactions match your filters.");
            }
            for txn in matched {
                let label = lookup.resolve(txn.category_id);
                println!(
                    "{}  {} {:<14} {:>12}  {}  ({})",
                    txn.date,
                    label.icon,
                    label.name,
                    output::format_amount(txn.amount, &config.currency),
                    txn.description,
                    txn.id
                );
            }
        }
        Command::AddTransaction {
            kind,
            amount,
            date,
            category,
            description,
        } => {
            let category_id = resolve_category(store, category_kind(kind), &category)?;
            let fields = NewTransaction::new(amount, description, date, category_id);
            let id = match kind {
                TransactionKind::Expense => store.add_expense(fields),
                TransactionKind::Income => store.add_income(fields),
            };
            output::success(format!("Added {kind} {id}"));
        }
        Command::UpdateTransaction {
            kind,
            id,
            amount,
            date,
            category,
            description,
        } => {
            let category_id = match category {
                Some(name) => Some(resolve_category(store, category_kind(kind), &name)?),
                None => None,
            };
            let patch = TransactionPatch {
                amount,
                description,
                date,
                category_id,
            };
            match kind {
                TransactionKind::Expense => store.update_expense(id, patch)?,
                TransactionKind::Income => store.update_income(id, patch)?,
            }
            output::success(format!("Updated {kind} {id}"));
        }
        Command::DeleteTransaction { kind, id } => {
            match kind {
                TransactionKind::Expense => store.delete_expense(id)?,
                TransactionKind::Income => store.delete_income(id)?,
            }
            output::success(format!("Deleted {kind} {id}"));
        }
        Command::Categories => {
            for kind in [CategoryKind::Expense, CategoryKind::Income] {
                output::section(format!("{kind} categories"));
                for category in store.categories_of(kind) {
                    let marker = if category.is_default { " (default)" } else { "" };
                    println!(
                        "{} {:<16} {}{}  ({})",
                        category.icon, category.name, category.color, marker, category.id
                    );
                }
            }
        }
        Command::AddCategory {
            name,
            icon,
            color,
            kind,
        } => {
            let id = store.add_category(NewCategory::new(name, icon, color, kind));
            output::success(format!("Added category {id}"));
        }
        Command::UpdateCategory { id, patch } => {
            store.update_category(id, patch)?;
            output::success(format!("Updated category {id}"));
        }
        Command::DeleteCategory { id } => {
            store.delete_category(id)?;
            output::success(format!("Deleted category {id}"));
        }
        Command::Parse { text, save } => run_parse(store, config, &text, save)?,
    }
    Ok(())
}

fn print_summary(store: &DataStore, config: &Config) {
    let today = store.clock().today();
    let expenses = store.expenses();
    let incomes = store.incomes();
    let categories = store.categories();
    let money = |amount: f64| output::format_amount(amount, &config.currency);

    let totals =
        SummaryService::period_totals(expenses.iter().copied(), incomes.iter().copied(), today);
    output::section("Dashboard");
    println!("Today's spending:      {}", money(totals.today_expenses));
    println!("This month's spending: {}", money(totals.month_expenses));
    println!("This month's income:   {}", money(totals.month_income));
    println!("Net balance:           {}", money(totals.net_balance));

    output::section("Recent activity");
    let recent = SummaryService::recent_activity(
        expenses.iter().copied(),
        incomes.iter().copied(),
        RECENT_ACTIVITY_LIMIT,
    );
    if recent.is_empty() {
        output::info("No recent transactions.");
    }
    let lookup = CategoryLookup::new(categories.iter().copied());
    for entry in recent {
        let label = lookup.resolve(entry.record.category_id);
        println!(
            "{}  {} {:<14} {:>12}  {}",
            entry.record.date,
            label.icon,
            label.name,
            money(entry.signed_amount()),
            entry.record.description
        );
    }

    output::section("Spending by category (this month)");
    let month = SummaryService::in_month_of(expenses.iter().copied(), today);
    match SummaryService::category_breakdown(month, categories.iter().copied()) {
        CategoryBreakdown::NoData => output::info("No data to display"),
        CategoryBreakdown::Slices(slices) => {
            for slice in slices {
                println!("{:<16} {:>12}  {}", slice.name, money(slice.total), slice.color);
            }
        }
    }
}

fn run_parse(store: &mut DataStore, config: &Config, text: &str, save: bool) -> Result<()> {
    let parser = GeminiParser::new(config.assist.clone())
        .map_err(|err| StoreError::Config(err.to_string()))?;
    let categories: Vec<Category> = store
        .categories_of(CategoryKind::Expense)
        .into_iter()
        .cloned()
        .collect();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let Some(parsed) = runtime.block_on(parser.parse_expense(text, &categories)) else {
        output::warning("Could not parse that text; please enter the expense manually.");
        return Ok(());
    };

    let money = output::format_amount(parsed.amount, &config.currency);
    output::info(format!(
        "{} | {} | {}",
        parsed.description, money, parsed.category_suggestion
    ));
    let category_id = match_category(&parsed, &categories);
    if !save {
        return Ok(());
    }
    let Some(category_id) = category_id else {
        return Err(StoreError::Validation(format!(
            "suggested category `{}` does not exist; add the expense manually",
            parsed.category_suggestion
        )));
    };
    let today = store.clock().today();
    let id = store.add_expense(NewTransaction::new(
        parsed.amount,
        parsed.description,
        today,
        category_id,
    ));
    output::success(format!("Added expense {id}"));
    Ok(())
}
